//! A unidirectional link between two cores with fixed transit latency and
//! a small integer number of parallel channels.

mod id;

pub use self::id::WireId;

use crate::core::CoreId;
use crate::direction::Direction;
use crate::packet::PacketId;

/// A unidirectional wire connecting an upstream core to a downstream core.
///
/// Packets travel only `upstream → downstream`; the reverse direction (if
/// any) between the same pair of cores is a separate `Wire`. Each of
/// [`Wire::channels`]'s slots holds at most one packet; the packet's own
/// `routing_delay` field tracks its remaining transit time, so the wire
/// itself only needs to track channel *occupancy*.
#[derive(Debug, Clone)]
pub struct Wire {
    id: WireId,
    direction: Direction,
    upstream: CoreId,
    downstream: CoreId,
    transit_latency: u32,
    channels: Vec<Option<PacketId>>,
}

impl Wire {
    pub(crate) fn new(
        id: WireId,
        direction: Direction,
        upstream: CoreId,
        downstream: CoreId,
        transit_latency: u32,
        n_channels: usize,
    ) -> Self {
        assert!(n_channels >= 1, "a wire must have at least one channel");
        Self {
            id,
            direction,
            upstream,
            downstream,
            transit_latency,
            channels: vec![None; n_channels],
        }
    }

    pub fn id(&self) -> WireId {
        self.id
    }

    /// The direction of travel for every packet carried by this wire.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn upstream(&self) -> CoreId {
        self.upstream
    }

    pub fn downstream(&self) -> CoreId {
        self.downstream
    }

    pub fn transit_latency(&self) -> u32 {
        self.transit_latency
    }

    /// True iff at least one channel is empty.
    pub fn is_clear(&self) -> bool {
        self.channels.iter().any(Option::is_none)
    }

    /// Number of channels currently occupied.
    pub fn occupancy(&self) -> usize {
        self.channels.iter().filter(|c| c.is_some()).count()
    }

    pub fn capacity(&self) -> usize {
        self.channels.len()
    }

    /// Place `packet` in the first empty channel.
    ///
    /// Returns the channel index on success. Returns the packet back
    /// unchanged iff every channel is occupied. Unlike the channel array
    /// this models, every write goes through an explicit index assignment
    /// — never a rebound loop variable (see `DESIGN.md`, Open Question 2).
    pub fn inject(&mut self, packet: PacketId) -> Result<usize, PacketId> {
        for (index, slot) in self.channels.iter_mut().enumerate() {
            if slot.is_none() {
                *slot = Some(packet);
                return Ok(index);
            }
        }
        Err(packet)
    }

    /// Remove `packet` from whichever channel holds it. A no-op if the
    /// packet isn't present.
    pub fn disassociate(&mut self, packet: PacketId) {
        for slot in self.channels.iter_mut() {
            if *slot == Some(packet) {
                *slot = None;
                return;
            }
        }
    }
}
