//! A routing node: entry buffering, six merge-block arbiters, directional
//! forwarding, and send/wait FIFOs.

mod id;
mod slot;

pub use self::id::CoreId;
pub(crate) use self::slot::OutSlot;

use crate::defaults;
use crate::direction::{ALL_DIRECTIONS, Direction};
use crate::packet::{ArbiterAxis, BufferKind, Directionality, Packet, PacketId, Parent};
use crate::topology::Coords;
use crate::wire::{Wire, WireId};
use std::collections::{HashMap, VecDeque};

/// Packets lost or arrived during one core's [`Core::route`] call, reported
/// back to the simulator for console output and conservation bookkeeping.
#[derive(Debug, Default)]
pub(crate) struct RouteEvents {
    pub(crate) lost: Vec<PacketId>,
    pub(crate) arrived: Vec<PacketId>,
    pub(crate) delay_increments: u32,
}

/// A routing node with up to six input wires and six output wires, a
/// wait-buffer, a send-buffer, six merge-block arbiters, and six outbound
/// staging slots.
#[derive(Debug)]
pub struct Core {
    id: CoreId,
    coords: Coords,
    in_wires: [Option<WireId>; 6],
    out_wires: [Option<WireId>; 6],
    wait_buffer: VecDeque<PacketId>,
    send_buffer: VecDeque<PacketId>,
    out_slots: Vec<OutSlot>,
    merge_arbiters: [Option<PacketId>; 6],
    default_routing_delay: u32,
}

impl Core {
    pub(crate) fn new(
        id: CoreId,
        coords: Coords,
        in_wires: [Option<WireId>; 6],
        out_wires: [Option<WireId>; 6],
        n_channels: usize,
    ) -> Self {
        Self {
            id,
            coords,
            in_wires,
            out_wires,
            wait_buffer: VecDeque::new(),
            send_buffer: VecDeque::new(),
            out_slots: (0..6).map(|_| OutSlot::new(n_channels)).collect(),
            merge_arbiters: [None; 6],
            default_routing_delay: defaults::CORE_ENTRY_DELAY,
        }
    }

    pub fn id(&self) -> CoreId {
        self.id
    }

    pub fn coords(&self) -> Coords {
        self.coords
    }

    pub fn out_wire(&self, direction: Direction) -> Option<WireId> {
        self.out_wires[direction.index()]
    }

    pub fn in_wire(&self, direction: Direction) -> Option<WireId> {
        self.in_wires[direction.index()]
    }

    pub(crate) fn set_in_wire(&mut self, direction: Direction, wire: WireId) {
        self.in_wires[direction.index()] = Some(wire);
    }

    pub(crate) fn set_out_wire(&mut self, direction: Direction, wire: WireId) {
        self.out_wires[direction.index()] = Some(wire);
    }

    pub fn wait_buffer_len(&self) -> usize {
        self.wait_buffer.len()
    }

    pub fn send_buffer_len(&self) -> usize {
        self.send_buffer.len()
    }

    /// Buffer/slot/arbiter residency of every packet currently referencing
    /// this core, for invariant checking in tests.
    pub(crate) fn resident_packets(&self) -> Vec<PacketId> {
        let mut resident: Vec<PacketId> = Vec::new();
        resident.extend(self.wait_buffer.iter().copied());
        resident.extend(self.send_buffer.iter().copied());
        resident.extend(self.merge_arbiters.iter().flatten().copied());
        resident
    }

    /// Place a freshly arrived or freshly born packet in the wait-buffer
    /// with the core's entry delay.
    pub(crate) fn inject(
        &mut self,
        packet_id: PacketId,
        packets: &mut HashMap<PacketId, Packet>,
    ) {
        if let Some(packet) = packets.get_mut(&packet_id) {
            packet.set_parent(Parent::InCore {
                core: self.id,
                buffer: BufferKind::Wait,
            });
            packet.set_routing_delay(self.default_routing_delay);
        }
        self.wait_buffer.push_back(packet_id);
    }

    /// Advance the internal pipeline one tick: drain the send-buffer,
    /// scan the wait-buffer, clear the merge arbiters.
    pub(crate) fn route(
        &mut self,
        packets: &mut HashMap<PacketId, Packet>,
        wires: &mut [Wire],
        events: &mut RouteEvents,
    ) {
        // send_buffer has priority: it has already been stalled once.
        let mut retained_send = VecDeque::with_capacity(self.send_buffer.len());
        while let Some(packet_id) = self.send_buffer.pop_front() {
            if let Some(blocked) = self.forward(packet_id, packets, wires, events) {
                retained_send.push_back(blocked);
            }
        }
        self.send_buffer = retained_send;

        let mut new_wait = VecDeque::with_capacity(self.wait_buffer.len());
        while let Some(packet_id) = self.wait_buffer.pop_front() {
            let delay = packets
                .get(&packet_id)
                .expect("wait_buffer packet missing from arena")
                .routing_delay();

            if delay > 0 {
                packets.get_mut(&packet_id).unwrap().decrement_routing_delay();
                new_wait.push_back(packet_id);
                continue;
            }

            let is_outbound = self.advance(packet_id, packets, events);
            if is_outbound {
                if let Some(blocked) = self.forward(packet_id, packets, wires, events) {
                    events.delay_increments += 1;
                    self.send_buffer.push_back(blocked);
                }
            } else {
                new_wait.push_back(packet_id);
            }
        }
        self.wait_buffer = new_wait;

        self.clear_merges();
    }

    /// Attempt to place `packet_id` into the staging slot implied by its
    /// residual displacement (dimension-order priority dx > dy > dz).
    ///
    /// Returns `None` if the packet was staged or destroyed (edge loss or
    /// destination reached); returns the packet id unchanged if both the
    /// slot and the outbound wire need to stay blocked for another tick.
    fn forward(
        &mut self,
        packet_id: PacketId,
        packets: &mut HashMap<PacketId, Packet>,
        wires: &mut [Wire],
        events: &mut RouteEvents,
    ) -> Option<PacketId> {
        let direction = packets[&packet_id].forwarding_direction();

        let Some(direction) = direction else {
            // dx = dy = dz = 0: the packet has reached its destination.
            if let Some(packet) = packets.get_mut(&packet_id) {
                packet.set_parent(Parent::None);
            }
            events.arrived.push(packet_id);
            return None;
        };

        let Some(wire_id) = self.out_wires[direction.index()] else {
            if let Some(packet) = packets.get_mut(&packet_id) {
                packet.set_parent(Parent::None);
            }
            events.lost.push(packet_id);
            return None;
        };

        let slot_ix = direction.index();
        let wire = &mut wires[wire_id.index()];
        if wire.is_clear() && self.out_slots[slot_ix].is_clear() {
            self.out_slots[slot_ix].add(packet_id);
            if let Some(packet) = packets.get_mut(&packet_id) {
                packet.set_parent(Parent::InCore {
                    core: self.id,
                    buffer: BufferKind::OutSlot(direction),
                });
            }
            None
        } else {
            Some(packet_id)
        }
    }

    /// Drive `packet_id` through its next merge arbiter. Returns
    /// `is_outbound`: `true` iff the packet is ready for `forward()` this
    /// same tick (it just won an arbiter, or was already in an exit tag).
    fn advance(
        &mut self,
        packet_id: PacketId,
        packets: &mut HashMap<PacketId, Packet>,
        events: &mut RouteEvents,
    ) -> bool {
        let directionality = packets[&packet_id].directionality();
        if directionality.is_exit() {
            return true;
        }

        let Some(axis) = directionality.arbiter_axis() else {
            return true;
        };
        let arbiter_ix = axis.index();

        if self.merge_arbiters[arbiter_ix].is_some() {
            // Lost the arbiter: immediate retry next tick, no forward progress.
            if let Some(packet) = packets.get_mut(&packet_id) {
                packet.set_routing_delay(defaults::LOSS_RETRY_DELAY);
            }
            events.delay_increments += 1;
            return false;
        }

        self.merge_arbiters[arbiter_ix] = Some(packet_id);
        let packet = packets.get_mut(&packet_id).unwrap();
        packet.set_routing_delay(defaults::ARBITER_PIPELINE_DELAY);

        let next_tag = match axis {
            ArbiterAxis::East => {
                if packet.dx() != 0 {
                    Directionality::EastExit
                } else if packet.dy() > 0 {
                    Directionality::North
                } else {
                    Directionality::South
                }
            }
            ArbiterAxis::West => {
                if packet.dx() != 0 {
                    Directionality::WestExit
                } else if packet.dy() > 0 {
                    Directionality::North
                } else {
                    Directionality::South
                }
            }
            ArbiterAxis::South => {
                if packet.dy() != 0 {
                    Directionality::SouthExit
                } else if packet.dz() > 0 {
                    Directionality::Up
                } else if packet.dz() < 0 {
                    Directionality::Down
                } else {
                    Directionality::SelfExit
                }
            }
            ArbiterAxis::North => {
                if packet.dy() != 0 {
                    Directionality::NorthExit
                } else if packet.dz() > 0 {
                    Directionality::Up
                } else if packet.dz() < 0 {
                    Directionality::Down
                } else {
                    Directionality::SelfExit
                }
            }
            ArbiterAxis::Up => Directionality::UpExit,
            ArbiterAxis::Down => Directionality::DownExit,
        };
        packet.set_directionality(next_tag);

        // A packet that just won an arbiter has non-zero routing_delay
        // (ARBITER_PIPELINE_DELAY), so it is not ready to forward this
        // tick — it re-enters the wait-buffer and stalls out the delay.
        false
    }

    fn clear_merges(&mut self) {
        self.merge_arbiters = [None; 6];
    }

    /// Flush every out-slot into its outbound wire. Blocked injections are
    /// re-staged in the slot and counted as a delay.
    pub(crate) fn send_out(
        &mut self,
        packets: &mut HashMap<PacketId, Packet>,
        wires: &mut [Wire],
        events: &mut RouteEvents,
    ) {
        for direction in ALL_DIRECTIONS {
            let ix = direction.index();
            let Some(wire_id) = self.out_wires[ix] else {
                continue;
            };
            let flushed = self.out_slots[ix].flush();
            for packet_id in flushed {
                let wire = &mut wires[wire_id.index()];
                match wire.inject(packet_id) {
                    Ok(channel) => {
                        if let Some(packet) = packets.get_mut(&packet_id) {
                            packet.set_parent(Parent::OnWire {
                                wire: wire_id,
                                channel,
                            });
                            packet.set_routing_delay(wire.transit_latency());
                        }
                    }
                    Err(blocked) => {
                        events.delay_increments += 1;
                        self.out_slots[ix].add(blocked);
                    }
                }
            }
        }
    }
}
