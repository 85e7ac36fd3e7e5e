//! The routed unit: a residual displacement vector plus the bookkeeping
//! needed to locate it during the tick loop.

mod id;

pub use self::id::{PacketId, PacketIdGenerator};

use crate::core::CoreId;
use crate::direction::Direction;
use crate::wire::WireId;
use std::fmt;

/// Which of a core's internal holding areas currently references a packet.
///
/// Used only to check the "a packet appears in at most one of
/// `{wait_buffer, send_buffer, out_slots, merge arbiter slot}`" invariant
/// (§8); the routing pipeline itself never inspects this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferKind {
    Wait,
    Send,
    OutSlot(Direction),
    Merge(Direction),
}

/// A packet's weak back-reference to its current location.
///
/// This is never an ownership reference — the simulator's packet arena
/// owns every [`Packet`]; `Parent` only identifies where to find it
/// during the tick loop (§9's "arena of packets indexed by id").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Parent {
    OnWire { wire: WireId, channel: usize },
    InCore { core: CoreId, buffer: BufferKind },
    /// The packet has been destroyed (reached its destination, or lost to
    /// an edge) and is pending removal from the simulator's live list.
    None,
}

/// A packet's phase in the owning core's internal routing pipeline.
///
/// See the module-level directionality tag glossary in `SPEC_FULL.md` §3
/// for the full state-machine description.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Directionality {
    Eastbound,
    Westbound,
    Northbound,
    Southbound,
    Upbound,
    Downbound,
    North,
    South,
    Up,
    Down,
    EastExit,
    WestExit,
    NorthExit,
    SouthExit,
    UpExit,
    DownExit,
    SelfExit,
}

/// Which merge arbiter a packet in a non-exit directionality should
/// attempt next.
///
/// `eastbound`/`westbound` each have their own dedicated axis-entry
/// arbiter; the remaining four merge arbiters are shared between a
/// bound-on-arrival tag and its corner-turn counterpart (`northbound`
/// and `north` both contend for the north merge, etc).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ArbiterAxis {
    East,
    West,
    South,
    North,
    Up,
    Down,
}

impl ArbiterAxis {
    /// Index into a 6-element per-direction array, sharing `Direction`'s
    /// numbering (the two line up one-to-one).
    pub(crate) fn index(self) -> usize {
        match self {
            ArbiterAxis::North => Direction::North.index(),
            ArbiterAxis::East => Direction::East.index(),
            ArbiterAxis::West => Direction::West.index(),
            ArbiterAxis::South => Direction::South.index(),
            ArbiterAxis::Up => Direction::Up.index(),
            ArbiterAxis::Down => Direction::Down.index(),
        }
    }
}

impl Directionality {
    fn determine(dx: i32, dy: i32, dz: i32) -> Self {
        if dx > 0 {
            Directionality::Eastbound
        } else if dx < 0 {
            Directionality::Westbound
        } else if dy > 0 {
            Directionality::Northbound
        } else if dy < 0 {
            Directionality::Southbound
        } else if dz > 0 {
            Directionality::Upbound
        } else if dz < 0 {
            Directionality::Downbound
        } else {
            Directionality::SelfExit
        }
    }

    /// True for any `*-exit` tag, including `self-exit`.
    pub fn is_exit(self) -> bool {
        matches!(
            self,
            Directionality::EastExit
                | Directionality::WestExit
                | Directionality::NorthExit
                | Directionality::SouthExit
                | Directionality::UpExit
                | Directionality::DownExit
                | Directionality::SelfExit
        )
    }

    pub(crate) fn arbiter_axis(self) -> Option<ArbiterAxis> {
        match self {
            Directionality::Eastbound => Some(ArbiterAxis::East),
            Directionality::Westbound => Some(ArbiterAxis::West),
            Directionality::Southbound | Directionality::South => Some(ArbiterAxis::South),
            Directionality::Northbound | Directionality::North => Some(ArbiterAxis::North),
            Directionality::Upbound | Directionality::Up => Some(ArbiterAxis::Up),
            Directionality::Downbound | Directionality::Down => Some(ArbiterAxis::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Directionality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Directionality::Eastbound => "eastbound",
            Directionality::Westbound => "westbound",
            Directionality::Northbound => "northbound",
            Directionality::Southbound => "southbound",
            Directionality::Upbound => "upbound",
            Directionality::Downbound => "downbound",
            Directionality::North => "north",
            Directionality::South => "south",
            Directionality::Up => "up",
            Directionality::Down => "down",
            Directionality::EastExit => "east-exit",
            Directionality::WestExit => "west-exit",
            Directionality::NorthExit => "north-exit",
            Directionality::SouthExit => "south-exit",
            Directionality::UpExit => "up-exit",
            Directionality::DownExit => "down-exit",
            Directionality::SelfExit => "self-exit",
        };
        f.write_str(s)
    }
}

/// A packet in transit: a residual displacement vector, its current
/// pipeline phase, and its location.
#[derive(Debug, Clone)]
pub struct Packet {
    id: PacketId,
    dx: i32,
    dy: i32,
    dz: i32,
    routing_delay: u32,
    directionality: Directionality,
    parent: Parent,
}

impl Packet {
    /// Construct a packet with the given residual displacement.
    ///
    /// `determine_directionality` resolves dx before dy before dz: a
    /// non-zero `dx` always wins regardless of `dy`/`dz`. The packet has
    /// no parent yet — inject it into a source core with
    /// [`Simulator::inject`](crate::simulator::Simulator::inject) to give
    /// it one.
    pub(crate) fn new(id: PacketId, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            id,
            dx,
            dy,
            dz,
            routing_delay: 0,
            directionality: Directionality::determine(dx, dy, dz),
            parent: Parent::None,
        }
    }

    pub fn id(&self) -> PacketId {
        self.id
    }

    pub fn dx(&self) -> i32 {
        self.dx
    }

    pub fn dy(&self) -> i32 {
        self.dy
    }

    pub fn dz(&self) -> i32 {
        self.dz
    }

    pub fn routing_delay(&self) -> u32 {
        self.routing_delay
    }

    pub fn directionality(&self) -> Directionality {
        self.directionality
    }

    pub fn parent(&self) -> Parent {
        self.parent
    }

    /// Manhattan distance of the packet's current residual displacement.
    pub fn residual_distance(&self) -> u32 {
        self.dx.unsigned_abs() + self.dy.unsigned_abs() + self.dz.unsigned_abs()
    }

    /// True once every displacement component has reached zero.
    pub fn at_destination(&self) -> bool {
        self.dx == 0 && self.dy == 0 && self.dz == 0
    }

    pub(crate) fn set_parent(&mut self, parent: Parent) {
        self.parent = parent;
    }

    pub(crate) fn set_routing_delay(&mut self, delay: u32) {
        self.routing_delay = delay;
    }

    pub(crate) fn decrement_routing_delay(&mut self) {
        self.routing_delay = self.routing_delay.saturating_sub(1);
    }

    pub(crate) fn set_directionality(&mut self, directionality: Directionality) {
        self.directionality = directionality;
    }

    /// Decrement the displacement component in `direction`'s axis towards
    /// zero and re-tag the packet with the corresponding `*bound` arrival
    /// directionality. Called once per wire hop (§4.6 step 4).
    pub(crate) fn advance_across_wire(&mut self, direction: Direction) {
        match direction {
            Direction::East => {
                self.dx -= 1;
                self.directionality = Directionality::Eastbound;
            }
            Direction::West => {
                self.dx += 1;
                self.directionality = Directionality::Westbound;
            }
            Direction::North => {
                self.dy -= 1;
                self.directionality = Directionality::Northbound;
            }
            Direction::South => {
                self.dy += 1;
                self.directionality = Directionality::Southbound;
            }
            Direction::Up => {
                self.dz -= 1;
                self.directionality = Directionality::Upbound;
            }
            Direction::Down => {
                self.dz += 1;
                self.directionality = Directionality::Downbound;
            }
        }
    }

    /// The outbound direction implied by the residual displacement, by
    /// dimension-order priority (dx before dy before dz). `None` once the
    /// packet has reached its destination.
    pub(crate) fn forwarding_direction(&self) -> Option<Direction> {
        if self.dx > 0 {
            Some(Direction::East)
        } else if self.dx < 0 {
            Some(Direction::West)
        } else if self.dy > 0 {
            Some(Direction::North)
        } else if self.dy < 0 {
            Some(Direction::South)
        } else if self.dz > 0 {
            Some(Direction::Up)
        } else if self.dz < 0 {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dx_wins_dimension_order_priority() {
        let packet = Packet::new(PacketId::NULL, -3, 5, 5);
        assert_eq!(packet.directionality(), Directionality::Westbound);
    }

    #[test]
    fn dy_wins_when_dx_is_zero() {
        let packet = Packet::new(PacketId::NULL, 0, -4, 2);
        assert_eq!(packet.directionality(), Directionality::Southbound);
    }

    #[test]
    fn dz_wins_when_dx_and_dy_are_zero() {
        let packet = Packet::new(PacketId::NULL, 0, 0, -2);
        assert_eq!(packet.directionality(), Directionality::Downbound);
    }

    #[test]
    fn zero_vector_is_self_exit() {
        let packet = Packet::new(PacketId::NULL, 0, 0, 0);
        assert_eq!(packet.directionality(), Directionality::SelfExit);
        assert!(packet.at_destination());
    }

    #[test]
    fn exit_tags_include_self_exit() {
        assert!(Directionality::SelfExit.is_exit());
        assert!(Directionality::EastExit.is_exit());
        assert!(!Directionality::Eastbound.is_exit());
        assert!(!Directionality::North.is_exit());
    }

    #[test]
    fn bound_and_corner_turn_tags_share_an_arbiter_axis() {
        assert_eq!(
            Directionality::Northbound.arbiter_axis(),
            Directionality::North.arbiter_axis()
        );
        assert_eq!(
            Directionality::Downbound.arbiter_axis(),
            Directionality::Down.arbiter_axis()
        );
    }

    #[test]
    fn advance_across_wire_decrements_toward_zero_and_retags() {
        let mut packet = Packet::new(PacketId::NULL, 3, 0, 0);
        packet.advance_across_wire(Direction::East);
        assert_eq!(packet.dx(), 2);
        assert_eq!(packet.directionality(), Directionality::Eastbound);
    }
}
