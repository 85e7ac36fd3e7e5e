use std::{
    fmt,
    sync::{Arc, atomic::AtomicU64},
};

/// A monotonically increasing generator for unique [`PacketId`] values.
///
/// Backed by an atomic counter so a clone of the same generator never
/// produces a duplicate ID, even if the simulator were driven from more
/// than one thread (it isn't — see §5 — but the primitive costs nothing).
///
/// IDs start at `1`.
#[derive(Debug, Clone, Default)]
pub struct PacketIdGenerator(Arc<AtomicU64>);

/// A unique, monotonically assigned identifier for a single packet.
///
/// Displays as a zero-padded 16-digit hex string (`0x0000000000000001`),
/// matching the console's `Packet <id> was lost` lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PacketId(u64);

impl PacketId {
    /// A _NULL_ packet identifier, for use in fixtures that don't care
    /// about uniqueness.
    #[cfg(test)]
    pub(crate) const NULL: Self = Self(0);
}

impl PacketIdGenerator {
    /// Create a new generator. IDs start at `1`.
    pub fn new() -> Self {
        Self(Arc::new(AtomicU64::new(1)))
    }

    /// Generate a new globally unique [`PacketId`].
    pub fn generate(&self) -> PacketId {
        let id = self.0.fetch_add(1, std::sync::atomic::Ordering::SeqCst);

        debug_assert!(
            id != 0,
            "generated u64::MAX packet identifiers and wrapped around on overflow"
        );

        PacketId(id)
    }
}

impl fmt::Display for PacketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_starts_at_one_and_is_monotonic() {
        let generator = PacketIdGenerator::new();
        let first = generator.generate();
        let second = generator.generate();

        assert_eq!(first.to_string(), "0x0000000000000001");
        assert!(first < second);
    }

    #[test]
    fn clones_share_the_same_counter() {
        let generator = PacketIdGenerator::new();
        let clone = generator.clone();

        let a = generator.generate();
        let b = clone.generate();

        assert_ne!(a, b);
    }
}
