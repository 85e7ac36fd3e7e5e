//! Simulation statistics and observability types.
//!
//! [`SimulatorStats`] is an accumulating counter set, updated once per tick
//! by [`Simulator::tick`](crate::simulator::Simulator::tick). Obtain a
//! snapshot via [`Simulator::stats`](crate::simulator::Simulator::stats).

/// Running counters for a [`Simulator`](crate::simulator::Simulator) run.
///
/// `delay_events` counts every tick a packet spent blocked beyond the
/// unobstructed minimum (lost an arbiter, found its out-slot or the wire
/// full); comparing `delay_events` against zero is the cheapest signal that
/// a run experienced any contention at all.
#[derive(Debug, Clone, Default)]
pub struct SimulatorStats {
    /// Number of ticks the simulator has advanced.
    pub ticks: u64,
    /// Packets injected into the mesh over the run.
    pub injected: u64,
    /// Packets that reached their destination and were destroyed.
    pub arrived: u64,
    /// Packets lost by walking off an edge with no outbound wire.
    pub lost: u64,
    /// Total count of arbiter losses and blocked-slot/wire retries.
    pub delay_events: u64,
    /// Sum of Manhattan displacement over every packet ever injected, for
    /// the conservation and lower-bound timing checks.
    pub total_distance: u64,
}

impl SimulatorStats {
    /// Packets still in flight: `injected - arrived - lost`.
    pub fn live(&self) -> u64 {
        self.injected
            .saturating_sub(self.arrived)
            .saturating_sub(self.lost)
    }
}
