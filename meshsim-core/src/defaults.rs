//! Named constants for the routing pipeline.
//!
//! These mirror the timing budget derived from the TrueNorth-like
//! architecture this simulator models: roughly 11 centiticks (1/100th of
//! a tick) to cross one core, split between wire transit, entry/exit
//! overhead, and the merge-arbiter pipeline delay.

/// Number of ticks a packet spends crossing a single [`Wire`](crate::wire::Wire).
pub const WIRE_TRANSIT_LATENCY: u32 = 1;

/// Parallel slots per wire and per out-slot.
///
/// The merge arbiters stay single-slot regardless of this value — see
/// `DESIGN.md` for the rationale.
pub const N_CHANNELS: usize = 1;

/// Ticks a packet stalls on entry into a core's wait-buffer.
///
/// Overhead of bundling and unbundling a packet at a core boundary.
pub const CORE_ENTRY_DELAY: u32 = 2;

/// Ticks a packet is held after winning a merge arbiter.
///
/// `11 - 1 (wire) - 2*2 (entry/exit overhead) = 6`.
pub const ARBITER_PIPELINE_DELAY: u32 = 6;

/// Ticks a packet is held after losing a merge arbiter (immediate retry).
pub const LOSS_RETRY_DELAY: u32 = 0;

/// Virtual neurons simulated per core by the random spike-storm workload.
///
/// Each neuron independently draws a Bernoulli trial every tick with
/// probability `--probability`; this is the trial count behind that draw.
pub const NEURONS_PER_CORE: u32 = 256;

/// Minimum mesh width the toy (2D) workload's fixed scenario packets require.
pub const TOY_WORKLOAD_MIN_WIDTH_2D: u32 = 12;

/// Minimum mesh width the toy (3D) workload's fixed scenario packet requires.
pub const TOY_WORKLOAD_MIN_WIDTH_3D: u32 = 16;
