use thiserror::Error;

/// Error returned when a [`Topology`](crate::topology::Topology) cannot be
/// constructed from the requested parameters.
///
/// Configuration errors are the only fatal errors in this crate (§7):
/// edge loss, blocked forwarding, and arbiter contention are ordinary
/// routing outcomes, not errors.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// `n_cores` was too small to produce a mesh of at least width 1 along
    /// every axis (`round(n_cores^(1/dim)) == 0`).
    #[error(
        "n_cores ({n_cores}) is too small for a {dimensions}D mesh: computed width is 0"
    )]
    WidthIsZero { n_cores: u64, dimensions: u8 },

    /// The requested mesh is narrower than the fixed toy workload's source
    /// coordinates require.
    #[error(
        "a {dimensions}D mesh of width {actual} is too narrow for the toy workload, which requires at least width {required}"
    )]
    TopologyTooNarrowForWorkload {
        dimensions: u8,
        actual: u32,
        required: u32,
    },
}
