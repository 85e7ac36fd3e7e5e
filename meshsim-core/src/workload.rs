//! Packet generators: a fixed illustrative scenario and a randomized
//! per-tick spike storm.

use crate::defaults::NEURONS_PER_CORE;
use crate::packet::PacketId;
use crate::simulator::Simulator;
use crate::topology::{Coords, Dimensionality};
use rand_core::Rng;

/// Parameters for [`generate_random_spike_storm`].
#[derive(Debug, Clone, Copy)]
pub struct FirestormParams {
    /// Per-neuron, per-tick firing probability.
    pub probability: f64,
    /// Target mean displacement per axis; the actual draw is uniform over
    /// `[-min(coord, 2*mean_distance), min(width-1-coord, 2*mean_distance)]`,
    /// clamped to the grid.
    pub mean_distance: i32,
}

/// Eleven hand-picked packets exercising same-core contention, corner
/// turns, a merge delay, and an edge loss. Requires a 2D mesh at least
/// [`TOY_WORKLOAD_MIN_WIDTH_2D`](crate::defaults::TOY_WORKLOAD_MIN_WIDTH_2D) wide.
pub fn generate_toy_2d(sim: &mut Simulator) -> Vec<PacketId> {
    // (source x, source y, dx, dy)
    const SCENARIO: [(u32, u32, i32, i32); 11] = [
        (0, 1, 0, -5),
        (1, 0, 4, 1),
        (0, 0, 4, -1),
        (0, 0, 4, -1),
        (4, 4, -2, -2),
        (4, 4, -1, -2),
        (2, 10, 0, -5),
        (4, 10, 0, 3),
        (10, 10, 0, -5),
        (11, 11, -1, -5),
        // Already sits on the west edge; the westbound residual has nowhere
        // to go, so it is lost on its very first route attempt regardless
        // of mesh width.
        (0, 10, -1, 5),
    ];

    SCENARIO
        .iter()
        .map(|&(x, y, dx, dy)| {
            let core = sim
                .topology()
                .core_at(Coords::new_2d(x, y))
                .expect("toy workload requires a 2D mesh at least 12 wide");
            sim.inject(core, dx, dy, 0)
        })
        .collect()
}

/// A single packet descending five levels. Requires a 3D mesh at least
/// [`TOY_WORKLOAD_MIN_WIDTH_3D`](crate::defaults::TOY_WORKLOAD_MIN_WIDTH_3D) wide.
pub fn generate_toy_3d(sim: &mut Simulator) -> Vec<PacketId> {
    let core = sim
        .topology()
        .core_at(Coords::new_3d(15, 15, 0))
        .expect("toy workload requires a 3D mesh at least 16 wide");
    vec![sim.inject(core, 0, 0, -5)]
}

/// Simulate [`NEURONS_PER_CORE`] independent Bernoulli-firing neurons per
/// core per tick, injecting one packet per firing neuron with a
/// grid-clamped random displacement centered on `mean_distance`. Returns
/// the generated packet ids and the sum of their Manhattan displacement.
pub fn generate_random_spike_storm(
    sim: &mut Simulator,
    params: &FirestormParams,
) -> (Vec<PacketId>, u64) {
    let width = sim.topology().width();
    let dimensionality = sim.topology().dimensionality();
    let mut ids = Vec::new();
    let mut total_distance: u64 = 0;

    match dimensionality {
        Dimensionality::TwoD => {
            for cx in 0..width {
                for cy in 0..width {
                    for _ in 0..NEURONS_PER_CORE {
                        if !sim.rng_mut().random_bool(params.probability) {
                            continue;
                        }
                        let dx = bounded_draw(sim.rng_mut(), cx, width, params.mean_distance);
                        let dy = bounded_draw(sim.rng_mut(), cy, width, params.mean_distance);
                        let core = sim.topology().core_at(Coords::new_2d(cx, cy)).unwrap();
                        ids.push(sim.inject(core, dx, dy, 0));
                        total_distance += (dx.unsigned_abs() + dy.unsigned_abs()) as u64;
                    }
                }
            }
        }
        Dimensionality::ThreeD => {
            for cx in 0..width {
                for cy in 0..width {
                    for cz in 0..width {
                        for _ in 0..NEURONS_PER_CORE {
                            if !sim.rng_mut().random_bool(params.probability) {
                                continue;
                            }
                            let dx = bounded_draw(sim.rng_mut(), cx, width, params.mean_distance);
                            let dy = bounded_draw(sim.rng_mut(), cy, width, params.mean_distance);
                            let dz = bounded_draw(sim.rng_mut(), cz, width, params.mean_distance);
                            let core = sim.topology().core_at(Coords::new_3d(cx, cy, cz)).unwrap();
                            ids.push(sim.inject(core, dx, dy, dz));
                            total_distance +=
                                (dx.unsigned_abs() + dy.unsigned_abs() + dz.unsigned_abs()) as u64;
                        }
                    }
                }
            }
        }
    }

    (ids, total_distance)
}

/// A displacement uniformly drawn from `[-room towards 0, room towards
/// width - 1]`, each side independently clamped to `2 * mean_distance`.
fn bounded_draw(rng: &mut impl Rng, coord: u32, width: u32, mean_distance: i32) -> i32 {
    let coord = coord as i32;
    let width = width as i32;
    let span = mean_distance.saturating_mul(2).max(0);
    let room_positive = (width - 1 - coord).min(span);
    let room_negative = coord.min(span);
    rng.random_range(-room_negative..=room_positive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::Topology;
    use rand_core::SeedableRng;

    #[test]
    fn toy_2d_injects_exactly_eleven_packets() {
        let topology = Topology::construct_2d(144, 1, 1).unwrap();
        let mut sim = Simulator::new(topology, 7);
        let ids = generate_toy_2d(&mut sim);
        assert_eq!(ids.len(), 11);
        assert_eq!(sim.stats().injected, 11);
    }

    #[test]
    fn toy_2d_loses_the_packet_that_walks_off_the_north_edge() {
        let topology = Topology::construct_2d(144, 1, 1).unwrap();
        let mut sim = Simulator::new(topology, 7);
        generate_toy_2d(&mut sim);

        for _ in 0..200 {
            sim.tick();
        }

        assert_eq!(sim.stats().lost, 1);
    }

    #[test]
    fn toy_3d_injects_one_packet() {
        let topology = Topology::construct_3d(4096, 1, 1).unwrap();
        let mut sim = Simulator::new(topology, 7);
        let ids = generate_toy_3d(&mut sim);
        assert_eq!(ids.len(), 1);
    }

    #[test]
    fn zero_probability_generates_nothing() {
        let topology = Topology::construct_2d(4, 1, 1).unwrap();
        let mut sim = Simulator::new(topology, 1);
        let (ids, distance) = generate_random_spike_storm(
            &mut sim,
            &FirestormParams {
                probability: 0.0,
                mean_distance: 1,
            },
        );
        assert!(ids.is_empty());
        assert_eq!(distance, 0);
    }

    #[test]
    fn probability_one_fires_every_neuron_on_every_core() {
        let topology = Topology::construct_2d(4, 1, 1).unwrap();
        let mut sim = Simulator::new(topology, 1);
        let (ids, _) = generate_random_spike_storm(
            &mut sim,
            &FirestormParams {
                probability: 1.0,
                mean_distance: 1,
            },
        );
        assert_eq!(ids.len(), NEURONS_PER_CORE as usize * 4);
    }

    #[test]
    fn bounded_draw_never_pushes_past_the_grid_edge() {
        let mut rng = rand_chacha::ChaChaRng::seed_from_u64(99);
        for coord in 0..5u32 {
            for _ in 0..200 {
                let draw = bounded_draw(&mut rng, coord, 5, 10);
                assert!((coord as i32 + draw) >= 0);
                assert!((coord as i32 + draw) < 5);
            }
        }
    }
}
