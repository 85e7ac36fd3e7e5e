use clap::{Parser, ValueEnum};
use meshsim_core::error::TopologyError;
use meshsim_core::simulator::Simulator;
use meshsim_core::topology::Topology;
use meshsim_core::workload::{self, FirestormParams};

#[derive(Clone, Copy, ValueEnum)]
enum TopologyKind {
    Mesh,
    #[value(name = "3Dmesh")]
    ThreeDMesh,
}

#[derive(Clone, Copy, ValueEnum)]
enum WorkloadKind {
    Toy,
    Random,
}

#[derive(Parser)]
#[command(about = "Simulate an on-chip mesh packet-routing network.")]
struct Command {
    #[arg(long, value_enum, default_value = "mesh")]
    topology: TopologyKind,

    #[arg(long, value_enum, default_value = "toy")]
    workload: WorkloadKind,

    #[arg(long, default_value_t = 4096)]
    n_cores: u64,

    /// Ticks to simulate.
    #[arg(long = "t", default_value_t = 100)]
    time: u64,

    /// Mean axis distance hint for the random workload.
    #[arg(long, default_value_t = 1)]
    distance: i32,

    /// Per-neuron, per-tick spike probability for the random workload.
    #[arg(long, default_value_t = 0.0001)]
    probability: f64,

    /// Seed for the simulator's shuffle and random-workload RNG.
    #[arg(long, default_value_t = 0)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    let cmd = Command::parse();

    let topology = match cmd.topology {
        TopologyKind::Mesh => Topology::construct_2d(
            cmd.n_cores,
            meshsim_core::defaults::WIRE_TRANSIT_LATENCY,
            meshsim_core::defaults::N_CHANNELS,
        )?,
        TopologyKind::ThreeDMesh => Topology::construct_3d(
            cmd.n_cores,
            meshsim_core::defaults::WIRE_TRANSIT_LATENCY,
            meshsim_core::defaults::N_CHANNELS,
        )?,
    };

    let mut sim = Simulator::new(topology, cmd.seed);
    let mut total_distance: u64 = 0;

    match (cmd.workload, cmd.topology) {
        (WorkloadKind::Toy, TopologyKind::Mesh) => {
            check_width_for_toy_workload(
                sim.topology().width(),
                2,
                meshsim_core::defaults::TOY_WORKLOAD_MIN_WIDTH_2D,
            )?;
            workload::generate_toy_2d(&mut sim);
        }
        (WorkloadKind::Toy, TopologyKind::ThreeDMesh) => {
            check_width_for_toy_workload(
                sim.topology().width(),
                3,
                meshsim_core::defaults::TOY_WORKLOAD_MIN_WIDTH_3D,
            )?;
            workload::generate_toy_3d(&mut sim);
        }
        (WorkloadKind::Random, _) => {
            // the random workload fires a fresh batch of packets every tick
        }
    }

    let firestorm_params = FirestormParams {
        probability: cmd.probability,
        mean_distance: cmd.distance,
    };

    for t in 0..cmd.time {
        if t % 10 == 0 {
            println!("{t}");
        }

        if matches!(cmd.workload, WorkloadKind::Random) {
            let (_, distance) = workload::generate_random_spike_storm(&mut sim, &firestorm_params);
            total_distance += distance;
        }

        let report = sim.tick();
        for packet_id in &report.lost {
            println!("Packet {packet_id} was lost");
        }
    }

    println!(
        "Total number of packet delays: {}",
        sim.stats().delay_events
    );
    if matches!(cmd.workload, WorkloadKind::Random) {
        println!("total distance traveled: {total_distance}");
    }

    Ok(())
}

fn check_width_for_toy_workload(
    actual: u32,
    dimensions: u8,
    required: u32,
) -> Result<(), TopologyError> {
    if actual < required {
        return Err(TopologyError::TopologyTooNarrowForWorkload {
            dimensions,
            actual,
            required,
        });
    }
    Ok(())
}
