/*!
# `meshsim-core` — Cycle-Level Mesh Routing Primitives

`meshsim-core` is a deterministic, tick-stepped simulator of an on-chip
packet-routing network: a 2D or 3D grid of [`Core`]s connected by
unidirectional [`Wire`]s, each packet carrying a residual displacement
vector that is whittled down to zero by dimension-order routing (east/west
before north/south before up/down).

You drive the clock: [`Simulator::tick`] advances exactly one cycle, so you
can run a simulation faster than real time, pause it for inspection, or
replay it deterministically from a fixed seed.

## Mental model

```text
Simulator::inject(core, dx, dy, dz)
      │
      ▼ wait-buffer (entry delay)
 [ source Core ]
      │ merge arbiter (contends with other packets turning the same corner)
      ▼
  six out-slots, one per direction ── wire ── N_CHANNELS parallel transit slots
      │                                           └─ fixed transit_latency
      ▼
 [ next Core ] ── repeats until dx = dy = dz = 0 (arrival) or an edge with no
                   outbound wire is reached (loss)
```

A [`Wire`] is unidirectional: the reverse direction between two adjacent
cores, if any, is a distinct `Wire` object. Packets never carry bytes or a
payload — only the `(dx, dy, dz)` vector, so there's no bandwidth or
buffer-capacity accounting here, unlike a byte-oriented network simulator.

## Building a [`Topology`]

```
use meshsim_core::topology::Topology;

# fn f() -> Result<(), meshsim_core::error::TopologyError> {
// a 12x12 2D mesh, one tick of wire transit latency, single-channel wires
let topology = Topology::construct_2d(144, 1, 1)?;
assert_eq!(topology.width(), 12);
# Ok(()) }; f().unwrap();
```

## Injecting packets and advancing the clock

```
use meshsim_core::{simulator::Simulator, topology::{Coords, Topology}};

let topology = Topology::construct_2d(144, 1, 1).unwrap();
let mut sim = Simulator::new(topology, 42);

let source = sim.topology().core_at(Coords::new_2d(0, 0)).unwrap();
sim.inject(source, 3, -2, 0);

sim.run(100);
println!("arrived: {}, lost: {}", sim.stats().arrived, sim.stats().lost);
```

## Workload generators

[`workload::generate_toy_2d`] replays a fixed ten-packet scenario that
exercises same-core contention, a merge delay, and an edge loss.
[`workload::generate_random_spike_storm`] fires up to
[`defaults::NEURONS_PER_CORE`] independent Bernoulli trials per core per
call, each firing neuron injecting one packet with a displacement centered
on a configured mean distance.

[`Core`]: crate::core::Core
[`Wire`]: crate::wire::Wire
[`Topology`]: crate::topology::Topology
[`Simulator::tick`]: crate::simulator::Simulator::tick
*/

pub mod core;
pub mod defaults;
pub mod direction;
pub mod error;
pub mod packet;
pub mod simulator;
pub mod stats;
pub mod topology;
pub mod wire;
pub mod workload;

pub use self::{
    core::{Core, CoreId},
    direction::Direction,
    error::TopologyError,
    packet::{Packet, PacketId},
    simulator::Simulator,
    stats::SimulatorStats,
    topology::Topology,
    wire::{Wire, WireId},
};
