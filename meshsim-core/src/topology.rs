//! Mesh construction: a flat array of [`Core`]s connected by [`Wire`]s in a
//! 2D or 3D grid.

use crate::core::{Core, CoreId};
use crate::direction::Direction;
use crate::error::TopologyError;
use crate::wire::{Wire, WireId};

/// Whether a [`Topology`] is laid out as a 2D grid or a 3D (z-layered) grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dimensionality {
    TwoD,
    ThreeD,
}

/// A core's position in the grid. `z` is always `0` in a [`Dimensionality::TwoD`]
/// topology.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Coords {
    pub fn new_2d(x: u32, y: u32) -> Self {
        Self { x, y, z: 0 }
    }

    pub fn new_3d(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// A 2D or 3D grid of [`Core`]s joined by unidirectional [`Wire`]s.
///
/// Cores and wires are stored in flat, index-addressable arrays (§9's "flat
/// indexable array" guidance): a [`CoreId`]/[`WireId`] is just an index into
/// [`Topology::cores`]/[`Topology::wires`].
#[derive(Debug)]
pub struct Topology {
    dimensionality: Dimensionality,
    width: u32,
    cores: Vec<Core>,
    wires: Vec<Wire>,
}

impl Topology {
    /// Build a `width x width` 2D mesh sized to hold at least `n_cores`
    /// cores, where `width = round(n_cores^0.5)`.
    pub fn construct_2d(
        n_cores: u64,
        transit_latency: u32,
        n_channels: usize,
    ) -> Result<Self, TopologyError> {
        let width = mesh_width(n_cores, 2);
        if width == 0 {
            return Err(TopologyError::WidthIsZero {
                n_cores,
                dimensions: 2,
            });
        }

        let index_of = |x: u32, y: u32| -> CoreId { CoreId::new(y * width + x) };

        let mut cores: Vec<Core> = (0..width)
            .flat_map(|y| (0..width).map(move |x| (x, y)))
            .map(|(x, y)| {
                Core::new(
                    index_of(x, y),
                    Coords::new_2d(x, y),
                    [None; 6],
                    [None; 6],
                    n_channels,
                )
            })
            .collect();

        let mut wires = Vec::new();
        for y in 0..width {
            for x in 0..width {
                if x + 1 < width {
                    link(
                        &mut cores,
                        &mut wires,
                        index_of(x, y),
                        index_of(x + 1, y),
                        Direction::East,
                        transit_latency,
                        n_channels,
                    );
                }
                if y + 1 < width {
                    link(
                        &mut cores,
                        &mut wires,
                        index_of(x, y),
                        index_of(x, y + 1),
                        Direction::North,
                        transit_latency,
                        n_channels,
                    );
                }
            }
        }

        Ok(Self {
            dimensionality: Dimensionality::TwoD,
            width,
            cores,
            wires,
        })
    }

    /// Build a `width x width x width` 3D mesh sized to hold at least
    /// `n_cores` cores, where `width = round(n_cores^(1/3))`, laid out as
    /// stacked top-down 2D layers along `z`.
    pub fn construct_3d(
        n_cores: u64,
        transit_latency: u32,
        n_channels: usize,
    ) -> Result<Self, TopologyError> {
        let width = mesh_width(n_cores, 3);
        if width == 0 {
            return Err(TopologyError::WidthIsZero {
                n_cores,
                dimensions: 3,
            });
        }

        let index_of =
            |x: u32, y: u32, z: u32| -> CoreId { CoreId::new(z * width * width + y * width + x) };

        let mut cores: Vec<Core> = (0..width)
            .flat_map(|z| (0..width).flat_map(move |y| (0..width).map(move |x| (x, y, z))))
            .map(|(x, y, z)| {
                Core::new(
                    index_of(x, y, z),
                    Coords::new_3d(x, y, z),
                    [None; 6],
                    [None; 6],
                    n_channels,
                )
            })
            .collect();

        let mut wires = Vec::new();
        for z in 0..width {
            for y in 0..width {
                for x in 0..width {
                    if x + 1 < width {
                        link(
                            &mut cores,
                            &mut wires,
                            index_of(x, y, z),
                            index_of(x + 1, y, z),
                            Direction::East,
                            transit_latency,
                            n_channels,
                        );
                    }
                    if y + 1 < width {
                        link(
                            &mut cores,
                            &mut wires,
                            index_of(x, y, z),
                            index_of(x, y + 1, z),
                            Direction::North,
                            transit_latency,
                            n_channels,
                        );
                    }
                    if z + 1 < width {
                        link(
                            &mut cores,
                            &mut wires,
                            index_of(x, y, z),
                            index_of(x, y, z + 1),
                            Direction::Up,
                            transit_latency,
                            n_channels,
                        );
                    }
                }
            }
        }

        Ok(Self {
            dimensionality: Dimensionality::ThreeD,
            width,
            cores,
            wires,
        })
    }

    pub fn dimensionality(&self) -> Dimensionality {
        self.dimensionality
    }

    /// Grid width along every axis.
    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn n_cores(&self) -> usize {
        self.cores.len()
    }

    pub fn core(&self, id: CoreId) -> &Core {
        &self.cores[id.index()]
    }

    pub(crate) fn core_mut(&mut self, id: CoreId) -> &mut Core {
        &mut self.cores[id.index()]
    }

    pub fn cores(&self) -> &[Core] {
        &self.cores
    }

    pub(crate) fn cores_mut(&mut self) -> &mut [Core] {
        &mut self.cores
    }

    pub fn wire(&self, id: WireId) -> &Wire {
        &self.wires[id.index()]
    }

    pub fn wires(&self) -> &[Wire] {
        &self.wires
    }

    pub(crate) fn wires_mut(&mut self) -> &mut [Wire] {
        &mut self.wires
    }

    /// Disjoint mutable access to both arrays at once, for the tick loop
    /// which needs to pass `&mut [Wire]` into `Core::route`/`Core::send_out`
    /// while also holding `&mut Core`.
    pub(crate) fn cores_and_wires_mut(&mut self) -> (&mut [Core], &mut [Wire]) {
        (&mut self.cores, &mut self.wires)
    }

    /// The core id at a given grid position, if it's within bounds.
    pub fn core_at(&self, coords: Coords) -> Option<CoreId> {
        if coords.x >= self.width || coords.y >= self.width {
            return None;
        }
        match self.dimensionality {
            Dimensionality::TwoD => {
                if coords.z != 0 {
                    return None;
                }
                Some(CoreId::new(coords.y * self.width + coords.x))
            }
            Dimensionality::ThreeD => {
                if coords.z >= self.width {
                    return None;
                }
                Some(CoreId::new(
                    coords.z * self.width * self.width + coords.y * self.width + coords.x,
                ))
            }
        }
    }
}

/// Create a single `direction`-to-`opposite` pair of unidirectional wires
/// between two adjacent cores and wire them into both endpoints.
fn link(
    cores: &mut [Core],
    wires: &mut Vec<Wire>,
    from: CoreId,
    to: CoreId,
    direction: Direction,
    transit_latency: u32,
    n_channels: usize,
) {
    let forward_id = WireId::new(wires.len() as u32);
    wires.push(Wire::new(
        forward_id,
        direction,
        from,
        to,
        transit_latency,
        n_channels,
    ));
    cores[from.index()].set_out_wire(direction, forward_id);
    cores[to.index()].set_in_wire(direction.opposite(), forward_id);

    let reverse_id = WireId::new(wires.len() as u32);
    wires.push(Wire::new(
        reverse_id,
        direction.opposite(),
        to,
        from,
        transit_latency,
        n_channels,
    ));
    cores[to.index()].set_out_wire(direction.opposite(), reverse_id);
    cores[from.index()].set_in_wire(direction, reverse_id);
}

/// `round(n_cores^(1/dimensions))`, matching the reference implementation's
/// mesh sizing (not `floor`: a requested `n_cores` just under a perfect
/// power rounds up to the next width rather than down).
fn mesh_width(n_cores: u64, dimensions: u32) -> u32 {
    if n_cores == 0 {
        return 0;
    }
    let root = (n_cores as f64).powf(1.0 / dimensions as f64);
    root.round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mesh_width_rounds_to_nearest() {
        assert_eq!(mesh_width(100, 2), 10);
        assert_eq!(mesh_width(99, 2), 10);
        assert_eq!(mesh_width(0, 2), 0);
    }

    #[test]
    fn too_few_cores_is_a_topology_error() {
        let result = Topology::construct_2d(0, 1, 1);
        assert!(matches!(
            result,
            Err(TopologyError::WidthIsZero {
                dimensions: 2,
                ..
            })
        ));
    }

    #[test]
    fn two_d_mesh_has_width_squared_cores() {
        let topology = Topology::construct_2d(144, 1, 1).unwrap();
        assert_eq!(topology.width(), 12);
        assert_eq!(topology.n_cores(), 144);
    }

    #[test]
    fn three_d_mesh_has_width_cubed_cores() {
        let topology = Topology::construct_3d(4096, 1, 1).unwrap();
        assert_eq!(topology.width(), 16);
        assert_eq!(topology.n_cores(), 4096);
    }

    #[test]
    fn interior_core_has_all_six_wires_edge_core_is_missing_some() {
        let topology = Topology::construct_2d(9, 1, 1).unwrap();
        let center = topology.core(topology.core_at(Coords::new_2d(1, 1)).unwrap());
        assert!(center.out_wire(Direction::East).is_some());
        assert!(center.out_wire(Direction::West).is_some());
        assert!(center.out_wire(Direction::North).is_some());
        assert!(center.out_wire(Direction::South).is_some());

        let corner = topology.core(topology.core_at(Coords::new_2d(0, 0)).unwrap());
        assert!(corner.out_wire(Direction::West).is_none());
        assert!(corner.out_wire(Direction::South).is_none());
        assert!(corner.out_wire(Direction::East).is_some());
        assert!(corner.out_wire(Direction::North).is_some());
    }

    #[test]
    fn adjacent_cores_share_the_same_wire_object_from_both_ends() {
        let topology = Topology::construct_2d(4, 1, 1).unwrap();
        let a = topology.core_at(Coords::new_2d(0, 0)).unwrap();
        let b = topology.core_at(Coords::new_2d(1, 0)).unwrap();

        let a_out = topology.core(a).out_wire(Direction::East).unwrap();
        let b_in = topology.core(b).in_wire(Direction::East).unwrap();
        assert_eq!(a_out, b_in);
    }
}
