//! Mesh assembly, the linear-system builder, and the energy-balance verifier.
//!
//! A [`Mesh`] owns the full node arena (solid volumes first, boundaries
//! after them) for its entire lifetime. Topology is fixed at construction;
//! node attributes can be replaced afterwards through the typed accessors or
//! the bulk `set_*_data` operations, so a changed boundary condition does not
//! require rebuilding the mesh.

mod description;
mod error;
mod node;

pub use description::{
    BoundaryRow, CONVECTION_BOUNDARY, FIXED_T_BOUNDARY, GeometryRow, MeshDescription, VolumeRow,
};
pub use error::{MeshError, TopologyError};
pub use node::{
    ConvectionBoundary, FixedTBoundary, NodeId, NodeKind, SolidVolume, ThermalNode,
};

use log::debug;
use thiserror::Error;
use uom::si::{
    area::square_meter,
    f64::{Area, HeatTransfer, Length, ThermalConductivity, ThermodynamicTemperature, Volume},
    heat_transfer::watt_per_square_meter_kelvin,
    length::meter,
    power::watt,
    thermal_conductivity::watt_per_meter_kelvin,
    thermodynamic_temperature::kelvin,
    volume::cubic_meter,
};

use crate::solver::{AugmentedSystem, LinearSolver, SolverError};
use crate::support::units::watts_per_cubic_meter;

/// Spatial dimension of the discretization.
pub const DIM: usize = 2;

/// Faces per control volume (two per dimension).
pub const FACES: usize = 2 * DIM;

/// Errors raised by [`Mesh::solve`].
#[derive(Debug, Error)]
pub enum SolveMeshError {
    /// Building the linear system failed.
    #[error("system assembly failed")]
    Assembly(#[from] MeshError),

    /// The solver strategy failed on the assembled system.
    #[error("linear solve failed")]
    Solver(#[from] SolverError),
}

/// Result of a mesh solve.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshSolution {
    /// Equilibrium temperature of each solid volume, in kelvin, indexed by
    /// volume.
    pub temperatures: Vec<f64>,

    /// Solver sweeps taken to converge.
    pub sweeps: usize,

    /// Largest matrix residual `|Σ a_ij·T_j − b_i|` over all rows, signed as
    /// encountered. `None` when the check was not requested.
    pub worst_residual: Option<f64>,
}

/// Per-volume energy-balance residuals at a candidate solution.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyBalance {
    /// Signed net heat flow into each volume, in watts.
    pub residuals: Vec<f64>,

    /// The residual with the largest absolute value, signed as encountered.
    pub worst: f64,
}

/// A discretized conduction domain: the node arena plus its index split.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    nodes: Vec<ThermalNode>,
    n_volumes: usize,
    n_boundaries: usize,
}

impl Mesh {
    /// Builds the node collection from a tabular description.
    ///
    /// The description is validated in full first; solids are then built with
    /// their neighbor handles resolved straight from the connectivity table,
    /// and boundaries are dispatched on their kind tag. A failure at any
    /// point aborts construction with nothing partially built.
    ///
    /// # Errors
    ///
    /// Any [`MeshError`] from validation, or
    /// [`MeshError::UnknownVolumeKind`] for an unrecognized boundary tag.
    pub fn new(description: &MeshDescription) -> Result<Self, MeshError> {
        description.validate()?;

        let n_volumes = description.num_volumes();
        let n_boundaries = description.num_boundaries();
        let mut nodes = Vec::with_capacity(n_volumes + n_boundaries);

        for (index, (attributes, geometry)) in description
            .volumes
            .iter()
            .zip(&description.geometry)
            .enumerate()
        {
            nodes.push(ThermalNode::Solid(SolidVolume::new(
                Volume::new::<cubic_meter>(attributes.volume),
                ThermalConductivity::new::<watt_per_meter_kelvin>(attributes.conductivity),
                watts_per_cubic_meter(attributes.source),
                geometry.surfaces.map(Area::new::<square_meter>),
                index,
                geometry.position.map(Length::new::<meter>),
                description.connectivity[index].map(NodeId::new),
            )));
        }

        for (row, boundary) in description.boundaries.iter().enumerate() {
            nodes.push(build_boundary(boundary, row)?);
        }

        debug!("assembled mesh: {n_volumes} volumes, {n_boundaries} boundaries");

        Ok(Self {
            nodes,
            n_volumes,
            n_boundaries,
        })
    }

    #[must_use]
    pub fn num_volumes(&self) -> usize {
        self.n_volumes
    }

    #[must_use]
    pub fn num_boundaries(&self) -> usize {
        self.n_boundaries
    }

    /// The full node arena: solids at `0..num_volumes`, boundaries after.
    #[must_use]
    pub fn nodes(&self) -> &[ThermalNode] {
        &self.nodes
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&ThermalNode> {
        self.nodes.get(id.index())
    }

    /// Mutable access to solid volume `index`, for in-place attribute
    /// updates between solves.
    pub fn solid_mut(&mut self, index: usize) -> Option<&mut SolidVolume> {
        if index >= self.n_volumes {
            return None;
        }
        match &mut self.nodes[index] {
            ThermalNode::Solid(volume) => Some(volume),
            _ => unreachable!("solid volumes are stored before boundaries"),
        }
    }

    /// Mutable access to boundary `index` (0-based within the boundary
    /// table) if it is a convection boundary.
    pub fn convection_mut(&mut self, index: usize) -> Option<&mut ConvectionBoundary> {
        match self.nodes.get_mut(self.n_volumes + index) {
            Some(ThermalNode::Convection(boundary)) => Some(boundary),
            _ => None,
        }
    }

    /// Mutable access to boundary `index` (0-based within the boundary
    /// table) if it is a fixed-temperature boundary.
    pub fn fixed_t_mut(&mut self, index: usize) -> Option<&mut FixedTBoundary> {
        match self.nodes.get_mut(self.n_volumes + index) {
            Some(ThermalNode::FixedT(boundary)) => Some(boundary),
            _ => None,
        }
    }

    /// Replaces the attributes of every solid volume in one call, in the
    /// volume-attributes row format. Geometry and topology are untouched.
    ///
    /// All rows are validated before anything is applied, so a failed call
    /// leaves the mesh exactly as it was.
    ///
    /// # Errors
    ///
    /// [`MeshError::DimensionMismatch`] if the row count differs from the
    /// number of volumes, or [`MeshError::NonPhysical`] for a bad value.
    pub fn set_node_data(&mut self, rows: &[VolumeRow]) -> Result<(), MeshError> {
        if rows.len() != self.n_volumes {
            return Err(MeshError::DimensionMismatch {
                table: "volume attributes",
                expected: self.n_volumes,
                found: rows.len(),
            });
        }
        for (index, row) in rows.iter().enumerate() {
            description::validate_volume_row(row, index)?;
        }

        for (node, row) in self.nodes.iter_mut().zip(rows) {
            let ThermalNode::Solid(volume) = node else {
                unreachable!("solid volumes are stored before boundaries")
            };
            volume.replace_attributes(
                Volume::new::<cubic_meter>(row.volume),
                ThermalConductivity::new::<watt_per_meter_kelvin>(row.conductivity),
                watts_per_cubic_meter(row.source),
            );
        }
        Ok(())
    }

    /// Replaces every boundary node in one call, in the boundary-table row
    /// format. Kinds may change; connectivity keeps pointing at the same
    /// arena slots.
    ///
    /// All rows are validated before anything is applied, so a failed call
    /// leaves the mesh exactly as it was.
    ///
    /// # Errors
    ///
    /// [`MeshError::DimensionMismatch`] if the row count differs from the
    /// number of boundaries, [`MeshError::UnknownVolumeKind`] for a bad tag,
    /// or [`MeshError::NonPhysical`] for a bad value.
    pub fn set_boundary_data(&mut self, rows: &[BoundaryRow]) -> Result<(), MeshError> {
        if rows.len() != self.n_boundaries {
            return Err(MeshError::DimensionMismatch {
                table: "boundary table",
                expected: self.n_boundaries,
                found: rows.len(),
            });
        }

        let mut replacements = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            replacements.push(build_boundary(row, index)?);
        }

        self.nodes.truncate(self.n_volumes);
        self.nodes.append(&mut replacements);
        Ok(())
    }

    /// Builds the augmented linear system, one equation row per solid volume
    /// in index order.
    ///
    /// # Errors
    ///
    /// Propagates any [`MeshError`] from the per-volume equation assembly.
    pub fn assemble(&self) -> Result<AugmentedSystem, MeshError> {
        let mut system = AugmentedSystem::zeroed(self.n_volumes);
        for (index, node) in self.nodes[..self.n_volumes].iter().enumerate() {
            let ThermalNode::Solid(volume) = node else {
                unreachable!("solid volumes are stored before boundaries")
            };
            volume.equation(&self.nodes, system.row_mut(index))?;
        }
        Ok(system)
    }

    /// Assembles the system and solves it with the given strategy.
    ///
    /// When `check_solution` is set, the solution is substituted back into
    /// every row and the worst matrix residual (largest absolute value,
    /// reported signed) is returned alongside the temperatures.
    ///
    /// # Errors
    ///
    /// [`SolveMeshError::Assembly`] if the system cannot be built,
    /// [`SolveMeshError::Solver`] if the strategy fails to produce a
    /// solution.
    pub fn solve(
        &self,
        solver: &impl LinearSolver,
        check_solution: bool,
    ) -> Result<MeshSolution, SolveMeshError> {
        let system = self.assemble()?;
        let solution = solver.solve(&system)?;

        let worst_residual = check_solution.then(|| system.worst_residual(&solution.values));
        if let Some(residual) = worst_residual {
            debug!("solution check: worst matrix residual {residual:.3e}");
        }

        Ok(MeshSolution {
            temperatures: solution.values,
            sweeps: solution.sweeps,
            worst_residual,
        })
    }

    /// Recomputes every volume's net heat flow at the given temperatures.
    ///
    /// This is the independent correctness oracle: it walks the faces
    /// directly instead of substituting into the assembled matrix, so it
    /// also catches assembly bugs the matrix residual cannot see.
    ///
    /// # Errors
    ///
    /// [`MeshError::DimensionMismatch`] if the vector length differs from
    /// the number of volumes.
    pub fn check_energy_balance(&self, temperatures: &[f64]) -> Result<EnergyBalance, MeshError> {
        if temperatures.len() != self.n_volumes {
            return Err(MeshError::DimensionMismatch {
                table: "temperature vector",
                expected: self.n_volumes,
                found: temperatures.len(),
            });
        }

        let mut residuals = Vec::with_capacity(self.n_volumes);
        let mut worst = 0.0f64;
        for node in &self.nodes[..self.n_volumes] {
            let ThermalNode::Solid(volume) = node else {
                unreachable!("solid volumes are stored before boundaries")
            };
            let residual = volume.energy_balance(&self.nodes, temperatures)?.get::<watt>();
            if residual.abs() > worst.abs() {
                worst = residual;
            }
            residuals.push(residual);
        }

        Ok(EnergyBalance { residuals, worst })
    }
}

fn build_boundary(row: &BoundaryRow, index: usize) -> Result<ThermalNode, MeshError> {
    description::validate_boundary_row(row, index)?;
    let node = match row.kind {
        CONVECTION_BOUNDARY => ThermalNode::Convection(ConvectionBoundary::new(
            ThermodynamicTemperature::new::<kelvin>(row.value_1),
            HeatTransfer::new::<watt_per_square_meter_kelvin>(row.value_2),
        )),
        FIXED_T_BOUNDARY => ThermalNode::FixedT(FixedTBoundary::new(
            ThermodynamicTemperature::new::<kelvin>(row.value_1),
            Length::new::<meter>(row.value_2),
        )),
        tag => return Err(MeshError::UnknownVolumeKind { row: index, tag }),
    };
    Ok(node)
}
