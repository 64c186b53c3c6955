//! Steady-state conduction as a [`twine_core::Model`].

use thiserror::Error;
use twine_core::Model;
use uom::si::{
    f64::{Power, ThermodynamicTemperature},
    power::watt,
    thermodynamic_temperature::kelvin,
};

use crate::mesh::{Mesh, MeshDescription, MeshError, SolveMeshError};
use crate::solver::{GaussSeidel, LinearSolver};

/// Errors surfaced by [`SteadyConduction`].
#[derive(Debug, Error)]
pub enum ConductionError {
    /// The mesh description could not be assembled.
    #[error("mesh assembly failed")]
    Mesh(#[from] MeshError),

    /// Assembly of the linear system or the solve itself failed.
    #[error(transparent)]
    Solve(#[from] SolveMeshError),
}

/// Solved equilibrium temperatures with solve diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct TemperatureField {
    /// One temperature per solid volume, by volume index.
    pub temperatures: Vec<ThermodynamicTemperature>,

    /// Solver sweeps taken to converge.
    pub sweeps: usize,

    /// Worst matrix residual of the returned solution, when checking was
    /// requested at construction.
    pub worst_residual: Option<Power>,
}

/// Model adapter for a steady-state conduction solve.
///
/// `call` consumes a tabular [`MeshDescription`], builds the mesh, solves it
/// with the configured strategy, and returns the equilibrium temperatures as
/// typed quantities. The adapter holds no mesh state, so one instance can
/// solve any number of descriptions.
#[derive(Debug, Clone)]
pub struct SteadyConduction<S = GaussSeidel> {
    solver: S,
    check_solution: bool,
}

impl Default for SteadyConduction {
    fn default() -> Self {
        Self {
            solver: GaussSeidel::default(),
            check_solution: true,
        }
    }
}

impl SteadyConduction {
    /// A solver with the default Gauss-Seidel strategy and solution
    /// checking enabled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<S: LinearSolver> SteadyConduction<S> {
    /// Uses a custom solver strategy.
    pub fn with_solver(solver: S, check_solution: bool) -> Self {
        Self {
            solver,
            check_solution,
        }
    }
}

impl<S: LinearSolver> Model for SteadyConduction<S> {
    type Input = MeshDescription;
    type Output = TemperatureField;
    type Error = ConductionError;

    fn call(&self, input: &Self::Input) -> Result<Self::Output, Self::Error> {
        let mesh = Mesh::new(input)?;
        let solution = mesh.solve(&self.solver, self.check_solution)?;

        Ok(TemperatureField {
            temperatures: solution
                .temperatures
                .iter()
                .map(|&t| ThermodynamicTemperature::new::<kelvin>(t))
                .collect(),
            sweeps: solution.sweeps,
            worst_residual: solution.worst_residual.map(Power::new::<watt>),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::mesh::{BoundaryRow, FACES, GeometryRow, VolumeRow};

    fn one_volume() -> MeshDescription {
        MeshDescription {
            volumes: vec![VolumeRow {
                volume: 1.0,
                conductivity: 1.0,
                source: 0.0,
            }],
            geometry: vec![GeometryRow {
                surfaces: [1.0; FACES],
                position: [0.5, 0.5],
            }],
            connectivity: vec![[1; FACES]],
            boundaries: vec![BoundaryRow::fixed_temperature(100.0, 1.0)],
        }
    }

    #[test]
    fn solves_a_description_end_to_end() {
        let model = SteadyConduction::new();
        let field = model.call(&one_volume()).unwrap();

        assert_eq!(field.temperatures.len(), 1);
        assert_relative_eq!(field.temperatures[0].get::<kelvin>(), 100.0);
        assert!(field.worst_residual.unwrap().get::<watt>().abs() < 1e-6);
    }

    #[test]
    fn propagates_mesh_errors() {
        let mut description = one_volume();
        description.boundaries[0].kind = 99;

        let result = SteadyConduction::new().call(&description);
        assert!(matches!(
            result,
            Err(ConductionError::Mesh(MeshError::UnknownVolumeKind {
                row: 0,
                tag: 99,
            }))
        ));
    }
}
