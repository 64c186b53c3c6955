//! The dense augmented linear system and pluggable solver strategies.
//!
//! The mesh produces an [`AugmentedSystem`]; anything implementing
//! [`LinearSolver`] can consume one. The solver knows nothing about meshes
//! or heat transfer, only about the matrix abstraction, so strategies are
//! freely substitutable.

mod error;
mod gauss_seidel;
mod system;

pub use error::SolverError;
pub use gauss_seidel::{GaussSeidel, GaussSeidelConfig};
pub use system::AugmentedSystem;

/// A solved linear system.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    /// The solution vector, indexed by unknown.
    pub values: Vec<f64>,

    /// Sweeps (full passes over the rows) the strategy performed.
    pub sweeps: usize,
}

/// A strategy for solving a dense augmented linear system.
pub trait LinearSolver {
    /// Solves `A·x = b` for the system's `n` unknowns.
    ///
    /// # Errors
    ///
    /// Returns a [`SolverError`] if the system cannot be solved, including
    /// failure to converge within the strategy's iteration ceiling.
    fn solve(&self, system: &AugmentedSystem) -> Result<Solution, SolverError>;
}
