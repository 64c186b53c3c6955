//! # fvm-conduction
//!
//! Finite-volume discretization and solution of steady-state heat conduction.
//!
//! A mesh of lumped control volumes is described by flat tables (attributes,
//! geometry, connectivity, boundary conditions), assembled into a linked node
//! collection, and turned into one energy-balance equation per solid volume.
//! The resulting dense linear system is solved iteratively for the
//! equilibrium temperature of every volume.
//!
//! ## Crate layout
//!
//! - [`mesh`]: Node model, tabular mesh description, assembly, and the
//!   energy-balance verifier.
//! - [`solver`]: The augmented linear system and pluggable solver strategies.
//! - [`models`]: Thin [`twine_core::Model`] adapters over the crate core.
//! - [`support`]: Supporting utilities (numeric constraints, unit extensions).
//!
//! ## Typical use
//!
//! Build a [`mesh::MeshDescription`] (usually emitted by an external geometry
//! generator), construct a [`mesh::Mesh`] from it, and solve with a
//! [`solver::LinearSolver`] such as [`solver::GaussSeidel`]. The solved
//! temperatures can then be fed back through
//! [`mesh::Mesh::check_energy_balance`] as an independent correctness check.

pub mod mesh;
pub mod models;
pub mod solver;
pub mod support;
