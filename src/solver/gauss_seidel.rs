//! Gauss-Seidel iterative solver.

use log::debug;

use crate::support::constraint::StrictlyPositive;

use super::{AugmentedSystem, LinearSolver, Solution, SolverError};

/// Configuration for a [`GaussSeidel`] solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussSeidelConfig {
    /// Convergence tolerance: a sweep whose largest absolute per-row change
    /// does not exceed this value ends the iteration.
    pub tolerance: f64,

    /// Sweep ceiling; exceeding it fails with [`SolverError::Divergence`]
    /// instead of looping forever on a misbuilt system.
    pub max_sweeps: usize,
}

impl Default for GaussSeidelConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-9,
            max_sweeps: 10_000,
        }
    }
}

/// The Gauss-Seidel strategy.
///
/// Starting from an all-zero guess, each sweep updates
/// `x_i = (b_i − Σ_{j≠i} a_ij·x_j) / a_ii` in row order, reading the latest
/// values of the other unknowns within the same sweep (the in-place update
/// is what distinguishes this from Jacobi iteration: row order affects
/// convergence speed but not the fixed point). Convergence is guaranteed for
/// diagonally dominant systems, which a conduction mesh produces whenever
/// every volume couples to at least one boundary.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct GaussSeidel {
    config: GaussSeidelConfig,
}

impl GaussSeidel {
    #[must_use]
    pub fn new(config: GaussSeidelConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &GaussSeidelConfig {
        &self.config
    }

    fn validated(&self) -> Result<&GaussSeidelConfig, SolverError> {
        StrictlyPositive::new(self.config.tolerance).map_err(|source| SolverError::Config {
            parameter: "tolerance",
            source,
        })?;
        StrictlyPositive::new(self.config.max_sweeps).map_err(|source| SolverError::Config {
            parameter: "max_sweeps",
            source,
        })?;
        Ok(&self.config)
    }
}

impl LinearSolver for GaussSeidel {
    fn solve(&self, system: &AugmentedSystem) -> Result<Solution, SolverError> {
        let config = self.validated()?;
        let n = system.unknowns();
        let mut values = vec![0.0; n];

        if n == 0 {
            return Ok(Solution { values, sweeps: 0 });
        }

        let mut last_change = f64::INFINITY;
        for sweep in 1..=config.max_sweeps {
            let mut max_change = 0.0f64;

            for i in 0..n {
                let row = system.row(i);
                let diagonal = row[i];
                if !diagonal.is_normal() {
                    return Err(SolverError::ZeroDiagonal { row: i });
                }

                let mut value = row[n];
                for (j, (&a, &x)) in row[..n].iter().zip(&values).enumerate() {
                    if j != i {
                        value -= a * x;
                    }
                }
                value /= diagonal;

                max_change = max_change.max((value - values[i]).abs());
                values[i] = value;
            }

            debug!("gauss-seidel sweep {sweep}: max change {max_change:.3e}");

            if max_change <= config.tolerance {
                return Ok(Solution {
                    values,
                    sweeps: sweep,
                });
            }
            if !max_change.is_finite() {
                // Overflowed to infinity or NaN; more sweeps cannot recover.
                return Err(SolverError::Divergence {
                    sweeps: sweep,
                    last_change: max_change,
                });
            }
            last_change = max_change;
        }

        Err(SolverError::Divergence {
            sweeps: config.max_sweeps,
            last_change,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    fn solver(tolerance: f64, max_sweeps: usize) -> GaussSeidel {
        GaussSeidel::new(GaussSeidelConfig {
            tolerance,
            max_sweeps,
        })
    }

    #[test]
    fn solves_a_diagonally_dominant_system() {
        // x = 2, y = -1, z = 1.
        let system = AugmentedSystem::from_rows(&[
            vec![4.0, -1.0, 0.0, 9.0],
            vec![-1.0, 4.0, -1.0, -7.0],
            vec![0.0, -1.0, 4.0, 5.0],
        ])
        .unwrap();

        let solution = solver(1e-12, 1_000).solve(&system).unwrap();
        assert_relative_eq!(solution.values[0], 2.0, epsilon = 1e-10);
        assert_relative_eq!(solution.values[1], -1.0, epsilon = 1e-10);
        assert_relative_eq!(solution.values[2], 1.0, epsilon = 1e-10);
        assert!(solution.sweeps < 100);
    }

    #[test]
    fn single_unknown_converges_immediately() {
        let system = AugmentedSystem::from_rows(&[vec![-4.0, -400.0]]).unwrap();
        let solution = solver(1e-12, 100).solve(&system).unwrap();
        assert_relative_eq!(solution.values[0], 100.0);
        // The first sweep lands exactly; the second only confirms it.
        assert!(solution.sweeps <= 2);
    }

    #[test]
    fn empty_system_yields_empty_solution() {
        let system = AugmentedSystem::zeroed(0);
        let solution = solver(1e-9, 10).solve(&system).unwrap();
        assert!(solution.values.is_empty());
        assert_eq!(solution.sweeps, 0);
    }

    #[test]
    fn non_dominant_system_hits_the_ceiling() {
        // Spectral radius of the iteration matrix is 6; every sweep grows
        // the change, so the ceiling must fire (or the overflow guard, if
        // the values blow up first).
        let system =
            AugmentedSystem::from_rows(&[vec![1.0, 2.0, 3.0], vec![3.0, 1.0, 4.0]]).unwrap();
        let result = solver(1e-9, 50).solve(&system);
        assert!(matches!(result, Err(SolverError::Divergence { .. })));
    }

    #[test]
    fn zero_diagonal_is_a_solver_error() {
        let system =
            AugmentedSystem::from_rows(&[vec![0.0, 1.0, 1.0], vec![1.0, 0.0, 1.0]]).unwrap();
        assert_eq!(
            solver(1e-9, 10).solve(&system),
            Err(SolverError::ZeroDiagonal { row: 0 })
        );
    }

    #[test]
    fn rejects_non_positive_tolerance() {
        let system = AugmentedSystem::from_rows(&[vec![1.0, 1.0]]).unwrap();
        assert!(matches!(
            solver(0.0, 10).solve(&system),
            Err(SolverError::Config {
                parameter: "tolerance",
                ..
            })
        ));
        assert!(matches!(
            solver(1e-9, 0).solve(&system),
            Err(SolverError::Config {
                parameter: "max_sweeps",
                ..
            })
        ));
    }
}
