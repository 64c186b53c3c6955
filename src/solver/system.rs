//! Dense augmented system storage.

use super::SolverError;

/// A dense `n × (n+1)` augmented linear system, `A·x = b`.
///
/// Row `i` holds the `n` coefficients of equation `i` followed by its
/// constant term `b_i`. Storage is row-major in one contiguous allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct AugmentedSystem {
    unknowns: usize,
    data: Vec<f64>,
}

impl AugmentedSystem {
    /// An all-zero system with `unknowns` rows.
    #[must_use]
    pub fn zeroed(unknowns: usize) -> Self {
        Self {
            unknowns,
            data: vec![0.0; unknowns * (unknowns + 1)],
        }
    }

    /// Builds a system from explicit rows, each of length `rows.len() + 1`.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::BadShape`] for a row of the wrong length.
    pub fn from_rows(rows: &[Vec<f64>]) -> Result<Self, SolverError> {
        let unknowns = rows.len();
        let mut system = Self::zeroed(unknowns);
        for (i, row) in rows.iter().enumerate() {
            if row.len() != unknowns + 1 {
                return Err(SolverError::BadShape {
                    row: i,
                    expected: unknowns + 1,
                    found: row.len(),
                });
            }
            system.row_mut(i).copy_from_slice(row);
        }
        Ok(system)
    }

    /// Number of unknowns (and of equation rows).
    #[must_use]
    pub fn unknowns(&self) -> usize {
        self.unknowns
    }

    /// Row `i`: `n` coefficients followed by the constant term.
    #[must_use]
    pub fn row(&self, i: usize) -> &[f64] {
        let width = self.unknowns + 1;
        &self.data[i * width..(i + 1) * width]
    }

    /// Mutable access to row `i`.
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        let width = self.unknowns + 1;
        &mut self.data[i * width..(i + 1) * width]
    }

    /// Coefficient `a_ij`.
    #[must_use]
    pub fn coefficient(&self, i: usize, j: usize) -> f64 {
        self.row(i)[j]
    }

    /// Constant term `b_i`.
    #[must_use]
    pub fn rhs(&self, i: usize) -> f64 {
        self.row(i)[self.unknowns]
    }

    /// Residual of row `i` at a candidate solution: `Σ a_ij·x_j − b_i`.
    ///
    /// `values` must hold one entry per unknown.
    #[must_use]
    pub fn residual(&self, i: usize, values: &[f64]) -> f64 {
        debug_assert_eq!(values.len(), self.unknowns);
        let row = self.row(i);
        let sum: f64 = row[..self.unknowns]
            .iter()
            .zip(values)
            .map(|(a, x)| a * x)
            .sum();
        sum - self.rhs(i)
    }

    /// The row residual with the largest absolute value, signed as
    /// encountered. Zero for an empty system.
    #[must_use]
    pub fn worst_residual(&self, values: &[f64]) -> f64 {
        let mut worst = 0.0f64;
        for i in 0..self.unknowns {
            let residual = self.residual(i, values);
            if residual.abs() > worst.abs() {
                worst = residual;
            }
        }
        worst
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn rows_are_stored_and_read_back() {
        let system =
            AugmentedSystem::from_rows(&[vec![2.0, -1.0, 5.0], vec![-1.0, 3.0, 4.0]]).unwrap();
        assert_eq!(system.unknowns(), 2);
        assert_relative_eq!(system.coefficient(0, 1), -1.0);
        assert_relative_eq!(system.rhs(1), 4.0);
    }

    #[test]
    fn rejects_misshapen_rows() {
        assert_eq!(
            AugmentedSystem::from_rows(&[vec![1.0, 2.0, 3.0], vec![1.0]]),
            Err(SolverError::BadShape {
                row: 1,
                expected: 3,
                found: 1,
            })
        );
    }

    #[test]
    fn residuals_vanish_at_the_exact_solution() {
        // x = 3, y = 2.
        let system =
            AugmentedSystem::from_rows(&[vec![2.0, -1.0, 4.0], vec![-1.0, 3.0, 3.0]]).unwrap();
        assert_relative_eq!(system.residual(0, &[3.0, 2.0]), 0.0);
        assert_relative_eq!(system.worst_residual(&[3.0, 2.0]), 0.0);
    }

    #[test]
    fn worst_residual_ranks_by_magnitude() {
        let system =
            AugmentedSystem::from_rows(&[vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]]).unwrap();
        // Row 0 residual = -3, row 1 residual = +1: the negative one wins.
        assert_relative_eq!(system.worst_residual(&[-3.0, 1.0]), -3.0);
    }

    #[test]
    fn empty_system_has_zero_residual() {
        let system = AugmentedSystem::zeroed(0);
        assert_relative_eq!(system.worst_residual(&[]), 0.0);
    }
}
