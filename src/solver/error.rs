use thiserror::Error;

use crate::support::constraint::ConstraintError;

/// Errors that can occur while solving a linear system.
#[derive(Debug, Error, PartialEq)]
pub enum SolverError {
    /// The iterative strategy hit its sweep ceiling without reaching the
    /// convergence tolerance.
    ///
    /// A misbuilt system (a zero diagonal that slipped past validation, or a
    /// matrix far from diagonal dominance) diverges or cycles; the ceiling
    /// turns an infinite loop into this error.
    #[error("did not converge within {sweeps} sweeps: last max change {last_change:.3e}")]
    Divergence { sweeps: usize, last_change: f64 },

    /// A diagonal entry is zero, subnormal, or not finite, so the row cannot
    /// be solved for its unknown.
    #[error("zero or non-finite diagonal at row {row}")]
    ZeroDiagonal { row: usize },

    /// A row's length does not match the system's augmented width.
    #[error("row {row} has {found} entries, expected {expected}")]
    BadShape {
        row: usize,
        expected: usize,
        found: usize,
    },

    /// A configuration parameter fails its numeric constraint.
    #[error("invalid solver configuration: {parameter}")]
    Config {
        parameter: &'static str,
        #[source]
        source: ConstraintError,
    },
}
