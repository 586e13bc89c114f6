//! # Errors
//!
//! Failures that are returned to the caller. The outcome of a solve that ran to completion
//! (optimal, infeasible, unbounded, interrupted) is a `Status`, not an error: an `Error` means that
//! a call could not be carried out as requested.
use thiserror::Error;

/// Errors returned by the factorization, the iterator and the solver.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A pivot element was too small in absolute value to be divided by safely.
    ///
    /// Recovered by the solver with a refactorization, fatal when it recurs against a fresh
    /// factorization.
    #[error("pivot value {value:e} of variable {variable} at row {row} is below the pivot tolerance")]
    NumericFailure {
        /// Basis position of the pivot.
        row: usize,
        /// Variable that was about to enter the basis.
        variable: usize,
        /// The rejected pivot value.
        value: f64,
    },
    /// A vector or index range does not match the model dimensions.
    #[error("dimension mismatch for {what}: expected {expected}, found {actual}")]
    DimensionMismatch {
        /// What was being measured.
        what: &'static str,
        /// Size implied by the model.
        expected: usize,
        /// Size that was provided.
        actual: usize,
    },
    /// A variable index outside of `0..nr_variables`.
    #[error("variable {variable} is out of range for a model with {nr_variables} variables")]
    VariableOutOfRange {
        /// The offending index.
        variable: usize,
        /// Number of variables including the objective dummy.
        nr_variables: usize,
    },
    /// The lower bound of a variable exceeds its upper bound, or a bound is NaN.
    #[error("variable {variable} has lower bound {lower} above upper bound {upper}")]
    InvalidBounds {
        /// The offending variable.
        variable: usize,
        /// Its lower bound.
        lower: f64,
        /// Its upper bound.
        upper: f64,
    },
    /// A basis that does not describe exactly one basic variable per row.
    #[error("invalid basis: {0}")]
    InvalidBasis(String),
    /// A configuration value that is out of range or not representable in the number type.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// `finish_update` was reached without a preceding successful `prepare_update`.
    #[error("no column was staged for the basis update")]
    NoStagedColumn,
    /// A bound flip was requested for a variable that has no finite range.
    #[error("variable {variable} can not flip bounds: its range is infinite")]
    UnboundedFlip {
        /// The entering variable.
        variable: usize,
    },
}

/// Result type of this crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use crate::error::Error;

    #[test]
    fn messages() {
        let error = Error::NumericFailure { row: 2, variable: 7, value: 1e-14 };
        assert_eq!(
            error.to_string(),
            "pivot value 1e-14 of variable 7 at row 2 is below the pivot tolerance",
        );
        let error = Error::DimensionMismatch { what: "right hand side", expected: 3, actual: 2 };
        assert_eq!(error.to_string(), "dimension mismatch for right hand side: expected 3, found 2");
    }
}
