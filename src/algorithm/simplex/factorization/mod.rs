//! # Basis factorization
//!
//! The simplex core never forms the inverse of the basis. It needs two kinds of solves against it,
//! a forward one (`ftran`, `B^-1 x`) to express an entering column in terms of the basis and a
//! backward one (`btran`, `x^T B^-1`) to compute simplex multipliers and pivot rows, and a way
//! to update the representation after each basis change.
//!
//! All vectors are indexed by basis position `0..=m` of the augmented system: position `0` always
//! holds the objective dummy variable, such that a forward solve of an augmented column yields
//! its reduced cost in entry `0`.
use crate::algorithm::simplex::context::SolverContext;
use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::data::number_types::traits::Field;
use crate::error::Result;

pub mod eta_file;
pub mod product_form;
pub mod refactorization;

/// Maintains a representation of the inverse of the basis.
///
/// Implementations only need to be consistent with the basis positions they report from
/// `factorize` and with the pivots committed through `prepare_update` and `finish_update`.
pub trait BasisFactorization {
    /// Number type of the representation.
    type F: Field;

    /// Create a representation for a basis of the given size, equivalent to the identity.
    ///
    /// # Arguments
    ///
    /// * `nr_rows`: Number of constraint rows `m`; vectors have length `m + 1`.
    fn new(nr_rows: usize) -> Self where Self: Sized;

    /// Rebuild the representation from scratch.
    ///
    /// # Arguments
    ///
    /// * `context`: Tolerances and row selection rule.
    /// * `basic_variables`: The `m` basic variables, slacks and structurals in any order. The
    /// objective dummy should not be included.
    /// * `provider`: Source of the columns.
    ///
    /// # Return value
    ///
    /// The basis position of each variable that was factorized and the variables that could not
    /// be, because their columns are (numerically) dependent on the others. Rows that didn't
    /// receive a column are covered by their slack.
    fn factorize<MP: MatrixProvider<F = Self::F>>(
        &mut self,
        context: &SolverContext<Self::F>,
        basic_variables: &[usize],
        provider: &MP,
    ) -> Factorization;

    /// Forward solve, `x := B^-1 x`.
    fn ftran(&self, context: &SolverContext<Self::F>, vector: &mut [Self::F]);

    /// Backward solve, `x^T := x^T B^-1`.
    fn btran(&self, context: &SolverContext<Self::F>, vector: &mut [Self::F]);

    /// Two backward solves.
    ///
    /// Implementations may share a single traversal of their data.
    fn btran_double(
        &self,
        context: &SolverContext<Self::F>,
        first: &mut [Self::F],
        second: &mut [Self::F],
    ) {
        self.btran(context, first);
        self.btran(context, second);
    }

    /// Stage a basis change without committing it.
    ///
    /// # Arguments
    ///
    /// * `context`: Pivot tolerance.
    /// * `leaving_row`: Basis position of the leaving variable, in `1..=m`.
    /// * `entering_variable`: The variable that takes that position.
    /// * `column`: The augmented column of the entering variable after `ftran`.
    ///
    /// # Return value
    ///
    /// The pivot value, `column[leaving_row]`.
    ///
    /// # Errors
    ///
    /// A numeric failure when the pivot value is too small to divide by. Nothing is staged then.
    fn prepare_update(
        &mut self,
        context: &SolverContext<Self::F>,
        leaving_row: usize,
        entering_variable: usize,
        column: &[Self::F],
    ) -> Result<Self::F>;

    /// Commit the staged basis change.
    ///
    /// # Arguments
    ///
    /// * `sign_flip`: Record the negation of the staged column. The basis column at the leaving
    /// row is then the negated entering column.
    ///
    /// # Return value
    ///
    /// Whether a staged change was committed.
    fn finish_update(&mut self, sign_flip: bool) -> bool;

    /// Whether the representation should be rebuilt before the next basis change.
    fn must_refactorize(&mut self, context: &SolverContext<Self::F>) -> bool;

    /// Make the next `must_refactorize` call return `true`.
    fn force_refactorization(&mut self);

    /// Number of basis changes committed since the last factorization.
    fn nr_pivots(&self) -> usize;

    /// Length of the update part of the representation, zero right after a factorization.
    fn eta_len(&self) -> usize;

    /// Number of stored values.
    fn nr_nonzeros(&self) -> usize;

    /// Counters accumulated over the lifetime of the representation.
    fn statistics(&self) -> FactorizationStatistics;
}

/// Result of a factorization.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Factorization {
    /// Variable at each basis position `0..=m`; position `0` holds the objective dummy `0`.
    pub basis_positions: Vec<usize>,
    /// Candidate variables that were left out of the basis.
    pub singular: Vec<usize>,
}

impl Factorization {
    /// Number of candidate columns that could not be factorized.
    #[must_use]
    pub fn singularity_count(&self) -> usize {
        self.singular.len()
    }
}

/// Lifetime counters of a factorization.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FactorizationStatistics {
    /// Number of times `factorize` was called.
    pub refactorizations: u64,
    /// Number of basis changes committed.
    pub pivots: u64,
    /// Number of singular columns over all factorizations.
    pub singularities: u64,
}
