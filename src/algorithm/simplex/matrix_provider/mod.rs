//! # Providing the constraint matrix to the simplex core
//!
//! The simplex core never owns the model. It reads columns, costs, bounds and the right hand side
//! through the `MatrixProvider` trait, in terms of the augmented system: the objective function
//! is row `0`, and each variable index refers to a column of that system.
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::to_dense;
use crate::data::linear_program::elements::Objective;
use crate::data::number_types::traits::Field;

pub mod matrix_data;

/// Abstract interface for a constraint matrix together with costs, bounds and a right hand side.
///
/// The indexing of variables is as follows:
///
/// /                  || objective | slacks `1..=m` | structurals `m + 1..=m + n` |
/// ===================||===========|================|=============================|-----
/// Objective (row 0)  ||     1     |       0        |            costs            || 0 |
/// -------------------||-----------|----------------|-----------------------------||---|
/// Constraints        ||     0     |       I        |      constraint matrix      || b |
/// ----------------------------------------------------------------------------------------
///
/// Costs are those of a minimization problem; a provider describing a maximization problem
/// negates its costs and reports `Objective::Maximize`.
///
/// Implementors should be read-only during a solve. Bounds may change between solves, after which
/// a solve should be restarted from a stored basis.
pub trait MatrixProvider {
    /// Number type of the data.
    type F: Field;

    /// The number of constraints `m`, excluding the objective row.
    fn nr_rows(&self) -> usize;

    /// The number of structural variables `n`.
    fn nr_columns(&self) -> usize;

    /// The number of variables in the augmented system, including the objective dummy.
    fn nr_variables(&self) -> usize {
        1 + self.nr_rows() + self.nr_columns()
    }

    /// Column of a variable in the augmented system.
    ///
    /// TODO(PERFORMANCE): Return a borrowing iterator to avoid an allocation for each column that
    ///  is brought into the basis.
    ///
    /// # Arguments
    ///
    /// * `variable`: Index `0` is the objective dummy, `1..=m` are the slacks and the indices
    /// after that are the structural variables.
    ///
    /// # Return value
    ///
    /// Sparse column of length `m + 1`, sorted by row. Structural columns carry their cost in
    /// row `0` (when nonzero).
    fn basic_column(&self, variable: usize) -> Vec<SparseTuple<Self::F>>;

    /// Right hand side value of a constraint row.
    ///
    /// # Arguments
    ///
    /// * `row`: Row index in `1..=m`.
    fn right_hand_side(&self, row: usize) -> Self::F;

    /// Lower bound of a variable, possibly negative infinity.
    fn lower_bound(&self, variable: usize) -> Self::F;

    /// Upper bound of a variable, possibly infinity.
    fn upper_bound(&self, variable: usize) -> Self::F;

    /// Number of nonzero values of a variable's column in the constraint rows (row 0 excluded).
    ///
    /// Breaks ties between columns of equal degree when the basis is factorized.
    fn nonzeros(&self, variable: usize) -> usize;

    /// Direction of optimization of the original problem.
    fn objective(&self) -> Objective {
        Objective::Minimize
    }

    /// Distance between the two bounds of a variable.
    fn range(&self, variable: usize) -> Self::F {
        self.upper_bound(variable) - self.lower_bound(variable)
    }

    /// Whether the two bounds of a variable coincide, up to a tolerance.
    fn is_fixed(&self, variable: usize, tolerance: Self::F) -> bool {
        self.range(variable) < tolerance
    }

    /// Column of a variable in the augmented system as a dense vector of length `m + 1`.
    fn dense_column(&self, variable: usize) -> Vec<Self::F> {
        to_dense(&self.basic_column(variable), self.nr_rows() + 1)
    }
}
