//! # Simplex iterations
//!
//! The iterator owns the basis, the values of the basic variables and the pivot column of the
//! entering variable under consideration. It does not decide which variables enter and leave,
//! it carries out those decisions: the ratio test primitive, major pivots and bound flips.
use enum_map::{Enum, EnumMap};
use tracing::trace;

use crate::algorithm::simplex::basis::{effective_side, Basis};
use crate::algorithm::simplex::context::SolverContext;
use crate::algorithm::simplex::factorization::{BasisFactorization, Factorization};
use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::data::linear_algebra::vector::{round_absolute, subtract_multiple};
use crate::data::linear_program::elements::BoundSide;
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

/// The two kinds of iterations.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Iteration {
    /// A basis exchange, committed to the factorization.
    MajorPivot,
    /// The entering variable moves from one bound to the other; the basis stays the same.
    MinorBoundFlip,
}

/// Whether the basic values are in sync with the factorization.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum IteratorState {
    /// The basis changed outside of an iteration (or no factorization was made yet).
    NeedFactorize,
    /// The factorization represents the basis and the basic values are current.
    Iterating,
}

/// Carries out basis changes on a basis and the values of its basic variables.
#[derive(Clone, Debug)]
pub struct SimplexIterator<F> {
    basis: Basis,
    /// Value of the basic variable at each position; entry `0` is minus the objective value.
    rhs: Vec<F>,
    /// Augmented column of the last entering variable after `ftran`.
    pivot_column: Vec<F>,
    state: IteratorState,
    iterations: EnumMap<Iteration, u64>,
}

impl<F: Field> SimplexIterator<F> {
    /// Start iterating from a basis.
    ///
    /// The first operation should be `refactorize`.
    #[must_use]
    pub fn new(basis: Basis) -> Self {
        let len = basis.nr_rows() + 1;
        Self {
            basis,
            rhs: vec![F::zero(); len],
            pivot_column: vec![F::zero(); len],
            state: IteratorState::NeedFactorize,
            iterations: EnumMap::default(),
        }
    }

    /// Replace the basis, after which a refactorization is needed.
    pub fn set_basis(&mut self, basis: Basis) {
        debug_assert_eq!(basis.nr_rows() + 1, self.rhs.len());

        self.basis = basis;
        self.state = IteratorState::NeedFactorize;
    }

    /// Factorize the current basis and recompute the basic values.
    ///
    /// Variables that the factorization rejected become nonbasic, the slacks that replace them
    /// become basic.
    ///
    /// # Return value
    ///
    /// The result of the factorization.
    pub fn refactorize<BF, MP>(
        &mut self,
        context: &SolverContext<F>,
        factorization: &mut BF,
        provider: &MP,
    ) -> Factorization
    where
        BF: BasisFactorization<F = F>,
        MP: MatrixProvider<F = F>,
    {
        let candidates = self.basis.basic_variables().to_vec();
        let result = factorization.factorize(context, &candidates, provider);
        self.basis.apply_positions(&result.basis_positions, provider);
        self.recompute_solution(context, factorization, provider);
        self.state = IteratorState::Iterating;

        result
    }

    /// Compute the values of the basic variables from scratch.
    ///
    /// The nonbasic variables are moved to the right hand side at their current values, the
    /// result is solved against the basis and values below the primal tolerance are zeroed.
    pub fn recompute_solution<BF, MP>(
        &mut self,
        context: &SolverContext<F>,
        factorization: &BF,
        provider: &MP,
    )
    where
        BF: BasisFactorization<F = F>,
        MP: MatrixProvider<F = F>,
    {
        let mut rhs = vec![F::zero(); self.basis.nr_rows() + 1];
        for (row, value) in rhs.iter_mut().enumerate().skip(1) {
            *value = provider.right_hand_side(row);
        }
        for variable in self.basis.nonbasic_variables() {
            let value = self.nonbasic_value(provider, variable);
            if value != F::zero() {
                for (row, coefficient) in provider.basic_column(variable) {
                    rhs[row] -= coefficient * value;
                }
            }
        }

        factorization.ftran(context, &mut rhs);
        round_absolute(&mut rhs, context.tolerances.primal);
        self.rhs = rhs;
    }

    /// Value of a nonbasic variable, determined by its bound side.
    ///
    /// Free nonbasic variables are valued at zero.
    pub fn nonbasic_value<MP: MatrixProvider<F = F>>(&self, provider: &MP, variable: usize) -> F {
        debug_assert!(!self.basis.is_basic(variable));

        match self.effective_side(provider, variable) {
            Some(BoundSide::Lower) => provider.lower_bound(variable),
            Some(BoundSide::Upper) => provider.upper_bound(variable),
            None => F::zero(),
        }
    }

    /// The bound a nonbasic variable rests at, `None` if it is free.
    pub fn effective_side<MP: MatrixProvider<F = F>>(&self, provider: &MP, variable: usize) -> Option<BoundSide> {
        effective_side(
            self.basis.bound_side(variable),
            provider.lower_bound(variable),
            provider.upper_bound(variable),
        )
    }

    /// Current value of any variable.
    pub fn value<MP: MatrixProvider<F = F>>(&self, provider: &MP, variable: usize) -> F {
        match self.basis.position_of(variable) {
            Some(row) => self.rhs[row],
            None => self.nonbasic_value(provider, variable),
        }
    }

    /// Transform the augmented column of an entering variable into the pivot column buffer.
    pub fn compute_pivot_column<BF, MP>(
        &mut self,
        context: &SolverContext<F>,
        factorization: &BF,
        provider: &MP,
        entering: usize,
    )
    where
        BF: BasisFactorization<F = F>,
        MP: MatrixProvider<F = F>,
    {
        debug_assert!(!self.basis.is_basic(entering));

        for value in &mut self.pivot_column {
            *value = F::zero();
        }
        for (row, value) in provider.basic_column(entering) {
            self.pivot_column[row] = value;
        }
        factorization.ftran(context, &mut self.pivot_column);
    }

    /// The last computed pivot column. Entry `0` is the reduced cost of the entering variable.
    #[must_use]
    pub fn pivot_column(&self) -> &[F] {
        &self.pivot_column
    }

    /// Step size at which the basic variable at a row reaches a bound.
    ///
    /// # Arguments
    ///
    /// * `row`: Basis position in `1..=m`.
    /// * `direction`: In the primal case, the rate at which the basic value decreases per unit
    /// step of the entering variable. In the dual case, the raw pivot column value.
    /// * `harris`: Multiple of the primal tolerance by which bounds are relaxed.
    /// * `is_primal`: Which of the two tests to perform.
    ///
    /// # Return value
    ///
    /// Primal: the nonnegative step length until the bound in the direction of movement is
    /// reached, infinity if the value is unbounded in that direction or `direction` is too
    /// small. Dual: the signed step of the entering variable that moves the basic value onto the
    /// bound it violates, zero if it violates none.
    pub fn compute_theta<MP: MatrixProvider<F = F>>(
        &self,
        context: &SolverContext<F>,
        provider: &MP,
        row: usize,
        direction: F,
        harris: F,
        is_primal: bool,
    ) -> F {
        debug_assert!(row > 0 && row < self.rhs.len());

        let tolerances = &context.tolerances;
        let variable = self.basis.variable_at(row);
        let value = self.rhs[row];
        let lower = provider.lower_bound(variable);
        let upper = provider.upper_bound(variable);
        let relaxation = tolerances.primal * harris;

        if direction.abs() < tolerances.ratio_pivot {
            return if is_primal { F::infinity() } else { F::zero() };
        }

        if is_primal {
            let theta = if direction > F::zero() && lower.is_finite() {
                (value - lower + relaxation) / direction
            } else if direction < F::zero() && upper.is_finite() {
                (value - upper - relaxation) / direction
            } else {
                return F::infinity();
            };
            theta.max(F::zero())
        } else if value < lower - tolerances.primal {
            (value - lower + relaxation) / direction
        } else if value > upper + tolerances.primal {
            (value - upper - relaxation) / direction
        } else {
            F::zero()
        }
    }

    /// Whether a step should be carried out as a bound flip of the entering variable.
    ///
    /// A dual step with a leaving row is always a major pivot: the leaving variable goes to the
    /// bound it violated and the entering variable may enter outside of its own bounds.
    ///
    /// # Arguments
    ///
    /// * `leaving_row`: The blocking row of the ratio test, if any.
    /// * `entering`: The entering variable.
    /// * `theta`: Signed step of the entering variable.
    /// * `is_primal`: Whether the step comes from a primal ratio test.
    pub fn is_bound_flip<MP: MatrixProvider<F = F>>(
        &self,
        context: &SolverContext<F>,
        provider: &MP,
        leaving_row: Option<usize>,
        entering: usize,
        theta: F,
        is_primal: bool,
    ) -> bool {
        match leaving_row {
            None => true,
            Some(_) if !is_primal => false,
            Some(_) => {
                let tolerance = context.tolerances.primal;
                !provider.is_fixed(entering, tolerance) && provider.range(entering) - theta.abs() < -tolerance
            },
        }
    }

    /// Carry out an iteration with the current pivot column.
    ///
    /// For a major pivot, the pivot must have been staged with `prepare_update` on the
    /// factorization.
    ///
    /// # Arguments
    ///
    /// * `leaving_row`: Basis position of the leaving variable, `None` for a bound flip.
    /// * `entering`: The entering variable.
    /// * `theta`: Signed step of the entering variable.
    /// * `is_primal`: Whether the step comes from a primal ratio test, see `is_bound_flip`.
    ///
    /// # Return value
    ///
    /// The kind of iteration that was performed.
    ///
    /// # Errors
    ///
    /// A bound flip of a variable without a finite range, or a major pivot without a staged
    /// column. Nothing is changed in that case.
    pub fn perform_iteration<BF, MP>(
        &mut self,
        context: &SolverContext<F>,
        factorization: &mut BF,
        provider: &MP,
        leaving_row: Option<usize>,
        entering: usize,
        theta: F,
        is_primal: bool,
    ) -> Result<Iteration>
    where
        BF: BasisFactorization<F = F>,
        MP: MatrixProvider<F = F>,
    {
        debug_assert_eq!(self.state, IteratorState::Iterating);

        let kind = if self.is_bound_flip(context, provider, leaving_row, entering, theta, is_primal) {
            let range = provider.range(entering);
            if !range.is_finite() {
                return Err(Error::UnboundedFlip { variable: entering });
            }

            let step = if theta < F::zero() { -range } else { range };
            subtract_multiple(&mut self.rhs, step, &self.pivot_column);
            self.basis.flip_bound(entering);

            Iteration::MinorBoundFlip
        } else {
            let row = leaving_row.ok_or(Error::NoStagedColumn)?;
            if !factorization.finish_update(false) {
                return Err(Error::NoStagedColumn);
            }

            let entering_value = self.nonbasic_value(provider, entering) + theta;
            subtract_multiple(&mut self.rhs, theta, &self.pivot_column);

            let leaving_value = self.rhs[row];
            let leaving = self.basis.exchange(row, entering);
            let side = closest_side(context, provider, leaving, leaving_value);
            self.basis.set_bound_side(leaving, side);
            self.rhs[row] = entering_value;

            Iteration::MajorPivot
        };

        self.iterations[kind] += 1;
        trace!(
            component = "iterator",
            operation = "perform_iteration",
            kind = ?kind,
            primal = is_primal,
            entering,
            leaving_row = ?leaving_row,
            theta = theta.to_report(),
            objective = self.objective_value().to_report()
        );
        debug_assert_eq!(self.basis.nr_basic(), self.basis.nr_rows());

        Ok(kind)
    }

    /// Whether moving the entering variable is likely blocked by basic variables that are at a
    /// bound already.
    ///
    /// # Arguments
    ///
    /// * `pivot_column`: Transformed column of the entering variable.
    /// * `direction`: Direction of movement of the entering variable, `1` or `-1`.
    ///
    /// # Return value
    ///
    /// `true` if the rows at a bound on balance move further into their bound.
    pub fn check_degeneracy<MP: MatrixProvider<F = F>>(
        &self,
        context: &SolverContext<F>,
        provider: &MP,
        pivot_column: &[F],
        direction: F,
    ) -> bool {
        let tolerance = context.tolerances.primal;
        let mut sum = F::zero();
        for (row, &alpha) in pivot_column.iter().enumerate().skip(1) {
            if alpha == F::zero() {
                continue;
            }

            let variable = self.basis.variable_at(row);
            let value = self.rhs[row];
            let rate = direction * alpha;
            if (value - provider.lower_bound(variable)).abs() < tolerance {
                sum += rate;
            } else if (value - provider.upper_bound(variable)).abs() < tolerance {
                sum -= rate;
            }
        }

        sum > F::zero()
    }

    /// Amount by which the basic variable at a row violates its bounds, zero if it doesn't.
    ///
    /// Violations within the primal tolerance are ignored.
    pub fn infeasibility<MP: MatrixProvider<F = F>>(
        &self,
        context: &SolverContext<F>,
        provider: &MP,
        row: usize,
    ) -> F {
        let variable = self.basis.variable_at(row);
        let value = self.rhs[row];
        let lower = provider.lower_bound(variable);
        let upper = provider.upper_bound(variable);
        let tolerance = context.tolerances.primal;

        if value < lower - tolerance {
            lower - value
        } else if value > upper + tolerance {
            value - upper
        } else {
            F::zero()
        }
    }

    /// All rows with a basic variable outside its bounds.
    ///
    /// # Return value
    ///
    /// Pairs of row and infeasibility, in increasing order of row.
    pub fn primal_infeasibilities<MP: MatrixProvider<F = F>>(
        &self,
        context: &SolverContext<F>,
        provider: &MP,
    ) -> Vec<(usize, F)> {
        (1..self.rhs.len())
            .map(|row| (row, self.infeasibility(context, provider, row)))
            .filter(|&(_, infeasibility)| infeasibility > F::zero())
            .collect()
    }

    /// Whether all basic variables are within their bounds.
    pub fn is_primal_feasible<MP: MatrixProvider<F = F>>(&self, context: &SolverContext<F>, provider: &MP) -> bool {
        (1..self.rhs.len()).all(|row| self.infeasibility(context, provider, row) == F::zero())
    }

    /// Objective value of the minimization problem.
    #[must_use]
    pub fn objective_value(&self) -> F {
        -self.rhs[0]
    }

    /// Values of the basic variables by position.
    #[must_use]
    pub fn rhs(&self) -> &[F] {
        &self.rhs
    }

    /// The current basis.
    #[must_use]
    pub fn basis(&self) -> &Basis {
        &self.basis
    }

    /// Number of iterations performed, by kind.
    #[must_use]
    pub fn iterations(&self) -> &EnumMap<Iteration, u64> {
        &self.iterations
    }

    /// Whether a refactorization is needed before iterating.
    #[must_use]
    pub fn state(&self) -> IteratorState {
        self.state
    }

    /// Require a refactorization before the next iteration.
    pub fn invalidate(&mut self) {
        self.state = IteratorState::NeedFactorize;
    }
}

/// The bound a leaving variable with a given value is closest to.
///
/// Fixed variables and variables without a finite upper bound go to their lower bound.
fn closest_side<F: Field, MP: MatrixProvider<F = F>>(
    context: &SolverContext<F>,
    provider: &MP,
    variable: usize,
    value: F,
) -> BoundSide {
    let lower = provider.lower_bound(variable);
    let upper = provider.upper_bound(variable);

    if provider.is_fixed(variable, context.tolerances.primal) || !upper.is_finite() {
        BoundSide::Lower
    } else if !lower.is_finite() || value - lower > upper - value {
        BoundSide::Upper
    } else {
        BoundSide::Lower
    }
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::algorithm::simplex::basis::Basis;
    use crate::algorithm::simplex::context::SolverContext;
    use crate::algorithm::simplex::factorization::BasisFactorization;
    use crate::algorithm::simplex::factorization::product_form::ProductForm;
    use crate::algorithm::simplex::iterator::{Iteration, IteratorState, SimplexIterator};
    use crate::algorithm::simplex::matrix_provider::matrix_data::MatrixData;
    use crate::data::linear_algebra::matrix::ColumnMajor;
    use crate::data::linear_program::elements::{BoundSide, ConstraintType, Objective};
    use crate::error::Error;

    /// Maximize `x + y` subject to `x + 2y <= 4`, `3x + y <= 6` and `0 <= x <= 1`, `y >= 0`.
    fn provider() -> MatrixData<f64> {
        MatrixData::new(
            ColumnMajor::from_dense(&[vec![1_f64, 2_f64], vec![3_f64, 1_f64]], 2),
            vec![1_f64, 1_f64],
            vec![4_f64, 6_f64],
            vec![ConstraintType::Less; 2],
            Objective::Maximize,
            vec![(0_f64, 1_f64), (0_f64, f64::INFINITY)],
        ).unwrap()
    }

    fn start(provider: &MatrixData<f64>) -> (SolverContext<f64>, ProductForm<f64>, SimplexIterator<f64>) {
        let context = SolverContext::default();
        let mut factorization = ProductForm::new(2);
        let mut iterator = SimplexIterator::new(Basis::slack(provider));
        assert_eq!(iterator.state(), IteratorState::NeedFactorize);
        iterator.refactorize(&context, &mut factorization, provider);
        assert_eq!(iterator.state(), IteratorState::Iterating);
        (context, factorization, iterator)
    }

    #[test]
    fn initial_solution() {
        let provider = provider();
        let (context, _, iterator) = start(&provider);
        assert_eq!(iterator.rhs(), &[0_f64, 4_f64, 6_f64]);
        assert!(iterator.is_primal_feasible(&context, &provider));
        assert_eq!(iterator.value(&provider, 3), 0_f64);
    }

    #[test]
    fn theta() {
        let provider = provider();
        let (context, _, iterator) = start(&provider);

        assert_abs_diff_eq!(iterator.compute_theta(&context, &provider, 2, 3_f64, 0_f64, true), 2_f64);
        let relaxed = iterator.compute_theta(&context, &provider, 2, 3_f64, 1_f64, true);
        assert!(relaxed > 2_f64);
        // Slacks have no upper bound
        assert_eq!(iterator.compute_theta(&context, &provider, 1, -1_f64, 0_f64, true), f64::INFINITY);
        assert_eq!(iterator.compute_theta(&context, &provider, 1, 1e-12, 0_f64, true), f64::INFINITY);
        // Feasible rows give no dual step
        assert_eq!(iterator.compute_theta(&context, &provider, 1, 1_f64, 0_f64, false), 0_f64);
    }

    #[test]
    fn bound_flip() {
        let provider = provider();
        let (context, mut factorization, mut iterator) = start(&provider);

        iterator.compute_pivot_column(&context, &factorization, &provider, 3);
        assert_eq!(iterator.pivot_column(), &[-1_f64, 1_f64, 3_f64]);
        assert!(iterator.is_bound_flip(&context, &provider, Some(2), 3, 2_f64, true));
        assert!(!iterator.is_bound_flip(&context, &provider, Some(2), 3, 0.5, true));
        // Dual steps move the entering variable into the basis, whatever the step length
        assert!(!iterator.is_bound_flip(&context, &provider, Some(2), 3, 2_f64, false));
        assert!(iterator.is_bound_flip(&context, &provider, None, 3, 1_f64, false));

        let kind = iterator.perform_iteration(&context, &mut factorization, &provider, Some(2), 3, 2_f64, true);
        assert_eq!(kind, Ok(Iteration::MinorBoundFlip));
        assert_eq!(iterator.basis().bound_side(3), BoundSide::Upper);
        assert_eq!(iterator.rhs(), &[1_f64, 3_f64, 3_f64]);
        assert_eq!(iterator.objective_value(), -1_f64);
        assert_eq!(factorization.eta_len(), 0);
        assert_eq!(iterator.iterations()[Iteration::MinorBoundFlip], 1);
    }

    #[test]
    fn major_pivot() {
        let provider = provider();
        let (context, mut factorization, mut iterator) = start(&provider);

        iterator.compute_pivot_column(&context, &factorization, &provider, 4);
        assert_eq!(iterator.pivot_column(), &[-1_f64, 2_f64, 1_f64]);
        let column = iterator.pivot_column().to_vec();
        factorization.prepare_update(&context, 1, 4, &column).unwrap();
        let kind = iterator.perform_iteration(&context, &mut factorization, &provider, Some(1), 4, 2_f64, true);
        assert_eq!(kind, Ok(Iteration::MajorPivot));

        assert_eq!(factorization.eta_len(), 1);
        assert_eq!(iterator.basis().position_of(4), Some(1));
        assert!(!iterator.basis().is_basic(1));
        assert_eq!(iterator.basis().bound_side(1), BoundSide::Lower);
        assert_abs_diff_eq!(iterator.rhs()[1], 2_f64);
        assert_abs_diff_eq!(iterator.rhs()[2], 4_f64);
        assert_abs_diff_eq!(iterator.objective_value(), -2_f64);

        // The incrementally updated values agree with values computed from scratch
        let updated = iterator.rhs().to_vec();
        iterator.recompute_solution(&context, &factorization, &provider);
        for (&expected, &actual) in updated.iter().zip(iterator.rhs()) {
            assert_abs_diff_eq!(expected, actual, epsilon = 1e-12);
        }
    }

    #[test]
    fn unstaged() {
        let provider = provider();
        let (context, mut factorization, mut iterator) = start(&provider);

        iterator.compute_pivot_column(&context, &factorization, &provider, 4);
        let result = iterator.perform_iteration(&context, &mut factorization, &provider, Some(1), 4, 2_f64, true);
        assert_eq!(result, Err(Error::NoStagedColumn));
        assert_eq!(iterator.rhs(), &[0_f64, 4_f64, 6_f64]);

        let result = iterator.perform_iteration(&context, &mut factorization, &provider, None, 4, 2_f64, true);
        assert_eq!(result, Err(Error::UnboundedFlip { variable: 4 }));
    }

    #[test]
    fn degeneracy() {
        let provider = MatrixData::nonnegative(
            ColumnMajor::from_dense(&[vec![1_f64, -1_f64], vec![1_f64, 1_f64]], 2),
            vec![-1_f64, -1_f64],
            vec![0_f64, 2_f64],
            vec![ConstraintType::Less; 2],
            Objective::Minimize,
        ).unwrap();
        let (context, factorization, mut iterator) = start(&provider);

        // The first slack is at its lower bound, increasing x decreases it
        iterator.compute_pivot_column(&context, &factorization, &provider, 3);
        let column = iterator.pivot_column().to_vec();
        assert!(iterator.check_degeneracy(&context, &provider, &column, 1_f64));

        // Increasing y increases it
        iterator.compute_pivot_column(&context, &factorization, &provider, 4);
        let column = iterator.pivot_column().to_vec();
        assert!(!iterator.check_degeneracy(&context, &provider, &column, 1_f64));
    }

    #[test]
    fn infeasibilities() {
        let provider = MatrixData::nonnegative(
            ColumnMajor::from_dense(&[vec![1_f64], vec![1_f64]], 1),
            vec![1_f64],
            vec![-1_f64, 2_f64],
            vec![ConstraintType::Less, ConstraintType::Greater],
            Objective::Minimize,
        ).unwrap();
        let (context, _, iterator) = start(&provider);

        assert!(!iterator.is_primal_feasible(&context, &provider));
        assert_eq!(iterator.primal_infeasibilities(&context, &provider), vec![(1, 1_f64), (2, 2_f64)]);
        assert_abs_diff_eq!(iterator.compute_theta(&context, &provider, 1, -1_f64, 0_f64, false), 1_f64);
        assert_abs_diff_eq!(iterator.compute_theta(&context, &provider, 2, 1_f64, 0_f64, false), 2_f64);
    }
}
