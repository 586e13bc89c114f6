//! # Owning model storage
//!
//! `MatrixData` is the default `MatrixProvider`: it stores a column major constraint matrix,
//! costs, the right hand side and bounds for all variables of the augmented system.
use cumsum::cumsum_array_owned;
use enum_map::{enum_map, EnumMap};

use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::data::linear_algebra::matrix::ColumnMajor;
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_program::elements::{ConstraintType, Objective, VariableKind};
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

/// Describes a linear program with constraints `A x + s = b` and simple bounds on all variables.
///
/// The slack of each row is bounded according to the type of the constraint:
///
/// * `a x <= b` gives `s` in `[0, inf)`,
/// * `a x >= b` gives `s` in `(-inf, 0]`,
/// * `a x == b` gives `s` in `[0, 0]`.
///
/// A range `r` on a row with constraint type `Less` or `Equal` gives `s` in `[0, r]`, one on a
/// `Greater` row gives `s` in `[-r, 0]`.
#[derive(Debug, Clone, PartialEq)]
pub struct MatrixData<F> {
    constraints: ColumnMajor<F>,
    /// Costs of the minimization problem, one per structural variable.
    cost: Vec<F>,
    b: Vec<F>,
    constraint_types: Vec<ConstraintType>,
    objective: Objective,

    /// Bounds indexed by variable, including the objective dummy at index `0`.
    lower: Vec<F>,
    upper: Vec<F>,

    /// Indices that separate the different groups of variables.
    group_end: EnumMap<VariableKind, usize>,
}

impl<F: Field> MatrixData<F> {
    /// Create a new `MatrixData` instance.
    ///
    /// # Arguments
    ///
    /// * `constraints`: Column major constraint matrix `A` with `m` rows and `n` columns.
    /// * `cost`: Objective coefficients in the direction of `objective`, one per column.
    /// * `b`: The problem's right hand side, one value per row.
    /// * `constraint_types`: Type of each row.
    /// * `objective`: Whether to minimize or maximize.
    /// * `bounds`: Lower and upper bound of each structural variable, infinities allowed.
    ///
    /// # Errors
    ///
    /// When the dimensions don't match or a lower bound exceeds its upper bound.
    pub fn new(
        constraints: ColumnMajor<F>,
        cost: Vec<F>,
        b: Vec<F>,
        constraint_types: Vec<ConstraintType>,
        objective: Objective,
        bounds: Vec<(F, F)>,
    ) -> Result<Self> {
        let m = constraints.nr_rows();
        let n = constraints.nr_columns();
        check_length("cost", n, cost.len())?;
        check_length("right hand side", m, b.len())?;
        check_length("constraint types", m, constraint_types.len())?;
        check_length("bounds", n, bounds.len())?;

        let cumulative = cumsum_array_owned([1, m, n]);
        let group_end = enum_map!{
            VariableKind::Objective  => cumulative[0],
            VariableKind::Slack      => cumulative[1],
            VariableKind::Structural => cumulative[2],
        };

        let cost = match objective {
            Objective::Minimize => cost,
            Objective::Maximize => cost.into_iter().map(|value| -value).collect(),
        };

        let mut lower = Vec::with_capacity(1 + m + n);
        let mut upper = Vec::with_capacity(1 + m + n);
        lower.push(F::neg_infinity());
        upper.push(F::infinity());
        for constraint_type in &constraint_types {
            let (l, u) = slack_bounds(*constraint_type);
            lower.push(l);
            upper.push(u);
        }
        for (j, &(l, u)) in bounds.iter().enumerate() {
            check_bounds(1 + m + j, l, u)?;
            lower.push(l);
            upper.push(u);
        }
        debug_assert_eq!(lower.len(), group_end[VariableKind::Structural]);

        Ok(Self { constraints, cost, b, constraint_types, objective, lower, upper, group_end })
    }

    /// Create a problem in which all structural variables are nonnegative.
    ///
    /// # Errors
    ///
    /// When the dimensions don't match.
    pub fn nonnegative(
        constraints: ColumnMajor<F>,
        cost: Vec<F>,
        b: Vec<F>,
        constraint_types: Vec<ConstraintType>,
        objective: Objective,
    ) -> Result<Self> {
        let bounds = vec![(F::zero(), F::infinity()); constraints.nr_columns()];
        Self::new(constraints, cost, b, constraint_types, objective, bounds)
    }

    /// Turn a constraint row into a ranged one.
    ///
    /// # Arguments
    ///
    /// * `row`: Constraint index in `0..m`.
    /// * `range`: Nonnegative width of the range.
    ///
    /// # Errors
    ///
    /// If the row doesn't exist or the range is negative.
    pub fn set_row_range(&mut self, row: usize, range: F) -> Result<()> {
        if row >= self.nr_rows() {
            return Err(Error::VariableOutOfRange { variable: row + 1, nr_variables: self.nr_variables() });
        }

        let slack = row + 1;
        let (lower, upper) = match self.constraint_types[row] {
            ConstraintType::Less | ConstraintType::Equal => (F::zero(), range),
            ConstraintType::Greater => (-range, F::zero()),
        };
        self.set_bounds(slack, lower, upper)
    }

    /// Change the bounds of a variable.
    ///
    /// Used between solves, for example when branching. The variable may be a slack.
    ///
    /// # Errors
    ///
    /// If the variable doesn't exist, is the objective dummy, or the bounds are inconsistent.
    pub fn set_bounds(&mut self, variable: usize, lower: F, upper: F) -> Result<()> {
        if variable == 0 || variable >= self.nr_variables() {
            return Err(Error::VariableOutOfRange { variable, nr_variables: self.nr_variables() });
        }
        check_bounds(variable, lower, upper)?;

        self.lower[variable] = lower;
        self.upper[variable] = upper;
        Ok(())
    }

    /// Classify a variable by its index.
    ///
    /// # Return value
    ///
    /// The group of the variable and its index within that group.
    #[must_use]
    pub fn variable_kind(&self, variable: usize) -> (VariableKind, usize) {
        debug_assert!(variable < self.nr_variables());

        if variable < self.group_end[VariableKind::Objective] {
            (VariableKind::Objective, variable)
        } else if variable < self.group_end[VariableKind::Slack] {
            (VariableKind::Slack, variable - self.group_end[VariableKind::Objective])
        } else {
            (VariableKind::Structural, variable - self.group_end[VariableKind::Slack])
        }
    }
}

impl<F: Field> MatrixProvider for MatrixData<F> {
    type F = F;

    fn nr_rows(&self) -> usize {
        self.constraints.nr_rows()
    }

    fn nr_columns(&self) -> usize {
        self.constraints.nr_columns()
    }

    fn basic_column(&self, variable: usize) -> Vec<SparseTuple<F>> {
        match self.variable_kind(variable) {
            (VariableKind::Objective, _) => vec![(0, F::one())],
            (VariableKind::Slack, i) => vec![(i + 1, F::one())],
            (VariableKind::Structural, j) => {
                let column = self.constraints.column(j);
                let mut augmented = Vec::with_capacity(column.len() + 1);
                if self.cost[j] != F::zero() {
                    augmented.push((0, self.cost[j]));
                }
                augmented.extend(column.iter().map(|&(i, value)| (i + 1, value)));
                augmented
            },
        }
    }

    fn right_hand_side(&self, row: usize) -> F {
        debug_assert!(row > 0 && row <= self.nr_rows());

        self.b[row - 1]
    }

    fn lower_bound(&self, variable: usize) -> F {
        self.lower[variable]
    }

    fn upper_bound(&self, variable: usize) -> F {
        self.upper[variable]
    }

    fn nonzeros(&self, variable: usize) -> usize {
        match self.variable_kind(variable) {
            (VariableKind::Structural, j) => self.constraints.column(j).len(),
            (VariableKind::Slack, _) => 1,
            (VariableKind::Objective, _) => 0,
        }
    }

    fn objective(&self) -> Objective {
        self.objective
    }
}

fn slack_bounds<F: Field>(constraint_type: ConstraintType) -> (F, F) {
    match constraint_type {
        ConstraintType::Less => (F::zero(), F::infinity()),
        ConstraintType::Greater => (F::neg_infinity(), F::zero()),
        ConstraintType::Equal => (F::zero(), F::zero()),
    }
}

fn check_length(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected == actual {
        Ok(())
    } else {
        Err(Error::DimensionMismatch { what, expected, actual })
    }
}

fn check_bounds<F: Field>(variable: usize, lower: F, upper: F) -> Result<()> {
    let consistent = !lower.is_nan() && !upper.is_nan()
        && lower <= upper
        && lower != F::infinity() && upper != F::neg_infinity();
    if consistent {
        Ok(())
    } else {
        Err(Error::InvalidBounds { variable, lower: lower.to_report(), upper: upper.to_report() })
    }
}
