//! # Basis bookkeeping
//!
//! Which variable occupies which basis position, and at which bound each nonbasic variable rests.
//! The objective dummy `0` permanently occupies position `0`.
use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::data::linear_program::elements::BoundSide;
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

/// A basis of the augmented system together with the bound state of the nonbasic variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Basis {
    nr_rows: usize,
    /// Variable at each position `0..=m`.
    basic_variables: Vec<usize>,
    /// Position of each variable, `None` if nonbasic.
    position: Vec<Option<usize>>,
    /// Bound side of each variable, only meaningful for nonbasic variables.
    bound_side: Vec<BoundSide>,
}

impl Basis {
    /// The all-slack basis, with every structural variable at a finite bound when it has one.
    #[must_use]
    pub fn slack<MP: MatrixProvider>(provider: &MP) -> Self {
        let nr_rows = provider.nr_rows();
        let nr_variables = provider.nr_variables();

        let basic_variables = (0..=nr_rows).collect::<Vec<_>>();
        let position = (0..nr_variables)
            .map(|variable| if variable <= nr_rows { Some(variable) } else { None })
            .collect();
        let bound_side = (0..nr_variables)
            .map(|variable| initial_side(provider, variable))
            .collect();

        Self { nr_rows, basic_variables, position, bound_side }
    }

    /// Create a basis from explicit parts.
    ///
    /// # Arguments
    ///
    /// * `nr_rows`: Number of constraints `m`.
    /// * `basic`: The `m` basic variables in order of their position `1..=m`. Must not contain the
    /// objective dummy.
    /// * `bound_side`: A bound side for each of the `1 + m + n` variables.
    ///
    /// # Errors
    ///
    /// If the number of basic variables is not `m`, a variable is out of range or repeated.
    pub fn from_parts(nr_rows: usize, basic: &[usize], bound_side: Vec<BoundSide>) -> Result<Self> {
        let nr_variables = bound_side.len();
        if basic.len() != nr_rows {
            return Err(Error::DimensionMismatch { what: "basic variables", expected: nr_rows, actual: basic.len() });
        }
        if nr_variables < 1 + nr_rows {
            return Err(Error::DimensionMismatch {
                what: "bound sides", expected: 1 + nr_rows, actual: nr_variables,
            });
        }

        let mut basic_variables = Vec::with_capacity(nr_rows + 1);
        basic_variables.push(0);
        let mut position = vec![None; nr_variables];
        position[0] = Some(0);
        for (index, &variable) in basic.iter().enumerate() {
            if variable >= nr_variables {
                return Err(Error::VariableOutOfRange { variable, nr_variables });
            }
            if position[variable].is_some() {
                return Err(Error::InvalidBasis(format!("variable {variable} appears more than once")));
            }
            position[variable] = Some(index + 1);
            basic_variables.push(variable);
        }

        Ok(Self { nr_rows, basic_variables, position, bound_side })
    }

    /// Number of constraints `m`.
    #[must_use]
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Number of variables, including the objective dummy.
    #[must_use]
    pub fn nr_variables(&self) -> usize {
        self.position.len()
    }

    /// The variable at a basis position.
    #[must_use]
    pub fn variable_at(&self, row: usize) -> usize {
        self.basic_variables[row]
    }

    /// The basis position of a variable, if it is basic.
    #[must_use]
    pub fn position_of(&self, variable: usize) -> Option<usize> {
        self.position[variable]
    }

    /// Whether a variable is basic.
    #[must_use]
    pub fn is_basic(&self, variable: usize) -> bool {
        self.position[variable].is_some()
    }

    /// The variables at positions `1..=m`.
    #[must_use]
    pub fn basic_variables(&self) -> &[usize] {
        &self.basic_variables[1..]
    }

    /// Number of basic variables, the objective dummy excluded.
    #[must_use]
    pub fn nr_basic(&self) -> usize {
        self.position.iter().skip(1).filter(|position| position.is_some()).count()
    }

    /// All nonbasic variables in increasing order.
    pub fn nonbasic_variables(&self) -> impl Iterator<Item = usize> + '_ {
        self.position.iter()
            .enumerate()
            .filter(|(_, position)| position.is_none())
            .map(|(variable, _)| variable)
    }

    /// Stored bound side of a variable.
    #[must_use]
    pub fn bound_side(&self, variable: usize) -> BoundSide {
        self.bound_side[variable]
    }

    /// Change the stored bound side of a variable.
    pub fn set_bound_side(&mut self, variable: usize, side: BoundSide) {
        self.bound_side[variable] = side;
    }

    /// Move a nonbasic variable to its other bound.
    pub fn flip_bound(&mut self, variable: usize) {
        debug_assert!(!self.is_basic(variable));

        self.bound_side[variable] = !self.bound_side[variable];
    }

    /// Replace the variable at a basis position.
    ///
    /// # Arguments
    ///
    /// * `row`: Position in `1..=m`.
    /// * `entering`: A nonbasic variable.
    ///
    /// # Return value
    ///
    /// The variable that left the basis.
    pub fn exchange(&mut self, row: usize, entering: usize) -> usize {
        debug_assert!(row > 0 && row <= self.nr_rows);
        debug_assert!(!self.is_basic(entering));

        let leaving = self.basic_variables[row];
        self.basic_variables[row] = entering;
        self.position[leaving] = None;
        self.position[entering] = Some(row);

        debug_assert!(self.is_consistent());
        leaving
    }

    /// Adopt the positions reported by a factorization.
    ///
    /// Variables that lost their position become nonbasic at the bound they are placed at
    /// initially.
    ///
    /// # Arguments
    ///
    /// * `positions`: Variable at each position `0..=m`.
    /// * `provider`: Bounds, for the variables that become nonbasic.
    pub fn apply_positions<MP: MatrixProvider>(&mut self, positions: &[usize], provider: &MP) {
        debug_assert_eq!(positions.len(), self.nr_rows + 1);
        debug_assert_eq!(positions[0], 0);

        let previous = self.basic_variables.clone();
        for &variable in &previous {
            self.position[variable] = None;
        }
        for (row, &variable) in positions.iter().enumerate() {
            self.position[variable] = Some(row);
        }
        for &variable in &previous {
            if self.position[variable].is_none() {
                self.bound_side[variable] = initial_side(provider, variable);
            }
        }
        self.basic_variables = positions.to_vec();

        debug_assert!(self.is_consistent());
    }

    /// Whether two bases have the same basic variables, regardless of position, and their
    /// nonbasic variables rest at the same bounds.
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        self.nr_variables() == other.nr_variables()
            && (0..self.nr_variables()).all(|variable| {
                match (self.is_basic(variable), other.is_basic(variable)) {
                    (true, true) => true,
                    (false, false) => self.bound_side[variable] == other.bound_side[variable],
                    _ => false,
                }
            })
    }

    /// Whether the position map and the list of basic variables describe the same `m + 1`
    /// variables.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        self.basic_variables.len() == self.nr_rows + 1
            && self.basic_variables[0] == 0
            && self.basic_variables.iter()
                .enumerate()
                .all(|(row, &variable)| self.position[variable] == Some(row))
            && self.position.iter().filter(|position| position.is_some()).count() == self.nr_rows + 1
    }
}

/// The bound a variable is placed at when it becomes nonbasic without a better indication.
///
/// The lower bound if it is finite, otherwise the upper bound if that is finite.
pub(crate) fn initial_side<F: Field, MP: MatrixProvider<F = F>>(provider: &MP, variable: usize) -> BoundSide {
    let lower = provider.lower_bound(variable);
    let upper = provider.upper_bound(variable);
    if lower.is_finite() || !upper.is_finite() {
        BoundSide::Lower
    } else {
        BoundSide::Upper
    }
}

/// The bound a nonbasic variable is effectively at.
///
/// # Return value
///
/// The stored side if that bound is finite, otherwise the side of the finite bound, and `None`
/// for a free variable.
pub(crate) fn effective_side<F: Field>(side: BoundSide, lower: F, upper: F) -> Option<BoundSide> {
    match (side, lower.is_finite(), upper.is_finite()) {
        (BoundSide::Lower, true, _) | (BoundSide::Upper, true, false) => Some(BoundSide::Lower),
        (BoundSide::Upper, _, true) | (BoundSide::Lower, false, true) => Some(BoundSide::Upper),
        (_, false, false) => None,
    }
}
