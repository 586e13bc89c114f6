//! # Building blocks to describe linear programs.
use std::ops::{Neg, Not};

use enum_map::Enum;
use num_traits::One;

/// A `Constraint` is a type of (in)equality.
///
/// Each constraint row `i` gets a slack `s_i` such that `a_i x + s_i = b_i`, the type determines
/// the bounds of that slack.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ConstraintType {
    Equal,
    Greater,
    Less,
}

/// Side of the bound at which a nonbasic variable rests.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BoundSide {
    /// At the lower bound, or free and valued at zero when no bound is finite.
    Lower,
    /// At the upper bound.
    Upper,
}

impl BoundSide {
    /// The direction in which a variable at this bound can move.
    ///
    /// A variable at its lower bound can only increase, one at its upper bound can only decrease.
    #[must_use]
    pub fn direction<F: One + Neg<Output = F>>(self) -> F {
        match self {
            BoundSide::Lower => F::one(),
            BoundSide::Upper => -F::one(),
        }
    }
}

impl Not for BoundSide {
    type Output = Self;

    fn not(self) -> Self::Output {
        match self {
            Self::Lower => Self::Upper,
            Self::Upper => Self::Lower,
        }
    }
}

impl Default for BoundSide {
    fn default() -> Self {
        BoundSide::Lower
    }
}

/// The three groups of variables in the augmented system.
///
/// Index `0` is the objective function, `1..=m` are the slacks and `m + 1..=m + n` are the
/// structural variables.
#[allow(missing_docs)]
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum VariableKind {
    Objective,
    Slack,
    Structural,
}

/// Direction of optimization.
#[allow(missing_docs)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Objective {
    Maximize,
    Minimize,
}

impl Default for Objective {
    fn default() -> Self {
        Objective::Minimize
    }
}
