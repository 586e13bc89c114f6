//! # Algorithms
//!
//! The simplex core and the types describing the outcome of a solve.
use std::fmt;

use crate::algorithm::simplex::Statistics;

pub mod simplex;

/// How a solve ended.
///
/// Only `Optimal` comes with an optimal solution. The interrupted statuses (`Timeout`, `UserAbort`
/// and `IterationLimit`) carry the values of the basis the solve stopped at.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Status {
    /// No improving direction exists from a feasible basis.
    Optimal,
    /// An improving direction without a blocking bound exists.
    Unbounded,
    /// No point satisfies all bounds and constraints.
    Infeasible,
    /// A pivot was too small even after refactorizing.
    NumericFailure,
    /// The time limit was reached.
    Timeout,
    /// The abort signal was set.
    UserAbort,
    /// The iteration limit was reached.
    IterationLimit,
}

impl Status {
    /// Whether the solution is optimal.
    #[must_use]
    pub fn is_optimal(self) -> bool {
        self == Status::Optimal
    }

    /// Whether the solve ended without an answer about the problem.
    #[must_use]
    pub fn is_terminal_failure(self) -> bool {
        self == Status::NumericFailure
    }

    /// Short lowercase name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Status::Optimal => "optimal",
            Status::Unbounded => "unbounded",
            Status::Infeasible => "infeasible",
            Status::NumericFailure => "numeric failure",
            Status::Timeout => "timeout",
            Status::UserAbort => "user abort",
            Status::IterationLimit => "iteration limit",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status and solution values at the end of a solve.
#[derive(Clone, Debug, PartialEq)]
pub struct SolveResult<F> {
    /// How the solve ended.
    pub status: Status,
    /// Objective value in the direction of optimization of the model.
    pub objective_value: F,
    /// Value of each structural variable.
    pub structural: Vec<F>,
    /// Value of each slack, `b - A x`.
    pub slack: Vec<F>,
    /// Value of the basic variable at each basis position; entry `0` is minus the objective value
    /// of the minimization problem.
    pub rhs: Vec<F>,
    /// Whether all variables are within their bounds.
    pub primal_feasible: bool,
    /// Counters.
    pub statistics: Statistics,
}
