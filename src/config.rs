//! # Solver configuration
//!
//! All tunable numbers of the core live here, as plain `f64`s and durations. A `SolverConfig` is
//! validated and converted into the number type of a solve once, see
//! `algorithm::simplex::context::SolverContext`.
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// Numerical tolerances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    /// Amount by which a basic variable may violate a bound and still be considered feasible.
    pub primal: f64,
    /// Amount by which a reduced cost may have the wrong sign at an optimum.
    pub dual: f64,
    /// Multiple of the machine epsilon below which a pivot value causes a numeric failure.
    pub pivot_epsilon_scale: f64,
    /// Pivot column values of smaller magnitude are ignored in ratio tests.
    pub ratio_pivot: f64,
    /// Smallest magnitude accepted as a pivot while factorizing; smaller makes a column singular.
    pub factorization_pivot: f64,
    /// Entries of a solve result smaller than this fraction of the largest entry are dropped.
    pub drop: f64,
    /// Multiple of `primal` by which the first pass of the Harris ratio test relaxes bounds.
    ///
    /// Zero gives the textbook ratio test.
    pub harris_scale: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            primal: 5.01e-7,
            dual: 1e-6,
            pivot_epsilon_scale: 1e5,
            ratio_pivot: 1e-9,
            factorization_pivot: 1e-10,
            drop: 1e-12,
            harris_scale: 1.0,
        }
    }
}

/// When to discard the eta file and factorize the basis from scratch.
///
/// A refactorization is always done after `pivot_cap` pivots. Before that, if `timed` is set, the
/// average time per pivot since the last refactorization (the refactorization itself included) is
/// compared to the lowest such average seen so far. When it has grown by more than
/// `growth_factor`, the eta file has become expensive enough to rebuild.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RefactorizationPolicy {
    /// Hard limit on the number of pivots between two refactorizations.
    pub pivot_cap: usize,
    /// Whether the timing based trigger is enabled.
    pub timed: bool,
    /// Factor by which the average time per pivot may exceed its baseline.
    pub growth_factor: f64,
    /// Fraction of `pivot_cap` during which the timing trigger only records its baseline.
    pub warm_up: f64,
    /// Averages below this duration never trigger a refactorization.
    pub min_time_per_pivot: Duration,
}

impl Default for RefactorizationPolicy {
    fn default() -> Self {
        Self {
            pivot_cap: 250,
            timed: true,
            growth_factor: 1.5,
            warm_up: 0.4,
            min_time_per_pivot: Duration::from_micros(1),
        }
    }
}

/// How the factorization picks a pivot row for a column that is not a singleton.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum RowSelection {
    /// The free row with the largest absolute value.
    #[default]
    LargestMagnitude,
    /// Among free rows with a value of at least `threshold` times the largest absolute value, the
    /// one with the fewest remaining nonzeros.
    Markowitz {
        /// Relative threshold in `(0, 1]`.
        threshold: f64,
    },
}

/// What to do when a refactorization finds singular columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SingularPolicy {
    /// Keep the slacks of the singular rows basic and continue.
    #[default]
    Repair,
    /// Stop and report the model as infeasible.
    Fail,
}

/// Configuration of a solve.
#[derive(Debug, Clone)]
pub struct SolverConfig {
    /// Numerical tolerances.
    pub tolerances: Tolerances,
    /// Refactorization frequency.
    pub refactorization: RefactorizationPolicy,
    /// Pivot row selection during factorization.
    pub row_selection: RowSelection,
    /// Handling of singular bases.
    pub singular_policy: SingularPolicy,
    /// Number of alternative entering candidates tried when the chosen one is likely degenerate.
    pub degeneracy_retries: usize,
    /// Wall time budget. `None` means no limit.
    pub time_limit: Option<Duration>,
    /// Limit on the number of iterations, major and minor. `None` means no limit.
    pub iteration_limit: Option<u64>,
    /// Set by the caller to stop the solve at the next iteration.
    pub abort: Option<Arc<AtomicBool>>,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            refactorization: RefactorizationPolicy::default(),
            row_selection: RowSelection::default(),
            singular_policy: SingularPolicy::default(),
            degeneracy_retries: 3,
            time_limit: None,
            iteration_limit: None,
            abort: None,
        }
    }
}

impl SolverConfig {
    /// Create a new configuration with all defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the numerical tolerances.
    #[must_use]
    pub fn with_tolerances(mut self, tolerances: Tolerances) -> Self {
        self.tolerances = tolerances;
        self
    }

    /// Set the refactorization policy.
    #[must_use]
    pub fn with_refactorization(mut self, policy: RefactorizationPolicy) -> Self {
        self.refactorization = policy;
        self
    }

    /// Set only the pivot cap of the refactorization policy.
    #[must_use]
    pub fn with_pivot_cap(mut self, pivot_cap: usize) -> Self {
        self.refactorization.pivot_cap = pivot_cap;
        self
    }

    /// Set the pivot row selection rule of the factorization.
    #[must_use]
    pub fn with_row_selection(mut self, row_selection: RowSelection) -> Self {
        self.row_selection = row_selection;
        self
    }

    /// Set the handling of singular bases.
    #[must_use]
    pub fn with_singular_policy(mut self, policy: SingularPolicy) -> Self {
        self.singular_policy = policy;
        self
    }

    /// Set the number of alternatives tried for a likely degenerate entering candidate.
    #[must_use]
    pub fn with_degeneracy_retries(mut self, retries: usize) -> Self {
        self.degeneracy_retries = retries;
        self
    }

    /// Set the wall time budget.
    #[must_use]
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Set the iteration limit.
    #[must_use]
    pub fn with_iteration_limit(mut self, limit: u64) -> Self {
        self.iteration_limit = Some(limit);
        self
    }

    /// Set the flag polled for cooperative cancellation.
    #[must_use]
    pub fn with_abort_signal(mut self, signal: Arc<AtomicBool>) -> Self {
        self.abort = Some(signal);
        self
    }
}
