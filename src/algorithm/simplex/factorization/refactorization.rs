//! # Refactorization timing
//!
//! Each pivot makes the eta file longer and every later solve slower, while a refactorization
//! costs time once and gives a short eta file back. The average time per pivot since the last
//! refactorization, with the refactorization itself counted in, first drops as the cost of the
//! refactorization is amortized and then rises as the eta file grows. Refactorizing once that
//! average has grown clearly beyond its lowest value keeps the total cost low.
use std::time::{Duration, Instant};

use crate::config::RefactorizationPolicy;

/// Tracks the time spent since the last refactorization.
#[derive(Clone, Debug)]
pub struct RefactorizationClock {
    started: Instant,
    /// Lowest average time per pivot observed since the last refactorization.
    baseline: Option<Duration>,
}

impl RefactorizationClock {
    /// Start measuring now.
    #[must_use]
    pub fn new() -> Self {
        Self { started: Instant::now(), baseline: None }
    }

    /// Start measuring from a new refactorization.
    ///
    /// # Arguments
    ///
    /// * `started`: Moment at which the refactorization began.
    pub fn restart(&mut self, started: Instant) {
        self.started = started;
        self.baseline = None;
    }

    /// Time since the last restart.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Lowest average time per pivot seen since the last restart.
    #[must_use]
    pub fn baseline(&self) -> Option<Duration> {
        self.baseline
    }

    /// Decide whether to refactorize.
    ///
    /// The pivot cap is absolute. The timing rule only applies with at least two pivots, and
    /// during the warm-up fraction of the pivot cap it only records the baseline.
    ///
    /// # Arguments
    ///
    /// * `policy`: Cap and timing parameters.
    /// * `nr_pivots`: Pivots committed since the last refactorization.
    /// * `elapsed`: Time since the last refactorization started.
    ///
    /// # Return value
    ///
    /// Whether the basis should be factorized from scratch before the next pivot.
    pub fn should_refactorize(
        &mut self,
        policy: &RefactorizationPolicy,
        nr_pivots: usize,
        elapsed: Duration,
    ) -> bool {
        if nr_pivots >= policy.pivot_cap {
            return true;
        }
        if !policy.timed || nr_pivots <= 1 {
            return false;
        }

        let average = elapsed / u32::try_from(nr_pivots).unwrap_or(u32::MAX);
        let warming_up = (nr_pivots as f64) < policy.warm_up * policy.pivot_cap as f64;
        match self.baseline {
            Some(baseline) if average < baseline => {
                self.baseline = Some(average);
                false
            },
            Some(baseline) => {
                !warming_up
                    && average > policy.min_time_per_pivot
                    && average.as_secs_f64() > baseline.as_secs_f64() * policy.growth_factor
            },
            None => {
                self.baseline = Some(average);
                false
            },
        }
    }
}

impl Default for RefactorizationClock {
    fn default() -> Self {
        Self::new()
    }
}
