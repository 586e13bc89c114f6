//! # The Simplex algorithm
//!
//! A bounded variable revised simplex method on the augmented system. The `Solver` drives a
//! `SimplexIterator` and a `BasisFactorization` from a starting basis to a terminal `Status`:
//! the dual method restores primal feasibility when the basis is infeasible, the primal method
//! optimizes from a feasible basis.
use std::sync::atomic::Ordering;
use std::time::Instant;

use enum_map::{Enum, EnumMap};
use tracing::{debug, warn};

use crate::algorithm::{SolveResult, Status};
use crate::algorithm::simplex::basis::Basis;
use crate::algorithm::simplex::context::SolverContext;
use crate::algorithm::simplex::factorization::BasisFactorization;
use crate::algorithm::simplex::factorization::product_form::ProductForm;
use crate::algorithm::simplex::iterator::{Iteration, IteratorState, SimplexIterator};
use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::algorithm::simplex::strategy::pricing::{Candidate, Dantzig, PricingRule};
use crate::config::{SingularPolicy, SolverConfig};
use crate::data::linear_algebra::vector::{inner_product, unit};
use crate::data::linear_program::elements::{BoundSide, Objective};
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

pub mod basis;
pub mod basis_stack;
pub mod context;
pub mod factorization;
pub mod iterator;
pub mod matrix_provider;
pub mod strategy;

/// The two methods the solver alternates between.
#[derive(Enum, Copy, Clone, Debug, Eq, PartialEq)]
pub enum Phase {
    /// Iterations that reduce bound violations of the basic variables.
    Dual,
    /// Iterations that improve the objective from a feasible basis.
    Primal,
}

/// Counters of a solve.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Statistics {
    /// Major pivots and bound flips.
    pub iterations: EnumMap<Iteration, u64>,
    /// Iterations by method.
    pub phases: EnumMap<Phase, u64>,
    /// Number of factorizations from scratch.
    pub refactorizations: u64,
    /// Columns rejected by those factorizations.
    pub singularities: u64,
    /// Pivots rejected for a too small pivot value.
    pub numeric_failures: u64,
    /// Major pivots with a step length of zero.
    pub degenerate_pivots: u64,
    /// Values stored in the factorization at the end of the solve.
    pub eta_nonzeros: usize,
    /// Update columns in the factorization at the end of the solve.
    pub eta_len: usize,
}

impl Statistics {
    /// Total number of iterations, major and minor.
    #[must_use]
    pub fn nr_iterations(&self) -> u64 {
        self.iterations.values().sum()
    }
}

/// Outcome of a single step of the solve loop.
enum Step {
    Iterated(Iteration),
    Done(Status),
}

/// Solves a linear program provided by a `MatrixProvider`.
///
/// The solver borrows the provider for its lifetime. To solve again after changing bounds, store
/// the basis (see `basis_stack::BasisStack`), create a new solver and hand it the stored basis.
pub struct Solver<'provider, F, MP, BF, PR> {
    provider: &'provider MP,
    config: SolverConfig,
    context: SolverContext<F>,
    factorization: BF,
    iterator: SimplexIterator<F>,
    pricing: PR,
    statistics: Statistics,
}

impl<'provider, F, MP> Solver<'provider, F, MP, ProductForm<F>, Dantzig>
where
    F: Field,
    MP: MatrixProvider<F = F>,
{
    /// Create a solver with the product form factorization and Dantzig pricing.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid.
    pub fn new(provider: &'provider MP, config: SolverConfig) -> Result<Self> {
        let factorization = ProductForm::new(provider.nr_rows());
        Self::with_components(provider, config, factorization, Dantzig)
    }
}

impl<'provider, F, MP, BF, PR> Solver<'provider, F, MP, BF, PR>
where
    F: Field,
    MP: MatrixProvider<F = F>,
    BF: BasisFactorization<F = F>,
    PR: PricingRule<F>,
{
    /// Create a solver with a specific factorization and pricing rule.
    ///
    /// The solve starts from the all-slack basis unless another basis is set.
    ///
    /// # Arguments
    ///
    /// * `provider`: The model.
    /// * `config`: Tolerances, policies and limits.
    /// * `factorization`: A representation created for `provider.nr_rows()` rows.
    /// * `pricing`: Rule to select entering variables and leaving rows.
    ///
    /// # Errors
    ///
    /// If the configuration is invalid.
    pub fn with_components(
        provider: &'provider MP,
        config: SolverConfig,
        factorization: BF,
        pricing: PR,
    ) -> Result<Self> {
        let context = SolverContext::new(&config)?;
        let iterator = SimplexIterator::new(Basis::slack(provider));

        Ok(Self {
            provider,
            config,
            context,
            factorization,
            iterator,
            pricing,
            statistics: Statistics::default(),
        })
    }

    /// The current basis.
    #[must_use]
    pub fn basis(&self) -> &Basis {
        self.iterator.basis()
    }

    /// Start the next solve from another basis.
    ///
    /// # Errors
    ///
    /// If the basis doesn't have the dimensions of the model or is internally inconsistent.
    pub fn set_basis(&mut self, basis: Basis) -> Result<()> {
        if basis.nr_rows() != self.provider.nr_rows() {
            return Err(Error::DimensionMismatch {
                what: "basis rows", expected: self.provider.nr_rows(), actual: basis.nr_rows(),
            });
        }
        if basis.nr_variables() != self.provider.nr_variables() {
            return Err(Error::DimensionMismatch {
                what: "basis variables", expected: self.provider.nr_variables(), actual: basis.nr_variables(),
            });
        }
        if !basis.is_consistent() {
            return Err(Error::InvalidBasis("position map doesn't match the basic variables".to_string()));
        }

        self.iterator.set_basis(basis);
        self.factorization.force_refactorization();
        Ok(())
    }

    /// The validated configuration of this solver.
    #[must_use]
    pub fn context(&self) -> &SolverContext<F> {
        &self.context
    }

    /// The basis representation.
    #[must_use]
    pub fn factorization(&self) -> &BF {
        &self.factorization
    }

    /// Counters accumulated over all solves of this solver.
    #[must_use]
    pub fn statistics(&self) -> Statistics {
        let mut statistics = self.statistics.clone();
        statistics.iterations = *self.iterator.iterations();
        statistics.eta_nonzeros = self.factorization.nr_nonzeros();
        statistics.eta_len = self.factorization.eta_len();
        statistics
    }

    /// Iterate until a terminal status is reached.
    ///
    /// # Return value
    ///
    /// The status together with the values of the last basis. Only an optimal status comes with
    /// an optimal solution; interrupted solves report the values of the basis they stopped at.
    ///
    /// # Errors
    ///
    /// Only for inconsistencies between the factorization and the iterator. Numerical trouble
    /// that can't be recovered from is reported as `Status::NumericFailure`.
    pub fn solve(&mut self) -> Result<SolveResult<F>> {
        let started = Instant::now();
        let mut recovering = false;

        let status = loop {
            let needs_factorization = self.iterator.state() == IteratorState::NeedFactorize;
            if needs_factorization || self.factorization.must_refactorize(&self.context) {
                let result = self.iterator.refactorize(&self.context, &mut self.factorization, self.provider);
                self.statistics.refactorizations += 1;
                self.statistics.singularities += result.singularity_count() as u64;
                if result.singularity_count() > 0 && self.config.singular_policy == SingularPolicy::Fail {
                    break Status::Infeasible;
                }
            }

            let step = if self.iterator.is_primal_feasible(&self.context, self.provider) {
                self.primal_step()
            } else {
                self.dual_step()
            };
            match step {
                Ok(Step::Done(status)) => break status,
                Ok(Step::Iterated(kind)) => {
                    if kind == Iteration::MajorPivot {
                        recovering = false;
                    }
                },
                Err(Error::NumericFailure { row, variable, value }) => {
                    self.statistics.numeric_failures += 1;
                    if recovering {
                        warn!(
                            component = "solver",
                            operation = "solve",
                            row,
                            variable,
                            value,
                            "numeric failure against a fresh factorization"
                        );
                        break Status::NumericFailure;
                    }
                    recovering = true;
                    self.factorization.force_refactorization();
                    continue;
                },
                Err(error) => return Err(error),
            }

            if let Some(status) = self.interruption(started) {
                break status;
            }
        };

        let result = self.result(status);
        debug!(
            component = "solver",
            operation = "solve",
            status = %status,
            objective = result.objective_value.to_report(),
            iterations = result.statistics.nr_iterations(),
            refactorizations = result.statistics.refactorizations,
            elapsed = ?started.elapsed()
        );
        Ok(result)
    }

    /// A primal iteration, or the conclusion that the basis is optimal or the problem unbounded.
    fn primal_step(&mut self) -> Result<Step> {
        let mut multipliers = unit(0, self.provider.nr_rows() + 1);
        self.factorization.btran(&self.context, &mut multipliers);

        let mut candidates = self.primal_candidates(&multipliers);
        let Some(index) = self.pricing.select_entering(&candidates) else {
            return Ok(Step::Done(Status::Optimal));
        };
        let chosen = self.avoid_degeneracy(&mut candidates, index);

        let (leaving_row, step_length) = self.primal_ratio_test(chosen.direction);
        let range = self.provider.range(chosen.variable);
        let theta = match leaving_row {
            Some(_) => chosen.direction * step_length,
            None if range.is_finite() => chosen.direction * range,
            None => return Ok(Step::Done(Status::Unbounded)),
        };

        let kind = self.pivot(leaving_row, chosen.variable, theta, true)?;
        if kind == Iteration::MajorPivot && step_length <= self.context.tolerances.primal {
            self.statistics.degenerate_pivots += 1;
        }
        Ok(Step::Iterated(kind))
    }

    /// Improving nonbasic variables, with the direction in which they would move.
    fn primal_candidates(&self, multipliers: &[F]) -> Vec<Candidate<F>> {
        let tolerances = &self.context.tolerances;
        let one = F::one();

        self.iterator.basis().nonbasic_variables()
            .filter(|&variable| !self.provider.is_fixed(variable, tolerances.primal))
            .filter_map(|variable| {
                let reduced_cost = inner_product(multipliers, &self.provider.basic_column(variable));
                let direction = match self.iterator.effective_side(self.provider, variable) {
                    Some(BoundSide::Lower) if reduced_cost < -tolerances.dual => one,
                    Some(BoundSide::Upper) if reduced_cost > tolerances.dual => -one,
                    None if reduced_cost.abs() > tolerances.dual => -reduced_cost.signum(),
                    _ => return None,
                };
                Some(Candidate { variable, reduced_cost, direction })
            })
            .collect()
    }

    /// Replace a chosen candidate that is likely to give a degenerate pivot.
    ///
    /// Up to the configured number of alternatives is offered to the pricing rule; the first
    /// that is not likely degenerate is used. The original choice stands otherwise. The pivot
    /// column of the returned candidate is in the iterator's buffer.
    fn avoid_degeneracy(&mut self, candidates: &mut Vec<Candidate<F>>, index: usize) -> Candidate<F> {
        let chosen = candidates.remove(index);
        self.iterator.compute_pivot_column(&self.context, &self.factorization, self.provider, chosen.variable);
        if !self.is_degenerate(chosen.direction) {
            return chosen;
        }

        for _ in 0..self.config.degeneracy_retries {
            let Some(alternative) = self.pricing.select_entering(candidates) else { break };
            let candidate = candidates.remove(alternative);
            self.iterator.compute_pivot_column(&self.context, &self.factorization, self.provider, candidate.variable);
            if !self.is_degenerate(candidate.direction) {
                return candidate;
            }
        }

        self.iterator.compute_pivot_column(&self.context, &self.factorization, self.provider, chosen.variable);
        chosen
    }

    fn is_degenerate(&self, direction: F) -> bool {
        self.iterator.check_degeneracy(&self.context, self.provider, self.iterator.pivot_column(), direction)
    }

    /// Harris two pass ratio test on the pivot column in the iterator's buffer.
    ///
    /// The first pass finds the smallest step with bounds relaxed by the Harris tolerance. The
    /// second pass chooses, among the rows that block within that step on the exact bounds, the
    /// one with the largest pivot column value.
    ///
    /// # Return value
    ///
    /// The blocking row, if any, and the nonnegative step length.
    fn primal_ratio_test(&self, direction: F) -> (Option<usize>, F) {
        let tolerances = &self.context.tolerances;
        let column = self.iterator.pivot_column();

        let mut bound = F::infinity();
        for (row, &alpha) in column.iter().enumerate().skip(1) {
            if alpha.abs() >= tolerances.ratio_pivot {
                let theta = self.iterator.compute_theta(
                    &self.context, self.provider, row, direction * alpha, tolerances.harris, true,
                );
                bound = bound.min(theta);
            }
        }
        if !bound.is_finite() {
            return (None, F::infinity());
        }

        let mut best: Option<(usize, F, F)> = None;
        for (row, &alpha) in column.iter().enumerate().skip(1) {
            if alpha.abs() < tolerances.ratio_pivot {
                continue;
            }
            let theta = self.iterator.compute_theta(
                &self.context, self.provider, row, direction * alpha, F::zero(), true,
            );
            if theta <= bound && best.is_none_or(|(_, largest, _)| alpha.abs() > largest) {
                best = Some((row, alpha.abs(), theta));
            }
        }

        match best {
            Some((row, _, theta)) => (Some(row), theta),
            None => (None, F::infinity()),
        }
    }

    /// A dual iteration, or the conclusion that the problem is infeasible.
    fn dual_step(&mut self) -> Result<Step> {
        let infeasibilities = self.iterator.primal_infeasibilities(&self.context, self.provider);
        let Some(index) = self.pricing.select_leaving(&infeasibilities) else {
            return self.primal_step();
        };
        let (row, _) = infeasibilities[index];

        let len = self.provider.nr_rows() + 1;
        let mut multipliers = unit(0, len);
        let mut pivot_row = unit(row, len);
        self.factorization.btran_double(&self.context, &mut multipliers, &mut pivot_row);

        let leaving = self.iterator.basis().variable_at(row);
        let increase = self.iterator.rhs()[row] < self.provider.lower_bound(leaving);
        let Some((entering, direction)) = self.dual_entering(&multipliers, &pivot_row, increase) else {
            return Ok(Step::Done(Status::Infeasible));
        };

        self.iterator.compute_pivot_column(&self.context, &self.factorization, self.provider, entering);
        let alpha = self.iterator.pivot_column()[row];
        let mut theta = self.iterator.compute_theta(&self.context, self.provider, row, alpha, F::zero(), false);
        if theta * direction < F::zero() {
            theta = F::zero();
        }

        self.pivot(Some(row), entering, theta, false).map(Step::Iterated)
    }

    /// Choose the entering variable of a dual iteration.
    ///
    /// A variable is eligible if moving it away from its bound moves the leaving variable towards
    /// the bound it violates. If all reduced costs have the right sign, a Harris ratio test on
    /// the reduced costs keeps them that way; otherwise the largest pivot row value is taken.
    ///
    /// # Arguments
    ///
    /// * `multipliers`: Row `0` of the basis inverse.
    /// * `pivot_row`: Row of the basis inverse of the leaving variable.
    /// * `increase`: Whether the leaving variable is below its lower bound.
    ///
    /// # Return value
    ///
    /// The entering variable and the direction in which it moves, `None` if no variable is
    /// eligible.
    fn dual_entering(
        &self,
        multipliers: &[F],
        pivot_row: &[F],
        increase: bool,
    ) -> Option<(usize, F)> {
        let tolerances = &self.context.tolerances;
        let zero = F::zero();
        let one = F::one();

        let mut dual_feasible = true;
        // Variable, direction, |alpha| and the reduced cost in the direction of movement
        let mut eligible = Vec::new();
        for variable in self.iterator.basis().nonbasic_variables() {
            if self.provider.is_fixed(variable, tolerances.primal) {
                continue;
            }

            let column = self.provider.basic_column(variable);
            let reduced_cost = inner_product(multipliers, &column);
            let side = self.iterator.effective_side(self.provider, variable);
            dual_feasible &= match side {
                Some(BoundSide::Lower) => reduced_cost >= -tolerances.dual,
                Some(BoundSide::Upper) => reduced_cost <= tolerances.dual,
                None => reduced_cost.abs() <= tolerances.dual,
            };

            let alpha = inner_product(pivot_row, &column);
            if alpha.abs() < tolerances.ratio_pivot {
                continue;
            }
            let direction = match side {
                Some(BoundSide::Lower) => one,
                Some(BoundSide::Upper) => -one,
                None if increase => -alpha.signum(),
                None => alpha.signum(),
            };
            // Change of the leaving variable per unit of movement
            let rate = -direction * alpha;
            if (increase && rate > zero) || (!increase && rate < zero) {
                eligible.push((variable, direction, alpha.abs(), (direction * reduced_cost).max(zero)));
            }
        }

        let candidates = eligible.iter().map(|&(variable, direction, alpha, _)| (variable, direction, alpha));
        if !dual_feasible {
            return largest_pivot(candidates);
        }

        let relaxation = tolerances.dual * tolerances.harris;
        let bound = eligible.iter()
            .map(|&(_, _, alpha, cost)| (cost + relaxation) / alpha)
            .fold(F::infinity(), F::min);
        largest_pivot(
            eligible.iter()
                .filter(|&&(_, _, alpha, cost)| cost / alpha <= bound)
                .map(|&(variable, direction, alpha, _)| (variable, direction, alpha)),
        )
    }

    /// Stage, when needed, and perform an iteration with the pivot column in the iterator's
    /// buffer.
    fn pivot(&mut self, leaving_row: Option<usize>, entering: usize, theta: F, is_primal: bool) -> Result<Iteration> {
        let is_flip = self.iterator.is_bound_flip(
            &self.context, self.provider, leaving_row, entering, theta, is_primal,
        );
        if let (false, Some(row)) = (is_flip, leaving_row) {
            self.factorization.prepare_update(&self.context, row, entering, self.iterator.pivot_column())?;
        }

        let kind = self.iterator.perform_iteration(
            &self.context, &mut self.factorization, self.provider, leaving_row, entering, theta, is_primal,
        )?;
        let phase = if is_primal { Phase::Primal } else { Phase::Dual };
        self.statistics.phases[phase] += 1;

        Ok(kind)
    }

    /// Check the abort signal and the limits.
    fn interruption(&self, started: Instant) -> Option<Status> {
        if self.config.abort.as_ref().is_some_and(|abort| abort.load(Ordering::Relaxed)) {
            return Some(Status::UserAbort);
        }
        if self.config.time_limit.is_some_and(|limit| started.elapsed() >= limit) {
            return Some(Status::Timeout);
        }
        let iterations = self.iterator.iterations().values().sum::<u64>();
        if self.config.iteration_limit.is_some_and(|limit| iterations >= limit) {
            return Some(Status::IterationLimit);
        }

        None
    }

    fn result(&self, status: Status) -> SolveResult<F> {
        let m = self.provider.nr_rows();
        let n = self.provider.nr_columns();
        let value = |variable| self.iterator.value(self.provider, variable);

        let objective_value = match self.provider.objective() {
            Objective::Minimize => self.iterator.objective_value(),
            Objective::Maximize => -self.iterator.objective_value(),
        };

        SolveResult {
            status,
            objective_value,
            structural: (m + 1..=m + n).map(value).collect(),
            slack: (1..=m).map(value).collect(),
            rhs: self.iterator.rhs().to_vec(),
            primal_feasible: self.iterator.is_primal_feasible(&self.context, self.provider),
            statistics: self.statistics(),
        }
    }
}

/// The variable and direction of the candidate with the largest pivot row value.
///
/// Ties are broken in favor of the first candidate.
fn largest_pivot<F: Field>(candidates: impl Iterator<Item = (usize, F, F)>) -> Option<(usize, F)> {
    let mut best: Option<(usize, F, F)> = None;
    for (variable, direction, alpha) in candidates {
        if best.is_none_or(|(_, _, largest)| alpha > largest) {
            best = Some((variable, direction, alpha));
        }
    }

    best.map(|(variable, direction, _)| (variable, direction))
}
