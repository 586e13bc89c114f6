//! # Product form of the inverse
//!
//! Factorizes a basis into a sequence of eta columns. Basic slacks need no column at all; the
//! structural columns are ordered such that as many as possible can be stored without any
//! transformation:
//!
//! 1. A row singleton, a free row with a single remaining candidate, is pivoted on directly.
//! 2. A column singleton, a candidate with a single nonzero in the free rows, is assigned that row
//! but stored only at the very end, in reverse order, after which its column is still untouched by
//! all eta columns before it.
//! 3. The remaining candidates are transformed by the eta columns built so far and pivoted on in
//! minimum degree order.
use std::time::Instant;

use fifo_set::FIFOSet;
use index_utils::remove_indices;
use itertools::Itertools;
use tracing::{debug, trace, warn};

use crate::algorithm::simplex::context::SolverContext;
use crate::algorithm::simplex::factorization::{BasisFactorization, Factorization, FactorizationStatistics};
use crate::algorithm::simplex::factorization::eta_file::EtaFile;
use crate::algorithm::simplex::factorization::refactorization::RefactorizationClock;
use crate::algorithm::simplex::matrix_provider::MatrixProvider;
use crate::config::RowSelection;
use crate::data::linear_algebra::SparseTuple;
use crate::data::linear_algebra::vector::round_relative;
use crate::data::number_types::traits::Field;
use crate::error::{Error, Result};

/// Initial arena size per row of the basis.
const ENTRIES_PER_ROW: usize = 8;

/// Basis inverse as a product of eta matrices.
#[derive(Clone, Debug)]
pub struct ProductForm<F> {
    nr_rows: usize,
    eta_file: EtaFile<F>,
    /// Basis changes committed since the last factorization.
    nr_pivots: usize,
    force_refactorization: bool,
    clock: RefactorizationClock,
    statistics: FactorizationStatistics,
}

impl<F: Field> ProductForm<F> {
    /// The underlying eta file.
    #[must_use]
    pub fn eta_file(&self) -> &EtaFile<F> {
        &self.eta_file
    }

    fn capacity(&self) -> usize {
        (ENTRIES_PER_ROW * (self.nr_rows + 1)).max(self.eta_file.nr_nonzeros())
    }
}

impl<F: Field> BasisFactorization for ProductForm<F> {
    type F = F;

    fn new(nr_rows: usize) -> Self {
        Self {
            nr_rows,
            eta_file: EtaFile::with_capacity(ENTRIES_PER_ROW * (nr_rows + 1)),
            nr_pivots: 0,
            force_refactorization: false,
            clock: RefactorizationClock::new(),
            statistics: FactorizationStatistics::default(),
        }
    }

    fn factorize<MP: MatrixProvider<F = F>>(
        &mut self,
        context: &SolverContext<F>,
        basic_variables: &[usize],
        provider: &MP,
    ) -> Factorization {
        debug_assert_eq!(provider.nr_rows(), self.nr_rows);
        debug_assert!(basic_variables.iter().all(|&v| v > 0 && v < provider.nr_variables()));

        let started = Instant::now();
        let m = self.nr_rows;
        self.eta_file = EtaFile::with_capacity(self.capacity());

        let mut positions = vec![None; m + 1];
        positions[0] = Some(0);
        let mut candidates = Vec::new();
        for &variable in basic_variables {
            if variable <= m {
                debug_assert!(positions[variable].is_none(), "slack {variable} is basic twice");
                positions[variable] = Some(variable);
            } else {
                candidates.push(variable);
            }
        }

        let columns = candidates.iter()
            .map(|&variable| provider.basic_column(variable))
            .collect::<Vec<_>>();
        let lengths = candidates.iter()
            .map(|&variable| provider.nonzeros(variable))
            .collect::<Vec<_>>();
        let mut elimination = Elimination::new(&positions, &columns);

        // Singletons
        let mut row_queue = (1..=m)
            .filter(|&i| elimination.free[i] && elimination.row_count[i] == 1)
            .collect::<FIFOSet<_>>();
        let mut column_queue = (0..candidates.len())
            .filter(|&k| elimination.column_count[k] == 1)
            .collect::<FIFOSet<_>>();
        let mut deferred = Vec::new();
        loop {
            while let Some(row) = row_queue.pop() {
                if !elimination.free[row] || elimination.row_count[row] != 1 {
                    continue;
                }
                let Some(k) = elimination.row_columns[row].iter().copied().find(|&k| !elimination.assigned[k]) else {
                    continue;
                };
                if !elimination.is_acceptable(k, row, context.tolerances.factorization_pivot) {
                    continue;
                }

                self.eta_file.stage_sparse(&columns[k], row, candidates[k]);
                self.eta_file.commit(false);
                positions[row] = Some(candidates[k]);
                elimination.assign(k, row, &mut row_queue, &mut column_queue);
            }

            let Some(k) = column_queue.pop() else {
                break;
            };
            if elimination.assigned[k] || elimination.column_count[k] != 1 {
                continue;
            }
            let Some(row) = elimination.free_rows(k).next() else {
                continue;
            };
            if !elimination.is_acceptable(k, row, context.tolerances.factorization_pivot) {
                continue;
            }

            positions[row] = Some(candidates[k]);
            elimination.assign(k, row, &mut row_queue, &mut column_queue);
            deferred.push((k, row));
        }
        let nr_singletons = self.eta_file.nr_columns() + deferred.len();

        // Minimum degree order for the remaining columns, shorter columns first on ties
        let mut remaining = (0..candidates.len()).collect::<Vec<_>>();
        let eliminated = (0..candidates.len())
            .filter(|&k| elimination.assigned[k])
            .collect::<Vec<_>>();
        remove_indices(&mut remaining, &eliminated);

        let mut singular = Vec::new();
        let mut work = vec![F::zero(); m + 1];
        loop {
            let Some(index) = remaining.iter()
                .position_min_by_key(|&&k| (elimination.column_count[k], lengths[k], candidates[k])) else {
                break;
            };
            let k = remaining.swap_remove(index);

            work.iter_mut().for_each(|value| *value = F::zero());
            for &(i, value) in &columns[k] {
                work[i] = value;
            }
            self.eta_file.apply_right(&mut work);
            round_relative(&mut work, context.tolerances.drop);

            match select_pivot_row(context, &work, &elimination) {
                Some(row) => {
                    self.eta_file.stage_dense(&work, row, candidates[k]);
                    self.eta_file.commit(false);
                    positions[row] = Some(candidates[k]);
                    elimination.assign_dense(k, row);
                },
                None => {
                    warn!(
                        component = "factorization",
                        operation = "factorize",
                        variable = candidates[k],
                        "singular column left out of the basis"
                    );
                    elimination.drop_column(k);
                    singular.push(candidates[k]);
                },
            }
        }

        for &(k, row) in deferred.iter().rev() {
            self.eta_file.stage_sparse(&columns[k], row, candidates[k]);
            self.eta_file.commit(false);
        }

        let basis_positions = positions.into_iter()
            .enumerate()
            .map(|(i, variable)| variable.unwrap_or(i))
            .collect::<Vec<_>>();

        self.eta_file.mark_factor_end();
        self.nr_pivots = 0;
        self.force_refactorization = false;
        self.statistics.refactorizations += 1;
        self.statistics.singularities += singular.len() as u64;
        self.clock.restart(started);

        debug!(
            component = "factorization",
            operation = "factorize",
            rows = m,
            structurals = candidates.len(),
            singletons = nr_singletons,
            eta_columns = self.eta_file.nr_factor_columns(),
            nonzeros = self.eta_file.nr_nonzeros(),
            singularities = singular.len(),
            "factorized basis"
        );

        Factorization { basis_positions, singular }
    }

    fn ftran(&self, context: &SolverContext<F>, vector: &mut [F]) {
        debug_assert_eq!(vector.len(), self.nr_rows + 1);

        self.eta_file.apply_right(vector);
        round_relative(vector, context.tolerances.drop);
    }

    fn btran(&self, context: &SolverContext<F>, vector: &mut [F]) {
        debug_assert_eq!(vector.len(), self.nr_rows + 1);

        self.eta_file.apply_left(vector);
        round_relative(vector, context.tolerances.drop);
    }

    fn btran_double(&self, context: &SolverContext<F>, first: &mut [F], second: &mut [F]) {
        debug_assert_eq!(first.len(), self.nr_rows + 1);
        debug_assert_eq!(second.len(), self.nr_rows + 1);

        self.eta_file.apply_left_double(first, second);
        round_relative(first, context.tolerances.drop);
        round_relative(second, context.tolerances.drop);
    }

    fn prepare_update(
        &mut self,
        context: &SolverContext<F>,
        leaving_row: usize,
        entering_variable: usize,
        column: &[F],
    ) -> Result<F> {
        debug_assert!(leaving_row > 0 && leaving_row <= self.nr_rows);
        debug_assert_eq!(column.len(), self.nr_rows + 1);

        let pivot = column[leaving_row];
        if pivot.abs() < context.tolerances.pivot {
            self.eta_file.discard_staged();
            warn!(
                component = "factorization",
                operation = "prepare_update",
                row = leaving_row,
                variable = entering_variable,
                value = pivot.to_report(),
                "pivot value below tolerance"
            );
            return Err(Error::NumericFailure {
                row: leaving_row,
                variable: entering_variable,
                value: pivot.to_report(),
            });
        }

        Ok(self.eta_file.stage_dense(column, leaving_row, entering_variable))
    }

    fn finish_update(&mut self, sign_flip: bool) -> bool {
        let committed = self.eta_file.commit(sign_flip);
        if committed {
            self.nr_pivots += 1;
            self.statistics.pivots += 1;
            let (row, variable) = self.eta_file.pivot(self.eta_file.nr_columns() - 1);
            trace!(
                component = "factorization",
                operation = "finish_update",
                row,
                variable,
                eta_len = self.eta_file.len(),
                nonzeros = self.eta_file.nr_nonzeros()
            );
        }
        committed
    }

    fn must_refactorize(&mut self, context: &SolverContext<F>) -> bool {
        if self.force_refactorization {
            return true;
        }

        let elapsed = self.clock.elapsed();
        self.clock.should_refactorize(&context.refactorization, self.nr_pivots, elapsed)
    }

    fn force_refactorization(&mut self) {
        self.force_refactorization = true;
    }

    fn nr_pivots(&self) -> usize {
        self.nr_pivots
    }

    fn eta_len(&self) -> usize {
        self.eta_file.len()
    }

    fn nr_nonzeros(&self) -> usize {
        self.eta_file.nr_nonzeros()
    }

    fn statistics(&self) -> FactorizationStatistics {
        self.statistics
    }
}

/// Bookkeeping of the rows and candidate columns that are not yet assigned.
struct Elimination<'a, F> {
    columns: &'a [Vec<SparseTuple<F>>],
    /// Whether a row still needs a basic column.
    free: Vec<bool>,
    /// Candidates with a nonzero in each free row.
    row_columns: Vec<Vec<usize>>,
    /// Number of unassigned candidates with a nonzero in each row.
    row_count: Vec<usize>,
    /// Number of free rows in which each candidate has a nonzero.
    column_count: Vec<usize>,
    assigned: Vec<bool>,
}

impl<'a, F: Field> Elimination<'a, F> {
    fn new(positions: &[Option<usize>], columns: &'a [Vec<SparseTuple<F>>]) -> Self {
        let free = positions.iter().map(Option::is_none).collect::<Vec<_>>();

        let mut row_columns = vec![Vec::new(); positions.len()];
        let mut column_count = vec![0; columns.len()];
        for (k, column) in columns.iter().enumerate() {
            for &(i, value) in column {
                if free[i] && value != F::zero() {
                    row_columns[i].push(k);
                    column_count[k] += 1;
                }
            }
        }
        let row_count = row_columns.iter().map(Vec::len).collect();

        Self { columns, free, row_columns, row_count, column_count, assigned: vec![false; columns.len()] }
    }

    /// Free rows in which a candidate has a nonzero.
    fn free_rows(&self, k: usize) -> impl Iterator<Item = usize> + '_ {
        self.columns[k].iter()
            .filter(|&&(i, value)| self.free[i] && value != F::zero())
            .map(|&(i, _)| i)
    }

    /// Whether the raw value of a singleton is large enough to pivot on.
    fn is_acceptable(&self, k: usize, row: usize, tolerance: F) -> bool {
        self.columns[k].iter()
            .find(|&&(i, _)| i == row)
            .is_some_and(|&(_, value)| value.abs() >= tolerance)
    }

    /// Assign a singleton and queue the rows and columns that became singletons.
    fn assign(&mut self, k: usize, row: usize, row_queue: &mut FIFOSet<usize>, column_queue: &mut FIFOSet<usize>) {
        for i in self.release_rows(k, row) {
            row_queue.push(i);
        }
        for other in self.occupy_row(row) {
            column_queue.push(other);
        }
    }

    fn assign_dense(&mut self, k: usize, row: usize) {
        self.release_rows(k, row);
        self.occupy_row(row);
    }

    /// Remove a candidate from the counts without assigning it a row.
    fn drop_column(&mut self, k: usize) {
        self.assigned[k] = true;
        let rows = self.free_rows(k).collect::<Vec<_>>();
        for i in rows {
            self.row_count[i] -= 1;
        }
    }

    /// Mark a candidate assigned and update the row counts of its other free rows.
    ///
    /// # Return value
    ///
    /// Rows that have become singletons.
    fn release_rows(&mut self, k: usize, row: usize) -> Vec<usize> {
        debug_assert!(!self.assigned[k]);
        debug_assert!(self.free[row]);

        self.assigned[k] = true;
        let rows = self.free_rows(k).filter(|&i| i != row).collect::<Vec<_>>();
        rows.into_iter()
            .filter(|&i| {
                self.row_count[i] -= 1;
                self.row_count[i] == 1
            })
            .collect()
    }

    /// Mark a row as taken and update the column counts of the candidates in it.
    ///
    /// # Return value
    ///
    /// Candidates that have become column singletons.
    fn occupy_row(&mut self, row: usize) -> Vec<usize> {
        self.free[row] = false;
        self.row_count[row] = 0;

        let mut singletons = Vec::new();
        for &other in &self.row_columns[row] {
            if !self.assigned[other] {
                self.column_count[other] -= 1;
                if self.column_count[other] == 1 {
                    singletons.push(other);
                }
            }
        }
        singletons
    }
}

/// Choose the pivot row of a transformed column among the free rows.
///
/// # Return value
///
/// `None` if no free row has a value of at least the factorization pivot tolerance.
fn select_pivot_row<F: Field>(
    context: &SolverContext<F>,
    column: &[F],
    elimination: &Elimination<'_, F>,
) -> Option<usize> {
    let free_rows = || (1..column.len()).filter(|&i| elimination.free[i]);

    let (best_row, best_value) = free_rows()
        .map(|i| (i, column[i].abs()))
        .fold(None, |best: Option<(usize, F)>, (i, value)| match best {
            Some((_, best_value)) if best_value >= value => best,
            _ => Some((i, value)),
        })?;
    if best_value < context.tolerances.factorization_pivot {
        return None;
    }

    match context.row_selection {
        RowSelection::LargestMagnitude => Some(best_row),
        RowSelection::Markowitz { threshold } => {
            let threshold = F::from_f64(threshold).unwrap_or_else(F::one) * best_value;
            free_rows()
                .filter(|&i| column[i].abs() >= threshold)
                .min_by(|&i, &j| {
                    elimination.row_count[i].cmp(&elimination.row_count[j])
                        .then_with(|| column[j].abs().partial_cmp(&column[i].abs()).unwrap_or(std::cmp::Ordering::Equal))
                })
        },
    }
}
