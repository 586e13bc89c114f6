//! # Eta file
//!
//! The inverse of the basis in product form: `B^-1 = E_k ... E_2 E_1`, where each `E_i` is an
//! identity matrix of which the column at the pivot row `p` is replaced by an eta column `eta`.
//!
//! All eta columns are stored back to back in one arena. A column lists its off-pivot entries
//! first and its pivot entry last, so the pivot row of column `i` is the last row index before
//! `column_end[i]`. A column may be staged past the committed end before it is normalized and
//! committed; staging never disturbs the committed columns.
use crate::data::linear_algebra::SparseTuple;
use crate::data::number_types::traits::Field;

/// Flat storage of eta columns.
#[derive(Clone, Debug, PartialEq)]
pub struct EtaFile<F> {
    /// Row indices of all entries, per column ordered off-pivot first, pivot last.
    rows: Vec<usize>,
    /// Values matching `rows`.
    values: Vec<F>,
    /// Offset one past the last entry of each committed column.
    column_end: Vec<usize>,
    /// Variable that entered the basis with each committed column.
    variables: Vec<usize>,
    /// Number of columns created by the last factorization; later columns are updates.
    nr_factor_columns: usize,
    /// Variable of the staged column, if a column is staged.
    staged: Option<usize>,
}

impl<F: Field> EtaFile<F> {
    /// Create an empty eta file.
    ///
    /// # Arguments
    ///
    /// * `capacity`: Number of entries to reserve space for; the arena grows geometrically beyond.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            rows: Vec::with_capacity(capacity),
            values: Vec::with_capacity(capacity),
            column_end: Vec::new(),
            variables: Vec::new(),
            nr_factor_columns: 0,
            staged: None,
        }
    }

    /// Stage a dense column as the next eta column.
    ///
    /// Any previously staged column is discarded.
    ///
    /// # Arguments
    ///
    /// * `column`: Column already transformed by all committed eta columns.
    /// * `pivot_row`: Row that the column will be pivoted on.
    /// * `variable`: Variable that the column belongs to.
    ///
    /// # Return value
    ///
    /// The value of the column at the pivot row.
    pub fn stage_dense(&mut self, column: &[F], pivot_row: usize, variable: usize) -> F {
        debug_assert!(pivot_row < column.len());

        self.discard_staged();
        for (i, &value) in column.iter().enumerate() {
            if i != pivot_row && value != F::zero() {
                self.rows.push(i);
                self.values.push(value);
            }
        }
        self.push_pivot(column[pivot_row], pivot_row, variable)
    }

    /// Stage a sparse column as the next eta column.
    ///
    /// See `stage_dense`.
    pub fn stage_sparse(&mut self, column: &[SparseTuple<F>], pivot_row: usize, variable: usize) -> F {
        debug_assert!(column.windows(2).all(|w| w[0].0 < w[1].0));

        self.discard_staged();
        let mut pivot = F::zero();
        for &(i, value) in column {
            if i == pivot_row {
                pivot = value;
            } else if value != F::zero() {
                self.rows.push(i);
                self.values.push(value);
            }
        }
        self.push_pivot(pivot, pivot_row, variable)
    }

    fn push_pivot(&mut self, pivot: F, pivot_row: usize, variable: usize) -> F {
        self.rows.push(pivot_row);
        self.values.push(pivot);
        self.staged = Some(variable);
        pivot
    }

    /// Remove the staged column, if any.
    pub fn discard_staged(&mut self) {
        let end = self.committed_end();
        self.rows.truncate(end);
        self.values.truncate(end);
        self.staged = None;
    }

    /// Normalize the staged column and append it to the file.
    ///
    /// The pivot entry `p` becomes `1 / p` and every other entry `v` becomes `-v / p`.
    ///
    /// # Arguments
    ///
    /// * `sign_flip`: Negate the staged column before normalizing. The basis column is then
    /// recorded as the negation of the staged one.
    ///
    /// # Return value
    ///
    /// Whether a column was staged and has been committed.
    pub fn commit(&mut self, sign_flip: bool) -> bool {
        let Some(variable) = self.staged.take() else {
            return false;
        };

        let start = self.committed_end();
        let end = self.values.len();
        debug_assert!(end > start);

        if sign_flip {
            for value in &mut self.values[start..end] {
                *value = -*value;
            }
        }
        let pivot = self.values[end - 1];
        debug_assert_ne!(pivot, F::zero());
        let inverse = F::one() / pivot;
        let factor = -inverse;
        for value in &mut self.values[start..end - 1] {
            *value *= factor;
        }
        self.values[end - 1] = inverse;

        self.column_end.push(end);
        self.variables.push(variable);
        true
    }

    /// Mark all current columns as part of the factorization rather than updates.
    pub fn mark_factor_end(&mut self) {
        debug_assert!(self.staged.is_none());

        self.nr_factor_columns = self.column_end.len();
    }

    /// Column-multiply with all eta columns in insertion order (i.e. `E_k ... E_1 x`).
    ///
    /// # Arguments
    ///
    /// * `vector`: Dense vector, at least as long as the largest row index in the file.
    pub fn apply_right(&self, vector: &mut [F]) {
        let mut start = 0;
        for &end in &self.column_end {
            let pivot_row = self.rows[end - 1];
            let theta = vector[pivot_row];
            if theta != F::zero() {
                for index in start..end - 1 {
                    vector[self.rows[index]] += theta * self.values[index];
                }
                vector[pivot_row] = theta * self.values[end - 1];
            }
            start = end;
        }
    }

    /// Row-multiply with all eta columns in reverse order (i.e. `x E_k ... E_1`).
    ///
    /// # Arguments
    ///
    /// * `vector`: Dense vector, at least as long as the largest row index in the file.
    pub fn apply_left(&self, vector: &mut [F]) {
        for k in (0..self.column_end.len()).rev() {
            let (start, end) = self.column_range(k);
            let total = (start..end)
                .map(|index| vector[self.rows[index]] * self.values[index])
                .sum();
            vector[self.rows[end - 1]] = total;
        }
    }

    /// Row-multiply two vectors in a single traversal of the file.
    ///
    /// Equivalent to calling `apply_left` on both vectors.
    pub fn apply_left_double(&self, first: &mut [F], second: &mut [F]) {
        for k in (0..self.column_end.len()).rev() {
            let (start, end) = self.column_range(k);
            let mut first_total = F::zero();
            let mut second_total = F::zero();
            for index in start..end {
                let (row, value) = (self.rows[index], self.values[index]);
                first_total += first[row] * value;
                second_total += second[row] * value;
            }
            let pivot_row = self.rows[end - 1];
            first[pivot_row] = first_total;
            second[pivot_row] = second_total;
        }
    }

    fn column_range(&self, k: usize) -> (usize, usize) {
        let start = if k == 0 { 0 } else { self.column_end[k - 1] };
        (start, self.column_end[k])
    }

    fn committed_end(&self) -> usize {
        self.column_end.last().copied().unwrap_or(0)
    }

    /// Pivot row and entering variable of a committed column.
    #[must_use]
    pub fn pivot(&self, k: usize) -> (usize, usize) {
        let (_, end) = self.column_range(k);
        (self.rows[end - 1], self.variables[k])
    }

    /// Number of update columns, committed after the last factorization.
    #[must_use]
    pub fn len(&self) -> usize {
        self.column_end.len() - self.nr_factor_columns
    }

    /// Whether no update columns were committed since the last factorization.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of columns created by the last factorization.
    #[must_use]
    pub fn nr_factor_columns(&self) -> usize {
        self.nr_factor_columns
    }

    /// Total number of committed columns.
    #[must_use]
    pub fn nr_columns(&self) -> usize {
        self.column_end.len()
    }

    /// Number of committed entries in the arena.
    #[must_use]
    pub fn nr_nonzeros(&self) -> usize {
        self.committed_end()
    }

    /// Whether a column is staged.
    #[must_use]
    pub fn is_staged(&self) -> bool {
        self.staged.is_some()
    }
}
