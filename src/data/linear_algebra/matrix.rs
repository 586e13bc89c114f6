//! # Sparse matrices
//!
//! The constraint matrix is only ever accessed column by column, both when the factorization is
//! rebuilt and when a single column is brought into the basis.
use std::fmt;

use crate::data::linear_algebra::SparseTuple;
use crate::data::number_types::traits::Field;

/// Column major sparse matrix.
///
/// Each column is a list of `(row, value)` tuples, sorted by row and without explicit zeros.
#[derive(Clone, Debug, PartialEq)]
pub struct ColumnMajor<F> {
    columns: Vec<Vec<SparseTuple<F>>>,
    nr_rows: usize,
}

impl<F: Field> ColumnMajor<F> {
    /// Create a new matrix from sparse columns.
    ///
    /// # Arguments
    ///
    /// * `columns`: Sparse columns, each sorted by row index and containing no zero values.
    /// * `nr_rows`: Number of rows, strictly larger than any row index.
    #[must_use]
    pub fn new(columns: Vec<Vec<SparseTuple<F>>>, nr_rows: usize) -> Self {
        debug_assert!(columns.iter().all(|column| {
            column.windows(2).all(|w| w[0].0 < w[1].0)
                && column.iter().all(|&(i, value)| i < nr_rows && value != F::zero())
        }));

        Self { columns, nr_rows }
    }

    /// Create a matrix from dense, row major data.
    ///
    /// Zero values are skipped.
    ///
    /// # Arguments
    ///
    /// * `rows`: Rows of equal length `nr_columns`.
    /// * `nr_columns`: Number of columns, needed for matrices without rows.
    #[must_use]
    pub fn from_dense(rows: &[Vec<F>], nr_columns: usize) -> Self {
        debug_assert!(rows.iter().all(|row| row.len() == nr_columns));

        let columns = (0..nr_columns)
            .map(|j| {
                rows.iter().enumerate()
                    .filter(|(_, row)| row[j] != F::zero())
                    .map(|(i, row)| (i, row[j]))
                    .collect()
            })
            .collect();

        Self::new(columns, rows.len())
    }

    /// Sparse column `j`.
    #[must_use]
    pub fn column(&self, j: usize) -> &[SparseTuple<F>] {
        debug_assert!(j < self.nr_columns());

        &self.columns[j]
    }

    /// Value at row `i` and column `j`, zero when not stored.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> F {
        debug_assert!(i < self.nr_rows);

        self.columns[j].binary_search_by_key(&i, |&(row, _)| row)
            .map_or(F::zero(), |index| self.columns[j][index].1)
    }

    /// Number of rows.
    #[must_use]
    pub fn nr_rows(&self) -> usize {
        self.nr_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn nr_columns(&self) -> usize {
        self.columns.len()
    }

    /// Number of explicitly stored values.
    #[must_use]
    pub fn nr_nonzeros(&self) -> usize {
        self.columns.iter().map(Vec::len).sum()
    }
}

impl<F: Field> fmt::Display for ColumnMajor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.nr_rows {
            for j in 0..self.nr_columns() {
                write!(f, "{:>8.3} ", self.get(i, j))?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::data::linear_algebra::matrix::ColumnMajor;

    fn matrix() -> ColumnMajor<f64> {
        ColumnMajor::from_dense(&[
            vec![1_f64, 0_f64, 2_f64],
            vec![0_f64, 0_f64, 3_f64],
        ], 3)
    }

    #[test]
    fn from_dense() {
        let matrix = matrix();
        assert_eq!(matrix.nr_rows(), 2);
        assert_eq!(matrix.nr_columns(), 3);
        assert_eq!(matrix.nr_nonzeros(), 3);
        assert_eq!(matrix.column(0), &[(0, 1_f64)]);
        assert!(matrix.column(1).is_empty());
        assert_eq!(matrix.column(2), &[(0, 2_f64), (1, 3_f64)]);
    }

    #[test]
    fn access() {
        let matrix = matrix();
        assert_eq!(matrix.get(1, 2), 3_f64);
        assert_eq!(matrix.get(1, 0), 0_f64);
    }

    #[test]
    fn no_rows() {
        let matrix = ColumnMajor::<f64>::from_dense(&[], 2);
        assert_eq!(matrix.nr_columns(), 2);
        assert_eq!(matrix.nr_nonzeros(), 0);
    }
}
