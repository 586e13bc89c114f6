//! # Properties of the factorization
//!
//! Checked on generated diagonally dominant models of varying size.
use approx::abs_diff_eq;
use proptest::prelude::*;

use eta_simplex::algorithm::simplex::context::SolverContext;
use eta_simplex::algorithm::simplex::factorization::BasisFactorization;
use eta_simplex::algorithm::simplex::factorization::product_form::ProductForm;
use eta_simplex::algorithm::simplex::matrix_provider::MatrixProvider;
use eta_simplex::algorithm::simplex::matrix_provider::matrix_data::MatrixData;
use eta_simplex::config::SolverConfig;
use eta_simplex::data::linear_algebra::matrix::ColumnMajor;
use eta_simplex::data::linear_program::elements::{ConstraintType, Objective};

/// A square model of which the constraint matrix has the given off diagonal values and a
/// dominant diagonal.
fn model(size: usize, values: &[f64], density: &[bool]) -> MatrixData<f64> {
    let rows = (0..size)
        .map(|i| {
            (0..size)
                .map(|j| {
                    let k = i * size + j;
                    if i == j {
                        size as f64 + 1_f64
                    } else if density[k] {
                        values[k]
                    } else {
                        0_f64
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    MatrixData::nonnegative(
        ColumnMajor::from_dense(&rows, size),
        (0..size).map(|j| j as f64 - 1_f64).collect(),
        vec![1_f64; size],
        vec![ConstraintType::Less; size],
        Objective::Minimize,
    ).unwrap()
}

fn model_strategy() -> impl Strategy<Value = (usize, Vec<f64>, Vec<bool>, Vec<bool>)> {
    (1_usize..8).prop_flat_map(|size| {
        (
            Just(size),
            prop::collection::vec(-1_f64..1_f64, size * size),
            prop::collection::vec(any::<bool>(), size * size),
            // Which structurals to bring into the basis
            prop::collection::vec(any::<bool>(), size),
        )
    })
}

proptest! {
    #[test]
    fn identity_reproduction((size, values, density, selected) in model_strategy()) {
        let model = model(size, &values, &density);
        let context = SolverContext::default();
        let candidates = (0..size)
            .map(|j| if selected[j] { 1 + size + j } else { 1 + j })
            .collect::<Vec<_>>();

        let mut factorization = ProductForm::new(size);
        let result = factorization.factorize(&context, &candidates, &model);
        prop_assert!(result.singular.is_empty());
        prop_assert_eq!(factorization.eta_len(), 0);

        for (row, &variable) in result.basis_positions.iter().enumerate() {
            let mut column = model.dense_column(variable);
            factorization.ftran(&context, &mut column);
            for (i, &value) in column.iter().enumerate() {
                let expected = if i == row { 1_f64 } else { 0_f64 };
                prop_assert!(abs_diff_eq!(value, expected, epsilon = 1e-9), "{} at {} for row {}", value, i, row);
            }
        }
    }

    #[test]
    fn basis_size((size, values, density, selected) in model_strategy(), extra in 0_usize..3) {
        let model = model(size, &values, &density);
        let context = SolverContext::default();
        // All selected structurals plus some slacks, possibly more candidates than rows
        let mut candidates = (0..size).filter(|&j| selected[j]).map(|j| 1 + size + j).collect::<Vec<_>>();
        candidates.extend((1..=size).take(extra));

        let mut factorization = ProductForm::new(size);
        let result = factorization.factorize(&context, &candidates, &model);

        let mut positions = result.basis_positions.clone();
        prop_assert_eq!(positions.len(), size + 1);
        prop_assert_eq!(positions[0], 0);
        positions.sort_unstable();
        positions.dedup();
        prop_assert_eq!(positions.len(), size + 1);

        let placed = candidates.iter().filter(|variable| result.basis_positions.contains(variable)).count();
        prop_assert_eq!(placed + result.singularity_count(), candidates.len());
    }

    #[test]
    fn refactorization_within_cap(pivot_cap in 1_usize..30, timed in any::<bool>()) {
        let size = 3;
        let model = model(size, &[0_f64; 9], &[false; 9]);
        let mut config = SolverConfig::new().with_pivot_cap(pivot_cap);
        config.refactorization.timed = timed;
        let context = SolverContext::new(&config).unwrap();

        let mut factorization = ProductForm::new(size);
        factorization.factorize(&context, &[1, 2, 3], &model);
        prop_assert!(!factorization.must_refactorize(&context));

        // Alternate the first row between its slack and the first structural
        let mut basic = 1;
        for _ in 0..pivot_cap {
            let entering = if basic == 1 { 1 + size } else { 1 };
            let mut column = model.dense_column(entering);
            factorization.ftran(&context, &mut column);
            factorization.prepare_update(&context, 1, entering, &column).unwrap();
            prop_assert!(factorization.finish_update(false));
            basic = entering;
        }

        prop_assert_eq!(factorization.nr_pivots(), pivot_cap);
        prop_assert_eq!(factorization.eta_len(), pivot_cap);
        prop_assert!(factorization.must_refactorize(&context));
    }
}
