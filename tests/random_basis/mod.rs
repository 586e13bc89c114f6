//! # Accumulated eta columns
//!
//! A long sequence of pivots on a random, well conditioned basis should keep representing the
//! inverse of that basis, in both directions.
use approx::assert_abs_diff_eq;
use rand::{Rng, SeedableRng};
use rand::rngs::StdRng;

use eta_simplex::algorithm::simplex::context::SolverContext;
use eta_simplex::algorithm::simplex::factorization::BasisFactorization;
use eta_simplex::algorithm::simplex::factorization::product_form::ProductForm;
use eta_simplex::algorithm::simplex::matrix_provider::MatrixProvider;
use eta_simplex::algorithm::simplex::matrix_provider::matrix_data::MatrixData;
use eta_simplex::config::{RefactorizationPolicy, SolverConfig};
use eta_simplex::data::linear_algebra::matrix::ColumnMajor;
use eta_simplex::data::linear_algebra::vector::{inner_product, unit};
use eta_simplex::data::linear_program::elements::{ConstraintType, Objective};

const SIZE: usize = 20;
const NR_PIVOTS: usize = 100;
const TOLERANCE: f64 = 1e-8;

/// A diagonally dominant matrix with about a third of the off diagonal entries filled.
fn random_model(rng: &mut StdRng) -> MatrixData<f64> {
    let rows = (0..SIZE)
        .map(|i| {
            (0..SIZE)
                .map(|j| {
                    if i == j {
                        rng.random_range(5_f64..10_f64)
                    } else if rng.random_bool(0.3) {
                        rng.random_range(-1_f64..1_f64)
                    } else {
                        0_f64
                    }
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let cost = (0..SIZE).map(|_| rng.random_range(-2_f64..2_f64)).collect();

    MatrixData::nonnegative(
        ColumnMajor::from_dense(&rows, SIZE),
        cost,
        vec![1_f64; SIZE],
        vec![ConstraintType::Less; SIZE],
        Objective::Minimize,
    ).unwrap()
}

fn context() -> SolverContext<f64> {
    let policy = RefactorizationPolicy { pivot_cap: 10 * NR_PIVOTS, timed: false, ..RefactorizationPolicy::default() };
    SolverContext::new(&SolverConfig::new().with_refactorization(policy)).unwrap()
}

/// Forward solves of the basic columns give unit vectors, backward solves of unit vectors give
/// rows that are orthogonal to all but one basic column.
fn assert_inverse(factorization: &ProductForm<f64>, context: &SolverContext<f64>, positions: &[usize], model: &MatrixData<f64>) {
    for (row, &variable) in positions.iter().enumerate() {
        let mut column = model.dense_column(variable);
        factorization.ftran(context, &mut column);
        for (i, &value) in column.iter().enumerate() {
            assert_abs_diff_eq!(value, if i == row { 1_f64 } else { 0_f64 }, epsilon = TOLERANCE);
        }
    }

    for row in 0..positions.len() {
        let mut probe = unit(row, positions.len());
        factorization.btran(context, &mut probe);
        for (i, &variable) in positions.iter().enumerate() {
            let value = inner_product(&probe, &model.basic_column(variable));
            assert_abs_diff_eq!(value, if i == row { 1_f64 } else { 0_f64 }, epsilon = TOLERANCE);
        }
    }
}

#[test]
fn hundred_pivots() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let model = random_model(&mut rng);
    let context = context();

    let mut factorization = ProductForm::new(SIZE);
    let slacks = (1..=SIZE).collect::<Vec<_>>();
    let mut positions = factorization.factorize(&context, &slacks, &model).basis_positions;
    assert_eq!(factorization.eta_len(), 0);

    let mut is_basic = vec![false; model.nr_variables()];
    for &variable in &positions {
        is_basic[variable] = true;
    }

    for pivot in 0..NR_PIVOTS {
        let nonbasic = (1..model.nr_variables()).filter(|&v| !is_basic[v]).collect::<Vec<_>>();
        let entering = nonbasic[rng.random_range(0..nonbasic.len())];

        let mut column = model.dense_column(entering);
        factorization.ftran(&context, &mut column);
        let leaving_row = (1..=SIZE)
            .max_by(|&i, &j| column[i].abs().total_cmp(&column[j].abs()))
            .unwrap();

        factorization.prepare_update(&context, leaving_row, entering, &column).unwrap();
        assert!(factorization.finish_update(false));
        assert_eq!(factorization.eta_len(), pivot + 1);

        is_basic[positions[leaving_row]] = false;
        is_basic[entering] = true;
        positions[leaving_row] = entering;
    }
    assert!(!factorization.must_refactorize(&context));

    assert_inverse(&factorization, &context, &positions, &model);

    // A fresh factorization of the same basis agrees on a random right hand side
    let mut expected = (0..=SIZE).map(|_| rng.random_range(-1_f64..1_f64)).collect::<Vec<_>>();
    let mut actual = expected.clone();
    factorization.ftran(&context, &mut expected);

    let mut fresh = ProductForm::new(SIZE);
    let result = fresh.factorize(&context, &positions[1..], &model);
    assert!(result.singular.is_empty());
    assert_inverse(&fresh, &context, &result.basis_positions, &model);
    fresh.ftran(&context, &mut actual);
    for (row, &variable) in result.basis_positions.iter().enumerate() {
        let old_row = positions.iter().position(|&v| v == variable).unwrap();
        assert_abs_diff_eq!(actual[row], expected[old_row], epsilon = TOLERANCE);
    }
}
