//! Problems without an optimum, and problems that need repairs before they can be optimized.
use approx::assert_abs_diff_eq;

use crate::algorithm::Status;
use crate::algorithm::simplex::{Phase, Solver};
use crate::algorithm::simplex::basis::Basis;
use crate::algorithm::simplex::iterator::Iteration;
use crate::algorithm::simplex::matrix_provider::matrix_data::MatrixData;
use crate::config::{SingularPolicy, SolverConfig};
use crate::data::linear_algebra::matrix::ColumnMajor;
use crate::data::linear_program::elements::{BoundSide, ConstraintType, Objective};

/// Minimize `x` subject to `x <= 1` and `x >= 2`.
#[test]
fn infeasible() {
    let data = MatrixData::nonnegative(
        ColumnMajor::from_dense(&[vec![1_f64], vec![1_f64]], 1),
        vec![1_f64],
        vec![1_f64, 2_f64],
        vec![ConstraintType::Less, ConstraintType::Greater],
        Objective::Minimize,
    ).unwrap();
    let mut solver = Solver::new(&data, SolverConfig::new()).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Infeasible);
    assert!(!result.primal_feasible);
    assert_eq!(result.statistics.phases[Phase::Dual], 1);
}

/// Minimize `2x` subject to `x >= 5`, `-3x == 4`, `x >= 6` and `0 <= x <= 1`.
///
/// The only structural has a finite range that is shorter than the dual steps, it still enters
/// the basis instead of moving between its bounds.
#[test]
fn infeasible_boxed() {
    let data = MatrixData::new(
        ColumnMajor::from_dense(&[vec![1_f64], vec![-3_f64], vec![1_f64]], 1),
        vec![2_f64],
        vec![5_f64, 4_f64, 6_f64],
        vec![ConstraintType::Greater, ConstraintType::Equal, ConstraintType::Greater],
        Objective::Minimize,
        vec![(0_f64, 1_f64)],
    ).unwrap();
    let mut solver = Solver::new(&data, SolverConfig::new().with_iteration_limit(100)).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Infeasible);
    assert_eq!(result.statistics.iterations[Iteration::MinorBoundFlip], 0);
    assert_eq!(result.statistics.iterations[Iteration::MajorPivot], 1);
    assert_eq!(result.statistics.phases[Phase::Dual], 1);
}

/// Minimize `3y - 3z` subject to `3x - 2z <= 1`, `-2x + 2y - z <= -3`, `0 <= x <= 1`,
/// `0 <= y <= 3` and `-1 <= z <= 3`.
///
/// The slack basis violates both rows. Two dual pivots reach a feasible basis, from which a
/// primal pivot reaches the optimum `-9` at `y = 0`, `z = 3`.
#[test]
fn dual_pivots_with_boxed_variables() {
    let data = MatrixData::new(
        ColumnMajor::from_dense(&[vec![3_f64, 0_f64, -2_f64], vec![-2_f64, 2_f64, -1_f64]], 3),
        vec![0_f64, 3_f64, -3_f64],
        vec![1_f64, -3_f64],
        vec![ConstraintType::Less; 2],
        Objective::Minimize,
        vec![(0_f64, 1_f64), (0_f64, 3_f64), (-1_f64, 3_f64)],
    ).unwrap();
    let mut solver = Solver::new(&data, SolverConfig::new().with_iteration_limit(100)).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Optimal);
    assert!(result.primal_feasible);
    assert_abs_diff_eq!(result.objective_value, -9_f64, epsilon = 1e-9);
    assert_abs_diff_eq!(result.structural[1], 0_f64, epsilon = 1e-9);
    assert_abs_diff_eq!(result.structural[2], 3_f64, epsilon = 1e-9);
    assert_eq!(result.statistics.phases[Phase::Dual], 2);
    assert_eq!(result.statistics.iterations[Iteration::MinorBoundFlip], 0);
}

/// Maximize `x` subject to `x - y <= 1`.
#[test]
fn unbounded() {
    let data = MatrixData::nonnegative(
        ColumnMajor::from_dense(&[vec![1_f64, -1_f64]], 2),
        vec![1_f64, 0_f64],
        vec![1_f64],
        vec![ConstraintType::Less],
        Objective::Maximize,
    ).unwrap();
    let mut solver = Solver::new(&data, SolverConfig::new()).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Unbounded);
    assert!(result.primal_feasible);
    assert_abs_diff_eq!(result.objective_value, 1_f64, epsilon = 1e-9);
}

/// Minimize `x` subject to `x >= -3` as a constraint, with `x` free.
#[test]
fn free_variable() {
    let data = MatrixData::new(
        ColumnMajor::from_dense(&[vec![1_f64]], 1),
        vec![1_f64],
        vec![-3_f64],
        vec![ConstraintType::Greater],
        Objective::Minimize,
        vec![(f64::NEG_INFINITY, f64::INFINITY)],
    ).unwrap();
    let mut solver = Solver::new(&data, SolverConfig::new()).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Optimal);
    assert_abs_diff_eq!(result.objective_value, -3_f64, epsilon = 1e-9);
    assert_abs_diff_eq!(result.structural[0], -3_f64, epsilon = 1e-9);
    assert_eq!(solver.basis().bound_side(1), BoundSide::Upper);
}

/// Maximize `x + y` subject to `x + 2y <= 4` and `x + 2y <= 6`, starting from a basis with both
/// (dependent) structural columns.
fn dependent_start() -> (MatrixData<f64>, Basis) {
    let data = MatrixData::nonnegative(
        ColumnMajor::from_dense(&[vec![1_f64, 2_f64], vec![1_f64, 2_f64]], 2),
        vec![1_f64, 1_f64],
        vec![4_f64, 6_f64],
        vec![ConstraintType::Less; 2],
        Objective::Maximize,
    ).unwrap();
    let basis = Basis::from_parts(2, &[3, 4], vec![BoundSide::Lower; 5]).unwrap();

    (data, basis)
}

#[test]
fn singular_basis_repaired() {
    let (data, basis) = dependent_start();
    let mut solver = Solver::new(&data, SolverConfig::new()).unwrap();
    solver.set_basis(basis).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Optimal);
    assert_eq!(result.statistics.singularities, 1);
    assert_abs_diff_eq!(result.objective_value, 4_f64, epsilon = 1e-9);
    assert_abs_diff_eq!(result.structural[0], 4_f64, epsilon = 1e-9);
    assert_abs_diff_eq!(result.structural[1], 0_f64, epsilon = 1e-9);
    assert_eq!(solver.basis().nr_basic(), 2);
}

#[test]
fn singular_basis_rejected() {
    let (data, basis) = dependent_start();
    let config = SolverConfig::new().with_singular_policy(SingularPolicy::Fail);
    let mut solver = Solver::new(&data, config).unwrap();
    solver.set_basis(basis).unwrap();
    let result = solver.solve().unwrap();

    assert_eq!(result.status, Status::Infeasible);
    assert_eq!(result.statistics.singularities, 1);
    assert_eq!(result.statistics.nr_iterations(), 0);
}
