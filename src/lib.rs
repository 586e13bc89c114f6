//! # A revised simplex core
//!
//! Linear programs with bounded variables are solved with a revised simplex method. The inverse of
//! the basis is kept in product form, as a file of eta columns, that is refactorized from time to
//! time. Bound flips of nonbasic variables are carried out without touching the basis.
//!
//! A model is provided through the `MatrixProvider` trait, of which `MatrixData` is an owning
//! implementation, and solved with a `Solver`:
//!
//! ```
//! use eta_simplex::algorithm::Status;
//! use eta_simplex::algorithm::simplex::Solver;
//! use eta_simplex::algorithm::simplex::matrix_provider::matrix_data::MatrixData;
//! use eta_simplex::config::SolverConfig;
//! use eta_simplex::data::linear_algebra::matrix::ColumnMajor;
//! use eta_simplex::data::linear_program::elements::{ConstraintType, Objective};
//!
//! let data = MatrixData::nonnegative(
//!     ColumnMajor::from_dense(&[vec![1_f64, 2_f64], vec![3_f64, 1_f64]], 2),
//!     vec![1_f64, 1_f64],
//!     vec![4_f64, 6_f64],
//!     vec![ConstraintType::Less; 2],
//!     Objective::Maximize,
//! )?;
//! let mut solver = Solver::new(&data, SolverConfig::new())?;
//! let result = solver.solve()?;
//! assert_eq!(result.status, Status::Optimal);
//! assert!((result.objective_value - 2.8).abs() < 1e-6);
//! # Ok::<(), eta_simplex::error::Error>(())
//! ```
#![warn(missing_docs)]

pub mod algorithm;
pub mod config;
pub mod data;
pub mod error;

#[cfg(test)]
mod tests;
