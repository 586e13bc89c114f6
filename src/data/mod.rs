//! # Data structures
//!
//! The number trait the solver is generic over, the sparse storage of the constraint matrix and
//! the elements that describe a linear program. Solver state lives in `algorithm::simplex`.
pub mod linear_algebra;
pub mod linear_program;
pub mod number_types;
