//! # Strategies for the Simplex algorithm
//!
//! Module containing different strategies for performing certain procedures in the Simplex method.
//! One example is the decision on which variable enters and which row leaves the basis.
pub mod pricing;
