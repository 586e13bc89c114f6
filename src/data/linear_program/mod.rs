//! # Linear programs
//!
//! Building blocks shared by the model representation and the algorithms.
pub mod elements;
