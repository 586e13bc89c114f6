//! # Linear algebra primitives
//!
//! Sparse column storage for the constraint matrix and a handful of operations on dense work
//! vectors. Dense vectors are plain slices; the simplex core indexes them by basis position.
pub mod matrix;
pub mod vector;

/// An index and the value stored at that index.
///
/// Sparse vectors are `Vec`s of these, sorted by index and without explicit zeros.
pub type SparseTuple<F> = (usize, F);
