//! # Number types
//!
//! The engine is written once, generically over the floating point type it computes with. Tests
//! use `f64`, but nothing prevents an `f32` instantiation for small and well-scaled models.
pub mod traits;
