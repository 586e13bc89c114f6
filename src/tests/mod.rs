//! # Integration tests that require a look inside the crate.
//!
//! Each module describes a small problem and solves it, checking both the answer and the way the
//! solver got there.
//!
//! Convention for function names:
//!
//! * `fn matrix_data_form()`
//! * `fn solver_config()`
mod problem_3;
