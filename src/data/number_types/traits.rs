//! # Traits
//!
//! The factorization and iteration logic only needs the operations of an ordered field together
//! with the finite representation properties of floats: an epsilon, an infinity and an absolute
//! value. `num_traits::Float` provides these, the remaining bounds are practicalities.
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use num_traits::{Float, FromPrimitive};

/// Floating point numbers the simplex core computes with.
///
/// Automatically implemented for all types satisfying the trait's bounds.
pub trait Field:
    Float +
    FromPrimitive +
    AddAssign +
    SubAssign +
    MulAssign +
    DivAssign +
    Sum +
    Debug +
    Display +
    Default +
    Send +
    Sync +
    'static
{
    /// Convert to a `f64` for reporting purposes (errors and log fields).
    fn to_report(self) -> f64 {
        self.to_f64().unwrap_or(f64::NAN)
    }
}

impl<T> Field for T
where
    T: Float + FromPrimitive + AddAssign + SubAssign + MulAssign + DivAssign + Sum + Debug + Display
    + Default + Send + Sync + 'static,
{
}
