//! # Dense vector operations
//!
//! Work vectors in the simplex core are dense, of length `m + 1`. These helpers are the only
//! arithmetic on them that is shared between the factorization and the iterator.
use crate::data::linear_algebra::SparseTuple;
use crate::data::number_types::traits::Field;

/// Largest absolute value in a vector, zero for an empty vector.
pub fn max_abs<F: Field>(vector: &[F]) -> F {
    vector.iter().fold(F::zero(), |maximum, value| maximum.max(value.abs()))
}

/// Zero all entries that are small relative to the largest entry.
///
/// # Arguments
///
/// * `vector`: Values to round in place.
/// * `tolerance`: Relative tolerance; an entry `x` is zeroed when `|x| < tolerance * max |x|`.
pub fn round_relative<F: Field>(vector: &mut [F], tolerance: F) {
    let threshold = tolerance * max_abs(vector);
    if threshold > F::zero() {
        round_absolute(vector, threshold);
    }
}

/// Zero all entries with an absolute value below `tolerance`.
pub fn round_absolute<F: Field>(vector: &mut [F], tolerance: F) {
    for value in vector.iter_mut() {
        if value.abs() < tolerance {
            *value = F::zero();
        }
    }
}

/// Inner product of a dense vector with a sparse one.
///
/// # Arguments
///
/// * `dense`: Dense vector, at least as long as the largest index in `sparse`.
/// * `sparse`: Index value pairs.
pub fn inner_product<F: Field>(dense: &[F], sparse: &[SparseTuple<F>]) -> F {
    sparse.iter()
        .map(|&(i, value)| {
            debug_assert!(i < dense.len());
            dense[i] * value
        })
        .sum()
}

/// Subtract a multiple of `source` from `target`, `target -= factor * source`.
pub fn subtract_multiple<F: Field>(target: &mut [F], factor: F, source: &[F]) {
    debug_assert_eq!(target.len(), source.len());

    if factor == F::zero() {
        return;
    }
    for (value, &change) in target.iter_mut().zip(source) {
        if change != F::zero() {
            *value -= factor * change;
        }
    }
}

/// Scatter a sparse vector into a dense one of length `len`.
pub fn to_dense<F: Field>(sparse: &[SparseTuple<F>], len: usize) -> Vec<F> {
    let mut dense = vec![F::zero(); len];
    for &(i, value) in sparse {
        debug_assert!(i < len);
        dense[i] = value;
    }
    dense
}

/// A dense unit vector `e_i` of length `len`.
pub fn unit<F: Field>(i: usize, len: usize) -> Vec<F> {
    debug_assert!(i < len);

    let mut dense = vec![F::zero(); len];
    dense[i] = F::one();
    dense
}

#[cfg(test)]
mod test {
    use approx::assert_abs_diff_eq;

    use crate::data::linear_algebra::vector::{inner_product, max_abs, round_absolute, round_relative, subtract_multiple, to_dense, unit};

    #[test]
    fn maximum() {
        assert_eq!(max_abs::<f64>(&[]), 0_f64);
        assert_eq!(max_abs(&[1_f64, -3_f64, 2_f64]), 3_f64);
    }

    #[test]
    fn rounding() {
        let mut vector = vec![1e6, 1e-8, -2e-7, 3_f64];
        round_relative(&mut vector, 1e-12);
        assert_eq!(vector, vec![1e6, 0_f64, 0_f64, 3_f64]);

        let mut vector = vec![1e-8, -1e-8, 0_f64];
        round_relative(&mut vector, 1e-12);
        assert_eq!(vector, vec![1e-8, -1e-8, 0_f64]);

        let mut vector = vec![1e-8, -1e-5, 0.5];
        round_absolute(&mut vector, 1e-6);
        assert_eq!(vector, vec![0_f64, -1e-5, 0.5]);
    }

    #[test]
    fn products() {
        let dense = vec![1_f64, 2_f64, 3_f64];
        assert_abs_diff_eq!(inner_product(&dense, &[(0, 2_f64), (2, -1_f64)]), -1_f64);
        assert_abs_diff_eq!(inner_product(&dense, &[]), 0_f64);

        let mut target = vec![1_f64, 1_f64, 1_f64];
        subtract_multiple(&mut target, 2_f64, &dense);
        assert_eq!(target, vec![-1_f64, -3_f64, -5_f64]);
    }

    #[test]
    fn construction() {
        assert_eq!(to_dense(&[(1, 4_f64)], 3), vec![0_f64, 4_f64, 0_f64]);
        assert_eq!(unit::<f64>(2, 3), vec![0_f64, 0_f64, 1_f64]);
    }
}
