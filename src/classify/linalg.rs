use ndarray::prelude::*;

use crate::error::{ClassifyResult, ClusterError};

/// Sum of the elementwise products of `a` and `b`.
///
/// # Panics
///
/// Panics when the two views differ in length. Callers that cannot
/// guarantee equal lengths should go through [`cosine_similarity`].
pub fn dot(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.dot(&b)
}

/// Largest absolute component; NaN components are ignored.
fn max_abs(a: ArrayView1<f64>) -> f64 {
    a.iter().fold(0.0, |m: f64, x| m.max(x.abs()))
}

/// Euclidean norm of `a`.
///
/// Components are scaled by the largest one before squaring, so the result
/// neither overflows for huge finite components nor underflows for tiny ones.
pub fn magnitude(a: ArrayView1<f64>) -> f64 {
    let scale = max_abs(a);
    if scale == 0.0 || !scale.is_finite() {
        return scale;
    }
    let sum_sq: f64 = a.iter().map(|x| (x / scale) * (x / scale)).sum();
    scale * sum_sq.sqrt()
}

/// Cosine of the angle between `a` and `b`, in `[-1, 1]`.
///
/// A vector counts as zero-magnitude only when every component is exactly 0.
pub fn cosine_similarity(a: ArrayView1<f64>, b: ArrayView1<f64>) -> ClassifyResult<f64> {
    if a.len() != b.len() {
        return Err(ClusterError::LengthMismatch {
            left: a.len(),
            right: b.len(),
        });
    }
    if a.iter().chain(b.iter()).any(|x| !x.is_finite()) {
        return Err(ClusterError::NonFiniteVector);
    }
    let (scale_a, scale_b) = (max_abs(a), max_abs(b));
    if scale_a == 0.0 || scale_b == 0.0 {
        return Err(ClusterError::DegenerateVector);
    }

    // both operands scaled into [-1, 1]; direction is unchanged
    let mut dot_ab = 0.0;
    let mut norm_a = 0.0;
    let mut norm_b = 0.0;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot_ab += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    Ok((dot_ab / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// `1 - cosine_similarity(a, b)`, in `[0, 2]`; 0 means same direction.
pub fn cosine_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> ClassifyResult<f64> {
    Ok(1.0 - cosine_similarity(a, b)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dot_and_magnitude() {
        let a = arr1(&[3.0, 4.0]);
        let b = arr1(&[1.0, 2.0]);
        assert_eq!(dot(a.view(), b.view()), 11.0);
        assert_eq!(magnitude(a.view()), 5.0);
    }

    #[test]
    fn similarity_with_itself_is_one() {
        for v in [
            arr1(&[0.3, -1.7, 2.2, 9.1]),
            arr1(&[1e-3, 4.0, 0.0, 0.5]),
            arr1(&[-2.0, -2.0, -2.0, -2.0]),
        ] {
            let sim = cosine_similarity(v.view(), v.view()).unwrap();
            assert!((sim - 1.0).abs() < 1e-9, "sim={sim}");
        }
    }

    #[test]
    fn distance_ignores_magnitude() {
        let a = aview1(&[1.0, 0.0]);
        let b = aview1(&[5.0, 0.0]);
        assert_eq!(cosine_distance(a, b).unwrap(), 0.0);
    }

    #[test]
    fn distance_spans_zero_to_two() {
        let a = aview1(&[1.0, 0.0]);
        assert!((cosine_distance(a, aview1(&[0.0, 3.0])).unwrap() - 1.0).abs() < 1e-12);
        assert!((cosine_distance(a, aview1(&[-2.0, 0.0])).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn zero_vector_is_degenerate() {
        let zero = aview1(&[0.0, 0.0, 0.0]);
        let v = aview1(&[1.0, 2.0, 3.0]);
        assert_eq!(
            cosine_similarity(zero, v),
            Err(ClusterError::DegenerateVector)
        );
        assert_eq!(
            cosine_distance(v, zero),
            Err(ClusterError::DegenerateVector)
        );
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        assert_eq!(
            cosine_similarity(aview1(&[1.0, 0.0, 0.0]), aview1(&[1.0, 0.0])),
            Err(ClusterError::LengthMismatch { left: 3, right: 2 })
        );
    }

    #[test]
    fn extreme_magnitudes_keep_their_direction() {
        for v in [aview1(&[1e200, 0.0]), aview1(&[1e-170, 0.0]), aview1(&[-3e307, 4e307])] {
            let sim = cosine_similarity(v, v).unwrap();
            assert!((sim - 1.0).abs() < 1e-9, "sim={sim} for {v}");
        }

        let huge = aview1(&[1e200, 1e200]);
        let tiny = aview1(&[3e-170, 4e-170]);
        assert!((magnitude(huge) / (2.0_f64.sqrt() * 1e200) - 1.0).abs() < 1e-12);
        assert!((magnitude(tiny) / 5e-170 - 1.0).abs() < 1e-12);
        assert!((cosine_distance(huge, aview1(&[1e-170, 1e-170])).unwrap()).abs() < 1e-12);
    }

    #[test]
    fn similarity_stays_within_range() {
        let a = aview1(&[0.1, 0.2, 0.3]);
        let b = aview1(&[0.3, 0.6, 0.9]);
        let sim = cosine_similarity(a, b).unwrap();
        assert!((-1.0..=1.0).contains(&sim));
        assert!(cosine_distance(a, b).unwrap() >= 0.0);
    }

    #[test]
    fn non_finite_components_are_rejected() {
        let v = aview1(&[1.0, 0.0]);
        for bad in [[0.0, f64::NAN], [f64::INFINITY, 0.0], [f64::NEG_INFINITY, 1.0]] {
            assert_eq!(
                cosine_similarity(v, aview1(&bad)),
                Err(ClusterError::NonFiniteVector)
            );
            assert_eq!(
                cosine_distance(aview1(&bad), v),
                Err(ClusterError::NonFiniteVector)
            );
        }
    }
}
