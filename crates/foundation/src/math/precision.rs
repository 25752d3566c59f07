//! Float normalization for values that end up in descriptors.
//!
//! Bearings and yaws are compared in tests and serialized for renderers, so
//! signed zero must not leak out and ties must order the same way every run.

use core::cmp::Ordering;

/// `-0.0` becomes `0.0` and every NaN becomes the same NaN.
pub fn canonical_f64(v: f64) -> f64 {
    if v == 0.0 {
        0.0
    } else if v.is_nan() {
        f64::NAN
    } else {
        v
    }
}

/// Total order over canonicalized floats. Use for sorting by distance.
pub fn stable_total_cmp_f64(a: f64, b: f64) -> Ordering {
    canonical_f64(a).total_cmp(&canonical_f64(b))
}

#[cfg(test)]
mod tests {
    use super::{canonical_f64, stable_total_cmp_f64};
    use core::cmp::Ordering;

    #[test]
    fn negative_zero_is_positive_after_canonicalizing() {
        assert!(canonical_f64(-0.0).is_sign_positive());
        assert_eq!(canonical_f64(12.5), 12.5);
    }

    #[test]
    fn distances_sort_without_surprises() {
        let mut d = vec![120.0, -0.0, f64::NAN, 35.5];
        d.sort_by(|a, b| stable_total_cmp_f64(*a, *b));
        assert_eq!(&d[..3], &[0.0, 35.5, 120.0]);
        assert!(d[3].is_nan());
        assert_eq!(stable_total_cmp_f64(-0.0, 0.0), Ordering::Equal);
    }
}
