//! Degree helpers for compass bearings and viewer yaw.

use super::precision::canonical_f64;

/// Wrap an angle in degrees into `[0, 360)`.
pub fn wrap_degrees_360(deg: f64) -> f64 {
    let wrapped = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs.
    if wrapped >= 360.0 {
        0.0
    } else {
        canonical_f64(wrapped)
    }
}

/// Wrap an angle in degrees into `[-180, 180)`.
pub fn wrap_degrees_180(deg: f64) -> f64 {
    wrap_degrees_360(deg + 180.0) - 180.0
}

/// Smallest signed difference `a - b` in degrees, in `[-180, 180)`.
pub fn angle_delta_degrees(a: f64, b: f64) -> f64 {
    wrap_degrees_180(a - b)
}

#[cfg(test)]
mod tests {
    use super::{angle_delta_degrees, wrap_degrees_180, wrap_degrees_360};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn wraps_into_positive_range() {
        assert_close(wrap_degrees_360(-62.0), 298.0, 1e-12);
        assert_close(wrap_degrees_360(720.0), 0.0, 1e-12);
        assert_close(wrap_degrees_360(359.5), 359.5, 1e-12);
        assert!(wrap_degrees_360(-1e-18) < 360.0);
    }

    #[test]
    fn wraps_into_signed_range() {
        assert_close(wrap_degrees_180(190.0), -170.0, 1e-12);
        assert_close(wrap_degrees_180(-190.0), 170.0, 1e-12);
        assert_close(wrap_degrees_180(180.0), -180.0, 1e-12);
    }

    #[test]
    fn delta_takes_short_way_round() {
        assert_close(angle_delta_degrees(10.0, 350.0), 20.0, 1e-12);
        assert_close(angle_delta_degrees(350.0, 10.0), -20.0, 1e-12);
    }
}
