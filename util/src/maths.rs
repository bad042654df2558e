//! Utility maths functions

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use num_traits::Float;

/// Linearly interpolate between `a` and `b`.
///
/// `t = 0` gives `a` and `t = 1` gives `b`. `t` is not clamped.
pub fn lerp<T>(a: T, b: T, t: T) -> T
where
    T: Float,
{
    a + (b - a) * t
}

/// Calculates the least nonnegative remainder of `lhs (mod rhs)`.
///
/// This function is taken from the std library as num is missing it.
///
/// In particular, the return value `r` satisfies `0.0 <= r < rhs.abs()` in
/// most cases. However, due to a floating point round-off error it can
/// result in `r == rhs.abs()`, violating the mathematical definition, if
/// `self` is much smaller than `rhs.abs()` in magnitude and `self < 0.0`.
pub fn rem_euclid<T>(lhs: T, rhs: T) -> T
where
    T: Float,
{
    let r = lhs % rhs;
    if r < T::zero() {
        r + rhs.abs()
    } else {
        r
    }
}

/// Wrap an angle in radians into the range (-pi, pi].
///
/// Non-finite angles are returned unchanged (as NaN).
pub fn wrap_pi<T>(angle: T) -> T
where
    T: Float,
{
    let pi_t = T::from(std::f64::consts::PI).unwrap_or_else(T::nan);
    let tau_t = T::from(std::f64::consts::TAU).unwrap_or_else(T::nan);

    let wrapped = rem_euclid(angle + pi_t, tau_t) - pi_t;

    if wrapped <= -pi_t {
        wrapped + tau_t
    } else {
        wrapped
    }
}

/// Get the signed shortest angular distance from `a` to `b`.
///
/// The result lies in (-pi, pi] and is positive when `b` is anticlockwise
/// of `a`.
pub fn get_ang_dist<T>(a: T, b: T) -> T
where
    T: Float,
{
    wrap_pi(b - a)
}

#[cfg(test)]
mod test {
    use super::*;
    use std::f64::consts::{PI, TAU};

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-12, "{} != {}", a, b);
    }

    #[test]
    fn test_wrap_pi() {
        assert_close(wrap_pi(0f64), 0.0);
        assert_close(wrap_pi(1f64), 1.0);
        assert_close(wrap_pi(PI), PI);
        assert_close(wrap_pi(-PI), PI);
        assert_close(wrap_pi(TAU), 0.0);
        assert_close(wrap_pi(3.0 * PI / 2.0), -PI / 2.0);
        assert_close(wrap_pi(-3.0 * PI / 2.0), PI / 2.0);
        assert_close(wrap_pi(5.0 * TAU + 0.5), 0.5);
        assert!(wrap_pi(f64::NAN).is_nan());
    }

    #[test]
    fn test_get_ang_dist() {
        assert_close(get_ang_dist(1f64, 2f64), 1.0);
        assert_close(get_ang_dist(2f64, 1f64), -1.0);
        assert_close(get_ang_dist(0f64, TAU), 0.0);
        assert_close(get_ang_dist(TAU, 0f64), 0.0);
        assert_close(get_ang_dist(TAU - 0.5, 0.5), 1.0);
        assert_close(get_ang_dist(0.5, TAU - 0.5), -1.0);
    }

    #[test]
    fn test_lerp() {
        assert_close(lerp(1.0, 3.0, 0.0), 1.0);
        assert_close(lerp(1.0, 3.0, 0.25), 1.5);
        assert_close(lerp(1.0, 3.0, 1.0), 3.0);
    }
}
