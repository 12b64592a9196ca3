//! Magnitude-scaled floating point comparisons.
//!
//! Water contents, fluxes and temperatures span several orders of magnitude,
//! so equality is judged relative to the larger operand:
//!
//! $$|a - b| \le \epsilon \cdot \max(1, |a|, |b|)$$
//!
//! with $\epsilon$ = [`F_DELTA`] unless a tolerance is given explicitly.

use num::Float;

/// Default relative tolerance for comparisons.
pub const F_DELTA: f64 = 1e-9;

fn tolerance<T: Float>(a: T, b: T, eps: T) -> T {
    eps * T::one().max(a.abs()).max(b.abs())
}

fn default_eps<T: Float>() -> T {
    T::from(F_DELTA).unwrap_or_else(T::epsilon)
}

/// `a == b` within the scaled tolerance `eps`.
pub fn eq_tol<T: Float>(a: T, b: T, eps: T) -> bool {
    (a - b).abs() <= tolerance(a, b, eps)
}

/// `a == b` within the default scaled tolerance.
pub fn eq<T: Float>(a: T, b: T) -> bool {
    eq_tol(a, b, default_eps())
}

/// `a > b` by more than the default scaled tolerance.
pub fn gt<T: Float>(a: T, b: T) -> bool {
    a - b > tolerance(a, b, default_eps())
}

/// `a < b` by more than the default scaled tolerance.
pub fn lt<T: Float>(a: T, b: T) -> bool {
    b - a > tolerance(a, b, default_eps())
}

/// `a >= b` allowing for the default scaled tolerance.
pub fn ge<T: Float>(a: T, b: T) -> bool {
    !lt(a, b)
}

/// `a <= b` allowing for the default scaled tolerance.
pub fn le<T: Float>(a: T, b: T) -> bool {
    !gt(a, b)
}

/// `a == 0` within the default tolerance.
pub fn zro<T: Float>(a: T) -> bool {
    eq(a, T::zero())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scaled_equality() {
        assert!(eq(1.0, 1.0 + 1e-12));
        assert!(!eq(1.0, 1.0 + 1e-6));
        // Large magnitudes get a proportionally larger window
        assert!(eq(1e6, 1e6 + 1e-4));
        assert!(!eq(1e6, 1e6 + 1.0));
    }

    #[test]
    fn test_ordering() {
        assert!(gt(1.0, 0.5));
        assert!(!gt(1.0, 1.0 + 1e-12));
        assert!(lt(0.5, 1.0));
        assert!(ge(1.0, 1.0 + 1e-12));
        assert!(le(1.0 + 1e-12, 1.0));
        assert!(!le(1.1, 1.0));
    }

    #[test]
    fn test_zero() {
        assert!(zro(0.0));
        assert!(zro(1e-12));
        assert!(!zro(1e-6));
        assert!(zro(-1e-12_f32));
    }

    #[test]
    fn test_explicit_tolerance() {
        assert!(eq_tol(100.0, 100.5, 0.01));
        assert!(!eq_tol(100.0, 102.0, 0.01));
    }
}
