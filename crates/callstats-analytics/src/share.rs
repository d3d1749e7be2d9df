//! Share derivation
//!
//! Every percentage the dashboard renders goes through [`ratio`]. A zero (or
//! otherwise unusable) denominator yields `0.0`, and the result is always a
//! finite number in `[0, 1]`.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// `part / whole`, or `0.0` when the division is meaningless
pub fn ratio(part: f64, whole: f64) -> f64 {
    if !part.is_finite() || !whole.is_finite() || whole <= 0.0 {
        return 0.0;
    }

    (part / whole).clamp(0.0, 1.0)
}

/// Fraction of total revenue contributed by `part`
pub fn revenue_share(part: Decimal, whole: Decimal) -> f64 {
    match part.checked_div(whole) {
        Some(fraction) if whole > Decimal::ZERO => ratio(fraction.to_f64().unwrap_or(0.0), 1.0),
        _ => 0.0,
    }
}

/// Fraction of total calls carried by `part`
pub fn count_share(part: u64, whole: u64) -> f64 {
    ratio(part as f64, whole as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_zero_denominator_is_zero() {
        assert_eq!(ratio(5.0, 0.0), 0.0);
        assert_eq!(count_share(0, 0), 0.0);
        assert_eq!(revenue_share(dec!(0), dec!(0)), 0.0);
        assert_eq!(revenue_share(dec!(3.50), dec!(0)), 0.0);
    }

    #[test]
    fn test_non_finite_inputs() {
        assert_eq!(ratio(f64::NAN, 10.0), 0.0);
        assert_eq!(ratio(1.0, f64::INFINITY), 0.0);
    }

    #[test]
    fn test_regular_shares() {
        assert!((revenue_share(dec!(30.00), dec!(35.00)) - 0.857_142_857).abs() < 1e-6);
        assert_eq!(count_share(1, 4), 0.25);
        assert_eq!(count_share(4, 4), 1.0);
    }
}
