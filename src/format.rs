//! Canonical string rendering for the numeric atomic types.
//!
//! These are pure functions. Pattern selection depends only on the value
//! passed in: magnitudes below 1e6 render with an optional fraction,
//! magnitudes at or above it always carry at least one fractional digit.

use rust_decimal::Decimal;

const PLAIN_PATTERN_LIMIT: f64 = 1_000_000.0;

/// Renders an `xs:double`. Infinities become `INF`/`-INF`, NaN becomes
/// `NaN`, and negative zero keeps its sign.
pub fn format_double(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }
    let mut s = value.to_string();
    if value.abs() >= PLAIN_PATTERN_LIMIT && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Renders an `xs:float`. Unlike double, both zeros render as plain `0`.
pub fn format_float(value: f32) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "INF" } else { "-INF" }.to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    let mut s = value.to_string();
    if value.abs() >= PLAIN_PATTERN_LIMIT as f32 && !s.contains('.') {
        s.push_str(".0");
    }
    s
}

/// Renders an `xs:decimal` with trailing fraction zeros removed.
pub fn format_decimal(value: &Decimal) -> String {
    if value.is_zero() {
        return "0".to_string();
    }
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    #[test]
    fn double_pattern_threshold() {
        assert_eq!(format_double(999_999.5), "999999.5");
        assert_eq!(format_double(1_000_000.5), "1000000.5");
        // Below the threshold the fraction is optional; at or above it
        // one fractional digit is forced.
        assert_eq!(format_double(999_999.0), "999999");
        assert_eq!(format_double(1_000_000.0), "1000000.0");
        assert_eq!(format_double(-2_500_000.0), "-2500000.0");
    }

    #[test]
    fn double_specials() {
        assert_eq!(format_double(f64::INFINITY), "INF");
        assert_eq!(format_double(f64::NEG_INFINITY), "-INF");
        assert_eq!(format_double(f64::NAN), "NaN");
        assert_eq!(format_double(0.0), "0");
        assert_eq!(format_double(-0.0), "-0");
    }

    #[test]
    fn float_zero_drops_sign() {
        assert_eq!(format_float(0.0), "0");
        assert_eq!(format_float(-0.0), "0");
        assert_eq!(format_float(f32::NEG_INFINITY), "-INF");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(2_000_000.0), "2000000.0");
    }

    #[test]
    fn decimal_strips_trailing_zeros() {
        let d = Decimal::from_str("1.500").unwrap();
        assert_eq!(format_decimal(&d), "1.5");
        let d = Decimal::from_str("42.00").unwrap();
        assert_eq!(format_decimal(&d), "42");
        let d = Decimal::from_str("-0.00").unwrap();
        assert_eq!(format_decimal(&d), "0");
    }
}
