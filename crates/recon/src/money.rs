//! Two-decimal formatting applied at the output boundary.
//!
//! Values stay `f64` inside the engine; only serialization and rendering
//! round them.

use serde::Serializer;

/// Format with exactly two decimals, halves rounded away from zero
/// (`12.125` is `12.13`). Negative zero renders as `0.00`.
pub fn fixed2(value: f64) -> String {
    let value = round2(value);
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.2}")
}

/// `$1234.50` / `-$30.00`.
pub fn dollars(value: f64) -> String {
    let text = fixed2(value);
    match text.strip_prefix('-') {
        Some(abs) => format!("-${abs}"),
        None => format!("${text}"),
    }
}

/// `40.00%`.
pub fn percent(value: f64) -> String {
    format!("{}%", fixed2(value))
}

/// Round half away from zero to two decimals.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// serde `serialize_with` helper: emit a two-decimal string.
pub fn serialize_fixed2<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&fixed2(*value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed2_pads_and_rounds() {
        assert_eq!(fixed2(40.0), "40.00");
        assert_eq!(fixed2(8.000000000000002), "8.00");
        assert_eq!(fixed2(-30.0), "-30.00");
        assert_eq!(fixed2(1234.567), "1234.57");
    }

    #[test]
    fn fixed2_rounds_halves_up() {
        assert_eq!(fixed2(0.125), "0.13");
        assert_eq!(fixed2(0.625), "0.63");
        assert_eq!(fixed2(12.125), "12.13");
        assert_eq!(fixed2(-0.125), "-0.13");
        assert_eq!(percent(12.125), "12.13%");
        assert_eq!(dollars(0.125), "$0.13");
    }

    #[test]
    fn negative_zero_is_plain_zero() {
        assert_eq!(fixed2(-0.0), "0.00");
        assert_eq!(dollars(-0.0), "$0.00");
    }

    #[test]
    fn dollars_puts_sign_before_symbol() {
        assert_eq!(dollars(12.5), "$12.50");
        assert_eq!(dollars(-30.0), "-$30.00");
    }

    #[test]
    fn percent_suffix() {
        assert_eq!(percent(40.0), "40.00%");
    }

    #[test]
    fn round2_keeps_cents() {
        assert_eq!(round2(3128.333), 3128.33);
        assert_eq!(round2(-30.0), -30.0);
    }
}
