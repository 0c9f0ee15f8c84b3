use rust_decimal::{
    prelude::{FromPrimitive, ToPrimitive},
    Decimal, RoundingStrategy,
};
use rust_decimal_macros::dec;

pub type Error = String;

const CENTS_PER_DOLLAR: Decimal = dec!(100);

/// Converts a dollar amount to whole cents, rounding half away from zero
/// (so 0.005 becomes 1 cent, and -0.005 becomes -1 cent).
pub fn dollars_to_cents(dollars: &Decimal) -> Result<i64, Error> {
    let cents = (dollars * CENTS_PER_DOLLAR)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    cents.to_i64().ok_or_else(|| format!("{} is out of range for a cent amount", dollars))
}

/// Converts a dollar amount to (possibly fractional) cents, without rounding.
/// Used for per-share amounts, which are not settled amounts.
pub fn dollars_to_fractional_cents(dollars: &Decimal) -> Result<f64, Error> {
    (dollars * CENTS_PER_DOLLAR)
        .to_f64()
        .ok_or_else(|| format!("{} is out of range for a cent amount", dollars))
}

/// Converts a cent value (as produced by the engine) to dollars.
/// Returns None for non-finite values, which Decimal cannot represent.
pub fn cents_to_dollars(cents: f64) -> Option<Decimal> {
    Decimal::from_f64(cents).map(|c| c / CENTS_PER_DOLLAR)
}

pub fn dollar_precision_str(d: &Decimal) -> String {
    format!("{:.2}", d)
}

/// Renders d with at least `min_precision` decimal places, but without
/// truncating any additional significant digits.
pub fn to_string_min_precision(d: &Decimal, min_precision: u32) -> String {
    let normalized = d.normalize();
    if normalized.scale() < min_precision {
        format!("{:.*}", min_precision as usize, normalized)
    } else {
        normalized.to_string()
    }
}

/// Inserts thousands separators into the integer part of a plain
/// (non-exponent) decimal string, eg. "-1234567.5" -> "-1,234,567.5"
pub fn with_thousands_separators(s: &str) -> String {
    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", s),
    };
    let (int_part, frac_part) = match unsigned.find('.') {
        Some(i) => (&unsigned[..i], &unsigned[i..]),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{sign}{grouped}{frac_part}")
}
