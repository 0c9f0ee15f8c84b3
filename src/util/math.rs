/// Divides `numerator` by `denominator`, resolving a zero denominator to 0.
///
/// All per-share figures (ACB per share, sell price per share) go through
/// here or through `per_held_share`. Neither ever returns NaN or infinity.
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Per-share value of `total` across a held share balance.
///
/// Zero or negative balances (possible after an oversell) resolve to 0.
pub fn per_held_share(total: f64, shares: f64) -> f64 {
    if shares > 0.0 {
        safe_div(total, shares)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::{per_held_share, safe_div};

    #[test]
    fn test_safe_div() {
        assert_eq!(safe_div(10.0, 4.0), 2.5);
        assert_eq!(safe_div(-10.0, 4.0), -2.5);
        assert_eq!(safe_div(10.0, -4.0), -2.5);
        assert_eq!(safe_div(10.0, 0.0), 0.0);
        assert_eq!(safe_div(0.0, 0.0), 0.0);
        assert!(!safe_div(1.0, 0.0).is_nan());
    }

    #[test]
    fn test_per_held_share() {
        assert_eq!(per_held_share(100000.0, 100.0), 1000.0);
        assert_eq!(per_held_share(100000.0, 0.0), 0.0);
        // Oversold balance
        assert_eq!(per_held_share(100000.0, -5.0), 0.0);
        assert_eq!(per_held_share(0.0, 10.0), 0.0);
    }
}
