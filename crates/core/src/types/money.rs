//! Money formatting.
//!
//! Amounts are Rwandan francs held as [`Decimal`]. The franc has no minor unit
//! in everyday use, so amounts are usually whole numbers, but nothing stops a
//! price like `1250.50` from being entered.

use rust_decimal::{Decimal, RoundingStrategy};

/// Currency prefix used on receipts and in emails.
pub const CURRENCY: &str = "RWF";

/// Format an amount for display, e.g. `RWF 8,500` or `RWF 1,250.50`.
///
/// Whole amounts are shown without decimals; anything else is rounded to two
/// places.
#[must_use]
pub fn format_rwf(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let abs = rounded.abs();
    let whole = abs.trunc();
    let fraction = abs - whole;

    let grouped = group_thousands(&whole.to_string());

    if fraction.is_zero() {
        format!("{CURRENCY} {sign}{grouped}")
    } else {
        // fraction is in (0, 1) with at most two places
        let cents = (fraction * Decimal::ONE_HUNDRED).trunc();
        format!("{CURRENCY} {sign}{grouped}.{cents:0>2}")
    }
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_amounts() {
        assert_eq!(format_rwf(Decimal::from(0)), "RWF 0");
        assert_eq!(format_rwf(Decimal::from(500)), "RWF 500");
        assert_eq!(format_rwf(Decimal::from(8500)), "RWF 8,500");
        assert_eq!(format_rwf(Decimal::from(1_234_567)), "RWF 1,234,567");
    }

    #[test]
    fn test_fractional_amounts() {
        assert_eq!(format_rwf(Decimal::new(125_050, 2)), "RWF 1,250.50");
        assert_eq!(format_rwf(Decimal::new(1005, 3)), "RWF 1.01");
        assert_eq!(format_rwf(Decimal::new(30_000, 1)), "RWF 3,000");
    }

    #[test]
    fn test_negative_amount() {
        assert_eq!(format_rwf(Decimal::from(-2000)), "RWF -2,000");
    }
}
