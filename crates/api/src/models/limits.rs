//! Column limits from the migrations.
//!
//! Inputs are checked against these before they reach the store, so an
//! oversized value is reported as a validation error rather than a database
//! failure.

use rust_decimal::Decimal;

/// `orders.client_name` and `users.full_name`.
pub const NAME_MAX_CHARS: usize = 100;

/// `order_items.type`.
pub const ITEM_TYPE_MAX_CHARS: usize = 50;

/// `users.business_name`.
pub const BUSINESS_NAME_MAX_CHARS: usize = 150;

/// `users.phone`.
pub const USER_PHONE_MAX_CHARS: usize = 20;

/// Digits after the point in a `NUMERIC(10, 2)` column.
pub const AMOUNT_SCALE: u32 = 2;

/// Largest value a `NUMERIC(10, 2)` column holds: 99,999,999.99.
pub const AMOUNT_MAX: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// Whether `value` fits a `VARCHAR(max_chars)` column.
#[must_use]
pub fn fits_chars(value: &str, max_chars: usize) -> bool {
    value.chars().count() <= max_chars
}

/// Why an amount does not fit a `NUMERIC(10, 2)` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountProblem {
    Negative,
    TooPrecise,
    TooLarge,
}

/// Check a money amount against the column type.
///
/// # Errors
///
/// Returns the first [`AmountProblem`] found.
pub fn check_amount(value: Decimal) -> Result<Decimal, AmountProblem> {
    if value.is_sign_negative() && !value.is_zero() {
        Err(AmountProblem::Negative)
    } else if value.normalize().scale() > AMOUNT_SCALE {
        Err(AmountProblem::TooPrecise)
    } else if value > AMOUNT_MAX {
        Err(AmountProblem::TooLarge)
    } else {
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap_or_default()
    }

    #[test]
    fn test_amount_max_is_ten_digits() {
        assert_eq!(AMOUNT_MAX.to_string(), "99999999.99");
    }

    #[test]
    fn test_check_amount() {
        assert_eq!(check_amount(dec("0")), Ok(Decimal::ZERO));
        assert_eq!(check_amount(dec("1500.50")), Ok(dec("1500.50")));
        assert_eq!(check_amount(dec("2.500")), Ok(dec("2.500")));
        assert_eq!(check_amount(dec("99999999.99")), Ok(AMOUNT_MAX));
        assert_eq!(check_amount(dec("-1")), Err(AmountProblem::Negative));
        assert_eq!(check_amount(dec("1.005")), Err(AmountProblem::TooPrecise));
        assert_eq!(check_amount(dec("100000000")), Err(AmountProblem::TooLarge));
        assert_eq!(check_amount(Decimal::MAX), Err(AmountProblem::TooLarge));
    }

    #[test]
    fn test_fits_chars_counts_characters() {
        assert!(fits_chars(&"é".repeat(100), NAME_MAX_CHARS));
        assert!(!fits_chars(&"x".repeat(101), NAME_MAX_CHARS));
    }
}
