//! Rwandan mobile phone numbers.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing a [`PhoneNumber`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum PhoneNumberError {
    /// The number does not have exactly ten characters.
    #[error("phone number must have exactly {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The number contains something other than ASCII digits.
    #[error("phone number must contain only digits")]
    NonDigit,
    /// The number does not start with `07`.
    #[error("phone number must start with 07")]
    WrongPrefix,
    /// The operator digit after `07` is outside 2-9.
    #[error("phone number operator digit must be between 2 and 9")]
    UnknownOperator,
}

/// A local-format Rwandan mobile number, e.g. `0788123456`.
///
/// The format is `07`, then an operator digit in `2..=9`, then seven more digits.
/// International prefixes (`+250`) and separators are not accepted; clients send
/// the ten-digit form that is printed on receipts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Number of digits in a valid phone number.
    pub const LENGTH: usize = 10;

    /// Parse a `PhoneNumber` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is not exactly `07[2-9]` followed by seven
    /// digits.
    pub fn parse(s: &str) -> Result<Self, PhoneNumberError> {
        let bytes = s.as_bytes();

        if bytes.len() != Self::LENGTH {
            return Err(PhoneNumberError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !bytes.iter().all(u8::is_ascii_digit) {
            return Err(PhoneNumberError::NonDigit);
        }

        if !s.starts_with("07") {
            return Err(PhoneNumberError::WrongPrefix);
        }

        if !matches!(bytes.get(2), Some(b'2'..=b'9')) {
            return Err(PhoneNumberError::UnknownOperator);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the phone number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `PhoneNumber` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PhoneNumber {
    type Err = PhoneNumberError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl AsRef<str> for PhoneNumber {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
