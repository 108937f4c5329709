//! One-time password codes.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`OtpCode`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OtpCodeError {
    /// The code is not six characters long.
    #[error("verification code must have {expected} digits")]
    WrongLength {
        /// Required number of digits.
        expected: usize,
    },
    /// The code contains something other than ASCII digits.
    #[error("verification code must contain only digits")]
    NonDigit,
    /// The code starts with zero, which issued codes never do.
    #[error("verification code cannot start with 0")]
    LeadingZero,
}

/// A six-digit one-time password in `100000..=999999`.
///
/// Codes are generated by the API crate; this type only guarantees the shape.
/// `Debug` is redacted so codes do not leak into logs.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OtpCode(String);

impl OtpCode {
    /// Number of digits in a code.
    pub const LENGTH: usize = 6;
    /// Smallest valid code value.
    pub const MIN: u32 = 100_000;
    /// Largest valid code value.
    pub const MAX: u32 = 999_999;

    /// Parse an `OtpCode` from user input.
    ///
    /// Surrounding whitespace is trimmed because codes are usually pasted from
    /// an email.
    ///
    /// # Errors
    ///
    /// Returns an error unless the trimmed input is six ASCII digits not starting
    /// with zero.
    pub fn parse(s: &str) -> Result<Self, OtpCodeError> {
        let s = s.trim();

        if s.len() != Self::LENGTH {
            return Err(OtpCodeError::WrongLength {
                expected: Self::LENGTH,
            });
        }

        if !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(OtpCodeError::NonDigit);
        }

        if s.starts_with('0') {
            return Err(OtpCodeError::LeadingZero);
        }

        Ok(Self(s.to_owned()))
    }

    /// Build a code from a number in `MIN..=MAX`.
    ///
    /// Returns `None` if the value is out of range.
    #[must_use]
    pub fn from_number(value: u32) -> Option<Self> {
        (Self::MIN..=Self::MAX)
            .contains(&value)
            .then(|| Self(value.to_string()))
    }

    /// Number of distinct codes.
    pub const SPACE: u32 = Self::MAX - Self::MIN + 1;

    /// Map `offset` onto the code space, wrapping modulo [`Self::SPACE`].
    ///
    /// A uniform offset in `0..SPACE` yields a uniform code.
    #[must_use]
    pub fn from_offset(offset: u32) -> Self {
        Self((Self::MIN + offset % Self::SPACE).to_string())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("OtpCode([REDACTED])")
    }
}

impl fmt::Display for OtpCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OtpCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
