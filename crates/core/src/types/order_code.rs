//! Human-shareable order codes.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Code printed on the receipt and quoted by clients, e.g. `DC123456042`.
///
/// Format: the `DC` prefix, the last six digits of the creation time in Unix
/// milliseconds, then a three-digit zero-padded random suffix. Codes are not
/// checked for uniqueness before insert; the `orders.order_code` unique
/// constraint is the only guard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct OrderCode(String);

impl OrderCode {
    /// Fixed prefix of every code.
    pub const PREFIX: &'static str = "DC";
    /// Exclusive upper bound of the random suffix.
    pub const SUFFIX_RANGE: u16 = 1000;

    /// Build a code from a creation time and a random suffix.
    ///
    /// The suffix is reduced modulo 1000 so callers can pass any random value.
    #[must_use]
    pub fn compose(created_at: DateTime<Utc>, suffix: u16) -> Self {
        let millis = created_at.timestamp_millis().rem_euclid(1_000_000);
        let suffix = suffix % Self::SUFFIX_RANGE;
        Self(format!("{}{millis:06}{suffix:03}", Self::PREFIX))
    }

    /// Wrap a code read back from storage.
    #[must_use]
    pub fn from_stored(code: String) -> Self {
        Self(code)
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the `OrderCode` and returns its inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for OrderCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for OrderCode {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn at_millis(millis: i64) -> DateTime<Utc> {
        DateTime::from_timestamp_millis(millis).unwrap()
    }

    #[test]
    fn test_compose_uses_last_six_millis_digits() {
        let code = OrderCode::compose(at_millis(1_718_000_123_456), 42);
        assert_eq!(code.as_str(), "DC123456042");
    }

    #[test]
    fn test_compose_pads_short_values() {
        let code = OrderCode::compose(at_millis(1_700_000_000_007), 5);
        assert_eq!(code.as_str(), "DC000007005");
    }

    #[test]
    fn test_compose_reduces_suffix() {
        let code = OrderCode::compose(at_millis(1_718_000_999_999), 1999);
        assert_eq!(code.as_str(), "DC999999999");
    }

    #[test]
    fn test_code_shape() {
        let code = OrderCode::compose(Utc::now(), 731);
        assert_eq!(code.as_str().len(), 11);
        assert!(code.as_str().starts_with("DC"));
        assert!(code.as_str()[2..].bytes().all(|b| b.is_ascii_digit()));
    }
}
