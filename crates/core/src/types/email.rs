//! Email addresses for accounts and order receipts.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// Why a string was rejected as an [`Email`].
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailError {
    #[error("email cannot be empty")]
    Empty,
    #[error("email must be at most {max} characters")]
    TooLong { max: usize },
    #[error("email cannot contain whitespace")]
    Whitespace,
    /// Not shaped like `name@host.tld`.
    #[error("email must look like name@domain.tld")]
    Shape,
}

/// A syntactically valid address of the form `name@host.tld`.
///
/// The address is kept exactly as typed. Lookups are case-sensitive, so
/// `Jean@Example.com` and `jean@example.com` belong to different accounts.
///
/// ```
/// use cleanpro_core::Email;
///
/// assert!(Email::parse("client@cleanpro.co.rw").is_ok());
/// assert!(Email::parse("user@localhost").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// RFC 5321 path limit.
    pub const MAX_LENGTH: usize = 254;

    /// Accept `raw` when it has exactly one `@`, a non-empty name, and a
    /// host with a dot that has text on both sides.
    ///
    /// # Errors
    ///
    /// Returns [`EmailError`] describing the first rule `raw` breaks.
    pub fn parse(raw: &str) -> Result<Self, EmailError> {
        if raw.is_empty() {
            return Err(EmailError::Empty);
        }
        if raw.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }
        if raw.contains(char::is_whitespace) {
            return Err(EmailError::Whitespace);
        }

        match raw.split_once('@') {
            Some((name, host)) if !name.is_empty() && host_is_dotted(host) => {
                Ok(Self(raw.to_owned()))
            }
            _ => Err(EmailError::Shape),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// `a.b`, `mail.co.rw`: no further `@`, and some dot is neither first nor last.
fn host_is_dotted(host: &str) -> bool {
    !host.contains('@')
        && host
            .match_indices('.')
            .any(|(at, _)| at > 0 && at + 1 < host.len())
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        Self::parse(&raw)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_common_addresses() {
        for ok in [
            "a@b.c",
            "user.name+tag@example.com",
            "client@cleanpro.co.rw",
            "ops@mail.kigali.example.org",
        ] {
            assert!(Email::parse(ok).is_ok(), "{ok} should parse");
        }
    }

    #[test]
    fn test_rejects_by_reason() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(
            Email::parse("jean uwase@cleanpro.rw"),
            Err(EmailError::Whitespace)
        );
        assert_eq!(
            Email::parse(&format!("{}@cleanpro.rw", "x".repeat(250))),
            Err(EmailError::TooLong { max: 254 })
        );
    }

    #[test]
    fn test_rejects_bad_shapes() {
        for bad in [
            "no-at-symbol",
            "@cleanpro.rw",
            "user@",
            "user@localhost",
            "user@.rw",
            "user@rw.",
            "a@b@cleanpro.rw",
        ] {
            assert_eq!(Email::parse(bad), Err(EmailError::Shape), "{bad}");
        }
    }

    #[test]
    fn test_keeps_case() {
        let mixed = Email::parse("Jean@Example.com").unwrap();
        assert_eq!(mixed.to_string(), "Jean@Example.com");
        assert_ne!(mixed, Email::parse("jean@example.com").unwrap());
    }

    #[test]
    fn test_json_rejects_malformed_address() {
        let email: Email = serde_json::from_str("\"jean@cleanpro.rw\"").unwrap();
        assert_eq!(email.as_str(), "jean@cleanpro.rw");
        assert!(serde_json::from_str::<Email>("\"jean\"").is_err());
    }
}
