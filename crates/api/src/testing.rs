//! Test doubles for the notifier and clock.
//!
//! Shared by the unit tests here and the `cleanpro-integration-tests` crate.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};

use cleanpro_core::{Email, OtpCode};

use crate::models::OrderSummary;
use crate::services::clock::Clock;
use crate::services::email::{NotifyError, Notifier};

/// A message the [`RecordingNotifier`] was asked to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentNotification {
    Otp { to: Email, code: OtpCode },
    PasswordReset { to: Email, code: OtpCode },
    OrderConfirmation { to: Email, order_code: String },
    OrderReady { to: Email, order_code: String },
}

impl SentNotification {
    /// Recipient of the message.
    #[must_use]
    pub const fn to(&self) -> &Email {
        match self {
            Self::Otp { to, .. }
            | Self::PasswordReset { to, .. }
            | Self::OrderConfirmation { to, .. }
            | Self::OrderReady { to, .. } => to,
        }
    }
}

#[derive(Default)]
struct Recorded {
    sent: Vec<SentNotification>,
    failing: bool,
}

/// Notifier that keeps every message in memory.
///
/// Clones share the same record. While [`RecordingNotifier::set_failing`] is on,
/// every send fails and nothing is recorded.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    inner: Arc<Mutex<Recorded>>,
}

impl RecordingNotifier {
    /// Create a notifier with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make later sends fail (`true`) or succeed again (`false`).
    pub fn set_failing(&self, failing: bool) {
        self.lock().failing = failing;
    }

    /// Everything sent so far, oldest first.
    #[must_use]
    pub fn sent(&self) -> Vec<SentNotification> {
        self.lock().sent.clone()
    }

    /// The most recent login or reset code sent to `to`.
    #[must_use]
    pub fn last_code_for(&self, to: &Email) -> Option<OtpCode> {
        self.lock().sent.iter().rev().find_map(|n| match n {
            SentNotification::Otp { to: t, code } | SentNotification::PasswordReset { to: t, code }
                if t == to =>
            {
                Some(code.clone())
            }
            _ => None,
        })
    }

    fn record(&self, notification: SentNotification) -> Result<(), NotifyError> {
        let mut recorded = self.lock();
        if recorded.failing {
            return Err(NotifyError::Unavailable("recording notifier set to fail".to_owned()));
        }
        recorded.sent.push(notification);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    fn channel(&self) -> &'static str {
        "recording"
    }

    async fn send_otp(&self, to: &Email, _name: &str, code: &OtpCode) -> Result<(), NotifyError> {
        self.record(SentNotification::Otp {
            to: to.clone(),
            code: code.clone(),
        })
    }

    async fn send_password_reset(
        &self,
        to: &Email,
        _name: &str,
        code: &OtpCode,
    ) -> Result<(), NotifyError> {
        self.record(SentNotification::PasswordReset {
            to: to.clone(),
            code: code.clone(),
        })
    }

    async fn send_order_confirmation(
        &self,
        to: &Email,
        _name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        self.record(SentNotification::OrderConfirmation {
            to: to.clone(),
            order_code: order.order_code.clone(),
        })
    }

    async fn send_order_ready(
        &self,
        to: &Email,
        _name: &str,
        order: &OrderSummary,
    ) -> Result<(), NotifyError> {
        self.record(SentNotification::OrderReady {
            to: to.clone(),
            order_code: order.order_code.clone(),
        })
    }
}

/// Clock that only moves when told to. Clones share the same time.
#[derive(Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl ManualClock {
    /// Start the clock at `now`.
    #[must_use]
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Arc::new(Mutex::new(now)),
        }
    }

    /// A fixed midday instant, so that small moves stay on the same UTC date.
    #[must_use]
    pub fn at_noon() -> Self {
        Self::new(Utc.with_ymd_and_hms(2025, 3, 14, 12, 0, 0).single().unwrap_or_default())
    }

    fn lock(&self) -> MutexGuard<'_, DateTime<Utc>> {
        self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Jump to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.lock() = now;
    }

    /// Move forward by `by`.
    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.lock()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_notifier_records_and_fails() {
        let notifier = RecordingNotifier::new();
        let to = Email::parse("jean@cleanpro.rw").unwrap();
        let code = OtpCode::parse("123456").unwrap();

        notifier.send_otp(&to, "Jean", &code).await.unwrap();
        assert_eq!(notifier.last_code_for(&to), Some(code.clone()));

        notifier.set_failing(true);
        assert!(notifier.send_otp(&to, "Jean", &code).await.is_err());
        assert_eq!(notifier.sent().len(), 1);
    }

    #[test]
    fn test_manual_clock_moves_only_when_told() {
        let clock = ManualClock::at_noon();
        let start = clock.now();
        clock.advance(Duration::minutes(10));
        assert_eq!(clock.now() - start, Duration::minutes(10));
    }
}
