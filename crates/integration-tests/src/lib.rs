//! Integration tests for CleanPro.
//!
//! # Running Tests
//!
//! ```bash
//! # Service and HTTP tests (no database needed)
//! cargo test -p cleanpro-integration-tests
//!
//! # Also run the PostgreSQL repository tests
//! DATABASE_URL=postgres://localhost/cleanpro_test \
//!     cargo test -p cleanpro-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `auth_flow` - Registration, OTP login, password reset, profile
//! - `orders` - Order validation, lifecycle, notifications, search, stats
//! - `http_api` - Routes, status codes and the JSON envelope
//! - `postgres_repository` - The SQL stores against a real database
//!
//! Everything except `postgres_repository` runs on [`TestApp`]: the in-memory
//! store, a [`RecordingNotifier`] and a [`ManualClock`] parked at noon UTC.

#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use chrono::Duration;
use rust_decimal::Decimal;
use serde_json::Value;
use tower::ServiceExt;

use cleanpro_api::models::{Order, PublicProfile};
use cleanpro_api::routes;
use cleanpro_api::services::auth::Registration;
use cleanpro_api::services::orders::{ItemDraft, OrderDraft};
use cleanpro_api::state::AppState;
use cleanpro_api::testing::{ManualClock, RecordingNotifier};
use cleanpro_core::{Email, OtpCode};

pub use cleanpro_api::testing::SentNotification;

/// Default password used by [`TestApp::register`].
pub const PASSWORD: &str = "secret123";

/// Application state wired to test doubles, plus handles on those doubles.
pub struct TestApp {
    pub state: AppState,
    pub notifier: RecordingNotifier,
    pub clock: ManualClock,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Fresh in-memory application.
    #[must_use]
    pub fn new() -> Self {
        let notifier = RecordingNotifier::new();
        let clock = ManualClock::at_noon();
        let state = AppState::in_memory(Arc::new(notifier.clone()), Arc::new(clock.clone()));
        Self {
            state,
            notifier,
            clock,
        }
    }

    /// The full router without rate limiting.
    #[must_use]
    pub fn router(&self) -> Router {
        routes::routes(None).with_state(self.state.clone())
    }

    /// Send one request through the router and decode the JSON reply.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        send(self.router(), method, uri, body).await
    }

    /// Register `email` with [`PASSWORD`].
    pub async fn register(&self, full_name: &str, email: &str) -> PublicProfile {
        self.state
            .auth()
            .register(Registration {
                full_name: full_name.to_owned(),
                email: email.to_owned(),
                password: PASSWORD.to_owned(),
                ..Registration::default()
            })
            .await
            .expect("registration should succeed")
    }

    /// Log in and return the code that was emailed.
    pub async fn login(&self, email: &str) -> OtpCode {
        self.state
            .auth()
            .login(email, PASSWORD)
            .await
            .expect("login should succeed");
        self.last_code(email)
    }

    /// The newest code sent to `email`.
    #[must_use]
    pub fn last_code(&self, email: &str) -> OtpCode {
        let email = Email::parse(email).expect("test email should parse");
        self.notifier
            .last_code_for(&email)
            .expect("a code should have been sent")
    }

    /// Create an order one second after the previous one.
    ///
    /// Moving the clock keeps creation times distinct, so codes and
    /// newest-first ordering are deterministic.
    pub async fn create_order(&self, draft: &OrderDraft) -> Order {
        self.clock.advance(Duration::seconds(1));
        self.state
            .order_service()
            .create_order(draft)
            .await
            .expect("order should be created")
    }
}

/// Send one request through `router` and decode the JSON reply.
///
/// A body that is not JSON decodes to `Value::Null`.
pub async fn send(router: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = router.oneshot(request).await.expect("router is infallible");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

/// An order draft with cash payment, unpaid, and the given items as
/// `(type, quantity, price)`.
#[must_use]
pub fn draft(client_name: &str, client_phone: &str, items: &[(&str, i64, i64)]) -> OrderDraft {
    OrderDraft {
        client_name: Some(client_name.to_owned()),
        client_phone: Some(client_phone.to_owned()),
        items: items
            .iter()
            .map(|&(item_type, quantity, price)| ItemDraft {
                item_type: Some(item_type.to_owned()),
                quantity: Some(quantity),
                price: Some(Decimal::from(price)),
            })
            .collect(),
        payment_method: Some("Cash".to_owned()),
        payment_status: Some("Unpaid".to_owned()),
        ..OrderDraft::default()
    }
}
