//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                              - Welcome message and endpoint list
//! GET  /api/health                    - Health check (database ping)
//!
//! # Auth (rate limited)
//! POST /api/auth/register             - Create an account
//! POST /api/auth/login                - Check password, email a code
//! POST /api/auth/verify-otp           - Consume the code
//! POST /api/auth/resend-otp           - Email a new code
//! POST /api/auth/forgot-password      - Email a reset code
//! POST /api/auth/verify-reset-otp     - Check a reset code
//! POST /api/auth/reset-password       - Set a new password with a reset code
//! GET  /api/auth/profile?email=       - Public profile
//! PUT  /api/auth/profile              - Change profile fields
//! PUT  /api/auth/change-password      - Change password
//!
//! # Orders
//! GET    /api/orders                  - All orders, newest first
//! POST   /api/orders                  - Create an order
//! GET    /api/orders/stats            - Dashboard figures
//! GET    /api/orders/search?query=    - Search by code, name or phone
//! GET    /api/orders/{id}             - One order
//! PUT    /api/orders/{id}             - Update an order
//! DELETE /api/orders/{id}             - Delete an order
//! ```
//!
//! Every response uses the [`envelope::ApiResponse`] shape.

pub mod auth;
pub mod envelope;
pub mod orders;

use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;

use crate::middleware::RateLimiterLayer;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/verify-otp", post(auth::verify_otp))
        .route("/resend-otp", post(auth::resend_otp))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/verify-reset-otp", post(auth::verify_reset_otp))
        .route("/reset-password", post(auth::reset_password))
        .route(
            "/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/change-password", put(auth::change_password))
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::list).post(orders::create))
        .route("/stats", get(orders::stats))
        .route("/search", get(orders::search))
        .route(
            "/{id}",
            get(orders::show).put(orders::update).delete(orders::delete),
        )
}

/// Create all routes for the API.
///
/// `auth_limit` guards the `/api/auth` routes when given.
pub fn routes(auth_limit: Option<RateLimiterLayer>) -> Router<AppState> {
    let auth = match auth_limit {
        Some(layer) => auth_routes().layer(layer),
        None => auth_routes(),
    };

    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .nest("/api/auth", auth)
        .nest("/api/orders", order_routes())
        .fallback(not_found)
}

/// Body of `GET /api/health`.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub message: &'static str,
    pub timestamp: DateTime<Utc>,
    pub database: &'static str,
    pub email: &'static str,
}

/// GET /api/health
///
/// Pings the database; answers `503` when it is unreachable.
pub async fn health(State(state): State<AppState>) -> Response {
    let database_ok = match state.orders().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    let body = HealthResponse {
        success: database_ok,
        message: "CleanPro API is running",
        timestamp: state.clock().now(),
        database: if database_ok { "connected" } else { "unreachable" },
        email: state.notifier().channel(),
    };
    let status = if database_ok {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(body)).into_response()
}

/// GET /
pub async fn root() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Welcome to CleanPro API",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "health": "/api/health",
            "auth": {
                "register": "POST /api/auth/register",
                "login": "POST /api/auth/login",
                "verifyOTP": "POST /api/auth/verify-otp",
                "resendOTP": "POST /api/auth/resend-otp",
                "forgotPassword": "POST /api/auth/forgot-password",
                "verifyResetOTP": "POST /api/auth/verify-reset-otp",
                "resetPassword": "POST /api/auth/reset-password",
                "profile": "GET|PUT /api/auth/profile",
                "changePassword": "PUT /api/auth/change-password"
            },
            "orders": "/api/orders",
            "stats": "/api/orders/stats",
            "search": "/api/orders/search?query="
        }
    }))
}

/// Fallback for unknown routes.
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "message": "Route not found",
            "path": uri.path(),
        })),
    )
        .into_response()
}
