//! CleanPro API library.
//!
//! The HTTP service is built as a library so the router, services and
//! stores can be driven from integration tests without a network socket
//! or a live database.
//!
//! # Layout
//!
//! - [`services`] - Authentication and order business logic
//! - [`db`] - Store traits with `PostgreSQL` and in-memory implementations
//! - [`routes`] - Axum handlers and the JSON response envelope
//! - `testing` - Recording notifier and manual clock, behind the `testing` feature

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
