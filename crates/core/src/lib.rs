//! CleanPro Core - Shared domain types.
//!
//! This crate provides the value types used across all CleanPro components:
//! - `api` - The HTTP order and authentication service
//! - `cli` - Command-line tools for migrations, seeding and user management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no database
//! access, no randomness. Generation of OTP codes and order codes happens in the
//! API crate; this crate only knows how to validate and compose them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, emails, phone numbers, codes and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
