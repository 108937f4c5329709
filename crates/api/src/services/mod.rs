//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Registration, password login with emailed OTP, password reset
//! - `orders` - Order validation, lifecycle and dashboard figures
//! - `email` - The [`email::Notifier`] seam with SMTP and log implementations
//! - `clock` - The time source used for OTP expiry and "today"

pub mod auth;
pub mod clock;
pub mod email;
pub mod orders;
