//! Core types for CleanPro.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod money;
pub mod order_code;
pub mod otp;
pub mod phone;
pub mod status;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::format_rwf;
pub use order_code::OrderCode;
pub use otp::{OtpCode, OtpCodeError};
pub use phone::{PhoneNumber, PhoneNumberError};
pub use status::*;
