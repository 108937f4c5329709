//! Domain models for the API.
//!
//! These types represent validated domain objects separate from database row
//! types and from request DTOs.

pub mod limits;
pub mod order;
pub mod user;

pub use order::{
    NewOrder, NewOrderItem, Order, OrderItem, OrderPatch, OrderStats, OrderSummary, SummaryLine,
    UpdatedOrder,
};
pub use user::{NewUser, PendingOtp, ProfileUpdate, PublicProfile, User};
