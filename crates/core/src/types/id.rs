//! Typed row identifiers.
//!
//! Every table keys on a `SERIAL` column. Wrapping each key in its own type
//! stops an `OrderId` from being passed where a `UserId` is expected.

/// Define an `i32`-backed identifier.
///
/// The generated type is `Copy`, ordered, serializes as a bare number and,
/// with the `postgres` feature, binds and decodes as `INT4`.
///
/// # Example
///
/// ```rust
/// # use cleanpro_core::define_id;
/// define_id!(
///     /// Identifies a receipt.
///     ReceiptId
/// );
///
/// let id = ReceiptId::new(12);
/// assert_eq!(id.as_i32(), 12);
/// ```
#[macro_export]
macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug,
            Clone,
            Copy,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        #[cfg_attr(feature = "postgres", derive(::sqlx::Type), sqlx(transparent))]
        pub struct $name(i32);

        impl $name {
            /// Wrap a raw key.
            #[must_use]
            pub const fn new(id: i32) -> Self {
                Self(id)
            }

            /// The raw key.
            #[must_use]
            pub const fn as_i32(self) -> i32 {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

define_id!(
    /// Key of a `users` row.
    UserId
);
define_id!(
    /// Key of an `orders` row; also the `{id}` in `/api/orders/{id}`.
    OrderId
);
define_id!(
    /// Key of an `order_items` row.
    OrderItemId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_order_by_key() {
        let mut ids = vec![OrderId::new(3), OrderId::new(1), OrderId::new(2)];
        ids.sort();
        assert_eq!(ids, vec![OrderId::new(1), OrderId::new(2), OrderId::new(3)]);
    }

    #[test]
    fn test_id_display_is_the_number() {
        assert_eq!(UserId::new(7).to_string(), "7");
        assert_eq!(format!("order {}", OrderId::new(42)), "order 42");
    }

    #[test]
    fn test_id_json_is_a_bare_number() {
        let json = serde_json::to_string(&OrderItemId::new(3)).expect("serialize");
        assert_eq!(json, "3");
        let back: OrderItemId = serde_json::from_str("3").expect("deserialize");
        assert_eq!(back, OrderItemId::new(3));
    }
}
