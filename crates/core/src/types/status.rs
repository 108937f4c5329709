//! Status enums for orders and payments.
//!
//! Each enum serializes to the human-readable label the front desk uses
//! (`"Picked Up"`, `"Mobile Money"`), and the same label is what gets stored
//! in the database.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Error returned when a string does not name a known variant.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind}: {value:?}")]
pub struct ParseEnumError {
    /// Which enum was being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

macro_rules! label_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $kind:literal {
            $( $(#[$vmeta:meta])* $variant:ident => $label:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in workflow order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// The stored and displayed label.
            #[must_use]
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $label,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($label => Ok(Self::$variant),)+
                    _ => Err(ParseEnumError {
                        kind: $kind,
                        value: s.to_owned(),
                    }),
                }
            }
        }
    };
}

label_enum! {
    /// Where an order is in the laundry workflow.
    ///
    /// Orders normally move forward through the list, but staff may set any
    /// status at any time to correct mistakes.
    #[derive(Default)]
    OrderStatus, "order status" {
        /// Received, not yet started.
        #[default]
        Pending => "Pending",
        Washing => "Washing",
        Ironing => "Ironing",
        /// Ready for the client to collect.
        Ready => "Ready",
        /// Collected by the client.
        PickedUp => "Picked Up",
    }
}

label_enum! {
    /// How the client pays.
    PaymentMethod, "payment method" {
        Cash => "Cash",
        MobileMoney => "Mobile Money",
        BankCard => "Bank Card",
    }
}

label_enum! {
    /// How much of the order has been paid.
    #[derive(Default)]
    PaymentStatus, "payment status" {
        #[default]
        Unpaid => "Unpaid",
        Partial => "Partial",
        Paid => "Paid",
    }
}

impl OrderStatus {
    /// Whether the order is still with the laundry (not yet collected).
    #[must_use]
    pub const fn is_open(self) -> bool {
        !matches!(self, Self::PickedUp)
    }
}
