//! Order domain types.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use cleanpro_core::{
    Email, OrderCode, OrderId, OrderItemId, OrderStatus, PaymentMethod, PaymentStatus,
    PhoneNumber, format_rwf,
};

/// A laundry order with its items.
///
/// Serialized with snake_case keys; money is emitted as a JSON number.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct Order {
    pub id: OrderId,
    pub order_code: OrderCode,
    pub client_name: String,
    pub client_phone: PhoneNumber,
    pub client_email: Option<Email>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_amount: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
}

/// One line of an order: a garment type, how many, and the unit price.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct OrderItem {
    pub id: OrderItemId,
    #[serde(rename = "type")]
    pub item_type: String,
    pub quantity: i32,
    #[serde(with = "rust_decimal::serde::float")]
    pub price: Decimal,
}

impl OrderItem {
    /// `quantity * price`, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity).saturating_mul(self.price)
    }
}

/// A validated order ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_code: OrderCode,
    pub client_name: String,
    pub client_phone: PhoneNumber,
    pub client_email: Option<Email>,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub total_amount: Decimal,
    pub items: Vec<NewOrderItem>,
}

/// A validated item ready to insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub item_type: String,
    pub quantity: i32,
    pub price: Decimal,
}

impl NewOrderItem {
    /// `quantity * price`, or `None` on overflow.
    #[must_use]
    pub fn line_total(&self) -> Option<Decimal> {
        Decimal::from(self.quantity).checked_mul(self.price)
    }
}

/// A validated partial update.
///
/// `client_email: Some(None)` clears the stored email.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderPatch {
    pub status: Option<OrderStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub payment_status: Option<PaymentStatus>,
    pub client_name: Option<String>,
    pub client_phone: Option<PhoneNumber>,
    pub client_email: Option<Option<Email>>,
}

impl OrderPatch {
    /// True when no field would change.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.payment_method.is_none()
            && self.payment_status.is_none()
            && self.client_name.is_none()
            && self.client_phone.is_none()
            && self.client_email.is_none()
    }
}

/// Result of an update: the order after the change and its status before it.
#[derive(Debug, Clone)]
pub struct UpdatedOrder {
    pub previous_status: OrderStatus,
    pub order: Order,
}

impl UpdatedOrder {
    /// Whether this update moved the order into `Ready`.
    #[must_use]
    pub fn became_ready(&self) -> bool {
        self.order.status == OrderStatus::Ready && self.previous_status != OrderStatus::Ready
    }
}

/// Dashboard figures, computed on request.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    /// Orders created today.
    pub today_orders: i64,
    /// Orders not yet picked up.
    pub pending_orders: i64,
    /// Total of today's orders that are fully paid.
    #[serde(with = "rust_decimal::serde::float")]
    pub today_income: Decimal,
    /// Total of all unpaid orders.
    #[serde(with = "rust_decimal::serde::float")]
    pub unpaid_amount: Decimal,
}

/// What the order emails show, with amounts already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderSummary {
    pub order_code: String,
    pub client_name: String,
    pub status: String,
    pub payment_method: String,
    pub payment_status: String,
    pub total: String,
    pub lines: Vec<SummaryLine>,
}

/// One formatted item line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryLine {
    pub item_type: String,
    pub quantity: i32,
    pub unit_price: String,
    pub line_total: String,
}

impl From<&Order> for OrderSummary {
    fn from(order: &Order) -> Self {
        Self {
            order_code: order.order_code.to_string(),
            client_name: order.client_name.clone(),
            status: order.status.to_string(),
            payment_method: order.payment_method.to_string(),
            payment_status: order.payment_status.to_string(),
            total: format_rwf(order.total_amount),
            lines: order
                .items
                .iter()
                .map(|item| SummaryLine {
                    item_type: item.item_type.clone(),
                    quantity: item.quantity,
                    unit_price: format_rwf(item.price),
                    line_total: format_rwf(item.line_total()),
                })
                .collect(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_order(status: OrderStatus) -> Order {
        let now = Utc::now();
        Order {
            id: OrderId::new(7),
            order_code: OrderCode::from_stored("DC001234567".to_string()),
            client_name: "Jean Marie Nkurunziza".to_string(),
            client_phone: PhoneNumber::parse("0788123456").unwrap(),
            client_email: None,
            status,
            payment_method: PaymentMethod::MobileMoney,
            payment_status: PaymentStatus::Paid,
            total_amount: Decimal::from(8500),
            created_at: now,
            updated_at: now,
            items: vec![
                OrderItem {
                    id: OrderItemId::new(1),
                    item_type: "Shirt".to_string(),
                    quantity: 3,
                    price: Decimal::from(1500),
                },
                OrderItem {
                    id: OrderItemId::new(2),
                    item_type: "Trousers".to_string(),
                    quantity: 2,
                    price: Decimal::from(2000),
                },
            ],
        }
    }

    #[test]
    fn test_order_json_shape() {
        let json = serde_json::to_value(sample_order(OrderStatus::PickedUp)).unwrap();
        assert_eq!(json["order_code"], "DC001234567");
        assert_eq!(json["status"], "Picked Up");
        assert_eq!(json["payment_method"], "Mobile Money");
        assert_eq!(json["total_amount"], 8500.0);
        assert_eq!(json["client_email"], serde_json::Value::Null);
        assert_eq!(json["items"][0]["type"], "Shirt");
        assert_eq!(json["items"][1]["price"], 2000.0);
    }

    #[test]
    fn test_became_ready() {
        let updated = UpdatedOrder {
            previous_status: OrderStatus::Ironing,
            order: sample_order(OrderStatus::Ready),
        };
        assert!(updated.became_ready());

        let unchanged = UpdatedOrder {
            previous_status: OrderStatus::Ready,
            order: sample_order(OrderStatus::Ready),
        };
        assert!(!unchanged.became_ready());

        let other = UpdatedOrder {
            previous_status: OrderStatus::Ready,
            order: sample_order(OrderStatus::PickedUp),
        };
        assert!(!other.became_ready());
    }

    #[test]
    fn test_summary_formats_amounts() {
        let summary = OrderSummary::from(&sample_order(OrderStatus::Ready));
        assert_eq!(summary.total, "RWF 8,500");
        assert_eq!(summary.lines.len(), 2);
        assert_eq!(summary.lines[0].line_total, "RWF 4,500");
        assert_eq!(summary.lines[1].unit_price, "RWF 2,000");
    }

    #[test]
    fn test_stats_json_keys() {
        let stats = OrderStats {
            today_orders: 3,
            pending_orders: 2,
            today_income: Decimal::from(12_000),
            unpaid_amount: Decimal::ZERO,
        };
        let json = serde_json::to_value(stats).unwrap();
        assert_eq!(json["todayOrders"], 3);
        assert_eq!(json["pendingOrders"], 2);
        assert_eq!(json["todayIncome"], 12000.0);
        assert_eq!(json["unpaidAmount"], 0.0);
    }

    #[test]
    fn test_patch_is_empty() {
        assert!(OrderPatch::default().is_empty());
        let patch = OrderPatch {
            client_email: Some(None),
            ..OrderPatch::default()
        };
        assert!(!patch.is_empty());
    }
}
