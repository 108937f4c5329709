//! Seed the database with sample orders.
//!
//! Inserts five orders with their items, backdated to December 2024, so a
//! fresh dashboard has something to show. Does nothing if any order exists.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;

use cleanpro_api::db::{OrderStore, PgOrderRepository};
use cleanpro_core::{OrderStatus, PaymentMethod, PaymentStatus, PhoneNumber};

use super::{CommandError, connect};

struct SampleOrder {
    order_code: &'static str,
    client_name: &'static str,
    client_phone: &'static str,
    status: &'static str,
    payment_method: &'static str,
    payment_status: &'static str,
    created_at: &'static str,
    updated_at: &'static str,
    items: &'static [(&'static str, i32, i64)],
}

const SAMPLE_ORDERS: &[SampleOrder] = &[
    SampleOrder {
        order_code: "DC001234567",
        client_name: "Jean Marie Nkurunziza",
        client_phone: "0788123456",
        status: "Ready",
        payment_method: "Mobile Money",
        payment_status: "Paid",
        created_at: "2024-12-22 09:00:00",
        updated_at: "2024-12-23 14:30:00",
        items: &[("Shirt", 3, 1500), ("Trousers", 2, 2000)],
    },
    SampleOrder {
        order_code: "DC001234568",
        client_name: "Alice Uwase",
        client_phone: "0789234567",
        status: "Washing",
        payment_method: "Cash",
        payment_status: "Unpaid",
        created_at: "2024-12-23 10:30:00",
        updated_at: "2024-12-23 10:30:00",
        items: &[("Dress", 2, 3000), ("Coat", 1, 4000)],
    },
    SampleOrder {
        order_code: "DC001234569",
        client_name: "Patrick Mugabo",
        client_phone: "0790345678",
        status: "Ironing",
        payment_method: "Mobile Money",
        payment_status: "Paid",
        created_at: "2024-12-23 08:00:00",
        updated_at: "2024-12-23 13:00:00",
        items: &[("Suit", 1, 5000), ("Shirt", 4, 1500)],
    },
    SampleOrder {
        order_code: "DC001234570",
        client_name: "Marie Claire Uwera",
        client_phone: "0791456789",
        status: "Pending",
        payment_method: "Cash",
        payment_status: "Unpaid",
        created_at: "2024-12-23 15:00:00",
        updated_at: "2024-12-23 15:00:00",
        items: &[("Dress", 1, 3000), ("Sweater", 2, 2500)],
    },
    SampleOrder {
        order_code: "DC001234571",
        client_name: "Emmanuel Habimana",
        client_phone: "0792567890",
        status: "Picked Up",
        payment_method: "Mobile Money",
        payment_status: "Paid",
        created_at: "2024-12-21 11:00:00",
        updated_at: "2024-12-22 16:00:00",
        items: &[("Blanket", 1, 5000), ("Bed Sheet", 2, 3500)],
    },
];

impl SampleOrder {
    /// Sum of the item lines.
    fn total(&self) -> Decimal {
        self.items
            .iter()
            .map(|&(_, quantity, price)| Decimal::from(quantity) * Decimal::from(price))
            .sum()
    }

    /// Run the sample through the same parsers the API uses.
    fn check(&self) -> Result<(), CommandError> {
        let invalid = |e: &dyn std::fmt::Display| {
            CommandError::InvalidSample(format!("{}: {e}", self.order_code))
        };
        PhoneNumber::parse(self.client_phone).map_err(|e| invalid(&e))?;
        self.status.parse::<OrderStatus>().map_err(|e| invalid(&e))?;
        self.payment_method
            .parse::<PaymentMethod>()
            .map_err(|e| invalid(&e))?;
        self.payment_status
            .parse::<PaymentStatus>()
            .map_err(|e| invalid(&e))?;
        Ok(())
    }
}

fn timestamp(raw: &str) -> Result<DateTime<Utc>, CommandError> {
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc())
        .map_err(|e| CommandError::InvalidSample(format!("{raw}: {e}")))
}

/// Insert the sample orders if the orders table is empty.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn sample_orders() -> Result<(), CommandError> {
    let pool = connect().await?;

    let existing = PgOrderRepository::new(pool.clone()).count().await?;
    if existing > 0 {
        tracing::info!(existing, "Orders already present, skipping sample data");
        return Ok(());
    }

    let mut tx = pool.begin().await?;
    for sample in SAMPLE_ORDERS {
        sample.check()?;

        let order_id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO orders (order_code, client_name, client_phone, status,
                                payment_method, payment_status, total_amount,
                                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            ",
        )
        .bind(sample.order_code)
        .bind(sample.client_name)
        .bind(sample.client_phone)
        .bind(sample.status)
        .bind(sample.payment_method)
        .bind(sample.payment_status)
        .bind(sample.total())
        .bind(timestamp(sample.created_at)?)
        .bind(timestamp(sample.updated_at)?)
        .fetch_one(&mut *tx)
        .await?;

        for &(item_type, quantity, price) in sample.items {
            sqlx::query(
                "INSERT INTO order_items (order_id, type, quantity, price) VALUES ($1, $2, $3, $4)",
            )
            .bind(order_id)
            .bind(item_type)
            .bind(quantity)
            .bind(Decimal::from(price))
            .execute(&mut *tx)
            .await?;
        }

        tracing::info!(order_code = sample.order_code, "Inserted sample order");
    }
    tx.commit().await?;

    tracing::info!(count = SAMPLE_ORDERS.len(), "Sample data inserted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_totals_match_items() {
        let totals: Vec<Decimal> = SAMPLE_ORDERS.iter().map(SampleOrder::total).collect();
        let expected: Vec<Decimal> = [8500, 10000, 11000, 8000, 12000]
            .into_iter()
            .map(Decimal::from)
            .collect();
        assert_eq!(totals, expected);
    }

    #[test]
    fn test_samples_pass_domain_checks() {
        for sample in SAMPLE_ORDERS {
            assert!(sample.check().is_ok(), "{} rejected", sample.order_code);
            assert!(timestamp(sample.created_at).is_ok());
            assert!(timestamp(sample.updated_at).is_ok());
        }
    }
}
