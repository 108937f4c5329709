//! Order service.
//!
//! Validates and stores orders, answers list/search/dashboard queries, and
//! emails the client when an order is created or becomes ready. Emails are
//! sent after the write has committed and a failed send never fails the
//! operation.

mod error;
pub mod validation;

pub use error::OrderError;
pub use validation::{ItemDraft, OrderChanges, OrderDraft};

use rand::Rng;

use cleanpro_core::{OrderCode, OrderId};

use crate::db::OrderStore;
use crate::models::{Order, OrderStats, OrderSummary};
use crate::services::clock::Clock;
use crate::services::email::Notifier;

/// Order service.
pub struct OrderService<'a> {
    orders: &'a dyn OrderStore,
    notifier: &'a dyn Notifier,
    clock: &'a dyn Clock,
}

impl<'a> OrderService<'a> {
    /// Create a new order service.
    #[must_use]
    pub const fn new(
        orders: &'a dyn OrderStore,
        notifier: &'a dyn Notifier,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            orders,
            notifier,
            clock,
        }
    }

    /// Validate and store a new order, then send a confirmation if the client
    /// left an email.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Validation` with every problem in the draft.
    /// Returns `OrderError::DuplicateCode` if the generated code is taken.
    pub async fn create_order(&self, draft: &OrderDraft) -> Result<Order, OrderError> {
        let valid = validation::validate_draft(draft).map_err(OrderError::Validation)?;
        let order = self
            .orders
            .create(&valid.with_code(self.generate_order_code()))
            .await?;

        tracing::info!(
            order_id = %order.id,
            order_code = %order.order_code,
            items = order.items.len(),
            "Order created"
        );

        if let Some(email) = &order.client_email {
            let summary = OrderSummary::from(&order);
            if let Err(e) = self
                .notifier
                .send_order_confirmation(email, &order.client_name, &summary)
                .await
            {
                tracing::warn!(order_id = %order.id, error = %e, "Failed to send order confirmation");
            }
        }

        Ok(order)
    }

    /// Apply a partial update. Moving the order into `Ready` emails the client.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NoValidFields` or `OrderError::Validation` for bad
    /// input and `OrderError::NotFound` for an unknown id.
    pub async fn update_order(
        &self,
        id: OrderId,
        changes: &OrderChanges,
    ) -> Result<Order, OrderError> {
        let patch = validation::validate_changes(changes)?;
        let updated = self
            .orders
            .update(id, &patch)
            .await?
            .ok_or(OrderError::NotFound)?;

        tracing::info!(
            order_id = %id,
            from = %updated.previous_status,
            to = %updated.order.status,
            "Order updated"
        );

        if updated.became_ready()
            && let Some(email) = &updated.order.client_email
        {
            let summary = OrderSummary::from(&updated.order);
            if let Err(e) = self
                .notifier
                .send_order_ready(email, &updated.order.client_name, &summary)
                .await
            {
                tracing::warn!(order_id = %id, error = %e, "Failed to send ready notice");
            }
        }

        Ok(updated.order)
    }

    /// All orders, newest first.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn get_all_orders(&self) -> Result<Vec<Order>, OrderError> {
        Ok(self.orders.list().await?)
    }

    /// One order with its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown id.
    pub async fn get_order(&self, id: OrderId) -> Result<Order, OrderError> {
        self.orders.get(id).await?.ok_or(OrderError::NotFound)
    }

    /// Orders whose code, client name or phone contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::EmptyQuery` for a blank query.
    pub async fn search_orders(&self, query: &str) -> Result<Vec<Order>, OrderError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(OrderError::EmptyQuery);
        }
        Ok(self.orders.search(query).await?)
    }

    /// Delete an order and its items.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::NotFound` for an unknown id.
    pub async fn delete_order(&self, id: OrderId) -> Result<(), OrderError> {
        if !self.orders.delete(id).await? {
            return Err(OrderError::NotFound);
        }
        tracing::info!(order_id = %id, "Order deleted");
        Ok(())
    }

    /// Dashboard figures as of now, with "today" taken in UTC.
    ///
    /// # Errors
    ///
    /// Returns `OrderError::Repository` if the store fails.
    pub async fn get_stats(&self) -> Result<OrderStats, OrderError> {
        let today = self.clock.now().date_naive();
        Ok(self.orders.stats(today).await?)
    }

    fn generate_order_code(&self) -> OrderCode {
        let suffix = rand::rng().random_range(0..OrderCode::SUFFIX_RANGE);
        OrderCode::compose(self.clock.now(), suffix)
    }
}
