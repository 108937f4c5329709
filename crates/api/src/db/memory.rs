//! In-memory store with the same semantics as the `PostgreSQL` repositories.
//!
//! Backs the integration tests.
//! One mutex guards all state, which gives every operation the atomicity the
//! SQL versions get from transactions and single-statement updates.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

use cleanpro_core::{Email, OrderId, OrderItemId, OtpCode, PaymentStatus, UserId};

use super::{OrderStore, RepositoryError, UserStore};
use crate::models::{
    NewOrder, NewUser, Order, OrderItem, OrderPatch, OrderStats, PendingOtp, ProfileUpdate,
    UpdatedOrder, User,
};
use crate::services::clock::Clock;

#[derive(Default)]
struct State {
    users: BTreeMap<UserId, User>,
    orders: BTreeMap<OrderId, Order>,
    next_user_id: i32,
    next_order_id: i32,
    next_item_id: i32,
}

/// Users and orders held in process memory.
#[derive(Clone)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryStore {
    /// Create an empty store that stamps rows with `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Arc::new(Mutex::new(State::default())),
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn newest_first(mut orders: Vec<Order>) -> Vec<Order> {
    orders.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    });
    orders
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn consume_matching<'a>(
    state: &'a mut State,
    email: &Email,
    code: &OtpCode,
    now: DateTime<Utc>,
) -> Option<&'a mut User> {
    state
        .users
        .values_mut()
        .find(|u| u.email == *email && u.has_valid_otp(code, now))
        .map(|user| {
            user.otp = None;
            user.updated_at = now;
            user
        })
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .lock()
            .users
            .values()
            .find(|u| u.email == *email)
            .cloned())
    }

    async fn create(&self, user: &NewUser) -> Result<User, RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();

        if state.users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict("email already exists".to_owned()));
        }

        state.next_user_id += 1;
        let created = User {
            id: UserId::new(state.next_user_id),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            business_name: user.business_name.clone(),
            password_hash: user.password_hash.clone(),
            is_verified: false,
            otp: None,
            created_at: now,
            updated_at: now,
        };
        state.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn store_otp(&self, id: UserId, otp: &PendingOtp) -> Result<(), RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.otp = Some(otp.clone());
        user.updated_at = now;
        Ok(())
    }

    async fn consume_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
    ) -> Result<Option<User>, RepositoryError> {
        let mut state = self.lock();
        Ok(consume_matching(&mut state, email, code, now).map(|user| {
            user.is_verified = true;
            user.clone()
        }))
    }

    async fn reset_password_with_otp(
        &self,
        email: &Email,
        code: &OtpCode,
        now: DateTime<Utc>,
        password_hash: &str,
    ) -> Result<bool, RepositoryError> {
        let mut state = self.lock();
        let Some(user) = consume_matching(&mut state, email, code, now) else {
            return Ok(false);
        };
        password_hash.clone_into(&mut user.password_hash);
        Ok(true)
    }

    async fn update_password(
        &self,
        id: UserId,
        password_hash: &str,
    ) -> Result<(), RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        password_hash.clone_into(&mut user.password_hash);
        user.updated_at = now;
        Ok(())
    }

    async fn update_profile(
        &self,
        id: UserId,
        update: &ProfileUpdate,
    ) -> Result<User, RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let user = state.users.get_mut(&id).ok_or(RepositoryError::NotFound)?;

        if let Some(full_name) = &update.full_name {
            full_name.clone_into(&mut user.full_name);
        }
        if let Some(phone) = &update.phone {
            user.phone.clone_from(phone);
        }
        if let Some(business_name) = &update.business_name {
            user.business_name.clone_from(business_name);
        }
        user.updated_at = now;

        Ok(user.clone())
    }
}

#[async_trait]
impl OrderStore for InMemoryStore {
    async fn list(&self) -> Result<Vec<Order>, RepositoryError> {
        Ok(newest_first(self.lock().orders.values().cloned().collect()))
    }

    async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.lock().orders.get(&id).cloned())
    }

    async fn create(&self, order: &NewOrder) -> Result<Order, RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();

        if state
            .orders
            .values()
            .any(|o| o.order_code == order.order_code)
        {
            return Err(RepositoryError::Conflict(
                "order code already exists".to_owned(),
            ));
        }

        let mut items = Vec::with_capacity(order.items.len());
        for item in &order.items {
            state.next_item_id += 1;
            items.push(OrderItem {
                id: OrderItemId::new(state.next_item_id),
                item_type: item.item_type.clone(),
                quantity: item.quantity,
                price: item.price,
            });
        }

        state.next_order_id += 1;
        let created = Order {
            id: OrderId::new(state.next_order_id),
            order_code: order.order_code.clone(),
            client_name: order.client_name.clone(),
            client_phone: order.client_phone.clone(),
            client_email: order.client_email.clone(),
            status: order.status,
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            total_amount: order.total_amount,
            created_at: now,
            updated_at: now,
            items,
        };
        state.orders.insert(created.id, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        id: OrderId,
        patch: &OrderPatch,
    ) -> Result<Option<UpdatedOrder>, RepositoryError> {
        let now = self.clock.now();
        let mut state = self.lock();
        let Some(order) = state.orders.get_mut(&id) else {
            return Ok(None);
        };

        let previous_status = order.status;
        if let Some(status) = patch.status {
            order.status = status;
        }
        if let Some(method) = patch.payment_method {
            order.payment_method = method;
        }
        if let Some(payment_status) = patch.payment_status {
            order.payment_status = payment_status;
        }
        if let Some(name) = &patch.client_name {
            name.clone_into(&mut order.client_name);
        }
        if let Some(phone) = &patch.client_phone {
            order.client_phone = phone.clone();
        }
        if let Some(email) = &patch.client_email {
            order.client_email.clone_from(email);
        }
        order.updated_at = now;

        Ok(Some(UpdatedOrder {
            previous_status,
            order: order.clone(),
        }))
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        Ok(self.lock().orders.remove(&id).is_some())
    }

    async fn search(&self, query: &str) -> Result<Vec<Order>, RepositoryError> {
        let needle = query.to_lowercase();
        let matches = self
            .lock()
            .orders
            .values()
            .filter(|o| {
                contains_ignore_case(o.order_code.as_str(), &needle)
                    || contains_ignore_case(&o.client_name, &needle)
                    || contains_ignore_case(o.client_phone.as_str(), &needle)
            })
            .cloned()
            .collect();
        Ok(newest_first(matches))
    }

    async fn stats(&self, today: NaiveDate) -> Result<OrderStats, RepositoryError> {
        let state = self.lock();
        let mut stats = OrderStats {
            today_orders: 0,
            pending_orders: 0,
            today_income: Decimal::ZERO,
            unpaid_amount: Decimal::ZERO,
        };

        for order in state.orders.values() {
            let created_today = order.created_at.date_naive() == today;
            if created_today {
                stats.today_orders += 1;
                if order.payment_status == PaymentStatus::Paid {
                    stats.today_income += order.total_amount;
                }
            }
            if order.status.is_open() {
                stats.pending_orders += 1;
            }
            if order.payment_status == PaymentStatus::Unpaid {
                stats.unpaid_amount += order.total_amount;
            }
        }

        Ok(stats)
    }

    async fn count(&self) -> Result<i64, RepositoryError> {
        Ok(i64::try_from(self.lock().orders.len()).unwrap_or(i64::MAX))
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}
