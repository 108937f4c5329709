//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::db::{InMemoryStore, OrderStore, PgOrderRepository, PgUserRepository, UserStore};
use crate::services::auth::AuthService;
use crate::services::clock::Clock;
use crate::services::email::Notifier;
use crate::services::orders::OrderService;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Handlers borrow the stores,
/// notifier and clock from it to build a service per request.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    users: Arc<dyn UserStore>,
    orders: Arc<dyn OrderStore>,
    notifier: Arc<dyn Notifier>,
    clock: Arc<dyn Clock>,
}

impl AppState {
    /// Create a new application state from its collaborators.
    #[must_use]
    pub fn new(
        users: Arc<dyn UserStore>,
        orders: Arc<dyn OrderStore>,
        notifier: Arc<dyn Notifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                users,
                orders,
                notifier,
                clock,
            }),
        }
    }

    /// State backed by `PostgreSQL`.
    ///
    /// # Arguments
    ///
    /// * `pool` - `PostgreSQL` connection pool
    /// * `notifier` - SMTP or log notifier
    /// * `clock` - Time source
    #[must_use]
    pub fn postgres(pool: PgPool, notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            Arc::new(PgUserRepository::new(pool.clone())),
            Arc::new(PgOrderRepository::new(pool)),
            notifier,
            clock,
        )
    }

    /// State backed by one [`InMemoryStore`] that serves both users and orders.
    #[must_use]
    pub fn in_memory(notifier: Arc<dyn Notifier>, clock: Arc<dyn Clock>) -> Self {
        let store = Arc::new(InMemoryStore::new(Arc::clone(&clock)));
        Self::new(Arc::clone(&store) as Arc<dyn UserStore>, store, notifier, clock)
    }

    /// Get a reference to the user store.
    #[must_use]
    pub fn users(&self) -> &dyn UserStore {
        self.inner.users.as_ref()
    }

    /// Get a reference to the order store.
    #[must_use]
    pub fn orders(&self) -> &dyn OrderStore {
        self.inner.orders.as_ref()
    }

    /// Get a reference to the notifier.
    #[must_use]
    pub fn notifier(&self) -> &dyn Notifier {
        self.inner.notifier.as_ref()
    }

    /// Get a reference to the clock.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.inner.clock.as_ref()
    }

    /// Authentication service over this state.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.users(), self.notifier(), self.clock())
    }

    /// Order service over this state.
    #[must_use]
    pub fn order_service(&self) -> OrderService<'_> {
        OrderService::new(self.orders(), self.notifier(), self.clock())
    }
}
