//! Order routes.

use axum::extract::{Query, State};
use rust_decimal::Decimal;
use serde::Deserialize;

use cleanpro_core::OrderId;

use crate::error::{ApiJson, ApiPath, Result};
use crate::models::{Order, OrderStats};
use crate::routes::envelope::ApiResponse;
use crate::services::orders::{ItemDraft, OrderChanges, OrderDraft};
use crate::state::AppState;

/// Request to create an order.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateOrderRequest {
    #[serde(alias = "clientName")]
    pub client_name: Option<String>,
    #[serde(alias = "clientPhone")]
    pub client_phone: Option<String>,
    #[serde(alias = "clientEmail")]
    pub client_email: Option<String>,
    pub items: Option<Vec<ItemRequest>>,
    #[serde(alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(alias = "paymentStatus")]
    pub payment_status: Option<String>,
    pub status: Option<String>,
    #[serde(alias = "totalAmount")]
    pub total_amount: Option<Decimal>,
}

/// One garment line of [`CreateOrderRequest`].
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ItemRequest {
    #[serde(rename = "type", alias = "item_type", alias = "itemType")]
    pub item_type: Option<String>,
    pub quantity: Option<i64>,
    pub price: Option<Decimal>,
}

impl From<CreateOrderRequest> for OrderDraft {
    fn from(req: CreateOrderRequest) -> Self {
        Self {
            client_name: req.client_name,
            client_phone: req.client_phone,
            client_email: req.client_email,
            items: req
                .items
                .unwrap_or_default()
                .into_iter()
                .map(|item| ItemDraft {
                    item_type: item.item_type,
                    quantity: item.quantity,
                    price: item.price,
                })
                .collect(),
            payment_method: req.payment_method,
            payment_status: req.payment_status,
            status: req.status,
            total_amount: req.total_amount,
        }
    }
}

/// Request to update an order. Fields outside this list are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UpdateOrderRequest {
    pub status: Option<String>,
    #[serde(alias = "paymentMethod")]
    pub payment_method: Option<String>,
    #[serde(alias = "paymentStatus")]
    pub payment_status: Option<String>,
    #[serde(alias = "clientName")]
    pub client_name: Option<String>,
    #[serde(alias = "clientPhone")]
    pub client_phone: Option<String>,
    #[serde(alias = "clientEmail")]
    pub client_email: Option<String>,
}

impl From<UpdateOrderRequest> for OrderChanges {
    fn from(req: UpdateOrderRequest) -> Self {
        Self {
            status: req.status,
            payment_method: req.payment_method,
            payment_status: req.payment_status,
            client_name: req.client_name,
            client_phone: req.client_phone,
            client_email: req.client_email,
        }
    }
}

/// Query string of `GET /search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchQuery {
    #[serde(alias = "q")]
    pub query: Option<String>,
}

/// GET /api/orders
///
/// # Errors
///
/// Returns `AppError` if the store fails.
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Order>>> {
    let orders = state.order_service().get_all_orders().await?;
    Ok(ApiResponse::list(orders))
}

/// GET /api/orders/stats
///
/// # Errors
///
/// Returns `AppError` if the store fails.
pub async fn stats(State(state): State<AppState>) -> Result<ApiResponse<OrderStats>> {
    let stats = state.order_service().get_stats().await?;
    Ok(ApiResponse::ok(stats))
}

/// GET /api/orders/search?query=
///
/// # Errors
///
/// Returns `AppError` for a blank query.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<ApiResponse<Vec<Order>>> {
    let orders = state
        .order_service()
        .search_orders(query.query.as_deref().unwrap_or_default())
        .await?;
    Ok(ApiResponse::list(orders))
}

/// GET /api/orders/{id}
///
/// # Errors
///
/// Returns `AppError` for an unknown id.
pub async fn show(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<Order>> {
    let order = state.order_service().get_order(OrderId::new(id)).await?;
    Ok(ApiResponse::ok(order))
}

/// POST /api/orders
///
/// # Errors
///
/// Returns `AppError` on validation failure or an order code collision.
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateOrderRequest>,
) -> Result<ApiResponse<Order>> {
    let order = state
        .order_service()
        .create_order(&OrderDraft::from(req))
        .await?;
    Ok(ApiResponse::ok(order)
        .message("Order created successfully")
        .created())
}

/// PUT /api/orders/{id}
///
/// # Errors
///
/// Returns `AppError` on validation failure or an unknown id.
pub async fn update(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
    ApiJson(req): ApiJson<UpdateOrderRequest>,
) -> Result<ApiResponse<Order>> {
    let order = state
        .order_service()
        .update_order(OrderId::new(id), &OrderChanges::from(req))
        .await?;
    Ok(ApiResponse::ok(order).message("Order updated successfully"))
}

/// DELETE /api/orders/{id}
///
/// # Errors
///
/// Returns `AppError` for an unknown id.
pub async fn delete(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i32>,
) -> Result<ApiResponse<()>> {
    state.order_service().delete_order(OrderId::new(id)).await?;
    Ok(ApiResponse::done("Order deleted successfully"))
}
