//! Sales order CRUD, listing, numbering and preview endpoints.

use crate::dtos::{OrderNumberResponse, PreviewRequest, PreviewResponse, SalesOrderRequest};
use crate::models::{SalesOrderSummary, SalesOrderWithLines};
use crate::startup::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use order_engine::{ListParams, Paginated};
use service_core::error::AppError;

/// `GET /sales-orders`
pub async fn list_sales_orders(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<Paginated<SalesOrderSummary>>, AppError> {
    let page = state.orders.list(params).await?;
    tracing::debug!(
        total = page.meta.total,
        returned = page.data.len(),
        "Listed sales orders"
    );
    Ok(Json(page))
}

/// `POST /sales-orders`
pub async fn create_sales_order(
    State(state): State<AppState>,
    Json(payload): Json<SalesOrderRequest>,
) -> Result<(StatusCode, Json<SalesOrderWithLines>), AppError> {
    let created = state.orders.create(payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /sales-orders/next-number`
pub async fn next_order_number(
    State(state): State<AppState>,
) -> Result<Json<OrderNumberResponse>, AppError> {
    let order_number = state.orders.generate_order_number().await?;
    Ok(Json(OrderNumberResponse { order_number }))
}

/// `POST /sales-orders/preview`
pub async fn preview_sales_order(
    State(state): State<AppState>,
    Json(payload): Json<PreviewRequest>,
) -> Result<Json<PreviewResponse>, AppError> {
    Ok(Json(state.orders.preview(&payload)?))
}

/// `GET /sales-orders/:id`
pub async fn get_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<SalesOrderWithLines>, AppError> {
    Ok(Json(state.orders.get(id).await?))
}

/// `PUT /sales-orders/:id`
pub async fn update_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<SalesOrderRequest>,
) -> Result<Json<SalesOrderWithLines>, AppError> {
    Ok(Json(state.orders.update(id, payload).await?))
}

/// `DELETE /sales-orders/:id`
pub async fn delete_sales_order(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    state.orders.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
