//! Order API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::{Result, ServerError, ServerState};
use crate::orders::OrderFilter;
use crate::utils::AppResponse;
use shared::models::{ColorMode, Order};

/// Create order request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateOrderRequest {
    #[validate(length(min = 1, message = "client_id must not be empty"))]
    pub client_id: String,
    pub color_mode: ColorMode,
}

/// Create an order
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateOrderRequest>,
) -> Result<(StatusCode, Json<AppResponse<Order>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let order = state.orders.create_order(&payload.client_id, payload.color_mode)?;
    Ok((StatusCode::CREATED, Json(AppResponse::success(order))))
}

/// List orders, filterable by status / client / color mode
pub async fn list(
    State(state): State<ServerState>,
    Query(filter): Query<OrderFilter>,
) -> Result<Json<AppResponse<Vec<Order>>>> {
    let orders = state.orders.list_orders(&filter)?;
    Ok(Json(AppResponse::success(orders)))
}

/// Get order by id
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Order>>> {
    let order = state.orders.get_order(&id)?;
    Ok(Json(AppResponse::success(order)))
}

/// NEW → PROCESS
pub async fn start_processing(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Order>>> {
    let order = state.orders.start_processing(&id)?;
    Ok(Json(AppResponse::success(order)))
}

/// PROCESS → DONE
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Order>>> {
    let order = state.orders.complete(&id)?;
    Ok(Json(AppResponse::success(order)))
}
