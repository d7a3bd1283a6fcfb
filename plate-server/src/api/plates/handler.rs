//! Plate API Handlers
//!
//! 动向端点只接受正的"幅度"数量；出库方向的符号由服务端决定，杜绝
//! 客户端符号错误直接污染台账。

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::{Result, ServerError, ServerState};
use crate::stock::NewMovement;
use crate::utils::AppResponse;
use shared::models::{
    MovementReason, MovementType, PlateMovement, PlateType, PlateTypeCreate, PlateTypeUpdate,
    Responsibility, StockLevel,
};

// ========== Plate types ==========

/// Create plate type request
#[derive(Debug, Deserialize, Validate)]
pub struct CreatePlateTypeRequest {
    #[validate(length(min = 1, message = "format must not be empty"))]
    pub format: String,
    #[validate(length(min = 1, message = "manufacturer must not be empty"))]
    pub manufacturer: String,
    #[serde(default)]
    pub other_params: serde_json::Value,
    #[serde(default)]
    pub min_stock_threshold: i64,
}

pub async fn create_type(
    State(state): State<ServerState>,
    Json(payload): Json<CreatePlateTypeRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateType>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let plate_type = state.directory.create_plate_type(PlateTypeCreate {
        format: payload.format,
        manufacturer: payload.manufacturer,
        other_params: payload.other_params,
        min_stock_threshold: payload.min_stock_threshold,
    })?;
    Ok((StatusCode::CREATED, Json(AppResponse::success(plate_type))))
}

pub async fn list_types(
    State(state): State<ServerState>,
) -> Result<Json<AppResponse<Vec<PlateType>>>> {
    let types = state.directory.list_plate_types()?;
    Ok(Json(AppResponse::success(types)))
}

pub async fn get_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<PlateType>>> {
    let plate_type = state.directory.get_plate_type(&id)?;
    Ok(Json(AppResponse::success(plate_type)))
}

pub async fn update_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<PlateTypeUpdate>,
) -> Result<Json<AppResponse<PlateType>>> {
    let plate_type = state.directory.update_plate_type(&id, payload)?;
    Ok(Json(AppResponse::success(plate_type)))
}

/// Threshold update request
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateThresholdRequest {
    #[validate(range(min = 0, message = "min_stock_threshold must be >= 0"))]
    pub min_stock_threshold: i64,
}

pub async fn update_threshold(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateThresholdRequest>,
) -> Result<Json<AppResponse<PlateType>>> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let plate_type = state
        .directory
        .update_threshold(&id, payload.min_stock_threshold)?;
    Ok(Json(AppResponse::success(plate_type)))
}

// ========== Stock reads ==========

pub async fn all_stock(
    State(state): State<ServerState>,
) -> Result<Json<AppResponse<Vec<StockLevel>>>> {
    let levels = state.stock.get_all_stock()?;
    Ok(Json(AppResponse::success(levels)))
}

pub async fn stock_for_type(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<StockLevel>>> {
    let level = state.stock.get_stock(&id)?;
    Ok(Json(AppResponse::success(level)))
}

pub async fn movement_history(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Vec<PlateMovement>>>> {
    let movements = state.stock.movement_history(&id)?;
    Ok(Json(AppResponse::success(movements)))
}

// ========== Movements ==========

/// Magnitude-only movement request (purchase / return / loss)
#[derive(Debug, Deserialize, Validate)]
pub struct MagnitudeMovementRequest {
    #[validate(length(min = 1, message = "plate_type_id must not be empty"))]
    pub plate_type_id: String,
    #[validate(range(min = 1, message = "quantity must be >= 1"))]
    pub quantity: i64,
    pub description: Option<String>,
}

/// Usage movement request (order reference mandatory)
#[derive(Debug, Deserialize, Validate)]
pub struct UsageMovementRequest {
    #[validate(length(min = 1, message = "plate_type_id must not be empty"))]
    pub plate_type_id: String,
    #[validate(range(min = 1, message = "quantity must be >= 1"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "order_id must not be empty"))]
    pub order_id: String,
    pub description: Option<String>,
}

/// Scrap movement request (order reference per scrap family rules)
#[derive(Debug, Deserialize, Validate)]
pub struct ScrapMovementRequest {
    #[validate(length(min = 1, message = "plate_type_id must not be empty"))]
    pub plate_type_id: String,
    #[validate(range(min = 1, message = "quantity must be >= 1"))]
    pub quantity: i64,
    pub order_id: Option<String>,
    pub description: Option<String>,
}

/// Signed correction request — the sign determines the direction
#[derive(Debug, Deserialize, Validate)]
pub struct CorrectionMovementRequest {
    #[validate(length(min = 1, message = "plate_type_id must not be empty"))]
    pub plate_type_id: String,
    pub quantity: i64,
    pub description: Option<String>,
}

fn record(
    state: &ServerState,
    movement: NewMovement,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    let recorded = state.stock.record_movement(movement)?;
    Ok((StatusCode::CREATED, Json(AppResponse::success(recorded))))
}

pub async fn purchase(
    State(state): State<ServerState>,
    Json(payload): Json<MagnitudeMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    record(
        &state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: payload.quantity,
            movement_type: MovementType::Incoming,
            reason: MovementReason::Purchase,
            order_id: None,
            responsibility: None,
            description: payload.description,
        },
    )
}

pub async fn return_incoming(
    State(state): State<ServerState>,
    Json(payload): Json<MagnitudeMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    record(
        &state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: payload.quantity,
            movement_type: MovementType::Incoming,
            reason: MovementReason::Return,
            order_id: None,
            responsibility: None,
            description: payload.description,
        },
    )
}

/// 盘点校正：带符号数量，方向由符号推导
pub async fn correction(
    State(state): State<ServerState>,
    Json(payload): Json<CorrectionMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let movement_type = if payload.quantity >= 0 {
        MovementType::Incoming
    } else {
        MovementType::Outgoing
    };
    record(
        &state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: payload.quantity,
            movement_type,
            reason: MovementReason::Correction,
            order_id: None,
            responsibility: None,
            description: payload.description,
        },
    )
}

pub async fn usage(
    State(state): State<ServerState>,
    Json(payload): Json<UsageMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    record(
        &state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: -payload.quantity,
            movement_type: MovementType::Outgoing,
            reason: MovementReason::NormalUsage,
            order_id: Some(payload.order_id),
            responsibility: None,
            description: payload.description,
        },
    )
}

fn scrap(
    state: &ServerState,
    payload: ScrapMovementRequest,
    reason: MovementReason,
    responsibility: Responsibility,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    record(
        state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: -payload.quantity,
            movement_type: MovementType::Outgoing,
            reason,
            order_id: payload.order_id,
            responsibility: Some(responsibility),
            description: payload.description,
        },
    )
}

pub async fn scrap_client(
    State(state): State<ServerState>,
    Json(payload): Json<ScrapMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    scrap(&state, payload, MovementReason::ScrapClient, Responsibility::Client)
}

pub async fn scrap_production(
    State(state): State<ServerState>,
    Json(payload): Json<ScrapMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    scrap(&state, payload, MovementReason::ScrapProduction, Responsibility::Production)
}

pub async fn scrap_material(
    State(state): State<ServerState>,
    Json(payload): Json<ScrapMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    scrap(&state, payload, MovementReason::ScrapMaterial, Responsibility::Materials)
}

/// 内部损耗统一记生产责任，不关联订单
fn loss(
    state: &ServerState,
    payload: MagnitudeMovementRequest,
    reason: MovementReason,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;
    record(
        state,
        NewMovement {
            plate_type_id: payload.plate_type_id,
            quantity: -payload.quantity,
            movement_type: MovementType::Outgoing,
            reason,
            order_id: None,
            responsibility: Some(Responsibility::Production),
            description: payload.description,
        },
    )
}

pub async fn loss_test(
    State(state): State<ServerState>,
    Json(payload): Json<MagnitudeMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    loss(&state, payload, MovementReason::LossTest)
}

pub async fn loss_calibration(
    State(state): State<ServerState>,
    Json(payload): Json<MagnitudeMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    loss(&state, payload, MovementReason::LossCalibration)
}

pub async fn loss_equipment(
    State(state): State<ServerState>,
    Json(payload): Json<MagnitudeMovementRequest>,
) -> Result<(StatusCode, Json<AppResponse<PlateMovement>>)> {
    loss(&state, payload, MovementReason::LossEquipment)
}
