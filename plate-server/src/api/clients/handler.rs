//! Client API Handlers

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use validator::Validate;

use crate::core::{Result, ServerError, ServerState};
use crate::utils::AppResponse;
use shared::models::{Client, ClientCreate, ClientUpdate};

/// Create client request
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[serde(default)]
    pub tech_notes: Vec<String>,
}

pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateClientRequest>,
) -> Result<(StatusCode, Json<AppResponse<Client>>)> {
    payload
        .validate()
        .map_err(|e| ServerError::Validation(e.to_string()))?;

    let client = state.directory.create_client(ClientCreate {
        name: payload.name,
        tech_notes: payload.tech_notes,
    })?;
    Ok((StatusCode::CREATED, Json(AppResponse::success(client))))
}

pub async fn list(State(state): State<ServerState>) -> Result<Json<AppResponse<Vec<Client>>>> {
    let clients = state.directory.list_clients()?;
    Ok(Json(AppResponse::success(clients)))
}

pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> Result<Json<AppResponse<Client>>> {
    let client = state.directory.get_client(&id)?;
    Ok(Json(AppResponse::success(client)))
}

/// Tech-notes update request
#[derive(Debug, Deserialize)]
pub struct UpdateTechNotesRequest {
    pub tech_notes: Vec<String>,
}

/// 更新客户工艺备注（已有订单的快照不受影响）
pub async fn update_tech_notes(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateTechNotesRequest>,
) -> Result<Json<AppResponse<Client>>> {
    let client = state.directory.update_client(
        &id,
        ClientUpdate {
            name: None,
            tech_notes: Some(payload.tech_notes),
        },
    )?;
    Ok(Json(AppResponse::success(client)))
}
