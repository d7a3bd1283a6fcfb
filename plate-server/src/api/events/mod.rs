//! 事件日志查询 API（操作员界面用）
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/events | GET | 按上下文/类型过滤，offset/limit 分页，倒序 |

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::audit::{EventListResponse, EventQuery};
use crate::core::error::CoreError;
use crate::core::{Result, ServerState};
use crate::utils::AppResponse;

pub fn router() -> Router<ServerState> {
    Router::new().route("/api/events", get(list))
}

async fn list(
    State(state): State<ServerState>,
    Query(query): Query<EventQuery>,
) -> Result<Json<AppResponse<EventListResponse>>> {
    let events = state.audit.query(&query).map_err(CoreError::Storage)?;
    Ok(Json(AppResponse::success(events)))
}
