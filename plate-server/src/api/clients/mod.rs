//! 客户档案 API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/clients | POST | 创建客户 |
//! | /api/clients | GET | 客户列表 |
//! | /api/clients/{id} | GET | 客户详情 |
//! | /api/clients/{id}/tech-notes | PUT | 更新工艺备注 |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/clients", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/tech-notes", put(handler::update_tech_notes))
}
