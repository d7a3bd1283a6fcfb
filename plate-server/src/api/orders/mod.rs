//! 订单 API 模块
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/orders | POST | 创建订单（冻结工艺快照） |
//! | /api/orders | GET | 订单列表（状态/客户/色彩模式过滤） |
//! | /api/orders/{id} | GET | 订单详情 |
//! | /api/orders/{id}/start-processing | POST | NEW → PROCESS |
//! | /api/orders/{id}/complete | POST | PROCESS → DONE |

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/orders", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/{id}", get(handler::get_by_id))
        .route("/{id}/start-processing", post(handler::start_processing))
        .route("/{id}/complete", post(handler::complete))
}
