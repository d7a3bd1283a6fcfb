//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查
//! - [`orders`] - 订单生命周期接口
//! - [`clients`] - 客户档案接口
//! - [`plates`] - 版材型号 / 库存动向接口
//! - [`events`] - 事件日志查询接口

pub mod clients;
pub mod events;
pub mod health;
pub mod orders;
pub mod plates;

use axum::Router;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::core::ServerState;

// Re-export common types for handlers
pub use crate::utils::AppResponse;

/// Build the Axum router (without state)
pub fn build_router() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(orders::router())
        .merge(clients::router())
        .merge(plates::router())
        .merge(events::router())
}

/// Build the complete application with state and middleware
pub fn build_app(state: ServerState) -> Router {
    build_router()
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}
