//! 版材 API 模块
//!
//! # 路由列表
//!
//! | 路径 | 方法 | 说明 |
//! |------|------|------|
//! | /api/plates/types | POST / GET | 版材型号创建 / 列表 |
//! | /api/plates/types/{id} | GET / PUT | 型号详情 / 更新参数 |
//! | /api/plates/types/{id}/threshold | PUT | 更新缺货阈值 |
//! | /api/plates/types/{id}/movements | GET | 动向台账历史 |
//! | /api/plates/stock | GET | 全部型号库存报表 |
//! | /api/plates/stock/{id} | GET | 单型号库存 |
//!
//! 动向录入按语义理由分端点，数量一律为正的"幅度"，出库方向由服务端取负：
//!
//! | 路径 | 理由 |
//! |------|------|
//! | /api/plates/movements/purchase | PURCHASE（入库） |
//! | /api/plates/movements/return | RETURN（入库） |
//! | /api/plates/movements/correction | CORRECTION（带符号，双向） |
//! | /api/plates/movements/usage | NORMAL_USAGE（要求订单 PROCESS） |
//! | /api/plates/movements/scrap/client | SCRAP_CLIENT |
//! | /api/plates/movements/scrap/production | SCRAP_PRODUCTION |
//! | /api/plates/movements/scrap/material | SCRAP_MATERIAL |
//! | /api/plates/movements/loss/test | LOSS_TEST |
//! | /api/plates/movements/loss/calibration | LOSS_CALIBRATION |
//! | /api/plates/movements/loss/equipment | LOSS_EQUIPMENT |

mod handler;

use axum::{
    Router,
    routing::{get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/plates", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // Plate types
        .route("/types", post(handler::create_type).get(handler::list_types))
        .route("/types/{id}", get(handler::get_type).put(handler::update_type))
        .route("/types/{id}/threshold", put(handler::update_threshold))
        .route("/types/{id}/movements", get(handler::movement_history))
        // Stock report
        .route("/stock", get(handler::all_stock))
        .route("/stock/{id}", get(handler::stock_for_type))
        // Movements, one endpoint per semantic reason
        .route("/movements/purchase", post(handler::purchase))
        .route("/movements/return", post(handler::return_incoming))
        .route("/movements/correction", post(handler::correction))
        .route("/movements/usage", post(handler::usage))
        .route("/movements/scrap/client", post(handler::scrap_client))
        .route("/movements/scrap/production", post(handler::scrap_production))
        .route("/movements/scrap/material", post(handler::scrap_material))
        .route("/movements/loss/test", post(handler::loss_test))
        .route("/movements/loss/calibration", post(handler::loss_calibration))
        .route("/movements/loss/equipment", post(handler::loss_equipment))
}
