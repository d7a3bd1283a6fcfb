//! Plate types and stock movement models
//!
//! A movement is an immutable signed-quantity fact against a plate type's
//! stock. There is no stored "current stock" anywhere — stock is always the
//! sum of the movement log.

use serde::{Deserialize, Serialize};

/// Plate type entity (CTP 版材型号)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateType {
    pub id: String,
    /// Physical format, e.g. "745x605x0.3"
    pub format: String,
    pub manufacturer: String,
    /// Free-form parameter bag (emulsion, spectral sensitivity, ...)
    #[serde(default)]
    pub other_params: serde_json::Value,
    /// Minimum stock threshold; stock below this is a deficit
    pub min_stock_threshold: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create plate type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateTypeCreate {
    pub format: String,
    pub manufacturer: String,
    #[serde(default)]
    pub other_params: serde_json::Value,
    #[serde(default)]
    pub min_stock_threshold: i64,
}

/// Update plate type payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateTypeUpdate {
    pub format: Option<String>,
    pub manufacturer: Option<String>,
    pub other_params: Option<serde_json::Value>,
}

/// 库存动向方向
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// 入库 — quantity > 0
    Incoming,
    /// 出库 — quantity < 0
    Outgoing,
}

/// Closed category explaining why a movement occurred.
///
/// Adding a variant forces every validation site to be revisited — reason
/// handling is exhaustive matching, never string comparison.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementReason {
    /// 采购入库
    Purchase,
    /// 退货入库
    Return,
    /// 盘点校正（双向）
    Correction,
    /// 订单正常耗用
    NormalUsage,
    /// 废版 — 客户责任
    ScrapClient,
    /// 废版 — 生产责任
    ScrapProduction,
    /// 废版 — 材料责任
    ScrapMaterial,
    /// 损耗 — 测试（内部，不挂订单）
    LossTest,
    /// 损耗 — 校准（内部，不挂订单）
    LossCalibration,
    /// 损耗 — 设备故障（内部，不挂订单）
    LossEquipment,
}

impl MovementReason {
    /// Scrap and loss reasons must carry a responsibility attribution.
    pub fn requires_responsibility(self) -> bool {
        match self {
            MovementReason::ScrapClient
            | MovementReason::ScrapProduction
            | MovementReason::ScrapMaterial
            | MovementReason::LossTest
            | MovementReason::LossCalibration
            | MovementReason::LossEquipment => true,
            MovementReason::Purchase
            | MovementReason::Return
            | MovementReason::Correction
            | MovementReason::NormalUsage => false,
        }
    }

    /// Test/calibration/equipment losses are stock-internal: they never
    /// reference an order.
    pub fn is_stock_internal(self) -> bool {
        matches!(
            self,
            MovementReason::LossTest
                | MovementReason::LossCalibration
                | MovementReason::LossEquipment
        )
    }
}

/// Party attributed to a scrap or loss movement
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Responsibility {
    Client,
    Production,
    Materials,
}

/// Stock movement — immutable once written, never updated or deleted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlateMovement {
    pub id: String,
    /// Global append sequence (authoritative ordering within the ledger)
    pub sequence: u64,
    pub plate_type_id: String,
    /// Signed quantity: positive for INCOMING, negative for OUTGOING
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: MovementReason,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responsibility: Option<Responsibility>,
    /// Operator-supplied free-text note (scrap/loss endpoints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub created_at: i64,
}

/// Derived stock view for one plate type
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockLevel {
    pub plate_type_id: String,
    pub format: String,
    pub manufacturer: String,
    pub current_stock: i64,
    pub min_stock_threshold: i64,
    pub is_deficit: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrap_and_loss_require_responsibility() {
        assert!(MovementReason::ScrapClient.requires_responsibility());
        assert!(MovementReason::LossCalibration.requires_responsibility());
        assert!(!MovementReason::Purchase.requires_responsibility());
        assert!(!MovementReason::NormalUsage.requires_responsibility());
    }

    #[test]
    fn losses_are_stock_internal() {
        assert!(MovementReason::LossTest.is_stock_internal());
        assert!(MovementReason::LossEquipment.is_stock_internal());
        assert!(!MovementReason::ScrapClient.is_stock_internal());
        assert!(!MovementReason::Correction.is_stock_internal());
    }

    #[test]
    fn reason_serializes_screaming_snake() {
        assert_eq!(
            serde_json::to_string(&MovementReason::ScrapProduction).unwrap(),
            "\"SCRAP_PRODUCTION\""
        );
        assert_eq!(
            serde_json::from_str::<MovementReason>("\"LOSS_CALIBRATION\"").unwrap(),
            MovementReason::LossCalibration
        );
    }
}
