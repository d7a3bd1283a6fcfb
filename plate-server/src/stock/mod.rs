//! Plate stock: append-only movement ledger and derived stock
//!
//! 库存没有存储的"当前值"——任何时刻的库存都是该版材全部动向的有符号
//! 数量之和。动向一旦写入不再修改、不再删除；纠错通过追加 CORRECTION
//! 动向完成。
//!
//! # record_movement flow
//!
//! ```text
//! 1. 静态校验（符号 / 责任方 / 订单引用规则）
//! 2. Begin write transaction
//! 3. 版材型号存在性检查（事务内读）
//! 4. 订单引用检查（NORMAL_USAGE 额外要求订单处于 PROCESS，事务内读）
//! 5. 取全局序号，追加动向 + plate.movement 审计（同一事务）
//! 6. Commit
//! 7. 提交后重算库存，低于阈值则发 plate.deficit.alert（独立事务，仅提示）
//! ```

use crate::audit::AuditTrail;
use crate::core::error::{CoreError, CoreResult};
use crate::store::Store;
use dashmap::DashMap;
use shared::models::{
    EventContext, MovementReason, MovementType, OrderStatus, PlateMovement, Responsibility,
    StockLevel,
};
use shared::util::{new_id, now_millis};
use std::sync::Arc;

/// Movement request, shared by all per-reason endpoints
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub plate_type_id: String,
    /// Signed quantity: positive for INCOMING, negative for OUTGOING
    pub quantity: i64,
    pub movement_type: MovementType,
    pub reason: MovementReason,
    pub order_id: Option<String>,
    pub responsibility: Option<Responsibility>,
    pub description: Option<String>,
}

/// Stock service: the only writer of the movement ledger
#[derive(Clone)]
pub struct StockService {
    store: Store,
    audit: AuditTrail,
    /// Memoized per-type stock sums as (covered sequence, sum), refreshed
    /// on every append; the sequence guard keeps late writers from
    /// clobbering a fresher sum
    sums: Arc<DashMap<String, (u64, i64)>>,
}

impl StockService {
    pub fn new(store: Store, audit: AuditTrail) -> Self {
        Self {
            store,
            audit,
            sums: Arc::new(DashMap::new()),
        }
    }

    /// Append one movement to the ledger.
    ///
    /// 负库存是合法状态（账实差异待 CORRECTION 纠正），绝不拒绝动向；
    /// 缺口只产生提示性审计事件。
    pub fn record_movement(&self, movement: NewMovement) -> CoreResult<PlateMovement> {
        Self::validate(&movement)?;

        let txn = self.store.begin_write()?;

        let plate_type = self
            .store
            .get_plate_type_txn(&txn, &movement.plate_type_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {}", movement.plate_type_id)))?;

        self.check_order_reference(&txn, &movement)?;

        let sequence = self.store.next_movement_sequence(&txn)?;
        let record = PlateMovement {
            id: new_id(),
            sequence,
            plate_type_id: movement.plate_type_id.clone(),
            quantity: movement.quantity,
            movement_type: movement.movement_type,
            reason: movement.reason,
            order_id: movement.order_id.clone(),
            responsibility: movement.responsibility,
            description: movement.description.clone(),
            created_at: now_millis(),
        };

        self.store.append_movement(&txn, &record)?;
        self.audit.append_in(
            &txn,
            "plate.movement",
            EventContext::Stock,
            serde_json::json!({
                "movement_id": record.id,
                "sequence": record.sequence,
                "plate_type_id": record.plate_type_id,
                "quantity": record.quantity,
                "movement_type": record.movement_type,
                "reason": record.reason,
                "order_id": record.order_id,
                "responsibility": record.responsibility,
                "description": record.description,
            }),
        )?;
        txn.commit()?;

        tracing::info!(plate_type_id = %record.plate_type_id, quantity = record.quantity,
            reason = ?record.reason, sequence = record.sequence, "Plate movement recorded");

        // 提交后才评估缺口：评估读到的账目必然包含刚落盘的动向。
        // 告警仅提示，失败不改变已提交动向的结果。
        if let Err(e) = self.evaluate_deficit(&record.plate_type_id, plate_type.min_stock_threshold)
        {
            tracing::error!(plate_type_id = %record.plate_type_id, error = %e,
                "Deficit evaluation failed");
        }

        Ok(record)
    }

    /// Static validation: everything decidable without touching storage
    fn validate(movement: &NewMovement) -> CoreResult<()> {
        if movement.quantity == 0 {
            return Err(CoreError::Validation("quantity must not be zero".into()));
        }
        match movement.movement_type {
            MovementType::Incoming if movement.quantity < 0 => {
                return Err(CoreError::Validation(
                    "INCOMING movement requires positive quantity".into(),
                ));
            }
            MovementType::Outgoing if movement.quantity > 0 => {
                return Err(CoreError::Validation(
                    "OUTGOING movement requires negative quantity".into(),
                ));
            }
            _ => {}
        }

        // 理由与方向的配对：只有 CORRECTION 双向
        let expected = match movement.reason {
            MovementReason::Purchase | MovementReason::Return => Some(MovementType::Incoming),
            MovementReason::Correction => None,
            MovementReason::NormalUsage
            | MovementReason::ScrapClient
            | MovementReason::ScrapProduction
            | MovementReason::ScrapMaterial
            | MovementReason::LossTest
            | MovementReason::LossCalibration
            | MovementReason::LossEquipment => Some(MovementType::Outgoing),
        };
        if let Some(expected) = expected {
            if movement.movement_type != expected {
                return Err(CoreError::Validation(format!(
                    "reason {:?} requires {:?} movement",
                    movement.reason, expected
                )));
            }
        }

        if movement.reason.requires_responsibility() && movement.responsibility.is_none() {
            return Err(CoreError::Validation(format!(
                "reason {:?} requires a responsibility attribution",
                movement.reason
            )));
        }

        if movement.reason.is_stock_internal() && movement.order_id.is_some() {
            return Err(CoreError::Validation(format!(
                "stock-internal reason {:?} must not reference an order",
                movement.reason
            )));
        }

        Ok(())
    }

    /// Order-reference rules that need storage reads (inside the write txn)
    fn check_order_reference(
        &self,
        txn: &redb::WriteTransaction,
        movement: &NewMovement,
    ) -> CoreResult<()> {
        match movement.reason {
            MovementReason::NormalUsage => {
                let order_id = movement.order_id.as_deref().ok_or_else(|| {
                    CoreError::Validation("NORMAL_USAGE requires an order reference".into())
                })?;
                let order = self
                    .store
                    .get_order_txn(txn, order_id)?
                    .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))?;
                // 耗用只能记在制版中的订单上，且检查与写入同事务
                if order.status != OrderStatus::Process {
                    return Err(CoreError::PreconditionFailed(format!(
                        "order {order_id} is {} (usage requires PROCESS)",
                        order.status
                    )));
                }
            }
            MovementReason::ScrapClient | MovementReason::ScrapProduction => {
                let order_id = movement.order_id.as_deref().ok_or_else(|| {
                    CoreError::Validation(format!(
                        "reason {:?} requires an order reference",
                        movement.reason
                    ))
                })?;
                self.store
                    .get_order_txn(txn, order_id)?
                    .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))?;
            }
            MovementReason::ScrapMaterial => {
                // 订单引用可选，给了就必须存在
                if let Some(order_id) = movement.order_id.as_deref() {
                    self.store
                        .get_order_txn(txn, order_id)?
                        .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))?;
                }
            }
            MovementReason::Purchase
            | MovementReason::Return
            | MovementReason::Correction => {
                if let Some(order_id) = movement.order_id.as_deref() {
                    self.store
                        .get_order_txn(txn, order_id)?
                        .ok_or_else(|| CoreError::NotFound(format!("Order {order_id}")))?;
                }
            }
            // 事前静态校验已拒绝带订单引用的内部损耗
            MovementReason::LossTest
            | MovementReason::LossCalibration
            | MovementReason::LossEquipment => {}
        }
        Ok(())
    }

    /// 缓存回写：只有覆盖更长台账前缀的和才允许覆盖旧值。
    ///
    /// 两个并发 record_movement 各自在提交后重算，回写顺序与提交顺序
    /// 可能颠倒；序列号保证迟到的旧和不会留下过期缓存。
    fn refresh_cache(&self, plate_type_id: &str, last_sequence: u64, sum: i64) {
        self.sums
            .entry(plate_type_id.to_string())
            .and_modify(|entry| {
                if last_sequence >= entry.0 {
                    *entry = (last_sequence, sum);
                }
            })
            .or_insert((last_sequence, sum));
    }

    /// Recompute stock after a committed append; emit an advisory alert on
    /// deficit. Runs in its own transaction.
    fn evaluate_deficit(&self, plate_type_id: &str, threshold: i64) -> CoreResult<()> {
        let (current_stock, last_sequence) = self.store.sum_for_type(plate_type_id)?;
        self.refresh_cache(plate_type_id, last_sequence, current_stock);

        if current_stock < threshold {
            tracing::warn!(plate_type_id, current_stock, threshold, "Plate stock deficit");
            self.audit.record(
                "plate.deficit.alert",
                EventContext::Stock,
                serde_json::json!({
                    "plate_type_id": plate_type_id,
                    "current_stock": current_stock,
                    "threshold": threshold,
                }),
            )?;
        }
        Ok(())
    }

    fn cached_sum(&self, plate_type_id: &str) -> CoreResult<i64> {
        if let Some(entry) = self.sums.get(plate_type_id) {
            return Ok(entry.1);
        }
        let (sum, last_sequence) = self.store.sum_for_type(plate_type_id)?;
        self.refresh_cache(plate_type_id, last_sequence, sum);
        Ok(sum)
    }

    /// Derived stock view for one plate type
    pub fn get_stock(&self, plate_type_id: &str) -> CoreResult<StockLevel> {
        let plate_type = self
            .store
            .get_plate_type(plate_type_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {plate_type_id}")))?;
        let current_stock = self.cached_sum(plate_type_id)?;

        Ok(StockLevel {
            plate_type_id: plate_type.id,
            format: plate_type.format,
            manufacturer: plate_type.manufacturer,
            current_stock,
            min_stock_threshold: plate_type.min_stock_threshold,
            is_deficit: current_stock < plate_type.min_stock_threshold,
        })
    }

    /// Stock report across all plate types (types without movements show 0)
    pub fn get_all_stock(&self) -> CoreResult<Vec<StockLevel>> {
        let types = self.store.list_plate_types()?;
        let sums: std::collections::HashMap<String, (i64, u64)> = self
            .store
            .sum_by_type()?
            .into_iter()
            .map(|(id, sum, last)| (id, (sum, last)))
            .collect();

        let mut levels = Vec::with_capacity(types.len());
        for plate_type in types {
            let (current_stock, last_sequence) =
                sums.get(&plate_type.id).copied().unwrap_or((0, 0));
            self.refresh_cache(&plate_type.id, last_sequence, current_stock);
            levels.push(StockLevel {
                is_deficit: current_stock < plate_type.min_stock_threshold,
                plate_type_id: plate_type.id,
                format: plate_type.format,
                manufacturer: plate_type.manufacturer,
                current_stock,
                min_stock_threshold: plate_type.min_stock_threshold,
            });
        }
        levels.sort_by(|a, b| a.format.cmp(&b.format));
        Ok(levels)
    }

    /// Full movement history for one plate type, in ledger order
    pub fn movement_history(&self, plate_type_id: &str) -> CoreResult<Vec<PlateMovement>> {
        self.store
            .get_plate_type(plate_type_id)?
            .ok_or_else(|| CoreError::NotFound(format!("Plate type {plate_type_id}")))?;
        Ok(self.store.movements_for_type(plate_type_id)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::Directory;
    use crate::orders::{ConfiguredDotGainPolicy, OrderService};
    use shared::models::{ClientCreate, ColorMode, PlateTypeCreate, Responsibility};

    struct Fixture {
        store: Store,
        stock: StockService,
        orders: OrderService,
        directory: Directory,
    }

    fn fixture() -> Fixture {
        let store = Store::open_in_memory().unwrap();
        let audit = AuditTrail::new(store.clone());
        Fixture {
            stock: StockService::new(store.clone(), audit.clone()),
            orders: OrderService::new(
                store.clone(),
                audit.clone(),
                Arc::new(ConfiguredDotGainPolicy::default()),
            ),
            directory: Directory::new(store.clone(), audit),
            store,
        }
    }

    fn seed_plate_type(fx: &Fixture, threshold: i64) -> String {
        fx.directory
            .create_plate_type(PlateTypeCreate {
                format: "745x605x0.3".into(),
                manufacturer: "Fujifilm".into(),
                other_params: serde_json::Value::Null,
                min_stock_threshold: threshold,
            })
            .unwrap()
            .id
    }

    fn seed_process_order(fx: &Fixture) -> String {
        let client = fx
            .directory
            .create_client(ClientCreate {
                name: "Aurora Print".into(),
                tech_notes: vec![],
            })
            .unwrap();
        let order = fx.orders.create_order(&client.id, ColorMode::Cmyk).unwrap();
        fx.orders.start_processing(&order.id).unwrap().id
    }

    fn purchase(fx: &Fixture, plate_type_id: &str, quantity: i64) -> CoreResult<PlateMovement> {
        fx.stock.record_movement(NewMovement {
            plate_type_id: plate_type_id.into(),
            quantity,
            movement_type: MovementType::Incoming,
            reason: MovementReason::Purchase,
            order_id: None,
            responsibility: None,
            description: None,
        })
    }

    fn usage(
        fx: &Fixture,
        plate_type_id: &str,
        quantity: i64,
        order_id: Option<&str>,
    ) -> CoreResult<PlateMovement> {
        fx.stock.record_movement(NewMovement {
            plate_type_id: plate_type_id.into(),
            quantity,
            movement_type: MovementType::Outgoing,
            reason: MovementReason::NormalUsage,
            order_id: order_id.map(str::to_string),
            responsibility: None,
            description: None,
        })
    }

    #[test]
    fn stock_is_sum_of_movements() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);
        let order = seed_process_order(&fx);

        purchase(&fx, &pt, 50).unwrap();
        usage(&fx, &pt, -20, Some(&order)).unwrap();
        purchase(&fx, &pt, 5).unwrap();

        let level = fx.stock.get_stock(&pt).unwrap();
        assert_eq!(level.current_stock, 35);
        assert!(!level.is_deficit);
    }

    #[test]
    fn zero_and_sign_mismatch_rejected() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        assert!(matches!(purchase(&fx, &pt, 0).unwrap_err(), CoreError::Validation(_)));
        assert!(matches!(purchase(&fx, &pt, -3).unwrap_err(), CoreError::Validation(_)));

        // OUTGOING 正数
        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: 3,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::NormalUsage,
                order_id: Some("o1".into()),
                responsibility: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn reason_direction_pairing_enforced() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        // PURCHASE 不能出库
        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -5,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::Purchase,
                order_id: None,
                responsibility: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn unknown_plate_type_is_not_found() {
        let fx = fixture();
        assert!(matches!(
            purchase(&fx, "ghost", 10).unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[test]
    fn scrap_requires_responsibility_and_order() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);
        let order = seed_process_order(&fx);

        // 缺责任方
        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -2,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::ScrapClient,
                order_id: Some(order.clone()),
                responsibility: None,
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // 缺订单引用
        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -2,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::ScrapProduction,
                order_id: None,
                responsibility: Some(Responsibility::Production),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // 齐全则通过
        fx.stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -2,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::ScrapClient,
                order_id: Some(order),
                responsibility: Some(Responsibility::Client),
                description: Some("scratched during handling".into()),
            })
            .unwrap();
    }

    #[test]
    fn scrap_material_order_is_optional() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        fx.stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -1,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::ScrapMaterial,
                order_id: None,
                responsibility: Some(Responsibility::Materials),
                description: None,
            })
            .unwrap();

        // 给了不存在的订单则 NotFound
        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt,
                quantity: -1,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::ScrapMaterial,
                order_id: Some("ghost".into()),
                responsibility: Some(Responsibility::Materials),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::NotFound(_)));
    }

    #[test]
    fn stock_internal_loss_rejects_order_reference() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);
        let order = seed_process_order(&fx);

        let err = fx
            .stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -1,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::LossCalibration,
                order_id: Some(order),
                responsibility: Some(Responsibility::Production),
                description: None,
            })
            .unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));

        // 不挂订单则合法
        fx.stock
            .record_movement(NewMovement {
                plate_type_id: pt,
                quantity: -1,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::LossTest,
                order_id: None,
                responsibility: Some(Responsibility::Production),
                description: Some("weekly linearization".into()),
            })
            .unwrap();
    }

    #[test]
    fn usage_requires_order_in_process() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        // 无订单引用
        assert!(matches!(
            usage(&fx, &pt, -1, None).unwrap_err(),
            CoreError::Validation(_)
        ));

        // 订单不存在
        assert!(matches!(
            usage(&fx, &pt, -1, Some("ghost")).unwrap_err(),
            CoreError::NotFound(_)
        ));

        // NEW 状态订单
        let client = fx
            .directory
            .create_client(ClientCreate { name: "c".into(), tech_notes: vec![] })
            .unwrap();
        let order = fx.orders.create_order(&client.id, ColorMode::Cmyk).unwrap();
        assert!(matches!(
            usage(&fx, &pt, -1, Some(&order.id)).unwrap_err(),
            CoreError::PreconditionFailed(_)
        ));

        // DONE 状态订单
        fx.orders.start_processing(&order.id).unwrap();
        fx.orders.complete(&order.id).unwrap();
        assert!(matches!(
            usage(&fx, &pt, -1, Some(&order.id)).unwrap_err(),
            CoreError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn correction_accepts_both_signs() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        fx.stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: 3,
                movement_type: MovementType::Incoming,
                reason: MovementReason::Correction,
                order_id: None,
                responsibility: None,
                description: Some("cycle count surplus".into()),
            })
            .unwrap();
        fx.stock
            .record_movement(NewMovement {
                plate_type_id: pt.clone(),
                quantity: -1,
                movement_type: MovementType::Outgoing,
                reason: MovementReason::Correction,
                order_id: None,
                responsibility: None,
                description: Some("cycle count shortage".into()),
            })
            .unwrap();

        assert_eq!(fx.stock.get_stock(&pt).unwrap().current_stock, 2);
    }

    #[test]
    fn deficit_alert_emitted_below_threshold() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 10);
        let order = seed_process_order(&fx);

        // +50：库存 50 ≥ 10，不告警
        purchase(&fx, &pt, 50).unwrap();
        let alerts = |store: &Store| {
            store
                .list_events()
                .unwrap()
                .into_iter()
                .filter(|e| e.event_type == "plate.deficit.alert")
                .collect::<Vec<_>>()
        };
        assert!(alerts(&fx.store).is_empty());

        // −45：库存 5 < 10，告警
        usage(&fx, &pt, -45, Some(&order)).unwrap();
        let found = alerts(&fx.store);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].payload["plate_type_id"], pt.as_str());
        assert_eq!(found[0].payload["current_stock"], 5);
        assert_eq!(found[0].payload["threshold"], 10);

        let level = fx.stock.get_stock(&pt).unwrap();
        assert_eq!(level.current_stock, 5);
        assert!(level.is_deficit);
    }

    #[test]
    fn negative_stock_is_legal() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);
        let order = seed_process_order(&fx);

        usage(&fx, &pt, -7, Some(&order)).unwrap();
        let level = fx.stock.get_stock(&pt).unwrap();
        assert_eq!(level.current_stock, -7);
    }

    #[test]
    fn threshold_update_affects_only_future_evaluations() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        purchase(&fx, &pt, 5).unwrap();
        assert!(!fx.stock.get_stock(&pt).unwrap().is_deficit);

        // 提高阈值不回溯产生告警，但读侧立即反映缺口
        fx.directory.update_threshold(&pt, 20).unwrap();
        let level = fx.stock.get_stock(&pt).unwrap();
        assert!(level.is_deficit);
        let alerts = fx
            .store
            .list_events()
            .unwrap()
            .into_iter()
            .filter(|e| e.event_type == "plate.deficit.alert")
            .count();
        assert_eq!(alerts, 0);

        // 下一次动向按新阈值评估
        purchase(&fx, &pt, 1).unwrap();
        let alerts = fx
            .store
            .list_events()
            .unwrap()
            .into_iter()
            .filter(|e| e.event_type == "plate.deficit.alert")
            .count();
        assert_eq!(alerts, 1);
    }

    #[test]
    fn cache_refresh_ignores_stale_sums() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);
        let order = seed_process_order(&fx);

        purchase(&fx, &pt, 50).unwrap();
        usage(&fx, &pt, -45, Some(&order)).unwrap();
        assert_eq!(fx.stock.get_stock(&pt).unwrap().current_stock, 5);

        // 并发评估的迟到回写：覆盖较短前缀的和不得覆盖较新值
        let (stale_sum, stale_seq) = {
            let entry = fx.stock.sums.get(&pt).unwrap();
            (entry.1 + 45, entry.0 - 1)
        };
        fx.stock.refresh_cache(&pt, stale_seq, stale_sum);
        assert_eq!(fx.stock.get_stock(&pt).unwrap().current_stock, 5);

        // 覆盖更长前缀的回写正常生效
        purchase(&fx, &pt, 7).unwrap();
        assert_eq!(fx.stock.get_stock(&pt).unwrap().current_stock, 12);
    }

    #[test]
    fn all_stock_includes_types_without_movements() {
        let fx = fixture();
        let pt_a = seed_plate_type(&fx, 3);
        let pt_b = fx
            .directory
            .create_plate_type(PlateTypeCreate {
                format: "650x550x0.3".into(),
                manufacturer: "Agfa".into(),
                other_params: serde_json::Value::Null,
                min_stock_threshold: 0,
            })
            .unwrap()
            .id;

        purchase(&fx, &pt_a, 8).unwrap();

        let levels = fx.stock.get_all_stock().unwrap();
        assert_eq!(levels.len(), 2);
        let by_id = |id: &str| levels.iter().find(|l| l.plate_type_id == id).unwrap();
        assert_eq!(by_id(&pt_a).current_stock, 8);
        assert_eq!(by_id(&pt_b).current_stock, 0);
        assert!(!by_id(&pt_b).is_deficit);
    }

    #[test]
    fn movement_audit_entry_written_with_append() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        let movement = purchase(&fx, &pt, 12).unwrap();

        let entries: Vec<_> = fx
            .store
            .list_events()
            .unwrap()
            .into_iter()
            .filter(|e| e.event_type == "plate.movement")
            .collect();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].payload["movement_id"], movement.id.as_str());
        assert_eq!(entries[0].payload["quantity"], 12);
        assert_eq!(entries[0].payload["reason"], "PURCHASE");
    }

    #[test]
    fn history_preserves_ledger_order() {
        let fx = fixture();
        let pt = seed_plate_type(&fx, 0);

        purchase(&fx, &pt, 10).unwrap();
        purchase(&fx, &pt, 20).unwrap();

        let history = fx.stock.movement_history(&pt).unwrap();
        assert_eq!(history.len(), 2);
        assert!(history[0].sequence < history[1].sequence);
        assert_eq!(history[0].quantity, 10);
    }
}
