//! 事件日志模块 — 追加式领域事件记录
//!
//! # 架构
//!
//! ```text
//! 领域操作 (订单状态机 / 库存台账 / 目录)
//!   ├─ AuditTrail::append_in(txn, ...) → 与触发操作同一事务提交（写前日志）
//!   └─ AuditTrail::record(...)         → 独立事务（缺货告警等事后通知）
//! ```
//!
//! # 保证
//!
//! - **Append-only**: 无删除/更新接口
//! - **写前**: 已提交的状态变更不可能缺失对应日志条目 —— 丢失条目是
//!   正确性缺陷，不是可接受的降级
//! - 核心组件只写不读；查询接口仅供运维界面

use crate::store::{StorageResult, Store};
use redb::WriteTransaction;
use shared::models::{EventContext, EventLogEntry};
use shared::util::now_millis;

/// 事件日志查询参数
#[derive(Debug, Clone, serde::Deserialize)]
pub struct EventQuery {
    /// 上下文过滤
    pub context: Option<EventContext>,
    /// 事件类型过滤（精确匹配，如 "plate.movement"）
    pub event_type: Option<String>,
    /// 分页偏移
    #[serde(default)]
    pub offset: usize,
    /// 分页大小（默认 50）
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    50
}

impl Default for EventQuery {
    fn default() -> Self {
        Self {
            context: None,
            event_type: None,
            offset: 0,
            limit: default_limit(),
        }
    }
}

/// 事件日志列表响应
#[derive(Debug, serde::Serialize)]
pub struct EventListResponse {
    pub items: Vec<EventLogEntry>,
    pub total: usize,
}

/// Audit trail over the shared store
#[derive(Clone)]
pub struct AuditTrail {
    store: Store,
}

impl AuditTrail {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Append an entry inside the caller's write transaction.
    ///
    /// The entry commits (or aborts) together with the mutation that caused
    /// it — the caller must not report success before the commit.
    pub fn append_in(
        &self,
        txn: &WriteTransaction,
        event_type: &str,
        context: EventContext,
        payload: serde_json::Value,
    ) -> StorageResult<EventLogEntry> {
        let id = self.store.next_event_sequence(txn)?;
        let entry = EventLogEntry {
            id,
            event_type: event_type.to_string(),
            context,
            payload,
            timestamp: now_millis(),
        };
        self.store.append_event(txn, &entry)?;
        tracing::debug!(event_type = %entry.event_type, sequence = id, "Event logged");
        Ok(entry)
    }

    /// Append an entry in its own transaction.
    ///
    /// Used for advisory notifications (deficit alerts) that run after their
    /// triggering mutation has already committed.
    pub fn record(
        &self,
        event_type: &str,
        context: EventContext,
        payload: serde_json::Value,
    ) -> StorageResult<EventLogEntry> {
        let txn = self.store.begin_write()?;
        let entry = self.append_in(&txn, event_type, context, payload)?;
        txn.commit()?;
        Ok(entry)
    }

    /// Query the log (operator-facing; the core never reads it back)
    pub fn query(&self, query: &EventQuery) -> StorageResult<EventListResponse> {
        let mut entries = self.store.list_events()?;

        entries.retain(|e| {
            query.context.is_none_or(|ctx| e.context == ctx)
                && query
                    .event_type
                    .as_deref()
                    .is_none_or(|t| e.event_type == t)
        });
        // 最新条目在前
        entries.reverse();

        let total = entries.len();
        let items = entries
            .into_iter()
            .skip(query.offset)
            .take(query.limit)
            .collect();
        Ok(EventListResponse { items, total })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trail() -> (Store, AuditTrail) {
        let store = Store::open_in_memory().unwrap();
        let audit = AuditTrail::new(store.clone());
        (store, audit)
    }

    #[test]
    fn append_in_commits_with_caller_txn() {
        let (store, audit) = trail();

        let txn = store.begin_write().unwrap();
        audit
            .append_in(&txn, "order.created", EventContext::Order, serde_json::json!({}))
            .unwrap();
        // 未提交前对读者不可见
        assert!(store.list_events().unwrap().is_empty());
        txn.commit().unwrap();

        let events = store.list_events().unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event_type, "order.created");
    }

    #[test]
    fn aborted_txn_leaves_no_entry() {
        let (store, audit) = trail();

        let txn = store.begin_write().unwrap();
        audit
            .append_in(&txn, "order.created", EventContext::Order, serde_json::json!({}))
            .unwrap();
        drop(txn); // abort

        assert!(store.list_events().unwrap().is_empty());
    }

    #[test]
    fn query_filters_and_paginates() {
        let (_store, audit) = trail();

        for i in 0..5 {
            audit
                .record(
                    "plate.movement",
                    EventContext::Stock,
                    serde_json::json!({"i": i}),
                )
                .unwrap();
        }
        audit
            .record("order.created", EventContext::Order, serde_json::json!({}))
            .unwrap();

        let all = audit.query(&EventQuery::default()).unwrap();
        assert_eq!(all.total, 6);
        // 最新条目在前
        assert_eq!(all.items[0].event_type, "order.created");

        let stock_only = audit
            .query(&EventQuery {
                context: Some(EventContext::Stock),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(stock_only.total, 5);

        let page = audit
            .query(&EventQuery {
                context: Some(EventContext::Stock),
                offset: 3,
                limit: 10,
                event_type: None,
            })
            .unwrap();
        assert_eq!(page.items.len(), 2);
    }
}
