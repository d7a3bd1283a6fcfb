//! Event log types
//!
//! 追加式事件日志 — 每个领域操作的副作用记录。
//! 条目不可变、不可删除；核心组件只写不读（查询接口仅供运维界面）。

use serde::{Deserialize, Serialize};

/// Event context — 产生记录的子系统
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventContext {
    Order,
    Stock,
    System,
}

impl std::fmt::Display for EventContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventContext::Order => write!(f, "order"),
            EventContext::Stock => write!(f, "stock"),
            EventContext::System => write!(f, "system"),
        }
    }
}

/// Event log entry (不可变)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    /// 全局递增序列号（唯一标识）
    pub id: u64,
    /// 事件类型标签，如 "order.created"、"plate.movement"
    pub event_type: String,
    /// 上下文标签
    pub context: EventContext,
    /// 结构化详情（JSON）
    pub payload: serde_json::Value,
    /// 时间戳（Unix 毫秒）
    pub timestamp: i64,
}
