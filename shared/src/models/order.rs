//! Order model and lifecycle types

use serde::{Deserialize, Serialize};

/// 订单状态 — 单向生命周期 NEW → PROCESS → DONE
///
/// Transitions are enforced by the order state machine; the status field
/// never skips a stage and never moves backwards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 新建 — 等待投产
    New,
    /// 制版中
    Process,
    /// 已完成（终态）
    Done,
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderStatus::New => write!(f, "NEW"),
            OrderStatus::Process => write!(f, "PROCESS"),
            OrderStatus::Done => write!(f, "DONE"),
        }
    }
}

/// 印刷色彩模式
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ColorMode {
    Cmyk,
    Black,
    Multicolor,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ColorMode::Cmyk => write!(f, "CMYK"),
            ColorMode::Black => write!(f, "BLACK"),
            ColorMode::Multicolor => write!(f, "MULTICOLOR"),
        }
    }
}

/// Frozen per-order annotation set, built exactly once at creation.
///
/// There are no mutating accessors: the snapshot is constructed by the
/// auto-mark builder, moved into the order, and only ever read afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct NotesSnapshot {
    /// Client technological notes, copied verbatim at creation time
    #[serde(default)]
    pub client_tech_notes: Vec<String>,
    /// Automatically generated control marks (color-mode driven)
    #[serde(default)]
    pub automated_notes: Vec<String>,
}

/// Order entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: String,
    pub client_id: String,
    pub color_mode: ColorMode,
    pub status: OrderStatus,
    /// Creation-time snapshot — immutable for the life of the order
    pub notes_snapshot: NotesSnapshot,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create order payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreate {
    pub client_id: String,
    pub color_mode: ColorMode,
}
