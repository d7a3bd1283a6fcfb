//! Data models
//!
//! Shared between plate-server and frontend (via API).
//! All IDs are opaque strings (UUID v4), timestamps are Unix milliseconds.

pub mod client;
pub mod event;
pub mod order;
pub mod plate;

// Re-exports
pub use client::*;
pub use event::*;
pub use order::*;
pub use plate::*;
