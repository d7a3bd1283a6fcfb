//! Shared types for the CTP plate service
//!
//! Domain models used across the server and API clients: orders, clients,
//! plate types, stock movements and the event log.

pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};
