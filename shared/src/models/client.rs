//! Client Model

use serde::{Deserialize, Serialize};

/// Client entity (客户档案)
///
/// `tech_notes` is an ordered list of free-text technological requirements.
/// Editing it never touches existing orders: the notes are copied into an
/// order's snapshot at creation time and frozen there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub tech_notes: Vec<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create client payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientCreate {
    pub name: String,
    #[serde(default)]
    pub tech_notes: Vec<String>,
}

/// Update client payload (tech-notes screen)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientUpdate {
    pub name: Option<String>,
    pub tech_notes: Option<Vec<String>>,
}
