//! Versioned configuration entries, one record per key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Setting {
    pub key: String,
    pub value: serde_json::Value,
    /// Starts at 1 and increases by one on every successful write.
    pub revision: u64,
    pub updated_by: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PutSetting {
    pub key: String,
    pub value: serde_json::Value,
    /// `None` creates the key; `Some(r)` replaces it only if the stored
    /// revision is still `r`.
    pub expected_revision: Option<u64>,
    pub updated_by: Option<Uuid>,
}
