//! Snapshot: authoritative state for rebuilding a failed session

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Text both replicas restart from after a fatal protocol error
///
/// The session id names the new session so logs from both sides can be
/// correlated; it is regenerated for every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub session_id: Uuid,
    pub text: String,
}

impl Snapshot {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            text: text.into(),
        }
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
