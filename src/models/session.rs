use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{GeneratedItem, SlotKey};

/// Identity and timestamps of one user's browser session.
///
/// Sessions are **ephemeral**: they live in memory only and disappear when the
/// user ends them or when they sit idle past the configured timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionInfo {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// A written slot and its current item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlotEntry {
    #[serde(flatten)]
    pub key: SlotKey,
    pub item: GeneratedItem,
}

/// Everything a session currently holds, for redisplay after navigation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub session: SessionInfo,
    pub slots: Vec<SlotEntry>,
}

/// Input for recording a user's reaction to generated content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponseInput {
    pub text: String,
}
