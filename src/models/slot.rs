use std::fmt;

use serde::{Deserialize, Serialize};

/// Location of one piece of generatable content within a session:
/// a training module plus the sub-task inside it.
///
/// Keys are unique per session; writing to a key replaces whatever the slot
/// held before.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SlotKey {
    pub module: String,
    pub slot: String,
}

impl SlotKey {
    pub fn new(module: impl Into<String>, slot: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            slot: slot.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.module, self.slot)
    }
}
