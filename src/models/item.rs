use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The text sent to the generation service for one request.
///
/// Owned by the item that requested it and never edited afterwards; a new
/// request for the slot brings a new prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Prompt {
    /// Instructions that frame the model's role and output format.
    #[serde(default)]
    pub system: String,
    /// The request itself.
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }

    /// A prompt with no system instructions.
    pub fn user(user: impl Into<String>) -> Self {
        Self::new(String::new(), user)
    }
}

impl From<&str> for Prompt {
    fn from(user: &str) -> Self {
        Self::user(user)
    }
}

impl From<String> for Prompt {
    fn from(user: String) -> Self {
        Self::user(user)
    }
}

/// Identity of one in-flight generation request.
///
/// Issued by `begin_request`; a completion or failure only lands if it
/// carries the ticket of the request the slot is still waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestTicket(Uuid);

impl RequestTicket {
    pub(crate) fn issue() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn id(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for RequestTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Where a slot is in its request lifecycle.
///
/// Content only exists in the `Ready` variant and a failure reason only in
/// `Failed`, so an item can never show content while pending or failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ItemState {
    #[default]
    Unrequested,
    Pending {
        request_id: RequestTicket,
    },
    Ready {
        content: String,
    },
    Failed {
        reason: String,
    },
}

/// The status of a slot without its payload.
///
/// - `Unrequested`: nothing generated yet (or the slot was cleared)
/// - `Pending`: a request is outstanding
/// - `Ready`: content is available
/// - `Failed`: the last request failed; the user may retry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Unrequested,
    Pending,
    Ready,
    Failed,
}

impl ItemStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unrequested => "unrequested",
            Self::Pending => "pending",
            Self::Ready => "ready",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One piece of AI-produced content and what the user did with it.
///
/// An evaluation is itself a `GeneratedItem`: the user's response sent back
/// through the generation service for critique. It only exists once a
/// non-empty `user_response` has been recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GeneratedItem {
    pub prompt: Option<Prompt>,
    #[serde(flatten)]
    pub state: ItemState,
    pub user_response: Option<String>,
    pub evaluation: Option<Box<GeneratedItem>>,
}

impl GeneratedItem {
    /// A fresh item waiting on `prompt`, along with the ticket that resolves it.
    pub(crate) fn pending(prompt: Prompt) -> (Self, RequestTicket) {
        let ticket = RequestTicket::issue();
        let item = Self {
            prompt: Some(prompt),
            state: ItemState::Pending { request_id: ticket },
            user_response: None,
            evaluation: None,
        };
        (item, ticket)
    }

    pub fn status(&self) -> ItemStatus {
        match self.state {
            ItemState::Unrequested => ItemStatus::Unrequested,
            ItemState::Pending { .. } => ItemStatus::Pending,
            ItemState::Ready { .. } => ItemStatus::Ready,
            ItemState::Failed { .. } => ItemStatus::Failed,
        }
    }

    pub fn content(&self) -> Option<&str> {
        match &self.state {
            ItemState::Ready { content } => Some(content),
            _ => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.state {
            ItemState::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    /// The ticket this item is waiting on, if a request is outstanding.
    pub fn pending_ticket(&self) -> Option<RequestTicket> {
        match self.state {
            ItemState::Pending { request_id } => Some(request_id),
            _ => None,
        }
    }

    /// Settle the outstanding request. Returns `false` without touching the
    /// item when `ticket` is not the one it is waiting on.
    pub(crate) fn settle(&mut self, ticket: RequestTicket, outcome: ItemState) -> bool {
        if self.pending_ticket() != Some(ticket) {
            return false;
        }
        self.state = outcome;
        true
    }
}
