//! Error taxonomy shared by the session store and the external clients.
//!
//! Two kinds of failure exist and neither crosses a session boundary:
//!
//! - [`ExternalServiceError`]: the generation service or the advisory feed
//!   failed. Handlers record it on the slot as `failed` and the user retries.
//! - [`InvalidStateError`]: the caller asked the store for a transition the
//!   slot cannot make (e.g. responding to content that does not exist yet).

use thiserror::Error;

use crate::models::{ItemStatus, SlotKey};

/// A failed call to the generation service or the advisory feed.
#[derive(Debug, Error)]
pub enum ExternalServiceError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("request timed out")]
    Timeout,

    #[error("rate limit or quota exceeded: {0}")]
    RateLimited(String),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl ExternalServiceError {
    /// Convert a transport error, singling out timeouts.
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Http(e)
        }
    }
}

/// A store transition requested from a slot in the wrong state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidStateError {
    #[error("slot {key} has no generated content to respond to (status: {status})")]
    NotReady { key: SlotKey, status: ItemStatus },

    #[error("slot {key} has no user response to evaluate")]
    NoUserResponse { key: SlotKey },

    #[error("a response for slot {key} cannot be blank")]
    EmptyResponse { key: SlotKey },
}
