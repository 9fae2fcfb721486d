//! Interaction session store.
//!
//! A [`Session`] holds, for one user, the outcome of every on-demand
//! generation keyed by [`SlotKey`]. Rendering is a pure read through
//! [`Session::get`]; only explicit user actions move a slot through
//! `unrequested -> pending -> ready | failed`.
//!
//! A session is driven by one user's events, one at a time, so the store
//! itself is plain `&mut self` state. Overlapping requests for the same slot
//! are resolved by [`RequestTicket`]: the last `begin_request` wins and a
//! late completion for an older ticket is dropped.

mod registry;

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use uuid::Uuid;

pub use registry::SessionRegistry;

use crate::error::InvalidStateError;
use crate::models::*;

/// One user's slot state.
#[derive(Debug, Clone)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    slots: HashMap<SlotKey, GeneratedItem>,
}

impl Session {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            created_at: now,
            last_seen: now,
            slots: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            created_at: self.created_at,
            last_seen: self.last_seen,
        }
    }

    pub(crate) fn touch(&mut self) {
        self.last_seen = Utc::now();
    }

    pub(crate) fn last_seen(&self) -> DateTime<Utc> {
        self.last_seen
    }

    /// Current item for `key`, or an `unrequested` item if the slot was never
    /// written. Never fails and never changes the store.
    pub fn get(&self, key: &SlotKey) -> GeneratedItem {
        self.slots.get(key).cloned().unwrap_or_default()
    }

    /// Every written slot, ordered by key.
    pub fn slots(&self) -> Vec<SlotEntry> {
        let mut entries: Vec<SlotEntry> = self
            .slots
            .iter()
            .map(|(key, item)| SlotEntry {
                key: key.clone(),
                item: item.clone(),
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }

    /// Start a new request for `key`, replacing whatever the slot held.
    ///
    /// The returned ticket must accompany the matching `complete_request` or
    /// `fail_request`.
    pub fn begin_request(&mut self, key: SlotKey, prompt: impl Into<Prompt>) -> RequestTicket {
        let (item, ticket) = GeneratedItem::pending(prompt.into());
        tracing::debug!(slot = %key, %ticket, "generation request started");
        self.slots.insert(key, item);
        ticket
    }

    /// Store `content` for the request identified by `ticket`.
    ///
    /// Returns `false` and leaves the slot untouched when the slot is no
    /// longer waiting on that ticket (it was re-requested or cleared).
    pub fn complete_request(
        &mut self,
        key: &SlotKey,
        ticket: RequestTicket,
        content: impl Into<String>,
    ) -> bool {
        let settled = self.slots.get_mut(key).is_some_and(|item| {
            item.settle(
                ticket,
                ItemState::Ready {
                    content: content.into(),
                },
            )
        });
        if !settled {
            tracing::debug!(slot = %key, %ticket, "discarding stale completion");
        }
        settled
    }

    /// Mark the request identified by `ticket` as failed with a reason the
    /// user can read. Stale tickets are ignored, as for `complete_request`.
    pub fn fail_request(
        &mut self,
        key: &SlotKey,
        ticket: RequestTicket,
        reason: impl Into<String>,
    ) -> bool {
        let reason = reason.into();
        let settled = self.slots.get_mut(key).is_some_and(|item| {
            item.settle(
                ticket,
                ItemState::Failed {
                    reason: reason.clone(),
                },
            )
        });
        if settled {
            tracing::info!(slot = %key, %reason, "generation request failed");
        } else {
            tracing::debug!(slot = %key, %ticket, "discarding stale failure");
        }
        settled
    }

    /// Record the user's reaction to the slot's content.
    ///
    /// Requires the slot to be `ready`; any earlier evaluation is dropped
    /// since it judged a different response. On error the slot is unchanged.
    pub fn record_user_response(
        &mut self,
        key: &SlotKey,
        text: impl Into<String>,
    ) -> Result<(), InvalidStateError> {
        let text = text.into();
        let item = self.ready_item_mut(key)?;
        if text.trim().is_empty() {
            return Err(InvalidStateError::EmptyResponse { key: key.clone() });
        }
        item.user_response = Some(text);
        item.evaluation = None;
        Ok(())
    }

    /// Start evaluating the recorded user response.
    pub fn begin_evaluation(
        &mut self,
        key: &SlotKey,
        prompt: impl Into<Prompt>,
    ) -> Result<RequestTicket, InvalidStateError> {
        let item = self.ready_item_mut(key)?;
        if item
            .user_response
            .as_deref()
            .map_or(true, |text| text.trim().is_empty())
        {
            return Err(InvalidStateError::NoUserResponse { key: key.clone() });
        }

        let (evaluation, ticket) = GeneratedItem::pending(prompt.into());
        item.evaluation = Some(Box::new(evaluation));
        tracing::debug!(slot = %key, %ticket, "evaluation request started");
        Ok(ticket)
    }

    /// Store the evaluation for `ticket`. Stale tickets are ignored.
    pub fn complete_evaluation(
        &mut self,
        key: &SlotKey,
        ticket: RequestTicket,
        content: impl Into<String>,
    ) -> bool {
        self.evaluation_mut(key).is_some_and(|evaluation| {
            evaluation.settle(
                ticket,
                ItemState::Ready {
                    content: content.into(),
                },
            )
        })
    }

    /// Mark the evaluation for `ticket` as failed. Stale tickets are ignored.
    pub fn fail_evaluation(
        &mut self,
        key: &SlotKey,
        ticket: RequestTicket,
        reason: impl Into<String>,
    ) -> bool {
        self.evaluation_mut(key).is_some_and(|evaluation| {
            evaluation.settle(
                ticket,
                ItemState::Failed {
                    reason: reason.into(),
                },
            )
        })
    }

    /// Reset `key` to `unrequested`, discarding content, response and evaluation.
    pub fn clear(&mut self, key: &SlotKey) {
        if self.slots.remove(key).is_some() {
            tracing::debug!(slot = %key, "slot cleared");
        }
    }

    /// Reset every slot belonging to `module`.
    pub fn clear_module(&mut self, module: &str) {
        self.slots.retain(|key, _| key.module != module);
    }

    fn ready_item_mut(&mut self, key: &SlotKey) -> Result<&mut GeneratedItem, InvalidStateError> {
        match self.slots.get_mut(key) {
            Some(item) if item.status() == ItemStatus::Ready => Ok(item),
            other => Err(InvalidStateError::NotReady {
                key: key.clone(),
                status: other.map_or(ItemStatus::Unrequested, |item| item.status()),
            }),
        }
    }

    fn evaluation_mut(&mut self, key: &SlotKey) -> Option<&mut GeneratedItem> {
        self.slots
            .get_mut(key)
            .and_then(|item| item.evaluation.as_deref_mut())
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}
