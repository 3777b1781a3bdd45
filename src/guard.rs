//! Single-flight admission for named asynchronous operations.
//!
//! An [`OperationGuard`] is a set of busy keys behind one lock, so the
//! check and the mark happen as a single step. Clones share the same set:
//! keep one guard per entity for per-instance operations and the client's
//! guard for process-wide ones.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::errors::{Result, SgaError};

#[derive(Debug, Clone, Default)]
pub struct OperationGuard {
    busy: Arc<Mutex<HashSet<String>>>,
}

impl OperationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    fn keys(&self) -> MutexGuard<'_, HashSet<String>> {
        // The set stays consistent even if a holder panicked mid-insert.
        self.busy.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Marks `key` busy and returns `true`, or returns `false` if it already is.
    pub fn try_acquire(&self, key: &str) -> bool {
        self.keys().insert(key.to_string())
    }

    pub fn release(&self, key: &str) {
        if !self.keys().remove(key) {
            tracing::warn!("Released operation '{}' that was not in flight", key);
        }
    }

    pub fn is_busy(&self, key: &str) -> bool {
        self.keys().contains(key)
    }

    pub fn in_flight(&self) -> usize {
        self.keys().len()
    }

    /// Scoped form of [`try_acquire`](Self::try_acquire): the key is released
    /// when the returned permit drops, on every exit path.
    pub fn acquire(&self, key: impl Into<String>) -> Result<OperationPermit> {
        let key = key.into();
        if self.try_acquire(&key) {
            Ok(OperationPermit {
                guard: self.clone(),
                key,
            })
        } else {
            tracing::warn!("Operation '{}' already in progress", key);
            Err(SgaError::AlreadyInProgress(key))
        }
    }
}

#[derive(Debug)]
#[must_use = "the operation is released as soon as the permit is dropped"]
pub struct OperationPermit {
    guard: OperationGuard,
    key: String,
}

impl OperationPermit {
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for OperationPermit {
    fn drop(&mut self) {
        self.guard.release(&self.key);
    }
}

/// Operation keys used across the SDK.
pub mod keys {
    pub const MATCH_SCORE: &str = "match.score";
    pub const MATCH_GET_SCORE: &str = "match.get_score";
    pub const MATCH_SYNC_ROUNDS: &str = "match.sync_rounds";
    pub const MATCH_SAVE: &str = "match.save";
    pub const MATCH_END: &str = "match.end";
    pub const MATCH_DUPLICATE: &str = "match.duplicate";
    pub const MATCH_DELETE: &str = "match.delete";
    pub const MATCH_QUICK_MATCH: &str = "match.quick_match";
    pub const MATCH_LOAD: &str = "match.load";
    pub const MATCH_LOAD_ONGOING: &str = "match.load_ongoing";
    pub const MATCH_LOAD_ONE: &str = "match.load_one";
    pub const ACTIVITY_LOAD: &str = "activity.load";
    pub const ROLE_LOAD: &str = "role.load";
    pub const GOAL_CREATE: &str = "goal.create";
    pub const GOAL_LOAD: &str = "goal.load";
    pub const ACTOR_GOAL_CREATE: &str = "actor_goal.create";
    pub const ACTOR_GOAL_LOAD: &str = "actor_goal.load";
    pub const SESSION_AUTHENTICATE: &str = "session.authenticate";
    pub const CONTACT_LOAD: &str = "contact.load";
    pub const CONTACT_ADD: &str = "contact.add";
    pub const CONTACT_REMOVE: &str = "contact.remove";
    pub const USER_LOAD: &str = "user.load";
    pub const USER_SEARCH: &str = "user.search";
    pub const USER_RANDOM: &str = "user.random";
    pub const USER_EXISTS: &str = "user.exists";
    pub const ACTION_PUSH: &str = "action.push";
}
