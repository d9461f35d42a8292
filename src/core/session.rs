//! Acting-user context for mutating operations
//!
//! Every write to the store is stamped with who made it and when. Both come
//! from a [`Session`] passed explicitly by the caller; the store never reads
//! them from process-wide state.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a row in the `users` relation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Who is acting, and the timestamp their changes are recorded at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub now: DateTime<Utc>,
}

impl Session {
    /// Session for `user_id` stamped with the current time
    pub fn new(user_id: UserId) -> Self {
        Self::at(user_id, Utc::now())
    }

    /// Session with a fixed clock
    pub fn at(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            // Stored as whole seconds
            now: now.trunc_subsecs(0),
        }
    }
}
