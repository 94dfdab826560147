use crate::time::{self, Timestamp};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named claim recorded as a document in the store.
///
/// At most one live document exists per `name` within a collection. The
/// `id` identifies this particular claim in logs; releasing only needs the
/// name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub id: Uuid,
    pub name: String,
    pub created_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Timestamp>,
}

impl Lease {
    pub fn new(name: impl Into<String>, created_at: Timestamp, expires_at: Option<Timestamp>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            created_at,
            expires_at,
        }
    }

    /// Whether `expires_at` has passed.
    ///
    /// An expired lease still blocks acquisition until the store reaps it.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        self.expires_at.is_some_and(|expires_at| expires_at <= now)
    }

    /// `None` for leases without expiry.
    pub fn time_remaining(&self, now: Timestamp) -> Option<Duration> {
        self.expires_at.map(|expires_at| time::remaining(expires_at, now))
    }
}
