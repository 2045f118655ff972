//! Session Entity
//!
//! A server-side session row. The bearer token maps to exactly one row;
//! invalidation flips `is_active` instead of deleting, so revoked sessions
//! stay auditable until the expiry sweep removes them.

use chrono::{DateTime, Duration, Utc};
use platform::client::ClientInfo;
use uuid::Uuid;

use crate::domain::value_object::UserId;

/// Server-side session entity
#[derive(Debug, Clone)]
pub struct Session {
    /// Session ID (primary key)
    pub id: Uuid,
    /// Owning identity
    pub identity_id: UserId,
    /// Signed bearer token bound to this session
    pub token: String,
    /// Client IP at creation time
    pub ip: Option<String>,
    /// Client User-Agent at creation time
    pub user_agent: Option<String>,
    /// False once revoked (logout, logout-all, admin delete)
    pub is_active: bool,
    /// Hard expiry
    pub expires_at: DateTime<Utc>,
    /// Last time this session authenticated a request
    pub last_seen_at: DateTime<Utc>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// Create a new active session
    ///
    /// The id is supplied by the caller so it can be embedded in the
    /// bearer token before the session row exists.
    pub fn new(
        id: Uuid,
        identity_id: UserId,
        token: String,
        client: &ClientInfo,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            identity_id,
            token,
            ip: client.ip_string(),
            user_agent: client.user_agent.clone(),
            is_active: true,
            expires_at: now + ttl,
            last_seen_at: now,
            created_at: now,
        }
    }

    /// Check if the session is past its hard expiry
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Check if the session currently grants access
    pub fn is_live(&self, now: DateTime<Utc>) -> bool {
        self.is_active && !self.is_expired(now)
    }

    /// Revoke the session (idempotent)
    pub fn invalidate(&mut self) {
        self.is_active = false;
    }
}
