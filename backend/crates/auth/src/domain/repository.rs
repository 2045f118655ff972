//! Store Traits
//!
//! Interfaces for data persistence. Implementations are in the
//! infrastructure layer.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entity::{Identity, Session};
use crate::domain::value_object::{Email, UserId, Username};
use crate::error::AuthResult;

/// Result of an atomic login-failure record
///
/// Returned by [`CredentialStore::record_login_failure`] so the caller can
/// tell whether this failure crossed the lockout threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FailureState {
    /// Failure count after this attempt
    pub failed_count: i32,
    /// Lock deadline after this attempt, if any
    pub locked_until: Option<DateTime<Utc>>,
}

/// Credential store trait
#[trait_variant::make(CredentialStore: Send)]
pub trait LocalCredentialStore {
    /// Create a new identity
    async fn create(&self, identity: &Identity) -> AuthResult<()>;

    /// Find identity by ID
    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<Identity>>;

    /// Find identity by email
    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>>;

    /// Find identity by username
    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Identity>>;

    /// Find identity holding the given verification secret hash
    async fn find_by_verification_hash(&self, token_hash: &str) -> AuthResult<Option<Identity>>;

    /// Check if an email is already registered
    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool>;

    /// Check if a username is already registered
    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool>;

    /// Update an identity
    async fn update(&self, identity: &Identity) -> AuthResult<()>;

    /// Delete an identity
    async fn delete(&self, id: &UserId) -> AuthResult<()>;

    /// Record a failed login attempt atomically
    ///
    /// A single store-level operation: if a previous lock has expired the
    /// counter restarts at 1, otherwise it increments; crossing
    /// `max_failures` sets a new lock of `lockout` from `now`. Concurrent
    /// failures must not lose increments.
    async fn record_login_failure(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        max_failures: i32,
        lockout: Duration,
    ) -> AuthResult<FailureState>;

    /// List all identities (admin)
    async fn list_all(&self) -> AuthResult<Vec<Identity>>;
}

/// Session store trait
#[trait_variant::make(SessionStore: Send)]
pub trait LocalSessionStore {
    /// Create a new session
    async fn create(&self, session: &Session) -> AuthResult<()>;

    /// Find a live session by its bearer token
    ///
    /// Returns None for unknown, revoked or expired sessions.
    async fn find_active_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Session>>;

    /// Find a session by ID regardless of state
    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>>;

    /// List live sessions for a user, newest first
    async fn list_active_for_user(
        &self,
        identity_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Vec<Session>>;

    /// Revoke the session holding this token (idempotent)
    ///
    /// Returns whether a live session was actually revoked.
    async fn invalidate_by_token(&self, token: &str) -> AuthResult<bool>;

    /// Revoke a session by ID (idempotent)
    async fn invalidate_by_id(&self, session_id: Uuid) -> AuthResult<bool>;

    /// Revoke all sessions for a user, optionally sparing one
    ///
    /// Returns the number of sessions revoked.
    async fn invalidate_all_for_user(
        &self,
        identity_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64>;

    /// Update a session's last-seen time
    async fn touch(&self, session_id: Uuid, now: DateTime<Utc>) -> AuthResult<()>;

    /// Delete sessions past their hard expiry
    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}
