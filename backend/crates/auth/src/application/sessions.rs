//! Session Management Use Cases
//!
//! Listing a user's live sessions and revoking a single one by ID.

use std::sync::Arc;

use platform::clock::Clock;
use uuid::Uuid;

use crate::domain::entity::Session;
use crate::domain::repository::SessionStore;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// List sessions use case
pub struct ListSessionsUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S> ListSessionsUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { sessions, clock }
    }

    /// List the user's live sessions, newest first
    pub async fn execute(&self, identity_id: &UserId) -> AuthResult<Vec<Session>> {
        self.sessions
            .list_active_for_user(identity_id, self.clock.now())
            .await
    }
}

/// Revoke a single session by ID
pub struct RevokeSessionUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
}

impl<S> RevokeSessionUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Revoke the given session if it belongs to the caller
    ///
    /// A session owned by someone else reads as not found, so session IDs
    /// cannot be probed across accounts.
    pub async fn execute(&self, identity_id: &UserId, session_id: Uuid) -> AuthResult<()> {
        let session = self
            .sessions
            .find_by_id(session_id)
            .await?
            .ok_or(AuthError::SessionNotFound)?;

        if session.identity_id != *identity_id {
            return Err(AuthError::SessionNotFound);
        }

        self.sessions.invalidate_by_id(session_id).await?;

        tracing::info!(user_id = %identity_id, session_id = %session_id, "Session revoked");
        Ok(())
    }
}
