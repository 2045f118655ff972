//! Sign Out Use Cases
//!
//! Session revocation: the current session, or every session for a user.
//! Both are idempotent; revoking an already-revoked session is a no-op.

use std::sync::Arc;

use crate::domain::repository::SessionStore;
use crate::domain::value_object::UserId;
use crate::error::AuthResult;

/// Sign out use case (current session)
pub struct SignOutUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Revoke the session holding this token
    pub async fn execute(&self, token: &str) -> AuthResult<()> {
        let revoked = self.sessions.invalidate_by_token(token).await?;
        if revoked {
            tracing::info!("Session revoked on sign out");
        }
        Ok(())
    }
}

/// Sign out everywhere use case
pub struct SignOutAllUseCase<S>
where
    S: SessionStore,
{
    sessions: Arc<S>,
}

impl<S> SignOutAllUseCase<S>
where
    S: SessionStore,
{
    pub fn new(sessions: Arc<S>) -> Self {
        Self { sessions }
    }

    /// Revoke every session for the user, the caller's included
    ///
    /// Returns the number of sessions revoked.
    pub async fn execute(&self, identity_id: &UserId) -> AuthResult<u64> {
        let revoked = self
            .sessions
            .invalidate_all_for_user(identity_id, None)
            .await?;

        tracing::info!(user_id = %identity_id, revoked, "Signed out everywhere");
        Ok(revoked)
    }
}
