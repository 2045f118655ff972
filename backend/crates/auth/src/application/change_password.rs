//! Change Password Use Case
//!
//! Rotates the password and revokes every other session. The caller's own
//! session stays live; their token keeps working because access is gated by
//! the session row, not by anything password-derived in the token.

use std::sync::Arc;

use platform::clock::Clock;
use platform::password::ClearTextPassword;
use uuid::Uuid;

use crate::domain::repository::{CredentialStore, SessionStore};
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Change password input
pub struct ChangePasswordInput {
    pub current_password: String,
    pub new_password: String,
}

/// Change password output
#[derive(Debug)]
pub struct ChangePasswordOutput {
    /// Other sessions revoked by the rotation
    pub revoked_sessions: u64,
}

/// Change password use case
pub struct ChangePasswordUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    credentials: Arc<C>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<C, S> ChangePasswordUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    pub fn new(credentials: Arc<C>, sessions: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            credentials,
            sessions,
            clock,
        }
    }

    pub async fn execute(
        &self,
        identity_id: &UserId,
        current_session_id: Uuid,
        input: ChangePasswordInput,
    ) -> AuthResult<ChangePasswordOutput> {
        let mut identity = self
            .credentials
            .find_by_id(identity_id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        // Reauthenticate before anything else
        let candidate = ClearTextPassword::new_unchecked(input.current_password);
        if !identity.password_hash.verify(&candidate) {
            return Err(AuthError::InvalidCredentials);
        }

        let new_password = ClearTextPassword::new(input.new_password)?;
        let new_hash = new_password.hash()?;

        let now = self.clock.now();
        identity.update_password(new_hash, now);
        self.credentials.update(&identity).await?;

        // Kick every other device; the caller keeps their session
        let revoked = self
            .sessions
            .invalidate_all_for_user(identity_id, Some(current_session_id))
            .await?;

        tracing::info!(
            user_id = %identity_id,
            revoked_sessions = revoked,
            "Password changed"
        );

        Ok(ChangePasswordOutput {
            revoked_sessions: revoked,
        })
    }
}
