//! Admin Use Cases
//!
//! User administration: listing accounts, changing roles, deleting accounts.
//! Admins cannot demote or delete themselves, so the last admin cannot lock
//! everyone out by accident.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::entity::Identity;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::domain::value_object::{Role, UserId};
use crate::error::{AuthError, AuthResult};

/// Admin use case bundle
pub struct AdminUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    credentials: Arc<C>,
    sessions: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<C, S> AdminUseCase<C, S>
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

    /// List all identities
    pub async fn list_users(&self) -> AuthResult<Vec<Identity>> {
        self.credentials.list_all().await
    }

    /// Change a user's role
    pub async fn change_role(
        &self,
        actor_id: &UserId,
        target_id: &UserId,
        role: Role,
    ) -> AuthResult<Identity> {
        if actor_id == target_id && role != Role::Admin {
            return Err(AuthError::Validation(
                "Admins cannot demote themselves".to_string(),
            ));
        }

        let mut target = self
            .credentials
            .find_by_id(target_id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        target.change_role(role, self.clock.now());
        self.credentials.update(&target).await?;

        tracing::info!(
            actor_id = %actor_id,
            target_id = %target_id,
            role = %role,
            "Role changed"
        );

        Ok(target)
    }

    /// Delete a user and revoke all their sessions
    pub async fn delete_user(&self, actor_id: &UserId, target_id: &UserId) -> AuthResult<()> {
        if actor_id == target_id {
            return Err(AuthError::Validation(
                "Admins cannot delete their own account".to_string(),
            ));
        }

        let target = self
            .credentials
            .find_by_id(target_id)
            .await?
            .ok_or(AuthError::IdentityNotFound)?;

        // Revoke first so no session survives the account
        self.sessions
            .invalidate_all_for_user(target_id, None)
            .await?;
        self.credentials.delete(target_id).await?;

        tracing::info!(
            actor_id = %actor_id,
            target_id = %target.id,
            "User deleted"
        );

        Ok(())
    }
}
