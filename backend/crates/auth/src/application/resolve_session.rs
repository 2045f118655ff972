//! Resolve Session Use Case
//!
//! Turns a bearer token into an authenticated context: signature check,
//! live session lookup, then identity load. Used by the request guard.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::entity::{Identity, Session};
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::error::{AuthError, AuthResult};
use crate::token::TokenCodec;

/// Authenticated request context
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub identity: Identity,
    pub session: Session,
}

/// Resolve session use case
pub struct ResolveSessionUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    credentials: Arc<C>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    clock: Arc<dyn Clock>,
}

impl<C, S> ResolveSessionUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    pub fn new(
        credentials: Arc<C>,
        sessions: Arc<S>,
        codec: Arc<TokenCodec>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            codec,
            clock,
        }
    }

    pub async fn execute(&self, token: &str) -> AuthResult<AuthContext> {
        let now = self.clock.now();

        // Signature first; a forged token never reaches the store
        let claims = self
            .codec
            .verify(token, now)
            .map_err(|_| AuthError::SessionInvalid)?;

        // A valid signature is not enough: the session row must still be
        // live. Revoked and expired rows read as no session at all.
        let session = self
            .sessions
            .find_active_by_token(token, now)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if session.identity_id.into_uuid() != claims.sub {
            tracing::warn!(session_id = %session.id, "Token subject does not match session owner");
            return Err(AuthError::SessionInvalid);
        }
        if session.id != claims.jti {
            tracing::warn!(session_id = %session.id, "Token session id does not match session row");
            return Err(AuthError::SessionInvalid);
        }

        let identity = self
            .credentials
            .find_by_id(&session.identity_id)
            .await?
            .ok_or(AuthError::SessionInvalid)?;

        if !identity.is_active {
            return Err(AuthError::AccountDeactivated);
        }

        Ok(AuthContext { identity, session })
    }
}
