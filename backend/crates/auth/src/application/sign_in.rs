//! Sign In Use Case
//!
//! Authenticates a user and creates a session with a signed bearer token.

use std::sync::Arc;

use platform::client::ClientInfo;
use platform::clock::Clock;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::{Identity, Session};
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::domain::value_object::{Email, Username};
use crate::error::{AuthError, AuthResult};
use crate::token::TokenCodec;

/// Sign in input
pub struct SignInInput {
    /// Username or email
    pub identifier: String,
    /// Password
    pub password: String,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    /// Signed bearer token for the new session
    pub token: String,
    /// Session ID
    pub session_id: uuid::Uuid,
    /// Authenticated identity
    pub identity: Identity,
}

/// Sign in use case
pub struct SignInUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    credentials: Arc<C>,
    sessions: Arc<S>,
    codec: Arc<TokenCodec>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl<C, S> SignInUseCase<C, S>
where
    C: CredentialStore,
    S: SessionStore,
{
    pub fn new(
        credentials: Arc<C>,
        sessions: Arc<S>,
        codec: Arc<TokenCodec>,
        config: Arc<AuthConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            sessions,
            codec,
            config,
            clock,
        }
    }

    pub async fn execute(&self, input: SignInInput, client: ClientInfo) -> AuthResult<SignInOutput> {
        let identity = self
            .find_by_identifier(&input.identifier)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;

        let now = self.clock.now();

        // Account-state checks come before the password so the response for
        // an unusable account never depends on the password's correctness.
        if !identity.email_verified {
            return Err(AuthError::EmailNotVerified);
        }
        if !identity.is_active {
            return Err(AuthError::AccountDeactivated);
        }
        if identity.is_locked(now) {
            return Err(AuthError::AccountLocked {
                retry_after_secs: identity.lock_remaining_secs(now),
            });
        }

        let candidate = ClearTextPassword::new_unchecked(input.password);
        if !identity.password_hash.verify(&candidate) {
            // Atomic store-level increment; concurrent failures all count.
            // Even the failure that crosses the threshold reads as bad
            // credentials; the lock is enforced from the next attempt on.
            let state = self
                .credentials
                .record_login_failure(
                    &identity.id,
                    now,
                    self.config.max_login_failures,
                    self.config.lockout,
                )
                .await?;

            if state.locked_until.is_some_and(|until| now < until) {
                tracing::warn!(
                    user_id = %identity.id,
                    failed_count = state.failed_count,
                    "Account locked after repeated login failures"
                );
            }
            return Err(AuthError::InvalidCredentials);
        }

        let mut identity = identity;
        identity.reset_failures(now);
        identity.record_login(now);
        self.credentials.update(&identity).await?;

        // The session id goes into the token as `jti`, so every login gets
        // a distinct token even within the same second.
        let session_id = uuid::Uuid::new_v4();
        let token = self
            .codec
            .sign(identity.id.into_uuid(), session_id, now)
            .map_err(|e| AuthError::Internal(e.to_string()))?;

        let session = Session::new(
            session_id,
            identity.id,
            token.clone(),
            &client,
            self.config.session_ttl,
            now,
        );
        self.sessions.create(&session).await?;

        tracing::info!(
            user_id = %identity.id,
            session_id = %session.id,
            "User signed in"
        );

        Ok(SignInOutput {
            token,
            session_id: session.id,
            identity,
        })
    }

    /// Look the identity up by email when the identifier contains `@`,
    /// otherwise by username
    async fn find_by_identifier(&self, identifier: &str) -> AuthResult<Option<Identity>> {
        if identifier.contains('@') {
            let Ok(email) = Email::new(identifier) else {
                return Ok(None);
            };
            self.credentials.find_by_email(&email).await
        } else {
            let Ok(username) = Username::new(identifier) else {
                return Ok(None);
            };
            self.credentials.find_by_username(&username).await
        }
    }
}
