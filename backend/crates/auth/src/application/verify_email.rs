//! Verify Email Use Case
//!
//! Consumes a verification token and activates the account.

use std::sync::Arc;

use platform::clock::Clock;

use crate::domain::repository::CredentialStore;
use crate::domain::value_object::UserId;
use crate::error::{AuthError, AuthResult};

/// Verify email output
#[derive(Debug)]
pub struct VerifyEmailOutput {
    pub user_id: UserId,
}

/// Verify email use case
pub struct VerifyEmailUseCase<C>
where
    C: CredentialStore,
{
    credentials: Arc<C>,
    clock: Arc<dyn Clock>,
}

impl<C> VerifyEmailUseCase<C>
where
    C: CredentialStore,
{
    pub fn new(credentials: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self { credentials, clock }
    }

    pub async fn execute(&self, raw_secret: &str) -> AuthResult<VerifyEmailOutput> {
        let secret_hash =
            platform::crypto::to_base64_url(&platform::crypto::sha256(raw_secret.as_bytes()));

        // Unknown and expired secrets are indistinguishable to the caller
        let mut identity = self
            .credentials
            .find_by_verification_hash(&secret_hash)
            .await?
            .ok_or(AuthError::InvalidVerificationToken)?;

        let now = self.clock.now();
        if !identity.verification_pending(now) {
            return Err(AuthError::InvalidVerificationToken);
        }

        identity.mark_verified(now);
        self.credentials.update(&identity).await?;

        tracing::info!(user_id = %identity.id, "Email verified");

        Ok(VerifyEmailOutput {
            user_id: identity.id,
        })
    }
}
