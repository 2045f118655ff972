//! Sign Up Use Case
//!
//! Creates an unverified identity and dispatches the verification email.

use std::sync::Arc;

use platform::clock::Clock;
use platform::crypto;
use platform::password::ClearTextPassword;

use crate::application::config::AuthConfig;
use crate::domain::entity::Identity;
use crate::domain::mailer::Mailer;
use crate::domain::repository::CredentialStore;
use crate::domain::value_object::{Email, UserId, Username};
use crate::error::{AuthError, AuthResult};

/// Sign up input
pub struct SignUpInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_id: UserId,
    pub email: Email,
}

/// Sign up use case
pub struct SignUpUseCase<C, M>
where
    C: CredentialStore,
    M: Mailer,
{
    credentials: Arc<C>,
    mailer: Arc<M>,
    config: Arc<AuthConfig>,
    clock: Arc<dyn Clock>,
}

impl<C, M> SignUpUseCase<C, M>
where
    C: CredentialStore,
    M: Mailer,
{
    pub fn new(
        credentials: Arc<C>,
        mailer: Arc<M>,
        config: Arc<AuthConfig>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            credentials,
            mailer,
            config,
            clock,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let username = Username::new(input.username)?;
        let email = Email::new(input.email)?;
        let password = ClearTextPassword::new(input.password)?;

        // Duplicate checks up front; the unique indexes still back this up
        // against races.
        if self.credentials.exists_by_username(&username).await? {
            return Err(AuthError::DuplicateIdentity);
        }
        if self.credentials.exists_by_email(&email).await? {
            return Err(AuthError::DuplicateIdentity);
        }

        let password_hash = password.hash()?;

        let now = self.clock.now();

        // The raw secret goes into the mail; only its hash is stored, so a
        // leaked database cannot verify accounts.
        let verification_secret = crypto::to_base64_url(&crypto::random_bytes(32));
        let secret_hash = crypto::to_base64_url(&crypto::sha256(verification_secret.as_bytes()));

        let identity = Identity::new(
            username,
            email,
            password_hash,
            secret_hash,
            now + self.config.verification_ttl,
            now,
        );

        self.credentials.create(&identity).await?;

        // The account is useless without the verification link, so a mailer
        // failure rolls the signup back.
        if let Err(e) = self
            .mailer
            .send_verification(&identity.email, &identity.username, &verification_secret)
            .await
        {
            tracing::error!(error = %e, user_id = %identity.id, "Rolling back signup, verification mail failed");
            if let Err(del) = self.credentials.delete(&identity.id).await {
                tracing::error!(error = %del, user_id = %identity.id, "Signup rollback failed");
            }
            return Err(AuthError::MailerUnavailable);
        }

        tracing::info!(
            user_id = %identity.id,
            username = %identity.username,
            "New identity registered, verification pending"
        );

        Ok(SignUpOutput {
            user_id: identity.id,
            email: identity.email,
        })
    }
}
