//! Mailer Implementations

use crate::domain::mailer::{Mailer, MailerError};
use crate::domain::value_object::{Email, Username};

/// Mailer that logs instead of delivering
///
/// Stands in until a real delivery backend is wired up; the verification
/// link lands in the server log.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send_verification(
        &self,
        email: &Email,
        username: &Username,
        verification_secret: &str,
    ) -> Result<(), MailerError> {
        tracing::info!(
            email = %email,
            username = %username,
            secret = %verification_secret,
            "Verification email (log delivery)"
        );
        Ok(())
    }
}
