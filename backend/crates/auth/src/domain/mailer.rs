//! Mailer Trait
//!
//! Outbound email is behind a trait so signup logic does not depend on a
//! concrete delivery mechanism.

use thiserror::Error;

use crate::domain::value_object::{Email, Username};

/// Mail delivery errors
#[derive(Debug, Clone, Error)]
pub enum MailerError {
    /// Delivery failed
    #[error("Mail delivery failed: {0}")]
    Delivery(String),
}

/// Outbound mailer trait
#[trait_variant::make(Mailer: Send)]
pub trait LocalMailer {
    /// Send the email-verification message for a fresh signup
    ///
    /// `verification_secret` is the raw secret; the store only ever holds
    /// its hash.
    async fn send_verification(
        &self,
        email: &Email,
        username: &Username,
        verification_secret: &str,
    ) -> Result<(), MailerError>;
}
