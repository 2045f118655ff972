//! Email Value Object
//!
//! Represents a syntactically valid email address, lowercased for
//! case-insensitive lookups. Actual ownership is proven via the
//! verification link, not here.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuthError;

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    ///
    /// Input is trimmed and lowercased before validation.
    pub fn new(email: impl Into<String>) -> Result<Self, AuthError> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AuthError::Validation("Email cannot be empty".to_string()));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AuthError::Validation("Invalid email format".to_string()));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Exactly one @, non-empty local part
        let Some((local, domain)) = email.split_once('@') else {
            return false;
        };
        if local.is_empty() || local.len() > 64 || domain.contains('@') {
            return false;
        }

        // Domain needs at least one dot and a 2+ character TLD
        let Some((_, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        if tld.len() < 2 {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // No leading/trailing separators in the domain
        !(domain.starts_with('.')
            || domain.ends_with('.')
            || domain.starts_with('-')
            || domain.ends_with('-'))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Email {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, AuthError> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
