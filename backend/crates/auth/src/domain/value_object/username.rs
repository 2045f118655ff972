//! Username Value Object

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::AuthError;

/// Minimum username length
const USERNAME_MIN_LENGTH: usize = 3;

/// Maximum username length
const USERNAME_MAX_LENGTH: usize = 20;

/// Username value object
///
/// 3 to 20 characters from `[A-Za-z0-9_]`, lowercased on construction so
/// lookups and the unique index work on one canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Username(String);

impl Username {
    /// Create a new username with validation
    pub fn new(username: impl Into<String>) -> Result<Self, AuthError> {
        let username = username.into().trim().to_lowercase();

        let char_count = username.chars().count();
        if char_count < USERNAME_MIN_LENGTH {
            return Err(AuthError::Validation(format!(
                "Username must be at least {} characters",
                USERNAME_MIN_LENGTH
            )));
        }
        if char_count > USERNAME_MAX_LENGTH {
            return Err(AuthError::Validation(format!(
                "Username must be at most {} characters",
                USERNAME_MAX_LENGTH
            )));
        }

        if !username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        {
            return Err(AuthError::Validation(
                "Username may only contain letters, numbers and underscores".to_string(),
            ));
        }

        Ok(Self(username))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(username: impl Into<String>) -> Self {
        Self(username.into())
    }

    /// Get the username as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Username {
    type Err = AuthError;

    fn from_str(s: &str) -> Result<Self, AuthError> {
        Username::new(s)
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
