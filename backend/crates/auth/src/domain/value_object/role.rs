use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::AuthError;

/// User role for access control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(i16)]
pub enum Role {
    #[default]
    User = 0,
    Admin = 1,
}

impl Role {
    #[inline]
    pub const fn id(&self) -> i16 {
        *self as i16
    }

    #[inline]
    pub const fn code(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    #[inline]
    pub const fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    #[inline]
    pub fn from_id(id: i16) -> Self {
        match id {
            0 => Role::User,
            1 => Role::Admin,
            _ => {
                tracing::error!("Invalid Role id: {}", id);
                unreachable!("Invalid Role id: {}", id)
            }
        }
    }

    /// Parse a role code from client input
    pub fn from_code(code: &str) -> Result<Self, AuthError> {
        match code {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            _ => Err(AuthError::Validation(format!("Invalid role: {}", code))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
