//! Auth Error Types
//!
//! This module provides auth-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Identity not found
    #[error("User not found")]
    IdentityNotFound,

    /// Username or email already registered
    #[error("An account with this username or email already exists")]
    DuplicateIdentity,

    /// Invalid credentials (unknown identifier or wrong password)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Account is locked (too many failed attempts)
    #[error("Account is temporarily locked. Try again in {retry_after_secs} seconds")]
    AccountLocked { retry_after_secs: i64 },

    /// Email address has not been verified yet
    #[error("Email address is not verified")]
    EmailNotVerified,

    /// Account has been deactivated
    #[error("Account is deactivated")]
    AccountDeactivated,

    /// Verification token is unknown or past its deadline
    #[error("Invalid or expired verification token")]
    InvalidVerificationToken,

    /// Session token missing, malformed, revoked or expired
    #[error("Session not found or expired")]
    SessionInvalid,

    /// Named session does not exist (or belongs to someone else)
    #[error("Session not found")]
    SessionNotFound,

    /// Authorization header missing or not a Bearer token
    #[error("Missing authentication token")]
    MissingToken,

    /// Caller lacks the required role
    #[error("Insufficient permissions")]
    PermissionDenied,

    /// Input validation error (username, email)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Password policy violation
    #[error("Password validation failed: {0}")]
    PasswordPolicy(String),

    /// Verification email could not be sent
    #[error("Could not send verification email")]
    MailerUnavailable,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::IdentityNotFound | AuthError::SessionNotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicateIdentity => StatusCode::CONFLICT,
            AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            AuthError::AccountLocked { .. } => StatusCode::LOCKED,
            AuthError::EmailNotVerified | AuthError::AccountDeactivated => StatusCode::FORBIDDEN,
            AuthError::InvalidVerificationToken => StatusCode::BAD_REQUEST,
            AuthError::SessionInvalid | AuthError::MissingToken => StatusCode::UNAUTHORIZED,
            AuthError::PermissionDenied => StatusCode::FORBIDDEN,
            AuthError::Validation(_) | AuthError::PasswordPolicy(_) => StatusCode::BAD_REQUEST,
            AuthError::MailerUnavailable
            | AuthError::Database(_)
            | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::IdentityNotFound | AuthError::SessionNotFound => ErrorKind::NotFound,
            AuthError::DuplicateIdentity => ErrorKind::Conflict,
            AuthError::InvalidCredentials
            | AuthError::SessionInvalid
            | AuthError::MissingToken => ErrorKind::Unauthorized,
            AuthError::AccountLocked { .. } => ErrorKind::Locked,
            AuthError::EmailNotVerified
            | AuthError::AccountDeactivated
            | AuthError::PermissionDenied => ErrorKind::Forbidden,
            AuthError::InvalidVerificationToken
            | AuthError::Validation(_)
            | AuthError::PasswordPolicy(_) => ErrorKind::BadRequest,
            AuthError::MailerUnavailable
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::AccountLocked { retry_after_secs } => {
                AppError::locked(self.to_string()).with_action(format!(
                    "Wait {retry_after_secs} seconds before trying again"
                ))
            }
            AuthError::EmailNotVerified => AppError::new(self.kind(), self.to_string())
                .with_action("Check your inbox for the verification link"),
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::MailerUnavailable => {
                tracing::error!("Verification email delivery failed");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::AccountLocked { retry_after_secs } => {
                tracing::warn!(retry_after_secs, "Login attempt on locked account");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<AppError> for AuthError {
    fn from(err: AppError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<platform::password::PasswordPolicyError> for AuthError {
    fn from(err: platform::password::PasswordPolicyError) -> Self {
        AuthError::PasswordPolicy(err.to_string())
    }
}

impl From<platform::password::PasswordHashError> for AuthError {
    fn from(err: platform::password::PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AuthError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::AccountLocked {
                retry_after_secs: 900
            }
            .status_code(),
            StatusCode::LOCKED
        );
        assert_eq!(
            AuthError::EmailNotVerified.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::DuplicateIdentity.status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AuthError::InvalidVerificationToken.status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::SessionInvalid.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AuthError::MailerUnavailable.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_locked_error_carries_retry_hint() {
        let err = AuthError::AccountLocked {
            retry_after_secs: 120,
        };
        let app_err = err.to_app_error();
        assert_eq!(app_err.status_code(), 423);
        assert!(app_err.action().unwrap().contains("120"));
    }
}
