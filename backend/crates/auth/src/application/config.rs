//! Application Configuration

use chrono::Duration;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret used to sign session tokens (HS256)
    pub token_secret: Vec<u8>,
    /// Hard session lifetime
    pub session_ttl: Duration,
    /// Lifetime of email verification tokens
    pub verification_ttl: Duration,
    /// Failed logins before temporary lockout
    pub max_login_failures: i32,
    /// Lockout duration after too many failures
    pub lockout: Duration,
}

impl AuthConfig {
    /// Create a config with the given signing secret and default policy
    pub fn new(token_secret: Vec<u8>) -> Self {
        Self {
            token_secret,
            session_ttl: Duration::days(7),
            verification_ttl: Duration::hours(24),
            max_login_failures: 5,
            lockout: Duration::minutes(15),
        }
    }

    /// Create a config with a random signing secret
    ///
    /// Tokens stop verifying across restarts; fine for development.
    pub fn with_random_secret() -> Self {
        Self::new(platform::crypto::random_bytes(32))
    }
}
