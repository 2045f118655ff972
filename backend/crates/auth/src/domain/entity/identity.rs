//! Identity Entity
//!
//! An account: public profile fields plus the sensitive credential state
//! (password hash, verification token, lockout counters).

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;

use crate::domain::value_object::{Email, Role, UserId, Username};

/// Account identity entity
#[derive(Debug, Clone)]
pub struct Identity {
    /// Primary key
    pub id: UserId,
    /// Unique login name
    pub username: Username,
    /// Unique email address (lowercased)
    pub email: Email,
    /// Argon2id password hash (PHC format)
    pub password_hash: HashedPassword,
    /// Access control role
    pub role: Role,
    /// Administrative deactivation flag
    pub is_active: bool,
    /// Whether the email address has been verified
    pub email_verified: bool,
    /// SHA-256 of the outstanding verification secret (None once verified)
    ///
    /// Only the hash is stored; the raw secret travels in the mail.
    pub verification_token_hash: Option<String>,
    /// Deadline for the verification secret
    pub verification_expires_at: Option<DateTime<Utc>>,
    /// Consecutive login failure count
    pub login_failed_count: i32,
    /// Account locked until (temporary lockout after failures)
    pub locked_until: Option<DateTime<Utc>>,
    /// Last password rotation time
    pub password_changed_at: Option<DateTime<Utc>>,
    /// Last successful login time
    pub last_login_at: Option<DateTime<Utc>>,
    /// Created timestamp
    pub created_at: DateTime<Utc>,
    /// Updated timestamp
    pub updated_at: DateTime<Utc>,
}

impl Identity {
    /// Create a new unverified identity
    ///
    /// The account starts with a pending verification token and cannot
    /// sign in until [`Identity::mark_verified`] runs.
    pub fn new(
        username: Username,
        email: Email,
        password_hash: HashedPassword,
        verification_token_hash: String,
        verification_expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: UserId::new(),
            username,
            email,
            password_hash,
            role: Role::User,
            is_active: true,
            email_verified: false,
            verification_token_hash: Some(verification_token_hash),
            verification_expires_at: Some(verification_expires_at),
            login_failed_count: 0,
            locked_until: None,
            password_changed_at: None,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if the account is currently locked
    pub fn is_locked(&self, now: DateTime<Utc>) -> bool {
        match self.locked_until {
            Some(locked_until) => now < locked_until,
            None => false,
        }
    }

    /// Seconds until the current lock expires (0 if not locked)
    pub fn lock_remaining_secs(&self, now: DateTime<Utc>) -> i64 {
        match self.locked_until {
            Some(locked_until) if now < locked_until => (locked_until - now).num_seconds().max(1),
            _ => 0,
        }
    }

    /// Check if the verification secret is still within its deadline
    pub fn verification_pending(&self, now: DateTime<Utc>) -> bool {
        self.verification_token_hash.is_some()
            && self
                .verification_expires_at
                .is_some_and(|deadline| now <= deadline)
    }

    /// Mark the email as verified and clear the secret
    pub fn mark_verified(&mut self, now: DateTime<Utc>) {
        self.email_verified = true;
        self.verification_token_hash = None;
        self.verification_expires_at = None;
        self.updated_at = now;
    }

    /// Record a successful login
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.updated_at = now;
    }

    /// Reset failure count and lock after a successful login
    pub fn reset_failures(&mut self, now: DateTime<Utc>) {
        self.login_failed_count = 0;
        self.locked_until = None;
        self.updated_at = now;
    }

    /// Replace the password hash
    pub fn update_password(&mut self, new_hash: HashedPassword, now: DateTime<Utc>) {
        self.password_hash = new_hash;
        self.password_changed_at = Some(now);
        self.updated_at = now;
    }

    /// Change the access control role
    pub fn change_role(&mut self, role: Role, now: DateTime<Utc>) {
        self.role = role;
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn identity(now: DateTime<Utc>) -> Identity {
        let hash = platform::password::ClearTextPassword::new("Spooky1".to_string())
            .unwrap()
            .hash()
            .unwrap();
        Identity::new(
            Username::new("ghost").unwrap(),
            Email::new("ghost@crypt.com").unwrap(),
            hash,
            "verify-secret-hash".to_string(),
            now + Duration::hours(24),
            now,
        )
    }

    #[test]
    fn test_new_identity_starts_unverified() {
        let now = Utc::now();
        let identity = identity(now);

        assert!(!identity.email_verified);
        assert!(identity.verification_pending(now));
        assert!(identity.is_active);
        assert_eq!(identity.role, Role::User);
        assert_eq!(identity.login_failed_count, 0);
    }

    #[test]
    fn test_verification_deadline() {
        let now = Utc::now();
        let identity = identity(now);

        assert!(identity.verification_pending(now + Duration::hours(23)));
        assert!(!identity.verification_pending(now + Duration::hours(25)));
    }

    #[test]
    fn test_mark_verified_clears_token() {
        let now = Utc::now();
        let mut identity = identity(now);

        identity.mark_verified(now);
        assert!(identity.email_verified);
        assert!(identity.verification_token_hash.is_none());
        assert!(identity.verification_expires_at.is_none());
    }

    #[test]
    fn test_lock_window() {
        let now = Utc::now();
        let mut identity = identity(now);
        identity.locked_until = Some(now + Duration::minutes(15));

        assert!(identity.is_locked(now));
        assert!(identity.lock_remaining_secs(now) > 0);
        assert!(identity.lock_remaining_secs(now) <= 15 * 60);

        let later = now + Duration::minutes(16);
        assert!(!identity.is_locked(later));
        assert_eq!(identity.lock_remaining_secs(later), 0);
    }
}
