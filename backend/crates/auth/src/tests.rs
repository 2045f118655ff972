//! Use-case tests over the in-memory store
//!
//! The in-memory store mirrors the PostgreSQL semantics, so these tests
//! exercise the full flows (signup, verification, lockout, sessions,
//! password rotation, admin) without a database. Time moves only through
//! the manual clock.

mod harness {
    use std::sync::{Arc, Mutex};

    use platform::client::ClientInfo;
    use platform::clock::{Clock, ManualClock};

    use crate::application::{
        AuthConfig, AuthContext, ChangePasswordInput, ChangePasswordOutput, ChangePasswordUseCase,
        ResolveSessionUseCase, SignInInput, SignInOutput, SignInUseCase, SignUpInput, SignUpOutput,
        SignUpUseCase, VerifyEmailOutput, VerifyEmailUseCase,
    };
    use crate::domain::mailer::{Mailer, MailerError};
    use crate::domain::value_object::{Email, UserId, Username};
    use crate::error::AuthResult;
    use crate::infra::MemoryAuthStore;
    use crate::token::TokenCodec;

    /// Mailer that records every verification secret it is asked to send
    #[derive(Default)]
    pub struct RecordingMailer {
        pub sent: Mutex<Vec<(String, String)>>,
    }

    impl Mailer for RecordingMailer {
        async fn send_verification(
            &self,
            email: &Email,
            _username: &Username,
            verification_secret: &str,
        ) -> Result<(), MailerError> {
            self.sent
                .lock()
                .unwrap()
                .push((email.to_string(), verification_secret.to_string()));
            Ok(())
        }
    }

    /// Mailer that always fails delivery
    pub struct FailingMailer;

    impl Mailer for FailingMailer {
        async fn send_verification(
            &self,
            _email: &Email,
            _username: &Username,
            _verification_secret: &str,
        ) -> Result<(), MailerError> {
            Err(MailerError::Delivery("smtp connection refused".to_string()))
        }
    }

    pub struct Harness {
        pub store: Arc<MemoryAuthStore>,
        pub mailer: Arc<RecordingMailer>,
        pub config: Arc<AuthConfig>,
        pub clock: Arc<ManualClock>,
        pub codec: Arc<TokenCodec>,
    }

    impl Harness {
        pub fn new() -> Self {
            let config = Arc::new(AuthConfig::with_random_secret());
            let codec = Arc::new(TokenCodec::new(&config.token_secret));
            Self {
                store: Arc::new(MemoryAuthStore::new()),
                mailer: Arc::new(RecordingMailer::default()),
                config,
                clock: Arc::new(ManualClock::from_system()),
                codec,
            }
        }

        pub fn clock(&self) -> Arc<dyn Clock> {
            self.clock.clone()
        }

        /// Handler state over the in-memory store, for router-level tests
        pub fn state(
            &self,
        ) -> crate::presentation::handlers::AuthAppState<
            MemoryAuthStore,
            MemoryAuthStore,
            RecordingMailer,
        > {
            crate::presentation::handlers::AuthAppState {
                credentials: self.store.clone(),
                sessions: self.store.clone(),
                mailer: self.mailer.clone(),
                codec: self.codec.clone(),
                config: self.config.clone(),
                clock: self.clock(),
            }
        }

        pub async fn sign_up(
            &self,
            username: &str,
            email: &str,
            password: &str,
        ) -> AuthResult<SignUpOutput> {
            SignUpUseCase::new(
                self.store.clone(),
                self.mailer.clone(),
                self.config.clone(),
                self.clock(),
            )
            .execute(SignUpInput {
                username: username.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await
        }

        /// Verification secret from the most recently sent mail
        pub fn last_secret(&self) -> String {
            self.mailer
                .sent
                .lock()
                .unwrap()
                .last()
                .expect("no verification mail was sent")
                .1
                .clone()
        }

        pub async fn verify(&self, secret: &str) -> AuthResult<VerifyEmailOutput> {
            VerifyEmailUseCase::new(self.store.clone(), self.clock())
                .execute(secret)
                .await
        }

        /// Sign up and immediately verify
        pub async fn sign_up_verified(
            &self,
            username: &str,
            email: &str,
            password: &str,
        ) -> UserId {
            let output = self.sign_up(username, email, password).await.unwrap();
            let secret = self.last_secret();
            self.verify(&secret).await.unwrap();
            output.user_id
        }

        pub async fn login(&self, identifier: &str, password: &str) -> AuthResult<SignInOutput> {
            SignInUseCase::new(
                self.store.clone(),
                self.store.clone(),
                self.codec.clone(),
                self.config.clone(),
                self.clock(),
            )
            .execute(
                SignInInput {
                    identifier: identifier.to_string(),
                    password: password.to_string(),
                },
                ClientInfo::default(),
            )
            .await
        }

        pub async fn resolve(&self, token: &str) -> AuthResult<AuthContext> {
            ResolveSessionUseCase::new(
                self.store.clone(),
                self.store.clone(),
                self.codec.clone(),
                self.clock(),
            )
            .execute(token)
            .await
        }

        pub async fn change_password(
            &self,
            identity_id: &UserId,
            current_session_id: uuid::Uuid,
            current_password: &str,
            new_password: &str,
        ) -> AuthResult<ChangePasswordOutput> {
            ChangePasswordUseCase::new(self.store.clone(), self.store.clone(), self.clock())
                .execute(
                    identity_id,
                    current_session_id,
                    ChangePasswordInput {
                        current_password: current_password.to_string(),
                        new_password: new_password.to_string(),
                    },
                )
                .await
        }
    }
}

#[cfg(test)]
mod signup_tests {
    use super::harness::*;
    use crate::domain::repository::CredentialStore;
    use crate::error::AuthError;
    use chrono::Duration;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_signup_sends_verification_mail() {
        let h = Harness::new();
        let output = h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();

        let sent = h.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "ghost@crypt.com");
        assert!(!sent[0].1.is_empty());
        drop(sent);

        let identity = h.store.find_by_id(&output.user_id).await.unwrap().unwrap();
        assert!(!identity.email_verified);
        assert!(identity.verification_token_hash.is_some());
        // The mailed secret is never what the store holds
        assert_ne!(
            identity.verification_token_hash.as_deref(),
            Some(h.last_secret().as_str())
        );
    }

    #[tokio::test]
    async fn test_duplicate_username_and_email_rejected() {
        let h = Harness::new();
        h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();

        let err = h.sign_up("ghost", "other@crypt.com", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));

        let err = h.sign_up("wraith", "ghost@crypt.com", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::DuplicateIdentity));
    }

    #[tokio::test]
    async fn test_signup_rolls_back_when_mailer_fails() {
        let h = Harness::new();
        let use_case = crate::application::SignUpUseCase::new(
            h.store.clone(),
            Arc::new(FailingMailer),
            h.config.clone(),
            h.clock(),
        );

        let err = use_case
            .execute(crate::application::SignUpInput {
                username: "ghost".to_string(),
                email: "ghost@crypt.com".to_string(),
                password: "Spooky1".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::MailerUnavailable));

        // No half-created account left behind; the name is free again
        let email = crate::domain::value_object::Email::new("ghost@crypt.com").unwrap();
        assert!(!h.store.exists_by_email(&email).await.unwrap());
        h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();
    }

    #[tokio::test]
    async fn test_verification_secret_is_single_use() {
        let h = Harness::new();
        h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();
        let secret = h.last_secret();

        h.verify(&secret).await.unwrap();
        let err = h.verify(&secret).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidVerificationToken));
    }

    #[tokio::test]
    async fn test_verification_secret_expires() {
        let h = Harness::new();
        h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();
        let secret = h.last_secret();

        h.clock.advance(Duration::hours(25));
        let err = h.verify(&secret).await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidVerificationToken));
    }

    #[tokio::test]
    async fn test_unknown_verification_secret_rejected() {
        let h = Harness::new();
        let err = h.verify("not-a-real-secret").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidVerificationToken));
    }
}

#[cfg(test)]
mod login_tests {
    use super::harness::*;
    use crate::domain::repository::CredentialStore;
    use crate::error::AuthError;
    use chrono::Duration;

    #[tokio::test]
    async fn test_login_blocked_until_verified() {
        let h = Harness::new();
        h.sign_up("ghost", "ghost@crypt.com", "Spooky1").await.unwrap();

        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::EmailNotVerified));

        let secret = h.last_secret();
        h.verify(&secret).await.unwrap();
        let output = h.login("ghost", "Spooky1").await.unwrap();
        assert!(!output.token.is_empty());
    }

    #[tokio::test]
    async fn test_login_by_email_or_username() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let by_name = h.login("ghost", "Spooky1").await.unwrap();
        let by_email = h.login("ghost@crypt.com", "Spooky1").await.unwrap();
        assert_eq!(by_name.identity.id, by_email.identity.id);
    }

    #[tokio::test]
    async fn test_unknown_identifier_reads_as_bad_credentials() {
        let h = Harness::new();
        let err = h.login("nobody", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let err = h.login("nobody@crypt.com", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_deactivated_account_cannot_login() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let mut identity = h.store.find_by_id(&id).await.unwrap().unwrap();
        identity.is_active = false;
        CredentialStore::update(&*h.store, &identity).await.unwrap();

        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountDeactivated));
    }

    #[tokio::test]
    async fn test_fifth_failure_locks_the_account() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        // Every wrong guess, including the one that triggers the lock,
        // reads as bad credentials
        for _ in 0..5 {
            let err = h.login("ghost", "WrongPass1").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }

        let identity = h.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(identity.login_failed_count, 5);
        assert!(identity.locked_until.is_some());

        // Once locked, even the right password gets the lock response
        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked { .. }));
        if let AuthError::AccountLocked { retry_after_secs } = err {
            assert!(retry_after_secs > 0 && retry_after_secs <= 15 * 60);
        }
    }

    #[tokio::test]
    async fn test_correct_password_rejected_while_locked() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        for _ in 0..5 {
            let _ = h.login("ghost", "WrongPass1").await;
        }

        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked { .. }));
    }

    #[tokio::test]
    async fn test_lock_lifts_and_success_resets_counter() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        for _ in 0..5 {
            let _ = h.login("ghost", "WrongPass1").await;
        }

        h.clock.advance(Duration::minutes(15) + Duration::seconds(1));
        h.login("ghost", "Spooky1").await.unwrap();

        let identity = h.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(identity.login_failed_count, 0);
        assert!(identity.locked_until.is_none());
        assert!(identity.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_failure_after_expired_lock_restarts_counter() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        for _ in 0..5 {
            let _ = h.login("ghost", "WrongPass1").await;
        }

        h.clock.advance(Duration::minutes(16));

        // First failure after the lock expires counts as one, not six
        let err = h.login("ghost", "WrongPass1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        let identity = h.store.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(identity.login_failed_count, 1);
        assert!(identity.locked_until.is_none());

        // Four more failures reach the threshold again
        for _ in 0..4 {
            let err = h.login("ghost", "WrongPass1").await.unwrap_err();
            assert!(matches!(err, AuthError::InvalidCredentials));
        }
        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::AccountLocked { .. }));
    }
}

#[cfg(test)]
mod session_tests {
    use super::harness::*;
    use crate::application::{ListSessionsUseCase, RevokeSessionUseCase, SignOutAllUseCase, SignOutUseCase};
    use crate::domain::repository::SessionStore;
    use crate::error::AuthError;
    use chrono::Duration;
    use platform::clock::Clock;

    #[tokio::test]
    async fn test_token_resolves_to_the_login_identity() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let login = h.login("ghost", "Spooky1").await.unwrap();
        let ctx = h.resolve(&login.token).await.unwrap();

        assert_eq!(ctx.identity.id, id);
        assert_eq!(ctx.session.id, login.session_id);
    }

    #[tokio::test]
    async fn test_logins_at_the_same_instant_get_distinct_tokens() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        // The manual clock does not move between these, so the issue
        // timestamps are identical
        let phone = h.login("ghost", "Spooky1").await.unwrap();
        let laptop = h.login("ghost", "Spooky1").await.unwrap();

        assert_ne!(phone.token, laptop.token);
        assert_ne!(phone.session_id, laptop.session_id);

        let ctx = h.resolve(&phone.token).await.unwrap();
        assert_eq!(ctx.session.id, phone.session_id);
        let ctx = h.resolve(&laptop.token).await.unwrap();
        assert_eq!(ctx.session.id, laptop.session_id);
    }

    #[tokio::test]
    async fn test_garbage_token_is_rejected() {
        let h = Harness::new();
        let err = h.resolve("not.a.token").await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn test_logout_revokes_only_the_current_session() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let phone = h.login("ghost", "Spooky1").await.unwrap();
        let laptop = h.login("ghost", "Spooky1").await.unwrap();

        SignOutUseCase::new(h.store.clone())
            .execute(&phone.token)
            .await
            .unwrap();

        let err = h.resolve(&phone.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
        h.resolve(&laptop.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let use_case = SignOutUseCase::new(h.store.clone());
        use_case.execute(&login.token).await.unwrap();
        use_case.execute(&login.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_all_revokes_every_session() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let a = h.login("ghost", "Spooky1").await.unwrap();
        let b = h.login("ghost", "Spooky1").await.unwrap();
        let c = h.login("ghost", "Spooky1").await.unwrap();

        let revoked = SignOutAllUseCase::new(h.store.clone())
            .execute(&id)
            .await
            .unwrap();
        assert_eq!(revoked, 3);

        for token in [&a.token, &b.token, &c.token] {
            let err = h.resolve(token).await.unwrap_err();
            assert!(matches!(err, AuthError::SessionInvalid));
        }
    }

    #[tokio::test]
    async fn test_list_sessions_shows_only_live_ones() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let phone = h.login("ghost", "Spooky1").await.unwrap();
        let _laptop = h.login("ghost", "Spooky1").await.unwrap();

        SignOutUseCase::new(h.store.clone())
            .execute(&phone.token)
            .await
            .unwrap();

        let sessions = ListSessionsUseCase::new(h.store.clone(), h.clock())
            .execute(&id)
            .await
            .unwrap();
        assert_eq!(sessions.len(), 1);
        assert_ne!(sessions[0].id, phone.session_id);
    }

    #[tokio::test]
    async fn test_revoke_session_by_id() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let phone = h.login("ghost", "Spooky1").await.unwrap();
        let laptop = h.login("ghost", "Spooky1").await.unwrap();

        RevokeSessionUseCase::new(h.store.clone())
            .execute(&id, phone.session_id)
            .await
            .unwrap();

        let err = h.resolve(&phone.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
        h.resolve(&laptop.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_cannot_revoke_someone_elses_session() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let intruder = h.sign_up_verified("wraith", "wraith@crypt.com", "Spooky1").await;

        let victim = h.login("ghost", "Spooky1").await.unwrap();

        let err = RevokeSessionUseCase::new(h.store.clone())
            .execute(&intruder, victim.session_id)
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::SessionNotFound));

        h.resolve(&victim.token).await.unwrap();
    }

    #[tokio::test]
    async fn test_expired_session_no_longer_resolves() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        h.clock.advance(Duration::days(7) + Duration::seconds(1));
        let err = h.resolve(&login.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn test_cleanup_removes_expired_rows() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        h.login("ghost", "Spooky1").await.unwrap();
        h.login("ghost", "Spooky1").await.unwrap();

        h.clock.advance(Duration::days(8));
        let removed = h.store.cleanup_expired(h.clock.now()).await.unwrap();
        assert_eq!(removed, 2);

        let removed = h.store.cleanup_expired(h.clock.now()).await.unwrap();
        assert_eq!(removed, 0);
    }
}

#[cfg(test)]
mod password_tests {
    use super::harness::*;
    use crate::error::AuthError;

    #[tokio::test]
    async fn test_change_password_keeps_the_current_session() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let phone = h.login("ghost", "Spooky1").await.unwrap();
        let laptop = h.login("ghost", "Spooky1").await.unwrap();

        let output = h
            .change_password(&id, laptop.session_id, "Spooky1", "Spookier2")
            .await
            .unwrap();
        assert_eq!(output.revoked_sessions, 1);

        // The rotating device stays signed in, everything else is kicked
        h.resolve(&laptop.token).await.unwrap();
        let err = h.resolve(&phone.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));

        // Only the new password works from here on
        let err = h.login("ghost", "Spooky1").await.unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
        h.login("ghost", "Spookier2").await.unwrap();
    }

    #[tokio::test]
    async fn test_change_password_requires_the_current_one() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let err = h
            .change_password(&id, login.session_id, "WrongPass1", "Spookier2")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));

        // Nothing was revoked and the old password still works
        h.resolve(&login.token).await.unwrap();
        h.login("ghost", "Spooky1").await.unwrap();
    }

    #[tokio::test]
    async fn test_new_password_must_satisfy_the_policy() {
        let h = Harness::new();
        let id = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let err = h
            .change_password(&id, login.session_id, "Spooky1", "weak")
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::PasswordPolicy(_)));
    }
}

#[cfg(test)]
mod admin_tests {
    use super::harness::*;
    use crate::application::AdminUseCase;
    use crate::domain::repository::CredentialStore;
    use crate::domain::value_object::Role;
    use crate::error::AuthError;
    use platform::clock::Clock;

    async fn make_admin(h: &Harness, username: &str, email: &str) -> crate::domain::value_object::UserId {
        let id = h.sign_up_verified(username, email, "Spooky1").await;
        let mut identity = h.store.find_by_id(&id).await.unwrap().unwrap();
        identity.change_role(Role::Admin, h.clock.now());
        CredentialStore::update(&*h.store, &identity).await.unwrap();
        id
    }

    #[tokio::test]
    async fn test_admin_promotes_and_demotes() {
        let h = Harness::new();
        let admin = make_admin(&h, "keeper", "keeper@crypt.com").await;
        let user = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;

        let use_case = AdminUseCase::new(h.store.clone(), h.store.clone(), h.clock());

        let updated = use_case.change_role(&admin, &user, Role::Admin).await.unwrap();
        assert_eq!(updated.role, Role::Admin);

        let updated = use_case.change_role(&admin, &user, Role::User).await.unwrap();
        assert_eq!(updated.role, Role::User);
    }

    #[tokio::test]
    async fn test_admin_cannot_demote_themselves() {
        let h = Harness::new();
        let admin = make_admin(&h, "keeper", "keeper@crypt.com").await;

        let use_case = AdminUseCase::new(h.store.clone(), h.store.clone(), h.clock());
        let err = use_case.change_role(&admin, &admin, Role::User).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_delete_user_revokes_their_sessions() {
        let h = Harness::new();
        let admin = make_admin(&h, "keeper", "keeper@crypt.com").await;
        let user = h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let use_case = AdminUseCase::new(h.store.clone(), h.store.clone(), h.clock());
        use_case.delete_user(&admin, &user).await.unwrap();

        assert!(h.store.find_by_id(&user).await.unwrap().is_none());
        let err = h.resolve(&login.token).await.unwrap_err();
        assert!(matches!(err, AuthError::SessionInvalid));
    }

    #[tokio::test]
    async fn test_admin_cannot_delete_themselves() {
        let h = Harness::new();
        let admin = make_admin(&h, "keeper", "keeper@crypt.com").await;

        let use_case = AdminUseCase::new(h.store.clone(), h.store.clone(), h.clock());
        let err = use_case.delete_user(&admin, &admin).await.unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));

        assert!(h.store.find_by_id(&admin).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deleting_a_missing_user_is_not_found() {
        let h = Harness::new();
        let admin = make_admin(&h, "keeper", "keeper@crypt.com").await;

        let use_case = AdminUseCase::new(h.store.clone(), h.store.clone(), h.clock());
        let err = use_case
            .delete_user(&admin, &crate::domain::value_object::UserId::new())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::IdentityNotFound));
    }
}

#[cfg(test)]
mod route_tests {
    use super::harness::*;
    use axum::Router;
    use axum::body::Body;
    use axum::extract::Extension;
    use axum::http::{Request, StatusCode, header};
    use axum::middleware::from_fn_with_state;
    use axum::routing::get;
    use tower::ServiceExt;

    use crate::application::AuthContext;
    use crate::infra::MemoryAuthStore;
    use crate::presentation::middleware::attach_auth;
    use crate::presentation::router::auth_router;

    async fn whoami(ctx: Option<Extension<AuthContext>>) -> &'static str {
        match ctx {
            Some(Extension(ctx)) => {
                assert!(!ctx.identity.username.as_str().is_empty());
                "authenticated"
            }
            None => "anonymous",
        }
    }

    /// Route that works with or without a session attached
    fn optional_auth_app(h: &Harness) -> Router {
        Router::new().route("/whoami", get(whoami)).layer(
            from_fn_with_state(
                h.state(),
                attach_auth::<MemoryAuthStore, MemoryAuthStore, RecordingMailer>,
            ),
        )
    }

    async fn body_string(response: axum::response::Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_optional_auth_passes_anonymous_requests_through() {
        let h = Harness::new();
        let app = optional_auth_app(&h);

        let response = app
            .oneshot(Request::get("/whoami").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_optional_auth_ignores_invalid_tokens() {
        let h = Harness::new();
        let app = optional_auth_app(&h);

        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header(header::AUTHORIZATION, "Bearer not.a.token")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "anonymous");
    }

    #[tokio::test]
    async fn test_optional_auth_attaches_a_valid_session() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let app = optional_auth_app(&h);
        let response = app
            .oneshot(
                Request::get("/whoami")
                    .header(header::AUTHORIZATION, format!("Bearer {}", login.token))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "authenticated");
    }

    #[tokio::test]
    async fn test_http_logout_succeeds_for_an_already_revoked_session() {
        let h = Harness::new();
        h.sign_up_verified("ghost", "ghost@crypt.com", "Spooky1").await;
        let login = h.login("ghost", "Spooky1").await.unwrap();

        let app = auth_router(h.state());
        let request = || {
            Request::post("/logout")
                .header(header::AUTHORIZATION, format!("Bearer {}", login.token))
                .body(Body::empty())
                .unwrap()
        };

        let response = app.clone().oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        // The session is gone; a repeat logout is still a success
        let response = app.oneshot(request()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_http_logout_without_a_token_is_unauthorized() {
        let h = Harness::new();
        let app = auth_router(h.state());

        let response = app
            .oneshot(Request::post("/logout").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
