//! In-Memory Store Implementation
//!
//! Backs the use-case tests and doubles as a storage reference: behavior
//! here must match the PostgreSQL implementation, including the atomic
//! failure counting (a single mutex guard covers the whole read-modify-write).

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entity::{Identity, Session};
use crate::domain::repository::{CredentialStore, FailureState, SessionStore};
use crate::domain::value_object::{Email, UserId, Username};
use crate::error::{AuthError, AuthResult};

/// In-memory auth store
#[derive(Default)]
pub struct MemoryAuthStore {
    identities: Mutex<HashMap<Uuid, Identity>>,
    sessions: Mutex<HashMap<Uuid, Session>>,
}

impl MemoryAuthStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryAuthStore {
    async fn create(&self, identity: &Identity) -> AuthResult<()> {
        let mut identities = self.identities.lock().unwrap();

        let duplicate = identities.values().any(|existing| {
            existing.username == identity.username || existing.email == identity.email
        });
        if duplicate {
            return Err(AuthError::DuplicateIdentity);
        }

        identities.insert(identity.id.into_uuid(), identity.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<Identity>> {
        Ok(self.identities.lock().unwrap().get(id.as_uuid()).cloned())
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .find(|i| i.email == *email)
            .cloned())
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Identity>> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .find(|i| i.username == *username)
            .cloned())
    }

    async fn find_by_verification_hash(&self, token_hash: &str) -> AuthResult<Option<Identity>> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .find(|i| i.verification_token_hash.as_deref() == Some(token_hash))
            .cloned())
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .any(|i| i.email == *email))
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        Ok(self
            .identities
            .lock()
            .unwrap()
            .values()
            .any(|i| i.username == *username))
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        let mut identities = self.identities.lock().unwrap();
        match identities.get_mut(identity.id.as_uuid()) {
            Some(slot) => {
                *slot = identity.clone();
                Ok(())
            }
            None => Err(AuthError::IdentityNotFound),
        }
    }

    async fn delete(&self, id: &UserId) -> AuthResult<()> {
        self.identities.lock().unwrap().remove(id.as_uuid());
        Ok(())
    }

    async fn record_login_failure(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        max_failures: i32,
        lockout: Duration,
    ) -> AuthResult<FailureState> {
        let mut identities = self.identities.lock().unwrap();
        let identity = identities
            .get_mut(id.as_uuid())
            .ok_or(AuthError::IdentityNotFound)?;

        let lock_expired = identity
            .locked_until
            .is_some_and(|deadline| deadline <= now);

        if lock_expired {
            // Expired lock: this failure restarts the count
            identity.login_failed_count = 1;
            identity.locked_until = None;
        } else {
            identity.login_failed_count += 1;
            if identity.login_failed_count >= max_failures {
                identity.locked_until = Some(now + lockout);
            }
        }
        identity.updated_at = now;

        Ok(FailureState {
            failed_count: identity.login_failed_count,
            locked_until: identity.locked_until,
        })
    }

    async fn list_all(&self) -> AuthResult<Vec<Identity>> {
        let mut all: Vec<Identity> = self.identities.lock().unwrap().values().cloned().collect();
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

impl SessionStore for MemoryAuthStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(())
    }

    async fn find_active_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .find(|s| s.token == token && s.is_live(now))
            .cloned())
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        Ok(self.sessions.lock().unwrap().get(&session_id).cloned())
    }

    async fn list_active_for_user(
        &self,
        identity_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Vec<Session>> {
        let mut live: Vec<Session> = self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.identity_id == *identity_id && s.is_live(now))
            .cloned()
            .collect();
        live.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(live)
    }

    async fn invalidate_by_token(&self, token: &str) -> AuthResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        for session in sessions.values_mut() {
            if session.token == token && session.is_active {
                session.invalidate();
                return Ok(true);
            }
        }
        Ok(false)
    }

    async fn invalidate_by_id(&self, session_id: Uuid) -> AuthResult<bool> {
        let mut sessions = self.sessions.lock().unwrap();
        match sessions.get_mut(&session_id) {
            Some(session) if session.is_active => {
                session.invalidate();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn invalidate_all_for_user(
        &self,
        identity_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let mut revoked = 0;
        for session in sessions.values_mut() {
            if session.identity_id == *identity_id
                && session.is_active
                && except != Some(session.id)
            {
                session.invalidate();
                revoked += 1;
            }
        }
        Ok(revoked)
    }

    async fn touch(&self, session_id: Uuid, now: DateTime<Utc>) -> AuthResult<()> {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(&session_id) {
            session.last_seen_at = now;
        }
        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut sessions = self.sessions.lock().unwrap();
        let before = sessions.len();
        sessions.retain(|_, s| !s.is_expired(now));
        Ok((before - sessions.len()) as u64)
    }
}
