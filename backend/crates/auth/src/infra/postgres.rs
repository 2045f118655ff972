//! PostgreSQL Store Implementations

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{Identity, Session};
use crate::domain::repository::{CredentialStore, FailureState, SessionStore};
use crate::domain::value_object::{Email, Role, UserId, Username};
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed auth store
#[derive(Clone)]
pub struct PgAuthStore {
    pool: PgPool,
}

impl PgAuthStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Map a unique-index violation to the duplicate error, pass the rest through
fn map_insert_error(err: sqlx::Error) -> AuthError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some("23505") {
            return AuthError::DuplicateIdentity;
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// Credential Store Implementation
// ============================================================================

const IDENTITY_COLUMNS: &str = r#"
    id,
    username,
    email,
    password_hash,
    role,
    is_active,
    email_verified,
    verification_token_hash,
    verification_expires_at,
    login_failed_count,
    locked_until,
    password_changed_at,
    last_login_at,
    created_at,
    updated_at
"#;

impl CredentialStore for PgAuthStore {
    async fn create(&self, identity: &Identity) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO identities (
                id,
                username,
                email,
                password_hash,
                role,
                is_active,
                email_verified,
                verification_token_hash,
                verification_expires_at,
                login_failed_count,
                locked_until,
                password_changed_at,
                last_login_at,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(identity.username.as_str())
        .bind(identity.email.as_str())
        .bind(identity.password_hash.as_phc_string())
        .bind(identity.role.id())
        .bind(identity.is_active)
        .bind(identity.email_verified)
        .bind(&identity.verification_token_hash)
        .bind(identity.verification_expires_at)
        .bind(identity.login_failed_count)
        .bind(identity.locked_until)
        .bind(identity.password_changed_at)
        .bind(identity.last_login_at)
        .bind(identity.created_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_by_email(&self, email: &Email) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE email = $1"
        ))
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE username = $1"
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn find_by_verification_hash(&self, token_hash: &str) -> AuthResult<Option<Identity>> {
        let row = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities WHERE verification_token_hash = $1"
        ))
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_identity()).transpose()
    }

    async fn exists_by_email(&self, email: &Email) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE email = $1)",
        )
        .bind(email.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn exists_by_username(&self, username: &Username) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM identities WHERE username = $1)",
        )
        .bind(username.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn update(&self, identity: &Identity) -> AuthResult<()> {
        sqlx::query(
            r#"
            UPDATE identities SET
                username = $2,
                email = $3,
                password_hash = $4,
                role = $5,
                is_active = $6,
                email_verified = $7,
                verification_token_hash = $8,
                verification_expires_at = $9,
                login_failed_count = $10,
                locked_until = $11,
                password_changed_at = $12,
                last_login_at = $13,
                updated_at = $14
            WHERE id = $1
            "#,
        )
        .bind(identity.id.as_uuid())
        .bind(identity.username.as_str())
        .bind(identity.email.as_str())
        .bind(identity.password_hash.as_phc_string())
        .bind(identity.role.id())
        .bind(identity.is_active)
        .bind(identity.email_verified)
        .bind(&identity.verification_token_hash)
        .bind(identity.verification_expires_at)
        .bind(identity.login_failed_count)
        .bind(identity.locked_until)
        .bind(identity.password_changed_at)
        .bind(identity.last_login_at)
        .bind(identity.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> AuthResult<()> {
        sqlx::query("DELETE FROM identities WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn record_login_failure(
        &self,
        id: &UserId,
        now: DateTime<Utc>,
        max_failures: i32,
        lockout: Duration,
    ) -> AuthResult<FailureState> {
        // Single UPDATE so concurrent failures never lose increments. All
        // CASE expressions read the pre-update row: an expired lock restarts
        // the counter at 1 (and lifts the lock even if this failure would
        // cross the threshold again); otherwise the counter increments, and
        // crossing the threshold sets a fresh lock.
        let lock_deadline = now + lockout;
        let row = sqlx::query_as::<_, (i32, Option<DateTime<Utc>>)>(
            r#"
            UPDATE identities SET
                login_failed_count = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN 1
                    ELSE login_failed_count + 1
                END,
                locked_until = CASE
                    WHEN locked_until IS NOT NULL AND locked_until <= $2 THEN NULL
                    WHEN login_failed_count + 1 >= $3 THEN $4
                    ELSE locked_until
                END,
                updated_at = $2
            WHERE id = $1
            RETURNING login_failed_count, locked_until
            "#,
        )
        .bind(id.as_uuid())
        .bind(now)
        .bind(max_failures)
        .bind(lock_deadline)
        .fetch_optional(&self.pool)
        .await?;

        let (failed_count, locked_until) = row.ok_or(AuthError::IdentityNotFound)?;

        Ok(FailureState {
            failed_count,
            locked_until,
        })
    }

    async fn list_all(&self) -> AuthResult<Vec<Identity>> {
        let rows = sqlx::query_as::<_, IdentityRow>(&format!(
            "SELECT {IDENTITY_COLUMNS} FROM identities ORDER BY created_at DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(|r| r.into_identity()).collect()
    }
}

// ============================================================================
// Session Store Implementation
// ============================================================================

const SESSION_COLUMNS: &str = r#"
    id,
    identity_id,
    token,
    ip,
    user_agent,
    is_active,
    expires_at,
    last_seen_at,
    created_at
"#;

impl SessionStore for PgAuthStore {
    async fn create(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (
                id,
                identity_id,
                token,
                ip,
                user_agent,
                is_active,
                expires_at,
                last_seen_at,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(session.id)
        .bind(session.identity_id.as_uuid())
        .bind(&session.token)
        .bind(&session.ip)
        .bind(&session.user_agent)
        .bind(session.is_active)
        .bind(session.expires_at)
        .bind(session.last_seen_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_active_by_token(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sessions
            WHERE token = $1 AND is_active = TRUE AND expires_at > $2
            "#
        ))
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn find_by_id(&self, session_id: Uuid) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1"
        ))
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| r.into_session()))
    }

    async fn list_active_for_user(
        &self,
        identity_id: &UserId,
        now: DateTime<Utc>,
    ) -> AuthResult<Vec<Session>> {
        let rows = sqlx::query_as::<_, SessionRow>(&format!(
            r#"
            SELECT {SESSION_COLUMNS} FROM sessions
            WHERE identity_id = $1 AND is_active = TRUE AND expires_at > $2
            ORDER BY created_at DESC
            "#
        ))
        .bind(identity_id.as_uuid())
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|r| r.into_session()).collect())
    }

    async fn invalidate_by_token(&self, token: &str) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE sessions SET is_active = FALSE WHERE token = $1 AND is_active = TRUE",
        )
        .bind(token)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn invalidate_by_id(&self, session_id: Uuid) -> AuthResult<bool> {
        let updated = sqlx::query(
            "UPDATE sessions SET is_active = FALSE WHERE id = $1 AND is_active = TRUE",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn invalidate_all_for_user(
        &self,
        identity_id: &UserId,
        except: Option<Uuid>,
    ) -> AuthResult<u64> {
        let revoked = match except {
            Some(keep) => {
                sqlx::query(
                    r#"
                    UPDATE sessions SET is_active = FALSE
                    WHERE identity_id = $1 AND is_active = TRUE AND id != $2
                    "#,
                )
                .bind(identity_id.as_uuid())
                .bind(keep)
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
            None => {
                sqlx::query(
                    "UPDATE sessions SET is_active = FALSE WHERE identity_id = $1 AND is_active = TRUE",
                )
                .bind(identity_id.as_uuid())
                .execute(&self.pool)
                .await?
                .rows_affected()
            }
        };

        Ok(revoked)
    }

    async fn touch(&self, session_id: Uuid, now: DateTime<Utc>) -> AuthResult<()> {
        sqlx::query("UPDATE sessions SET last_seen_at = $2 WHERE id = $1")
            .bind(session_id)
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn cleanup_expired(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct IdentityRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    role: i16,
    is_active: bool,
    email_verified: bool,
    verification_token_hash: Option<String>,
    verification_expires_at: Option<DateTime<Utc>>,
    login_failed_count: i32,
    locked_until: Option<DateTime<Utc>>,
    password_changed_at: Option<DateTime<Utc>>,
    last_login_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl IdentityRow {
    fn into_identity(self) -> AuthResult<Identity> {
        let password_hash = platform::password::HashedPassword::from_phc_string(self.password_hash)
            .map_err(|e| AuthError::Internal(format!("Invalid stored password hash: {}", e)))?;

        Ok(Identity {
            id: UserId::from_uuid(self.id),
            username: Username::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash,
            role: Role::from_id(self.role),
            is_active: self.is_active,
            email_verified: self.email_verified,
            verification_token_hash: self.verification_token_hash,
            verification_expires_at: self.verification_expires_at,
            login_failed_count: self.login_failed_count,
            locked_until: self.locked_until,
            password_changed_at: self.password_changed_at,
            last_login_at: self.last_login_at,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    identity_id: Uuid,
    token: String,
    ip: Option<String>,
    user_agent: Option<String>,
    is_active: bool,
    expires_at: DateTime<Utc>,
    last_seen_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            id: self.id,
            identity_id: UserId::from_uuid(self.identity_id),
            token: self.token,
            ip: self.ip,
            user_agent: self.user_agent,
            is_active: self.is_active,
            expires_at: self.expires_at,
            last_seen_at: self.last_seen_at,
            created_at: self.created_at,
        }
    }
}
