//! Request/Response DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::entity::{Identity, Session};

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SignUpRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeRoleRequest {
    pub role: String,
}

// ============================================================================
// Responses
// ============================================================================

/// Public view of an identity (never includes the password hash)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role: String,
    pub email_verified: bool,
    pub is_active: bool,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            id: identity.id.into_uuid(),
            username: identity.username.to_string(),
            email: identity.email.to_string(),
            role: identity.role.to_string(),
            email_verified: identity.email_verified,
            is_active: identity.is_active,
            last_login_at: identity.last_login_at,
            created_at: identity.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub id: Uuid,
    pub email: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserResponse,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LogoutAllResponse {
    pub revoked_sessions: u64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChangePasswordResponse {
    pub revoked_sessions: u64,
    pub message: String,
}

/// One session in the device list
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub id: Uuid,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    /// Whether this is the session making the request
    pub current: bool,
    pub last_seen_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl SessionResponse {
    pub fn from_session(session: &Session, current_session_id: Uuid) -> Self {
        Self {
            id: session.id,
            ip: session.ip.clone(),
            user_agent: session.user_agent.clone(),
            current: session.id == current_session_id,
            last_seen_at: session.last_seen_at,
            expires_at: session.expires_at,
            created_at: session.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionListResponse {
    pub sessions: Vec<SessionResponse>,
}

#[derive(Debug, Serialize)]
pub struct UserListResponse {
    pub users: Vec<UserResponse>,
}
