//! HTTP Handlers

use axum::extract::{Extension, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use std::sync::Arc;
use uuid::Uuid;

use platform::client::extract_client_info;
use platform::clock::Clock;

use crate::application::{
    AdminUseCase, AuthConfig, AuthContext, ChangePasswordInput, ChangePasswordUseCase,
    ListSessionsUseCase, RevokeSessionUseCase, SignInInput, SignInUseCase, SignOutAllUseCase,
    SignOutUseCase, SignUpInput, SignUpUseCase, VerifyEmailUseCase,
};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::domain::value_object::{Role, UserId};
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    ChangePasswordRequest, ChangePasswordResponse, ChangeRoleRequest, LoginRequest, LoginResponse,
    LogoutAllResponse, MessageResponse, SessionListResponse, SessionResponse, SignUpRequest,
    SignUpResponse, UserListResponse, UserResponse,
};
use crate::token::TokenCodec;

/// Shared state for auth handlers and middleware
pub struct AuthAppState<C, S, M>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    pub credentials: Arc<C>,
    pub sessions: Arc<S>,
    pub mailer: Arc<M>,
    pub codec: Arc<TokenCodec>,
    pub config: Arc<AuthConfig>,
    pub clock: Arc<dyn Clock>,
}

// Manual Clone: the derive would demand C/S/M themselves be Clone
impl<C, S, M> Clone for AuthAppState<C, S, M>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            credentials: self.credentials.clone(),
            sessions: self.sessions.clone(),
            mailer: self.mailer.clone(),
            codec: self.codec.clone(),
            config: self.config.clone(),
            clock: self.clock.clone(),
        }
    }
}

// ============================================================================
// Sign Up / Verify
// ============================================================================

/// POST /auth/signup
pub async fn sign_up<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Json(req): Json<SignUpRequest>,
) -> AuthResult<impl IntoResponse>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignUpUseCase::new(
        state.credentials.clone(),
        state.mailer.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(SignUpInput {
            username: req.username,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(SignUpResponse {
            id: output.user_id.into_uuid(),
            email: output.email.to_string(),
            message: "Account created. Check your email to verify your address.".to_string(),
        }),
    ))
}

/// GET /auth/verify/{token}
pub async fn verify_email<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Path(token): Path<String>,
) -> AuthResult<Json<MessageResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = VerifyEmailUseCase::new(state.credentials.clone(), state.clock.clone());
    use_case.execute(&token).await?;

    Ok(Json(MessageResponse::new(
        "Email verified. You can now log in.",
    )))
}

// ============================================================================
// Login / Logout
// ============================================================================

/// POST /auth/login
pub async fn login<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    headers: HeaderMap,
    axum::extract::ConnectInfo(addr): axum::extract::ConnectInfo<std::net::SocketAddr>,
    Json(req): Json<LoginRequest>,
) -> AuthResult<Json<LoginResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let client = extract_client_info(&headers, Some(addr.ip()));

    let use_case = SignInUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.config.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(
            SignInInput {
                identifier: req.identifier,
                password: req.password,
            },
            client,
        )
        .await?;

    Ok(Json(LoginResponse {
        token: output.token,
        user: UserResponse::from_identity(&output.identity),
    }))
}

/// POST /auth/logout
///
/// Takes the bearer token directly rather than going through the session
/// guard: logging out an already-revoked session must succeed as a no-op.
pub async fn logout<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    headers: HeaderMap,
) -> AuthResult<Json<MessageResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let token = crate::presentation::middleware::extract_bearer(&headers)
        .ok_or(AuthError::MissingToken)?;

    let use_case = SignOutUseCase::new(state.sessions.clone());
    use_case.execute(token).await?;

    Ok(Json(MessageResponse::new("Logged out")))
}

/// POST /auth/logout-all
pub async fn logout_all<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
) -> AuthResult<Json<LogoutAllResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = SignOutAllUseCase::new(state.sessions.clone());
    let revoked = use_case.execute(&ctx.identity.id).await?;

    Ok(Json(LogoutAllResponse {
        revoked_sessions: revoked,
        message: "Logged out everywhere".to_string(),
    }))
}

// ============================================================================
// Current User
// ============================================================================

/// GET /auth/me
pub async fn me(Extension(ctx): Extension<AuthContext>) -> Json<UserResponse> {
    Json(UserResponse::from_identity(&ctx.identity))
}

/// PUT /auth/password
pub async fn change_password<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
    Json(req): Json<ChangePasswordRequest>,
) -> AuthResult<Json<ChangePasswordResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ChangePasswordUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.clock.clone(),
    );

    let output = use_case
        .execute(
            &ctx.identity.id,
            ctx.session.id,
            ChangePasswordInput {
                current_password: req.current_password,
                new_password: req.new_password,
            },
        )
        .await?;

    Ok(Json(ChangePasswordResponse {
        revoked_sessions: output.revoked_sessions,
        message: "Password changed. Other sessions have been signed out.".to_string(),
    }))
}

// ============================================================================
// Session Management
// ============================================================================

/// GET /auth/sessions
pub async fn list_sessions<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
) -> AuthResult<Json<SessionListResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = ListSessionsUseCase::new(state.sessions.clone(), state.clock.clone());
    let sessions = use_case.execute(&ctx.identity.id).await?;

    Ok(Json(SessionListResponse {
        sessions: sessions
            .iter()
            .map(|s| SessionResponse::from_session(s, ctx.session.id))
            .collect(),
    }))
}

/// DELETE /auth/sessions/{id}
pub async fn revoke_session<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
    Path(session_id): Path<Uuid>,
) -> AuthResult<Json<MessageResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = RevokeSessionUseCase::new(state.sessions.clone());
    use_case.execute(&ctx.identity.id, session_id).await?;

    Ok(Json(MessageResponse::new("Session revoked")))
}

// ============================================================================
// Admin
// ============================================================================

/// GET /admin/users
pub async fn admin_list_users<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
) -> AuthResult<Json<UserListResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let use_case = AdminUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.clock.clone(),
    );
    let users = use_case.list_users().await?;

    Ok(Json(UserListResponse {
        users: users.iter().map(UserResponse::from_identity).collect(),
    }))
}

/// PUT /admin/users/{id}/role
pub async fn admin_change_role<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
    Json(req): Json<ChangeRoleRequest>,
) -> AuthResult<Json<UserResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let role = Role::from_code(&req.role)?;
    let target_id = UserId::from_uuid(user_id);

    let use_case = AdminUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.clock.clone(),
    );
    let updated = use_case
        .change_role(&ctx.identity.id, &target_id, role)
        .await?;

    Ok(Json(UserResponse::from_identity(&updated)))
}

/// DELETE /admin/users/{id}
pub async fn admin_delete_user<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    Extension(ctx): Extension<AuthContext>,
    Path(user_id): Path<Uuid>,
) -> AuthResult<Json<MessageResponse>>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let target_id = UserId::from_uuid(user_id);

    let use_case = AdminUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.clock.clone(),
    );
    use_case.delete_user(&ctx.identity.id, &target_id).await?;

    Ok(Json(MessageResponse::new("User deleted")))
}
