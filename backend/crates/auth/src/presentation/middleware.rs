//! Request Guard Middleware
//!
//! Bearer-token authentication for protected routes. On success a typed
//! [`AuthContext`] lands in the request extensions for handlers to read.

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Request, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::application::resolve_session::{AuthContext, ResolveSessionUseCase};
use crate::domain::mailer::Mailer;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::error::{AuthError, AuthResult};
use crate::presentation::handlers::AuthAppState;

/// Pull the bearer token out of the Authorization header
pub fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Resolve the request's bearer token into an authenticated context
async fn resolve<C, S, M>(
    state: &AuthAppState<C, S, M>,
    headers: &HeaderMap,
) -> AuthResult<AuthContext>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let token = extract_bearer(headers).ok_or(AuthError::MissingToken)?;

    let use_case = ResolveSessionUseCase::new(
        state.credentials.clone(),
        state.sessions.clone(),
        state.codec.clone(),
        state.clock.clone(),
    );
    let ctx = use_case.execute(token).await?;

    // Activity tracking must not add latency to the request path
    let sessions = state.sessions.clone();
    let session_id = ctx.session.id;
    let now = state.clock.now();
    tokio::spawn(async move {
        if let Err(e) = sessions.touch(session_id, now).await {
            tracing::debug!(error = %e, session_id = %session_id, "Session touch failed");
        }
    });

    Ok(ctx)
}

/// Require a valid session; 401/403 otherwise
pub async fn require_auth<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let ctx = resolve(&state, req.headers())
        .await
        .map_err(|e| e.into_response())?;

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Require a valid session owned by an admin
pub async fn require_admin<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, Response>
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let ctx = resolve(&state, req.headers())
        .await
        .map_err(|e| e.into_response())?;

    if !ctx.identity.role.is_admin() {
        return Err(AuthError::PermissionDenied.into_response());
    }

    req.extensions_mut().insert(ctx);
    Ok(next.run(req).await)
}

/// Attach the context when a valid session is present; never rejects
pub async fn attach_auth<C, S, M>(
    State(state): State<AuthAppState<C, S, M>>,
    mut req: Request<Body>,
    next: Next,
) -> Response
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    if let Ok(ctx) = resolve(&state, req.headers()).await {
        req.extensions_mut().insert(ctx);
    }

    next.run(req).await
}
