//! Auth Routers

use axum::{
    Router, middleware,
    routing::{delete, get, post, put},
};
use std::sync::Arc;

use platform::clock::{Clock, SystemClock};

use crate::application::config::AuthConfig;
use crate::domain::mailer::Mailer;
use crate::domain::repository::{CredentialStore, SessionStore};
use crate::infra::{LogMailer, PgAuthStore};
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware as guard;
use crate::token::TokenCodec;

/// Build application state for the PostgreSQL store with log-only mail
pub fn pg_state(store: PgAuthStore, config: AuthConfig) -> AuthAppState<PgAuthStore, PgAuthStore, LogMailer> {
    let codec = Arc::new(TokenCodec::new(&config.token_secret));
    let store = Arc::new(store);
    AuthAppState {
        credentials: store.clone(),
        sessions: store,
        mailer: Arc::new(LogMailer),
        codec,
        config: Arc::new(config),
        clock: Arc::new(SystemClock) as Arc<dyn Clock>,
    }
}

/// Create the `/auth` router
pub fn auth_router<C, S, M>(state: AuthAppState<C, S, M>) -> Router
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    let guarded = Router::new()
        .route("/logout-all", post(handlers::logout_all::<C, S, M>))
        .route("/sessions", get(handlers::list_sessions::<C, S, M>))
        .route("/sessions/{id}", delete(handlers::revoke_session::<C, S, M>))
        .route("/me", get(handlers::me))
        .route("/password", put(handlers::change_password::<C, S, M>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_auth::<C, S, M>,
        ));

    Router::new()
        .route("/signup", post(handlers::sign_up::<C, S, M>))
        .route("/login", post(handlers::login::<C, S, M>))
        .route("/verify/{token}", get(handlers::verify_email::<C, S, M>))
        // Logout only needs the raw token; revoking twice is a no-op
        .route("/logout", post(handlers::logout::<C, S, M>))
        .merge(guarded)
        .with_state(state)
}

/// Create the `/admin` router (admin role required throughout)
pub fn admin_router<C, S, M>(state: AuthAppState<C, S, M>) -> Router
where
    C: CredentialStore + Send + Sync + 'static,
    S: SessionStore + Send + Sync + 'static,
    M: Mailer + Send + Sync + 'static,
{
    Router::new()
        .route("/users", get(handlers::admin_list_users::<C, S, M>))
        .route("/users/{id}/role", put(handlers::admin_change_role::<C, S, M>))
        .route("/users/{id}", delete(handlers::admin_delete_user::<C, S, M>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            guard::require_admin::<C, S, M>,
        ))
        .with_state(state)
}
