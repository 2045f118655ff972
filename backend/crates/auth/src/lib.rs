//! Auth (Authentication & Session Management) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, store traits
//! - `application/` - Use cases
//! - `infra/` - PostgreSQL and in-memory store implementations
//! - `presentation/` - HTTP handlers, DTOs, routers
//!
//! ## Features
//! - Signup with email verification, login by username or email
//! - Signed bearer tokens backed by revocable server-side sessions
//! - Automatic lockout after repeated failed logins
//! - Per-device session listing and revocation
//! - Role-based admin surface (list users, change roles, delete)
//!
//! ## Security Model
//! - Passwords hashed with Argon2id (NIST SP 800-63B compliant)
//! - Verification secrets stored hashed; the raw secret is only mailed
//! - Tokens carry no expiry; the server-side session decides access
//! - Lockout counting happens atomically at the store level

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;
pub mod token;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::config::AuthConfig;
pub use error::{AuthError, AuthResult};
pub use infra::{MemoryAuthStore, PgAuthStore};
pub use presentation::router::{admin_router, auth_router};
pub use token::TokenCodec;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod handlers {
    pub use crate::presentation::handlers::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAuthStore as AuthStore;
}

pub mod router {
    pub use crate::presentation::router::*;
}

pub mod middleware {
    pub use crate::presentation::middleware::*;
}
