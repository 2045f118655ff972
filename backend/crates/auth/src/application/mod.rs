//! Application Layer
//!
//! Use cases orchestrating domain entities and stores.

pub mod admin;
pub mod change_password;
pub mod config;
pub mod resolve_session;
pub mod sessions;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;
pub mod verify_email;

pub use admin::AdminUseCase;
pub use change_password::{ChangePasswordInput, ChangePasswordOutput, ChangePasswordUseCase};
pub use config::AuthConfig;
pub use resolve_session::{AuthContext, ResolveSessionUseCase};
pub use sessions::{ListSessionsUseCase, RevokeSessionUseCase};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::{SignOutAllUseCase, SignOutUseCase};
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
pub use verify_email::{VerifyEmailOutput, VerifyEmailUseCase};
