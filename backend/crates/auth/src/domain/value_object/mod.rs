//! Value Objects
//!
//! Validated wrapper types for domain values.

pub mod email;
pub mod role;
pub mod user_id;
pub mod username;

pub use email::Email;
pub use role::Role;
pub use user_id::UserId;
pub use username::Username;
