//! Infrastructure Layer
//!
//! Concrete store and mailer implementations.

pub mod mailer;
pub mod memory;
pub mod postgres;

pub use mailer::LogMailer;
pub use memory::MemoryAuthStore;
pub use postgres::PgAuthStore;
