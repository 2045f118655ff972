//! Domain Layer
//!
//! Entities, value objects and the store/mailer traits the application
//! layer is written against.

pub mod entity;
pub mod mailer;
pub mod repository;
pub mod value_object;
