//! Presentation Layer
//!
//! HTTP surface: DTOs, handlers, routers and the request guard.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;
