//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, random bytes, Base64)
//! - Password hashing (Argon2id, deliberately slow, randomly salted)
//! - Client metadata extraction (IP, User-Agent)
//! - Injectable clock for time-dependent logic

pub mod client;
pub mod clock;
pub mod crypto;
pub mod password;
