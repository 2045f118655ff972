//! Session Token Codec
//!
//! Signed bearer tokens (HS256 JWT) carrying the user id. The token itself
//! never expires: it is a stable session handle, and access control lives in
//! the server-side session row. Revoking the session row revokes the token.

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Claims embedded in a session token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id the token was issued to
    pub sub: Uuid,
    /// Session id the token is bound to
    ///
    /// Makes every token unique even for same-second logins by the same
    /// user, and lets the resolver check token and session row agree.
    pub jti: Uuid,
    /// Issued-at (Unix seconds)
    pub iat: i64,
    /// Optional expiry (Unix seconds); absent for session-bound tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,
}

/// Token decode errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TokenError {
    /// Token is not a structurally valid JWT
    #[error("Malformed token")]
    Malformed,

    /// Signature does not match
    #[error("Invalid token signature")]
    BadSignature,

    /// Token carried an `exp` claim that has passed
    #[error("Token expired")]
    Expired,

    /// Signing failed
    #[error("Token signing failed")]
    SigningFailed,
}

/// Encoder/decoder for session tokens
///
/// Holds the derived signing keys so they are computed once at startup.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl TokenCodec {
    /// Create a codec from the shared signing secret
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Tokens without `exp` are valid by design; when `exp` is present
        // it is still enforced.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Sign a token for the given user and session
    pub fn sign(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        issued_at: DateTime<Utc>,
    ) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            jti: session_id,
            iat: issued_at.timestamp(),
            exp: None,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|_| TokenError::SigningFailed)
    }

    /// Verify a token and return its claims
    ///
    /// Checks structure and signature; an `exp` claim, if present, is
    /// checked against `now`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => TokenError::BadSignature,
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            }
        })?;

        if let Some(exp) = data.claims.exp {
            if exp <= now.timestamp() {
                return Err(TokenError::Expired);
            }
        }

        Ok(data.claims)
    }
}
