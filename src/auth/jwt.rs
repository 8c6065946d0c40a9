//! JWT issuance and validation
//!
//! Two token kinds share one HS256 secret: short-lived access tokens for
//! protected endpoints and long-lived refresh tokens that can only mint new
//! access tokens. A token of the wrong kind is rejected.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::GardenError;

/// Token kind carried in the `token_type` claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Claims embedded in every token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub username: String,
    pub token_type: TokenKind,
    pub iat: u64,
    pub exp: u64,
    /// Unique token id
    pub jti: String,
}

/// Issues and verifies tokens
#[derive(Clone)]
pub struct JwtValidator {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    access_expiry_seconds: u64,
    refresh_expiry_seconds: u64,
}

impl JwtValidator {
    pub fn new(
        secret: &str,
        access_expiry_seconds: u64,
        refresh_expiry_seconds: u64,
    ) -> Result<Self, GardenError> {
        if secret.is_empty() {
            return Err(GardenError::Config("JWT secret must not be empty".into()));
        }

        let mut validation = Validation::default();
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            access_expiry_seconds,
            refresh_expiry_seconds,
        })
    }

    /// Issue a token of `kind` for a user
    pub fn generate_token(
        &self,
        user_id: &str,
        username: &str,
        kind: TokenKind,
    ) -> Result<String, GardenError> {
        let now = chrono::Utc::now().timestamp().max(0) as u64;
        let lifetime = match kind {
            TokenKind::Access => self.access_expiry_seconds,
            TokenKind::Refresh => self.refresh_expiry_seconds,
        };

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            token_type: kind,
            iat: now,
            exp: now + lifetime,
            jti: uuid::Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| GardenError::Auth(format!("Failed to sign token: {e}")))
    }

    /// Decode a token and check that it is of the expected kind
    pub fn verify_token(&self, token: &str, expected: TokenKind) -> Result<Claims, GardenError> {
        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            let message = match e.kind() {
                ErrorKind::ExpiredSignature => "Token has expired".to_string(),
                ErrorKind::InvalidSignature => "Signature verification failed".to_string(),
                _ => format!("Invalid token: {e}"),
            };
            GardenError::InvalidToken(message)
        })?;

        if data.claims.token_type != expected {
            return Err(GardenError::InvalidToken(format!(
                "Only {} tokens are allowed",
                expected
            )));
        }

        Ok(data.claims)
    }
}

/// Pull the token out of an `Authorization: Bearer <token>` header value
pub fn extract_token_from_header(header: Option<&str>) -> Option<&str> {
    header
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
