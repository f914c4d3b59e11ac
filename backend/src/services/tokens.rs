use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::clock::Clock;
use crate::config::JwtConfig;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
    #[error("Token signing failed: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

/// Claims carried by both access and refresh tokens.
///
/// The two tokens minted for one session share `jti`; only the signing
/// secret and lifetime differ.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub email: String,
    pub jti: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Fresh session identifier, shared by the access/refresh pair it names.
pub fn new_jti() -> String {
    Uuid::new_v4().to_string()
}

struct KeyPair {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl KeyPair {
    fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }
}

/// Mints and validates HS256 tokens with separate access and refresh secrets.
pub struct TokenIssuer {
    access: KeyPair,
    refresh: KeyPair,
    clock: Arc<dyn Clock>,
}

impl TokenIssuer {
    pub fn new(config: &JwtConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            access: KeyPair::new(&config.secret, Duration::hours(config.expire_hours)),
            refresh: KeyPair::new(
                &config.refresh_secret,
                Duration::hours(config.refresh_expire_hours),
            ),
            clock,
        }
    }

    pub fn issue_access(&self, user_id: &Uuid, email: &str, jti: &str) -> Result<IssuedToken, TokenError> {
        self.issue(&self.access, user_id, email, jti)
    }

    pub fn issue_refresh(&self, user_id: &Uuid, email: &str, jti: &str) -> Result<IssuedToken, TokenError> {
        self.issue(&self.refresh, user_id, email, jti)
    }

    pub fn validate_access(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(&self.access, token)
    }

    pub fn validate_refresh(&self, token: &str) -> Result<Claims, TokenError> {
        self.validate(&self.refresh, token)
    }

    fn issue(&self, keys: &KeyPair, user_id: &Uuid, email: &str, jti: &str) -> Result<IssuedToken, TokenError> {
        let now = self.clock.now();
        let expires_at = now + keys.ttl;

        let claims = Claims {
            user_id: *user_id,
            email: email.to_string(),
            jti: jti.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &keys.encoding)
            .map_err(TokenError::Signing)?;

        Ok(IssuedToken { token, expires_at })
    }

    fn validate(&self, keys: &KeyPair, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked below against the injected clock, with no leeway.
        validation.validate_exp = false;
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &keys.decoding, &validation)
            .map_err(|_| TokenError::Invalid)?
            .claims;

        if claims.exp <= self.clock.now().timestamp() {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }
}
