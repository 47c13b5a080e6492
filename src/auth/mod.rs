use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config;
use crate::database::models::UserId;

const SECONDS_PER_HOUR: i64 = 3600;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Authenticated user id
    pub sub: UserId,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: UserId) -> Self {
        Self::expiring_in(user_id, config::config().security.jwt_expiry_hours)
    }

    /// Expiry saturates instead of wrapping when `hours` is out of range.
    pub fn expiring_in(user_id: UserId, hours: u64) -> Self {
        let iat = Utc::now().timestamp();
        let lifetime = i64::try_from(hours)
            .unwrap_or(i64::MAX)
            .saturating_mul(SECONDS_PER_HOUR);

        Self {
            sub: user_id,
            exp: iat.saturating_add(lifetime),
            iat,
        }
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT token: {0}")]
    InvalidToken(String),

    #[error("JWT secret not configured")]
    InvalidSecret,
}

fn secret() -> Result<&'static str, JwtError> {
    let secret = &config::config().security.jwt_secret;
    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }
    Ok(secret)
}

/// Sign a token for the given claims. The service only verifies tokens;
/// this is what an external issuer sharing the secret (or a test) uses.
pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let encoding_key = EncodingKey::from_secret(secret()?.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_jwt(token: &str) -> Result<Claims, JwtError> {
    let decoding_key = DecodingKey::from_secret(secret()?.as_bytes());

    decode::<Claims>(token, &decoding_key, &Validation::default())
        .map(|data| data.claims)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))
}
