//! Bearer token issue and verification (HS256 JWT).
//!
//! The signing secret and token lifetime are resolved at startup into [`AuthConfig`]; nothing
//! here reads the environment.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("missing bearer token")]
    MissingToken,
    #[error("invalid token: {0}")]
    InvalidToken(jsonwebtoken::errors::Error),
    #[error("failed to sign token: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("invalid auth configuration: {0}")]
    Config(String),
}

pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Signing configuration resolved at startup.
#[derive(Clone)]
pub struct AuthConfig {
    secret: Vec<u8>,
    token_ttl: Duration,
}

impl AuthConfig {
    const MIN_SECRET_LEN: usize = 16;

    pub fn new(secret: &str, token_ttl: Duration) -> AuthResult<Self> {
        if secret.len() < Self::MIN_SECRET_LEN {
            return Err(AuthError::Config(format!(
                "JWT secret must be at least {} bytes",
                Self::MIN_SECRET_LEN
            )));
        }
        if token_ttl.is_zero() {
            return Err(AuthError::Config("token lifetime must be non-zero".into()));
        }

        Ok(Self {
            secret: secret.as_bytes().to_vec(),
            token_ttl,
        })
    }

    pub fn token_ttl(&self) -> Duration {
        self.token_ttl
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

/// Claims carried by a session token.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub name: String,
    pub iat: i64,
    pub exp: i64,
}

/// Signs a token for the given account.
pub fn issue_token(
    cfg: &AuthConfig,
    user_id: Uuid,
    email: &str,
    role: &str,
    name: &str,
) -> AuthResult<String> {
    let now = Utc::now().timestamp();
    let ttl = i64::try_from(cfg.token_ttl.as_secs())
        .map_err(|_| AuthError::Config("token lifetime too large".into()))?;

    let claims = Claims {
        sub: user_id,
        email: email.to_string(),
        role: role.to_string(),
        name: name.to_string(),
        iat: now,
        exp: now.saturating_add(ttl),
    };

    encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(&cfg.secret),
    )
    .map_err(AuthError::Signing)
}

/// Verifies signature and expiry and returns the claims.
pub fn verify_token(cfg: &AuthConfig, token: &str) -> AuthResult<Claims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;

    decode::<Claims>(token, &DecodingKey::from_secret(&cfg.secret), &validation)
        .map(|data| data.claims)
        .map_err(AuthError::InvalidToken)
}

/// Extracts the token from an `Authorization` header value of the form `Bearer <token>`.
pub fn bearer_token(header_value: &str) -> AuthResult<&str> {
    let mut parts = header_value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Ok(token),
        _ => Err(AuthError::MissingToken),
    }
}
