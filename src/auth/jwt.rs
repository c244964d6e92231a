//! JWT token generation and validation
//!
//! Issues the access/refresh token pair and verifies presented tokens.
//! The two kinds share one claim shape but are signed with distinct
//! secrets, so a token presented to the wrong verification path fails
//! signature validation.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Token verification and signing errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum JwtError {
    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token signing failed")]
    SigningFailed,
}

/// Signing configuration, built once at startup and passed by reference.
#[derive(Debug, Clone)]
pub struct TokenConfig {
    pub access_secret: String,
    pub refresh_secret: String,
    pub access_ttl_seconds: i64,
    pub refresh_ttl_days: i64,
}

impl TokenConfig {
    pub fn new(access_secret: String, refresh_secret: String) -> Self {
        Self {
            access_secret,
            refresh_secret,
            access_ttl_seconds: 86_400,
            refresh_ttl_days: 7,
        }
    }
}

/// Signed payload shared by both token kinds
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Account email at issuance time
    pub email: String,
    /// Unique token ID; keeps two issuances within the same second distinct
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// The access/refresh pair returned to the caller. Never persisted; only
/// the refresh token's bcrypt fingerprint is stored.
#[derive(Debug, Serialize, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn sign_token(
    user_id: Uuid,
    email: &str,
    secret: &str,
    ttl_seconds: i64,
) -> Result<String, JwtError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(ttl_seconds);

    let claims = Claims {
        sub: user_id.to_string(),
        email: email.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| JwtError::SigningFailed)
}

/// Issue a signed access/refresh token pair for a user.
///
/// The two signings have no data dependency and run concurrently; overall
/// latency is the max of the two.
pub async fn issue_token_pair(
    config: &TokenConfig,
    user_id: Uuid,
    email: &str,
) -> Result<TokenPair, JwtError> {
    let access = {
        let secret = config.access_secret.clone();
        let email = email.to_owned();
        let ttl = config.access_ttl_seconds;
        tokio::task::spawn_blocking(move || sign_token(user_id, &email, &secret, ttl))
    };

    let refresh = {
        let secret = config.refresh_secret.clone();
        let email = email.to_owned();
        let ttl = config.refresh_ttl_days * 24 * 60 * 60;
        tokio::task::spawn_blocking(move || sign_token(user_id, &email, &secret, ttl))
    };

    let (access_token, refresh_token) =
        tokio::try_join!(access, refresh).map_err(|_| JwtError::SigningFailed)?;

    Ok(TokenPair {
        access_token: access_token?,
        refresh_token: refresh_token?,
    })
}

/// Verify and decode a token against the given kind's secret.
///
/// `TokenExpired` is semantically distinct from `TokenInvalid`: callers may
/// treat an expired access token as a prompt for the refresh flow, while an
/// invalid token is always fatal to the request.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let validation = Validation::default();

    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => JwtError::TokenExpired,
        _ => JwtError::TokenInvalid,
    })?;

    Ok(token_data.claims)
}

/// Extract the user ID from verified claims.
pub fn user_id_from_claims(claims: &Claims) -> Result<Uuid, JwtError> {
    Uuid::parse_str(&claims.sub).map_err(|_| JwtError::TokenInvalid)
}
