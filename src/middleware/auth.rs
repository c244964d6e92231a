//! Authentication extractors
//!
//! Bearer-token verification for protected routes. [`AuthenticatedUser`]
//! checks a token against the access secret; [`RefreshUser`] checks against
//! the refresh secret and hands the raw token to the refresh flow.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::{jwt::user_id_from_claims, AuthService, JwtError};

/// Authenticated user extracted from a verified access token
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: Uuid,
    pub email: String,
}

/// Caller of the refresh flow: refresh-token signature and expiry verified,
/// stored-fingerprint check still pending in the service.
#[derive(Debug, Clone)]
pub struct RefreshUser {
    pub user_id: Uuid,
    pub refresh_token: String,
}

/// Error response for authentication failures
#[derive(Debug, Serialize)]
struct AuthRejection {
    error: AuthRejectionDetails,
}

#[derive(Debug, Serialize)]
struct AuthRejectionDetails {
    code: String,
    message: String,
}

impl AuthRejection {
    fn new(code: &str, message: &str) -> Self {
        Self {
            error: AuthRejectionDetails {
                code: code.to_string(),
                message: message.to_string(),
            },
        }
    }

    fn from_jwt_error(e: JwtError) -> Self {
        match e {
            JwtError::TokenExpired => Self::new("TOKEN_EXPIRED", "Token has expired"),
            _ => Self::new("INVALID_TOKEN", "Invalid token"),
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

async fn bearer_token<S: Send + Sync>(parts: &mut Parts, state: &S) -> Result<String, Response> {
    let TypedHeader(Authorization(bearer)) =
        TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
            .await
            .map_err(|_| {
                AuthRejection::new(
                    "MISSING_TOKEN",
                    "Authorization header with Bearer token required",
                )
                .into_response()
            })?;

    Ok(bearer.token().to_string())
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = auth_service
            .verify_access_token(&token)
            .map_err(|e| AuthRejection::from_jwt_error(e).into_response())?;

        let user_id = user_id_from_claims(&claims).map_err(|_| {
            AuthRejection::new("INVALID_TOKEN", "Invalid user ID in token").into_response()
        })?;

        Ok(AuthenticatedUser {
            user_id,
            email: claims.email,
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RefreshUser
where
    Arc<AuthService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts, state).await?;
        let auth_service = Arc::<AuthService>::from_ref(state);

        let claims = auth_service
            .verify_refresh_token(&token)
            .map_err(|e| AuthRejection::from_jwt_error(e).into_response())?;

        let user_id = user_id_from_claims(&claims).map_err(|_| {
            AuthRejection::new("INVALID_TOKEN", "Invalid user ID in token").into_response()
        })?;

        Ok(RefreshUser {
            user_id,
            refresh_token: token,
        })
    }
}
