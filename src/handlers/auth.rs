//! Authentication HTTP handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::auth::UserProfile;
use crate::error::{ApiError, ApiResult};
use crate::middleware::{AuthenticatedUser, RefreshUser};
use crate::models::{LogoutResponse, SignInRequest, SignUpRequest, TokenPairResponse};
use crate::state::AppState;

/// POST /auth/signup - Register a new account and return a token pair
pub async fn sign_up(
    State(state): State<AppState>,
    Json(req): Json<SignUpRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let pair = state.auth_service.sign_up(&req.email, &req.password).await?;

    Ok(Json(pair.into()))
}

/// POST /auth/signin - Authenticate and return a token pair
pub async fn sign_in(
    State(state): State<AppState>,
    Json(req): Json<SignInRequest>,
) -> ApiResult<Json<TokenPairResponse>> {
    req.validate()?;

    let pair = state.auth_service.sign_in(&req.email, &req.password).await?;

    Ok(Json(pair.into()))
}

/// POST /auth/refresh - Exchange a refresh token for a new pair
///
/// The Bearer token must be a refresh token; the extractor has already
/// checked its signature and expiry.
pub async fn refresh(
    State(state): State<AppState>,
    user: RefreshUser,
) -> ApiResult<Json<TokenPairResponse>> {
    let pair = state
        .auth_service
        .refresh(user.user_id, &user.refresh_token)
        .await?;

    Ok(Json(pair.into()))
}

/// POST /auth/logout - Clear the caller's active session
pub async fn logout(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> ApiResult<Json<LogoutResponse>> {
    let logged_out = state.auth_service.logout(user.user_id).await?;

    Ok(Json(LogoutResponse { logged_out }))
}

/// GET /auth/me - Current authenticated user
pub async fn me(
    State(state): State<AppState>,
    user: AuthenticatedUser,
) -> Result<Json<UserProfile>, ApiError> {
    let profile = state.auth_service.me(user.user_id).await?;

    Ok(Json(profile))
}
