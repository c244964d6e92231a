//! Authentication service
//!
//! Core business logic for email/password authentication: sign-up, sign-in,
//! refresh-token rotation, logout, and the current-user query. Composes the
//! password hasher, token issuer, and user store, and enforces the
//! single-active-refresh-token invariant.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use super::jwt::{issue_token_pair, JwtError, TokenConfig, TokenPair};
use super::password::{self, PasswordError};
use super::store::{StoreError, UserStore};
use crate::models::User;

/// Auth domain errors
///
/// All terminal for the current request; nothing is retried here. Variants
/// never carry plaintext passwords, stored hashes, or signing secrets.
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("This e-mail is already in use")]
    EmailInUse,

    #[error("E-mail not found")]
    EmailNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Access denied")]
    AccessDenied,

    #[error(transparent)]
    Token(#[from] JwtError),

    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Storage failures other than a uniqueness violation pass through
    /// unwrapped for the transport layer to classify.
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for AuthError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::UniqueViolation => AuthError::EmailInUse,
            other => AuthError::Store(other),
        }
    }
}

/// Minimal current-user view returned by [`AuthService::me`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub email: String,
}

/// Authentication orchestrator
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn UserStore>,
    tokens: TokenConfig,
}

impl AuthService {
    pub fn new(store: Arc<dyn UserStore>, tokens: TokenConfig) -> Self {
        Self { store, tokens }
    }

    /// Register a new account and open its first session.
    ///
    /// If persisting the refresh fingerprint fails after the insert, the
    /// created row remains without a session; the caller sees the error and
    /// the account is usable via sign-in.
    pub async fn sign_up(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let password_hash = password::hash(password).await?;

        let user = self.store.create_user(email, &password_hash).await?;

        tracing::info!(user_id = %user.id, "user registered");

        let pair = issue_token_pair(&self.tokens, user.id, &user.email).await?;
        self.rotate_refresh_hash(user.id, &pair.refresh_token)
            .await?;

        Ok(pair)
    }

    /// Authenticate with email and password.
    ///
    /// A missing stored hash and a non-matching password are deliberately
    /// indistinguishable to the caller.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<TokenPair, AuthError> {
        let user = self
            .store
            .find_by_email(email)
            .await?
            .ok_or(AuthError::EmailNotFound)?;

        let matches = match user.password_hash.as_deref() {
            Some(stored) => password::verify(stored, password).await,
            None => false,
        };
        if !matches {
            return Err(AuthError::InvalidCredentials);
        }

        let pair = issue_token_pair(&self.tokens, user.id, &user.email).await?;
        self.rotate_refresh_hash(user.id, &pair.refresh_token)
            .await?;

        Ok(pair)
    }

    /// Exchange a refresh token for a fresh pair, rotating the stored
    /// fingerprint. The presented token becomes permanently unusable the
    /// moment the new pair is issued, even if delivery fails downstream.
    pub async fn refresh(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<TokenPair, AuthError> {
        let user = self.provisioned_user(user_id).await?;

        let stored = user.refresh_hash.as_deref().ok_or(AuthError::AccessDenied)?;
        if !password::verify(stored, refresh_token).await {
            return Err(AuthError::AccessDenied);
        }

        let pair = issue_token_pair(&self.tokens, user.id, &user.email).await?;
        self.rotate_refresh_hash(user.id, &pair.refresh_token)
            .await?;

        Ok(pair)
    }

    /// Clear the stored refresh fingerprint. Idempotent: reports success
    /// whether or not a session existed.
    pub async fn logout(&self, user_id: Uuid) -> Result<bool, AuthError> {
        self.store.set_refresh_hash(user_id, None).await?;
        Ok(true)
    }

    /// Return `{id, email}` for a fully provisioned account.
    ///
    /// "Not found" and "found but unprovisioned" collapse into one error
    /// kind so account existence is not leaked.
    pub async fn me(&self, user_id: Uuid) -> Result<UserProfile, AuthError> {
        let user = self.provisioned_user(user_id).await?;

        Ok(UserProfile {
            id: user.id,
            email: user.email,
        })
    }

    /// Verify an access token presented by the transport layer.
    pub fn verify_access_token(&self, token: &str) -> Result<super::jwt::Claims, JwtError> {
        super::jwt::verify_token(token, &self.tokens.access_secret)
    }

    /// Verify a refresh token's signature and expiry (not its stored
    /// fingerprint; that is [`Self::refresh`]'s job).
    pub fn verify_refresh_token(&self, token: &str) -> Result<super::jwt::Claims, JwtError> {
        super::jwt::verify_token(token, &self.tokens.refresh_secret)
    }

    async fn provisioned_user(&self, user_id: Uuid) -> Result<User, AuthError> {
        let user = self
            .store
            .find_by_id(user_id)
            .await?
            .filter(|u| u.password_hash.is_some())
            .ok_or(AuthError::AccessDenied)?;

        Ok(user)
    }

    async fn rotate_refresh_hash(
        &self,
        user_id: Uuid,
        refresh_token: &str,
    ) -> Result<(), AuthError> {
        let hash = password::hash(refresh_token).await?;
        self.store.set_refresh_hash(user_id, Some(&hash)).await?;
        Ok(())
    }
}
