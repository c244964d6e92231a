//! User store adapter
//!
//! Persistence contract for user records and the per-user refresh-token
//! fingerprint. The orchestrator depends on the [`UserStore`] trait only;
//! [`PgUserStore`] is the Postgres implementation. Uniqueness violations
//! surface as their own variant so callers never inspect engine-specific
//! error codes.

use async_trait::async_trait;
use sqlx::PgPool;
use thiserror::Error;
use uuid::Uuid;

use crate::models::User;

/// Store errors
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store's uniqueness constraint rejected an insert.
    #[error("Unique constraint violation")]
    UniqueViolation,

    /// Any other storage failure, propagated unchanged so the transport
    /// layer can classify it as an infrastructure error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence contract consumed by the auth orchestrator.
///
/// "Not found" is `Ok(None)`, never an error; the caller decides how to
/// surface it.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Insert a new user. Fails with [`StoreError::UniqueViolation`] when
    /// the email is already taken.
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    /// Overwrite the single refresh-token fingerprint for one user.
    /// `None` clears it; idempotent in both directions.
    async fn set_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> Result<(), StoreError>;
}

/// Postgres-backed user store
#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as(
            r#"
            INSERT INTO users (id, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, email, password_hash, refresh_hash, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if e.as_database_error()
                .is_some_and(|d| d.is_unique_violation())
            {
                StoreError::UniqueViolation
            } else {
                StoreError::Database(e)
            }
        })
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, refresh_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as(
            r#"
            SELECT id, email, password_hash, refresh_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn set_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> Result<(), StoreError> {
        match hash {
            Some(hash) => {
                sqlx::query(
                    r#"
                    UPDATE users
                    SET refresh_hash = $1, updated_at = NOW()
                    WHERE id = $2
                    "#,
                )
                .bind(hash)
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
            None => {
                // Conditioned on a non-null hash so logout with no active
                // session is a no-op write.
                sqlx::query(
                    r#"
                    UPDATE users
                    SET refresh_hash = NULL, updated_at = NOW()
                    WHERE id = $1 AND refresh_hash IS NOT NULL
                    "#,
                )
                .bind(id)
                .execute(&self.pool)
                .await?;
            }
        }

        Ok(())
    }
}
