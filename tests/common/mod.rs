//! Shared test fixtures: an in-memory user store standing in for Postgres.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use authgate::auth::{AuthService, StoreError, TokenConfig, UserStore};
use authgate::models::User;

/// In-memory user store with the same uniqueness semantics as the Postgres
/// adapter.
#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<HashMap<Uuid, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a row directly, bypassing sign-up (e.g. an unprovisioned
    /// account with no password hash).
    pub fn insert_raw(&self, user: User) {
        self.users.lock().unwrap().insert(user.id, user);
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();

        if users.values().any(|u| u.email == email) {
            return Err(StoreError::UniqueViolation);
        }

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: Some(password_hash.to_string()),
            refresh_hash: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn set_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> Result<(), StoreError> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.get_mut(&id) {
            user.refresh_hash = hash.map(|h| h.to_string());
            user.updated_at = Utc::now();
        }
        Ok(())
    }
}

pub fn test_service() -> (Arc<MemoryUserStore>, AuthService) {
    let store = Arc::new(MemoryUserStore::new());
    let tokens = TokenConfig::new("test-access-secret".to_string(), "test-refresh-secret".to_string());
    let service = AuthService::new(store.clone(), tokens);
    (store, service)
}

pub fn make_unprovisioned_user(email: &str) -> User {
    let now = Utc::now();
    User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: None,
        refresh_hash: None,
        created_at: now,
        updated_at: now,
    }
}
