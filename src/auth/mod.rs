//! Authentication module
//!
//! Email/password authentication with a signed access/refresh token pair:
//! - bcrypt password and refresh-fingerprint hashing
//! - JWT issuance and validation with per-kind secrets
//! - single-active-refresh-token session rotation

pub mod jwt;
pub mod password;
mod service;
mod store;

pub use jwt::{issue_token_pair, verify_token, Claims, JwtError, TokenConfig, TokenPair};
pub use service::{AuthError, AuthService, UserProfile};
pub use store::{PgUserStore, StoreError, UserStore};
