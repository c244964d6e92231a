//! Data models shared across the service

mod auth;

pub use auth::{LogoutResponse, SignInRequest, SignUpRequest, TokenPairResponse, User};
