//! Authgate
//!
//! Email/password credential and session-token service: issues a signed
//! access/refresh JWT pair and enforces a single active refresh token per
//! user via a stored bcrypt fingerprint.

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
