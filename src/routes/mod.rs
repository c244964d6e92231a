//! Route tables

mod auth;

pub use auth::auth_routes;
