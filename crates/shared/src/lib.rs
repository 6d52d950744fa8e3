//! Shared errors, configuration, and session tokens for Leadboard.
//!
//! This crate provides common types used across all other crates:
//! - Application-wide error types
//! - Layered configuration
//! - JWT session tokens and auth payloads

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;

pub use auth::{Claims, Role};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
pub use jwt::{JwtConfig, JwtError, JwtService};
