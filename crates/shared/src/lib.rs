//! Shared types, errors, and configuration for Finboard.
//!
//! This crate provides common types used across all other crates:
//! - Typed IDs for tenant-scoped entity references
//! - Application-wide error types
//! - Configuration management
//! - JWT claims and bearer token validation

pub mod auth;
pub mod config;
pub mod error;
pub mod jwt;
pub mod types;

pub use auth::Claims;
pub use config::{AppConfig, DashboardConfig, DatabaseConfig, JwtSettings, ServerConfig};
pub use error::AppError;
pub use jwt::{JwtConfig, JwtError, JwtService};
pub use types::OwnerId;
