//! # API Shared
//!
//! Shared utilities and definitions for the RaktMap APIs.
//!
//! Contains:
//! - JSON wire types (`wire` module) with OpenAPI schemas
//! - Shared services like `HealthService`
//! - Bearer token issue and verification
//!
//! Used by `api-rest` and the workspace binary.

pub mod auth;
pub mod health;
pub mod wire;

pub use auth::{AuthConfig, AuthError, AuthResult, Claims};
pub use health::HealthService;
pub use wire::*;
