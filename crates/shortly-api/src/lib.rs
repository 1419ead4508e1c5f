//! Axum HTTP API server.
//!
//! This crate provides:
//! - Trigger, result, metadata, callback and job status endpoints
//! - Inline, queued and workflow dispatch of summary requests
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use config::{ApiConfig, DispatchMode};
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
