//! Petal Server
//!
//! HTTP surface for the Petal classifier: `GET /iris?data=a,b,c,d` returns the
//! predicted iris species and per-class probabilities. `/health` reports model
//! readiness and `/metrics` serves Prometheus metrics.
//!
//! The binary binds first and loads the model in the background; requests
//! that arrive before the model is ready get 503.

pub mod cli;
pub mod config;
pub mod routes;
pub mod state;

pub use cli::Cli;
pub use config::{ListenConfig, ServerConfig, TelemetryConfig};
pub use routes::{create_router, AppError};
pub use state::AppState;
