#![deny(unused)]
//! HTTP gateway for WordLens.
//!
//! This crate provides the analysis endpoint, including request-shape
//! dispatch, the analysis pipeline and error mapping.

pub mod error;
pub mod multipart;
pub mod server;
pub mod service;
pub mod telemetry;

pub use error::ApiError;
pub use server::{AppState, GatewayServer, ALLOWED_HEADERS};
pub use service::AnalysisService;
pub use telemetry::configure_tracing;
