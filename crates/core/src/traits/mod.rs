//! Core traits for WordLens.
//!
//! Traits sit at the seams where a provider is injected:
//! - `store`: object storage and result persistence
//! - `vision`: the multimodal inference client

pub mod store;
pub mod vision;

pub use store::*;
pub use vision::*;
