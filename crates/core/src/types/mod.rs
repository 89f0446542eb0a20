//! Core type definitions for WordLens.
//!
//! Shared by the analysis service, the storage backends and the upload client.

pub mod analysis;
pub mod upload;

pub use analysis::*;
pub use upload::*;
