#![deny(unused)]
//! Core types, traits, and error definitions for WordLens.
//!
//! This crate provides the building blocks shared by the analysis service,
//! the storage backends and the upload client.

pub mod config;
pub mod error;
pub mod mocks;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
pub use traits::*;
pub use types::*;
