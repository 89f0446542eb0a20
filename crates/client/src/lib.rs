#![deny(unused)]
//! Upload client for WordLens.
//!
//! This crate provides:
//! - the upload session state machine and its controller
//! - an HTTP transport for the analysis endpoint
//! - a content uploader for pre-upload deployments
//! - plain-text rendering of results

pub mod controller;
pub mod render;
pub mod state;
pub mod transport;
pub mod uploader;

pub use controller::{ClientMode, UploadController};
pub use render::{render_results, DisplaySink, StdoutSink, NO_RESULTS};
pub use state::{FileCandidate, FileEvent, PreviewRef, UploadSession, UploadState};
pub use transport::{AnalysisTransport, HttpAnalysisTransport};
pub use uploader::{ContentUploader, StoreUploader};
