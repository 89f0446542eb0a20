#![deny(unused)]
//! Model gateway for WordLens.
//!
//! This crate provides:
//! - the OpenAI-compatible vision client
//! - the fixed word-analysis instruction
//! - normalization of the model's reply into a result list

pub mod normalize;
pub mod openai;
pub mod prompt;

pub use normalize::{normalize, parse_analysis, NormalizedAnalysis, FALLBACK_DEFINITION, FALLBACK_WORD};
pub use openai::OpenAiVisionClient;
pub use prompt::{word_analysis_request, WORD_ANALYSIS_INSTRUCTION};
