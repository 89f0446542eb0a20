#![deny(unused)]
//! WordLens - image-to-vocabulary analysis service
//!
//! Accepts an image by URL or upload, asks a multimodal model which objects it
//! shows, and returns each as a word with a definition and a sample sentence.

use std::sync::Arc;

use wordlens_core::config::{AppConfig, InputMode};
use wordlens_core::traits::VisionClient;
use wordlens_gateway::{AnalysisService, GatewayServer};
use wordlens_model_gateway::OpenAiVisionClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load()?;
    config.validate()?;

    wordlens_gateway::configure_tracing(&config.logging);

    tracing::info!("Starting WordLens v{}", env!("CARGO_PKG_VERSION"));

    // =========================================================================
    // Storage
    // =========================================================================
    let store = wordlens_store::build_object_store(&config.storage).await?;
    tracing::info!(backend = ?config.storage.backend, "Object store initialized");

    let repository = wordlens_store::build_repository(&config.persistence)?;

    // =========================================================================
    // Model
    // =========================================================================
    let vision: Arc<dyn VisionClient> = Arc::new(OpenAiVisionClient::new(&config.model)?);
    tracing::info!(
        base_url = %config.model.base_url,
        model = %vision.model(),
        timeout_secs = config.model.timeout_secs,
        "Vision client initialized"
    );

    // =========================================================================
    // Gateway
    // =========================================================================
    let mut service = AnalysisService::new(vision, store)
        .with_parse_policy(config.analysis.parse_failure_policy);
    if let Some(repository) = repository {
        service = service.with_repository(repository, config.persistence.mode);
    }

    let server = GatewayServer::new(
        config.server.clone(),
        config.gateway.clone(),
        Arc::new(service),
    );

    let body_shape = match config.gateway.input_mode {
        InputMode::Json => "{ \"image\": \"<url>\" }",
        InputMode::Multipart => "multipart/form-data, field 'file'",
    };

    println!();
    println!("WordLens v{}", env!("CARGO_PKG_VERSION"));
    println!("  GET  /health          health check");
    println!("  POST /                analyze an image ({})", body_shape);
    println!("  POST /analyze-image   same as POST /");
    println!("  Server: http://{}:{}", config.server.host, config.server.port);
    println!();

    server.run().await?;

    Ok(())
}
