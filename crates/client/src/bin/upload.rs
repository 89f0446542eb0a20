//! `wordlens-upload`: send one image to the analysis endpoint and print the
//! identified words.

use anyhow::{Context, Result};
use clap::Parser;
use secrecy::Secret;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use wordlens_client::{
    ClientMode, FileCandidate, FileEvent, HttpAnalysisTransport, StdoutSink, StoreUploader,
    UploadController,
};
use wordlens_core::config::AppConfig;

#[derive(Parser)]
#[command(name = "wordlens-upload")]
#[command(about = "Upload an image and list the words found in it", long_about = None)]
struct Cli {
    /// Image file to analyze
    file: PathBuf,

    /// Analysis endpoint
    #[arg(short, long, default_value = "http://localhost:3000/")]
    endpoint: String,

    /// Declared content type (default: guessed from the extension)
    #[arg(long)]
    content_type: Option<String>,

    /// Store the image first (shared s3 backend) and send its public URL instead of the bytes
    #[arg(long)]
    pre_upload: bool,

    /// Key sent as `Authorization` and `apikey`
    #[arg(long)]
    api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value = "90")]
    timeout: u64,

    /// Print the raw response envelope as JSON
    #[arg(long)]
    json: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut transport = HttpAnalysisTransport::new(&cli.endpoint, Duration::from_secs(cli.timeout))?;
    if let Some(key) = cli.api_key {
        transport = transport.with_api_key(Secret::new(key));
    }

    let mode = if cli.pre_upload {
        let config = AppConfig::load().context("Failed to load configuration")?;
        config.validate()?;
        let uploader = StoreUploader::from_config(&config.storage).await?;
        ClientMode::PreUpload(Arc::new(uploader))
    } else {
        ClientMode::Inline
    };

    let mut controller = UploadController::new(mode, Arc::new(transport));
    if !cli.json {
        controller = controller.with_sink(Arc::new(StdoutSink));
    }

    let file = FileCandidate::from_path(&cli.file, cli.content_type).await?;
    let envelope = controller
        .handle_event(FileEvent::Picked(file))
        .await?
        .context("No file selected")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&envelope)?);
    } else if let Some(warning) = &envelope.warning {
        eprintln!("warning: {}", warning);
    }

    Ok(())
}
