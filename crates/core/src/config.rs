use config::{Config, ConfigError, Environment, File};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Environment variable consulted when no inference key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub gateway: GatewayConfig,
    pub model: ModelConfig,
    pub analysis: AnalysisConfig,
    pub storage: StorageConfig,
    pub persistence: PersistenceConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Which request body shape the analysis endpoint accepts.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum InputMode {
    /// `{ "image": "<url>" }`
    #[default]
    Json,
    /// `multipart/form-data` with a `file` field.
    Multipart,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    pub input_mode: InputMode,
    pub enable_cors: bool,
    pub enable_tracing: bool,
    pub max_upload_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ModelConfig {
    pub base_url: String,
    pub model: String,
    pub api_key: Option<Secret<String>>,
    pub timeout_secs: u64,
    pub max_tokens: Option<u32>,
}

/// What to return when the model's reply is not a JSON array.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ParseFailurePolicy {
    /// A single placeholder item carrying the raw reply text.
    #[default]
    Fallback,
    /// An empty result list.
    Empty,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AnalysisConfig {
    pub parse_failure_policy: ParseFailurePolicy,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    #[default]
    Memory,
    S3,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: Option<String>,
    pub prefix: String,
    pub endpoint: Option<String>,
    pub public_base_url: Option<String>,
}

/// Persistence schema. The two table layouts are mutually exclusive.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum PersistenceMode {
    #[default]
    None,
    /// One row per word; insert failures are non-fatal.
    PerWord,
    /// One row per image with the list embedded; insert failures are fatal.
    PerImage,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PersistenceConfig {
    pub mode: PersistenceMode,
    pub sqlite_path: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct LoggingConfig {
    pub json: bool,
    pub filter: Option<String>,
}

impl AppConfig {
    pub fn load() -> std::result::Result<Self, ConfigError> {
        let env = std::env::var("WORDLENS_ENV").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(File::with_name("config/local").required(false))
            // Map APP__SERVER__PORT=3000 to server.port
            .add_source(Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Check combinations the types cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.storage.backend == StorageBackend::S3 && self.storage.bucket.is_none() {
            return Err(Error::config("storage.bucket is required for the s3 backend"));
        }
        if self.model.timeout_secs == 0 {
            return Err(Error::config("model.timeout_secs must be greater than zero"));
        }
        if self.gateway.max_upload_bytes == 0 {
            return Err(Error::config("gateway.max_upload_bytes must be greater than zero"));
        }
        Ok(())
    }
}

impl ModelConfig {
    /// Configured key, falling back to `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<Secret<String>> {
        if let Some(key) = &self.api_key {
            if !key.expose_secret().is_empty() {
                return Some(key.clone());
            }
        }
        std::env::var(OPENAI_API_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .map(Secret::new)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 3000,
        }
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            input_mode: InputMode::Json,
            enable_cors: true,
            enable_tracing: true,
            max_upload_bytes: 10 * 1024 * 1024, // 10MB
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            model: "gpt-4o-mini".into(),
            api_key: None,
            timeout_secs: 60,
            max_tokens: Some(1024),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            bucket: None,
            prefix: String::new(),
            endpoint: None,
            public_base_url: None,
        }
    }
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            mode: PersistenceMode::None,
            sqlite_path: None,
        }
    }
}
