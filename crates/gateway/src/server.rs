//! Axum-based HTTP server for the analysis endpoint.

use axum::{
    extract::{DefaultBodyLimit, FromRequest, Json, Multipart, Request, State},
    http::{
        header::{ACCESS_CONTROL_ALLOW_HEADERS, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, HeaderValue,
    },
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;
use uuid::Uuid;

use wordlens_core::{
    config::{GatewayConfig, InputMode, ServerConfig},
    types::{AnalysisEnvelope, AnalyzeImageRequest, ImageSource},
    Error, Result,
};

use crate::error::ApiError;
use crate::multipart::extract_file_field;
use crate::service::AnalysisService;

/// Value of `Access-Control-Allow-Headers` on every response.
pub const ALLOWED_HEADERS: &str = "authorization, x-client-info, apikey, content-type";

/// Shared application state.
pub struct AppState {
    /// The analysis pipeline.
    pub service: Arc<AnalysisService>,
    /// Accepted request body shape.
    pub input_mode: InputMode,
    /// Upper bound for request bodies.
    pub max_body_bytes: usize,
}

/// Gateway server.
pub struct GatewayServer {
    server: ServerConfig,
    config: GatewayConfig,
    state: Arc<AppState>,
}

impl GatewayServer {
    /// Create a new gateway server.
    pub fn new(server: ServerConfig, config: GatewayConfig, service: Arc<AnalysisService>) -> Self {
        let state = Arc::new(AppState {
            service,
            input_mode: config.input_mode,
            max_body_bytes: config.max_upload_bytes,
        });
        Self {
            server,
            config,
            state,
        }
    }

    /// Build the Axum router.
    pub fn build_router(&self) -> Router {
        let mut router = Router::new()
            .route("/", post(analyze_handler))
            .route("/analyze-image", post(analyze_handler))
            .route("/health", get(health_handler))
            .layer(DefaultBodyLimit::max(self.config.max_upload_bytes))
            .with_state(self.state.clone());

        if self.config.enable_cors {
            let cors = CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers([
                    AUTHORIZATION,
                    HeaderName::from_static("x-client-info"),
                    HeaderName::from_static("apikey"),
                    CONTENT_TYPE,
                ]);

            router = router
                .layer(SetResponseHeaderLayer::if_not_present(
                    ACCESS_CONTROL_ALLOW_HEADERS,
                    HeaderValue::from_static(ALLOWED_HEADERS),
                ))
                .layer(cors);
        }

        if self.config.enable_tracing {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Bind the configured address and serve until shutdown.
    pub async fn run(self) -> Result<()> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::internal(format!("Failed to bind {}: {}", addr, e)))?;

        self.serve(listener).await
    }

    /// Serve on an already bound listener.
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        let addr = listener
            .local_addr()
            .map_err(|e| Error::internal(format!("Listener has no address: {}", e)))?;
        tracing::info!(addr = %addr, input_mode = ?self.config.input_mode, "Gateway server starting");

        axum::serve(listener, self.build_router())
            .await
            .map_err(|e| Error::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

// =============================================================================
// Request/Response Types
// =============================================================================

/// Health response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status.
    pub status: String,
    /// Version.
    pub version: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check handler.
async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Analysis handler.
///
/// Accepts exactly the body shape configured for this deployment.
async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    request: Request,
) -> std::result::Result<Json<AnalysisEnvelope>, ApiError> {
    let request_id = Uuid::new_v4();
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase();

    tracing::info!(
        request_id = %request_id,
        content_type = %content_type,
        "Processing analysis request"
    );

    let source = match state.input_mode {
        InputMode::Json => read_json_source(&state, &content_type, request).await?,
        InputMode::Multipart => read_multipart_source(&state, &content_type, request).await?,
    };

    let envelope = state
        .service
        .analyze(source)
        .instrument(tracing::info_span!("analyze", request_id = %request_id))
        .await?;

    tracing::info!(
        request_id = %request_id,
        items = envelope.analysis.len(),
        "Analysis complete"
    );

    Ok(Json(envelope))
}

async fn read_json_source(
    state: &AppState,
    content_type: &str,
    request: Request,
) -> Result<ImageSource> {
    if content_type.starts_with("multipart/") {
        return Err(Error::malformed(
            "Expected a JSON body with an image URL, got a multipart upload",
        ));
    }

    let body = axum::body::to_bytes(request.into_body(), state.max_body_bytes)
        .await
        .map_err(|e| Error::malformed(format!("Failed to read request body: {}", e)))?;

    let payload: AnalyzeImageRequest = serde_json::from_slice(&body)
        .map_err(|e| Error::malformed(format!("Invalid JSON body: {}", e)))?;

    match payload.image {
        Some(url) if !url.trim().is_empty() => Ok(ImageSource::Url(url)),
        _ => Err(Error::malformed("No image URL provided")),
    }
}

async fn read_multipart_source(
    state: &Arc<AppState>,
    content_type: &str,
    request: Request,
) -> Result<ImageSource> {
    if !content_type.starts_with("multipart/form-data") {
        return Err(Error::malformed(
            "Expected multipart/form-data with a 'file' field",
        ));
    }

    let multipart = Multipart::from_request(request, state)
        .await
        .map_err(|e| Error::malformed(e.body_text()))?;

    Ok(ImageSource::Upload(extract_file_field(multipart).await?))
}
