//! HTTP boundary: multipart upload in, validated statement out.
//!
//! A thin axum layer over [`crate::extract::run_pipeline`]. The server owns
//! one provider handle, constructed at startup and shared by reference with
//! every request — requests themselves share no mutable state.
//!
//! ## Status mapping
//!
//! | Failure | Status |
//! |---------|--------|
//! | wrong content type, oversized body | 400 |
//! | [`StmtError::DocumentParse`]       | 400 |
//! | [`StmtError::AiExtraction`]        | 422 |
//! | [`StmtError::SchemaValidation`]    | 422 |
//! | anything else                      | 500 |

use crate::config::ExtractionConfig;
use crate::error::StmtError;
use crate::extract::{resolve_provider, run_pipeline};
use crate::pipeline::input::extract_document_text;
use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use edgequake_llm::LLMProvider;
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

/// Content types the upload endpoint accepts.
const ACCEPTED_CONTENT_TYPES: [&str; 2] = ["application/pdf", "text/plain"];

/// Shared application state: one provider, one config, for all requests.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn LLMProvider>,
    config: ExtractionConfig,
}

impl AppState {
    /// Build state from a config, resolving the provider once at startup.
    pub async fn from_config(config: ExtractionConfig) -> Result<Self, StmtError> {
        let provider = resolve_provider(&config).await?;
        Ok(Self { provider, config })
    }

    /// Build state around an already-constructed provider handle.
    pub fn new(provider: Arc<dyn LLMProvider>, config: ExtractionConfig) -> Self {
        Self { provider, config }
    }
}

/// Build the API router.
pub fn router(state: AppState) -> Router {
    // The multipart encoding adds framing overhead on top of the document
    // itself, hence the extra headroom over max_upload_bytes.
    let body_limit = state.config.max_upload_bytes + 64 * 1024;

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/files/upload", post(upload))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(Arc::new(state))
}

/// Bind and serve until the task is cancelled.
pub async fn serve(addr: std::net::SocketAddr, state: AppState) -> Result<(), StmtError> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| StmtError::Internal(format!("failed to bind {addr}: {e}")))?;
    info!("listening on {addr}");

    axum::serve(listener, router(state))
        .await
        .map_err(|e| StmtError::Internal(format!("server error: {e}")))
}

/// Liveness probe.
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// Upload a statement document, extract data, return structured transactions.
async fn upload(State(state): State<Arc<AppState>>, mut multipart: Multipart) -> Response {
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(f)) if f.name() == Some("file") => break f,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return client_error(StatusCode::BAD_REQUEST, "missing 'file' field");
            }
            Err(e) => {
                return client_error(StatusCode::BAD_REQUEST, &format!("malformed multipart body: {e}"));
            }
        }
    };

    let content_type = field.content_type().unwrap_or("").to_string();
    if !ACCEPTED_CONTENT_TYPES.contains(&content_type.as_str()) {
        return client_error(
            StatusCode::BAD_REQUEST,
            "invalid file type. only PDF and plain text are supported",
        );
    }

    let bytes = match field.bytes().await {
        Ok(b) => b,
        Err(e) => {
            return client_error(StatusCode::BAD_REQUEST, &format!("failed to read upload: {e}"));
        }
    };

    if bytes.len() > state.config.max_upload_bytes {
        return client_error(StatusCode::BAD_REQUEST, "file size exceeds limit");
    }

    // Upstream text producer runs before the pipeline; its failures are
    // document errors (400), never extraction errors.
    let text = match extract_document_text(&bytes) {
        Ok(t) => t,
        Err(e) => return error_response(e),
    };

    match run_pipeline(&state.provider, &text, &state.config).await {
        Ok(output) => Json(output.statement).into_response(),
        Err(e) => error_response(e),
    }
}

/// Map a pipeline error to its stable outward status code.
pub fn status_for(error: &StmtError) -> StatusCode {
    match error {
        StmtError::DocumentParse { .. } => StatusCode::BAD_REQUEST,
        StmtError::AiExtraction { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        StmtError::SchemaValidation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: StmtError) -> Response {
    let status = status_for(&error);
    if status.is_server_error() {
        warn!("request failed: {error}");
    }
    let body = json!({
        "error": error.to_string(),
        "kind": error_kind(&error),
    });
    (status, Json(body)).into_response()
}

fn client_error(status: StatusCode, detail: &str) -> Response {
    (status, Json(json!({ "error": detail }))).into_response()
}

/// Stable machine-readable error kind, independent of message wording.
fn error_kind(error: &StmtError) -> &'static str {
    match error {
        StmtError::DocumentParse { .. } => "document_parse",
        StmtError::AiExtraction { .. } => "ai_extraction",
        StmtError::SchemaValidation { .. } => "schema_validation",
        StmtError::InvalidConfig(_) => "invalid_config",
        StmtError::ProviderNotConfigured { .. } => "provider_not_configured",
        _ => "internal",
    }
}
