//! HTTP server for the ModernRAG showcase.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/api/rag-query` | Answer a query from the sample table or the completion provider |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Query Contract
//!
//! Request body: `{"query": "<text>"}`. Outcomes:
//!
//! | Status | Body | When |
//! |--------|------|------|
//! | 200 | result envelope | sample hit, or provider success |
//! | 400 | `{"error":"Query parameter is required"}` | unparseable body, missing or empty `query` |
//! | 405 | `{"error":"Method Not Allowed"}` + `Allow: POST` | any method other than POST |
//! | 500 | `{"error":"Internal Server Error"}` | provider failure (cause is logged, never returned) |
//!
//! Successful responses carry `Access-Control-Allow-Origin: *`. CORS
//! preflight requests are answered by a permissive [`CorsLayer`].

use anyhow::Result;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::completion::{CompletionProvider, OpenAIProvider};
use crate::config::{CompletionConfig, Config};
use crate::generation;
use crate::models::{ErrorBody, ResultEnvelope};
use crate::samples;
use crate::timing;

pub const QUERY_PATH: &str = "/api/rag-query";

/// Shared state passed to route handlers via Axum's `State` extractor.
///
/// Nothing here is mutated per request except the random generator, which
/// is locked only long enough to draw one value.
#[derive(Clone)]
pub struct AppState {
    provider: Arc<dyn CompletionProvider>,
    completion: Arc<CompletionConfig>,
    rng: Arc<Mutex<StdRng>>,
}

impl AppState {
    pub fn new(provider: Arc<dyn CompletionProvider>, completion: CompletionConfig) -> Self {
        Self {
            provider,
            completion: Arc::new(completion),
            rng: Arc::new(Mutex::new(StdRng::from_os_rng())),
        }
    }

    /// Replaces the random source, for deterministic tests.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Arc::new(Mutex::new(rng));
        self
    }

    fn draw_retrieval_secs(&self) -> f64 {
        let mut rng = self.rng.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        timing::random_retrieval(&mut *rng)
    }
}

/// Builds the application router. Exposed so tests can drive it in-process.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(QUERY_PATH, any(handle_rag_query))
        .route("/health", get(handle_health))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Starts the HTTP server on `[server].bind` and runs until the process ends.
pub async fn run_server(config: &Config) -> Result<()> {
    let provider = OpenAIProvider::new(&config.completion)?;
    let state = AppState::new(Arc::new(provider), config.completion.clone());
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(
        "ModernRAG demo listening on http://{}{}",
        config.server.bind,
        QUERY_PATH
    );
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

pub const QUERY_REQUIRED: &str = "Query parameter is required";

/// Handler error that renders as `{"error": message}`.
struct AppError {
    status: StatusCode,
    message: &'static str,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message.to_string(),
        };
        let mut response = (self.status, Json(body)).into_response();
        if self.status == StatusCode::METHOD_NOT_ALLOWED {
            response
                .headers_mut()
                .insert(header::ALLOW, HeaderValue::from_static("POST"));
        }
        response
    }
}

fn bad_request() -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: QUERY_REQUIRED,
    }
}

fn method_not_allowed() -> AppError {
    AppError {
        status: StatusCode::METHOD_NOT_ALLOWED,
        message: "Method Not Allowed",
    }
}

fn internal_error() -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: "Internal Server Error",
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ /api/rag-query ============

/// Pulls a non-empty string `query` out of a JSON body.
fn parse_query(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    let query = value.get("query")?.as_str()?;
    if query.is_empty() {
        None
    } else {
        Some(query.to_string())
    }
}

/// Handler for `/api/rag-query`.
///
/// Routed with `any` so non-POST methods get the JSON 405 body rather than
/// Axum's default empty one.
async fn handle_rag_query(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Result<Response, AppError> {
    if method != Method::POST {
        return Err(method_not_allowed());
    }

    let query = parse_query(&body).ok_or_else(bad_request)?;

    let result: ResultEnvelope = match samples::lookup(&query) {
        Some(sample) => {
            tracing::info!(query = %query, "answered from sample table");
            sample
        }
        None => {
            let retrieval_secs = state.draw_retrieval_secs();
            generation::generate_response(
                state.provider.as_ref(),
                &state.completion,
                retrieval_secs,
                &query,
            )
            .await
            .map_err(|e| {
                let cause = format!("{:#}", e);
                tracing::error!(query = %query, error = %cause, "error generating response");
                internal_error()
            })?
        }
    };

    Ok((
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"))],
        Json(result),
    )
        .into_response())
}
