//! HTTP preview API exposing the translation provider to the site renderer.
//!
//! Endpoints:
//! - `GET  /health`
//! - `GET  /api/t?text=..&from=..`
//! - `GET  /api/language`, `PUT /api/language`
//! - `GET  /api/languages`
//! - `GET  /api/status`

use crate::error::TranslationError;
use crate::i18n::{SupportedLanguage, DEFAULT_SOURCE_LANGUAGE};
use crate::provider::TranslationProvider;
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
    Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::info;

type ApiError = (StatusCode, Json<Value>);

#[derive(Debug, Deserialize)]
struct TranslateQuery {
    text: String,
    from: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LanguageRequest {
    code: String,
}

pub fn router(provider: TranslationProvider) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/t", get(translate))
        .route("/api/language", get(get_language).put(set_language))
        .route("/api/languages", get(languages))
        .route("/api/status", get(status))
        .layer(TraceLayer::new_for_http())
        .with_state(provider)
}

/// Bind and serve until the process is stopped.
pub async fn serve(provider: TranslationProvider, port: u16) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {}", port))?;

    info!("Preview API listening on port {}", port);
    axum::serve(listener, router(provider))
        .await
        .context("Preview API server stopped")
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// `GET /api/t`: same decision path a render would take.
async fn translate(
    State(provider): State<TranslationProvider>,
    Query(query): Query<TranslateQuery>,
) -> Json<Value> {
    let from = query.from.as_deref().unwrap_or(DEFAULT_SOURCE_LANGUAGE);
    let text = provider.t_from(&query.text, from);

    Json(json!({
        "text": text,
        "language": provider.current_language(),
    }))
}

async fn get_language(State(provider): State<TranslationProvider>) -> Json<Value> {
    let active = provider.active_language();
    Json(json!({
        "current": active.current,
        "previous": active.previous,
    }))
}

async fn set_language(
    State(provider): State<TranslationProvider>,
    Json(request): Json<LanguageRequest>,
) -> Result<StatusCode, ApiError> {
    match provider.set_current_language(&request.code) {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e @ (TranslationError::InvalidLanguage(_) | TranslationError::UnsupportedLanguage(_))) => {
            Err((StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))))
        }
        Err(e) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": e.to_string() })),
        )),
    }
}

async fn languages(
    State(provider): State<TranslationProvider>,
) -> Result<Json<Vec<SupportedLanguage>>, ApiError> {
    provider
        .languages()
        .await
        .map(Json)
        .map_err(|e| (StatusCode::BAD_GATEWAY, Json(json!({ "error": e.to_string() }))))
}

async fn status(State(provider): State<TranslationProvider>) -> Json<Value> {
    Json(json!({
        "status": provider.status(),
        "metrics": provider.metrics(),
    }))
}
