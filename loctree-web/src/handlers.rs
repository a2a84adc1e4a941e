//! HTTP request handlers for the loctree web server

use crate::{AppState, Settings, SettingsUpdate, WebResult};
use axum::{extract::State, response::Json, Json as JsonExtractor};
use loctree_core::AnalysisResult;
use serde::{Deserialize, Serialize};

/// Uniform response envelope: `code` 0 on success, an HTTP-style error code
/// otherwise.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub code: u16,
    pub data: Option<T>,
    pub message: String,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            code: 0,
            data: Some(data),
            message: "success".to_string(),
        }
    }

    pub fn error(code: u16, message: impl Into<String>) -> Self {
        Self {
            code,
            data: None,
            message: message.into(),
        }
    }
}

/// Analysis request payload
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub repo_url: String,
    #[serde(default)]
    pub branch: String,
    #[serde(default)]
    pub max_depth: i64,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: String,
    timestamp: chrono::DateTime<chrono::Utc>,
    version: String,
}

/// Health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Analyze a repository: cache lookup, fetch on miss, tree + language stats
pub async fn analyze(
    State(state): State<AppState>,
    JsonExtractor(request): JsonExtractor<AnalyzeRequest>,
) -> WebResult<Json<ApiResponse<AnalysisResult>>> {
    let result = state
        .analyze(&request.repo_url, &request.branch, request.max_depth)
        .await?;
    Ok(Json(ApiResponse::ok(result)))
}

/// Current settings snapshot
pub async fn get_config(State(state): State<AppState>) -> Json<ApiResponse<Settings>> {
    Json(ApiResponse::ok(state.settings.snapshot()))
}

/// Partial settings update; echoes the post-update snapshot
pub async fn update_config(
    State(state): State<AppState>,
    JsonExtractor(update): JsonExtractor<SettingsUpdate>,
) -> Json<ApiResponse<Settings>> {
    let snapshot = state.update_settings(update);
    Json(ApiResponse::ok(snapshot))
}
