use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, Method},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    models::{ChartInfo, EdaReport},
    services::{analyzer, session::DEFAULT_SESSION},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/analyze", post(analyze_dataset))
        .route("/analyze-file", post(analyze_file))
        .route("/download-chart/:chart_id", get(download_chart))
        .route("/chat-with-data", post(chat_with_data))
        .route("/ping", get(ping))
        .layer(cors)
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    dataset: String,
    name: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AnalyzeFileParams {
    name: Option<String>,
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    success: bool,
    dataset_name: String,
    eda: EdaReport,
    charts: Vec<ChartInfo>,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    message: String,
    session_id: Option<String>,
}

async fn analyze_dataset(
    State(state): State<Arc<AppState>>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let name = request.name.unwrap_or_else(|| "dataset".to_string());
    run_analysis_task(state, request.dataset, name, request.session_id).await
}

/// Same pipeline as `/analyze`, but the dataset arrives as a raw request
/// body instead of a JSON field. Convenient for `curl --data-binary @file`.
async fn analyze_file(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AnalyzeFileParams>,
    body: Bytes,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let text = String::from_utf8_lossy(&body).into_owned();
    let name = params.name.unwrap_or_else(|| "uploaded_file".to_string());
    run_analysis_task(state, text, name, params.session_id).await
}

async fn run_analysis_task(
    state: Arc<AppState>,
    dataset: String,
    name: String,
    session_id: Option<String>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    if dataset.len() > state.config.max_input_bytes {
        return Err(AppError::InvalidInput(format!(
            "Dataset exceeds the {} byte limit",
            state.config.max_input_bytes
        )));
    }

    let session_key = session_id.unwrap_or_else(|| DEFAULT_SESSION.to_string());

    // Profiling and chart rendering are CPU-bound; keep them off the
    // async workers.
    let outcome = tokio::task::spawn_blocking(move || {
        analyzer::run_analysis(&dataset, &name, &session_key, &state.registry, &state.sessions)
    })
    .await
    .map_err(|e| AppError::Internal(format!("analysis task failed: {}", e)))?;

    Ok(Json(AnalyzeResponse {
        success: true,
        dataset_name: outcome.dataset_name,
        eda: outcome.report,
        charts: outcome.charts,
    }))
}

async fn download_chart(
    State(state): State<Arc<AppState>>,
    Path(chart_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let png = state
        .registry
        .get(&chart_id)
        .ok_or_else(|| AppError::ChartNotFound(chart_id.clone()))?;

    let headers = [
        (header::CONTENT_TYPE, "image/png".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.png\"", chart_id),
        ),
    ];
    Ok((headers, png))
}

async fn chat_with_data(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::InvalidInput("Message is empty".to_string()));
    }

    let session_key = request.session_id.as_deref().unwrap_or(DEFAULT_SESSION);
    let session = state
        .sessions
        .get(session_key)
        .ok_or(AppError::NoAnalysis)?;

    let answer = state.gateway.answer_about_dataset(&session, message).await;
    Ok(Json(json!({
        "success": true,
        "response": answer,
    })))
}

async fn ping() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}
