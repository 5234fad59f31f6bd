use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Chart not found: {0}")]
    ChartNotFound(String),
    #[error("Analyze a dataset first.")]
    NoAnalysis,
    #[error("Chart rendering error: {0}")]
    ChartRender(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidInput(_) | AppError::NoAnalysis => StatusCode::BAD_REQUEST,
            AppError::ChartNotFound(_) => StatusCode::NOT_FOUND,
            AppError::ChartRender(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(json!({
            "success": false,
            "error": self.to_string(),
        }));

        (self.status(), body).into_response()
    }
}
