//! API error type. Every failure leaves the server as `{success: false, error}` JSON.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use utoipa::ToSchema;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Analysis(String),

    #[error("{0}")]
    Internal(String),

    #[error("Not logged in")]
    NotLoggedIn,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotLoggedIn => StatusCode::UNAUTHORIZED,
            ApiError::Analysis(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Analysis(e) => {
                tracing::error!(error = %e, "❌ Analysis failed");
                Some("Analysis failed. Please try again.".to_string())
            }
            ApiError::Internal(e) => {
                tracing::error!(error = %e, "🔥 Internal error");
                None
            }
            ApiError::NotLoggedIn => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            message,
        });

        (status, body).into_response()
    }
}
