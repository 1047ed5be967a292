// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types with consistent API responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that converts to HTTP responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Language model error: {0}")]
    LanguageModel(String),

    #[error("Exercise graph error: {0}")]
    GraphStore(String),

    #[error("No safe exercises: {0}")]
    NoSafeExercises(String),

    #[error("Generated plan rejected: {0}")]
    InvalidPlan(String),

    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub const LLM_RATE_LIMIT: &'static str = "rate limited by model endpoint";
    pub const LLM_AUTH_ERROR: &'static str = "model endpoint rejected credentials";

    /// Whether a retry by the caller could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AppError::LanguageModel(msg) => msg != Self::LLM_AUTH_ERROR,
            AppError::GraphStore(_) | AppError::InvalidPlan(_) | AppError::Timeout(_) => true,
            _ => false,
        }
    }
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
    retryable: bool,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let retryable = self.is_retryable();
        let (status, error, details) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", Some(msg.clone())),
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "bad_request", Some(msg.clone()))
            }
            AppError::LanguageModel(msg) => {
                tracing::error!(error = %msg, "Language model error");
                (StatusCode::BAD_GATEWAY, "model_error", None)
            }
            AppError::GraphStore(msg) => {
                tracing::error!(error = %msg, "Exercise graph error");
                (StatusCode::BAD_GATEWAY, "graph_error", None)
            }
            AppError::NoSafeExercises(msg) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "no_safe_exercises",
                Some(msg.clone()),
            ),
            AppError::InvalidPlan(msg) => {
                tracing::warn!(error = %msg, "Generated plan rejected");
                (StatusCode::BAD_GATEWAY, "invalid_plan", None)
            }
            AppError::Timeout(what) => (
                StatusCode::GATEWAY_TIMEOUT,
                "timeout",
                Some(what.to_string()),
            ),
            AppError::Internal(err) => {
                tracing::error!(error = %err, "Internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", None)
            }
        };

        let body = ErrorResponse {
            error: error.to_string(),
            details,
            retryable,
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::BadRequest(errors.to_string())
    }
}

/// Result type alias for handlers
pub type Result<T> = std::result::Result<T, AppError>;
