use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::analysis::normalizer::NormalizeError;
use crate::llm_client::LlmError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Every response body carries an `error` string and, where available,
/// `details` and `suggestion`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    /// The request body could not be read as the expected JSON. Keeps the
    /// status axum chose (400, 415 or 422).
    #[error("Invalid request body: {details}")]
    InvalidRequest { status: StatusCode, details: String },

    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    #[error("Upstream model call failed: {details}")]
    UpstreamUnavailable {
        status: Option<u16>,
        details: String,
    },

    #[error("Upstream model call timed out after {0}s")]
    UpstreamTimeout(u64),

    #[error("Model returned an empty response")]
    EmptyResponse { finish_reason: Option<String> },

    #[error("Model returned invalid JSON: {reason}")]
    InvalidJson { reason: String, preview: String },

    #[error("Model response is missing required fields: {}", .0.join(", "))]
    IncompletePlan(Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<LlmError> for AppError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ConfigurationMissing(var) => AppError::ConfigurationMissing(var),
            LlmError::Timeout { secs } => AppError::UpstreamTimeout(secs),
            LlmError::Api { status, message } => AppError::UpstreamUnavailable {
                status: Some(status),
                details: message,
            },
            other => AppError::UpstreamUnavailable {
                status: None,
                details: other.to_string(),
            },
        }
    }
}

impl From<NormalizeError> for AppError {
    fn from(err: NormalizeError) -> Self {
        match err {
            NormalizeError::EmptyResponse { finish_reason } => {
                AppError::EmptyResponse { finish_reason }
            }
            NormalizeError::InvalidJson { reason, preview } => {
                AppError::InvalidJson { reason, preview }
            }
            NormalizeError::MissingFields(fields) => AppError::IncompletePlan(fields),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidRequest {
            status: rejection.status(),
            details: rejection.body_text(),
        }
    }
}

/// Human-readable hint for an upstream HTTP status.
pub fn upstream_suggestion(status: Option<u16>) -> &'static str {
    match status {
        Some(401) => "Check that LLM_API_KEY (or LLM_API_KEY_OVERRIDE) is valid and not expired.",
        Some(403) => "The credential is not permitted to use this model. Check LLM_AUTH_HEADER and the key's access rights.",
        Some(404) => "The model endpoint was not found. Check LLM_API_BASE_URL, LLM_MODEL and LLM_API_VERSION.",
        Some(429) => "The model provider is rate limiting requests. Wait a moment and try again.",
        _ => "The model service could not be reached. Check network connectivity and LLM_API_BASE_URL.",
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details, suggestion): (StatusCode, String, Option<String>, Option<String>) =
            match &self {
                AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone(), None, None),
                AppError::InvalidRequest { status, details } => {
                    tracing::warn!("Rejected request body ({status}): {details}");
                    (
                        *status,
                        "Invalid request body".to_string(),
                        Some(details.clone()),
                        Some("Send a JSON object such as {\"employee_id\": \"EMP-20001\"} with Content-Type: application/json.".to_string()),
                    )
                }
                AppError::ConfigurationMissing(var) => {
                    tracing::error!("Configuration missing: {var}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model service is not configured".to_string(),
                        Some(format!("Environment variable '{var}' is not set")),
                        Some(format!("Set {var} in the environment or .env file and restart.")),
                    )
                }
                AppError::UpstreamUnavailable { status, details } => {
                    tracing::error!("Upstream error (status {status:?}): {details}");
                    let error = match status {
                        Some(code) => format!("Model API returned status {code}"),
                        None => "Model API request failed".to_string(),
                    };
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        error,
                        Some(details.clone()),
                        Some(upstream_suggestion(*status).to_string()),
                    )
                }
                AppError::UpstreamTimeout(secs) => {
                    tracing::error!("Upstream timeout after {secs}s");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model API request timed out".to_string(),
                        Some(format!("No response within {secs} seconds")),
                        Some("Try again, or raise LLM_TIMEOUT_SECS.".to_string()),
                    )
                }
                AppError::EmptyResponse { finish_reason } => {
                    tracing::error!("Empty model response (finish_reason={finish_reason:?})");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model returned an empty response".to_string(),
                        finish_reason
                            .as_ref()
                            .map(|r| format!("finish_reason: {r}")),
                        Some("Try again; if it persists, raise LLM_MAX_TOKENS.".to_string()),
                    )
                }
                AppError::InvalidJson { reason, preview } => {
                    tracing::error!("Invalid JSON from model: {reason}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to parse model response as JSON: {reason}"),
                        Some(preview.clone()),
                        None,
                    )
                }
                AppError::IncompletePlan(missing) => {
                    tracing::error!("Model response missing fields: {missing:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Model response is missing required fields".to_string(),
                        Some(missing.join(", ")),
                        None,
                    )
                }
                AppError::Internal(e) => {
                    tracing::error!("Internal error: {e:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal server error occurred".to_string(),
                        None,
                        None,
                    )
                }
            };

        let mut body = Map::new();
        body.insert("error".to_string(), Value::String(error));
        if let Some(details) = details {
            body.insert("details".to_string(), Value::String(details));
        }
        if let Some(suggestion) = suggestion {
            body.insert("suggestion".to_string(), Value::String(suggestion));
        }

        (status, Json(Value::Object(body))).into_response()
    }
}
