use std::fmt;

use serde_json::{json, Value as JsonValue};
use thiserror::Error;
use tracing::{error, warn};

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiErrorCode {
    MissingApiKey,
    Forbidden,
    HttpTimeout,
    RateLimited,
    InvalidResponse,
    SchemaMismatch,
    InvalidRequest,
    OracleUnavailable,
    Unknown,
}

impl AiErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            AiErrorCode::MissingApiKey => "MISSING_API_KEY",
            AiErrorCode::Forbidden => "FORBIDDEN",
            AiErrorCode::HttpTimeout => "HTTP_TIMEOUT",
            AiErrorCode::RateLimited => "RATE_LIMITED",
            AiErrorCode::InvalidResponse => "INVALID_RESPONSE",
            AiErrorCode::SchemaMismatch => "SCHEMA_MISMATCH",
            AiErrorCode::InvalidRequest => "INVALID_REQUEST",
            AiErrorCode::OracleUnavailable => "ORACLE_UNAVAILABLE",
            AiErrorCode::Unknown => "UNKNOWN_AI_ERROR",
        }
    }
}

impl fmt::Display for AiErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        details: Option<JsonValue>,
    },

    #[error("{message}")]
    Ai {
        code: AiErrorCode,
        message: String,
        correlation_id: Option<String>,
        details: Option<JsonValue>,
    },

    #[error("no analytics data available for the requested selection")]
    NoData,

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, "validation error");
        AppError::Validation {
            message,
            details: None,
        }
    }

    pub fn validation_with_details(message: impl Into<String>, details: JsonValue) -> Self {
        let message = message.into();
        warn!(target: "app::validation", %message, details = %details, "validation error with details");
        AppError::Validation {
            message,
            details: Some(details),
        }
    }

    /// Rejects a filter value the engine does not recognise. The offending
    /// field and value travel in `details` so the boundary can echo them back.
    pub fn invalid_filter(field: &str, value: &str, allowed: &[&str]) -> Self {
        Self::validation_with_details(
            format!("unrecognized {field} filter value: {value}"),
            json!({
                "field": field,
                "value": value,
                "allowed": allowed,
            }),
        )
    }

    pub fn ai(code: AiErrorCode, message: impl Into<String>) -> Self {
        Self::ai_with_details(code, message, None, None)
    }

    pub fn ai_with_details(
        code: AiErrorCode,
        message: impl Into<String>,
        correlation_id: Option<&str>,
        details: Option<JsonValue>,
    ) -> Self {
        let message = message.into();
        let correlation = correlation_id.map(|value| value.to_string());
        match (&correlation, &details) {
            (Some(id), Some(payload)) => {
                warn!(
                    target: "app::ai::error",
                    code = %code,
                    correlation_id = %id,
                    details = %payload,
                    %message
                );
            }
            (Some(id), None) => {
                warn!(
                    target: "app::ai::error",
                    code = %code,
                    correlation_id = %id,
                    %message
                );
            }
            (None, Some(payload)) => {
                warn!(target: "app::ai::error", code = %code, details = %payload, %message);
            }
            (None, None) => {
                warn!(target: "app::ai::error", code = %code, %message);
            }
        }

        AppError::Ai {
            code,
            message,
            correlation_id: correlation,
            details,
        }
    }

    pub fn ai_code(&self) -> Option<AiErrorCode> {
        match self {
            AppError::Ai { code, .. } => Some(*code),
            _ => None,
        }
    }

    pub fn ai_correlation_id(&self) -> Option<&str> {
        match self {
            AppError::Ai { correlation_id, .. } => correlation_id.as_deref(),
            _ => None,
        }
    }

    pub fn validation_details(&self) -> Option<&JsonValue> {
        match self {
            AppError::Validation { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn no_data() -> Self {
        warn!(target: "app::analytics", "dataset is empty");
        AppError::NoData
    }

    pub fn other(message: impl Into<String>) -> Self {
        let message = message.into();
        error!(target: "app::other", %message, "other error");
        AppError::Other(message)
    }
}
