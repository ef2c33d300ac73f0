/// Error types for the marketeer service
///
/// Errors are converted to JSON HTTP responses in one place; handlers return
/// `Result<HttpResponse>` and rely on the `ResponseError` impl below.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde_json::{json, Value};
use thiserror::Error;

/// Result type for marketeer-service operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Application error types
#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or invalid session
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Malformed or missing input
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Request payload failed validation
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// The provider rejected our credentials (invalid key, expired token)
    #[error("Provider authentication failed: {0}")]
    ProviderAuth(String),

    /// The provider throttled us
    #[error("Rate limit exceeded: {0}")]
    RateLimited(String),

    /// The network refused the publish request; carries the provider body
    #[error("Network API request failed")]
    ProviderRejected { detail: Value },

    /// The network app is not enrolled for the analytics endpoint
    #[error("Network app not configured for analytics access")]
    NotEnrolled { detail: Value },

    /// Any other provider failure, surfaced with the provider's status
    #[error("Network API error ({status})")]
    Upstream { status: u16, detail: Value },

    /// Database operation failed
    #[error("Database error: {0}")]
    Database(String),

    /// Completion provider failed
    #[error("Completion provider error: {0}")]
    Llm(String),

    /// Unexpected internal failure
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthorized(_) | AppError::ProviderAuth(_) => StatusCode::UNAUTHORIZED,
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited(_) => StatusCode::TOO_MANY_REQUESTS,
            AppError::ProviderRejected { .. } | AppError::NotEnrolled { .. } => {
                StatusCode::FORBIDDEN
            }
            AppError::Upstream { status, .. } => StatusCode::from_u16(*status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            AppError::Database(_) | AppError::Llm(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        let body = match self {
            AppError::NotEnrolled { detail } => json!({
                "error": "Network app not configured for analytics access",
                "message": "The app must be attached to a project with the appropriate API access level",
                "details": detail,
                "status": status.as_u16(),
            }),
            AppError::ProviderRejected { detail } => json!({
                "error": "Network API request failed",
                "detail": detail,
                "status": status.as_u16(),
            }),
            AppError::Upstream { detail, .. } => json!({
                "error": "Network API error",
                "details": detail,
                "status": status.as_u16(),
            }),
            AppError::Database(msg) | AppError::Llm(msg) | AppError::Internal(msg) => {
                tracing::error!("internal error: {}", msg);
                json!({
                    "error": "Internal server error",
                    "status": status.as_u16(),
                })
            }
            other => json!({
                "error": other.to_string(),
                "status": status.as_u16(),
            }),
        };

        HttpResponse::build(status).json(body)
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::Database(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut messages = Vec::new();
        for (field, field_errors) in errors.field_errors() {
            for error in field_errors {
                match &error.message {
                    Some(message) => messages.push(message.to_string()),
                    None => messages.push(format!("{} is invalid", field)),
                }
            }
        }
        messages.sort();
        AppError::Validation(messages.join("; "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            AppError::Unauthorized("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::RateLimited("x".into()).status_code(),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            AppError::ProviderRejected { detail: json!({}) }.status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::Database("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_upstream_passes_provider_status_through() {
        let err = AppError::Upstream {
            status: 502,
            detail: json!({"title": "upstream"}),
        };
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);

        // Garbage statuses fall back to 500 instead of panicking
        let err = AppError::Upstream {
            status: 42,
            detail: Value::Null,
        };
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
