//! Maps domain `AppError` to HTTP responses.

use axum::Json;
use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use validator::ValidationErrors;

use resumevault_core::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Seconds until a throttled request may be retried.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_after_seconds: Option<u64>,
    /// Optional details.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Handler error: an [`AppError`] rendered as JSON.
#[derive(Debug)]
pub struct ApiError {
    inner: AppError,
    details: Option<serde_json::Value>,
}

impl ApiError {
    /// The wrapped domain error.
    pub fn kind(&self) -> ErrorKind {
        self.inner.kind
    }
}

impl From<AppError> for ApiError {
    fn from(inner: AppError) -> Self {
        Self {
            inner,
            details: None,
        }
    }
}

impl From<ValidationErrors> for ApiError {
    fn from(errors: ValidationErrors) -> Self {
        Self {
            inner: AppError::invalid_input("Request validation failed"),
            details: serde_json::to_value(&errors).ok(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.inner.kind;
        let status =
            StatusCode::from_u16(kind.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match kind {
            ErrorKind::Database
            | ErrorKind::Cache
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::Internal => {
                tracing::error!(error = %self.inner, "Internal server error");
            }
            ErrorKind::StorageUnavailable => {
                tracing::warn!(error = %self.inner, "Storage collaborator unavailable");
            }
            _ => {}
        }

        // Throttling hints are rounded up so clients never retry early.
        let retry_after_seconds = self
            .inner
            .retry_after
            .map(|d| d.as_secs() + u64::from(d.subsec_nanos() > 0));

        // Infrastructure details stay in the logs.
        let message = if status.is_server_error() && kind != ErrorKind::StorageUnavailable {
            "Internal server error".to_string()
        } else {
            self.inner.message
        };

        let body = ApiErrorResponse {
            error: kind.code().to_string(),
            message,
            retry_after_seconds,
            details: self.details,
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(seconds) = retry_after_seconds {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(seconds));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_rate_limited_sets_retry_after_header() {
        let response =
            ApiError::from(AppError::rate_limited("slow down", Duration::from_millis(1500)))
                .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "2");
    }

    #[test]
    fn test_policy_errors_map_to_status_codes() {
        let cases = [
            (AppError::not_found("x"), StatusCode::NOT_FOUND),
            (AppError::authentication("x"), StatusCode::UNAUTHORIZED),
            (AppError::forbidden("x"), StatusCode::FORBIDDEN),
            (AppError::token_owner_mismatch("x"), StatusCode::FORBIDDEN),
            (AppError::token_invalid("x"), StatusCode::BAD_REQUEST),
            (AppError::scan_not_clean("x"), StatusCode::UNPROCESSABLE_ENTITY),
            (AppError::conflict("x"), StatusCode::CONFLICT),
            (AppError::storage_unavailable("x"), StatusCode::SERVICE_UNAVAILABLE),
        ];
        for (err, status) in cases {
            let response = ApiError::from(err).into_response();
            assert_eq!(response.status(), status);
            assert!(response.headers().get(header::RETRY_AFTER).is_none());
        }
    }
}
