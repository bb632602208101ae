// HTTP API Error Types
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::validation::FieldError;

/// Every failure a handler can surface, grouped by how the client should
/// react to it. The outermost error-envelope middleware turns these into the
/// public error body; see [`ErrorReport`].
#[derive(Debug)]
pub enum AppError {
    // 400 Bad Request
    BadRequest(String),
    Validation(Vec<FieldError>),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    AlreadyExists(String),
    Concurrency(String),

    // 500 Internal Server Error
    Database(String),
    Mapping(String),
    Internal(String),

    // 502 Bad Gateway (external service issues)
    Upstream(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),

    // 504 Gateway Timeout
    Timeout(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) | AppError::Concurrency(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Mapping(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Message that is safe to show in any environment.
    pub fn public_message(&self) -> String {
        match self {
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::ServiceUnavailable(msg) => msg.clone(),
            AppError::Validation(errors) => {
                if errors.len() == 1 {
                    format!("Validation failed for field '{}'", errors[0].field)
                } else {
                    format!("Validation failed for {} fields", errors.len())
                }
            }
            AppError::Concurrency(_) => {
                "The record was modified by another user. Reload it and try again.".to_string()
            }
            AppError::Database(_) => "A database error occurred while processing the request".to_string(),
            AppError::Mapping(_) => "An error occurred while processing the data".to_string(),
            AppError::Internal(_) => "An unexpected error occurred".to_string(),
            AppError::Upstream(_) => "An external service returned an error".to_string(),
            AppError::Timeout(_) => "The request timed out".to_string(),
        }
    }

    /// Full message for logs and development responses.
    pub fn detail(&self) -> String {
        match self {
            AppError::Validation(errors) => errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect::<Vec<_>>()
                .join("; "),
            AppError::BadRequest(msg)
            | AppError::Unauthorized(msg)
            | AppError::Forbidden(msg)
            | AppError::NotFound(msg)
            | AppError::AlreadyExists(msg)
            | AppError::Concurrency(msg)
            | AppError::Database(msg)
            | AppError::Mapping(msg)
            | AppError::Internal(msg)
            | AppError::Upstream(msg)
            | AppError::ServiceUnavailable(msg)
            | AppError::Timeout(msg) => msg.clone(),
        }
    }

    /// Category name reported as `exceptionType` in development.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::BadRequest(_) => "BadRequestError",
            AppError::Validation(_) => "ValidationError",
            AppError::Unauthorized(_) => "UnauthorizedError",
            AppError::Forbidden(_) => "ForbiddenError",
            AppError::NotFound(_) => "NotFoundError",
            AppError::AlreadyExists(_) => "AlreadyExistsError",
            AppError::Concurrency(_) => "ConcurrencyError",
            AppError::Database(_) => "DatabaseError",
            AppError::Mapping(_) => "MappingError",
            AppError::Internal(_) => "InternalError",
            AppError::Upstream(_) => "UpstreamError",
            AppError::ServiceUnavailable(_) => "ServiceUnavailableError",
            AppError::Timeout(_) => "TimeoutError",
        }
    }

    pub fn report(&self) -> ErrorReport {
        let field_errors = match self {
            AppError::Validation(errors) => Some(errors.clone()),
            _ => None,
        };
        let status = self.status_code();
        ErrorReport {
            status,
            error: self.public_message(),
            detail: self.detail(),
            kind: self.kind(),
            field_errors,
            backtrace: if status.is_server_error() {
                capture_backtrace()
            } else {
                None
            },
        }
    }
}

// Static constructor methods
impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn validation(errors: Vec<FieldError>) -> Self {
        AppError::Validation(errors)
    }

    pub fn field(field: impl Into<String>, message: impl Into<String>) -> Self {
        AppError::Validation(vec![FieldError::new(field, message)])
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        AppError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        AppError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        AppError::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        AppError::AlreadyExists(message.into())
    }

    pub fn concurrency(message: impl Into<String>) -> Self {
        AppError::Concurrency(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }
}

fn capture_backtrace() -> Option<String> {
    use std::backtrace::{Backtrace, BacktraceStatus};

    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => Some(backtrace.to_string()),
        _ => None,
    }
}

/// Error details attached to a response's extensions. The error-envelope
/// middleware reads it to build the body once the correlation id and the
/// environment are known.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub status: StatusCode,
    pub error: String,
    pub detail: String,
    pub kind: &'static str,
    pub field_errors: Option<Vec<FieldError>>,
    pub backtrace: Option<String>,
}

impl ErrorReport {
    pub fn from_status(status: StatusCode, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        let error = if status.is_server_error() {
            "An unexpected error occurred".to_string()
        } else if detail.trim().is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        } else {
            detail.clone()
        };
        Self {
            status,
            error,
            detail,
            kind: "HttpError",
            field_errors: None,
            backtrace: None,
        }
    }
}

// Convert module errors to AppError
impl From<crate::database::DatabaseError> for AppError {
    fn from(err: crate::database::DatabaseError) -> Self {
        use crate::database::DatabaseError;
        match err {
            DatabaseError::NotFound(msg) => AppError::not_found(msg),
            DatabaseError::Duplicate(msg) => AppError::already_exists(msg),
            DatabaseError::Concurrency(msg) => AppError::concurrency(msg),
            DatabaseError::InvalidData(msg) => AppError::Mapping(msg),
            DatabaseError::Timeout(msg) => AppError::Timeout(msg),
            DatabaseError::ConfigMissing(_)
            | DatabaseError::InvalidDatabaseUrl
            | DatabaseError::Sqlx(_)
            | DatabaseError::Migrate(_) => AppError::Database(err.to_string()),
        }
    }
}

impl From<crate::filter::FilterError> for AppError {
    fn from(err: crate::filter::FilterError) -> Self {
        AppError::bad_request(err.to_string())
    }
}

impl From<crate::graph::GraphError> for AppError {
    fn from(err: crate::graph::GraphError) -> Self {
        use crate::graph::GraphError;
        match err {
            GraphError::NotConfigured => {
                AppError::ServiceUnavailable("Intune integration is not configured".to_string())
            }
            GraphError::NotFound(msg) => AppError::not_found(msg),
            GraphError::Timeout(msg) => AppError::Timeout(msg),
            GraphError::Forbidden(msg) => AppError::Upstream(format!("Graph denied access: {}", msg)),
            GraphError::Token(_) | GraphError::Status { .. } | GraphError::Transport(_) => {
                AppError::Upstream(err.to_string())
            }
            GraphError::Decode(msg) => AppError::Mapping(msg),
        }
    }
}

impl From<crate::services::asset_code::CodeGenerationError> for AppError {
    fn from(err: crate::services::asset_code::CodeGenerationError) -> Self {
        use crate::services::asset_code::CodeGenerationError;
        match err {
            CodeGenerationError::InvalidPrefix(msg) => AppError::field("assetCodePrefix", msg),
            CodeGenerationError::SequenceExhausted(stem) => AppError::already_exists(format!(
                "No asset numbers left for {}",
                stem
            )),
            CodeGenerationError::InvalidCode(msg) => AppError::Mapping(msg),
        }
    }
}

impl From<crate::services::asset_code::AssetCodeError> for AppError {
    fn from(err: crate::services::asset_code::AssetCodeError) -> Self {
        use crate::services::asset_code::AssetCodeError;
        match err {
            AssetCodeError::Generation(e) => e.into(),
            AssetCodeError::Database(e) => e.into(),
        }
    }
}

impl From<crate::auth::AuthError> for AppError {
    fn from(err: crate::auth::AuthError) -> Self {
        use crate::auth::AuthError;
        match err {
            AuthError::NotConfigured | AuthError::Jwks(_) => AppError::ServiceUnavailable(
                "Authentication is temporarily unavailable".to_string(),
            ),
            AuthError::MissingToken => AppError::unauthorized("Missing bearer token"),
            AuthError::InvalidToken(_) | AuthError::UnknownKey(_) => {
                AppError::unauthorized("Invalid or expired bearer token")
            }
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind(), self.detail())
    }
}

impl std::error::Error for AppError {}

// The body written here is only seen when the envelope middleware is absent.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let report = self.report();
        let mut response = (
            report.status,
            Json(json!({
                "error": report.error,
                "statusCode": report.status.as_u16(),
            })),
        )
            .into_response();
        response.extensions_mut().insert(report);
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_categories_to_status_codes() {
        let cases = [
            (AppError::bad_request("x"), 400),
            (AppError::field("serialNumber", "required"), 400),
            (AppError::unauthorized("x"), 401),
            (AppError::forbidden("x"), 403),
            (AppError::not_found("x"), 404),
            (AppError::already_exists("x"), 409),
            (AppError::concurrency("x"), 409),
            (AppError::Database("x".into()), 500),
            (AppError::Mapping("x".into()), 500),
            (AppError::internal("x"), 500),
            (AppError::Upstream("x".into()), 502),
            (AppError::Timeout("x".into()), 504),
        ];
        for (err, status) in cases {
            assert_eq!(err.status_code().as_u16(), status, "{}", err);
        }
    }

    #[test]
    fn server_errors_hide_detail_in_public_message() {
        let err = AppError::Database("relation \"assets\" does not exist".into());
        assert!(!err.public_message().contains("relation"));
        assert!(err.detail().contains("relation"));
    }

    #[test]
    fn response_carries_report_extension() {
        let response = AppError::not_found("Asset 7 not found").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let report = response.extensions().get::<ErrorReport>().unwrap();
        assert_eq!(report.error, "Asset 7 not found");
        assert_eq!(report.kind, "NotFoundError");
    }

    #[test]
    fn validation_report_lists_fields() {
        let report = AppError::validation(vec![
            FieldError::new("serialNumber", "serialNumber is required"),
            FieldError::new("category", "category is required"),
        ])
        .report();
        assert_eq!(report.error, "Validation failed for 2 fields");
        assert_eq!(report.field_errors.unwrap().len(), 2);
    }

    #[test]
    fn status_reports_hide_server_detail() {
        let report = ErrorReport::from_status(StatusCode::INTERNAL_SERVER_ERROR, "panic at x");
        assert_eq!(report.error, "An unexpected error occurred");
        let report = ErrorReport::from_status(StatusCode::BAD_REQUEST, "bad path");
        assert_eq!(report.error, "bad path");
    }
}
