use std::any::Any;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde_json::{json, Value};
use tracing::{error, warn};

use super::correlation::CorrelationId;
use crate::config::AppConfig;
use crate::error::{AppError, ErrorReport};

/// Plain-text bodies of framework rejections are short; anything longer is cut.
const MAX_REJECTION_BODY: usize = 16 * 1024;

fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.starts_with("application/json"))
        .unwrap_or(false)
}

/// Public error body. `detail`, `exceptionType` and `stackTrace` are only
/// included in development.
pub fn envelope(report: &ErrorReport, correlation_id: &str, include_detail: bool) -> Value {
    let mut body = json!({
        "error": report.error,
        "statusCode": report.status.as_u16(),
        "correlationId": correlation_id,
        "timestamp": Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    });
    if let Some(errors) = &report.field_errors {
        body["errors"] = json!(errors);
    }
    if include_detail {
        body["detail"] = json!(report.detail);
        body["exceptionType"] = json!(report.kind);
        if let Some(trace) = &report.backtrace {
            body["stackTrace"] = json!(trace);
        }
    }
    body
}

/// Renders every 4xx/5xx response as the JSON error envelope and logs it
/// with the correlation id. JSON error bodies produced by earlier stages
/// without an [`ErrorReport`] (rate-limit rejections) pass through.
pub async fn error_envelope_middleware(
    State(config): State<Arc<AppConfig>>,
    request: Request,
    next: Next,
) -> Response {
    let correlation_id = request
        .extensions()
        .get::<CorrelationId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let response = next.run(request).await;
    let status = response.status();
    if !status.is_client_error() && !status.is_server_error() {
        return response;
    }

    let (mut parts, body) = response.into_parts();
    let report = match parts.extensions.remove::<ErrorReport>() {
        Some(report) => report,
        None if is_json(&parts.headers) => return Response::from_parts(parts, body),
        None => {
            let bytes = to_bytes(body, MAX_REJECTION_BODY).await.unwrap_or_default();
            ErrorReport::from_status(status, String::from_utf8_lossy(&bytes).trim())
        }
    };

    if status.is_server_error() {
        error!(
            correlation_id = %correlation_id,
            status = status.as_u16(),
            kind = report.kind,
            "{} {} failed: {}",
            method,
            path,
            report.detail
        );
    } else {
        warn!(
            correlation_id = %correlation_id,
            status = status.as_u16(),
            kind = report.kind,
            "{} {} rejected: {}",
            method,
            path,
            report.detail
        );
    }

    let body = envelope(&report, &correlation_id, config.is_development());
    parts.headers.remove(header::CONTENT_LENGTH);
    parts
        .headers
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    Response::from_parts(parts, Body::from(body.to_string()))
}

/// `CatchPanicLayer` handler: a panic becomes an ordinary internal error.
pub fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let message = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    AppError::internal(format!("handler panicked: {}", message)).into_response()
}
