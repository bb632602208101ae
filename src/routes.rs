use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, RateLimitPolicy};
use crate::error::AppError;
use crate::handlers::{protected, public};
use crate::middleware::{
    auth_middleware, correlation_id_middleware, error_envelope_middleware, panic_response,
    rate_limit_middleware, RateLimiter, CORRELATION_ID_HEADER,
};
use crate::state::AppState;

/// Builds the full application router.
///
/// Layers run outermost first: correlation id, error envelope, panic
/// catcher, tracing, CORS, body limit; then per group authentication and
/// the group's rate-limit policy.
pub fn app(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(general_routes(&state))
        .merge(bulk_routes(&state))
        .merge(external_routes(&state))
        .fallback(not_found)
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes))
        .layer(cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(middleware::from_fn_with_state(
            config.clone(),
            error_envelope_middleware,
        ))
        .layer(middleware::from_fn(correlation_id_middleware))
}

fn general_routes(state: &AppState) -> Router<AppState> {
    use protected::{assets, leases, templates};

    let routes = Router::new()
        // Assets
        .route("/api/assets", get(assets::list).post(assets::create))
        .route("/api/assets/next-code", get(assets::next_code))
        .route("/api/assets/by-code/:code", get(assets::get_by_code))
        .route("/api/assets/code-exists/:code", get(assets::code_exists))
        .route(
            "/api/assets/:id",
            get(assets::get).put(assets::update).delete(assets::delete),
        )
        // Templates
        .route(
            "/api/asset-templates",
            get(templates::list).post(templates::create),
        )
        .route(
            "/api/asset-templates/:id",
            get(templates::get)
                .put(templates::update)
                .delete(templates::delete),
        )
        // Lease contracts
        .route("/api/lease-contracts", get(leases::list).post(leases::create))
        .route(
            "/api/lease-contracts/:id",
            get(leases::get).put(leases::update).delete(leases::delete),
        );

    protect(routes, state, &state.config.api.general_limit)
}

fn bulk_routes(state: &AppState) -> Router<AppState> {
    let routes = Router::new().route("/api/assets/bulk", post(protected::assets::bulk_create));
    protect(routes, state, &state.config.api.bulk_limit)
}

fn external_routes(state: &AppState) -> Router<AppState> {
    use protected::intune;

    let routes = Router::new()
        .route("/api/intune/devices", get(intune::search))
        .route("/api/intune/devices/by-serial/:serial", get(intune::by_serial))
        .route("/api/intune/devices/:device_id", get(intune::get));

    protect(routes, state, &state.config.api.external_limit)
}

/// Authentication runs before the group's rate-limit policy.
fn protect(
    routes: Router<AppState>,
    state: &AppState,
    policy: &RateLimitPolicy,
) -> Router<AppState> {
    let limiter = RateLimiter::new(policy.clone(), state.config.api.enable_rate_limiting)
        .with_trusted_proxies(state.config.api.trusted_proxies.clone());
    routes
        .route_layer(middleware::from_fn_with_state(limiter, rate_limit_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin `{}`", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            CORRELATION_ID_HEADER,
        ])
        .expose_headers([CORRELATION_ID_HEADER, HeaderName::from_static("retry-after")])
        .allow_credentials(true)
}

async fn not_found() -> AppError {
    AppError::not_found("The requested resource was not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::memory_state;
    use axum::{
        body::{to_bytes, Body},
        extract::Request,
        http::StatusCode,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn send(app: Router, request: Request) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_request(uri: &str) -> Request {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn health_reports_store_status() {
        let (status, body) = send(app(memory_state()), get_request("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn unknown_route_uses_error_envelope() {
        let (status, body) = send(app(memory_state()), get_request("/api/nothing")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["statusCode"], 404);
        assert!(body["correlationId"].is_string());
    }

    #[tokio::test]
    async fn malformed_id_is_a_bad_request() {
        let (status, body) = send(app(memory_state()), get_request("/api/assets/abc")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["statusCode"], 400);
    }

    #[tokio::test]
    async fn static_segments_win_over_ids() {
        let (status, body) = send(
            app(memory_state()),
            get_request("/api/assets/next-code?prefix=LAP&brand=Dell&year=2024"),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["assetCode"], "LAP-24-DELL-00001");
    }

    #[tokio::test]
    async fn intune_without_credentials_is_unavailable() {
        let (status, body) = send(
            app(memory_state()),
            get_request("/api/intune/devices?search=LAP"),
        )
        .await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Intune integration is not configured");
    }
}
