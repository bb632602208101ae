// handlers/public/mod.rs - Endpoints that need no authentication

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde_json::{json, Value};

use crate::state::AppState;

/// GET / - service information
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "name": "Asset Inventory API",
        "version": env!("CARGO_PKG_VERSION"),
        "environment": format!("{:?}", state.config.environment).to_lowercase(),
        "endpoints": {
            "health": "/health (public)",
            "assets": "/api/assets[/:id] (protected)",
            "bulk": "/api/assets/bulk (protected)",
            "templates": "/api/asset-templates[/:id] (protected)",
            "leases": "/api/lease-contracts[/:id] (protected)",
            "intune": "/api/intune/devices[/:deviceId] (protected)",
        }
    }))
}

/// GET /health - database reachability
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let now = Utc::now();

    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "timestamp": now,
                "database": "ok",
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "timestamp": now,
                    "database": "unavailable",
                })),
            )
        }
    }
}
