// handlers/protected/intune.rs - /api/intune/devices (Microsoft Graph lookups)

use axum::extract::{Path, Query, State};

use crate::dto::{DeviceSearchParams, IntuneDeviceDto};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::IntuneService;
use crate::state::AppState;

fn service(state: &AppState) -> IntuneService {
    IntuneService::new(state.devices.clone())
}

/// GET /api/intune/devices?search= - devices whose name starts with the term
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<DeviceSearchParams>,
) -> ApiResult<Vec<IntuneDeviceDto>> {
    Ok(ApiResponse::ok(service(&state).search(params.search.as_deref()).await?))
}

pub async fn get(
    State(state): State<AppState>,
    Path(device_id): Path<String>,
) -> ApiResult<IntuneDeviceDto> {
    Ok(ApiResponse::ok(service(&state).device_by_id(&device_id).await?))
}

pub async fn by_serial(
    State(state): State<AppState>,
    Path(serial): Path<String>,
) -> ApiResult<IntuneDeviceDto> {
    Ok(ApiResponse::ok(service(&state).device_by_serial(&serial).await?))
}
