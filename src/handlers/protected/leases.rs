// handlers/protected/leases.rs - /api/lease-contracts

use axum::extract::{Path, Query, State};

use crate::dto::{CreateLeaseContractDto, LeaseContractDto, LeaseListParams, UpdateLeaseContractDto};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::LeaseService;
use crate::state::AppState;
use crate::validation::ValidatedJson;

fn service(state: &AppState) -> LeaseService {
    LeaseService::new(state.store.clone())
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<LeaseListParams>,
) -> ApiResult<Vec<LeaseContractDto>> {
    let active_only = params.active_only.unwrap_or(false);
    Ok(ApiResponse::ok(service(&state).list(active_only).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<LeaseContractDto> {
    Ok(ApiResponse::ok(service(&state).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateLeaseContractDto>,
) -> ApiResult<LeaseContractDto> {
    Ok(ApiResponse::created(service(&state).create(&dto).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateLeaseContractDto>,
) -> ApiResult<LeaseContractDto> {
    Ok(ApiResponse::ok(service(&state).update(id, &dto).await?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    service(&state).delete(id).await?;
    Ok(ApiResponse::no_content())
}
