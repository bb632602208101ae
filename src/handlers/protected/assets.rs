// handlers/protected/assets.rs - /api/assets

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension,
};
use tracing::info;

use crate::dto::{
    AssetCodeDto, AssetDto, AssetListDto, AssetListParams, BulkCreateAssetDto,
    BulkCreateResultDto, CodeExistsDto, CreateAssetDto, NextCodeParams, UpdateAssetDto,
};
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::AssetService;
use crate::state::AppState;
use crate::validation::ValidatedJson;

fn service(state: &AppState) -> AssetService {
    AssetService::new(state.store.clone())
}

/// GET /api/assets - paged list with optional status, category and search filters
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<AssetListParams>,
) -> ApiResult<AssetListDto> {
    let page = service(&state).list(&params, &state.config.api).await?;
    Ok(ApiResponse::ok(page))
}

/// GET /api/assets/:id
pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<AssetDto> {
    Ok(ApiResponse::ok(service(&state).get(id).await?))
}

/// GET /api/assets/by-code/:code
pub async fn get_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<AssetDto> {
    Ok(ApiResponse::ok(service(&state).get_by_code(&code).await?))
}

/// GET /api/assets/code-exists/:code
pub async fn code_exists(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> ApiResult<CodeExistsDto> {
    Ok(ApiResponse::ok(service(&state).code_exists(&code).await?))
}

/// GET /api/assets/next-code - preview without reserving
pub async fn next_code(
    State(state): State<AppState>,
    Query(params): Query<NextCodeParams>,
) -> ApiResult<AssetCodeDto> {
    Ok(ApiResponse::ok(service(&state).next_code(&params).await?))
}

/// POST /api/assets
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(dto): ValidatedJson<CreateAssetDto>,
) -> ApiResult<AssetDto> {
    let asset = service(&state).create(&dto).await?;
    info!(user = %user.id, "Asset {} created", asset.asset_code);
    Ok(ApiResponse::created(asset))
}

/// PUT /api/assets/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateAssetDto>,
) -> ApiResult<AssetDto> {
    Ok(ApiResponse::ok(service(&state).update(id, &dto).await?))
}

/// DELETE /api/assets/:id - soft delete, the code stays reserved
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> ApiResult<()> {
    service(&state).delete(id).await?;
    info!(user = %user.id, "Asset {} deleted", id);
    Ok(ApiResponse::no_content())
}

/// POST /api/assets/bulk - 201 when at least one asset was created, else 409
pub async fn bulk_create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    ValidatedJson(dto): ValidatedJson<BulkCreateAssetDto>,
) -> ApiResult<BulkCreateResultDto> {
    let result = service(&state).bulk_create(&dto, &state.config.api).await?;
    info!(
        user = %user.id,
        "Bulk create finished: {}/{} created",
        result.created_count,
        result.total_requested
    );
    let status = if result.created_count > 0 {
        StatusCode::CREATED
    } else {
        StatusCode::CONFLICT
    };
    Ok(ApiResponse::with_status(result, status))
}
