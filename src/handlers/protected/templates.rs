// handlers/protected/templates.rs - /api/asset-templates

use axum::extract::{Path, Query, State};

use crate::dto::{AssetTemplateDto, CreateAssetTemplateDto, TemplateListParams, UpdateAssetTemplateDto};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::TemplateService;
use crate::state::AppState;
use crate::validation::ValidatedJson;

fn service(state: &AppState) -> TemplateService {
    TemplateService::new(state.store.clone())
}

pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<TemplateListParams>,
) -> ApiResult<Vec<AssetTemplateDto>> {
    let include_inactive = params.include_inactive.unwrap_or(false);
    Ok(ApiResponse::ok(service(&state).list(include_inactive).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<AssetTemplateDto> {
    Ok(ApiResponse::ok(service(&state).get(id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    ValidatedJson(dto): ValidatedJson<CreateAssetTemplateDto>,
) -> ApiResult<AssetTemplateDto> {
    Ok(ApiResponse::created(service(&state).create(&dto).await?))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(dto): ValidatedJson<UpdateAssetTemplateDto>,
) -> ApiResult<AssetTemplateDto> {
    Ok(ApiResponse::ok(service(&state).update(id, &dto).await?))
}

/// DELETE /api/asset-templates/:id - deactivates the template
pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<()> {
    service(&state).delete(id).await?;
    Ok(ApiResponse::no_content())
}
