use std::sync::Arc;

use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::database::models::AssetQuery;
use crate::database::InventoryStore;
use crate::dto::{
    AssetCodeDto, AssetDto, AssetListDto, AssetListParams, BulkCreateAssetDto,
    BulkCreateResultDto, BulkFailureDto, CodeExistsDto, CreateAssetDto, NextCodeParams,
    UpdateAssetDto,
};
use crate::error::{AppError, AppResult};
use crate::mapping;
use crate::services::asset_code::{AssetCodeGenerator, CodeRequest};
use crate::types::AssetStatus;
use crate::validation::{validate_asset_code, validate_search_term, DEFAULT_SEARCH_TERM_LENGTH};

/// Placeholder serial for bulk-created assets whose serial is not known yet.
pub fn placeholder_serial(asset_code: &str) -> String {
    format!("TBD-{}", asset_code)
}

pub struct AssetService {
    store: Arc<dyn InventoryStore>,
}

impl AssetService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, params: &AssetListParams, api: &ApiConfig) -> AppResult<AssetListDto> {
        let status = match params.status.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(raw) => Some(
                raw.parse::<AssetStatus>()
                    .map_err(|e| AppError::field("status", e.to_string()))?,
            ),
            None => None,
        };

        let search = match params.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(term) => {
                validate_search_term(Some(term), DEFAULT_SEARCH_TERM_LENGTH)
                    .map_err(|msg| AppError::field("search", msg))?;
                Some(term.to_string())
            }
            None => None,
        };

        let query = AssetQuery {
            status,
            category: params
                .category
                .as_deref()
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
            search,
            page: params.page.unwrap_or(1).max(1),
            page_size: params
                .page_size
                .unwrap_or(api.default_page_size)
                .clamp(1, api.max_page_size),
        };

        let page = self.store.list_assets(&query).await?;
        Ok(AssetListDto {
            items: page.items.into_iter().map(AssetDto::from).collect(),
            page: query.page,
            page_size: query.page_size,
            total_count: page.total,
        })
    }

    pub async fn get(&self, id: i64) -> AppResult<AssetDto> {
        Ok(self.store.get_asset(id).await?.into())
    }

    pub async fn get_by_code(&self, asset_code: &str) -> AppResult<AssetDto> {
        validate_asset_code(Some(asset_code)).map_err(AppError::bad_request)?;
        self.store
            .find_asset_by_code(asset_code)
            .await?
            .map(AssetDto::from)
            .ok_or_else(|| AppError::not_found(format!("Asset {} not found", asset_code.to_uppercase())))
    }

    pub async fn code_exists(&self, asset_code: &str) -> AppResult<CodeExistsDto> {
        validate_asset_code(Some(asset_code)).map_err(AppError::bad_request)?;
        let exists = self.store.asset_code_exists(asset_code).await?;
        Ok(CodeExistsDto {
            asset_code: asset_code.to_uppercase(),
            exists,
        })
    }

    /// Preview of the code the next create with these parameters would get.
    pub async fn next_code(&self, params: &NextCodeParams) -> AppResult<AssetCodeDto> {
        let prefix = params
            .prefix
            .as_deref()
            .ok_or_else(|| AppError::field("prefix", "prefix is required"))?;
        let mut request = CodeRequest::new(prefix, params.brand.as_deref(), None, params.is_dummy.unwrap_or(false));
        if let Some(year) = params.year {
            request.year = year;
        }
        let asset_code = AssetCodeGenerator::new(self.store.as_ref()).next(&request).await?;
        Ok(AssetCodeDto { asset_code })
    }

    pub async fn create(&self, dto: &CreateAssetDto) -> AppResult<AssetDto> {
        let serial = dto.serial_number.as_deref().unwrap_or_default().trim();
        if self.store.serial_number_exists(serial, None).await? {
            return Err(AppError::already_exists(format!(
                "An asset with serial number {} already exists",
                serial
            )));
        }

        let request = CodeRequest::new(
            dto.asset_code_prefix.as_deref().unwrap_or_default(),
            dto.details.brand.as_deref(),
            dto.details.purchase_date,
            dto.is_dummy,
        );
        let asset_code = AssetCodeGenerator::new(self.store.as_ref()).next(&request).await?;

        let new_asset = mapping::new_asset_from_create(dto, asset_code)?;
        let asset = self.store.insert_asset(new_asset).await?;
        info!("Created asset {} ({})", asset.asset_code, asset.id);
        Ok(asset.into())
    }

    pub async fn update(&self, id: i64, dto: &UpdateAssetDto) -> AppResult<AssetDto> {
        let mut asset = self.store.get_asset(id).await?;
        mapping::apply_asset_update(&mut asset, dto)?;

        if self
            .store
            .serial_number_exists(&asset.serial_number, Some(id))
            .await?
        {
            return Err(AppError::already_exists(format!(
                "An asset with serial number {} already exists",
                asset.serial_number
            )));
        }

        let updated = self.store.update_asset(&asset).await?;
        info!("Updated asset {} to version {}", updated.asset_code, updated.row_version);
        Ok(updated.into())
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.delete_asset(id).await?;
        info!("Deleted asset {}", id);
        Ok(())
    }

    /// Creates `quantity` assets one by one. A failing item is reported and
    /// the remaining items are still attempted.
    pub async fn bulk_create(&self, dto: &BulkCreateAssetDto, api: &ApiConfig) -> AppResult<BulkCreateResultDto> {
        if dto.quantity > i64::from(api.max_bulk_quantity) {
            return Err(AppError::field(
                "quantity",
                format!("quantity must not exceed {}", api.max_bulk_quantity),
            ));
        }
        let quantity = usize::try_from(dto.quantity)
            .map_err(|_| AppError::field("quantity", "quantity must be positive"))?;

        let template = match dto.template_id {
            Some(template_id) => {
                let template = self.store.get_template(template_id).await?;
                if !template.is_active {
                    return Err(AppError::field(
                        "templateId",
                        format!("Asset template {} is inactive", template_id),
                    ));
                }
                Some(template)
            }
            None => None,
        };

        let brand = dto
            .details
            .brand
            .clone()
            .or_else(|| template.as_ref().and_then(|t| t.brand.clone()));
        let purchase_date = dto
            .details
            .purchase_date
            .or_else(|| template.as_ref().and_then(|t| t.purchase_date));
        let request = CodeRequest::new(
            dto.asset_code_prefix.as_deref().unwrap_or_default(),
            brand.as_deref(),
            purchase_date,
            dto.is_dummy,
        );
        let codes = AssetCodeGenerator::new(self.store.as_ref())
            .batch(&request, quantity)
            .await?;

        let mut created = Vec::new();
        let mut failed = Vec::new();
        for (i, asset_code) in codes.into_iter().enumerate() {
            let serial = dto
                .serial_numbers
                .as_ref()
                .and_then(|serials| serials.get(i))
                .map(|s| s.trim().to_string())
                .unwrap_or_else(|| placeholder_serial(&asset_code));

            match self.create_one(dto, template.as_ref(), asset_code, serial.clone()).await {
                Ok(asset) => created.push(asset),
                Err(err) => {
                    warn!("Bulk item with serial {} failed: {}", serial, err);
                    failed.push(BulkFailureDto {
                        serial_number: serial,
                        error: err.public_message(),
                    });
                }
            }
        }

        info!(
            "Bulk create: {} requested, {} created, {} failed",
            quantity,
            created.len(),
            failed.len()
        );
        Ok(BulkCreateResultDto {
            total_requested: quantity,
            created_count: created.len(),
            failed_count: failed.len(),
            created,
            failed,
        })
    }

    async fn create_one(
        &self,
        dto: &BulkCreateAssetDto,
        template: Option<&crate::database::models::AssetTemplate>,
        asset_code: String,
        serial: String,
    ) -> AppResult<AssetDto> {
        if self.store.serial_number_exists(&serial, None).await? {
            return Err(AppError::already_exists(format!(
                "An asset with serial number {} already exists",
                serial
            )));
        }
        let new_asset = mapping::new_asset_from_bulk(dto, template, asset_code, serial)?;
        Ok(self.store.insert_asset(new_asset).await?.into())
    }
}
