use std::sync::Arc;

use tracing::info;

use crate::database::InventoryStore;
use crate::dto::{AssetTemplateDto, CreateAssetTemplateDto, UpdateAssetTemplateDto};
use crate::error::AppResult;
use crate::mapping;

pub struct TemplateService {
    store: Arc<dyn InventoryStore>,
}

impl TemplateService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self, include_inactive: bool) -> AppResult<Vec<AssetTemplateDto>> {
        let templates = self.store.list_templates(include_inactive).await?;
        Ok(templates.into_iter().map(AssetTemplateDto::from).collect())
    }

    pub async fn get(&self, id: i64) -> AppResult<AssetTemplateDto> {
        Ok(self.store.get_template(id).await?.into())
    }

    pub async fn create(&self, dto: &CreateAssetTemplateDto) -> AppResult<AssetTemplateDto> {
        let template = self.store.insert_template(mapping::template_fields(dto)?).await?;
        info!("Created asset template '{}' ({})", template.template_name, template.id);
        Ok(template.into())
    }

    pub async fn update(&self, id: i64, dto: &UpdateAssetTemplateDto) -> AppResult<AssetTemplateDto> {
        let template = self
            .store
            .update_template(id, mapping::template_fields(dto)?)
            .await?;
        Ok(template.into())
    }

    /// Templates are deactivated, never removed.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.store.deactivate_template(id).await?;
        info!("Deactivated asset template {}", id);
        Ok(())
    }
}
