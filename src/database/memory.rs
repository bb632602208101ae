use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::manager::DatabaseError;
use super::models::{
    Asset, AssetPage, AssetQuery, AssetTemplate, LeaseContract, LeaseFields, NewAsset,
    TemplateFields,
};
use super::store::InventoryStore;

#[derive(Default)]
struct Tables {
    assets: BTreeMap<i64, Asset>,
    templates: BTreeMap<i64, AssetTemplate>,
    leases: BTreeMap<i64, LeaseContract>,
    next_asset_id: i64,
    next_template_id: i64,
    next_lease_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

/// Process-local `InventoryStore` with the same uniqueness and versioning
/// rules as the PostgreSQL schema. Used by `serve --in-memory` and tests.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn ping(&self) -> Result<(), DatabaseError> {
        Ok(())
    }

    async fn list_assets(&self, query: &AssetQuery) -> Result<AssetPage, DatabaseError> {
        let tables = self.tables.read().await;
        let mut matching: Vec<&Asset> = tables.assets.values().filter(|a| query.matches(a)).collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        let total = matching.len() as i64;
        let items = matching
            .into_iter()
            .skip(query.offset() as usize)
            .take(query.page_size as usize)
            .cloned()
            .collect();
        Ok(AssetPage { items, total })
    }

    async fn get_asset(&self, id: i64) -> Result<Asset, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .assets
            .get(&id)
            .filter(|a| a.deleted_at.is_none())
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset {} not found", id)))
    }

    async fn find_asset_by_code(&self, asset_code: &str) -> Result<Option<Asset>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .values()
            .find(|a| a.deleted_at.is_none() && a.asset_code.eq_ignore_ascii_case(asset_code))
            .cloned())
    }

    async fn asset_code_exists(&self, asset_code: &str) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .values()
            .any(|a| a.asset_code.eq_ignore_ascii_case(asset_code)))
    }

    async fn serial_number_exists(
        &self,
        serial_number: &str,
        exclude_id: Option<i64>,
    ) -> Result<bool, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .values()
            .any(|a| a.serial_number == serial_number && Some(a.id) != exclude_id))
    }

    async fn asset_codes_with_stem(&self, stem: &str) -> Result<Vec<String>, DatabaseError> {
        let tables = self.tables.read().await;
        Ok(tables
            .assets
            .values()
            .filter(|a| a.asset_code.starts_with(stem))
            .map(|a| a.asset_code.clone())
            .collect())
    }

    async fn insert_asset(&self, asset: NewAsset) -> Result<Asset, DatabaseError> {
        let mut tables = self.tables.write().await;
        let code = asset.asset_code.to_uppercase();
        if tables.assets.values().any(|a| a.asset_code == code) {
            return Err(DatabaseError::Duplicate(
                "An asset with this asset code already exists".to_string(),
            ));
        }
        if tables.assets.values().any(|a| a.serial_number == asset.serial_number) {
            return Err(DatabaseError::Duplicate(
                "An asset with this serial number already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let id = next_id(&mut tables.next_asset_id);
        let stored = Asset {
            id,
            asset_code: code,
            asset_name: asset.asset_name,
            category: asset.category,
            is_dummy: asset.is_dummy,
            serial_number: asset.serial_number,
            status: asset.status,
            owner: asset.owner,
            building: asset.building,
            department: asset.department,
            job_title: asset.job_title,
            office_location: asset.office_location,
            brand: asset.brand,
            model: asset.model,
            purchase_date: asset.purchase_date,
            warranty_expiry: asset.warranty_expiry,
            installation_date: asset.installation_date,
            intune_device_id: asset.intune_device_id,
            notes: asset.notes,
            row_version: 1,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        tables.assets.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_asset(&self, asset: &Asset) -> Result<Asset, DatabaseError> {
        let mut tables = self.tables.write().await;
        let serial_taken = tables
            .assets
            .values()
            .any(|a| a.id != asset.id && a.serial_number == asset.serial_number);

        let current = tables
            .assets
            .get_mut(&asset.id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset {} not found", asset.id)))?;
        if current.row_version != asset.row_version {
            return Err(DatabaseError::Concurrency(format!(
                "Asset {} was modified by another request",
                asset.id
            )));
        }
        if serial_taken {
            return Err(DatabaseError::Duplicate(
                "An asset with this serial number already exists".to_string(),
            ));
        }

        let mut updated = asset.clone();
        updated.asset_code = current.asset_code.clone();
        updated.is_dummy = current.is_dummy;
        updated.created_at = current.created_at;
        updated.deleted_at = None;
        updated.row_version = current.row_version + 1;
        updated.updated_at = Utc::now();
        *current = updated.clone();
        Ok(updated)
    }

    async fn delete_asset(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let asset = tables
            .assets
            .get_mut(&id)
            .filter(|a| a.deleted_at.is_none())
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset {} not found", id)))?;
        let now = Utc::now();
        asset.deleted_at = Some(now);
        asset.updated_at = now;
        asset.row_version += 1;
        Ok(())
    }

    async fn list_templates(&self, include_inactive: bool) -> Result<Vec<AssetTemplate>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut templates: Vec<AssetTemplate> = tables
            .templates
            .values()
            .filter(|t| include_inactive || t.is_active)
            .cloned()
            .collect();
        templates.sort_by(|a, b| a.template_name.cmp(&b.template_name));
        Ok(templates)
    }

    async fn get_template(&self, id: i64) -> Result<AssetTemplate, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .templates
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset template {} not found", id)))
    }

    async fn insert_template(&self, fields: TemplateFields) -> Result<AssetTemplate, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables.templates.values().any(|t| t.template_name == fields.template_name) {
            return Err(DatabaseError::Duplicate(
                "A template with this name already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let id = next_id(&mut tables.next_template_id);
        let template = AssetTemplate {
            id,
            template_name: fields.template_name,
            asset_name: fields.asset_name,
            category: fields.category,
            brand: fields.brand,
            model: fields.model,
            owner: fields.owner,
            building: fields.building,
            department: fields.department,
            office_location: fields.office_location,
            purchase_date: fields.purchase_date,
            warranty_expiry: fields.warranty_expiry,
            installation_date: fields.installation_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        tables.templates.insert(id, template.clone());
        Ok(template)
    }

    async fn update_template(
        &self,
        id: i64,
        fields: TemplateFields,
    ) -> Result<AssetTemplate, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .templates
            .values()
            .any(|t| t.id != id && t.template_name == fields.template_name)
        {
            return Err(DatabaseError::Duplicate(
                "A template with this name already exists".to_string(),
            ));
        }
        let template = tables
            .templates
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset template {} not found", id)))?;
        template.template_name = fields.template_name;
        template.asset_name = fields.asset_name;
        template.category = fields.category;
        template.brand = fields.brand;
        template.model = fields.model;
        template.owner = fields.owner;
        template.building = fields.building;
        template.department = fields.department;
        template.office_location = fields.office_location;
        template.purchase_date = fields.purchase_date;
        template.warranty_expiry = fields.warranty_expiry;
        template.installation_date = fields.installation_date;
        template.updated_at = Utc::now();
        Ok(template.clone())
    }

    async fn deactivate_template(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        let template = tables
            .templates
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Asset template {} not found", id)))?;
        template.is_active = false;
        template.updated_at = Utc::now();
        Ok(())
    }

    async fn list_leases(&self) -> Result<Vec<LeaseContract>, DatabaseError> {
        let tables = self.tables.read().await;
        let mut leases: Vec<LeaseContract> = tables.leases.values().cloned().collect();
        leases.sort_by(|a, b| b.end_date.cmp(&a.end_date).then(b.id.cmp(&a.id)));
        Ok(leases)
    }

    async fn get_lease(&self, id: i64) -> Result<LeaseContract, DatabaseError> {
        let tables = self.tables.read().await;
        tables
            .leases
            .get(&id)
            .cloned()
            .ok_or_else(|| DatabaseError::NotFound(format!("Lease contract {} not found", id)))
    }

    async fn insert_lease(&self, fields: LeaseFields) -> Result<LeaseContract, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .leases
            .values()
            .any(|l| l.contract_number == fields.contract_number)
        {
            return Err(DatabaseError::Duplicate(
                "A lease contract with this contract number already exists".to_string(),
            ));
        }
        let now = Utc::now();
        let id = next_id(&mut tables.next_lease_id);
        let lease = LeaseContract {
            id,
            contract_number: fields.contract_number,
            vendor: fields.vendor,
            start_date: fields.start_date,
            end_date: fields.end_date,
            monthly_rate: fields.monthly_rate,
            notes: fields.notes,
            is_active_override: fields.is_active_override,
            created_at: now,
            updated_at: now,
        };
        tables.leases.insert(id, lease.clone());
        Ok(lease)
    }

    async fn update_lease(&self, id: i64, fields: LeaseFields) -> Result<LeaseContract, DatabaseError> {
        let mut tables = self.tables.write().await;
        if tables
            .leases
            .values()
            .any(|l| l.id != id && l.contract_number == fields.contract_number)
        {
            return Err(DatabaseError::Duplicate(
                "A lease contract with this contract number already exists".to_string(),
            ));
        }
        let lease = tables
            .leases
            .get_mut(&id)
            .ok_or_else(|| DatabaseError::NotFound(format!("Lease contract {} not found", id)))?;
        lease.contract_number = fields.contract_number;
        lease.vendor = fields.vendor;
        lease.start_date = fields.start_date;
        lease.end_date = fields.end_date;
        lease.monthly_rate = fields.monthly_rate;
        lease.notes = fields.notes;
        lease.is_active_override = fields.is_active_override;
        lease.updated_at = Utc::now();
        Ok(lease.clone())
    }

    async fn delete_lease(&self, id: i64) -> Result<(), DatabaseError> {
        let mut tables = self.tables.write().await;
        tables
            .leases
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| DatabaseError::NotFound(format!("Lease contract {} not found", id)))
    }
}
