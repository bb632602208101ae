use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::types::AssetStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    pub id: i64,
    pub asset_code: String,
    pub asset_name: Option<String>,
    pub category: String,
    pub is_dummy: bool,
    pub serial_number: String,
    pub status: AssetStatus,
    pub owner: Option<String>,
    pub building: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub office_location: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub intune_device_id: Option<Uuid>,
    pub notes: Option<String>,
    pub row_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Column values for an INSERT; identity, version and timestamps are
/// assigned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAsset {
    pub asset_code: String,
    pub asset_name: Option<String>,
    pub category: String,
    pub is_dummy: bool,
    pub serial_number: String,
    pub status: AssetStatus,
    pub owner: Option<String>,
    pub building: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub office_location: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub intune_device_id: Option<Uuid>,
    pub notes: Option<String>,
}

/// Raw `assets` row; `status` is stored as text.
#[derive(Debug, FromRow)]
pub struct AssetRow {
    pub id: i64,
    pub asset_code: String,
    pub asset_name: Option<String>,
    pub category: String,
    pub is_dummy: bool,
    pub serial_number: String,
    pub status: String,
    pub owner: Option<String>,
    pub building: Option<String>,
    pub department: Option<String>,
    pub job_title: Option<String>,
    pub office_location: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub intune_device_id: Option<Uuid>,
    pub notes: Option<String>,
    pub row_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<AssetRow> for Asset {
    type Error = DatabaseError;

    fn try_from(row: AssetRow) -> Result<Self, Self::Error> {
        let status = row.status.parse::<AssetStatus>().map_err(|e| {
            DatabaseError::InvalidData(format!("asset {} has {}", row.id, e))
        })?;
        Ok(Asset {
            id: row.id,
            asset_code: row.asset_code,
            asset_name: row.asset_name,
            category: row.category,
            is_dummy: row.is_dummy,
            serial_number: row.serial_number,
            status,
            owner: row.owner,
            building: row.building,
            department: row.department,
            job_title: row.job_title,
            office_location: row.office_location,
            brand: row.brand,
            model: row.model,
            purchase_date: row.purchase_date,
            warranty_expiry: row.warranty_expiry,
            installation_date: row.installation_date,
            intune_device_id: row.intune_device_id,
            notes: row.notes,
            row_version: row.row_version,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        })
    }
}

/// Listing criteria for `GET /api/assets`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssetQuery {
    pub status: Option<AssetStatus>,
    pub category: Option<String>,
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

impl AssetQuery {
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.page_size)
    }

    /// Case-insensitive match used by the in-memory store; mirrors the
    /// `ILIKE` clause of the PostgreSQL store.
    pub fn matches(&self, asset: &Asset) -> bool {
        if asset.deleted_at.is_some() {
            return false;
        }
        if let Some(status) = self.status {
            if asset.status != status {
                return false;
            }
        }
        if let Some(category) = &self.category {
            if !asset.category.eq_ignore_ascii_case(category) {
                return false;
            }
        }
        match &self.search {
            Some(term) => {
                let needle = term.to_lowercase();
                [
                    Some(&asset.asset_code),
                    Some(&asset.serial_number),
                    asset.asset_name.as_ref(),
                    asset.owner.as_ref(),
                    asset.brand.as_ref(),
                    asset.model.as_ref(),
                ]
                .into_iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(&needle))
            }
            None => true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AssetPage {
    pub items: Vec<Asset>,
    pub total: i64,
}
