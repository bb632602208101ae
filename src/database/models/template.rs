use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AssetTemplate {
    pub id: i64,
    pub template_name: String,
    pub asset_name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub owner: Option<String>,
    pub building: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable template columns, shared by create and update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TemplateFields {
    pub template_name: String,
    pub asset_name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub owner: Option<String>,
    pub building: Option<String>,
    pub department: Option<String>,
    pub office_location: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub warranty_expiry: Option<NaiveDate>,
    pub installation_date: Option<NaiveDate>,
}
