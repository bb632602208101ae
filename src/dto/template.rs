use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, RuleSet, Validate};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetTemplateDto {
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

/// Body of both `POST` and `PUT /api/asset-templates`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetTemplateDto {
    pub template_name: Option<String>,
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

pub type UpdateAssetTemplateDto = CreateAssetTemplateDto;

impl Validate for CreateAssetTemplateDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        RuleSet::new()
            .required("templateName", self.template_name.as_deref(), 100)
            .max_len("assetName", self.asset_name.as_deref(), 200)
            .max_len("category", self.category.as_deref(), 100)
            .max_len("brand", self.brand.as_deref(), 100)
            .max_len("model", self.model.as_deref(), 100)
            .max_len("owner", self.owner.as_deref(), 200)
            .max_len("building", self.building.as_deref(), 200)
            .max_len("department", self.department.as_deref(), 200)
            .max_len("officeLocation", self.office_location.as_deref(), 200)
            .date_after(
                "warrantyExpiry",
                self.warranty_expiry,
                "purchaseDate",
                self.purchase_date,
            )
            .date_on_or_after(
                "installationDate",
                self.installation_date,
                "purchaseDate",
                self.purchase_date,
            )
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateListParams {
    pub include_inactive: Option<bool>,
}
