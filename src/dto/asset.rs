use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::AssetStatus;
use crate::validation::{
    validate_device_id, validate_prefix, validate_serial_number, FieldError, RuleSet, Validate,
};

pub const MAX_BULK_QUANTITY: i64 = 100;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDto {
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
    pub intune_device_id: Option<uuid::Uuid>,
    pub notes: Option<String>,
    pub row_version: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Descriptive fields shared by create, update and bulk requests.
///
/// `status` stays a string here; unknown values fall back during mapping
/// instead of failing the request.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetDetails {
    pub asset_name: Option<String>,
    pub status: Option<String>,
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
    pub intune_device_id: Option<String>,
    pub notes: Option<String>,
}

impl AssetDetails {
    fn rules(&self, rules: RuleSet) -> RuleSet {
        rules
            .max_len("assetName", self.asset_name.as_deref(), 200)
            .max_len("owner", self.owner.as_deref(), 200)
            .max_len("building", self.building.as_deref(), 200)
            .max_len("department", self.department.as_deref(), 200)
            .max_len("jobTitle", self.job_title.as_deref(), 200)
            .max_len("officeLocation", self.office_location.as_deref(), 200)
            .max_len("brand", self.brand.as_deref(), 100)
            .max_len("model", self.model.as_deref(), 100)
            .max_len("notes", self.notes.as_deref(), 2000)
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
    }
}

fn prefix_rules(rules: RuleSet, prefix: Option<&str>) -> RuleSet {
    let rules = rules.required("assetCodePrefix", prefix, 20);
    match prefix {
        Some(p) if !p.trim().is_empty() => {
            rules.check("assetCodePrefix", || validate_prefix(Some(p.trim())))
        }
        _ => rules,
    }
}

fn serial_rules(rules: RuleSet, serial: Option<&str>) -> RuleSet {
    let rules = rules.required("serialNumber", serial, 100);
    match serial {
        Some(s) if !s.trim().is_empty() => {
            rules.check("serialNumber", || validate_serial_number(Some(s)))
        }
        _ => rules,
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssetDto {
    pub asset_code_prefix: Option<String>,
    #[serde(default)]
    pub is_dummy: bool,
    pub category: Option<String>,
    pub serial_number: Option<String>,
    #[serde(flatten)]
    pub details: AssetDetails,
}

impl Validate for CreateAssetDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let rules = prefix_rules(RuleSet::new(), self.asset_code_prefix.as_deref());
        let rules = serial_rules(rules, self.serial_number.as_deref());
        let rules = rules
            .required("category", self.category.as_deref(), 100)
            .check_optional(
                "intuneDeviceId",
                self.details.intune_device_id.as_deref(),
                |id| validate_device_id(Some(id)),
            );
        self.details.rules(rules).finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssetDto {
    pub category: Option<String>,
    pub serial_number: Option<String>,
    /// Optimistic-concurrency token from the last read; omitted means
    /// "overwrite whatever is stored".
    pub row_version: Option<i32>,
    #[serde(flatten)]
    pub details: AssetDetails,
}

impl Validate for UpdateAssetDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let rules = serial_rules(RuleSet::new(), self.serial_number.as_deref());
        let rules = rules
            .required("category", self.category.as_deref(), 100)
            .check_optional(
                "intuneDeviceId",
                self.details.intune_device_id.as_deref(),
                |id| validate_device_id(Some(id)),
            );
        self.details.rules(rules).finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateAssetDto {
    pub asset_code_prefix: Option<String>,
    #[serde(default)]
    pub is_dummy: bool,
    pub category: Option<String>,
    #[serde(default)]
    pub quantity: i64,
    /// One serial per asset; when omitted every asset gets a `TBD-` placeholder.
    pub serial_numbers: Option<Vec<String>>,
    pub template_id: Option<i64>,
    #[serde(flatten)]
    pub details: AssetDetails,
}

impl Validate for BulkCreateAssetDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut rules = prefix_rules(RuleSet::new(), self.asset_code_prefix.as_deref())
            .required("category", self.category.as_deref(), 100)
            .range("quantity", self.quantity, 1, MAX_BULK_QUANTITY)
            .check("intuneDeviceId", || match self.details.intune_device_id {
                Some(_) => Err("intuneDeviceId cannot be set for bulk creation".to_string()),
                None => Ok(()),
            });

        if let Some(serials) = &self.serial_numbers {
            rules = rules.check("serialNumbers", || {
                if serials.len() as i64 != self.quantity {
                    return Err(format!(
                        "serialNumbers must contain exactly {} entries",
                        self.quantity
                    ));
                }
                Ok(())
            });
            for (i, serial) in serials.iter().enumerate() {
                let field = format!("serialNumbers[{}]", i);
                rules = rules.check(&field, || validate_serial_number(Some(serial)));
            }
            rules = rules.check("serialNumbers", || {
                let mut seen = std::collections::HashSet::new();
                match serials.iter().map(|s| s.trim()).find(|s| !seen.insert(*s)) {
                    Some(dup) => Err(format!("serialNumbers contains duplicate value '{}'", dup)),
                    None => Ok(()),
                }
            });
        }

        self.details.rules(rules).finish()
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkFailureDto {
    pub serial_number: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkCreateResultDto {
    pub total_requested: usize,
    pub created_count: usize,
    pub failed_count: usize,
    pub created: Vec<AssetDto>,
    pub failed: Vec<BulkFailureDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListDto {
    pub items: Vec<AssetDto>,
    pub page: u32,
    pub page_size: u32,
    pub total_count: i64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetListParams {
    pub status: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NextCodeParams {
    pub prefix: Option<String>,
    pub brand: Option<String>,
    pub year: Option<i32>,
    pub is_dummy: Option<bool>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetCodeDto {
    pub asset_code: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeExistsDto {
    pub asset_code: String,
    pub exists: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create(purchase: &str, warranty: &str) -> CreateAssetDto {
        serde_json::from_value(serde_json::json!({
            "assetCodePrefix": "LAP",
            "category": "Laptop",
            "serialNumber": "5CG1234XYZ",
            "purchaseDate": purchase,
            "warrantyExpiry": warranty,
        }))
        .unwrap()
    }

    #[test]
    fn warranty_must_follow_purchase() {
        let errors = create("2024-01-01", "2023-12-31").validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "warrantyExpiry");
        assert_eq!(errors[0].message, "warrantyExpiry must be after purchaseDate");

        assert!(create("2023-12-31", "2024-01-01").validate().is_ok());
    }

    #[test]
    fn create_reports_all_missing_fields() {
        let errors = CreateAssetDto::default().validate().unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["assetCodePrefix", "serialNumber", "category"]);
    }

    #[test]
    fn create_checks_formats() {
        let dto: CreateAssetDto = serde_json::from_value(serde_json::json!({
            "assetCodePrefix": "lap",
            "category": "Laptop",
            "serialNumber": "<script>",
            "intuneDeviceId": "not-a-guid",
        }))
        .unwrap();
        let fields: Vec<String> = dto
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["assetCodePrefix", "serialNumber", "intuneDeviceId"]);
    }

    #[test]
    fn bulk_serials_must_match_quantity_and_be_unique() {
        let dto: BulkCreateAssetDto = serde_json::from_value(serde_json::json!({
            "assetCodePrefix": "LAP",
            "category": "Laptop",
            "quantity": 3,
            "serialNumbers": ["A1", "A1"],
        }))
        .unwrap();
        let messages: Vec<String> = dto
            .validate()
            .unwrap_err()
            .into_iter()
            .map(|e| e.message)
            .collect();
        assert!(messages.contains(&"serialNumbers must contain exactly 3 entries".to_string()));
        assert!(messages.contains(&"serialNumbers contains duplicate value 'A1'".to_string()));
    }

    #[test]
    fn bulk_quantity_is_bounded() {
        let mut dto = BulkCreateAssetDto {
            asset_code_prefix: Some("LAP".into()),
            category: Some("Laptop".into()),
            quantity: 101,
            ..Default::default()
        };
        assert_eq!(dto.validate().unwrap_err()[0].field, "quantity");
        dto.quantity = 100;
        assert!(dto.validate().is_ok());
    }

    #[test]
    fn update_ignores_asset_code_in_body() {
        let dto: UpdateAssetDto = serde_json::from_value(serde_json::json!({
            "assetCode": "LAP-24-DELL-00001",
            "category": "Laptop",
            "serialNumber": "SN1",
            "rowVersion": 3,
        }))
        .unwrap();
        assert!(dto.validate().is_ok());
        assert_eq!(dto.row_version, Some(3));
    }
}
