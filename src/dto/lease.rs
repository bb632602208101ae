use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::validation::{FieldError, RuleSet, Validate};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseContractDto {
    pub id: i64,
    pub contract_number: String,
    pub vendor: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(with = "rust_decimal::serde::float")]
    pub monthly_rate: Decimal,
    pub notes: Option<String>,
    pub is_active_override: Option<bool>,
    /// Derived: the override when set, else whether today is within the term.
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of both `POST` and `PUT /api/lease-contracts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateLeaseContractDto {
    pub contract_number: Option<String>,
    pub vendor: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub monthly_rate: Option<Decimal>,
    pub notes: Option<String>,
    pub is_active_override: Option<bool>,
}

pub type UpdateLeaseContractDto = CreateLeaseContractDto;

impl Validate for CreateLeaseContractDto {
    fn validate(&self) -> Result<(), Vec<FieldError>> {
        RuleSet::new()
            .required("contractNumber", self.contract_number.as_deref(), 50)
            .required("vendor", self.vendor.as_deref(), 200)
            .present("startDate", self.start_date)
            .present("endDate", self.end_date)
            .date_after("endDate", self.end_date, "startDate", self.start_date)
            .min(
                "monthlyRate",
                self.monthly_rate.unwrap_or(Decimal::ZERO),
                Decimal::ZERO,
            )
            .max_len("notes", self.notes.as_deref(), 2000)
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaseListParams {
    pub active_only: Option<bool>,
}
