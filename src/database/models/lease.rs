use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct LeaseContract {
    pub id: i64,
    pub contract_number: String,
    pub vendor: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate: Decimal,
    pub notes: Option<String>,
    pub is_active_override: Option<bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LeaseContract {
    /// A manual override wins; otherwise the contract is active on every
    /// day of its (inclusive) date range.
    pub fn is_active_on(&self, today: NaiveDate) -> bool {
        match self.is_active_override {
            Some(active) => active,
            None => self.start_date <= today && today <= self.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LeaseFields {
    pub contract_number: String,
    pub vendor: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub monthly_rate: Decimal,
    pub notes: Option<String>,
    pub is_active_override: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lease(override_flag: Option<bool>) -> LeaseContract {
        LeaseContract {
            id: 1,
            contract_number: "LC-2024-001".into(),
            vendor: "Dell Financial".into(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            monthly_rate: Decimal::new(4550, 2),
            notes: None,
            is_active_override: override_flag,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn active_within_inclusive_range() {
        let l = lease(None);
        assert!(l.is_active_on(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()));
        assert!(l.is_active_on(NaiveDate::from_ymd_opt(2026, 12, 31).unwrap()));
        assert!(!l.is_active_on(NaiveDate::from_ymd_opt(2027, 1, 1).unwrap()));
        assert!(!l.is_active_on(NaiveDate::from_ymd_opt(2023, 12, 31).unwrap()));
    }

    #[test]
    fn override_wins_over_dates() {
        let inside = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert!(!lease(Some(false)).is_active_on(inside));
        assert!(lease(Some(true)).is_active_on(NaiveDate::from_ymd_opt(2030, 1, 1).unwrap()));
    }
}
