//! Declarative field rules for request DTOs.
//!
//! A [`RuleSet`] is evaluated in order and never short-circuits: every
//! failing rule contributes one [`FieldError`], so a client sees all
//! problems with a request at once.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Implemented by every request body accepted through `ValidatedJson`.
pub trait Validate {
    fn validate(&self) -> Result<(), Vec<FieldError>>;
}

#[derive(Debug, Default)]
pub struct RuleSet {
    errors: Vec<FieldError>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self { errors: vec![] }
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Non-empty after trimming and at most `max` characters.
    pub fn required(mut self, field: &str, value: Option<&str>, max: usize) -> Self {
        match value {
            Some(v) if !v.trim().is_empty() => {
                if v.chars().count() > max {
                    self.push(field, format!("{} must not exceed {} characters", field, max));
                }
            }
            _ => self.push(field, format!("{} is required", field)),
        }
        self
    }

    /// For non-string required values such as dates.
    pub fn present<T>(mut self, field: &str, value: Option<T>) -> Self {
        if value.is_none() {
            self.push(field, format!("{} is required", field));
        }
        self
    }

    /// Length limit applied only when the value is present.
    pub fn max_len(mut self, field: &str, value: Option<&str>, max: usize) -> Self {
        if let Some(v) = value {
            if v.chars().count() > max {
                self.push(field, format!("{} must not exceed {} characters", field, max));
            }
        }
        self
    }

    /// Run an arbitrary validator and record its message on failure.
    pub fn check<F>(mut self, field: &str, validator: F) -> Self
    where
        F: FnOnce() -> Result<(), String>,
    {
        if let Err(message) = validator() {
            self.push(field, message);
        }
        self
    }

    /// Like [`RuleSet::check`], but only when `value` is present.
    pub fn check_optional<T, F>(self, field: &str, value: Option<T>, validator: F) -> Self
    where
        F: FnOnce(T) -> Result<(), String>,
    {
        match value {
            Some(v) => self.check(field, || validator(v)),
            None => self,
        }
    }

    /// `later > earlier`, evaluated only when both dates are present.
    pub fn date_after(
        mut self,
        field: &str,
        later: Option<NaiveDate>,
        other_field: &str,
        earlier: Option<NaiveDate>,
    ) -> Self {
        if let (Some(later), Some(earlier)) = (later, earlier) {
            if later <= earlier {
                self.push(field, format!("{} must be after {}", field, other_field));
            }
        }
        self
    }

    /// `later >= earlier`, evaluated only when both dates are present.
    pub fn date_on_or_after(
        mut self,
        field: &str,
        later: Option<NaiveDate>,
        other_field: &str,
        earlier: Option<NaiveDate>,
    ) -> Self {
        if let (Some(later), Some(earlier)) = (later, earlier) {
            if later < earlier {
                self.push(field, format!("{} must be on or after {}", field, other_field));
            }
        }
        self
    }

    pub fn range<T>(mut self, field: &str, value: T, min: T, max: T) -> Self
    where
        T: PartialOrd + Display,
    {
        if value < min || value > max {
            self.push(field, format!("{} must be between {} and {}", field, min, max));
        }
        self
    }

    pub fn min<T>(mut self, field: &str, value: T, min: T) -> Self
    where
        T: PartialOrd + Display,
    {
        if value < min {
            self.push(field, format!("{} must be at least {}", field, min));
        }
        self
    }

    pub fn finish(self) -> Result<(), Vec<FieldError>> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d)
    }

    #[test]
    fn collects_every_failure() {
        let errors = RuleSet::new()
            .required("serialNumber", None, 100)
            .required("category", Some("x".repeat(101).as_str()), 100)
            .max_len("brand", Some("b".repeat(101).as_str()), 100)
            .finish()
            .unwrap_err();

        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
        assert_eq!(fields, vec!["serialNumber", "category", "brand"]);
    }

    #[test]
    fn optional_limits_skip_missing_values() {
        assert!(RuleSet::new().max_len("notes", None, 10).finish().is_ok());
    }

    #[test]
    fn date_rules_need_both_dates() {
        assert!(RuleSet::new()
            .date_after("warrantyExpiry", date(2020, 1, 1), "purchaseDate", None)
            .date_on_or_after("installationDate", None, "purchaseDate", date(2024, 1, 1))
            .finish()
            .is_ok());
    }

    #[test]
    fn strict_and_inclusive_date_ordering() {
        let same = date(2024, 1, 1);
        let errors = RuleSet::new()
            .date_after("warrantyExpiry", same, "purchaseDate", same)
            .date_on_or_after("installationDate", same, "purchaseDate", same)
            .finish()
            .unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "warrantyExpiry");
        assert_eq!(errors[0].message, "warrantyExpiry must be after purchaseDate");
    }

    #[test]
    fn range_and_check_rules() {
        let errors = RuleSet::new()
            .range("quantity", 0, 1, 100)
            .check("assetCodePrefix", || Err("bad prefix".to_string()))
            .check_optional("intuneDeviceId", Some("x"), |_| Ok(()))
            .finish()
            .unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].message, "bad prefix");
    }
}
