//! Asset-code generation: `[DUM-]PREFIX-YY-BRAND-NNNNN`.

use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate, Utc};
use thiserror::Error;

use crate::database::{DatabaseError, InventoryStore};
use crate::validation::{validate_asset_code, validate_prefix};

pub const REGULAR_SEQUENCE: RangeInclusive<u32> = 1..=89_999;
pub const DUMMY_SEQUENCE: RangeInclusive<u32> = 90_001..=99_999;
pub const DUMMY_MARKER: &str = "DUM-";
const GENERIC_BRAND: &str = "GEN";
const BRAND_LENGTH: usize = 4;

#[derive(Debug, Error, PartialEq)]
pub enum CodeGenerationError {
    #[error("{0}")]
    InvalidPrefix(String),

    #[error("sequence exhausted for {0}")]
    SequenceExhausted(String),

    #[error("generated asset code is invalid: {0}")]
    InvalidCode(String),
}

/// The parts that determine a code's stem.
#[derive(Debug, Clone, PartialEq)]
pub struct CodeRequest {
    pub prefix: String,
    pub brand: Option<String>,
    pub year: i32,
    pub is_dummy: bool,
}

impl CodeRequest {
    /// `year` from the purchase date when known, else the current year.
    pub fn new(prefix: &str, brand: Option<&str>, purchase_date: Option<NaiveDate>, is_dummy: bool) -> Self {
        let year = purchase_date
            .map(|d| d.year())
            .unwrap_or_else(|| Utc::now().year());
        Self {
            prefix: prefix.trim().to_uppercase(),
            brand: brand.map(str::to_string),
            year,
            is_dummy,
        }
    }

    /// e.g. `LAP-24-DELL-` or `DUM-LAP-24-GEN-`
    pub fn stem(&self) -> Result<String, CodeGenerationError> {
        validate_prefix(Some(&self.prefix)).map_err(CodeGenerationError::InvalidPrefix)?;
        let letters = self.prefix.len();
        if !(2..=10).contains(&letters) || !self.prefix.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(CodeGenerationError::InvalidPrefix(
                "Prefix must be 2 to 10 letters".to_string(),
            ));
        }

        Ok(format!(
            "{}{}-{:02}-{}-",
            if self.is_dummy { DUMMY_MARKER } else { "" },
            self.prefix,
            self.year.rem_euclid(100),
            brand_segment(self.brand.as_deref())
        ))
    }

    pub fn sequence(&self) -> RangeInclusive<u32> {
        if self.is_dummy {
            DUMMY_SEQUENCE
        } else {
            REGULAR_SEQUENCE
        }
    }
}

/// First four ASCII alphanumerics of the brand, upper-cased.
pub fn brand_segment(brand: Option<&str>) -> String {
    let segment: String = brand
        .unwrap_or_default()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .take(BRAND_LENGTH)
        .collect::<String>()
        .to_uppercase();
    if segment.is_empty() {
        GENERIC_BRAND.to_string()
    } else {
        segment
    }
}

/// Sequence number of `code` when it belongs to `stem`.
pub fn sequence_of(code: &str, stem: &str) -> Option<u32> {
    let rest = code.to_uppercase().strip_prefix(stem)?.to_string();
    if rest.len() != 5 || !rest.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    rest.parse().ok()
}

/// Code following the highest existing number in `range` (or the first of
/// the range), validated against the asset-code format.
pub fn next_code<'a, I>(stem: &str, range: RangeInclusive<u32>, existing: I) -> Result<String, CodeGenerationError>
where
    I: IntoIterator<Item = &'a str>,
{
    let highest = existing
        .into_iter()
        .filter_map(|code| sequence_of(code, stem))
        .filter(|n| range.contains(n))
        .max();

    let next = match highest {
        Some(n) if n >= *range.end() => {
            return Err(CodeGenerationError::SequenceExhausted(stem.to_string()))
        }
        Some(n) => n + 1,
        None => *range.start(),
    };

    let code = format!("{}{:05}", stem, next);
    validate_asset_code(Some(&code)).map_err(CodeGenerationError::InvalidCode)?;
    Ok(code)
}

#[derive(Debug, Error)]
pub enum AssetCodeError {
    #[error(transparent)]
    Generation(#[from] CodeGenerationError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Produces the next free codes for a stem, consulting the store.
pub struct AssetCodeGenerator<'a> {
    store: &'a dyn InventoryStore,
}

impl<'a> AssetCodeGenerator<'a> {
    pub fn new(store: &'a dyn InventoryStore) -> Self {
        Self { store }
    }

    pub async fn next(&self, request: &CodeRequest) -> Result<String, AssetCodeError> {
        let mut codes = self.batch(request, 1).await?;
        codes
            .pop()
            .ok_or_else(|| CodeGenerationError::SequenceExhausted(request.stem().unwrap_or_default()).into())
    }

    /// `count` consecutive codes following the highest one in use.
    pub async fn batch(&self, request: &CodeRequest, count: usize) -> Result<Vec<String>, AssetCodeError> {
        let stem = request.stem()?;
        let mut existing = self.store.asset_codes_with_stem(&stem).await?;
        let mut codes = Vec::with_capacity(count);
        for _ in 0..count {
            let code = next_code(&stem, request.sequence(), existing.iter().map(String::as_str))?;
            existing.push(code.clone());
            codes.push(code);
        }
        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::MemoryStore;

    fn request(prefix: &str, brand: Option<&str>, is_dummy: bool) -> CodeRequest {
        CodeRequest {
            prefix: prefix.to_string(),
            brand: brand.map(str::to_string),
            year: 2024,
            is_dummy,
        }
    }

    #[test]
    fn builds_stem_from_parts() {
        assert_eq!(request("LAP", Some("Dell"), false).stem().unwrap(), "LAP-24-DELL-");
        assert_eq!(request("LAP", Some("h.p."), true).stem().unwrap(), "DUM-LAP-24-HP-");
        assert_eq!(request("MON", None, false).stem().unwrap(), "MON-24-GEN-");
        assert_eq!(request("MON", Some("Lenovo"), false).stem().unwrap(), "MON-24-LENO-");
    }

    #[test]
    fn rejects_prefixes_the_code_format_cannot_hold() {
        assert!(matches!(
            request("L", None, false).stem(),
            Err(CodeGenerationError::InvalidPrefix(_))
        ));
        assert!(matches!(
            request("LAP1", None, false).stem(),
            Err(CodeGenerationError::InvalidPrefix(_))
        ));
        assert!(matches!(
            request("lap", None, false).stem(),
            Err(CodeGenerationError::InvalidPrefix(_))
        ));
    }

    #[test]
    fn request_upper_cases_prefix_and_uses_purchase_year() {
        let r = CodeRequest::new(" lap ", None, NaiveDate::from_ymd_opt(2019, 5, 1), false);
        assert_eq!(r.stem().unwrap(), "LAP-19-GEN-");
    }

    #[test]
    fn sequences_continue_after_highest() {
        let existing = ["LAP-24-DELL-00001", "LAP-24-DELL-00007", "LAP-24-HP-00099"];
        let code = next_code("LAP-24-DELL-", REGULAR_SEQUENCE, existing).unwrap();
        assert_eq!(code, "LAP-24-DELL-00008");
    }

    #[test]
    fn dummy_sequences_start_at_90001() {
        let code = next_code("DUM-LAP-24-DELL-", DUMMY_SEQUENCE, []).unwrap();
        assert_eq!(code, "DUM-LAP-24-DELL-90001");
        assert!(validate_asset_code(Some(&code)).is_ok());
    }

    #[test]
    fn exhausted_sequence_is_an_error() {
        let err = next_code("LAP-24-DELL-", REGULAR_SEQUENCE, ["LAP-24-DELL-89999"]).unwrap_err();
        assert_eq!(err, CodeGenerationError::SequenceExhausted("LAP-24-DELL-".into()));
    }

    #[test]
    fn ignores_codes_from_other_stems() {
        assert_eq!(sequence_of("LAP-24-DELL-00042", "LAP-24-DELL-"), Some(42));
        assert_eq!(sequence_of("DUM-LAP-24-DELL-90001", "LAP-24-DELL-"), None);
        assert_eq!(sequence_of("LAP-24-DELL-0042", "LAP-24-DELL-"), None);
    }

    #[tokio::test]
    async fn batch_reserves_consecutive_codes() {
        let store = MemoryStore::new();
        let generator = AssetCodeGenerator::new(&store);
        let codes = generator.batch(&request("LAP", Some("Dell"), false), 3).await.unwrap();
        assert_eq!(
            codes,
            vec!["LAP-24-DELL-00001", "LAP-24-DELL-00002", "LAP-24-DELL-00003"]
        );
    }
}
