//! Format validators for identifiers and free-text inputs.
//!
//! Every validator takes the raw (possibly missing) value and returns
//! `Ok(())` or a human-readable message. Expected validation failures never
//! panic; callers turn the message into a 400 response.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

pub const MAX_PREFIX_LENGTH: usize = 20;
pub const MAX_ASSET_CODE_LENGTH: usize = 50;
pub const MAX_SERIAL_NUMBER_LENGTH: usize = 100;
pub const MAX_DEVICE_ID_LENGTH: usize = 100;
pub const DEFAULT_SEARCH_TERM_LENGTH: usize = 100;

static PREFIX_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z0-9]+$").expect("prefix pattern compiles"));

/// `[DUM-]TYPE-YY-MERK-NNNNN`, e.g. `LAP-24-DBK-00001` or `DUM-LAP-26-HP-90001`
static ASSET_CODE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(?:DUM-)?[A-Z]{2,10}-[0-9]{2}-[A-Z0-9]{1,4}-[0-9]{5}$")
        .expect("asset code pattern compiles")
});

const SERIAL_FORBIDDEN_CHARS: [char; 4] = ['<', '>', '\'', '"'];

const SEARCH_FORBIDDEN_SEQUENCES: [&str; 6] = ["--", ";", "/*", "*/", "xp_", "exec("];

fn required<'a>(value: Option<&'a str>, label: &str) -> Result<&'a str, String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(format!("{} is required", label)),
    }
}

fn max_length(value: &str, max: usize, label: &str) -> Result<(), String> {
    if value.chars().count() > max {
        return Err(format!("{} must not exceed {} characters", label, max));
    }
    Ok(())
}

/// Asset-code type prefix: upper-case letters and digits only.
pub fn validate_prefix(value: Option<&str>) -> Result<(), String> {
    let value = required(value, "Prefix")?;
    max_length(value, MAX_PREFIX_LENGTH, "Prefix")?;
    if !PREFIX_REGEX.is_match(value) {
        return Err("Prefix may only contain uppercase letters and digits".to_string());
    }
    Ok(())
}

pub fn validate_asset_code(value: Option<&str>) -> Result<(), String> {
    let value = required(value, "Asset code")?;
    max_length(value, MAX_ASSET_CODE_LENGTH, "Asset code")?;
    if !ASSET_CODE_REGEX.is_match(value) {
        return Err(
            "Asset code must match [DUM-]TYPE-YY-MERK-NNNNN (e.g. LAP-24-DBK-00001)".to_string(),
        );
    }
    Ok(())
}

pub fn validate_serial_number(value: Option<&str>) -> Result<(), String> {
    let value = required(value, "Serial number")?;
    max_length(value, MAX_SERIAL_NUMBER_LENGTH, "Serial number")?;
    if value.contains(&SERIAL_FORBIDDEN_CHARS[..]) {
        return Err("Serial number contains invalid characters".to_string());
    }
    Ok(())
}

/// Intune device ids are GUIDs.
pub fn validate_device_id(value: Option<&str>) -> Result<(), String> {
    let value = required(value, "Device ID")?;
    max_length(value, MAX_DEVICE_ID_LENGTH, "Device ID")?;
    if Uuid::parse_str(value.trim()).is_err() {
        return Err("Device ID must be a valid GUID".to_string());
    }
    Ok(())
}

pub fn validate_search_term(value: Option<&str>, max_len: usize) -> Result<(), String> {
    let value = required(value, "Search term")?;
    max_length(value, max_len, "Search term")?;
    let lowered = value.to_lowercase();
    if SEARCH_FORBIDDEN_SEQUENCES
        .iter()
        .any(|pattern| lowered.contains(pattern))
    {
        return Err("Search term contains invalid characters".to_string());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_asset_codes() {
        for code in [
            "LAP-24-DBK-00001",
            "DUM-LAP-26-HP-90001",
            "lap-24-dbk-00001",
            "MONITOR-25-DELL-12345",
        ] {
            assert!(validate_asset_code(Some(code)).is_ok(), "{} should be valid", code);
        }
    }

    #[test]
    fn rejects_malformed_asset_codes_with_message() {
        for code in [
            "LAP-4-DBK-1",
            "L-24-DBK-00001",
            "LAP-24-DBKXX-00001",
            "LAP-24-DBK-0001",
            "XYZ-LAP-24-DBK-00001",
            "LAP24DBK00001",
        ] {
            let err = validate_asset_code(Some(code)).unwrap_err();
            assert!(!err.is_empty(), "{} should carry a message", code);
        }
    }

    #[test]
    fn asset_code_required_and_bounded() {
        assert_eq!(validate_asset_code(None).unwrap_err(), "Asset code is required");
        assert!(validate_asset_code(Some("   ")).is_err());
        let long = format!("LAP-24-DBK-00001{}", "X".repeat(40));
        assert!(validate_asset_code(Some(&long))
            .unwrap_err()
            .contains("50 characters"));
    }

    #[test]
    fn prefix_must_be_uppercase_alphanumeric() {
        assert!(validate_prefix(Some("LAP")).is_ok());
        assert!(validate_prefix(Some("PC2")).is_ok());
        assert!(validate_prefix(Some("lap")).is_err());
        assert!(validate_prefix(Some("LAP-")).is_err());
        assert!(validate_prefix(Some(&"A".repeat(21))).is_err());
        assert!(validate_prefix(None).is_err());
    }

    #[test]
    fn serial_number_rejects_markup_and_quotes() {
        assert!(validate_serial_number(Some("5CG1234XYZ")).is_ok());
        for bad in ["ab<c", "ab>c", "ab'c", "ab\"c", "<script>"] {
            assert!(validate_serial_number(Some(bad)).is_err(), "{} should fail", bad);
        }
        assert!(validate_serial_number(Some(&"S".repeat(101))).is_err());
    }

    #[test]
    fn device_id_must_be_guid() {
        assert!(validate_device_id(Some("0f8fad5b-d9cb-469f-a165-70867728950e")).is_ok());
        assert!(validate_device_id(Some("not-a-guid")).is_err());
        assert!(validate_device_id(Some("")).is_err());
    }

    #[test]
    fn search_term_rejects_injection_sequences() {
        assert!(validate_search_term(Some("Dell Latitude"), 100).is_ok());
        for bad in ["a--b", "x; drop", "/* c", "c */", "XP_cmdshell", "EXEC(foo)"] {
            assert!(validate_search_term(Some(bad), 100).is_err(), "{} should fail", bad);
        }
        assert!(validate_search_term(Some("abcdef"), 5).is_err());
    }
}
