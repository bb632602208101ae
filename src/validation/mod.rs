//! Input validation: identifier formats, DTO rule sets and the validating
//! JSON extractor.

pub mod extractors;
pub mod formats;
pub mod rules;

pub use extractors::ValidatedJson;
pub use formats::{
    validate_asset_code, validate_device_id, validate_prefix, validate_search_term,
    validate_serial_number, DEFAULT_SEARCH_TERM_LENGTH,
};
pub use rules::{FieldError, RuleSet, Validate};
