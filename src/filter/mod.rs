pub mod error;
pub mod odata;

pub use error::FilterError;
pub use odata::{
    create_equality_filter, create_starts_with_filter, is_valid_filter_value,
    sanitize_for_filter, MAX_FILTER_VALUE_LENGTH,
};
