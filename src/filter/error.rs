use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid filter field name: {0}")]
    InvalidField(String),

    #[error("Invalid filter value: {0}")]
    InvalidValue(String),
}
