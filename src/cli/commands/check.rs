use clap::Subcommand;
use serde_json::json;

use crate::cli::{utils, OutputFormat};
use crate::filter::{is_valid_filter_value, sanitize_for_filter};
use crate::validation::{
    validate_asset_code, validate_device_id, validate_prefix, validate_search_term,
    validate_serial_number, DEFAULT_SEARCH_TERM_LENGTH,
};

#[derive(Subcommand)]
pub enum CheckCommands {
    #[command(about = "Asset code, e.g. LAP-24-DELL-00001")]
    Code { value: String },

    #[command(about = "Device serial number")]
    Serial { value: String },

    #[command(about = "Asset code prefix")]
    Prefix { value: String },

    #[command(about = "Intune device id (GUID)")]
    DeviceId { value: String },

    #[command(about = "Free-text search term")]
    Search {
        value: String,
        #[arg(long, default_value_t = DEFAULT_SEARCH_TERM_LENGTH, help = "Maximum length")]
        max_len: usize,
    },
}

pub fn handle(cmd: CheckCommands, output_format: &OutputFormat) -> anyhow::Result<()> {
    let (kind, value, result) = match &cmd {
        CheckCommands::Code { value } => ("asset code", value, validate_asset_code(Some(value.as_str()))),
        CheckCommands::Serial { value } => {
            ("serial number", value, validate_serial_number(Some(value.as_str())))
        }
        CheckCommands::Prefix { value } => ("prefix", value, validate_prefix(Some(value.as_str()))),
        CheckCommands::DeviceId { value } => {
            ("device id", value, validate_device_id(Some(value.as_str())))
        }
        CheckCommands::Search { value, max_len } => {
            ("search term", value, validate_search_term(Some(value.as_str()), *max_len))
        }
    };

    match result {
        Ok(()) => utils::output_success(
            output_format,
            &format!("'{}' is a valid {}", value, kind),
            Some(json!({ "value": value, "valid": true })),
        ),
        Err(message) => anyhow::bail!("{}", message),
    }
}

pub fn sanitize(value: &str, output_format: &OutputFormat) -> anyhow::Result<()> {
    let sanitized = sanitize_for_filter(value);
    let valid = is_valid_filter_value(value);

    match output_format {
        OutputFormat::Json => {
            let body = json!({ "input": value, "sanitized": sanitized, "validFilterValue": valid });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Text => {
            println!("{}", sanitized);
            if !valid {
                eprintln!("warning: the raw value is not safe to embed in a filter");
            }
        }
    }
    Ok(())
}
