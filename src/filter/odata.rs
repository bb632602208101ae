//! Escaping for values interpolated into OData `$filter` expressions.
//!
//! Microsoft Graph offers no parameterized filter API, so every user value
//! that ends up in a filter string must pass through [`sanitize_for_filter`]
//! first. [`is_valid_filter_value`] is a stricter gate for callers that want
//! to refuse suspicious input outright instead of escaping it.
//!
//! Known trade-off: the keyword check rejects legitimate values such as
//! `"Sales and Marketing"` because `and` appears between spaces.

use once_cell::sync::Lazy;
use regex::Regex;

use super::error::FilterError;

pub const MAX_FILTER_VALUE_LENGTH: usize = 256;

static ODATA_KEYWORD_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\s(?:or|and|eq|ne|gt|ge|lt|le|not)\s").expect("keyword pattern compiles")
});

static FIELD_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_/]*$").expect("field pattern compiles"));

/// Normalize and escape a value for use inside a single-quoted OData literal.
///
/// Control characters (CR, LF, TAB, NUL) are removed, runs of spaces collapse
/// to one, the value is trimmed, single quotes are doubled and the result is
/// capped at [`MAX_FILTER_VALUE_LENGTH`] characters. Quote runs that are
/// already even are treated as escaped, which keeps the function idempotent.
pub fn sanitize_for_filter(input: &str) -> String {
    let stripped: String = input
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '\t' | '\0'))
        .collect();

    let mut collapsed = String::with_capacity(stripped.len());
    let mut previous_space = false;
    for c in stripped.chars() {
        if c == ' ' {
            if previous_space {
                continue;
            }
            previous_space = true;
        } else {
            previous_space = false;
        }
        collapsed.push(c);
    }

    let escaped = escape_quotes(collapsed.trim());
    truncate_escaped(&escaped, MAX_FILTER_VALUE_LENGTH)
        .trim_end()
        .to_string()
}

/// Pad every odd-length run of `'` to an even length.
fn escape_quotes(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 8);
    let mut run = 0usize;
    for c in value.chars() {
        if c == '\'' {
            run += 1;
            out.push(c);
            continue;
        }
        if run % 2 == 1 {
            out.push('\'');
        }
        run = 0;
        out.push(c);
    }
    if run % 2 == 1 {
        out.push('\'');
    }
    out
}

/// Cut to `max` characters without leaving half of a doubled quote behind.
fn truncate_escaped(value: &str, max: usize) -> String {
    if value.chars().count() <= max {
        return value.to_string();
    }
    let mut truncated: String = value.chars().take(max).collect();
    let trailing_quotes = truncated.chars().rev().take_while(|c| *c == '\'').count();
    if trailing_quotes % 2 == 1 {
        truncated.pop();
    }
    truncated
}

/// Reject values that look like an attempt to extend a filter expression.
pub fn is_valid_filter_value(input: &str) -> bool {
    if input.trim().is_empty() || input.chars().count() > MAX_FILTER_VALUE_LENGTH {
        return false;
    }
    if input.contains('"') || input.contains('\\') {
        return false;
    }
    if input.matches('\'').count() % 2 == 1 {
        return false;
    }
    !ODATA_KEYWORD_REGEX.is_match(input)
}

fn check_field(field: &str) -> Result<(), FilterError> {
    if FIELD_NAME_REGEX.is_match(field) {
        Ok(())
    } else {
        Err(FilterError::InvalidField(field.to_string()))
    }
}

/// `field eq 'value'` using the sanitized value.
pub fn create_equality_filter(field: &str, value: &str) -> Result<String, FilterError> {
    check_field(field)?;
    Ok(format!("{} eq '{}'", field, sanitize_for_filter(value)))
}

/// `startswith(field,'value')` using the sanitized value.
pub fn create_starts_with_filter(field: &str, value: &str) -> Result<String, FilterError> {
    check_field(field)?;
    Ok(format!("startswith({},'{}')", field, sanitize_for_filter(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn doubles_single_quotes() {
        assert_eq!(sanitize_for_filter("O'Brien"), "O''Brien");
        assert_eq!(sanitize_for_filter("'"), "''");
    }

    #[test]
    fn strips_control_characters_and_collapses_spaces() {
        assert_eq!(sanitize_for_filter("  a\r\nb\t c\0   d  "), "ab c d");
        assert_eq!(sanitize_for_filter("x    y"), "x y");
    }

    #[test]
    fn truncates_to_limit() {
        let long = "a".repeat(400);
        assert_eq!(sanitize_for_filter(&long).chars().count(), MAX_FILTER_VALUE_LENGTH);
    }

    #[test]
    fn truncation_never_splits_an_escaped_quote() {
        let value = format!("{}'", "a".repeat(MAX_FILTER_VALUE_LENGTH - 1));
        let sanitized = sanitize_for_filter(&value);
        let trailing = sanitized.chars().rev().take_while(|c| *c == '\'').count();
        assert_eq!(trailing % 2, 0);
        assert!(sanitized.chars().count() <= MAX_FILTER_VALUE_LENGTH);
    }

    #[test]
    fn sanitize_is_idempotent() {
        let samples = [
            "O'Brien",
            "a'''b",
            "  spaced   out  ",
            "\0\t' x '\n",
            "trailing quote'",
            "",
            "mixed ' and '' quotes'''",
        ];
        for sample in samples {
            let once = sanitize_for_filter(sample);
            assert_eq!(sanitize_for_filter(&once), once, "input {:?}", sample);
        }

        let long_with_quotes = "ab'".repeat(120);
        let once = sanitize_for_filter(&long_with_quotes);
        assert_eq!(sanitize_for_filter(&once), once);

        let long_with_spaces = format!("{} {}", "x".repeat(255), "y".repeat(10));
        let once = sanitize_for_filter(&long_with_spaces);
        assert_eq!(sanitize_for_filter(&once), once);
    }

    #[test]
    fn odd_quote_counts_are_invalid() {
        assert!(!is_valid_filter_value("O'Brien"));
        assert!(!is_valid_filter_value("'''"));
        assert!(is_valid_filter_value("O''Brien"));
        assert!(is_valid_filter_value("LAPTOP-042"));
    }

    #[test]
    fn keywords_between_whitespace_are_invalid() {
        assert!(!is_valid_filter_value("x' or '1' eq '1"));
        assert!(!is_valid_filter_value("a AND b"));
        assert!(!is_valid_filter_value("name ne x"));
        assert!(!is_valid_filter_value("Sales and Marketing"));
        assert!(is_valid_filter_value("Andersen"));
        assert!(is_valid_filter_value("Oregon"));
    }

    #[test]
    fn raw_double_quotes_and_backslashes_are_invalid() {
        assert!(!is_valid_filter_value("a\"b"));
        assert!(!is_valid_filter_value("a\\b"));
        assert!(!is_valid_filter_value("   "));
    }

    #[test]
    fn equality_filter_escapes_value() {
        assert_eq!(create_equality_filter("status", "a'b").unwrap(), "status eq 'a''b'");
        assert_eq!(
            create_equality_filter("serialNumber", " 5CG 123 ").unwrap(),
            "serialNumber eq '5CG 123'"
        );
    }

    #[test]
    fn starts_with_filter_escapes_value() {
        assert_eq!(
            create_starts_with_filter("deviceName", "PC'01").unwrap(),
            "startswith(deviceName,'PC''01')"
        );
    }

    #[test]
    fn rejects_unsafe_field_names() {
        assert!(matches!(
            create_equality_filter("name eq 'x' or 1", "v"),
            Err(FilterError::InvalidField(_))
        ));
        assert!(create_starts_with_filter("", "v").is_err());
    }
}
