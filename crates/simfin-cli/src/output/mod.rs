pub mod csv_out;
pub mod json;
pub mod minimal;
pub mod schedule;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => json::print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

/// Split an externally tagged enum value (`{"ByTerm": {...}}`) into its
/// variant name and body. Other values pass through untouched.
pub(crate) fn unwrap_variant(value: &Value) -> (Option<&str>, &Value) {
    if let Value::Object(map) = value {
        if map.len() == 1 {
            if let Some((name, body)) = map.iter().next() {
                if body.is_object() && name.starts_with(|c: char| c.is_ascii_uppercase()) {
                    return (Some(name.as_str()), body);
                }
            }
        }
    }
    (None, value)
}

/// Render a scalar JSON value for display.
pub(crate) fn format_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        _ => serde_json::to_string(value).unwrap_or_default(),
    }
}
