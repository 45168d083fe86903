use serde_json::Value;

use super::{format_scalar, unwrap_variant};

/// Print just the key answer value from the output.
///
/// Heuristic: look for well-known result fields in order of priority, also
/// one level down (comparison summaries nest their totals), then fall back to
/// the first scalar field in the result object.
pub fn print_minimal(value: &Value) {
    let result_obj = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let (_, body) = unwrap_variant(result_obj);

    let priority_keys = ["pv_difference", "total_paid"];

    for key in &priority_keys {
        if let Some(val) = find_key(body, key, 2) {
            println!("{}", format_minimal(val));
            return;
        }
    }

    if let Value::Object(map) = body {
        if let Some((key, val)) = map.iter().find(|(_, v)| !v.is_object() && !v.is_array()) {
            println!("{}: {}", key, format_minimal(val));
            return;
        }
    }

    println!("{}", format_minimal(body));
}

fn find_key<'a>(value: &'a Value, key: &str, depth: usize) -> Option<&'a Value> {
    let map = value.as_object()?;
    if let Some(val) = map.get(key).filter(|v| !v.is_null()) {
        return Some(val);
    }
    if depth <= 1 {
        return None;
    }
    map.values()
        .filter(|v| v.is_object())
        .find_map(|v| find_key(unwrap_variant(v).1, key, depth - 1))
}

fn format_minimal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => format_scalar(other),
    }
}
