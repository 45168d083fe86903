use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{format_scalar, unwrap_variant};

/// Format output as tables using the tabled crate.
///
/// Scalar result fields go into one Field/Value table (nested objects use
/// dotted keys); every array of records, such as a monthly schedule, gets its
/// own table underneath.
pub fn print_table(value: &Value) {
    match value {
        Value::Object(map) => {
            if let Some(result) = map.get("result") {
                print_result_tables(result, map);
            } else {
                print_result_tables(value, &Map::new());
            }
        }
        Value::Array(arr) => {
            print_array_table(arr);
        }
        _ => {
            println!("{}", value);
        }
    }
}

fn print_result_tables(result: &Value, envelope: &Map<String, Value>) {
    let (variant, body) = unwrap_variant(result);

    let mut fields: Vec<(String, String)> = Vec::new();
    let mut schedules: Vec<(String, &[Value])> = Vec::new();
    if let Some(name) = variant {
        fields.push(("mode".to_string(), name.to_string()));
    }
    collect(body, "", &mut fields, &mut schedules);

    if !fields.is_empty() {
        let mut builder = Builder::default();
        builder.push_record(["Field", "Value"]);
        for (key, val) in &fields {
            builder.push_record([key.as_str(), val.as_str()]);
        }
        println!("{}", Table::from(builder));
    }

    for (name, rows) in schedules {
        println!("\n{}:", name);
        print_array_table(rows);
    }

    if let Some(Value::Array(warnings)) = envelope.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings {
                if let Value::String(s) = w {
                    println!("  - {}", s);
                }
            }
        }
    }

    if let Some(Value::String(meth)) = envelope.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn collect<'a>(
    value: &'a Value,
    prefix: &str,
    fields: &mut Vec<(String, String)>,
    schedules: &mut Vec<(String, &'a [Value])>,
) {
    match value {
        Value::Object(map) => {
            for (key, val) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                collect(val, &path, fields, schedules);
            }
        }
        Value::Array(arr) if arr.first().is_some_and(Value::is_object) => {
            schedules.push((prefix.to_string(), arr.as_slice()));
        }
        Value::Array(arr) => {
            let items: Vec<String> = arr.iter().map(format_scalar).collect();
            fields.push((prefix.to_string(), items.join(", ")));
        }
        _ => fields.push((prefix.to_string(), format_scalar(value))),
    }
}

fn print_array_table(arr: &[Value]) {
    if arr.is_empty() {
        println!("(empty)");
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<String> = first.keys().cloned().collect();
        let mut builder = Builder::default();
        builder.push_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(h.as_str()).map(format_scalar).unwrap_or_default())
                    .collect();
                builder.push_record(row);
            }
        }

        println!("{}", Table::from(builder));
    } else {
        for item in arr {
            println!("{}", format_scalar(item));
        }
    }
}
