use serde_json::Value;
use std::io;

use super::{format_scalar, unwrap_variant};

/// Write output as CSV to stdout.
///
/// When the result carries a schedule (an array of records) that schedule is
/// written; otherwise the scalar result fields are written as field/value
/// pairs.
pub fn print_csv(value: &Value) {
    let stdout = io::stdout();
    let mut wtr = csv::Writer::from_writer(stdout.lock());

    let result = value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value);
    let (_, body) = unwrap_variant(result);

    if let Some(rows) = first_record_array(body, 2) {
        write_array_csv(&mut wtr, rows);
    } else if let Value::Object(map) = body {
        let _ = wtr.write_record(["field", "value"]);
        for (key, val) in map {
            let _ = wtr.write_record([key.as_str(), &format_scalar(val)]);
        }
    } else if let Value::Array(arr) = body {
        write_array_csv(&mut wtr, arr);
    } else {
        let _ = wtr.write_record([&format_scalar(body)]);
    }

    let _ = wtr.flush();
}

fn first_record_array(value: &Value, depth: usize) -> Option<&[Value]> {
    let map = value.as_object()?;
    for val in map.values() {
        if let Value::Array(arr) = val {
            if arr.first().is_some_and(Value::is_object) {
                return Some(arr.as_slice());
            }
        }
    }
    if depth <= 1 {
        return None;
    }
    map.values()
        .filter(|v| v.is_object())
        .find_map(|v| first_record_array(v, depth - 1))
}

fn write_array_csv<W: io::Write>(wtr: &mut csv::Writer<W>, arr: &[Value]) {
    if arr.is_empty() {
        return;
    }

    if let Some(Value::Object(first)) = arr.first() {
        let headers: Vec<&str> = first.keys().map(|k| k.as_str()).collect();
        let _ = wtr.write_record(&headers);

        for item in arr {
            if let Value::Object(map) = item {
                let row: Vec<String> = headers
                    .iter()
                    .map(|h| map.get(*h).map(format_scalar).unwrap_or_default())
                    .collect();
                let _ = wtr.write_record(&row);
            }
        }
    } else {
        for item in arr {
            let _ = wtr.write_record([&format_scalar(item)]);
        }
    }
}
