use serde_json::Value;
use std::io::{self, Write};

/// Pretty-print JSON to stdout.
pub fn print_json(value: &Value) {
    let rendered = match serde_json::to_string_pretty(value) {
        Ok(s) => s,
        Err(e) => {
            log::error!("JSON serialization error: {}", e);
            return;
        }
    };
    let stdout = io::stdout();
    let mut out = stdout.lock();
    if let Err(e) = writeln!(out, "{}", rendered) {
        log::warn!("failed to write JSON output: {}", e);
    }
}
