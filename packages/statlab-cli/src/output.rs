use serde::Serialize;
use std::io::Write;
use std::path::Path;

/// Serialize a value to JSON (pretty or compact).
pub fn to_json<T: Serialize>(value: &T, compact: bool) -> Result<String, String> {
    let rendered = if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    };
    rendered.map_err(|e| format!("JSON serialization failed: {}", e))
}

/// Print text to stdout with a trailing newline.
pub fn print_stdout(text: &str) -> Result<(), String> {
    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .and_then(|_| handle.write_all(b"\n"))
        .map_err(|e| format!("Failed to write to stdout: {}", e))
}

/// Export a report as JSON to `path`.
pub fn export<T: Serialize>(value: &T, path: &str, compact: bool) -> Result<(), String> {
    let json = to_json(value, compact)?;
    std::fs::write(Path::new(path), json)
        .map_err(|e| format!("Failed to write output file '{}': {}", path, e))
}
