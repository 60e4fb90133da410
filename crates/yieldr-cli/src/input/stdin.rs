use serde::de::DeserializeOwned;
use std::io::{self, Read};

/// Deserialise a bond request piped on stdin.
///
/// Returns `None` when stdin is a terminal or nothing was piped, so the
/// command falls back to its flags.
pub fn read_stdin<T: DeserializeOwned>() -> Result<Option<T>, Box<dyn std::error::Error>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }

    let mut buffer = String::new();
    io::stdin().read_to_string(&mut buffer)?;
    parse_piped(&buffer)
}

/// JSON when the document opens with `{`, YAML otherwise.
fn parse_piped<T: DeserializeOwned>(text: &str) -> Result<Option<T>, Box<dyn std::error::Error>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let is_json = trimmed.starts_with('{');
    tracing::debug!(bytes = trimmed.len(), json = is_json, "reading bond request from stdin");

    let request = if is_json {
        serde_json::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as JSON: {e}"))?
    } else {
        serde_yaml::from_str(trimmed).map_err(|e| format!("Failed to parse stdin as YAML: {e}"))?
    };
    Ok(Some(request))
}
