use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;

use crate::models::ContentContext;

/// Parse an enriched context JSON file into a ContentContext
pub fn parse_context_file(path: &Path) -> Result<ContentContext> {
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {:?}", path))?;
    parse_context_json(&content)
}

/// Parse an enriched context JSON string into a ContentContext.
///
/// The document must be a JSON object. Keys the planner does not know are
/// kept as-is; they may still be quoted by the oracle.
pub fn parse_context_json(json: &str) -> Result<ContentContext> {
    let value: Value = serde_json::from_str(json).context("Failed to parse context JSON")?;

    match value {
        Value::Object(values) => Ok(ContentContext::new(values)),
        other => anyhow::bail!(
            "Context JSON must be an object, found {}",
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
