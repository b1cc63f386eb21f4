//! Argument document validation.

use super::{ParseError, ParseResult};
use regdb_core::EntityKind;
use serde_json::Value;
use std::collections::BTreeSet;

/// Parse a JSON argument document and check its key set.
pub fn parse_args(kind: EntityKind, text: &str) -> ParseResult<Value> {
    let value: Value = serde_json::from_str(text).map_err(|e| ParseError::InvalidJson {
        reason: e.to_string(),
    })?;
    validate_args(kind, &value)?;
    Ok(value)
}

/// Check that `value` is an object whose keys are exactly the required set
/// for `kind`. Values are not inspected.
pub fn validate_args(kind: EntityKind, value: &Value) -> ParseResult<()> {
    let Some(object) = value.as_object() else {
        return Err(ParseError::InvalidJson {
            reason: format!("expected a JSON object, found {}", json_type(value)),
        });
    };

    let required: BTreeSet<&str> = kind.required_arg_keys().iter().copied().collect();
    let missing: Vec<String> = required
        .iter()
        .filter(|key| !object.contains_key(**key))
        .map(|key| key.to_string())
        .collect();
    let unexpected: Vec<String> = object
        .keys()
        .filter(|key| !required.contains(key.as_str()))
        .cloned()
        .collect();

    if missing.is_empty() && unexpected.is_empty() {
        Ok(())
    } else {
        Err(ParseError::Schema {
            kind,
            missing,
            unexpected,
        })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
