//! Structured-output validation for phases that declare a JSON contract.
//!
//! Validation is distinct from extraction: the content extracted from the
//! model's wrapper must parse as a JSON object carrying exactly the declared
//! fields with the declared kinds. Mismatches are reported with the specific
//! missing fields and wrong-kind details.

use std::collections::BTreeMap;

use serde_json::Value;

use ponder_config::FieldKind;
use ponder_utils::error::PhaseError;

/// Check extracted content against a phase's declared schema.
///
/// # Errors
///
/// Returns `PhaseError::SchemaViolation` when the content is not a JSON
/// object or any declared field is missing or has the wrong kind.
pub fn validate_phase_output(
    phase_id: &str,
    content: &str,
    schema: &BTreeMap<String, FieldKind>,
) -> Result<(), PhaseError> {
    let value: Value = serde_json::from_str(content).map_err(|e| PhaseError::SchemaViolation {
        phase: phase_id.to_string(),
        missing_fields: Vec::new(),
        wrong_kinds: vec![format!("not valid JSON: {e}")],
    })?;

    let Some(object) = value.as_object() else {
        return Err(PhaseError::SchemaViolation {
            phase: phase_id.to_string(),
            missing_fields: Vec::new(),
            wrong_kinds: vec![format!("expected a JSON object, got {}", kind_name(&value))],
        });
    };

    let mut missing_fields = Vec::new();
    let mut wrong_kinds = Vec::new();

    for (field, expected) in schema {
        match object.get(field) {
            None => missing_fields.push(field.clone()),
            Some(actual) if !kind_matches(actual, *expected) => wrong_kinds.push(format!(
                "{field} (expected {}, got {})",
                expected.as_str(),
                kind_name(actual)
            )),
            Some(_) => {}
        }
    }

    if missing_fields.is_empty() && wrong_kinds.is_empty() {
        Ok(())
    } else {
        Err(PhaseError::SchemaViolation {
            phase: phase_id.to_string(),
            missing_fields,
            wrong_kinds,
        })
    }
}

fn kind_matches(value: &Value, expected: FieldKind) -> bool {
    match expected {
        FieldKind::String => value.is_string(),
        FieldKind::List => value.is_array(),
        FieldKind::Object => value.is_object(),
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
