//! Attribute-level diff between configuration and tracked state

use crate::schema::{Attribute, AttributeType, Mode, Schema};
use serde::Serialize;
use serde_json::Value;

/// One top-level attribute whose configured value differs from state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttributeChange {
    /// JSON pointer of the attribute.
    pub path: String,
    /// Value in tracked state.
    pub before: Value,
    /// Value from configuration.
    pub after: Value,
    /// Whether the change forces a replacement.
    pub force_new: bool,
    /// Whether the values must be hidden when displayed.
    pub sensitive: bool,
}

/// Compute the changes needed to make `state` match `config`.
///
/// Computed attributes are skipped. An unset optional attribute must be
/// empty in state, while an unset optional-computed one keeps whatever the
/// server holds. Nested objects follow their own schemas.
pub fn compute(schema: &Schema, config: &Value, state: &Value) -> Vec<AttributeChange> {
    let mut changes = Vec::new();
    for attr in &schema.attributes {
        if !attr.mode.is_settable() {
            continue;
        }
        let wanted = field(config, attr.name);
        let current = field(state, attr.name);
        if !satisfies(attr, wanted, current) {
            changes.push(AttributeChange {
                path: format!("/{}", attr.name),
                before: current.clone(),
                after: wanted.clone(),
                force_new: attr.force_new,
                sensitive: attr.sensitive,
            });
        }
    }
    changes
}

fn field<'a>(record: &'a Value, name: &str) -> &'a Value {
    record.get(name).unwrap_or(&Value::Null)
}

fn satisfies(attr: &Attribute, wanted: &Value, current: &Value) -> bool {
    if wanted.is_null() && attr.mode == Mode::OptionalComputed {
        return true;
    }
    match (&attr.ty, wanted, current) {
        (AttributeType::Object(nested), Value::Object(_), Value::Object(_) | Value::Null) => {
            object_satisfies(nested, wanted, current)
        }
        (AttributeType::ObjectList(nested), Value::Array(w), Value::Array(c)) => {
            w.len() == c.len() && w.iter().zip(c).all(|(a, b)| object_satisfies(nested, a, b))
        }
        _ => matches(wanted, current),
    }
}

fn object_satisfies(schema: &Schema, wanted: &Value, current: &Value) -> bool {
    schema
        .attributes
        .iter()
        .filter(|a| a.mode.is_settable())
        .all(|a| satisfies(a, field(wanted, a.name), field(current, a.name)))
}

/// Whether `current` satisfies `wanted`, without a schema.
///
/// Null and empty values (`""`, `0`, `false`, `[]`, objects of those)
/// are interchangeable, since the server drops or zeroes unset fields.
/// Nested objects only compare the keys `wanted` sets.
pub fn matches(wanted: &Value, current: &Value) -> bool {
    match (wanted, current) {
        (Value::Null, c) => is_empty(c),
        (w, Value::Null) => is_empty(w),
        (Value::Object(w), Value::Object(c)) => w
            .iter()
            .all(|(k, v)| matches(v, c.get(k).unwrap_or(&Value::Null))),
        (Value::Array(w), Value::Array(c)) => {
            w.len() == c.len() && w.iter().zip(c).all(|(a, b)| matches(a, b))
        }
        (w, c) => w == c,
    }
}

/// The zero value the server echoes for an unset field.
fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_i64() == Some(0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(obj) => obj.values().all(is_empty),
    }
}

/// Whether any change forces replacement.
pub fn requires_replace(changes: &[AttributeChange]) -> bool {
    changes.iter().any(|c| c.force_new)
}
