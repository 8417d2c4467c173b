//! Snapshot payload transformation
//!
//! Converts uniform/attribute maps into a transport-safe form: typed buffers
//! become plain number lists and host callbacks are dropped.
//!
//! The walk is deliberately shallow: top-level fields, plus one level of
//! sub-fields for nested blocks. Anything deeper is forwarded as-is and the
//! transport serializes it (buffers as sequences, callbacks as null).

use crate::value::{Value, ValueMap};

/// Transformed, transport-safe snapshot of a uniform or attribute map
pub type Payload = ValueMap;

/// Coarse runtime category of a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// Indexable flat sequence: any typed buffer or plain list
    ArrayLike,
    /// Plain structured object (nested uniform block)
    Object,
    Function,
    Other,
}

/// Classify a value by capability, independent of buffer element type
pub fn classify(value: &Value) -> ValueKind {
    match value {
        Value::Buffer(_) | Value::List(_) => ValueKind::ArrayLike,
        Value::Map(_) => ValueKind::Object,
        Value::Function(_) => ValueKind::Function,
        Value::Null | Value::Bool(_) | Value::Number(_) | Value::String(_) => ValueKind::Other,
    }
}

/// Transform a uniform or attribute map into a transport-safe payload
pub fn transform(payload: &ValueMap) -> Payload {
    payload
        .iter()
        .filter_map(|(key, value)| {
            let out = match (classify(value), value) {
                (ValueKind::Function, _) => return None,
                (ValueKind::Object, Value::Map(fields)) => Value::Map(transform_fields(fields)),
                _ => flatten(value),
            };
            Some((key.clone(), out))
        })
        .collect()
}

/// One level of a nested block: drop callbacks, flatten buffers
fn transform_fields(fields: &ValueMap) -> ValueMap {
    fields
        .iter()
        .filter(|(_, value)| !value.is_function())
        .map(|(key, value)| (key.clone(), flatten(value)))
        .collect()
}

/// Copy array-like values into a plain list; pass everything else through
fn flatten(value: &Value) -> Value {
    if classify(value) != ValueKind::ArrayLike {
        return value.clone();
    }
    match value {
        Value::Buffer(buffer) => Value::List(buffer.to_values()),
        other => other.clone(),
    }
}
