//! Bridge to `serde_json`, the usual source of loosely-typed input.
//!
//! - object → aggregate named [`JSON_OBJECT`], every key a visible field
//! - array → sequence
//! - `null` → empty indirection
//! - number → signed if it fits `i64`, else unsigned if it fits `u64`, else float
//! - string → text, bool → bool

use serde_json::{Map, Number};

use crate::value::{AggregateValue, Value};

/// Type name given to aggregates built from JSON objects.
pub const JSON_OBJECT: &str = "object";

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::none(),
            serde_json::Value::Bool(v) => Value::Bool(*v),
            serde_json::Value::Number(n) => from_number(n),
            serde_json::Value::String(s) => Value::Text(s.clone()),
            serde_json::Value::Array(items) => Value::sequence(items.iter().map(Value::from)),
            serde_json::Value::Object(map) => Value::Aggregate(AggregateValue::from_fields(
                JSON_OBJECT,
                map.iter().map(|(k, v)| (k.as_str(), Value::from(v))),
            )),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        Value::from(&json)
    }
}

fn from_number(n: &Number) -> Value {
    if let Some(v) = n.as_i64() {
        Value::Int(v)
    } else if let Some(v) = n.as_u64() {
        Value::UInt(v)
    } else {
        Value::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Renders a value as JSON. Indirections collapse to their content (or
/// `null`), opaque values and non-finite floats become `null`.
impl From<&Value> for serde_json::Value {
    fn from(value: &Value) -> Self {
        match value {
            Value::Int(v) => serde_json::Value::from(*v),
            Value::UInt(v) => serde_json::Value::from(*v),
            Value::Float(v) => Number::from_f64(*v)
                .map(serde_json::Value::Number)
                .unwrap_or(serde_json::Value::Null),
            Value::Text(v) => serde_json::Value::String(v.clone()),
            Value::Bool(v) => serde_json::Value::Bool(*v),
            Value::Aggregate(aggregate) => {
                let map: Map<String, serde_json::Value> = aggregate
                    .fields()
                    .map(|(field, v)| (field.name.to_string(), serde_json::Value::from(v)))
                    .collect();
                serde_json::Value::Object(map)
            }
            Value::Sequence(sequence) => {
                serde_json::Value::Array(sequence.items().iter().map(serde_json::Value::from).collect())
            }
            Value::Indirection(Some(inner)) => serde_json::Value::from(&**inner),
            Value::Indirection(None) | Value::Opaque(_) => serde_json::Value::Null,
        }
    }
}
