//! Indirection stripping for both sides of a recode.

use crate::error::{FieldPath, RecodeError, Result};
use crate::value::{AggregateValue, Kind, Value};

/// Innermost value behind any number of indirections, `None` if one is empty.
pub(crate) fn source(mut value: &Value) -> Option<&Value> {
    loop {
        match value {
            Value::Indirection(Some(inner)) => value = &**inner,
            Value::Indirection(None) => return None,
            other => return Some(other),
        }
    }
}

/// Kind to report when `source` did not resolve to what was expected.
pub(crate) fn found_kind(resolved: Option<&Value>) -> Kind {
    resolved.map_or(Kind::Absent, Value::kind)
}

/// Writable storage behind any number of indirections.
pub(crate) fn destination<'v>(value: &'v mut Value, path: &FieldPath) -> Result<&'v mut Value> {
    match value {
        Value::Indirection(Some(inner)) => destination(inner, path),
        Value::Indirection(None) => Err(RecodeError::NilDestination { path: path.clone() }),
        other => Ok(other),
    }
}

pub(crate) fn source_root(value: &Value) -> Result<&AggregateValue> {
    match source(value) {
        Some(Value::Aggregate(aggregate)) => Ok(aggregate),
        other => Err(RecodeError::InvalidSource {
            found: found_kind(other),
        }),
    }
}

pub(crate) fn destination_root(value: &mut Value) -> Result<&mut AggregateValue> {
    match destination(value, &FieldPath::root())? {
        Value::Aggregate(aggregate) => Ok(aggregate),
        other => Err(RecodeError::InvalidDestination {
            found: other.kind(),
        }),
    }
}
