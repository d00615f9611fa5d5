use crate::error::{FieldPath, RecodeError, Result};
use crate::value::{AggregateValue, Value};

/// Source counterpart of a destination field. Exact, case-sensitive name match.
pub(crate) fn lookup<'s>(
    source: &'s AggregateValue,
    field: &str,
    path: &FieldPath,
) -> Result<&'s Value> {
    source.get(field).ok_or_else(|| RecodeError::FieldNotFound {
        aggregate: source.type_name().into(),
        field: field.into(),
        path: path.clone(),
    })
}
