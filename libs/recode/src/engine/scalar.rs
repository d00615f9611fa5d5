//! Conversions into the four scalar destination shapes.
//!
//! Dispatch is on the destination shape (one function each); the source
//! shape, after unwrapping, selects the rule. Numeric narrowing never checks
//! ranges: integers reinterpret bit patterns and floats truncate toward zero.

use super::unwrap;
use crate::error::{FieldPath, RecodeError, Result};
use crate::value::{Kind, Value};

pub(crate) fn to_signed(source: &Value, path: &FieldPath) -> Result<i64> {
    match unwrap::source(source) {
        Some(Value::Int(v)) => Ok(*v),
        Some(Value::UInt(v)) => Ok(*v as i64),
        Some(Value::Float(v)) => Ok(*v as i64),
        Some(Value::Text(text)) => text
            .parse::<i64>()
            .map_err(|e| RecodeError::parse(Kind::SignedInt, text, e, path)),
        other => Err(RecodeError::mismatch(
            Kind::SignedInt,
            unwrap::found_kind(other),
            path,
        )),
    }
}

pub(crate) fn to_unsigned(source: &Value, path: &FieldPath) -> Result<u64> {
    match unwrap::source(source) {
        Some(Value::UInt(v)) => Ok(*v),
        Some(Value::Int(v)) => Ok(*v as u64),
        Some(Value::Float(v)) => Ok(float_to_unsigned(*v)),
        Some(Value::Text(text)) => parse_unsigned(text)
            .map_err(|reason| RecodeError::parse(Kind::UnsignedInt, text, reason, path)),
        other => Err(RecodeError::mismatch(
            Kind::UnsignedInt,
            unwrap::found_kind(other),
            path,
        )),
    }
}

pub(crate) fn to_float(source: &Value, path: &FieldPath) -> Result<f64> {
    match unwrap::source(source) {
        Some(Value::Float(v)) => Ok(*v),
        Some(Value::Int(v)) => Ok(*v as f64),
        Some(Value::UInt(v)) => Ok(*v as f64),
        Some(Value::Text(text)) => text
            .parse::<f64>()
            .map_err(|e| RecodeError::parse(Kind::Float, text, e, path)),
        other => Err(RecodeError::mismatch(
            Kind::Float,
            unwrap::found_kind(other),
            path,
        )),
    }
}

pub(crate) fn to_text(source: &Value, path: &FieldPath) -> Result<String> {
    match unwrap::source(source) {
        Some(Value::Text(text)) => Ok(text.clone()),
        Some(Value::Int(v)) => Ok(v.to_string()),
        Some(Value::UInt(v)) => Ok(v.to_string()),
        Some(Value::Float(v)) => Ok(float_text(*v)),
        other => Err(RecodeError::mismatch(
            Kind::Text,
            unwrap::found_kind(other),
            path,
        )),
    }
}

/// Shortest round-trip form, never exponential. Infinities are signed
/// (`+Inf`, `-Inf`) so they parse back through `to_float`.
fn float_text(v: f64) -> String {
    if v.is_infinite() {
        if v > 0.0 { "+Inf" } else { "-Inf" }.to_string()
    } else {
        v.to_string()
    }
}

/// Truncates toward zero, then reinterprets negatives as two's complement.
fn float_to_unsigned(v: f64) -> u64 {
    if v < 0.0 { v as i64 as u64 } else { v as u64 }
}

/// Base-10 digits only: unlike `u64::from_str`, a leading `+` is rejected.
fn parse_unsigned(text: &str) -> std::result::Result<u64, String> {
    if text.starts_with('+') {
        return Err("sign not allowed for unsigned integer".to_string());
    }
    text.parse::<u64>().map_err(|e| e.to_string())
}
