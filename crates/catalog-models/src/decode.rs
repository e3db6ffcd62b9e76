use serde_json::{Map, Value};
use thiserror::Error;

/// Failure to decode a free-form backend document into a typed record.
///
/// Documents arrive from the remote store as untyped key/value maps; every
/// record type validates its shape at this boundary instead of trusting it.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("missing required field `{0}`")]
    MissingField(&'static str),
    #[error("field `{field}` has unexpected type (expected {expected})")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },
}

pub(crate) fn require_str(
    doc: &Map<String, Value>,
    field: &'static str,
) -> Result<String, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "string",
        }),
    }
}

/// Absent or null is fine for optional fields; a present value must still
/// carry the right type.
pub(crate) fn optional_str(
    doc: &Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "string",
        }),
    }
}

pub(crate) fn optional_bool(
    doc: &Map<String, Value>,
    field: &'static str,
) -> Result<bool, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(false),
        Some(Value::Bool(b)) => Ok(*b),
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "boolean",
        }),
    }
}

pub(crate) fn optional_str_array(
    doc: &Map<String, Value>,
    field: &'static str,
) -> Result<Vec<String>, DecodeError> {
    match doc.get(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => {
            let mut out = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::String(s) => out.push(s.clone()),
                    _ => {
                        return Err(DecodeError::WrongType {
                            field,
                            expected: "array of strings",
                        })
                    }
                }
            }
            Ok(out)
        }
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "array of strings",
        }),
    }
}
