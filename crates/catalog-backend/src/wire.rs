//! Mapping between the document database's typed-value wire encoding and
//! plain JSON. On the wire every value is wrapped in a single-key object
//! naming its type (`{"stringValue": "Soul"}`); the rest of the codebase
//! only ever sees the unwrapped form.

use serde_json::{json, Map, Number, Value};

use crate::error::BackendError;

/// Unwrap a wire `fields` map into a plain JSON object.
pub fn decode_fields(fields: &Map<String, Value>) -> Result<Map<String, Value>, BackendError> {
    let mut out = Map::with_capacity(fields.len());
    for (key, value) in fields {
        out.insert(key.clone(), decode_value(value)?);
    }
    Ok(out)
}

fn decode_value(value: &Value) -> Result<Value, BackendError> {
    let obj = value
        .as_object()
        .ok_or_else(|| BackendError::Decode(format!("wire value is not an object: {value}")))?;
    let (kind, inner) = obj
        .iter()
        .next()
        .ok_or_else(|| BackendError::Decode("empty wire value".to_string()))?;

    match kind.as_str() {
        "nullValue" => Ok(Value::Null),
        "booleanValue" => Ok(inner.clone()),
        "stringValue" | "timestampValue" | "referenceValue" => Ok(inner.clone()),
        // 64-bit integers travel as decimal strings
        "integerValue" => {
            let raw = inner
                .as_str()
                .map(str::to_owned)
                .or_else(|| inner.as_i64().map(|n| n.to_string()))
                .ok_or_else(|| BackendError::Decode(format!("bad integerValue: {inner}")))?;
            let parsed: i64 = raw
                .parse()
                .map_err(|_| BackendError::Decode(format!("bad integerValue: {raw}")))?;
            Ok(Value::Number(parsed.into()))
        }
        "doubleValue" => {
            let parsed = inner
                .as_f64()
                .ok_or_else(|| BackendError::Decode(format!("bad doubleValue: {inner}")))?;
            Number::from_f64(parsed)
                .map(Value::Number)
                .ok_or_else(|| BackendError::Decode(format!("non-finite doubleValue: {inner}")))
        }
        "arrayValue" => {
            let values = inner.get("values").and_then(Value::as_array);
            let mut out = Vec::new();
            if let Some(values) = values {
                for item in values {
                    out.push(decode_value(item)?);
                }
            }
            Ok(Value::Array(out))
        }
        "mapValue" => {
            let fields = inner.get("fields").and_then(Value::as_object);
            match fields {
                Some(fields) => Ok(Value::Object(decode_fields(fields)?)),
                None => Ok(Value::Object(Map::new())),
            }
        }
        other => Err(BackendError::Decode(format!(
            "unsupported wire value kind `{other}`"
        ))),
    }
}

/// Wrap a plain JSON object into the wire `fields` map.
pub fn encode_fields(doc: &Map<String, Value>) -> Map<String, Value> {
    let mut out = Map::with_capacity(doc.len());
    for (key, value) in doc {
        out.insert(key.clone(), encode_value(value));
    }
    out
}

fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                json!({ "integerValue": i.to_string() })
            } else {
                json!({ "doubleValue": n })
            }
        }
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(fields) => {
            json!({ "mapValue": { "fields": encode_fields(fields) } })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_decode_movie_document() {
        let wire = as_map(json!({
            "title": { "stringValue": "Soul" },
            "series": { "booleanValue": false },
            "categories": { "arrayValue": { "values": [
                { "stringValue": "Animation" },
                { "stringValue": "Kids" }
            ]}},
            "runtimeMinutes": { "integerValue": "100" }
        }));

        let plain = decode_fields(&wire).unwrap();
        assert_eq!(plain["title"], json!("Soul"));
        assert_eq!(plain["series"], json!(false));
        assert_eq!(plain["categories"], json!(["Animation", "Kids"]));
        assert_eq!(plain["runtimeMinutes"], json!(100));
    }

    #[test]
    fn test_decode_nested_map_and_empty_array() {
        let wire = as_map(json!({
            "episode": { "mapValue": { "fields": {
                "season": { "stringValue": "1" },
                "title": { "stringValue": "Chapter One" }
            }}},
            "tags": { "arrayValue": {} }
        }));

        let plain = decode_fields(&wire).unwrap();
        assert_eq!(
            plain["episode"],
            json!({ "season": "1", "title": "Chapter One" })
        );
        assert_eq!(plain["tags"], json!([]));
    }

    #[test]
    fn test_decode_rejects_unknown_kind() {
        let wire = as_map(json!({ "blob": { "bytesValue": "AAAA" } }));
        let err = decode_fields(&wire).unwrap_err();
        assert!(matches!(err, BackendError::Decode(_)));
    }

    #[test]
    fn test_encode_decode_round_trip() {
        let doc = as_map(json!({
            "displayName": "Guest",
            "movie_list": ["m1", "m2"],
            "downloads": [],
            "meta": { "plan": "free", "slots": 2 },
            "rating": 7.5,
            "legacy": null
        }));

        let decoded = decode_fields(&encode_fields(&doc)).unwrap();
        assert_eq!(decoded, doc);
    }
}
