//! Reference lists kept in `resources.resource_data`.
//!
//! New rows hold a JSON array with a single reference, serialized to text.
//! Rows written by earlier versions were not always encoded that way, so every
//! reader goes through [`decode_references`], which understands each encoding
//! that has ended up in the table.

use serde_json::Value;

/// Prefix of the identifiers the chat platform issues for uploaded documents.
pub const FILE_ID_PREFIX: &str = "BQAC";

type Decoder = fn(&Value) -> Option<Vec<Value>>;

/// Tried in order, the first one that recognises the value wins. New encodings
/// go here.
const DECODERS: &[Decoder] = &[already_decoded, encoded_string];

/// Wraps a single reference the way it is stored: `["<reference>"]`.
pub fn encode_references(reference: &str) -> String {
    Value::Array(vec![Value::String(reference.to_owned())]).to_string()
}

/// Decodes a reference list from any known encoding:
///
/// 1. an array, as-is
/// 2. a string holding a JSON array
///
/// If the resulting array has one string element which is itself a JSON array,
/// that inner array is used instead. Anything else decodes to an empty list.
pub fn decode_references(value: &Value) -> Vec<String> {
    let Some(items) = DECODERS.iter().find_map(|decode| decode(value)) else {
        return Vec::new();
    };

    unwrap_nested(items)
        .into_iter()
        .map(|item| match item {
            Value::String(reference) => reference,
            other => other.to_string(),
        })
        .collect()
}

/// Decodes the stored text of a row. `None` if the text is not JSON at all.
pub fn decode_stored(text: &str) -> Option<Vec<String>> {
    let value: Value = serde_json::from_str(text).ok()?;
    Some(decode_references(&value))
}

pub fn is_file_id(reference: &str) -> bool {
    reference.starts_with(FILE_ID_PREFIX)
}

fn already_decoded(value: &Value) -> Option<Vec<Value>> {
    value.as_array().cloned()
}

fn encoded_string(value: &Value) -> Option<Vec<Value>> {
    match serde_json::from_str(value.as_str()?) {
        Ok(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn unwrap_nested(items: Vec<Value>) -> Vec<Value> {
    if let [Value::String(inner)] = items.as_slice() {
        if let Ok(Value::Array(nested)) = serde_json::from_str::<Value>(inner) {
            return nested;
        }
    }
    items
}
