//! Argument normalization.
//!
//! Turns a caller supplied argument map into the exact shape the daemon expects: unset
//! values are omitted, torrent ids become a list, numeric strings become numbers and
//! booleans become `0`/`1`. Strings are always UTF-8 here since they are `serde_json`
//! values, so no transcoding step is needed.

use serde_json::{Map, Number, Value};
use transmission_rpc_types::{RECENTLY_ACTIVE, TransmissionError};

/// Reserved argument holding torrent identifiers.
pub const IDS_KEY: &str = "ids";

/// Normalizes a method's argument map.
///
/// Fails only on torrent identifiers that are neither numeric nor an info hash.
pub fn normalize(arguments: &Map<String, Value>) -> Result<Map<String, Value>, TransmissionError> {
    let mut normalized = Map::with_capacity(arguments.len());
    for (key, value) in arguments {
        if is_blank(value) {
            continue;
        }
        let value = if key == IDS_KEY {
            normalize_ids(value)?
        } else {
            normalize_value(value)
        };
        normalized.insert(key.clone(), value);
    }
    Ok(normalized)
}

/// Normalizes the `ids` argument.
///
/// `"recently-active"` passes through, `null` becomes `[]`, a scalar becomes a one element
/// list, and every element is coerced to an integer. 40 character hex strings are info
/// hashes and are kept as strings.
pub fn normalize_ids(ids: &Value) -> Result<Value, TransmissionError> {
    match ids {
        Value::Null => Ok(Value::Array(Vec::new())),
        Value::String(s) if s == RECENTLY_ACTIVE => Ok(ids.clone()),
        Value::Array(items) => items
            .iter()
            .filter(|item| !item.is_null())
            .map(torrent_id)
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        scalar => Ok(Value::Array(vec![torrent_id(scalar)?])),
    }
}

/// Whether the daemon treats `value` as unset.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn normalize_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .filter(|(_, v)| !is_blank(v))
                .map(|(k, v)| (k.clone(), normalize_value(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| !is_blank(v))
                .map(normalize_value)
                .collect(),
        ),
        Value::Bool(b) => Value::from(u8::from(*b)),
        Value::String(s) => parse_number(s).map_or_else(|| value.clone(), Value::Number),
        Value::Null | Value::Number(_) => value.clone(),
    }
}

fn torrent_id(value: &Value) -> Result<Value, TransmissionError> {
    let id = match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        Value::Bool(b) => Some(i64::from(*b)),
        Value::String(s) if is_info_hash(s.trim()) => return Ok(Value::String(s.trim().into())),
        Value::String(s) => parse_number(s).and_then(|n| {
            n.as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
        }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };

    id.map(Value::from)
        .ok_or_else(|| TransmissionError::InvalidArgument(format!("invalid torrent id: {value}")))
}

fn is_info_hash(s: &str) -> bool {
    s.len() == 40 && s.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Parses decimal numbers such as `"42"`, `"-1.5"` or `"2e3"`.
fn parse_number(s: &str) -> Option<Number> {
    let s = s.trim();
    if s.is_empty()
        || !s.bytes().any(|b| b.is_ascii_digit())
        || !s
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e' | b'E'))
    {
        return None;
    }

    if let Ok(int) = s.parse::<i64>() {
        return Some(Number::from(int));
    }
    s.parse::<f64>().ok().and_then(Number::from_f64)
}
