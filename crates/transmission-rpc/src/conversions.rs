//! Conversions from RPC payloads to the typed records of `transmission_rpc_types`.

use serde::de::DeserializeOwned;
use serde_json::Value;
use transmission_rpc_types::{AddedTorrent, Torrent, TransmissionError};

use crate::params::is_blank;

/// The `arguments` member of a payload, or `Null` when absent.
pub(crate) fn arguments(payload: Value) -> Value {
    match payload {
        Value::Object(mut map) => map.remove("arguments").unwrap_or(Value::Null),
        _ => Value::Null,
    }
}

/// Deserializes `value` into `T`, naming `what` on failure.
pub(crate) fn record<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, TransmissionError> {
    serde_json::from_value(value)
        .map_err(|e| TransmissionError::UnexpectedResponse(format!("invalid {what}: {e}")))
}

/// Torrents of a `torrent-get` payload. A missing or empty list yields no torrents.
pub(crate) fn torrents(payload: Value) -> Result<Vec<Torrent>, TransmissionError> {
    match arguments(payload) {
        Value::Object(mut map) => match map.remove("torrents") {
            Some(list) if !is_blank(&list) => record(list, "torrent list"),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// Torrent of a `torrent-add` payload.
pub(crate) fn added_torrent(payload: Value) -> Result<AddedTorrent, TransmissionError> {
    let result = payload
        .get("result")
        .and_then(Value::as_str)
        .unwrap_or("no torrent returned")
        .to_owned();

    let Value::Object(mut map) = arguments(payload) else {
        return Err(TransmissionError::InvalidArgument(result));
    };

    if let Some(duplicate) = map.remove("torrent-duplicate") {
        return record(duplicate, "duplicate torrent").map(AddedTorrent::Duplicate);
    }
    match map.remove("torrent-added") {
        Some(added) => record(added, "added torrent").map(AddedTorrent::Added),
        None => Err(TransmissionError::InvalidArgument(result)),
    }
}

/// Member `key` of a payload's arguments.
pub(crate) fn argument(payload: Value, key: &str) -> Result<Value, TransmissionError> {
    match arguments(payload) {
        Value::Object(mut map) => map
            .remove(key)
            .ok_or_else(|| TransmissionError::UnexpectedResponse(format!("missing {key}"))),
        _ => Err(TransmissionError::UnexpectedResponse(format!(
            "missing arguments, expected {key}"
        ))),
    }
}
