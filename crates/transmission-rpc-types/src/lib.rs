//! # Transmission RPC Types
//!
//! This crate defines the error taxonomy, torrent identifiers and typed response records
//! shared by the Transmission RPC client crates.

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

mod torrent;

pub use torrent::{
    AddedTorrent, FreeSpace, SessionStats, StatsDetails, Torrent, TorrentError, TorrentFields,
    TorrentFile, TorrentStatus,
};

/// Sentinel accepted by the daemon in place of a torrent id list.
pub const RECENTLY_ACTIVE: &str = "recently-active";

/// Error type for Transmission RPC operations.
#[derive(Error, Debug)]
pub enum TransmissionError {
    /// The session token handshake failed: the daemon offered no token, or
    /// rejected the token it had just issued.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// The daemon accepted the request but reported a non-success result.
    #[error("rpc error: {0}")]
    Rpc(String),

    /// The daemon answered with an HTTP error status.
    #[error("{}", describe_transport_error(.status, .message))]
    Transport {
        /// HTTP status code of the response.
        status: u16,
        /// Classified message (friendly override or the stripped response body).
        message: String,
    },

    /// Connectivity failure reported by the transport (connection refused, DNS, timeouts, etc.)
    #[error("network error: {0}")]
    Network(String),

    /// Invalid configuration or call arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A successful payload did not have the expected shape.
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

impl TransmissionError {
    /// HTTP status carried by a [`TransmissionError::Transport`] error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Reason phrase for a status code, including the non-standard codes some proxies emit.
pub fn status_reason(status: u16) -> &'static str {
    match status {
        444 => "Connection Closed Without Response",
        499 => "Client Closed Request",
        599 => "Network Connect Timeout Error",
        _ => StatusCode::from_u16(status)
            .ok()
            .and_then(|code| code.canonical_reason())
            .unwrap_or("Unknown Status"),
    }
}

fn describe_transport_error(status: &u16, message: &str) -> String {
    let reason = status_reason(*status);
    if message.trim().is_empty() {
        format!("{status}: {reason}")
    } else {
        format!("{status}: {reason} - {message}")
    }
}

/// A single torrent identifier: the daemon's numeric id or the info hash.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TorrentId {
    /// Numeric id assigned by the daemon.
    Id(i64),
    /// SHA1 info hash, hex encoded.
    Hash(String),
}

impl From<i64> for TorrentId {
    fn from(id: i64) -> Self {
        Self::Id(id)
    }
}

impl From<&str> for TorrentId {
    fn from(hash: &str) -> Self {
        Self::Hash(hash.to_owned())
    }
}

impl From<String> for TorrentId {
    fn from(hash: String) -> Self {
        Self::Hash(hash)
    }
}

impl From<TorrentId> for Value {
    fn from(id: TorrentId) -> Self {
        match id {
            TorrentId::Id(id) => Value::from(id),
            TorrentId::Hash(hash) => Value::String(hash),
        }
    }
}

/// Selection of torrents an action applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Ids {
    /// Every torrent; the `ids` argument is omitted.
    #[default]
    All,
    /// Torrents recently active, as judged by the daemon.
    RecentlyActive,
    /// An explicit list of torrents.
    List(Vec<TorrentId>),
}

impl Ids {
    /// Wire representation of the selection. `None` means the argument is omitted.
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::All => None,
            Self::RecentlyActive => Some(Value::String(RECENTLY_ACTIVE.to_owned())),
            Self::List(ids) => Some(Value::Array(
                ids.iter().cloned().map(Value::from).collect(),
            )),
        }
    }
}

impl From<i64> for Ids {
    fn from(id: i64) -> Self {
        Self::List(vec![TorrentId::Id(id)])
    }
}

impl From<Vec<i64>> for Ids {
    fn from(ids: Vec<i64>) -> Self {
        Self::List(ids.into_iter().map(TorrentId::Id).collect())
    }
}

impl From<TorrentId> for Ids {
    fn from(id: TorrentId) -> Self {
        Self::List(vec![id])
    }
}

impl From<Vec<TorrentId>> for Ids {
    fn from(ids: Vec<TorrentId>) -> Self {
        Self::List(ids)
    }
}

impl From<Vec<String>> for Ids {
    fn from(hashes: Vec<String>) -> Self {
        Self::List(hashes.into_iter().map(TorrentId::Hash).collect())
    }
}
