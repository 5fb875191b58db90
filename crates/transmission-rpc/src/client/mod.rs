//! High level Transmission client.
//!
//! [`TransmissionClient`] maps torrent and session commands onto RPC methods and decodes
//! their results into the records of `transmission_rpc_types`.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::{Map, Value, json};
use tracing::debug;
use transmission_rpc_types::{
    AddedTorrent, FreeSpace, Ids, SessionStats, Torrent, TorrentFields, TransmissionError,
};

use crate::config::ClientConfig;
use crate::conversions::{added_torrent, argument, arguments, record, torrents};
use crate::params::{IDS_KEY, is_blank};
use crate::rpc::RpcClient;
use crate::transport::{Transport, UreqTransport};


/// TransmissionClient drives a Transmission daemon through its RPC interface.
#[allow(missing_debug_implementations)]
pub struct TransmissionClient<T: Transport = UreqTransport> {
    rpc: RpcClient<T>,
}

impl TransmissionClient {
    /// Create a new TransmissionClient using the default HTTP transport.
    ///
    /// No request is sent until the first command; the session token is negotiated then.
    pub fn try_new(config: &ClientConfig) -> Result<Self, TransmissionError> {
        debug!("Creating Transmission client for {config:?}");
        Ok(Self {
            rpc: RpcClient::new(config)?,
        })
    }

    /// Create a client configured from the `TRANSMISSION_*` environment variables.
    pub fn from_env() -> Result<Self, TransmissionError> {
        Self::try_new(&ClientConfig::from_env())
    }
}

impl<T: Transport> TransmissionClient<T> {
    /// Create a TransmissionClient with a custom transport.
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, TransmissionError> {
        Ok(Self {
            rpc: RpcClient::with_transport(config, transport)?,
        })
    }

    /// The underlying RPC client.
    pub fn rpc(&self) -> &RpcClient<T> {
        &self.rpc
    }

    /// The underlying RPC client, e.g. to call methods without a dedicated command.
    pub fn rpc_mut(&mut self) -> &mut RpcClient<T> {
        &mut self.rpc
    }

    /// Start torrents.
    pub fn start(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("torrent-start", ids.into())
    }

    /// Start torrents, bypassing the download queue.
    pub fn start_now(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("torrent-start-now", ids.into())
    }

    /// Stop torrents.
    pub fn stop(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("torrent-stop", ids.into())
    }

    /// Verify the local data of torrents.
    pub fn verify(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("torrent-verify", ids.into())
    }

    /// Ask the trackers for more peers.
    pub fn reannounce(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("torrent-reannounce", ids.into())
    }

    /// Change torrent properties (`torrent-set`).
    pub fn set(
        &mut self,
        ids: impl Into<Ids>,
        arguments: Map<String, Value>,
    ) -> Result<(), TransmissionError> {
        let ids = ids.into();
        if is_empty_selection(&ids) {
            return Ok(());
        }
        self.rpc.call("torrent-set", with_ids(&ids, arguments))?;
        Ok(())
    }

    /// Fetch torrents. An empty `fields` requests [`TorrentFields::DEFAULT`].
    pub fn get(
        &mut self,
        ids: impl Into<Ids>,
        fields: &[&str],
    ) -> Result<Vec<Torrent>, TransmissionError> {
        let ids = ids.into();
        if is_empty_selection(&ids) {
            return Ok(Vec::new());
        }

        let fields = if fields.is_empty() {
            TorrentFields::DEFAULT
        } else {
            fields
        };
        debug!("Getting torrents {ids:?}");
        let payload = self
            .rpc
            .call("torrent-get", with_ids(&ids, object(json!({"fields": fields}))))?;

        let torrents = torrents(payload)?;
        debug!("Got {} torrents", torrents.len());
        Ok(torrents)
    }

    /// Fetch every torrent.
    pub fn get_all(&mut self, fields: &[&str]) -> Result<Vec<Torrent>, TransmissionError> {
        self.get(Ids::All, fields)
    }

    /// Add a torrent from a filename, URL or magnet link.
    pub fn add_file(
        &mut self,
        filename: &str,
        download_dir: Option<&str>,
        arguments: Map<String, Value>,
    ) -> Result<AddedTorrent, TransmissionError> {
        debug!("Adding torrent from {filename}");
        self.add("filename", Value::from(filename), download_dir, arguments)
    }

    /// Add a torrent from the content of a `.torrent` file.
    pub fn add_metainfo(
        &mut self,
        metainfo: &[u8],
        download_dir: Option<&str>,
        arguments: Map<String, Value>,
    ) -> Result<AddedTorrent, TransmissionError> {
        debug!("Adding torrent from {} bytes of metainfo", metainfo.len());
        self.add(
            "metainfo",
            Value::from(STANDARD.encode(metainfo)),
            download_dir,
            arguments,
        )
    }

    /// Remove torrents, optionally deleting their downloaded data.
    pub fn remove(
        &mut self,
        ids: impl Into<Ids>,
        delete_local_data: bool,
    ) -> Result<(), TransmissionError> {
        let ids = ids.into();
        if is_empty_selection(&ids) {
            return Ok(());
        }
        debug!("Removing torrents {ids:?}, delete_local_data={delete_local_data}");
        self.rpc.call(
            "torrent-remove",
            with_ids(&ids, object(json!({"delete-local-data": delete_local_data}))),
        )?;
        Ok(())
    }

    /// Move torrents to `location`. When `move_data` is false the daemon looks for the
    /// files in `location` instead of moving them.
    pub fn move_to(
        &mut self,
        ids: impl Into<Ids>,
        location: &str,
        move_data: bool,
    ) -> Result<(), TransmissionError> {
        let ids = ids.into();
        if is_empty_selection(&ids) {
            return Ok(());
        }
        self.rpc.call(
            "torrent-set-location",
            with_ids(&ids, object(json!({"location": location, "move": move_data}))),
        )?;
        Ok(())
    }

    /// Rename a file or folder of a torrent. Returns the daemon's arguments
    /// (`id`, `path`, `name`). Fails with [`TransmissionError::InvalidArgument`] on an
    /// empty selection.
    pub fn rename(
        &mut self,
        ids: impl Into<Ids>,
        path: &str,
        name: &str,
    ) -> Result<Value, TransmissionError> {
        let ids = ids.into();
        if is_empty_selection(&ids) {
            return Err(TransmissionError::InvalidArgument(
                "rename needs a torrent to act on".to_owned(),
            ));
        }
        let payload = self.rpc.call(
            "torrent-rename-path",
            with_ids(&ids, object(json!({"path": path, "name": name}))),
        )?;
        Ok(arguments(payload))
    }

    /// Change session settings (`session-set`).
    pub fn set_settings(&mut self, arguments: Map<String, Value>) -> Result<(), TransmissionError> {
        self.rpc.call("session-set", arguments)?;
        Ok(())
    }

    /// Session settings. An empty `fields` returns every setting.
    pub fn get_settings(&mut self, fields: &[&str]) -> Result<Value, TransmissionError> {
        let payload = self
            .rpc
            .call("session-get", object(json!({"fields": fields})))?;
        Ok(arguments(payload))
    }

    #[allow(missing_docs)]
    pub fn session_stats(&mut self) -> Result<SessionStats, TransmissionError> {
        let payload = self.rpc.call("session-stats", Map::new())?;
        record(arguments(payload), "session stats")
    }

    /// Reload the blocklist; returns its new size.
    pub fn update_blocklist(&mut self) -> Result<i64, TransmissionError> {
        let payload = self.rpc.call("blocklist-update", Map::new())?;
        record(argument(payload, "blocklist-size")?, "blocklist size")
    }

    /// Whether the incoming peer port is reachable from the outside.
    pub fn port_test(&mut self) -> Result<bool, TransmissionError> {
        let payload = self.rpc.call("port-test", Map::new())?;
        record(argument(payload, "port-is-open")?, "port test result")
    }

    /// Shut the daemon down.
    pub fn close(&mut self) -> Result<(), TransmissionError> {
        self.rpc.call("session-close", Map::new())?;
        Ok(())
    }

    #[allow(missing_docs)]
    pub fn queue_move_top(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("queue-move-top", ids.into())
    }

    #[allow(missing_docs)]
    pub fn queue_move_up(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("queue-move-up", ids.into())
    }

    #[allow(missing_docs)]
    pub fn queue_move_down(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("queue-move-down", ids.into())
    }

    #[allow(missing_docs)]
    pub fn queue_move_bottom(&mut self, ids: impl Into<Ids>) -> Result<(), TransmissionError> {
        self.action("queue-move-bottom", ids.into())
    }

    /// Free space in `path`, or in the session download directory when `path` is blank.
    pub fn free_space(&mut self, path: Option<&str>) -> Result<FreeSpace, TransmissionError> {
        let path = match path.filter(|p| !p.trim().is_empty()) {
            Some(path) => path.to_owned(),
            None => {
                let settings = self.get_settings(&["download-dir"])?;
                settings
                    .get("download-dir")
                    .and_then(Value::as_str)
                    .map(str::to_owned)
                    .ok_or_else(|| {
                        TransmissionError::UnexpectedResponse("missing download-dir".into())
                    })?
            }
        };

        debug!("Checking free space in {path}");
        let payload = self.rpc.call("free-space", object(json!({"path": path})))?;
        record(arguments(payload), "free space")
    }

    /// Session-wide seed ratio limit, or `-1.0` when seeding is not ratio limited.
    pub fn seed_ratio_limit(&mut self) -> Result<f64, TransmissionError> {
        let settings = self.get_settings(&["seedRatioLimited", "seedRatioLimit"])?;
        if !settings
            .get("seedRatioLimited")
            .and_then(Value::as_bool)
            .unwrap_or(false)
        {
            return Ok(-1.0);
        }

        settings
            .get("seedRatioLimit")
            .and_then(Value::as_f64)
            .ok_or_else(|| TransmissionError::UnexpectedResponse("missing seedRatioLimit".into()))
    }

    /// Seed ratio limit effective for `torrent`, following its `seedRatioMode`.
    /// Returns `-1.0` for unlimited seeding.
    pub fn torrent_seed_ratio_limit(&mut self, torrent: &Torrent) -> Result<f64, TransmissionError> {
        match torrent.seed_ratio_mode {
            Some(Torrent::RATIO_USE_GLOBAL) => self.seed_ratio_limit(),
            Some(Torrent::RATIO_USE_LOCAL) => torrent.seed_ratio_limit.ok_or_else(|| {
                TransmissionError::UnexpectedResponse("missing seedRatioLimit".into())
            }),
            _ => Ok(-1.0),
        }
    }

    /// Set the default download directory.
    pub fn update_download_dir(&mut self, download_dir: &str) -> Result<(), TransmissionError> {
        self.set_settings(object(json!({"download-dir": download_dir})))
    }

    /// Set the directory for incomplete downloads and enable or disable its use.
    pub fn update_incomplete_dir(
        &mut self,
        incomplete_dir: &str,
        enabled: bool,
    ) -> Result<(), TransmissionError> {
        self.set_settings(object(json!({
            "incomplete-dir": incomplete_dir,
            "incomplete-dir-enabled": enabled,
        })))
    }

    fn action(&mut self, method: &str, ids: Ids) -> Result<(), TransmissionError> {
        if is_empty_selection(&ids) {
            debug!("Skipping {method}, no torrents selected");
            return Ok(());
        }
        debug!("Sending {method} for {ids:?}");
        self.rpc.call(method, with_ids(&ids, Map::new()))?;
        Ok(())
    }

    fn add(
        &mut self,
        key: &str,
        torrent: Value,
        download_dir: Option<&str>,
        mut arguments: Map<String, Value>,
    ) -> Result<AddedTorrent, TransmissionError> {
        arguments.insert(key.to_owned(), torrent);
        if let Some(download_dir) = download_dir {
            arguments.insert("download-dir".to_owned(), Value::from(download_dir));
        }

        let payload = self.rpc.call("torrent-add", arguments)?;
        let added = added_torrent(payload)?;
        debug!("Added {added:?}");
        Ok(added)
    }
}

/// An explicit but empty id list selects nothing. Sent as-is, the daemon would drop the
/// blank `ids` and apply the command to every torrent.
fn is_empty_selection(ids: &Ids) -> bool {
    matches!(ids, Ids::List(list) if list.is_empty())
}

fn with_ids(ids: &Ids, mut arguments: Map<String, Value>) -> Map<String, Value> {
    if let Some(ids) = ids.to_value().filter(|v| !is_blank(v)) {
        arguments.insert(IDS_KEY.to_owned(), ids);
    }
    arguments
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
