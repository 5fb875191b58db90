//! Typed records returned by the daemon.
//!
//! The field names follow the Transmission RPC protocol. Every torrent field is optional
//! because the daemon only returns the fields a `torrent-get` call asked for.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Named field sets for `torrent-get`.
#[derive(Debug, Clone, Copy)]
pub struct TorrentFields;

impl TorrentFields {
    /// Fields requested when the caller does not name any.
    pub const DEFAULT: &'static [&'static str] = &[
        "id",
        "eta",
        "name",
        "status",
        "isFinished",
        "files",
        "hashString",
        "downloadDir",
        "percentDone",
        "haveValid",
        "haveUnchecked",
        "totalSize",
        "leftUntilDone",
        "addedDate",
        "doneDate",
        "activityDate",
    ];

    /// Transfer statistics.
    pub const STATS: &'static [&'static str] = &[
        "error",
        "errorString",
        "eta",
        "isFinished",
        "isStalled",
        "leftUntilDone",
        "metadataPercentComplete",
        "peersConnected",
        "peersGettingFromUs",
        "peersSendingToUs",
        "percentDone",
        "queuePosition",
        "rateDownload",
        "rateUpload",
        "recheckProgress",
        "seedRatioMode",
        "seedRatioLimit",
        "sizeWhenDone",
        "status",
        "trackers",
        "downloadDir",
        "uploadedEver",
        "uploadRatio",
        "webseedsSendingToUs",
    ];

    /// Extra statistics, usually requested for a single torrent.
    pub const STATS_EXTRA: &'static [&'static str] = &[
        "activityDate",
        "corruptEver",
        "desiredAvailable",
        "downloadedEver",
        "fileStats",
        "haveUnchecked",
        "haveValid",
        "peers",
        "startDate",
        "trackerStats",
    ];

    /// Metainfo details.
    pub const INFO_EXTRA: &'static [&'static str] = &[
        "comment",
        "creator",
        "dateCreated",
        "files",
        "hashString",
        "isPrivate",
        "pieceCount",
        "pieceSize",
    ];
}

/// Activity state of a torrent (`status` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum TorrentStatus {
    Stopped,
    CheckWait,
    Check,
    DownloadWait,
    Download,
    SeedWait,
    Seed,
    Isolated,
}

impl TryFrom<i64> for TorrentStatus {
    type Error = i64;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::Stopped,
            1 => Self::CheckWait,
            2 => Self::Check,
            3 => Self::DownloadWait,
            4 => Self::Download,
            5 => Self::SeedWait,
            6 => Self::Seed,
            7 => Self::Isolated,
            other => return Err(other),
        })
    }
}

/// Error state of a torrent (`error` field).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TorrentError {
    /// No error.
    None,
    /// The tracker returned a warning.
    TrackerWarning,
    /// The tracker returned an error.
    TrackerError,
    /// Local failure, such as a missing download directory.
    LocalError,
}

impl TryFrom<i64> for TorrentError {
    type Error = i64;

    fn try_from(code: i64) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => Self::None,
            1 => Self::TrackerWarning,
            2 => Self::TrackerError,
            3 => Self::LocalError,
            other => return Err(other),
        })
    }
}

/// A file inside a torrent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct TorrentFile {
    pub name: String,
    pub length: i64,
    pub bytes_completed: i64,
}

/// Torrent information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)] // rationale: these are the same fields as in Transmission RPC
pub struct Torrent {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub hash_string: Option<String>,
    pub status: Option<i64>,
    pub error: Option<i64>,
    pub error_string: Option<String>,
    pub eta: Option<i64>,
    pub is_finished: Option<bool>,
    pub is_stalled: Option<bool>,
    pub is_private: Option<bool>,
    pub files: Option<Vec<TorrentFile>>,
    pub download_dir: Option<String>,
    pub percent_done: Option<f64>,
    pub metadata_percent_complete: Option<f64>,
    pub recheck_progress: Option<f64>,
    pub have_valid: Option<i64>,
    pub have_unchecked: Option<i64>,
    pub total_size: Option<i64>,
    pub size_when_done: Option<i64>,
    pub left_until_done: Option<i64>,
    pub corrupt_ever: Option<i64>,
    pub desired_available: Option<i64>,
    pub downloaded_ever: Option<i64>,
    pub uploaded_ever: Option<i64>,
    pub upload_ratio: Option<f64>,
    pub rate_download: Option<i64>,
    pub rate_upload: Option<i64>,
    pub peers_connected: Option<i64>,
    pub peers_getting_from_us: Option<i64>,
    pub peers_sending_to_us: Option<i64>,
    pub webseeds_sending_to_us: Option<i64>,
    pub queue_position: Option<i64>,
    pub seed_ratio_mode: Option<i64>,
    pub seed_ratio_limit: Option<f64>,
    pub added_date: Option<i64>,
    pub done_date: Option<i64>,
    pub activity_date: Option<i64>,
    pub start_date: Option<i64>,
    pub date_created: Option<i64>,
    pub comment: Option<String>,
    pub creator: Option<String>,
    pub piece_count: Option<i64>,
    pub piece_size: Option<i64>,
    /// Fields without a dedicated member (`trackers`, `peers`, `fileStats`, ...).
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Torrent {
    /// Seed ratio mode: follow the session-wide limit.
    pub const RATIO_USE_GLOBAL: i64 = 0;
    /// Seed ratio mode: use the torrent's own limit.
    pub const RATIO_USE_LOCAL: i64 = 1;
    /// Seed ratio mode: seed regardless of ratio.
    pub const RATIO_UNLIMITED: i64 = 2;

    /// Decoded `status` field, if present and known.
    pub fn status(&self) -> Option<TorrentStatus> {
        self.status.and_then(|code| TorrentStatus::try_from(code).ok())
    }

    /// Human readable status, as shown by the Transmission web client.
    pub fn status_string(&self) -> &'static str {
        let Some(code) = self.status else {
            return "Unknown";
        };
        match TorrentStatus::try_from(code) {
            Ok(TorrentStatus::Stopped) if self.is_finished.unwrap_or(false) => "Seeding complete",
            Ok(TorrentStatus::Stopped) => "Paused",
            Ok(TorrentStatus::CheckWait) => "Queued for verification",
            Ok(TorrentStatus::Check) => "Verifying local data",
            Ok(TorrentStatus::DownloadWait) => "Queued for download",
            Ok(TorrentStatus::Download) => "Downloading",
            Ok(TorrentStatus::SeedWait) => "Queued for seeding",
            Ok(TorrentStatus::Seed) => "Seeding",
            Ok(TorrentStatus::Isolated) | Err(_) => "Error",
        }
    }

    #[allow(missing_docs)]
    pub fn is_stopped(&self) -> bool {
        self.status() == Some(TorrentStatus::Stopped)
    }

    #[allow(missing_docs)]
    pub fn is_checking(&self) -> bool {
        self.status() == Some(TorrentStatus::Check)
    }

    #[allow(missing_docs)]
    pub fn is_downloading(&self) -> bool {
        self.status() == Some(TorrentStatus::Download)
    }

    /// Waiting in either the download or the seed queue.
    pub fn is_queued(&self) -> bool {
        matches!(
            self.status(),
            Some(TorrentStatus::DownloadWait | TorrentStatus::SeedWait)
        )
    }

    #[allow(missing_docs)]
    pub fn is_seeding(&self) -> bool {
        self.status() == Some(TorrentStatus::Seed)
    }

    /// Nothing left to download.
    pub fn is_done(&self) -> bool {
        self.left_until_done.unwrap_or(0) < 1
    }

    /// Completion as a whole percentage, e.g. `"42%"`.
    pub fn percent_done_string(&self) -> String {
        let percent = (self.percent_done.unwrap_or(0.0) * 100.0) as i64;
        format!("{percent}%")
    }

    /// Bytes downloaded so far, verified or not.
    pub fn total_done(&self) -> i64 {
        self.have_valid.unwrap_or(0) + self.have_unchecked.unwrap_or(0)
    }

    #[allow(missing_docs)]
    pub fn file_count(&self) -> usize {
        self.files.as_ref().map_or(0, Vec::len)
    }

    #[allow(missing_docs)]
    pub fn file(&self, index: usize) -> Option<&TorrentFile> {
        self.files.as_ref().and_then(|files| files.get(index))
    }

    /// Decoded `error` field.
    pub fn error_kind(&self) -> Option<TorrentError> {
        self.error.and_then(|code| TorrentError::try_from(code).ok())
    }

    /// Error description combining the error kind and the daemon's error string.
    pub fn error_message(&self) -> Option<String> {
        let detail = self.error_string.as_deref().unwrap_or_default();
        match self.error_kind()? {
            TorrentError::None => None,
            TorrentError::TrackerWarning => Some(format!("Tracker returned a warning: {detail}")),
            TorrentError::TrackerError => Some(format!("Tracker returned an error: {detail}")),
            TorrentError::LocalError => Some(format!("Error: {detail}")),
        }
    }
}

/// Torrent returned by `torrent-add`.
#[derive(Debug, Clone, PartialEq)]
pub enum AddedTorrent {
    /// The torrent was new and has been added.
    Added(Torrent),
    /// The daemon already had this torrent.
    Duplicate(Torrent),
}

impl AddedTorrent {
    /// The torrent, whether newly added or already known.
    pub fn torrent(&self) -> &Torrent {
        match self {
            Self::Added(torrent) | Self::Duplicate(torrent) => torrent,
        }
    }

    #[allow(missing_docs)]
    pub fn is_duplicate(&self) -> bool {
        matches!(self, Self::Duplicate(_))
    }
}

/// Session statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct SessionStats {
    pub active_torrent_count: i64,

    #[serde(rename = "cumulative-stats")]
    pub cumulative_stats: StatsDetails,

    #[serde(rename = "current-stats")]
    pub current_stats: StatsDetails,

    pub download_speed: i64,

    pub paused_torrent_count: i64,

    pub torrent_count: i64,

    pub upload_speed: i64,
}

/// Detailed statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[allow(missing_docs)]
pub struct StatsDetails {
    pub downloaded_bytes: i64,

    pub files_added: i64,

    pub seconds_active: i64,

    pub session_count: i64,

    pub uploaded_bytes: i64,
}

/// Result of a `free-space` request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FreeSpace {
    /// Directory that was queried.
    pub path: String,
    /// Free bytes available in `path`.
    #[serde(rename = "size-bytes")]
    pub size_bytes: i64,
    /// Total capacity of the volume, reported by newer daemons only.
    #[serde(rename = "total_size")]
    pub total_size: Option<i64>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn torrent(value: Value) -> Torrent {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_torrent_deserialization() {
        let t = torrent(json!({
            "id": 42,
            "name": "My Torrent",
            "hashString": "deadbeef",
            "percentDone": 0.5,
            "downloadDir": "/downloads",
            "files": [{"name": "a.txt", "length": 10, "bytesCompleted": 5}],
            "trackers": [],
        }));

        assert_eq!(t.id, Some(42));
        assert_eq!(t.name.as_deref(), Some("My Torrent"));
        assert_eq!(t.hash_string.as_deref(), Some("deadbeef"));
        assert_eq!(t.download_dir.as_deref(), Some("/downloads"));
        assert_eq!(t.file_count(), 1);
        assert_eq!(t.file(0).map(|f| f.bytes_completed), Some(5));
        assert!(t.extra.contains_key("trackers"));
        assert_eq!(t.percent_done_string(), "50%");
    }

    #[test]
    fn test_status_strings() {
        assert_eq!(Torrent::default().status_string(), "Unknown");
        assert_eq!(torrent(json!({"status": 0})).status_string(), "Paused");
        assert_eq!(
            torrent(json!({"status": 0, "isFinished": true})).status_string(),
            "Seeding complete"
        );
        assert_eq!(torrent(json!({"status": 4})).status_string(), "Downloading");
        assert_eq!(torrent(json!({"status": 7})).status_string(), "Error");
        assert_eq!(torrent(json!({"status": 99})).status_string(), "Error");
    }

    #[test]
    fn test_status_predicates() {
        assert!(torrent(json!({"status": 3})).is_queued());
        assert!(torrent(json!({"status": 5})).is_queued());
        assert!(torrent(json!({"status": 6})).is_seeding());
        assert!(torrent(json!({"status": 2})).is_checking());
        assert!(!torrent(json!({"status": 4})).is_stopped());
        assert!(torrent(json!({"leftUntilDone": 0})).is_done());
        assert!(!torrent(json!({"leftUntilDone": 10})).is_done());
    }

    #[test]
    fn test_total_done_and_errors() {
        let t = torrent(json!({
            "haveValid": 100,
            "haveUnchecked": 20,
            "error": 2,
            "errorString": "unregistered torrent",
        }));
        assert_eq!(t.total_done(), 120);
        assert_eq!(
            t.error_message().as_deref(),
            Some("Tracker returned an error: unregistered torrent")
        );
        assert_eq!(torrent(json!({"error": 0})).error_message(), None);
    }

    #[test]
    fn test_stats_deserialization() {
        let stats: SessionStats = serde_json::from_value(json!({
            "activeTorrentCount": 1,
            "downloadSpeed": 1000,
            "uploadSpeed": 500,
            "pausedTorrentCount": 0,
            "torrentCount": 1,
            "cumulative-stats": {"downloadedBytes": 1000, "sessionCount": 10},
            "current-stats": {"downloadedBytes": 100},
        }))
        .unwrap();

        assert_eq!(stats.active_torrent_count, 1);
        assert_eq!(stats.download_speed, 1000);
        assert_eq!(stats.cumulative_stats.downloaded_bytes, 1000);
        assert_eq!(stats.cumulative_stats.session_count, 10);
        assert_eq!(stats.current_stats.downloaded_bytes, 100);
    }
}
