use clap::{Args, Parser, Subcommand, ValueEnum};
use transmission_rpc::{ClientConfig, Ids, TorrentId, config};
use transmission_rpc_types::RECENTLY_ACTIVE;

/// Top-level CLI struct for the binary.
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
pub(crate) struct Cli {
    /// Daemon connection settings.
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Command to run.
    #[command(subcommand)]
    pub command: Command,
}

/// CLI representation of [`ClientConfig`].
#[derive(Debug, Clone, Args)]
pub(crate) struct ConnectionArgs {
    /// Daemon host name or address.
    #[arg(long, env = "TRANSMISSION_HOST", default_value = config::DEFAULT_HOST)]
    pub host: String,

    /// Daemon RPC port.
    #[arg(short, long, env = "TRANSMISSION_PORT", default_value_t = config::DEFAULT_PORT)]
    pub port: u16,

    /// Connect over https.
    #[arg(long, env = "TRANSMISSION_ENABLE_TLS", default_value_t = false)]
    pub tls: bool,

    /// Username for HTTP basic authentication.
    #[arg(short, long, env = "TRANSMISSION_USERNAME")]
    pub username: Option<String>,

    /// Password for HTTP basic authentication.
    #[arg(long, env = "TRANSMISSION_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,
}

impl From<ConnectionArgs> for ClientConfig {
    fn from(args: ConnectionArgs) -> Self {
        let mut config = ClientConfig::new(args.host, args.port).with_tls(args.tls);
        if let Some(username) = args.username {
            config = config.with_credentials(username, args.password.unwrap_or_default());
        }
        config
    }
}

/// Torrent selection shared by the torrent commands.
#[derive(Debug, Clone, Default, Args)]
pub(crate) struct Selection {
    /// Torrent ids or info hashes, or `recently-active`. Selects every torrent when empty.
    pub ids: Vec<String>,
}

impl From<Selection> for Ids {
    fn from(selection: Selection) -> Self {
        parse_ids(selection.ids)
    }
}

#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// List torrents.
    List(Selection),
    /// Start torrents.
    Start {
        #[command(flatten)]
        selection: Selection,
        /// Bypass the download queue.
        #[arg(long)]
        now: bool,
    },
    /// Stop torrents.
    Stop(Selection),
    /// Verify the local data of torrents.
    Verify(Selection),
    /// Remove torrents.
    Remove {
        /// Torrent ids or info hashes.
        #[arg(required = true)]
        ids: Vec<String>,
        /// Also delete the downloaded data.
        #[arg(long)]
        delete_local_data: bool,
    },
    /// Add a torrent from a local `.torrent` file, a URL or a magnet link.
    Add {
        /// Local path, URL or magnet link.
        torrent: String,
        /// Pass `torrent` to the daemon as-is instead of reading a local file.
        #[arg(long)]
        magnet: bool,
        /// Directory to download the torrent to.
        #[arg(short, long)]
        download_dir: Option<String>,
        /// Add the torrent without starting it.
        #[arg(long)]
        paused: bool,
    },
    /// Show session statistics.
    Stats,
    /// Show session settings.
    Settings {
        /// Settings to show. Shows every setting when empty.
        fields: Vec<String>,
    },
    /// Check whether the peer port is reachable.
    PortTest,
    /// Show free space in a directory, the download directory by default.
    FreeSpace {
        /// Directory to check.
        path: Option<String>,
    },
    /// Move torrents in the download queue.
    Queue {
        /// Where to move the torrents.
        #[arg(value_enum)]
        direction: QueueDirection,
        #[command(flatten)]
        selection: Selection,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum QueueDirection {
    Top,
    Up,
    Down,
    Bottom,
}

/// Parses torrent ids given on the command line. Numbers are daemon ids, anything else is
/// taken as an info hash.
pub(crate) fn parse_ids(ids: Vec<String>) -> Ids {
    if ids.is_empty() {
        return Ids::All;
    }
    if ids.len() == 1 && ids[0] == RECENTLY_ACTIVE {
        return Ids::RecentlyActive;
    }
    Ids::List(
        ids.into_iter()
            .map(|id| match id.trim().parse::<i64>() {
                Ok(id) => TorrentId::Id(id),
                Err(_) => TorrentId::Hash(id),
            })
            .collect(),
    )
}
