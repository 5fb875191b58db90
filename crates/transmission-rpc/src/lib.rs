//! # Transmission RPC client.
//!
//! [`RpcClient`] speaks the daemon's JSON RPC protocol: it normalizes call arguments,
//! negotiates the `X-Transmission-Session-Id` token transparently and maps every failure
//! onto [`TransmissionError`]. [`TransmissionClient`] builds the torrent and session
//! commands on top of it.
//!
//! usage:
//!
//! ```rust,ignore
//! use transmission_rpc::{ClientConfig, TransmissionClient};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("127.0.0.1", 9091).with_credentials("admin", "secret");
//!     let mut client = TransmissionClient::try_new(&config)?;
//!     let added = client.add_file("https://example.org/file.torrent", None, Default::default())?;
//!     println!("Added torrent: {:?}", added.torrent().name);
//!     for torrent in client.get_all(&[])? {
//!         println!("{:?}: {}", torrent.name, torrent.status_string());
//!     }
//!     Ok(())
//! }
//! ```

mod client;
pub mod config;
mod conversions;
pub mod params;
pub mod request;
pub mod response;
mod rpc;
pub mod session;
#[cfg(test)]
mod testutil;
pub mod transport;

#[cfg(test)]
use libc as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tracing_subscriber as _;

pub use client::TransmissionClient;
pub use config::ClientConfig;
pub use rpc::RpcClient;
pub use transport::{Transport, UreqTransport};
pub use transmission_rpc_types::{
    AddedTorrent, FreeSpace, Ids, SessionStats, StatsDetails, Torrent, TorrentError,
    TorrentFields, TorrentFile, TorrentId, TorrentStatus, TransmissionError,
};
