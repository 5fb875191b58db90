//! # Transmission CLI
//!
//! ## Usage
//!
//! ```sh,ignore
//! cargo run --release -p transmission-cli -- --host 127.0.0.1 list
//! ```

use std::{fs, io, path::Path};

use clap::Parser;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use transmission_rpc::{ClientConfig, Ids, TransmissionClient};
use transmission_rpc_types::TransmissionError;

mod cli;

use cli::{Cli, Command, QueueDirection};

/// Error variants for the CLI.
#[derive(Error, Debug)]
enum Error {
    /// The daemon or the client reported an error.
    #[error(transparent)]
    Transmission(#[from] TransmissionError),

    /// Reading a local torrent file failed.
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Rendering the output failed.
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

/// Initializes the tracing subscriber.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Runs `command` and returns its result as JSON.
fn run(client: &mut TransmissionClient, command: Command) -> Result<Value, Error> {
    let output = match command {
        Command::List(selection) => serde_json::to_value(client.get(selection, &[])?)?,
        Command::Start { selection, now } => {
            if now {
                client.start_now(selection)?;
            } else {
                client.start(selection)?;
            }
            Value::Null
        }
        Command::Stop(selection) => {
            client.stop(selection)?;
            Value::Null
        }
        Command::Verify(selection) => {
            client.verify(selection)?;
            Value::Null
        }
        Command::Remove {
            ids,
            delete_local_data,
        } => {
            client.remove(cli::parse_ids(ids), delete_local_data)?;
            Value::Null
        }
        Command::Add {
            torrent,
            magnet,
            download_dir,
            paused,
        } => {
            let mut arguments = Map::new();
            if paused {
                arguments.insert("paused".to_owned(), Value::Bool(true));
            }
            let download_dir = download_dir.as_deref();

            let added = if !magnet && Path::new(&torrent).is_file() {
                let metainfo = fs::read(&torrent).map_err(|source| Error::Io {
                    path: torrent.clone(),
                    source,
                })?;
                client.add_metainfo(&metainfo, download_dir, arguments)?
            } else {
                client.add_file(&torrent, download_dir, arguments)?
            };

            if added.is_duplicate() {
                info!("Torrent was already added");
            }
            serde_json::to_value(added.torrent())?
        }
        Command::Stats => serde_json::to_value(client.session_stats()?)?,
        Command::Settings { fields } => {
            let fields: Vec<&str> = fields.iter().map(String::as_str).collect();
            client.get_settings(&fields)?
        }
        Command::PortTest => Value::Bool(client.port_test()?),
        Command::FreeSpace { path } => serde_json::to_value(client.free_space(path.as_deref())?)?,
        Command::Queue {
            direction,
            selection,
        } => {
            let ids = Ids::from(selection);
            match direction {
                QueueDirection::Top => client.queue_move_top(ids)?,
                QueueDirection::Up => client.queue_move_up(ids)?,
                QueueDirection::Down => client.queue_move_down(ids)?,
                QueueDirection::Bottom => client.queue_move_bottom(ids)?,
            }
            Value::Null
        }
    };
    Ok(output)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();
    let config = ClientConfig::from(cli.connection);
    debug!("Using {config:?}");

    let mut client = TransmissionClient::try_new(&config)?;
    let output = run(&mut client, cli.command)?;

    if !output.is_null() {
        println!("{}", serde_json::to_string_pretty(&output)?);
    }

    Ok(())
}
