//! Integration tests against a real `transmission-daemon`.
//!
//! Each test starts its own daemon on a dedicated port with a temporary config directory.
//! Tests needing a daemon return early when the binary is not installed.

#![allow(unused_crate_dependencies)]
#![allow(missing_docs)]

use std::{
    fs, io,
    path::{Path, PathBuf},
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

use tempfile::TempDir;
use tracing::debug;
use transmission_rpc::{ClientConfig, Ids, TorrentId, TransmissionClient, TransmissionError};

struct ForkingDaemonGuard {
    pidfile: PathBuf,
    pid: i32,
}

impl ForkingDaemonGuard {
    fn start_transmission(pidfile: PathBuf, extra_args: &[&str]) -> io::Result<Self> {
        let pidfile_str = pidfile
            .to_str()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "pidfile path not utf-8"))?
            .to_owned();

        let mut cmd = Command::new("transmission-daemon");
        cmd.arg("-x")
            .arg(&pidfile_str)
            .args(extra_args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        cmd.spawn()?;

        wait_for_file(&pidfile, Duration::from_secs(3))?;
        let pid = read_pid(&pidfile)?;

        Ok(Self { pidfile, pid })
    }

    fn wait_tcp_ready(&self, host: &str, port: u16, timeout: Duration) -> io::Result<()> {
        use std::net::{TcpStream, ToSocketAddrs};

        let addr = (host, port)
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no address"))?;

        let start = Instant::now();
        while start.elapsed() < timeout {
            if TcpStream::connect_timeout(&addr, Duration::from_millis(150)).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(50));
        }
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            "daemon did not become ready in time",
        ))
    }
}

impl Drop for ForkingDaemonGuard {
    fn drop(&mut self) {
        #[cfg(unix)]
        {
            unsafe {
                libc::kill(self.pid as libc::pid_t, libc::SIGTERM);
            }

            let deadline = Instant::now() + Duration::from_secs(2);
            while Instant::now() < deadline {
                let alive = unsafe { libc::kill(self.pid as libc::pid_t, 0) } == 0;
                if !alive {
                    break;
                }
                thread::sleep(Duration::from_millis(50));
            }

            unsafe {
                libc::kill(self.pid as libc::pid_t, libc::SIGKILL);
            }
        }

        let _ = fs::remove_file(&self.pidfile);
    }
}

fn wait_for_file(path: &Path, timeout: Duration) -> io::Result<()> {
    let start = Instant::now();
    while start.elapsed() < timeout {
        if path.exists() {
            return Ok(());
        }
        thread::sleep(Duration::from_millis(25));
    }
    Err(io::Error::new(io::ErrorKind::TimedOut, "pidfile not created"))
}

fn read_pid(path: &Path) -> io::Result<i32> {
    let s = fs::read_to_string(path)?;
    s.trim()
        .parse::<i32>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn daemon_installed() -> bool {
    Command::new("transmission-daemon")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

fn init_test_tracing() {
    static ONCE: std::sync::Once = std::sync::Once::new();
    ONCE.call_once(|| {
        let subscriber = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter("debug")
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

/// A daemon listening on `port`, with its state kept in a temporary directory.
fn start_daemon(port: u16) -> io::Result<(TempDir, ForkingDaemonGuard, TransmissionClient)> {
    let tmp = tempfile::tempdir()?;
    let config_dir = tmp.path().join("config");
    let download_dir = tmp.path().join("complete");
    fs::create_dir_all(&config_dir)?;
    fs::create_dir_all(&download_dir)?;

    let guard = ForkingDaemonGuard::start_transmission(
        tmp.path().join("transmission.pid"),
        &[
            "-g",
            config_dir.to_str().unwrap(),
            "-w",
            download_dir.to_str().unwrap(),
            "-p",
            &port.to_string(),
        ],
    )?;
    guard.wait_tcp_ready("127.0.0.1", port, Duration::from_secs(5))?;
    debug!("Transmission daemon started with PID {}", guard.pid);

    let client = TransmissionClient::try_new(&ClientConfig::new("127.0.0.1", port))
        .map_err(|e| io::Error::other(e.to_string()))?;
    Ok((tmp, guard, client))
}

/// Happy path: negotiate a session and query the daemon state.
#[cfg(unix)]
#[test]
fn integration_test_session() -> io::Result<()> {
    init_test_tracing();
    if !daemon_installed() {
        return Ok(());
    }

    let (tmp, _guard, mut client) = start_daemon(9191)?;

    let torrents = client.get_all(&[]).unwrap();
    assert!(torrents.is_empty(), "Expected empty torrent list");
    assert!(client.rpc().session_token().is_some());

    let stats = client.session_stats().unwrap();
    assert_eq!(stats.torrent_count, 0);

    let settings = client.get_settings(&["download-dir", "version"]).unwrap();
    let download_dir = settings["download-dir"].as_str().unwrap().to_owned();
    assert!(download_dir.starts_with(tmp.path().to_str().unwrap()));

    let space = client.free_space(None).unwrap();
    assert_eq!(space.path, download_dir);
    assert!(space.size_bytes > 0);

    Ok(())
}

/// A stale token is replaced transparently on the next call.
#[cfg(unix)]
#[test]
fn integration_test_stale_token_is_renegotiated() -> io::Result<()> {
    init_test_tracing();
    if !daemon_installed() {
        return Ok(());
    }

    let (_tmp, _guard, mut client) = start_daemon(9192)?;

    client.rpc_mut().set_session_token("stale-token").unwrap();
    client.get_all(&[]).unwrap();

    let token = client.rpc().session_token().unwrap();
    assert_ne!(token, "stale-token");

    Ok(())
}

/// Adding corrupt metainfo is reported by the daemon as an RPC failure.
#[cfg(unix)]
#[test]
fn integration_test_add_invalid_torrent_content() -> io::Result<()> {
    init_test_tracing();
    if !daemon_installed() {
        return Ok(());
    }

    let (_tmp, _guard, mut client) = start_daemon(9193)?;

    let result = client.add_metainfo(b"this is not valid bencode data", None, Default::default());

    match result.unwrap_err() {
        TransmissionError::Rpc(_) | TransmissionError::InvalidArgument(_) => {}
        other => panic!("Expected Rpc error for corrupt metainfo, got: {other:?}"),
    }

    Ok(())
}

/// The daemon silently ignores unknown hashes.
#[cfg(unix)]
#[test]
fn integration_test_stop_and_remove_unknown_torrent() -> io::Result<()> {
    init_test_tracing();
    if !daemon_installed() {
        return Ok(());
    }

    let (_tmp, _guard, mut client) = start_daemon(9194)?;
    let unknown = TorrentId::from("0123456789abcdef0123456789abcdef01234567");

    client.stop(unknown.clone()).unwrap();
    client.remove(unknown, false).unwrap();
    client.verify(Ids::RecentlyActive).unwrap();

    Ok(())
}

/// Connecting to a port without a daemon fails with a network error.
#[test]
fn integration_test_connection_refused() {
    init_test_tracing();

    let mut client =
        TransmissionClient::try_new(&ClientConfig::new("127.0.0.1", 19999)).unwrap();

    match client.session_stats() {
        Err(TransmissionError::Network(_)) => {}
        Err(other) => panic!("Expected Network error, got: {other:?}"),
        Ok(_) => panic!("Expected connection to fail"),
    }
}

/// An unparseable host is rejected when the client is built.
#[test]
fn integration_test_invalid_rpc_url() {
    init_test_tracing();

    let result = TransmissionClient::try_new(&ClientConfig::new("not a host", 9091));

    match result {
        Err(TransmissionError::InvalidArgument(msg)) => {
            assert!(
                msg.contains("Invalid RPC URL"),
                "Expected invalid URL error, got: {msg}"
            );
        }
        Err(other) => panic!("Expected InvalidArgument for invalid URL, got: {other:?}"),
        Ok(_) => panic!("Expected invalid URL to be rejected"),
    }
}
