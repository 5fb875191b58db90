//! Connection settings for the Transmission daemon.

use std::{env, fmt};

use transmission_rpc_types::TransmissionError;
use url::Url;

/// Host used when none is configured.
pub const DEFAULT_HOST: &str = "127.0.0.1";
/// Port used when none is configured.
pub const DEFAULT_PORT: u16 = 9091;
/// Path of the RPC endpoint on the daemon.
pub const DEFAULT_PATH: &str = "/transmission/rpc";

/// Configuration for a [`crate::RpcClient`].
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Daemon host name or address. May carry a scheme, e.g. `https://seedbox.lan`.
    pub host: String,
    /// Daemon RPC port.
    pub port: u16,
    /// Path of the RPC endpoint.
    pub path: String,
    /// Use `https` when `host` carries no scheme.
    pub tls: bool,
    /// Username for HTTP basic authentication. Authentication is disabled when unset or blank.
    pub username: Option<String>,
    /// Password for HTTP basic authentication.
    pub password: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_owned(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_owned(),
            tls: false,
            username: None,
            password: None,
        }
    }
}

impl ClientConfig {
    /// Configuration for the given host and port, without authentication.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    /// Enables HTTP basic authentication.
    pub fn with_credentials(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Selects `https` for hosts without an explicit scheme.
    pub fn with_tls(mut self, tls: bool) -> Self {
        self.tls = tls;
        self
    }

    /// Reads the configuration from the environment.
    ///
    /// Recognised variables: `TRANSMISSION_HOST` (or `TRANSMISSION_HOSTNAME`),
    /// `TRANSMISSION_PORT`, `TRANSMISSION_ENABLE_TLS`, `TRANSMISSION_USERNAME`
    /// and `TRANSMISSION_PASSWORD`. Missing or unparseable values fall back to the defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_blank = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        Self {
            host: non_blank("TRANSMISSION_HOST")
                .or_else(|| non_blank("TRANSMISSION_HOSTNAME"))
                .unwrap_or(defaults.host),
            port: non_blank("TRANSMISSION_PORT")
                .and_then(|v| v.trim().parse().ok())
                .unwrap_or(defaults.port),
            path: defaults.path,
            tls: non_blank("TRANSMISSION_ENABLE_TLS")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.tls),
            username: non_blank("TRANSMISSION_USERNAME"),
            password: lookup("TRANSMISSION_PASSWORD"),
        }
    }

    /// Username and password, when authentication is enabled.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        let username = self.username.as_deref().filter(|u| !u.trim().is_empty())?;
        Some((username, self.password.as_deref().unwrap_or_default()))
    }

    /// Full URL of the RPC endpoint.
    pub fn rpc_url(&self) -> Result<Url, TransmissionError> {
        let host = self.host.trim().trim_end_matches('/');
        let base = if host.contains("://") {
            host.to_owned()
        } else {
            let scheme = if self.tls { "https" } else { "http" };
            if host.contains(':') && !host.starts_with('[') {
                format!("{scheme}://[{host}]")
            } else {
                format!("{scheme}://{host}")
            }
        };
        let path = if self.path.starts_with('/') {
            self.path.clone()
        } else {
            format!("/{}", self.path)
        };

        Url::parse(&format!("{base}:{}{path}", self.port))
            .map_err(|e| TransmissionError::InvalidArgument(format!("Invalid RPC URL: {e}")))
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never print credentials.
        write!(
            f,
            "ClientConfig(host=\"{}\", port={}, path=\"{}\", tls={}, username={:?}, password=<{}>)",
            self.host,
            self.port,
            self.path,
            self.tls,
            self.username,
            if self.password.is_some() {
                "set"
            } else {
                "unset"
            },
        )
    }
}
