//! HTTP transport abstraction.
//!
//! This module provides the [`Transport`] trait which abstracts the HTTP client used to
//! reach the daemon, enabling mocking in tests, and [`UreqTransport`], the default
//! blocking implementation.

use std::{fmt, io::Read, time::Duration};

use http::{Request, Response};
use tracing::debug;
use transmission_rpc_types::TransmissionError;

/// Sends a request and returns the daemon's response.
///
/// HTTP error statuses must be returned as responses; only connectivity failures are
/// errors. Timeouts and cancellation belong to the implementation.
#[cfg_attr(test, mockall::automock)]
pub trait Transport {
    /// Sends `request` synchronously.
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransmissionError>;
}

/// [`Transport`] backed by a [`ureq::Agent`].
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// Transport with default timeouts.
    pub fn new() -> Self {
        Self::with_timeouts(
            Duration::from_secs(5),
            Duration::from_secs(30),
            Duration::from_secs(30),
        )
    }

    /// Transport with explicit connect, read and write timeouts.
    pub fn with_timeouts(connect: Duration, read: Duration, write: Duration) -> Self {
        Self {
            agent: ureq::AgentBuilder::new()
                .timeout_connect(connect)
                .timeout_read(read)
                .timeout_write(write)
                .build(),
        }
    }

    /// Transport reusing an existing agent (proxy, TLS settings, etc.)
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("UreqTransport")
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: Request<Vec<u8>>) -> Result<Response<Vec<u8>>, TransmissionError> {
        let (parts, body) = request.into_parts();
        let url = parts.uri.to_string();

        let mut call = self.agent.request(parts.method.as_str(), &url);
        for (name, value) in &parts.headers {
            let value = value.to_str().map_err(|e| {
                TransmissionError::InvalidArgument(format!("header {name} is not visible ASCII: {e}"))
            })?;
            call = call.set(name.as_str(), value);
        }

        let response = match call.send_bytes(&body) {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                debug!("{} answered with status {status}", url);
                response
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(TransmissionError::Network(transport.to_string()));
            }
        };

        into_http_response(response)
    }
}

fn into_http_response(response: ureq::Response) -> Result<Response<Vec<u8>>, TransmissionError> {
    let mut builder = Response::builder().status(response.status());
    for name in response.headers_names() {
        for value in response.all(&name) {
            builder = builder.header(name.as_str(), value);
        }
    }

    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .map_err(|e| TransmissionError::Network(format!("failed to read response body: {e}")))?;

    builder
        .body(body)
        .map_err(|e| TransmissionError::UnexpectedResponse(e.to_string()))
}
