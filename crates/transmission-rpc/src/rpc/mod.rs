//! RPC request pipeline.
//!
//! [`RpcClient::call`] normalizes the arguments, encodes the request, attaches the session
//! token, sends it, and turns the response into a payload or a typed error. A 409 response
//! is answered by taking the token it offers and resending the call once.

use http::{Response, Uri};
use serde_json::{Map, Value};
use tracing::{debug, warn};
use transmission_rpc_types::TransmissionError;

use crate::config::ClientConfig;
use crate::params::normalize;
use crate::request::RequestEncoder;
use crate::response::{Classification, Payload, classify, extract_payload};
use crate::session::SessionNegotiator;
use crate::transport::{Transport, UreqTransport};


/// Low level Transmission RPC client.
///
/// The session token is per-instance mutable state, so calls take `&mut self`: an
/// application sharing one client across threads must serialize the calls itself.
#[allow(missing_debug_implementations)]
pub struct RpcClient<T: Transport = UreqTransport> {
    transport: T,
    encoder: RequestEncoder,
    session: SessionNegotiator,
    last_response: Option<Response<Vec<u8>>>,
}

impl RpcClient {
    /// Creates a client using the default blocking HTTP transport.
    pub fn new(config: &ClientConfig) -> Result<Self, TransmissionError> {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> RpcClient<T> {
    /// Creates a client sending its requests through `transport`.
    pub fn with_transport(config: &ClientConfig, transport: T) -> Result<Self, TransmissionError> {
        let encoder = RequestEncoder::new(config)?;
        debug!("Using Transmission RPC endpoint {}", encoder.uri());

        Ok(Self {
            transport,
            encoder,
            session: SessionNegotiator::new(),
            last_response: None,
        })
    }

    /// Calls an RPC method and returns the decoded payload.
    ///
    /// Errors:
    /// - [`TransmissionError::Protocol`] if the daemon offers no session token, or rejects
    ///   the token it has just issued.
    /// - [`TransmissionError::Rpc`] if the daemon reports a non-success result.
    /// - [`TransmissionError::Transport`] for HTTP error statuses.
    /// - [`TransmissionError::Network`] if the transport cannot reach the daemon.
    pub fn call(
        &mut self,
        method: &str,
        arguments: Map<String, Value>,
    ) -> Result<Value, TransmissionError> {
        let arguments = normalize(&arguments)?;
        debug!("Calling {method} with arguments {arguments:?}");

        let mut response = self.exchange(method, &arguments)?;
        if classify(&response) == Classification::Conflict {
            debug!("Session token required for {method}, negotiating");
            let negotiated = self.session.on_conflict(&response);
            self.last_response = Some(response);
            negotiated?;

            response = self.exchange(method, &arguments)?;
        }

        let outcome = resolve(method, &response);
        self.last_response = Some(response);
        outcome
    }

    /// The session token currently held.
    pub fn session_token(&self) -> Option<&str> {
        self.session.token()
    }

    /// Replaces the session token. A blank token clears it.
    pub fn set_session_token(&mut self, token: &str) -> Result<(), TransmissionError> {
        self.session.set_token(token)
    }

    /// Forgets the session token; the next call negotiates a new one.
    pub fn clear_session_token(&mut self) {
        self.session.clear();
    }

    /// The most recent response received from the daemon.
    pub fn last_response(&self) -> Option<&Response<Vec<u8>>> {
        self.last_response.as_ref()
    }

    /// The RPC endpoint.
    pub fn uri(&self) -> &Uri {
        self.encoder.uri()
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn exchange(
        &self,
        method: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Response<Vec<u8>>, TransmissionError> {
        let request = self.session.decorate(self.encoder.encode(method, arguments)?);
        let response = self.transport.send(request)?;
        debug!("{method} answered with status {}", response.status());
        Ok(response)
    }
}

/// Maps a final (non-negotiating) response onto the call outcome.
fn resolve(method: &str, response: &Response<Vec<u8>>) -> Result<Value, TransmissionError> {
    let classification = classify(response);
    let payload = extract_payload(response);

    match classification {
        Classification::Success => match payload.result() {
            Some(Value::String(result)) if result != "success" => {
                Err(TransmissionError::Rpc(result.clone()))
            }
            Some(result) if !result.is_string() && !result.is_null() => {
                Err(TransmissionError::Rpc(result.to_string()))
            }
            _ => Ok(payload.into_value()),
        },
        Classification::Informational | Classification::Redirect => Ok(payload.into_value()),
        Classification::ClientError | Classification::ServerError => {
            Err(transport_error(response.status().as_u16(), &payload))
        }
        Classification::Conflict => {
            warn!("Daemon rejected a freshly negotiated session token for {method}");
            Err(TransmissionError::Protocol(
                "session token rejected after renegotiation".into(),
            ))
        }
    }
}

fn transport_error(status: u16, payload: &Payload) -> TransmissionError {
    let message = match status {
        401 => "Invalid Username/Password".to_owned(),
        403 => "Your IP Address is Not Whitelisted".to_owned(),
        _ => payload.to_message(),
    };
    TransmissionError::Transport { status, message }
}
