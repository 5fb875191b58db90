//! Request encoding.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use http::{
    HeaderValue, Method, Request, Uri,
    header::{AUTHORIZATION, CONTENT_TYPE, USER_AGENT},
};
use serde_json::{Map, Value, json};
use transmission_rpc_types::TransmissionError;

use crate::config::ClientConfig;

/// `User-Agent` sent with every request.
pub const DEFAULT_USER_AGENT: &str = concat!("transmission-rpc/", env!("CARGO_PKG_VERSION"));

/// Builds the HTTP requests for RPC calls against a single endpoint.
#[derive(Debug, Clone)]
pub struct RequestEncoder {
    uri: Uri,
    authorization: Option<HeaderValue>,
}

impl RequestEncoder {
    /// Creates an encoder for the endpoint and credentials in `config`.
    pub fn new(config: &ClientConfig) -> Result<Self, TransmissionError> {
        let url = config.rpc_url()?;
        let uri = url
            .as_str()
            .parse::<Uri>()
            .map_err(|e| TransmissionError::InvalidArgument(format!("Invalid RPC URL: {e}")))?;

        let authorization = config
            .credentials()
            .map(|(username, password)| basic_auth(username, password))
            .transpose()?;

        Ok(Self { uri, authorization })
    }

    /// The RPC endpoint.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Encodes `{"method": .., "arguments": ..}` as a JSON POST request.
    pub fn encode(
        &self,
        method: &str,
        arguments: &Map<String, Value>,
    ) -> Result<Request<Vec<u8>>, TransmissionError> {
        let body = serde_json::to_vec(&json!({
            "method": method,
            "arguments": arguments,
        }))
        .map_err(|e| TransmissionError::InvalidArgument(e.to_string()))?;

        let mut builder = Request::builder()
            .method(Method::POST)
            .uri(self.uri.clone())
            .header(CONTENT_TYPE, "application/json")
            .header(USER_AGENT, DEFAULT_USER_AGENT);
        if let Some(authorization) = &self.authorization {
            builder = builder.header(AUTHORIZATION, authorization.clone());
        }

        builder
            .body(body)
            .map_err(|e| TransmissionError::InvalidArgument(e.to_string()))
    }
}

fn basic_auth(username: &str, password: &str) -> Result<HeaderValue, TransmissionError> {
    let encoded = STANDARD.encode(format!("{username}:{password}"));
    let mut value = HeaderValue::from_str(&format!("Basic {encoded}"))
        .map_err(|e| TransmissionError::InvalidArgument(e.to_string()))?;
    value.set_sensitive(true);
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_builds_json_post() {
        let encoder = RequestEncoder::new(&ClientConfig::default()).unwrap();
        let mut arguments = Map::new();
        arguments.insert("ids".into(), json!([1, 2]));

        let request = encoder.encode("torrent-start", &arguments).unwrap();

        assert_eq!(*request.method(), Method::POST);
        assert_eq!(
            request.uri().to_string(),
            "http://127.0.0.1:9091/transmission/rpc"
        );
        assert_eq!(request.headers()[CONTENT_TYPE], "application/json");
        assert_eq!(request.headers()[USER_AGENT], DEFAULT_USER_AGENT);
        assert!(request.headers().get(AUTHORIZATION).is_none());

        let body: Value = serde_json::from_slice(request.body()).unwrap();
        assert_eq!(
            body,
            json!({"method": "torrent-start", "arguments": {"ids": [1, 2]}})
        );
    }

    #[test]
    fn test_encode_with_basic_auth() {
        let config = ClientConfig::default().with_credentials("admin", "secret");
        let encoder = RequestEncoder::new(&config).unwrap();

        let request = encoder.encode("session-get", &Map::new()).unwrap();

        // base64("admin:secret")
        assert_eq!(
            request.headers()[AUTHORIZATION],
            "Basic YWRtaW46c2VjcmV0"
        );
    }

    #[test]
    fn test_invalid_config() {
        let err = RequestEncoder::new(&ClientConfig::new("bad host", 1)).unwrap_err();
        assert!(matches!(err, TransmissionError::InvalidArgument(_)));
    }
}
