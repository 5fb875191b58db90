//! Shared test utilities and fixtures.

use http::{Request, Response, header::CONTENT_TYPE};
use serde_json::{Value, json};

use crate::session::SESSION_ID_HEADER;

pub(crate) fn json_response(status: u16, body: Value) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .body(serde_json::to_vec(&body).unwrap())
        .unwrap()
}

pub(crate) fn success(arguments: Value) -> Response<Vec<u8>> {
    json_response(200, json!({"result": "success", "arguments": arguments}))
}

pub(crate) fn html_response(status: u16, body: &str) -> Response<Vec<u8>> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "text/html; charset=ISO-8859-1")
        .body(body.as_bytes().to_vec())
        .unwrap()
}

/// A 409 as sent by the daemon, optionally carrying a session token.
pub(crate) fn conflict(token: Option<&str>) -> Response<Vec<u8>> {
    let mut builder = Response::builder()
        .status(409)
        .header(CONTENT_TYPE, "text/html; charset=ISO-8859-1");
    if let Some(token) = token {
        builder = builder.header(&SESSION_ID_HEADER, token);
    }
    builder
        .body(
            b"<h1>409: Conflict</h1><p>Your request had an invalid session-id header.</p>".to_vec(),
        )
        .unwrap()
}

/// The session token attached to `request`.
pub(crate) fn token_of(request: &Request<Vec<u8>>) -> Option<&str> {
    request
        .headers()
        .get(&SESSION_ID_HEADER)
        .and_then(|v| v.to_str().ok())
}

/// The decoded JSON body of `request`.
pub(crate) fn body_of(request: &Request<Vec<u8>>) -> Value {
    serde_json::from_slice(request.body()).unwrap()
}
