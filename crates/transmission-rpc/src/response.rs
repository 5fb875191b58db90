//! Response classification and payload extraction.

use std::sync::LazyLock;

use http::{Response, StatusCode, header::CONTENT_TYPE};
use regex::Regex;
use serde_json::Value;

// A `<` only opens a tag when a name, `/`, `!` or `?` follows it.
static MARKUP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--.*?-->|</?[A-Za-z!?][^>]*>?").expect("markup pattern is valid")
});

/// Status band of a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// 1xx
    Informational,
    /// 2xx
    Success,
    /// 3xx
    Redirect,
    /// 4xx, except 409.
    ClientError,
    /// 5xx and above.
    ServerError,
    /// 409: the session token must be (re)negotiated.
    Conflict,
}

impl Classification {
    /// Classifies a status code.
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            409 => Self::Conflict,
            100..=199 => Self::Informational,
            200..=299 => Self::Success,
            300..=399 => Self::Redirect,
            400..=499 => Self::ClientError,
            _ => Self::ServerError,
        }
    }

    /// Client or server error. A conflict is not an error, it triggers negotiation.
    pub fn is_error(self) -> bool {
        matches!(self, Self::ClientError | Self::ServerError)
    }
}

/// Classifies a transport response.
pub fn classify<B>(response: &Response<B>) -> Classification {
    Classification::from_status(response.status())
}

/// Decoded body of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// Body parsed as JSON.
    Json(Value),
    /// Raw body, with markup stripped for error responses.
    Text(String),
}

impl Payload {
    /// The payload as a JSON value; text becomes a JSON string.
    pub fn into_value(self) -> Value {
        match self {
            Self::Json(value) => value,
            Self::Text(text) => Value::String(text),
        }
    }

    /// The `result` field of a JSON object payload.
    pub fn result(&self) -> Option<&Value> {
        match self {
            Self::Json(Value::Object(map)) => map.get("result"),
            _ => None,
        }
    }

    /// Human readable rendering, used for error messages.
    pub fn to_message(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Json(value) => match self.result() {
                Some(Value::String(result)) => result.clone(),
                _ => value.to_string(),
            },
        }
    }
}

/// Extracts the payload of a response. Never fails: a body that does not parse as JSON is
/// returned as text.
pub fn extract_payload(response: &Response<Vec<u8>>) -> Payload {
    let body = String::from_utf8_lossy(response.body());
    let classification = classify(response);

    // The daemon renders its error pages as HTML.
    if classification.is_error() || classification == Classification::Conflict {
        return Payload::Text(strip_tags(&body));
    }

    if is_json(response) {
        if let Ok(value) = serde_json::from_str(&body) {
            return Payload::Json(value);
        }
    }

    Payload::Text(body.into_owned())
}

/// Removes markup tags and comments from `text`. Surrounding whitespace and a `<` that does
/// not open a tag are kept.
pub fn strip_tags(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

fn is_json<B>(response: &Response<B>) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim_start().to_ascii_lowercase().starts_with("application/json"))
}
