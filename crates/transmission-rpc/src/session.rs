//! Session token negotiation.
//!
//! The daemon rejects requests without a valid `X-Transmission-Session-Id` header with a
//! 409 response that carries the token to use. [`SessionNegotiator`] holds that token and
//! attaches it to outgoing requests.

use http::{HeaderName, HeaderValue, Request, Response};
use tracing::debug;
use transmission_rpc_types::TransmissionError;

/// Header carrying the session token in both directions.
pub static SESSION_ID_HEADER: HeaderName = HeaderName::from_static("x-transmission-session-id");

/// Negotiation state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
    /// No token held yet.
    #[default]
    Unauthenticated,
    /// Holding the token most recently issued by the daemon.
    Authenticated(HeaderValue),
}

/// Owns the session token of one client.
#[derive(Debug, Default)]
pub struct SessionNegotiator {
    state: SessionState,
}

impl SessionNegotiator {
    /// A negotiator holding no token.
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(missing_docs)]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// The token currently held, if any.
    pub fn token(&self) -> Option<&str> {
        match &self.state {
            SessionState::Authenticated(token) => token.to_str().ok(),
            SessionState::Unauthenticated => None,
        }
    }

    /// Replaces the held token. A blank token resets the negotiator.
    pub fn set_token(&mut self, token: &str) -> Result<(), TransmissionError> {
        if token.trim().is_empty() {
            self.clear();
            return Ok(());
        }
        let token = HeaderValue::from_str(token.trim())
            .map_err(|e| TransmissionError::InvalidArgument(format!("invalid session token: {e}")))?;
        self.state = SessionState::Authenticated(token);
        Ok(())
    }

    /// Forgets the held token.
    pub fn clear(&mut self) {
        self.state = SessionState::Unauthenticated;
    }

    /// Attaches the held token to `request`; requests pass unchanged when no token is held.
    pub fn decorate<B>(&self, mut request: Request<B>) -> Request<B> {
        if let SessionState::Authenticated(token) = &self.state {
            request
                .headers_mut()
                .insert(SESSION_ID_HEADER.clone(), token.clone());
        }
        request
    }

    /// Takes the token offered by a 409 response.
    ///
    /// Fails with [`TransmissionError::Protocol`] when the response carries no token. The
    /// held token, if any, is kept in that case.
    pub fn on_conflict<B>(&mut self, response: &Response<B>) -> Result<(), TransmissionError> {
        let token = response
            .headers()
            .get(&SESSION_ID_HEADER)
            .filter(|value| !value.as_bytes().trim_ascii().is_empty())
            .ok_or_else(|| {
                TransmissionError::Protocol("Unable to retrieve X-Transmission-Session-Id".into())
            })?;

        debug!(
            rotated = matches!(self.state, SessionState::Authenticated(_)),
            "Received session token from daemon"
        );
        self.state = SessionState::Authenticated(token.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conflict(token: Option<&str>) -> Response<()> {
        let mut builder = Response::builder().status(409);
        if let Some(token) = token {
            builder = builder.header(&SESSION_ID_HEADER, token);
        }
        builder.body(()).unwrap()
    }

    fn request() -> Request<()> {
        Request::builder().uri("http://localhost/").body(()).unwrap()
    }

    #[test]
    fn test_conflict_authenticates() {
        let mut session = SessionNegotiator::new();
        assert_eq!(session.state(), &SessionState::Unauthenticated);

        session.on_conflict(&conflict(Some("token-1"))).unwrap();
        assert_eq!(session.token(), Some("token-1"));

        session.on_conflict(&conflict(Some("token-2"))).unwrap();
        assert_eq!(session.token(), Some("token-2"));
    }

    #[test]
    fn test_conflict_without_token_fails() {
        let mut session = SessionNegotiator::new();

        let err = session.on_conflict(&conflict(None)).unwrap_err();
        assert!(matches!(err, TransmissionError::Protocol(_)));

        let err = session.on_conflict(&conflict(Some(" "))).unwrap_err();
        assert!(matches!(err, TransmissionError::Protocol(_)));
        assert_eq!(session.state(), &SessionState::Unauthenticated);
    }

    #[test]
    fn test_failed_rotation_keeps_token() {
        let mut session = SessionNegotiator::new();
        session.set_token("kept").unwrap();

        assert!(session.on_conflict(&conflict(None)).is_err());
        assert_eq!(session.token(), Some("kept"));
    }

    #[test]
    fn test_decorate() {
        let mut session = SessionNegotiator::new();
        let plain = session.decorate(request());
        assert!(plain.headers().get(&SESSION_ID_HEADER).is_none());

        session.set_token("abc").unwrap();
        let decorated = session.decorate(request());
        assert_eq!(decorated.headers()[&SESSION_ID_HEADER], "abc");
    }

    #[test]
    fn test_set_token() {
        let mut session = SessionNegotiator::new();
        session.set_token("abc").unwrap();
        assert_eq!(session.token(), Some("abc"));

        session.set_token("").unwrap();
        assert_eq!(session.token(), None);

        let err = session.set_token("bad\ntoken").unwrap_err();
        assert!(matches!(err, TransmissionError::InvalidArgument(_)));
    }
}
