//! Error types shared by the client and the flows.

use crate::models::Field;
use thiserror::Error;

/// Failure of a single round trip to the credential server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (refused, DNS, timeout).
    #[error("{0}")]
    Transport(String),
    /// The server answered with an unexpected status.
    #[error("Status: {status}\nResponse: {body}")]
    Server { status: u16, body: String },
    /// The body was not JSON of the expected shape.
    #[error("{0}")]
    Parse(String),
}

impl ClientError {
    /// Dialog title used when the error is shown to the user.
    pub fn title(&self) -> &'static str {
        match self {
            ClientError::Transport(_) => "Network Error",
            ClientError::Server { .. } => "Server Error",
            ClientError::Parse(_) => "Parse Error",
        }
    }
}

/// Local input error raised before any request is issued.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct ValidationError {
    pub field: Field,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: Field, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_error_shows_status_and_body() {
        let err = ClientError::Server {
            status: 409,
            body: "Site already exists. Use PUT to update.".into(),
        };
        assert_eq!(err.title(), "Server Error");
        assert_eq!(
            err.to_string(),
            "Status: 409\nResponse: Site already exists. Use PUT to update."
        );
    }

    #[test]
    fn titles_follow_error_kind() {
        assert_eq!(ClientError::Transport("refused".into()).title(), "Network Error");
        assert_eq!(ClientError::Parse("bad".into()).title(), "Parse Error");
    }
}
