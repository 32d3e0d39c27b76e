//! Error types for failure handling across the portal client
//!
//! The taxonomy is intentionally flat, mirroring how the portal surfaces
//! failures to the user: transport problems, backend-reported 4xx messages
//! shown verbatim, opaque 5xx failures, and client-side validation errors
//! that block submission before any request is made. Nothing here is retried
//! automatically; the caller decides whether an operation is re-triggered.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PortalError {
    #[error("Network error: {0}")]
    Transport(String),
    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Server error ({status}): the portal backend failed to process the request")]
    ServerError { status: u16 },
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Parsing error: {0}")]
    Parsing(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Session error: {0}")]
    Session(String),
}

impl PortalError {
    /// True when the failure should force a logout (expired or rejected token).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortalError::Api { status: 401, .. })
    }

    /// Misconfiguration-class failures are eligible for the chat demo fallback.
    pub fn is_config(&self) -> bool {
        matches!(self, PortalError::Config(_))
    }
}

impl From<std::io::Error> for PortalError {
    fn from(err: std::io::Error) -> Self {
        PortalError::Session(err.to_string())
    }
}

impl From<reqwest::Error> for PortalError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            PortalError::Transport(format!("request timed out: {}", err))
        } else {
            PortalError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for PortalError {
    fn from(err: serde_json::Error) -> Self {
        PortalError::Parsing(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_is_only_401() {
        let unauthorized = PortalError::Api {
            status: 401,
            message: "token expired".into(),
        };
        assert!(unauthorized.is_unauthorized());

        let not_found = PortalError::Api {
            status: 404,
            message: "no such vendor".into(),
        };
        assert!(!not_found.is_unauthorized());
        assert!(!PortalError::Transport("refused".into()).is_unauthorized());
    }
}
