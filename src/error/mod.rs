//! Error handling module

use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Unexpected HTTP status {0}")]
    Status(u16),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Login failed: {0}")]
    Login(String),

    #[error("Write rejected: {0}")]
    Rejected(String),

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ClientError {
    /// Symptoms of a missing or expired session token.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ClientError::Unauthorized(_) | ClientError::Login(_))
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        ClientError::Transport(e.to_string())
    }
}
