//! Error types for recall-core

use thiserror::Error;

use crate::models::RecordKind;

/// Result type alias using recall-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Message fragments that identify a connection-level failure regardless of
/// which layer produced the error.
const NETWORK_MARKERS: &[&str] = &[
    "connection refused",
    "econnrefused",
    "connection reset",
    "econnreset",
    "timed out",
    "timeout",
    "failed to fetch",
    "network",
    "dns error",
    "unreachable",
    "error sending request",
];

/// Errors that can occur in recall-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Remote store could not be reached
    #[error("Network error: {0}")]
    Network(String),

    /// Record not found
    #[error("Record not found: {0}")]
    NotFound(String),

    /// Malformed record
    #[error("Validation error: {0}")]
    Validation(String),

    /// A remote write succeeded but the local cache could not be brought in line
    #[error("Local cache diverged from remote for {kind}/{id}: {reason}")]
    Divergence {
        kind: RecordKind,
        id: String,
        reason: String,
    },

    /// Remote store answered with a non-success status
    #[error("Remote error ({status}): {message}")]
    Remote { status: u16, message: String },

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Whether this failure is a transient connection problem worth retrying.
    pub fn is_network(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::NotFound(_)
            | Self::Validation(_)
            | Self::Divergence { .. }
            | Self::Config(_)
            | Self::InvalidInput(_)
            | Self::Serialization(_) => false,
            Self::Remote { message, .. } => has_network_marker(message),
            Self::Database(message) => has_network_marker(message),
            Self::LibSql(error) => has_network_marker(&error.to_string()),
            Self::Io(error) => matches!(
                error.kind(),
                std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::TimedOut
            ),
        }
    }

    /// Text suitable for showing to a user next to a retry affordance.
    pub fn user_message(&self) -> String {
        if self.is_network() {
            return "Could not reach the server. Check your connection and retry.".to_string();
        }
        match self {
            Self::Validation(message) => format!("This record is invalid: {message}"),
            Self::Divergence { .. } => {
                "Saved to the server, but this device has not caught up yet. It will refresh on the next sync."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_connect() || error.is_timeout() || error.is_request() {
            return Self::Network(error.to_string());
        }
        if error.is_decode() {
            return Self::Validation(error.to_string());
        }
        match error.status() {
            Some(status) => Self::Remote {
                status: status.as_u16(),
                message: error.to_string(),
            },
            None if has_network_marker(&error.to_string()) => Self::Network(error.to_string()),
            None => Self::Remote {
                status: 0,
                message: error.to_string(),
            },
        }
    }
}

fn has_network_marker(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    NETWORK_MARKERS.iter().any(|marker| message.contains(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_variant_is_network() {
        assert!(Error::Network("boom".to_string()).is_network());
    }

    #[test]
    fn remote_error_with_connection_message_is_network() {
        let error = Error::Remote {
            status: 0,
            message: "connect ECONNREFUSED 127.0.0.1:8080".to_string(),
        };
        assert!(error.is_network());

        let error = Error::Remote {
            status: 500,
            message: "internal server error".to_string(),
        };
        assert!(!error.is_network());
    }

    #[test]
    fn validation_and_not_found_are_never_network() {
        assert!(!Error::Validation("network field missing".to_string()).is_network());
        assert!(!Error::NotFound("timeout-goal".to_string()).is_network());
    }

    #[test]
    fn io_connection_refused_is_network() {
        let error = Error::Io(std::io::Error::from(std::io::ErrorKind::ConnectionRefused));
        assert!(error.is_network());
        let error = Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(!error.is_network());
    }

    #[test]
    fn user_message_for_network_asks_to_retry() {
        let message = Error::Network("connection refused".to_string()).user_message();
        assert!(message.contains("retry"));
    }
}
