// Error handling module
// Defines the error taxonomy surfaced by the session, token and attach layers

use thiserror::Error;

/// Errors returned by the client core
#[derive(Error, Debug)]
pub enum ClientError {
    /// Malformed connection parameters or transport setup
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or timeout while talking to the engine
    #[error("Transport error during {operation}: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// Token endpoint rejected the request or returned an unreadable body
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Attach endpoint rejected the request or returned an unreadable body
    #[error("Attach failed: {0}")]
    Attach(String),
}

impl ClientError {
    pub fn transport(operation: &'static str, source: reqwest::Error) -> Self {
        ClientError::Transport { operation, source }
    }

    /// Timeouts and connect failures may succeed when the caller tries again.
    pub fn is_retryable(&self) -> bool {
        match self {
            ClientError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            _ => false,
        }
    }

    /// Short label used for metric reasons and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            ClientError::Config(_) => "config",
            ClientError::Transport { .. } => "transport",
            ClientError::Auth(_) => "auth",
            ClientError::Attach(_) => "attach",
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ClientError::Auth("HTTP 401 Unauthorized".to_string());
        assert_eq!(err.to_string(), "Authentication failed: HTTP 401 Unauthorized");

        let err = ClientError::Attach("invalid JSON body".to_string());
        assert_eq!(err.to_string(), "Attach failed: invalid JSON body");

        let err = ClientError::Config("connection.url must not be empty".to_string());
        assert_eq!(err.to_string(), "Configuration error: connection.url must not be empty");
    }

    #[test]
    fn test_non_transport_errors_are_not_retryable() {
        assert!(!ClientError::Auth("x".into()).is_retryable());
        assert!(!ClientError::Attach("x".into()).is_retryable());
        assert!(!ClientError::Config("x".into()).is_retryable());
    }

    #[test]
    fn test_error_kinds() {
        assert_eq!(ClientError::Auth("x".into()).kind(), "auth");
        assert_eq!(ClientError::Attach("x".into()).kind(), "attach");
        assert_eq!(ClientError::Config("x".into()).kind(), "config");
    }
}
