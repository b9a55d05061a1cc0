//! Error types for `VectorFlow` operations.
//!
//! Every fallible operation returns [`Result`]. Backend failures are surfaced
//! unchanged to the caller of the triggering operation; there is no retry
//! policy anywhere in this workspace, so each variant describes the failure of
//! a single call.

use thiserror::Error;

/// Result type alias for `VectorFlow` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by `VectorFlow` crates.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    /// Input validation error.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP transport error (request never completed).
    #[error("HTTP error: {0}")]
    Http(String),

    /// Error response from a backend service.
    #[error("API error: {0}")]
    Api(String),

    /// Backend response did not match the expected format.
    #[error("API format error: {0}")]
    ApiFormat(String),

    /// Operation not supported by this implementation.
    #[error("Not implemented: {0}")]
    NotImplemented(String),

    /// Generic error.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an HTTP error
    pub fn http<S: Into<String>>(msg: S) -> Self {
        Self::Http(msg.into())
    }

    /// Create an API error
    pub fn api<S: Into<String>>(msg: S) -> Self {
        Self::Api(msg.into())
    }

    /// Create an API format error
    pub fn api_format<S: Into<String>>(msg: S) -> Self {
        Self::ApiFormat(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        Self::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_constructors() {
        let err = Error::api("test error");
        assert!(matches!(err, Error::Api(_)));

        let err = Error::invalid_input("bad input");
        assert!(matches!(err, Error::InvalidInput(_)));

        let err = Error::config("missing host");
        assert!(matches!(err, Error::Configuration(_)));
    }

    #[test]
    fn test_error_display() {
        let err = Error::api("test");
        assert_eq!(err.to_string(), "API error: test");

        let err = Error::invalid_input("invalid");
        assert_eq!(err.to_string(), "Invalid input: invalid");

        let err = Error::http("connection refused");
        assert_eq!(err.to_string(), "HTTP error: connection refused");
    }

    #[test]
    fn test_serde_error_conversion() {
        let serde_err = serde_json::from_str::<serde_json::Value>("not json")
            .err()
            .map(Error::from);
        assert!(matches!(serde_err, Some(Error::Serialization(_))));
    }
}
