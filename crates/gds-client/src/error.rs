//! Error types for gds-client.

use thiserror::Error;

/// Client error types.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transport-level failure while talking to the database.
    #[error("Connection error: {0}")]
    Connection(String),

    /// The server rejected a statement.
    #[error("Query failed with {code}: {message}")]
    Query {
        /// Server status code, e.g. `Neo.ClientError.Statement.SyntaxError`.
        code: String,
        /// Server message.
        message: String,
    },

    /// The server does not know the called procedure.
    #[error("There is no procedure with the name `{endpoint}` on the server. {hint}")]
    UnknownEndpoint {
        /// Fully qualified procedure name.
        endpoint: String,
        /// Hint about the likely cause.
        hint: String,
    },

    /// The endpoint is not available on the connected GDS version.
    #[error("The endpoint '{endpoint}' is not supported on GDS {server_version}, it requires {requirement}")]
    IncompatibleServerVersion {
        /// Fully qualified procedure name.
        endpoint: String,
        /// Version reported by the server.
        server_version: String,
        /// Human readable version requirement.
        requirement: String,
    },

    /// Client-side argument validation failed.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The server result did not have the expected shape.
    #[error("Unexpected result: {0}")]
    UnexpectedResult(String),

    /// No projected graph with the given name.
    #[error("No projected graph named '{graph_name}' exists in current database '{database}'")]
    GraphNotFound {
        /// Graph name.
        graph_name: String,
        /// Database the lookup ran against.
        database: String,
    },

    /// No trained model with the given name.
    #[error("No model named '{0}' exists")]
    ModelNotFound(String),

    /// Aura API responded with an error status.
    #[error("Aura API error ({status}): {message}")]
    Aura {
        /// HTTP status code.
        status: u16,
        /// Response body.
        message: String,
    },

    /// Authentication error.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// GDS session lifecycle error.
    #[error("Session error: {0}")]
    Session(String),

    /// OGB dataset files missing or malformed.
    #[error("Dataset error: {0}")]
    Dataset(String),

    /// Operation not available for the current setup.
    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV parsing error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration extraction error.
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

impl Error {
    /// Returns `true` if the server reported the procedure as unknown.
    #[must_use]
    pub fn is_unknown_endpoint(&self) -> bool {
        matches!(self, Self::UnknownEndpoint { .. })
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Config("missing password".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing password");
    }

    #[test]
    fn test_incompatible_version_display() {
        let err = Error::IncompatibleServerVersion {
            endpoint: "gds.graph.sample.cnarw".to_string(),
            server_version: "2.3.0".to_string(),
            requirement: "GDS >= 2.4.0".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "The endpoint 'gds.graph.sample.cnarw' is not supported on GDS 2.3.0, it requires GDS >= 2.4.0"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_is_unknown_endpoint() {
        let err = Error::UnknownEndpoint {
            endpoint: "gds.nope".to_string(),
            hint: String::new(),
        };
        assert!(err.is_unknown_endpoint());
        assert!(!Error::Session("x".to_string()).is_unknown_endpoint());
    }
}
