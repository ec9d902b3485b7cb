use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Authentication(String),

    /// The remote service answered with an error document for this query.
    #[error("{query} query failed: {message}")]
    RemoteQuery { query: String, message: String },

    /// A document was fetched but did not have the expected shape.
    #[error("Unexpected {document} document: {reason}")]
    Decode { document: String, reason: String },

    /// The fetcher holds no slot with this name.
    #[error("No document was fetched for '{0}'")]
    MissingDocument(String),

    #[error("No records to aggregate")]
    EmptyAggregateInput,

    #[error("Efficiency fetch for node {serial} failed: {message}")]
    NodeFetch { serial: String, message: String },

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status error: {0}")]
    HttpStatus(String),

    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Task join error: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    pub fn remote_query(query: impl Into<String>, message: impl Into<String>) -> Self {
        Error::RemoteQuery {
            query: query.into(),
            message: message.into(),
        }
    }

    pub fn decode(document: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Decode {
            document: document.into(),
            reason: reason.into(),
        }
    }

    /// Whether this error came from the remote side of a single fetch, as
    /// opposed to a local failure.
    pub fn is_fetch_failure(&self) -> bool {
        matches!(
            self,
            Error::RemoteQuery { .. }
                | Error::Timeout(_)
                | Error::HttpStatus(_)
                | Error::Request(_)
                | Error::Decode { .. }
                | Error::NodeFetch { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_query_display() {
        let err = Error::remote_query("inventory", "Invalid customer id");
        assert_eq!(err.to_string(), "inventory query failed: Invalid customer id");
        assert!(err.is_fetch_failure());
    }

    #[test]
    fn test_empty_aggregate_is_not_fetch_failure() {
        assert!(!Error::EmptyAggregateInput.is_fetch_failure());
        assert!(!Error::Config("bad".into()).is_fetch_failure());
    }

    #[test]
    fn test_from_serde_error() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{not json")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
