//! Error types shared by the REST store implementation.

use reqwest::StatusCode;
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`PostgrestDaoError`] failures.
pub type PostgrestResult<T> = Result<T, PostgrestDaoError>;

/// Failures that can occur while talking to the REST facade of the store.
#[derive(Debug, Error)]
pub enum PostgrestDaoError {
    /// Required environment variable is missing.
    #[error("missing store environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build store HTTP client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request to a table endpoint could not be sent.
    #[error("failed to send store request to `{path}`")]
    RequestSend {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    /// The store returned an unexpected status code for a table endpoint.
    #[error("unexpected store response status {status} for `{path}`")]
    RequestStatus { path: String, status: StatusCode },
    /// Response payload could not be decoded into the expected rows.
    #[error("failed to decode store response for `{path}`")]
    DecodeResponse {
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

impl From<PostgrestDaoError> for StorageError {
    fn from(err: PostgrestDaoError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
