//! Error types shared by the gist storage implementation.

use reqwest::StatusCode;
use thiserror::Error;

/// Convenient result alias returning [`GistDaoError`] failures.
pub type GistResult<T> = Result<T, GistDaoError>;

/// Failures that can occur while talking to the GitHub gist API.
#[derive(Debug, Error)]
pub enum GistDaoError {
    /// Required environment variable is missing.
    #[error("missing gist environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build gist client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// A request could not be sent.
    #[error("failed to send gist request to `{url}`")]
    RequestSend {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The API answered with an unexpected status code.
    #[error("unexpected gist response status {status} for `{url}`")]
    RequestStatus { url: String, status: StatusCode },
    /// Response payload could not be decoded.
    #[error("failed to decode gist response from `{url}`")]
    DecodeResponse {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    /// The gist file does not contain a valid league document.
    #[error("gist file `{file}` does not hold a valid league document")]
    DeserializeDocument {
        file: String,
        #[source]
        source: serde_json::Error,
    },
    /// The league document could not be encoded.
    #[error("failed to encode league document")]
    SerializeDocument {
        #[source]
        source: serde_json::Error,
    },
    /// The file is truncated and carries no raw URL to fetch it from.
    #[error("gist file `{file}` is truncated and has no raw URL")]
    TruncatedFile { file: String },
}
