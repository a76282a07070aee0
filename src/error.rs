use std::path::PathBuf;

use thiserror::Error;

/// Boxed failure raised by an [`crate::HttpExchange`] implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by REST client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The exchange completed without an interpretable response.
    #[error("no response received")]
    MissingResponse,

    /// Reserved for a response payload of an unexpected type.
    #[error("unexpected return data type")]
    ReturnDataType,

    /// The underlying HTTP exchange failed (connectivity, TLS, ...).
    #[error("service error: {0}")]
    ServiceError(#[source] BoxError),

    /// Status code in the failure band (300..600) with the response text.
    ///
    /// `body` is empty when the response was not valid UTF-8.
    #[error("server returned status {status}: {body}")]
    StatusCode { status: u16, body: String },

    /// Reserved for a successful response that carried no body.
    #[error("no data in response")]
    NoData,

    /// Response body could not be decoded into the endpoint output type.
    #[error("failed to decode response: {0}")]
    Deserialization(#[source] serde_json::Error),

    /// Request payload could not be encoded as JSON.
    #[error("failed to encode request payload: {0}")]
    Serialization(#[source] serde_json::Error),

    /// Base URL is not a valid absolute URL.
    #[error("invalid base URL '{0}'")]
    InvalidBaseUrl(String),

    /// A request URL could not be parsed.
    #[error("invalid URL '{0}'")]
    InvalidUrl(String),

    /// The file given for upload could not be read.
    #[error("failed to read '{}': {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
