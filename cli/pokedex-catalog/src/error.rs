//! Error handling for pokedex service operations.

use reqwest::StatusCode;
use thiserror::Error;

/// Common error type for pokedex service operations.
#[derive(Debug, Error)]
pub enum ClientError {
    /// An authenticated endpoint was called without a bearer token.
    ///
    /// Raised before any request is sent.
    #[error("Missing authentication token")]
    MissingToken,

    /// The service answered with a non-2xx status.
    ///
    /// `message` is the `message` field of the JSON error body if there was
    /// one, otherwise a generic description of the status.
    #[error("{message}")]
    Request { status: StatusCode, message: String },

    /// A 2xx response whose body is not the expected JSON document.
    #[error("failed to parse response")]
    Decode(#[source] serde_json::Error),

    /// The endpoint answered `204 No Content` where a document is required.
    #[error("service returned no content")]
    EmptyResponse,

    /// The request could not be sent or its response could not be read.
    ///
    /// The message carries the whole cause chain, e.g. the refused
    /// connection behind reqwest's "error sending request".
    #[error("request failed: {}", cause_chain(.0))]
    Transport(reqwest::Error),

    #[error("invalid service url '{0}'")]
    InvalidUrl(String),

    #[error("{0}")]
    Other(String),
}

impl ClientError {
    /// Build the error for a non-2xx `status`, preferring the message the
    /// service sent along.
    pub fn request(status: StatusCode, message: Option<String>) -> Self {
        let message = message
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        ClientError::Request { status, message }
    }

    /// The HTTP status if the service answered with an error response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Request { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }
}

/// `err` followed by each of its sources, separated by `: `.
fn cause_chain(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
