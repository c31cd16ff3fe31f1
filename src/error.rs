//! Error types for NHN Cloud API operations
//!
//! All fallible operations in this crate return [`Error`]. Transport
//! failures are surfaced unchanged from reqwest; everything else carries
//! enough context to identify the offending request or payload.

use reqwest::StatusCode;

/// Error returned by NHN Cloud API operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection or protocol failure in the HTTP transport
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a status code outside the allowed set
    #[error("unexpected status {status} from {method} {url}")]
    UnexpectedStatus {
        method: &'static str,
        url: String,
        status: StatusCode,
        /// Raw response body, truncated for display elsewhere
        body: String,
    },

    /// A response payload could not be decoded, even permissively
    #[error("failed to decode {context}: {reason}")]
    Decode {
        /// What was being decoded, e.g. `"routingtable"`
        context: &'static str,
        reason: String,
    },

    /// A timestamp string matched none of the known API formats
    #[error("unable to parse time {value:?} with any known format: {source}")]
    TimestampParse {
        value: String,
        source: chrono::ParseError,
    },
}

impl Error {
    /// HTTP status of the failed request, if this error carries one.
    ///
    /// Lets callers branch on specific codes:
    ///
    /// ```ignore
    /// match routing_tables::get(&client, id).await {
    ///     Err(e) if e.status() == Some(StatusCode::NOT_FOUND) => handle_missing(),
    ///     other => other?,
    /// }
    /// ```
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::UnexpectedStatus { status, .. } => Some(*status),
            Error::Transport(e) => e.status(),
            _ => None,
        }
    }

    pub(crate) fn decode(context: &'static str, reason: impl Into<String>) -> Self {
        Error::Decode {
            context,
            reason: reason.into(),
        }
    }
}

/// Convenience alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
