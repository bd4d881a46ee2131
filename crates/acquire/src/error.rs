//! Acquisition Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction. Callers only ever see [`ErrorKind::Extraction`] at the
//! top of the tree; the other kinds sit underneath it and say why.

use derive_more::{Display, Error};

/// An acquisition error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for acquisition operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input could not be turned into a content record. Show this to the
    /// editor and let them retry or switch to manual entry.
    #[display("could not automatically process the text")]
    Extraction,
    /// No API key was configured for the summarization service.
    #[display("no API key configured for the summarization service")]
    MissingApiKey,
    /// The service could not be reached.
    #[display("network error while contacting the summarization service")]
    Network,
    /// The service answered with a non-success HTTP status.
    #[display("summarization service responded with HTTP {status}")]
    Service {
        /// HTTP status code.
        status: u16,
        /// Response body, for the logs.
        body: String,
    },
    /// The service answered, but without any text to parse.
    #[display("summarization service reply contained no text")]
    EmptyReply,
    /// The reply text is not the JSON object that was asked for.
    #[display("malformed summarization reply: {_0}")]
    MalformedReply(#[error(not(source))] String),
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network => true,
            Self::Service { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
