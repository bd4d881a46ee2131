//! Session Error Types

use derive_more::{Display, Error};

/// A session error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for session operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// An acquisition is already in flight; wait for it or start a new post.
    #[display("a post is already being generated")]
    Busy,
    /// The summarization service could not produce a post. Nothing was changed.
    #[display("could not generate the post")]
    Acquisition,
    /// The selected file cannot be used as an image. Nothing was changed.
    #[display("could not use the selected image")]
    Upload,
    /// The card could not be rasterized or saved. No file was written.
    #[display("could not export the post")]
    Export,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Busy | Self::Acquisition | Self::Export)
    }
}
