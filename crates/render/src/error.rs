//! Render Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};
use instanews_layout::Size;

/// A render error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for render operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("chrome/chromium not detected on your system")]
    ChromeNotFound,
    /// Chrome exited with a non-zero exit code.
    /// If the exit code is zero, then Chrome exited cleanly without writing a screenshot.
    #[display("Chrome exited with code: {_0}")]
    ChromeFailed(#[error(not(source))] i32),
    /// The requested raster size does not match the composition, or the image produced does not match the request.
    #[display("expected a {expected} image, got {actual}")]
    Geometry { expected: Size, actual: Size },
    /// Chrome produced something that is not a readable PNG.
    #[display("rendered screenshot is not a valid PNG")]
    InvalidImage,
    /// Asset was not loadable (either file or builtin).
    #[display("asset not found: {_0}")]
    AssetNotFound(#[error(not(source))] String),
    /// The card template failed to compile or render.
    #[display("could not render card document")]
    Template,
    Io,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ChromeFailed(_))
    }
}
