//! CLI Error Types

use derive_more::{Display, Error};

/// A CLI error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    #[display("could not load configuration")]
    Config,
    /// Neither input text nor `--manual` was given, or stdin could not be read.
    #[display("no usable input: pass a link or text, `-` for stdin, or --manual")]
    Input,
    #[display("could not set up the summarization client")]
    Client,
    #[display("could not prepare the post")]
    Session,
    #[display("could not write output")]
    Output,
}
