//! Error types for the vertex transcoder.

use thiserror::Error;

/// Result type alias using [`TranscodeError`].
pub type Result<T> = std::result::Result<T, TranscodeError>;

/// Main error type for vertex-attribute transcoding operations.
#[derive(Error, Debug)]
pub enum TranscodeError {
    /// A channel descriptor carries an element format value outside the
    /// closed set the transcoder understands.
    #[error("unsupported element format code: {0}")]
    UnsupportedFormat(u8),

    /// Source data violates an invariant the transcoder relies on (e.g. a
    /// payload shorter than the sum of stream sizes, or a channel referencing
    /// a stream index beyond the stream array).
    #[error("malformed source data: {0}")]
    MalformedSource(String),

    /// The requested target era cannot represent a source feature with no
    /// fallback available.
    #[error("unsupported downgrade: {0}")]
    UnsupportedDowngrade(String),

    /// An engine version token could not be parsed.
    #[error("invalid engine version: {0}")]
    InvalidVersion(String),
}
