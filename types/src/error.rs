/*!
    Error types shared across the ecosystem.
*/

use thiserror::Error;

use crate::codec::CodecId;

/// Errors produced by the encoding pipeline.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested codec is not available in the codec library.
    #[error("codec {0:?} not found")]
    CodecNotFound(CodecId),

    /// The codec rejected the encoder configuration.
    #[error("could not open codec: {0}")]
    OpenFailed(String),

    /// Encode dimensions must be even and at least 2x2.
    #[error("bad dimensions ({width}, {height}), must be even")]
    InvalidDimensions { width: u32, height: u32 },

    /// The input image uses a pixel layout the converter does not accept.
    #[error("unsupported input format: {0}")]
    UnsupportedFormat(String),

    /// An input buffer is malformed (too small, mismatched dimensions, ...).
    #[error("invalid input: {0}")]
    InvalidData(String),

    /// The codec reported a failure while encoding one frame.
    ///
    /// Non-fatal at the session boundary: the session drops the frame and
    /// stays open.
    #[error("encode failed: {0}")]
    EncodeFailed(String),

    /// The sink accepted fewer bytes than the packet size.
    #[error("short write, expected {expected}, wrote {written}")]
    ShortWrite { expected: usize, written: usize },

    /// `submit` or `finish` was called on a closed session.
    #[error("codec session is closed")]
    SessionClosed,

    /// Draining or stream termination could not be completed.
    #[error("could not finalize stream: {0}")]
    FinalizeFailed(String),

    /// An I/O error from the output sink.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Type alias for results that may return an [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
