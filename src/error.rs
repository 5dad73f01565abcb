//! Error types for the WebSocket session layer.

use thiserror::Error;

/// Result type alias for WebSocket operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during WebSocket operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// The transport reported EOF or was shut down.
    #[error("Connection closed")]
    ConnectionClosed,

    /// I/O error from the underlying transport.
    #[error("I/O error: {0}")]
    Io(String),

    /// Not enough buffered data to decode the next frame.
    ///
    /// This is backpressure for the codec's read loop, not a failure: the
    /// caller refills the buffer and retries.
    #[error("Incomplete frame: need {needed} more bytes")]
    IncompleteFrame {
        /// Number of additional bytes needed.
        needed: usize,
    },

    /// Opcode value outside the assigned range.
    #[error("Invalid opcode: {0:#x}")]
    InvalidOpcode(u8),

    /// Legacy frame with a prefix byte above 0x7F (the binary-length form
    /// that never shipped in any browser).
    #[error("Unsupported legacy frame type: {0:#x}")]
    UnsupportedLegacyFrame(u8),

    /// Operation that the Hixie protocol variants cannot express.
    #[error("{0} is not supported by the Hixie protocol variants")]
    LegacyUnsupported(&'static str),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err.to_string())
    }
}
