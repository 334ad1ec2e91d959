use thiserror::Error;

/// Errors produced while demultiplexing a transport stream.
#[derive(Error, Debug)]
pub enum DemuxError {
    /// Underlying reader or sink failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A parse routine was handed a buffer it cannot work with.
    #[error("parser error: {0}")]
    Parser(String),

    /// Field content violates the transport stream syntax.
    #[error("invalid data: {0}")]
    InvalidData(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DemuxError>;
