//! Engine error taxonomy.

use thiserror::Error;

/// Errors surfaced by the codec engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LzmError {
    /// Unsupported format or level, or inconsistent parameters.
    #[error("invalid argument")]
    InvalidArgument,
    /// The output buffer cannot hold the result.  Recoverable: the encoder
    /// retries at the literals-only level, and the framing layer may store
    /// the chunk raw.
    #[error("output buffer too small")]
    OutputTooSmall,
    /// The compressed stream is corrupt or truncated.  Fatal for the chunk.
    #[error("malformed compressed stream")]
    MalformedInput,
    /// Table allocation failed.
    #[error("out of memory")]
    OutOfMemory,
}

impl LzmError {
    /// errno-style code used for process exit statuses.
    pub fn errno(self) -> i32 {
        match self {
            LzmError::InvalidArgument => libc::EINVAL,
            LzmError::OutputTooSmall => libc::EOVERFLOW,
            LzmError::MalformedInput => libc::EIO,
            LzmError::OutOfMemory => libc::ENOMEM,
        }
    }
}
