//! The memory-to-memory codec engine.
//!
//! Input is processed in independent chunks of at most [`CHUNK_MAX`] bytes,
//! each compressed into a self-contained token stream that can be decoded
//! without reference to any other chunk.  The engine performs no I/O and
//! never blocks; callers arrange buffers and framing.

pub mod decode;
pub mod encode;
pub mod error;
pub mod matchlen;
pub mod mem;
pub mod table;
pub mod token;

/// Largest chunk the engine accepts (4 MiB).
pub const CHUNK_MAX: usize = 4 << 20;

pub use decode::Decoder;
pub use encode::{
    compressed_size, Encoder, FORMAT_1, LEVEL_COUNT, LEVEL_DEFAULT, LEVEL_FAST, LEVEL_NONE,
};
pub use error::LzmError;
pub use token::{MAX_OFFSET, MIN_MATCH};
