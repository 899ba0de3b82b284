//! LZM: a chunk-oriented LZ77 byte-stream codec with a file container and
//! CLI tool.
//!
//! The [`engine`] module holds the memory-to-memory codec; [`container`] the
//! on-disk framing; [`io`] the file-level compress/decompress plumbing used
//! by the `lzm` binary; [`bench`] the in-process benchmark behind `-b`; and
//! [`lzdata`] the reproducible compressible-data generator shared by the
//! `lzdata` binary and the test suite.

pub mod bench;
pub mod cli;
pub mod container;
pub mod engine;
pub mod io;
pub mod lzdata;
pub mod util;

pub use engine::{
    compressed_size, Decoder, Encoder, LzmError, CHUNK_MAX, FORMAT_1, LEVEL_COUNT, LEVEL_DEFAULT,
    LEVEL_FAST, LEVEL_NONE,
};

pub const VERSION_STRING: &str = env!("CARGO_PKG_VERSION");
