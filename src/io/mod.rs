//! File and stream I/O for the `lzm` tool.

pub mod compress;
pub mod decompress;
pub mod file_io;
pub mod prefs;

pub use compress::compress_stream;
pub use decompress::decompress_stream;
pub use file_io::{
    engine_error, exit_code, open_dst_file, output_filename, read_fill, transfer_times,
    STDIO_MARK,
};
pub use prefs::{notification_level, set_notification_level, Prefs, BENCH_TESTS_DEFAULT};
