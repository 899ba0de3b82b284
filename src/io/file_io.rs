//! File-level I/O primitives: stdin/stdout sentinels, short-read-tolerant
//! reads, output-name derivation, and destination-open policy.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read};
use std::path::Path;

use filetime::FileTime;

use crate::container::SUFFIX;
use crate::engine::LzmError;

/// Path argument naming standard input / standard output.
pub const STDIO_MARK: &str = "-";

/// Convert an engine error into an errno-carrying `io::Error`, so exit codes
/// and `strerror`-style messages fall out of the standard machinery.
pub fn engine_error(e: LzmError) -> io::Error {
    io::Error::from_raw_os_error(e.errno())
}

/// errno-style exit code for an `io::Error` (1 when none applies).
pub fn exit_code(e: &io::Error) -> i32 {
    if let Some(code) = e.raw_os_error() {
        return code;
    }
    match e.kind() {
        io::ErrorKind::NotFound => libc::ENOENT,
        io::ErrorKind::AlreadyExists => libc::EEXIST,
        io::ErrorKind::InvalidData => libc::EINVAL,
        io::ErrorKind::InvalidInput => libc::EINVAL,
        io::ErrorKind::UnexpectedEof => libc::EIO,
        _ => 1,
    }
}

/// Read until `buf` is full or the reader reports end of input; returns the
/// number of bytes read.
pub fn read_fill(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}

/// Derive the output filename: append [`SUFFIX`] when compressing, strip it
/// when decompressing.  A decompression input without the suffix is an
/// `InvalidInput` error.
pub fn output_filename(input: &str, compress: bool) -> io::Result<String> {
    if compress {
        return Ok(format!("{input}{SUFFIX}"));
    }
    match input.strip_suffix(SUFFIX) {
        Some(base) if !base.is_empty() => Ok(base.to_owned()),
        _ => Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{input}: unknown file type"),
        )),
    }
}

/// Open `path` for writing.  An existing file is removed first when
/// `clobber` is set and refused otherwise.
pub fn open_dst_file(path: &str, clobber: bool) -> io::Result<File> {
    if Path::new(path).exists() {
        if !clobber {
            return Err(io::Error::new(
                io::ErrorKind::AlreadyExists,
                format!("{path}: not overwriting existing file"),
            ));
        }
        fs::remove_file(path)?;
    }
    OpenOptions::new().write(true).create_new(true).open(path)
}

/// Carry the source file's modification time over to the output file.
pub fn transfer_times(src: &fs::Metadata, dst_path: &str) -> io::Result<()> {
    let mtime = FileTime::from_last_modification_time(src);
    filetime::set_file_mtime(dst_path, mtime)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_filename_appends_suffix() {
        assert_eq!(output_filename("data.bin", true).unwrap(), "data.bin.lzm");
    }

    #[test]
    fn output_filename_strips_suffix() {
        assert_eq!(output_filename("data.bin.lzm", false).unwrap(), "data.bin");
    }

    #[test]
    fn output_filename_rejects_foreign_suffix() {
        assert!(output_filename("data.bin", false).is_err());
        assert!(output_filename(".lzm", false).is_err());
    }

    #[test]
    fn read_fill_stops_at_eof() {
        let data = [1u8, 2, 3];
        let mut buf = [0u8; 8];
        let n = read_fill(&mut &data[..], &mut buf).unwrap();
        assert_eq!(n, 3);
        assert_eq!(&buf[..3], &data);
    }

    #[test]
    fn open_dst_refuses_existing_without_clobber() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("out");
        fs::write(&path, b"x").unwrap();
        let path = path.to_str().unwrap();
        let err = open_dst_file(path, false).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::AlreadyExists);
        assert!(open_dst_file(path, true).is_ok());
    }
}
