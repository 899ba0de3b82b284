//! Container-level decompression: header validation, chunk loop, raw
//! passthrough, and test mode.

use std::io::{self, Read, Write};

use crate::container::{split_size_word, Header};
use crate::engine::Decoder;
use crate::io::file_io::engine_error;
use crate::io::prefs::Prefs;

/// Read a chunk size word, distinguishing clean end-of-container (`None`)
/// from a torn word (`UnexpectedEof`).
fn read_size_word(reader: &mut impl Read) -> io::Result<Option<u32>> {
    let mut word = [0u8; 4];
    let mut filled = 0;
    while filled < 4 {
        let n = reader.read(&mut word[filled..])?;
        if n == 0 {
            if filled == 0 {
                return Ok(None);
            }
            return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "unexpected eof"));
        }
        filled += n;
    }
    Ok(Some(u32::from_le_bytes(word)))
}

/// Decompress one container from `reader` into `writer`.
///
/// In test mode (`prefs.test`) every chunk is decoded and discarded, so a
/// corrupt file is still detected without producing output.  Returns
/// `(total_in, total_out)`.
pub fn decompress_stream(
    reader: &mut impl Read,
    writer: &mut impl Write,
    prefs: &Prefs,
) -> io::Result<(u64, u64)> {
    let header = Header::read_from(reader)?;
    let chunk_size = header.chunk_size as usize;

    let decoder = Decoder::new(header.format).map_err(engine_error)?;
    let mut buffer_in = vec![0u8; chunk_size];
    let mut buffer_out = vec![0u8; chunk_size];

    let mut total_in: u64 = 12;
    let mut total_out: u64 = 0;

    while let Some(word) = read_size_word(reader)? {
        total_in += 4;
        let (size_in, raw) = split_size_word(word);
        let size_in = size_in as usize;
        if size_in > chunk_size {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "invalid chunk size"));
        }

        reader.read_exact(&mut buffer_in[..size_in])?;
        total_in += size_in as u64;

        let output: &[u8] = if raw {
            &buffer_in[..size_in]
        } else {
            let size_out = decoder
                .decode(&buffer_in[..size_in], &mut buffer_out)
                .map_err(engine_error)?;
            &buffer_out[..size_out]
        };

        if !prefs.test {
            writer.write_all(output)?;
        }
        total_out += output.len() as u64;
    }

    if !prefs.test {
        writer.flush()?;
    }
    Ok((total_in, total_out))
}
