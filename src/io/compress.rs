//! Container-level compression: header, chunk loop, raw-chunk fallback.

use std::io::{self, Read, Write};

use crate::container::{size_word, Header};
use crate::engine::{Encoder, LzmError};
use crate::io::file_io::{engine_error, read_fill};
use crate::io::prefs::Prefs;

/// Compress everything from `reader` into `writer` as one container.
///
/// Each chunk is encoded into a buffer of the chunk size; when the encoder
/// cannot fit the result (incompressible data), the chunk is stored raw with
/// the flag bit set in its size word.  Returns `(total_in, total_out)`.
pub fn compress_stream(
    reader: &mut impl Read,
    writer: &mut impl Write,
    prefs: &Prefs,
) -> io::Result<(u64, u64)> {
    let chunk_size = prefs.chunk_size as usize;
    let mut buffer_in = vec![0u8; chunk_size];
    let mut buffer_out = vec![0u8; chunk_size];
    let mut encoder = Encoder::new(prefs.format, prefs.level).map_err(engine_error)?;

    let header = Header { format: prefs.format, chunk_size: prefs.chunk_size };
    header.write_to(writer)?;

    let mut total_in: u64 = 0;
    let mut total_out: u64 = 12;

    loop {
        let size_in = read_fill(reader, &mut buffer_in)?;
        if size_in == 0 {
            break;
        }

        let (payload, word): (&[u8], u32) =
            match encoder.encode(&buffer_in[..size_in], &mut buffer_out) {
                Ok(size_out) => (&buffer_out[..size_out], size_word(size_out as u32, false)),
                Err(LzmError::OutputTooSmall) => {
                    (&buffer_in[..size_in], size_word(size_in as u32, true))
                }
                Err(e) => return Err(engine_error(e)),
            };

        writer.write_all(&word.to_le_bytes())?;
        writer.write_all(payload)?;

        total_in += size_in as u64;
        total_out += 4 + payload.len() as u64;
    }

    writer.flush()?;
    Ok((total_in, total_out))
}
