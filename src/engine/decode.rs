//! Single-pass token-stream decoder.
//!
//! The main loop runs while at least 5 input bytes remain (one control byte
//! plus the largest offset code), which covers every token except a trailing
//! literals-only terminator of fewer than 3 literals; a bounded tail parser
//! after the loop accepts that case.  A fast path handles short literal runs
//! and short non-overlapping matches with fixed-size block copies when both
//! cursors have verified headroom.  Overlapping matches (offset < length)
//! are expanded by per-offset routines: byte/word pattern fills for offsets
//! 1–4, a strided 8-byte store for offsets 5–8, and plain 8-byte copies with
//! a 4-byte lead for offsets ≥ 9.
//!
//! Every path is byte-exact with respect to the caller's buffers: no read
//! outside `input`, no write outside `output`, for any input whatsoever.
//! Malformed streams yield [`LzmError::MalformedInput`]; an output that
//! cannot hold the decoded bytes yields [`LzmError::OutputTooSmall`].

use core::ptr;

use super::error::LzmError;
use super::mem::{read_u16, read_u32, read_u64, write_u16, write_u32, write_u64};
use super::token::{get_length, split_offset_word, MIN_MATCH};
use super::encode::FORMAT_1;

/// Decompression session handle.
///
/// Decoding keeps no state between chunks; the handle exists so a future
/// format revision can carry per-format state without an API change.
#[derive(Debug)]
pub struct Decoder {
    format: u32,
}

impl Decoder {
    /// Create a decoder for `format` (must be [`FORMAT_1`]).
    pub fn new(format: u32) -> Result<Decoder, LzmError> {
        if format != FORMAT_1 {
            return Err(LzmError::InvalidArgument);
        }
        Ok(Decoder { format })
    }

    pub fn format(&self) -> u32 {
        self.format
    }

    /// Decode one compressed chunk into `output`; returns the number of
    /// bytes produced.  `output.len()` is the capacity limit.
    pub fn decode(&self, input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
        decode_chunk(input, output)
    }
}

fn decode_chunk(input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
    // SAFETY throughout: `curr_in` only advances after an explicit remaining-
    // bytes check against `end_addr`, and `curr_out` only after a check
    // against `out_limit`; both stay inside their slices.  Match sources are
    // validated against the number of bytes already produced before any copy.
    unsafe {
        let buffer_in = input.as_ptr();
        let end_addr = buffer_in as usize + input.len();
        let buffer_out = output.as_mut_ptr();
        let out_limit = buffer_out as usize + output.len();

        // Fast paths need 32 bytes of output headroom; 0 disables them.
        let out_limit_fast = if output.len() >= 14 + 14 + MIN_MATCH {
            out_limit - (14 + 14 + MIN_MATCH)
        } else {
            0
        };

        let mut curr_in = buffer_in;
        let mut curr_out = buffer_out;
        let mut off: usize = 1;

        while (curr_in as usize) + 5 <= end_addr {
            let op = *curr_in;
            curr_in = curr_in.add(1);
            let llen = (op >> 4) as usize;
            let mut mlen = (op & 15) as usize + MIN_MATCH;

            // ≥ 4 input bytes remain after the control byte.
            let word = read_u32(curr_in);
            let (o, bytes) = match split_offset_word(word) {
                Some(v) => v,
                None => return Err(LzmError::MalformedInput),
            };
            off = o as usize;
            curr_in = curr_in.add(bytes as usize);

            let mut literals_done = false;

            // Fast path: short literal run, 16 readable input bytes, 32
            // writable output bytes.
            if llen < 15
                && (curr_in as usize) + 16 <= end_addr
                && (curr_out as usize) <= out_limit_fast
            {
                ptr::copy_nonoverlapping(curr_in, curr_out, 16);
                curr_out = curr_out.add(llen);
                curr_in = curr_in.add(llen);

                if off > (curr_out as usize) - (buffer_out as usize) {
                    return Err(LzmError::MalformedInput);
                }

                if mlen < 15 + MIN_MATCH && (off >= mlen || off >= 8) {
                    // 18-byte block copy; only the first mlen bytes are
                    // meaningful, the rest is scratch inside the headroom.
                    // ptr::copy tolerates the overlap when mlen <= off < 8.
                    let mat = curr_out.sub(off);
                    ptr::copy(mat, curr_out, 8);
                    ptr::copy(mat.add(8), curr_out.add(8), 8);
                    ptr::copy(mat.add(16), curr_out.add(16), 2);
                    curr_out = curr_out.add(mlen);
                    continue;
                }
                literals_done = true;
            }

            if !literals_done {
                let mut llen = llen;
                if llen == 15 {
                    if end_addr - (curr_in as usize) < 16 {
                        return Err(LzmError::MalformedInput);
                    }
                    let (ext, used) = get_length(curr_in);
                    curr_in = curr_in.add(used);
                    llen = 15 + ext;
                }
                if llen > 0 {
                    if llen > end_addr - (curr_in as usize) {
                        return Err(LzmError::MalformedInput);
                    }
                    if llen > out_limit - (curr_out as usize) {
                        return Err(LzmError::OutputTooSmall);
                    }
                    ptr::copy_nonoverlapping(curr_in, curr_out, llen);
                    curr_in = curr_in.add(llen);
                    curr_out = curr_out.add(llen);
                }
                if off > (curr_out as usize) - (buffer_out as usize) {
                    return Err(LzmError::MalformedInput);
                }
            }

            if off == 0 {
                break;
            }

            // Short non-overlapping match with output headroom: same block
            // copy as the fast path.
            if mlen < 15 + MIN_MATCH
                && off >= mlen
                && (curr_out as usize) + 14 + MIN_MATCH <= out_limit
            {
                let mat = curr_out.sub(off);
                ptr::copy(mat, curr_out, 8);
                ptr::copy(mat.add(8), curr_out.add(8), 8);
                ptr::copy(mat.add(16), curr_out.add(16), 2);
                curr_out = curr_out.add(mlen);
                continue;
            }

            if mlen == 15 + MIN_MATCH {
                if end_addr - (curr_in as usize) < 6 {
                    return Err(LzmError::MalformedInput);
                }
                let (ext, used) = get_length(curr_in);
                curr_in = curr_in.add(used);
                mlen = 15 + MIN_MATCH + ext;
            }

            if mlen > out_limit - (curr_out as usize) {
                return Err(LzmError::OutputTooSmall);
            }

            let mut mat = curr_out.sub(off);
            let mend_addr = curr_out as usize + mlen;

            if mlen <= off {
                ptr::copy_nonoverlapping(mat, curr_out, mlen);
                curr_out = curr_out.add(mlen);
                continue;
            }

            // Overlapping copy: offset < length.
            match off {
                1 => {
                    let c = *mat;
                    *curr_out = c;
                    *curr_out.add(1) = c;
                    *curr_out.add(2) = c;
                    *curr_out.add(3) = c;
                    curr_out = curr_out.add(4);
                    while (curr_out as usize) < mend_addr {
                        *curr_out = c;
                        curr_out = curr_out.add(1);
                    }
                }
                2 => {
                    let c = read_u16(mat);
                    write_u16(curr_out, c);
                    write_u16(curr_out.add(2), c);
                    curr_out = curr_out.add(4);
                    while (curr_out as usize) + 2 <= mend_addr {
                        write_u16(curr_out, c);
                        curr_out = curr_out.add(2);
                    }
                    if (curr_out as usize) < mend_addr {
                        *curr_out = c as u8;
                        curr_out = curr_out.add(1);
                    }
                }
                3 => {
                    let c1 = *mat;
                    let c2 = *mat.add(1);
                    let c3 = *mat.add(2);
                    while (curr_out as usize) + 3 <= mend_addr {
                        *curr_out = c1;
                        *curr_out.add(1) = c2;
                        *curr_out.add(2) = c3;
                        curr_out = curr_out.add(3);
                    }
                    if (curr_out as usize) < mend_addr {
                        *curr_out = c1;
                        curr_out = curr_out.add(1);
                    }
                    if (curr_out as usize) < mend_addr {
                        *curr_out = c2;
                        curr_out = curr_out.add(1);
                    }
                }
                4 => {
                    let c = read_u32(mat);
                    write_u32(curr_out, c);
                    curr_out = curr_out.add(4);
                    while (curr_out as usize) + 4 <= mend_addr {
                        write_u32(curr_out, c);
                        curr_out = curr_out.add(4);
                    }
                    let b = c.to_le_bytes();
                    let mut i = 0;
                    while (curr_out as usize) < mend_addr {
                        *curr_out = b[i];
                        i += 1;
                        curr_out = curr_out.add(1);
                    }
                }
                5..=8 => {
                    // One 8-byte pattern load, stored at stride `off`; each
                    // store's tail garbage is overwritten by the next store,
                    // and the byte tail finishes the last partial period.
                    let c = read_u64(mat);
                    while (curr_out as usize) + 8 <= mend_addr {
                        write_u64(curr_out, c);
                        curr_out = curr_out.add(off);
                    }
                    while (curr_out as usize) < mend_addr {
                        *curr_out = *curr_out.sub(off);
                        curr_out = curr_out.add(1);
                    }
                }
                _ => {
                    // off >= 9: 8-byte copies cannot overlap; the 4-byte lead
                    // keeps the first wide copy from reading its own output.
                    ptr::copy_nonoverlapping(mat, curr_out, 4);
                    mat = mat.add(4);
                    curr_out = curr_out.add(4);
                    while (curr_out as usize) + 8 <= mend_addr {
                        ptr::copy_nonoverlapping(mat, curr_out, 8);
                        mat = mat.add(8);
                        curr_out = curr_out.add(8);
                    }
                    while (curr_out as usize) < mend_addr {
                        *curr_out = *mat;
                        mat = mat.add(1);
                        curr_out = curr_out.add(1);
                    }
                }
            }
        }

        // A terminator token of fewer than 5 bytes (0–2 trailing literals)
        // falls past the main loop; parse it here with assembled partial
        // words so tiny chunks still round-trip.
        if off != 0 && (curr_in as usize) < end_addr {
            let op = *curr_in;
            curr_in = curr_in.add(1);
            let llen = (op >> 4) as usize;

            let avail = end_addr - curr_in as usize;
            if avail == 0 {
                return Err(LzmError::MalformedInput);
            }
            let mut word = 0u32;
            for i in 0..avail.min(4) {
                word |= (*curr_in.add(i) as u32) << (8 * i);
            }
            let (o, bytes) = match split_offset_word(word) {
                Some(v) => v,
                None => return Err(LzmError::MalformedInput),
            };
            if bytes as usize > avail {
                return Err(LzmError::MalformedInput);
            }
            off = o as usize;
            curr_in = curr_in.add(bytes as usize);

            if llen > 0 {
                if llen >= 15 || llen > end_addr - (curr_in as usize) {
                    return Err(LzmError::MalformedInput);
                }
                if llen > out_limit - (curr_out as usize) {
                    return Err(LzmError::OutputTooSmall);
                }
                ptr::copy_nonoverlapping(curr_in, curr_out, llen);
                curr_out = curr_out.add(llen);
            }
        }

        // Finished without seeing the end-of-stream marker?
        if off != 0 {
            return Err(LzmError::MalformedInput);
        }

        Ok(curr_out as usize - buffer_out as usize)
    }
}
