//! Chunk encoders: literals-only, fast (single-probe), and high (chain-walk
//! with lazy merging).
//!
//! All three emit the same token stream: control byte, offset prefix code,
//! optional extended literal length, literal bytes, optional extended match
//! length.  A final literals-only token with offset `0` terminates every
//! chunk.  Matches never extend into the last 7 bytes of the chunk so the
//! decoder's word-wide probes stay in bounds; the trailing bytes always ship
//! as literals.
//!
//! The scanners step by `misses >> MISS_ORDER`, so the stride grows over
//! incompressible regions and snaps back to 1 on the first match.
//!
//! Emission is bounds-checked against the caller's output capacity: when a
//! token would not fit, the encoder reports [`LzmError::OutputTooSmall`] and
//! [`Encoder::encode`] retries once at the literals-only level.

use core::ptr;

use super::error::LzmError;
use super::matchlen::{matchlen, matchlen_rev};
use super::mem::{read_u32, read_u64};
use super::table::{
    hash_fast, hash_high, HtEntry, HASH_ORDER_FAST, HASH_ORDER_HIGH, MAX_CHAIN_LENGTH, MISS_ORDER,
};
use super::token::{offset_cost, put_length, put_offset, MAX_OFFSET_MASK, MIN_MATCH};
use super::CHUNK_MAX;

// ── Formats and levels ───────────────────────────────────────────────────────

/// The only wire format currently defined.
pub const FORMAT_1: u32 = 1;

pub const LEVEL_NONE: u32 = 0;
pub const LEVEL_FAST: u32 = 1;
pub const LEVEL_COUNT: u32 = 7;
/// Sentinel accepted by [`Encoder::new`]; resolves to [`LEVEL_FAST`].
pub const LEVEL_DEFAULT: u32 = u32::MAX;

/// Worst-case compressed size for a chunk of `size` bytes, saturating on
/// overflow.
pub fn compressed_size(size: u32) -> u32 {
    let csize = size.wrapping_add(24);
    if csize < size {
        size
    } else {
        csize
    }
}

// ── Token emission ───────────────────────────────────────────────────────────
//
// The emit helpers take the output cursor plus the exclusive output limit as
// an address.  Each entry point checks a conservative worst-case footprint up
// front, so the individual field writes below need no further bounds checks.

/// Fill in the literal half of a token: set the high nibble of the control
/// byte, spill to an extended length when needed, and copy the literal bytes.
///
/// # Safety
/// The footprint (`length` + 6 bytes of codes) must fit below the limit
/// checked by the caller; `start` must be readable for `length` bytes.
#[inline(always)]
unsafe fn output_literals_op(
    op: *mut u8,
    mut out: *mut u8,
    start: *const u8,
    length: usize,
) -> *mut u8 {
    if length > 0 {
        if length < 15 {
            *op = (length << 4) as u8;
        } else {
            *op = 15 << 4;
            out = put_length(out, (length - 15) as u32);
        }
        ptr::copy_nonoverlapping(start, out, length);
        out = out.add(length);
    }
    out
}

/// Fill in the match half of a token: low nibble of the control byte plus an
/// extended length when the biased length does not fit.
///
/// # Safety
/// Up to 5 writable bytes must remain at `out` (caller-checked footprint).
#[inline(always)]
unsafe fn output_match_op(op: *mut u8, mut out: *mut u8, length: usize) -> *mut u8 {
    if length < 15 {
        *op |= length as u8;
    } else {
        *op |= 15;
        out = put_length(out, (length - 15) as u32);
    }
    out
}

/// Emit one complete token.  `length` is already biased by `MIN_MATCH`
/// (a 4-byte match passes 0); `offset == 0` marks the end of the stream.
///
/// # Safety
/// Caller has verified the worst-case token footprint fits below the limit.
#[inline(always)]
unsafe fn output_data(
    mut out: *mut u8,
    start: *const u8,
    literals: usize,
    offset: u32,
    length: usize,
) -> *mut u8 {
    let op = out;
    out = out.add(1);
    *op = 0;
    out = put_offset(out, offset);
    out = output_literals_op(op, out, start, literals);
    output_match_op(op, out, length)
}

/// Emit a literal run followed by a match, bounds-checked.
///
/// # Safety
/// `start` must be readable for `literals` bytes; `out` must be below
/// `out_limit` within the output allocation.
#[inline(always)]
unsafe fn output_match(
    out: *mut u8,
    start: *const u8,
    literals: usize,
    offset: u32,
    length: usize,
    out_limit: usize,
) -> Result<*mut u8, LzmError> {
    if out as usize + literals + (1 + 5 + 5 + 4 + 8) > out_limit {
        return Err(LzmError::OutputTooSmall);
    }
    Ok(output_data(out, start, literals, offset, length - MIN_MATCH))
}

/// Emit a literals-only token with the offset-0 terminator, bounds-checked.
///
/// # Safety
/// Same contract as [`output_match`].
#[inline(always)]
unsafe fn output_literals(
    out: *mut u8,
    start: *const u8,
    literals: usize,
    out_limit: usize,
) -> Result<*mut u8, LzmError> {
    if out as usize + literals + (1 + 5 + 1 + 10) > out_limit {
        return Err(LzmError::OutputTooSmall);
    }
    Ok(output_data(out, start, literals, 0, 0))
}

// ── Lazy-merge record (high level only) ──────────────────────────────────────

/// The match awaiting emission while the scanner looks for a better
/// overlapping candidate starting later.
struct PrevMatch {
    lit_start: *const u8,
    start: *const u8,
    last: *const u8,
    length: usize,
}

/// Emit the pending match and start the next literal run at its end.
unsafe fn output_match_last(
    prev: &mut PrevMatch,
    out: *mut u8,
    out_limit: usize,
) -> Result<*mut u8, LzmError> {
    let out = output_match(
        out,
        prev.lit_start,
        prev.start.offset_from(prev.lit_start) as usize,
        prev.start.offset_from(prev.last) as u32,
        prev.length,
        out_limit,
    )?;
    prev.lit_start = prev.start.add(prev.length);
    Ok(out)
}

/// Flush the pending match (if any) and the trailing literals.
unsafe fn output_match_final(
    prev: &mut PrevMatch,
    mut out: *mut u8,
    end: *const u8,
    out_limit: usize,
) -> Result<*mut u8, LzmError> {
    if prev.length > 0 {
        out = output_match_last(prev, out, out_limit)?;
    }
    output_literals(
        out,
        prev.lit_start,
        end as usize - prev.lit_start as usize,
        out_limit,
    )
}

/// Resolve the pending match against a newly found one, then install the new
/// match as pending.
///
/// When the two do not overlap the pending match is emitted whole.  When the
/// new match starts at least `MIN_MATCH` bytes in, the pending match is
/// truncated to the overlap point and emitted.  Otherwise it is dropped.
unsafe fn output_match_merge(
    prev: &mut PrevMatch,
    mut out: *mut u8,
    start: *const u8,
    last: *const u8,
    length: usize,
    out_limit: usize,
) -> Result<*mut u8, LzmError> {
    if prev.length > 0 {
        if prev.start.add(prev.length) <= start {
            out = output_match_last(prev, out, out_limit)?;
        } else if prev.start.add(MIN_MATCH) <= start {
            prev.length = start.offset_from(prev.start) as usize;
            out = output_match_last(prev, out, out_limit)?;
        }
    }

    prev.start = start;
    prev.last = last;
    prev.length = length;

    Ok(out)
}

// ── Level dispatch ───────────────────────────────────────────────────────────

type CodecFn = fn(&mut Encoder, &[u8], &mut [u8]) -> Result<usize, LzmError>;

struct EncodeConfig {
    codec: CodecFn,
    hash_order: u32,
    chain_order: u32,
}

static ENCODE_CONFIG: [EncodeConfig; LEVEL_COUNT as usize] = [
    EncodeConfig { codec: encode_none, hash_order: 0, chain_order: 0 },
    EncodeConfig { codec: encode_fast, hash_order: HASH_ORDER_FAST, chain_order: 0 },
    EncodeConfig { codec: encode_high, hash_order: HASH_ORDER_HIGH, chain_order: 4 },
    EncodeConfig { codec: encode_high, hash_order: HASH_ORDER_HIGH, chain_order: 8 },
    EncodeConfig { codec: encode_high, hash_order: HASH_ORDER_HIGH, chain_order: 12 },
    EncodeConfig { codec: encode_high, hash_order: HASH_ORDER_HIGH, chain_order: 16 },
    EncodeConfig { codec: encode_high, hash_order: HASH_ORDER_HIGH, chain_order: 20 },
];

// ── Encoder state ────────────────────────────────────────────────────────────

/// Compression session state: per-level hash and chain tables, reusable
/// across chunks.  One state must not be shared between threads mid-call;
/// distinct states are independent.
#[derive(Debug)]
pub struct Encoder {
    last_ht: Vec<HtEntry>,
    chains: Vec<HtEntry>,
    chain_mask: u32,
    level: u32,
    format: u32,
}

fn alloc_table(order: u32) -> Result<Vec<HtEntry>, LzmError> {
    if order == 0 {
        return Ok(Vec::new());
    }
    let len = 1usize << order;
    let mut table = Vec::new();
    table
        .try_reserve_exact(len)
        .map_err(|_| LzmError::OutOfMemory)?;
    table.resize(len, HtEntry::default());
    Ok(table)
}

impl Encoder {
    /// Create an encoder for `format` (must be [`FORMAT_1`]) at `level`
    /// 0..=6; [`LEVEL_DEFAULT`] selects the fast level.
    pub fn new(format: u32, level: u32) -> Result<Encoder, LzmError> {
        if format != FORMAT_1 {
            return Err(LzmError::InvalidArgument);
        }
        let level = if level == LEVEL_DEFAULT { LEVEL_FAST } else { level };
        if level >= LEVEL_COUNT {
            return Err(LzmError::InvalidArgument);
        }

        let config = &ENCODE_CONFIG[level as usize];
        Ok(Encoder {
            last_ht: alloc_table(config.hash_order)?,
            chains: alloc_table(config.chain_order)?,
            chain_mask: (1u32 << config.chain_order) - 1,
            level,
            format,
        })
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn format(&self) -> u32 {
        self.format
    }

    /// Seed every bucket (and chain slot) with position 0 of the new chunk,
    /// so stale entries from a previous chunk can never pass the stored-token
    /// check against the wrong bytes.
    fn reset(&mut self, buffer_in: *const u8) {
        // SAFETY: callers guarantee at least 4 readable bytes at buffer_in.
        let seed = HtEntry { index: 0, token: unsafe { read_u32(buffer_in) } };
        self.last_ht.fill(seed);
        self.chains.fill(seed);
    }

    /// Compress one chunk of `input` into `output`; returns the compressed
    /// size.
    ///
    /// Inputs of at most 16 bytes always take the literals-only path.  When a
    /// compressing level overflows `output`, one retry is made at the
    /// literals-only level before [`LzmError::OutputTooSmall`] is returned.
    pub fn encode(&mut self, input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
        if input.len() > CHUNK_MAX {
            return Err(LzmError::InvalidArgument);
        }

        if input.len() <= 16 {
            return encode_none(self, input, output);
        }

        let codec = ENCODE_CONFIG[self.level as usize].codec;
        match codec(self, input, output) {
            Err(LzmError::OutputTooSmall) if self.level != LEVEL_NONE => {
                encode_none(self, input, output)
            }
            result => result,
        }
    }
}

// ── Level 0: store ───────────────────────────────────────────────────────────

fn encode_none(_state: &mut Encoder, input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
    let out = output.as_mut_ptr();
    let out_limit = out as usize + output.len();

    // SAFETY: the emit helper checks the token footprint against out_limit
    // before writing, and reads exactly input.len() bytes from input.
    let curr_out = unsafe { output_literals(out, input.as_ptr(), input.len(), out_limit)? };
    Ok(curr_out as usize - out as usize)
}

// ── Level 1: fast ────────────────────────────────────────────────────────────

fn encode_fast(state: &mut Encoder, input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
    debug_assert!(input.len() > 16);

    // SAFETY throughout: `input.len() > 16`; the scanner keeps `curr_in`
    // strictly below `scan_end = end - 14`, so every 8-byte prefetch (clamped
    // to scan_end) and every reseed read at the match tail stays inside the
    // input slice.  Matches are capped at `match_end = end - 7` by matchlen.
    unsafe {
        let buffer_in = input.as_ptr();
        let end = buffer_in.add(input.len());
        let match_end = end.sub(7);
        let scan_end = end.sub(14);
        let out_base = output.as_mut_ptr();
        let out_limit = out_base as usize + output.len();

        let mut lit_start = buffer_in;
        let mut curr_in = buffer_in;
        let mut curr_out = out_base;
        let mut misses: u32 = (1 << MISS_ORDER) + 1;

        state.reset(buffer_in);

        let mut token = read_u64(curr_in);
        let mut hashval = hash_fast(token);
        let mut next_token = read_u64(curr_in.add(1));
        let mut next_hashval = hash_fast(next_token);
        {
            let entry = &mut state.last_ht[hashval];
            entry.index = 0;
            entry.token = token as u32;
        }
        curr_in = curr_in.add(1);

        while curr_in < scan_end {
            token = next_token;
            hashval = next_hashval;

            let step = (misses >> MISS_ORDER) as usize;
            let remaining = scan_end as usize - curr_in as usize;
            let next_curr = curr_in.add(step.min(remaining));
            next_token = read_u64(next_curr);
            next_hashval = hash_fast(next_token);

            let entry = &mut state.last_ht[hashval];
            let mut last = buffer_in.add(entry.index as usize);
            let last_token = entry.token;
            entry.index = curr_in.offset_from(buffer_in) as u32;
            entry.token = token as u32;

            if token as u32 != last_token
                || curr_in.offset_from(last) as usize > MAX_OFFSET_MASK as usize
            {
                misses += 1;
                curr_in = next_curr;
                continue;
            }
            misses = (1 << MISS_ORDER) + 1;

            let mut len = MIN_MATCH;
            len += matchlen(curr_in.add(MIN_MATCH), last.add(MIN_MATCH), match_end);
            let rev = matchlen_rev(curr_in, last, lit_start, buffer_in);
            curr_in = curr_in.sub(rev);
            last = last.sub(rev);
            len += rev;

            curr_out = output_match(
                curr_out,
                lit_start,
                curr_in.offset_from(lit_start) as usize,
                curr_in.offset_from(last) as u32,
                len,
                out_limit,
            )?;

            curr_in = curr_in.add(len);
            lit_start = curr_in;

            if curr_in >= scan_end {
                break;
            }

            // Reseed the tail of the match so upcoming positions can
            // reference data inside it.
            token = read_u64(curr_in.sub(2));
            hashval = hash_fast(token);
            next_token = read_u64(curr_in);
            next_hashval = hash_fast(next_token);
            let entry = &mut state.last_ht[hashval];
            entry.index = curr_in.offset_from(buffer_in) as u32 - 2;
            entry.token = token as u32;
        }

        let tail = end as usize - lit_start as usize;
        curr_out = output_literals(curr_out, lit_start, tail, out_limit)?;
        Ok(curr_out as usize - out_base as usize)
    }
}

// ── Levels 2..=6: high ───────────────────────────────────────────────────────

fn encode_high(state: &mut Encoder, input: &[u8], output: &mut [u8]) -> Result<usize, LzmError> {
    debug_assert!(input.len() > 16);

    // SAFETY throughout: `input.len() > 16`; the scanner keeps `curr_in`
    // strictly below `scan_end = end - 10`, so 4-byte prefetches (clamped to
    // scan_end) stay inside the input slice; matches are capped at
    // `match_end = end - 7`; chain entries always index positions at or
    // before the current one within this chunk (reset() reseeds both tables).
    unsafe {
        let buffer_in = input.as_ptr();
        let end = buffer_in.add(input.len());
        let match_end = end.sub(7);
        let scan_end = end.sub(10);
        let out_base = output.as_mut_ptr();
        let out_limit = out_base as usize + output.len();
        let chain_mask = state.chain_mask as usize;

        let mut curr_in = buffer_in;
        let mut curr_out = out_base;
        let mut misses: u32 = (1 << MISS_ORDER) + 1;

        state.reset(buffer_in);

        let mut prev = PrevMatch {
            lit_start: buffer_in,
            start: buffer_in,
            last: buffer_in,
            length: 0,
        };

        let mut token = read_u32(curr_in);
        let mut hashval = hash_high(token);
        let mut next_token = read_u32(curr_in.add(1));
        let mut next_hashval = hash_high(next_token);
        let probe = state.last_ht[hashval];
        state.chains[0] = probe;
        state.last_ht[hashval] = HtEntry { index: 0, token };
        curr_in = curr_in.add(1);

        while curr_in < scan_end {
            token = next_token;
            hashval = next_hashval;

            let step = (misses >> MISS_ORDER) as usize;
            let remaining = scan_end as usize - curr_in as usize;
            let next_curr = curr_in.add(step.min(remaining));
            next_token = read_u32(next_curr);
            next_hashval = hash_high(next_token);

            let probe = state.last_ht[hashval];
            let mut last = buffer_in.add(probe.index as usize);
            let mut last_token = probe.token;
            let index = curr_in.offset_from(buffer_in) as usize;
            state.chains[index & chain_mask] = probe;
            state.last_ht[hashval] = HtEntry { index: index as u32, token };

            let mut match_val = 0usize;
            let mut match_len = 0usize;
            let mut match_last = buffer_in;
            let mut match_curr = buffer_in;
            let mut curr_chain = 1u32;

            // Backward extension may recover literals but never bytes the
            // pending match already covers.
            let rev_limit = if prev.length > 0 {
                prev.start.add(prev.length)
            } else {
                prev.lit_start
            };

            loop {
                if curr_in.offset_from(last) as usize > MAX_OFFSET_MASK as usize {
                    break;
                }

                if token == last_token
                    && (match_len == 0
                        || ((curr_in as usize) + match_len < end as usize
                            && *curr_in.add(match_len) == *last.add(match_len)))
                {
                    let mut len = MIN_MATCH;
                    len += matchlen(curr_in.add(MIN_MATCH), last.add(MIN_MATCH), match_end);
                    let rev = matchlen_rev(curr_in, last, rev_limit, buffer_in);
                    let curr_o = curr_in.sub(rev);
                    let last_o = last.sub(rev);
                    len += rev;
                    let val = len - offset_cost(curr_o.offset_from(last_o) as u32) as usize;

                    if val > match_val {
                        match_val = val;
                        match_len = len;
                        match_last = last_o;
                        match_curr = curr_o;
                        if (curr_o as usize) + len >= scan_end as usize {
                            break;
                        }
                    }
                }

                if curr_chain == MAX_CHAIN_LENGTH {
                    break;
                }
                curr_chain += 1;

                let index = last.offset_from(buffer_in) as usize;
                let link = state.chains[index & chain_mask];
                let next_last = buffer_in.add(link.index as usize);
                last_token = link.token;
                if next_last >= last {
                    break;
                }
                last = next_last;
            }

            if match_len == 0 {
                misses += 1;
                curr_in = next_curr;
                continue;
            }
            misses = (1 << MISS_ORDER) + 1;

            curr_out = output_match_merge(
                &mut prev, curr_out, match_curr, match_last, match_len, out_limit,
            )?;

            let match_tail = match_curr.add(match_len);
            if match_tail >= scan_end {
                break;
            }

            // Insert the positions the match skipped so later candidates can
            // reference data inside it.
            curr_in = next_curr;
            while curr_in < match_tail {
                token = next_token;
                hashval = next_hashval;
                let step = (misses >> MISS_ORDER) as usize;
                let remaining = scan_end as usize - curr_in as usize;
                let next_curr = curr_in.add(step.min(remaining));
                next_token = read_u32(next_curr);
                next_hashval = hash_high(next_token);

                let index = curr_in.offset_from(buffer_in) as usize;
                state.chains[index & chain_mask] = state.last_ht[hashval];
                state.last_ht[hashval] = HtEntry { index: index as u32, token };
                curr_in = next_curr;
            }
        }

        curr_out = output_match_final(&mut prev, curr_out, end, out_limit)?;
        Ok(curr_out as usize - out_base as usize)
    }
}
