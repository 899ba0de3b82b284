//! Forward and backward match extension.
//!
//! `matchlen` counts how many bytes two regions share, comparing 8 bytes at a
//! time and using the trailing-zero count of the first differing XOR word to
//! finish, with 4/2/1-byte tails near the region end.  Overlapping regions
//! (offset ≤ 8) repeat with period `offset`; comparing against one fixed word
//! at a stride from [`RUN_STRIDE`] proves equality along the whole overlap
//! while bounding the number of loads.
//!
//! `matchlen_rev` extends a candidate backward to recover lead bytes the hash
//! probe missed, using the leading-zero count of the XOR word (the bytes
//! nearest the cursor sit in the high lanes of a little-endian load).
//!
//! All `end`/limit parameters leave the last 7 input bytes untouched, so the
//! word-wide probes here never read past the chunk.

use super::mem::{read_u16, read_u32, read_u64};

/// Comparison stride for overlapping matches, indexed by offset 1..=8.
pub static RUN_STRIDE: [usize; 9] = [0, 8, 8, 6, 8, 5, 6, 7, 8];

/// Forward extension for overlapping regions (`start - last <= 8`).
///
/// Compares words at `stride` intervals against the single word loaded at
/// `last`; `end` bounds how far `start` may advance.
///
/// # Safety
/// - `last < start <= end`, all within one allocation.
/// - The allocation extends at least 7 bytes past `end`.
#[inline(always)]
pub unsafe fn matchlen_run(
    start: *const u8,
    last: *const u8,
    end: *const u8,
    stride: usize,
) -> usize {
    let mut curr = start;
    let end_addr = end as usize;
    let lastval: u64;

    if (last as usize) + 8 <= end_addr {
        lastval = read_u64(last);
        if (curr as usize) + 8 <= end_addr {
            let currval = read_u64(curr);
            if lastval != currval {
                return ((lastval ^ currval).trailing_zeros() >> 3) as usize;
            }
            curr = curr.add(stride);
        }
        while (curr as usize) + 8 <= end_addr {
            let currval = read_u64(curr);
            if lastval != currval {
                return curr.offset_from(start) as usize
                    + ((lastval ^ currval).trailing_zeros() >> 3) as usize;
            }
            curr = curr.add(stride);
        }
    } else {
        lastval = read_u32(last) as u64;
    }
    if (curr as usize) + 4 <= end_addr && read_u32(curr) == lastval as u32 {
        curr = curr.add(4);
    }
    if (curr as usize) + 2 <= end_addr && read_u16(curr) == lastval as u16 {
        curr = curr.add(2);
    }
    if (curr as usize) < end_addr && *curr == lastval as u8 {
        curr = curr.add(1);
    }
    curr.offset_from(start) as usize
}

/// Count matching bytes between `start` and the earlier position `mat`,
/// stopping when `start`'s cursor reaches `end`.
///
/// # Safety
/// - `mat < start <= end`, all within one allocation.
/// - The allocation extends at least 7 bytes past `end`.
#[inline(always)]
pub unsafe fn matchlen(start: *const u8, mat: *const u8, end: *const u8) -> usize {
    let off = start.offset_from(mat) as usize;
    if off <= 8 {
        return matchlen_run(start, mat, end, RUN_STRIDE[off]);
    }

    let mut curr = start;
    let mut last = mat;
    let end_addr = end as usize;

    if (curr as usize) + 8 <= end_addr {
        let lastval = read_u64(last);
        let currval = read_u64(curr);
        if lastval != currval {
            return ((lastval ^ currval).trailing_zeros() >> 3) as usize;
        }
        last = last.add(8);
        curr = curr.add(8);
    }
    while (curr as usize) + 8 <= end_addr {
        let lastval = read_u64(last);
        let currval = read_u64(curr);
        if lastval != currval {
            return curr.offset_from(start) as usize
                + ((lastval ^ currval).trailing_zeros() >> 3) as usize;
        }
        last = last.add(8);
        curr = curr.add(8);
    }
    if (curr as usize) + 4 <= end_addr {
        let lastval = read_u32(last);
        let currval = read_u32(curr);
        if lastval != currval {
            return curr.offset_from(start) as usize
                + ((lastval ^ currval).trailing_zeros() >> 3) as usize;
        }
        last = last.add(4);
        curr = curr.add(4);
    }
    if (curr as usize) + 2 <= end_addr && read_u16(last) == read_u16(curr) {
        last = last.add(2);
        curr = curr.add(2);
    }
    if (curr as usize) < end_addr && *last == *curr {
        curr = curr.add(1);
    }
    curr.offset_from(start) as usize
}

/// Count matching bytes walking backward from `start` / `mat`, bounded below
/// by `start_limit` and `match_limit` respectively.
///
/// # Safety
/// - `match_limit <= mat < start`, `start_limit <= start`, all within one
///   allocation whose base is at or below both limits.
#[inline(always)]
pub unsafe fn matchlen_rev(
    start: *const u8,
    mat: *const u8,
    start_limit: *const u8,
    match_limit: *const u8,
) -> usize {
    if start == start_limit || mat == match_limit {
        return 0;
    }
    if *start.sub(1) != *mat.sub(1) {
        return 0;
    }

    // Lower bound for the match cursor: whichever limit binds first.
    let off = start.offset_from(start_limit) as usize;
    let end = if off < mat.offset_from(match_limit) as usize {
        mat.sub(off)
    } else {
        match_limit
    };
    let end_addr = end as usize;

    let mut curr = start;
    let mut last = mat;

    if (last as usize) > end_addr + 7 {
        let next_curr = curr.sub(8);
        let next_last = last.sub(8);
        let currval = read_u64(next_curr);
        let lastval = read_u64(next_last);
        if currval != lastval {
            return ((currval ^ lastval).leading_zeros() >> 3) as usize;
        }
        curr = next_curr;
        last = next_last;
    }
    while (last as usize) > end_addr + 7 {
        let next_curr = curr.sub(8);
        let next_last = last.sub(8);
        let currval = read_u64(next_curr);
        let lastval = read_u64(next_last);
        if currval != lastval {
            return start.offset_from(curr) as usize
                + ((currval ^ lastval).leading_zeros() >> 3) as usize;
        }
        curr = next_curr;
        last = next_last;
    }
    if (last as usize) > end_addr + 3 {
        let next_curr = curr.sub(4);
        let next_last = last.sub(4);
        let currval = read_u32(next_curr);
        let lastval = read_u32(next_last);
        if currval != lastval {
            return start.offset_from(curr) as usize
                + ((currval ^ lastval).leading_zeros() >> 3) as usize;
        }
        curr = next_curr;
        last = next_last;
    }
    if (last as usize) > end_addr + 1 && read_u16(curr.sub(2)) == read_u16(last.sub(2)) {
        curr = curr.sub(2);
        last = last.sub(2);
    }
    if (last as usize) > end_addr && *curr.sub(1) == *last.sub(1) {
        curr = curr.sub(1);
    }

    start.offset_from(curr) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Calls `matchlen` with `end` placed 7 bytes before the buffer end, the
    /// same margin the encoders maintain.
    fn forward(buf: &[u8], curr: usize, last: usize) -> usize {
        unsafe {
            matchlen(
                buf.as_ptr().add(curr),
                buf.as_ptr().add(last),
                buf.as_ptr().add(buf.len() - 7),
            )
        }
    }

    #[test]
    fn distinct_regions() {
        let mut buf = vec![0u8; 64];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = (i % 7) as u8;
        }
        let head = buf[0..14].to_vec();
        buf[30..44].copy_from_slice(&head);
        buf[44] = 0xFF;
        assert_eq!(forward(&buf, 30, 0), 14);
    }

    #[test]
    fn mismatch_in_first_word() {
        let mut buf = vec![7u8; 64];
        buf[33] = 9;
        assert_eq!(forward(&buf, 30, 10), 3);
    }

    #[test]
    fn overlapping_run_each_small_offset() {
        for off in 1usize..=8 {
            let mut buf = vec![0u8; 128];
            for i in 0..buf.len() {
                buf[i] = (i % off) as u8;
            }
            // Whole region repeats with period `off`; the stride comparator
            // may leave a few tail bytes unclaimed but must never overcount.
            let len = forward(&buf, 16, 16 - off);
            assert!(len >= 96, "offset {off}: len {len}");
            assert!(len <= buf.len() - 7 - 16, "offset {off}: len {len}");
            assert_eq!(buf[16..16 + len], buf[16 - off..16 - off + len], "offset {off}");
        }
    }

    #[test]
    fn run_stops_at_period_break() {
        let mut buf = vec![0u8; 96];
        for i in 0..buf.len() {
            buf[i] = (i % 3) as u8;
        }
        buf[40] = 0x55;
        let len = forward(&buf, 16, 13);
        assert_eq!(len, 24);
    }

    #[test]
    fn reverse_extension() {
        let mut buf = vec![0u8; 64];
        for (i, b) in buf.iter_mut().enumerate() {
            *b = (i as u8).wrapping_mul(7).wrapping_add(3);
        }
        let copied = buf[8..18].to_vec();
        buf[30..40].copy_from_slice(&copied);
        let base = buf.as_ptr();
        // Bytes before 33 match bytes before 11 back to the copy start.
        let rev = unsafe { matchlen_rev(base.add(33), base.add(11), base.add(28), base) };
        assert_eq!(rev, 3);
    }

    #[test]
    fn reverse_respects_start_limit() {
        let buf = vec![9u8; 64];
        let base = buf.as_ptr();
        let rev = unsafe { matchlen_rev(base.add(40), base.add(20), base.add(38), base) };
        assert_eq!(rev, 2);
    }

    #[test]
    fn reverse_zero_when_no_match() {
        let mut buf = vec![1u8; 32];
        buf[19] = 2;
        let base = buf.as_ptr();
        let rev = unsafe { matchlen_rev(base.add(24), base.add(20), base, base) };
        assert_eq!(rev, 0);
    }
}
