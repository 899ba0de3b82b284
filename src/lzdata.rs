//! Reproducible generator of LZ-structured data.
//!
//! Produces buffers that interleave random literal runs with back-references
//! into already-generated bytes, so the amount of duplication (and therefore
//! the achievable compression ratio) is tunable.  Run lengths follow a
//! heavy-tailed `scale / (1 - u) - scale + min` distribution.
//!
//! The generator is driven by [`Lcg`], a 48-bit linear congruential generator
//! with the classic `drand48` parameters, so the same seed produces the same
//! bytes everywhere.  The test suite uses it for deterministic "random"
//! buffers.

/// 48-bit LCG with the `drand48`/`mrand48` multiplier and increment.
#[derive(Clone)]
pub struct Lcg {
    state: u64,
}

impl Lcg {
    const A: u64 = 0x5DEE_CE66D;
    const C: u64 = 0xB;
    const MASK: u64 = (1 << 48) - 1;

    /// Seed the generator; the low 16 state bits start at the conventional
    /// `0x330E`.
    pub fn new(seed: u64) -> Lcg {
        Lcg { state: ((seed << 16) | 0x330E) & Self::MASK }
    }

    fn step(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(Self::A).wrapping_add(Self::C) & Self::MASK;
        self.state
    }

    /// Uniform double in `[0, 1)`.
    pub fn next_f64(&mut self) -> f64 {
        self.step() as f64 / (1u64 << 48) as f64
    }

    /// 32 pseudo-random bits.
    pub fn next_u32(&mut self) -> u32 {
        (self.step() >> 16) as u32
    }

    /// Fill `buf` with pseudo-random bytes.
    pub fn fill(&mut self, buf: &mut [u8]) {
        let mut chunks = buf.chunks_exact_mut(4);
        for chunk in &mut chunks {
            chunk.copy_from_slice(&self.next_u32().to_le_bytes());
        }
        let rest = chunks.into_remainder();
        if !rest.is_empty() {
            let word = self.next_u32().to_le_bytes();
            rest.copy_from_slice(&word[..rest.len()]);
        }
    }
}

/// Shape of the generated data.
#[derive(Debug, Clone)]
pub struct GenParams {
    pub min_lit_len: usize,
    pub max_lit_len: usize,
    pub min_match_len: usize,
    pub max_match_len: usize,
    pub min_offset: usize,
    pub max_offset: usize,
    /// Probability that the next run is a back-reference.
    pub match_prob: f64,
    pub lit_len_scale: f64,
    pub match_len_scale: f64,
}

impl GenParams {
    /// Defaults for a buffer of `size` bytes: any run length or offset up to
    /// the buffer size, two-thirds matches.
    pub fn for_size(size: usize) -> GenParams {
        GenParams {
            min_lit_len: 1,
            max_lit_len: size,
            min_match_len: 4,
            max_match_len: size,
            min_offset: 1,
            max_offset: size,
            match_prob: 0.67,
            lit_len_scale: 2.0,
            match_len_scale: 2.0,
        }
    }

    /// `min > max` pairs and probabilities outside `[0, 1]` are invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.min_lit_len > self.max_lit_len {
            return Err("min lit length > max lit length".into());
        }
        if self.min_match_len > self.max_match_len {
            return Err("min match length > max match length".into());
        }
        if self.min_offset > self.max_offset {
            return Err("min offset > max offset".into());
        }
        if !(0.0..=1.0).contains(&self.match_prob) {
            return Err("bad match probability".into());
        }
        if self.lit_len_scale < 0.0 || self.match_len_scale < 0.0 {
            return Err("bad length scale".into());
        }
        Ok(())
    }
}

/// Counters accumulated across [`generate_data`] calls.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenStats {
    pub literals: u64,
    pub literal_bytes: u64,
    pub matches: u64,
    pub match_bytes: u64,
}

impl GenStats {
    /// Share of bytes produced by back-references, in percent.
    pub fn dupe_percent(&self) -> f64 {
        let total = self.literal_bytes + self.match_bytes;
        if total == 0 {
            return 0.0;
        }
        self.match_bytes as f64 * 100.0 / total as f64
    }
}

fn scaled_len(rng: &mut Lcg, scale: f64, min: usize) -> usize {
    let len = scale / (1.0 - rng.next_f64()) - scale;
    min.saturating_add(len as usize)
}

fn gen_literal(
    rng: &mut Lcg,
    params: &GenParams,
    stats: &mut GenStats,
    buf: &mut [u8],
    pos: usize,
) -> usize {
    let mut length = scaled_len(rng, params.lit_len_scale, params.min_lit_len);
    length = length.min(params.max_lit_len).min(buf.len() - pos);

    stats.literals += 1;
    stats.literal_bytes += length as u64;

    let end = pos + length;
    rng.fill(&mut buf[pos..end]);
    end
}

fn gen_match(
    rng: &mut Lcg,
    params: &GenParams,
    stats: &mut GenStats,
    buf: &mut [u8],
    pos: usize,
) -> usize {
    let mut length = scaled_len(rng, params.match_len_scale, params.min_match_len);
    length = length.min(params.max_match_len).min(buf.len() - pos);

    // Source position: anywhere from min_offset up to the write cursor.
    let maxoff = params.max_offset.min(pos);
    let range = (maxoff - params.min_offset + 1) as u32;
    let mut src = params.min_offset + (rng.next_u32() % range) as usize;

    stats.matches += 1;
    stats.match_bytes += length as u64;

    let end = pos + length;
    let mut pos = pos;
    while pos < end {
        buf[pos] = buf[src];
        pos += 1;
        src += 1;
    }
    end
}

/// Fill `buf` with literal and match runs according to `params`.
///
/// The buffer always starts with enough literals to make the smallest offset
/// reachable; the final `min_match_len - 1` bytes are literals.
pub fn generate_data(rng: &mut Lcg, params: &GenParams, stats: &mut GenStats, buf: &mut [u8]) {
    let size = buf.len();
    let mut pos = 0;

    while pos < params.min_offset && pos < size {
        pos = gen_literal(rng, params, stats, buf, pos);
    }
    while pos < size.saturating_sub(params.min_match_len - 1) {
        if rng.next_f64() < params.match_prob {
            pos = gen_match(rng, params, stats, buf, pos);
        } else {
            pos = gen_literal(rng, params, stats, buf, pos);
        }
    }
    while pos < size {
        pos = gen_literal(rng, params, stats, buf, pos);
    }
}

/// Convenience: a deterministic buffer of `size` bytes for the given seed.
pub fn generate_buffer(seed: u64, size: usize, params: &GenParams) -> Vec<u8> {
    let mut rng = Lcg::new(seed);
    let mut stats = GenStats::default();
    let mut buf = vec![0u8; size];
    generate_data(&mut rng, params, &mut stats, &mut buf);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lcg_matches_drand48_sequence() {
        // First drand48() values for seed 0 (state 0x330E).
        let mut rng = Lcg::new(0);
        let expected = [0.170828, 0.749902, 0.096372, 0.870465];
        for e in expected {
            let got = rng.next_f64();
            assert!((got - e).abs() < 1e-4, "got {got}, expected {e}");
        }
    }

    #[test]
    fn deterministic_for_same_seed() {
        let params = GenParams::for_size(4096);
        let a = generate_buffer(42, 4096, &params);
        let b = generate_buffer(42, 4096, &params);
        let c = generate_buffer(43, 4096, &params);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn stats_cover_all_bytes() {
        let params = GenParams::for_size(16 << 10);
        let mut rng = Lcg::new(1);
        let mut stats = GenStats::default();
        let mut buf = vec![0u8; 16 << 10];
        generate_data(&mut rng, &params, &mut stats, &mut buf);
        assert_eq!(stats.literal_bytes + stats.match_bytes, buf.len() as u64);
        assert!(stats.matches > 0);
        assert!(stats.dupe_percent() > 0.0);
    }

    #[test]
    fn validation_catches_inverted_ranges() {
        let mut params = GenParams::for_size(1024);
        params.min_offset = 10;
        params.max_offset = 5;
        assert!(params.validate().is_err());
        let mut params = GenParams::for_size(1024);
        params.match_prob = 1.5;
        assert!(params.validate().is_err());
    }

    #[test]
    fn offsets_confined_to_range() {
        // min_offset == max_offset == 1 means every match copies the
        // previous byte; with match_prob 1.0 past the first literal the
        // buffer becomes a handful of literal bytes repeated in runs.
        let params = GenParams {
            min_lit_len: 1,
            max_lit_len: 1,
            min_match_len: 4,
            max_match_len: 64,
            min_offset: 1,
            max_offset: 1,
            match_prob: 1.0,
            lit_len_scale: 0.0,
            match_len_scale: 2.0,
        };
        let buf = generate_buffer(9, 512, &params);
        // Runs of equal bytes: count distinct byte changes, which must be
        // far fewer than the buffer length.
        let changes = buf.windows(2).filter(|w| w[0] != w[1]).count();
        assert!(changes < buf.len() / 3);
    }
}
