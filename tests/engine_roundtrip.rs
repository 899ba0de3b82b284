// Round-trip coverage for the codec engine across all levels: boundary
// sizes, pattern data driving every overlap-copy path, structured and
// incompressible random data, and the worst-case output bound.

use lzm::lzdata::{generate_buffer, GenParams, Lcg};
use lzm::{compressed_size, Decoder, Encoder, LzmError, CHUNK_MAX, FORMAT_1, LEVEL_COUNT};

/// Encode at `level` into a worst-case buffer, decode, and return
/// `(compressed_len, decoded)`.
fn roundtrip_at(level: u32, data: &[u8]) -> (usize, Vec<u8>) {
    let mut encoder = Encoder::new(FORMAT_1, level).unwrap();
    let mut packed = vec![0u8; compressed_size(data.len() as u32) as usize];
    let packed_len = encoder.encode(data, &mut packed).unwrap();

    let decoder = Decoder::new(FORMAT_1).unwrap();
    let mut unpacked = vec![0u8; data.len()];
    let unpacked_len = decoder.decode(&packed[..packed_len], &mut unpacked).unwrap();
    assert_eq!(unpacked_len, data.len(), "level {level}: wrong decoded size");
    (packed_len, unpacked)
}

fn assert_roundtrip_all_levels(data: &[u8]) {
    for level in 0..LEVEL_COUNT {
        let (_, unpacked) = roundtrip_at(level, data);
        assert_eq!(unpacked, data, "level {level}: decoded bytes differ");
    }
}

// ── Boundary sizes ───────────────────────────────────────────────────────────

#[test]
fn empty_chunk_all_levels() {
    for level in 0..LEVEL_COUNT {
        let (packed_len, unpacked) = roundtrip_at(level, b"");
        assert_eq!(packed_len, 2, "an empty chunk is one end token");
        assert!(unpacked.is_empty());
    }
}

#[test]
fn tiny_inputs_take_the_literal_path() {
    for n in 1..=16usize {
        let data: Vec<u8> = (0..n as u8).collect();
        for level in 0..LEVEL_COUNT {
            let (packed_len, unpacked) = roundtrip_at(level, &data);
            assert_eq!(unpacked, data);
            // Literals-only token: control byte, offset byte, maybe one
            // extended-length byte, then the bytes themselves.
            assert!(packed_len <= n + 3, "n={n}: packed {packed_len}");
        }
    }
}

#[test]
fn seventeen_repeating_bytes() {
    let data = [0u8; 17];
    for level in 0..LEVEL_COUNT {
        let (packed_len, unpacked) = roundtrip_at(level, &data);
        assert_eq!(unpacked, data);
        if level >= 1 {
            assert!(packed_len < 17, "level {level} should find the run");
        }
    }
}

#[test]
fn eight_byte_period_pattern() {
    let data: Vec<u8> = b"ABCDEFGH".iter().copied().cycle().take(64).collect();
    let (packed_len, unpacked) = roundtrip_at(1, &data);
    assert_eq!(unpacked, data);
    // One literal run of 8 plus one long offset-8 match plus the tail.
    assert!(packed_len < 32, "packed {packed_len}");
}

// ── Overlap-copy paths ───────────────────────────────────────────────────────

#[test]
fn single_byte_period_drives_offset_1_copy() {
    let data = vec![b'A'; 10_000];
    assert_roundtrip_all_levels(&data);
    let (packed_len, _) = roundtrip_at(1, &data);
    assert!(packed_len < 64);
}

#[test]
fn two_byte_period_drives_offset_2_copy() {
    let data: Vec<u8> = b"AB".iter().copied().cycle().take(10_000).collect();
    assert_roundtrip_all_levels(&data);
}

#[test]
fn each_small_period_3_to_8() {
    for period in 3usize..=8 {
        let pattern: Vec<u8> = (b'a'..b'a' + period as u8).collect();
        let data: Vec<u8> = pattern.iter().copied().cycle().take(9_001).collect();
        assert_roundtrip_all_levels(&data);
    }
}

#[test]
fn mixed_periods_and_literals() {
    // Alternate incompressible runs with runs at several periods so one
    // chunk crosses many copy paths.
    let mut rng = Lcg::new(3);
    let mut data = Vec::new();
    for period in [1usize, 5, 2, 9, 3, 17, 4, 256] {
        let mut noise = vec![0u8; 97];
        rng.fill(&mut noise);
        data.extend_from_slice(&noise);
        let pattern: Vec<u8> = (0..period).map(|i| (i * 31) as u8).collect();
        data.extend(pattern.iter().copied().cycle().take(777));
    }
    assert_roundtrip_all_levels(&data);
}

// ── Random and structured data ───────────────────────────────────────────────

#[test]
fn random_100k_all_levels() {
    let mut rng = Lcg::new(0);
    let mut data = vec![0u8; 100_000];
    rng.fill(&mut data);

    for level in 0..LEVEL_COUNT {
        let (packed_len, unpacked) = roundtrip_at(level, &data);
        assert_eq!(unpacked, data, "level {level}");
        if level == 0 {
            assert!(packed_len <= data.len() + 24);
            assert!(packed_len >= data.len());
        }
    }
}

#[test]
fn structured_data_compresses() {
    let params = GenParams::for_size(64 << 10);
    let data = generate_buffer(0, 256 << 10, &params);
    for level in 0..LEVEL_COUNT {
        let (packed_len, unpacked) = roundtrip_at(level, &data);
        assert_eq!(unpacked, data, "level {level}");
        if level >= 1 {
            assert!(packed_len < data.len(), "level {level} should compress");
        }
    }
}

#[test]
fn repeated_4096_byte_block_uses_long_offsets() {
    let mut rng = Lcg::new(0xBEEF);
    let mut block = vec![0u8; 4096];
    rng.fill(&mut block);
    let data: Vec<u8> = block.iter().copied().cycle().take(4096 * 256).collect();

    for level in 2..LEVEL_COUNT {
        let (packed_len, unpacked) = roundtrip_at(level, &data);
        assert_eq!(unpacked, data, "level {level}");
        assert!(
            packed_len < data.len() / 8,
            "level {level}: packed {packed_len} of {}",
            data.len()
        );
    }
}

// ── Output bound and overflow ────────────────────────────────────────────────

#[test]
fn compressed_size_bound_always_suffices() {
    let sizes = [0usize, 1, 15, 16, 17, 100, 1_000, 65_536];
    let mut rng = Lcg::new(11);
    for &n in &sizes {
        let mut random = vec![0u8; n];
        rng.fill(&mut random);
        let repetitive: Vec<u8> = b"xyz".iter().copied().cycle().take(n).collect();
        for data in [random, repetitive] {
            for level in 0..LEVEL_COUNT {
                let mut encoder = Encoder::new(FORMAT_1, level).unwrap();
                let mut packed = vec![0u8; compressed_size(n as u32) as usize];
                let packed_len = encoder.encode(&data, &mut packed).unwrap();
                assert!(packed_len <= packed.len());
            }
        }
    }
}

#[test]
fn compressed_size_saturates() {
    assert_eq!(compressed_size(0), 24);
    assert_eq!(compressed_size(100), 124);
    assert_eq!(compressed_size(u32::MAX - 10), u32::MAX - 10);
}

#[test]
fn too_small_output_reports_overflow() {
    let mut rng = Lcg::new(5);
    let mut data = vec![0u8; 1_000];
    rng.fill(&mut data);
    for level in 0..LEVEL_COUNT {
        let mut encoder = Encoder::new(FORMAT_1, level).unwrap();
        let mut packed = vec![0u8; 64];
        let err = encoder.encode(&data, &mut packed).unwrap_err();
        assert_eq!(err, LzmError::OutputTooSmall, "level {level}");
    }
}

#[test]
fn compressible_data_still_fits_small_output() {
    // Highly repetitive input compresses into far less than the input size,
    // so a small output buffer is no obstacle.
    let data = vec![7u8; 100_000];
    let mut encoder = Encoder::new(FORMAT_1, 1).unwrap();
    let mut packed = vec![0u8; 256];
    let packed_len = encoder.encode(&data, &mut packed).unwrap();

    let decoder = Decoder::new(FORMAT_1).unwrap();
    let mut unpacked = vec![0u8; data.len()];
    let n = decoder.decode(&packed[..packed_len], &mut unpacked).unwrap();
    assert_eq!(n, data.len());
    assert_eq!(unpacked, data);
}

// ── Session reuse and argument validation ────────────────────────────────────

#[test]
fn encoder_state_reuse_across_chunks() {
    let mut rng = Lcg::new(21);
    let zeros = vec![0u8; 20_000];
    let mut noise = vec![0u8; 20_000];
    rng.fill(&mut noise);
    let pattern: Vec<u8> = b"0123456789abcdef".iter().copied().cycle().take(20_000).collect();

    for level in 1..LEVEL_COUNT {
        let mut encoder = Encoder::new(FORMAT_1, level).unwrap();
        let decoder = Decoder::new(FORMAT_1).unwrap();
        for data in [&zeros, &noise, &pattern, &zeros] {
            let mut packed = vec![0u8; compressed_size(data.len() as u32) as usize];
            let packed_len = encoder.encode(data, &mut packed).unwrap();
            let mut unpacked = vec![0u8; data.len()];
            let n = decoder.decode(&packed[..packed_len], &mut unpacked).unwrap();
            assert_eq!(n, data.len());
            assert_eq!(&unpacked, data, "level {level}");
        }
    }
}

#[test]
fn init_validates_format_and_level() {
    assert_eq!(Encoder::new(2, 1).unwrap_err(), LzmError::InvalidArgument);
    assert_eq!(Encoder::new(FORMAT_1, 7).unwrap_err(), LzmError::InvalidArgument);
    assert_eq!(Decoder::new(0).unwrap_err(), LzmError::InvalidArgument);

    let encoder = Encoder::new(FORMAT_1, lzm::LEVEL_DEFAULT).unwrap();
    assert_eq!(encoder.level(), lzm::LEVEL_FAST);
}

#[test]
fn oversized_chunk_rejected() {
    let data = vec![0u8; CHUNK_MAX + 1];
    let mut encoder = Encoder::new(FORMAT_1, 1).unwrap();
    let mut packed = vec![0u8; 1024];
    assert_eq!(encoder.encode(&data, &mut packed).unwrap_err(), LzmError::InvalidArgument);
}
