#![no_main]
use libfuzzer_sys::fuzz_target;

use lzm::{compressed_size, Decoder, Encoder, CHUNK_MAX, FORMAT_1, LEVEL_COUNT};

fuzz_target!(|data: &[u8]| {
    if data.len() > CHUNK_MAX {
        return;
    }

    // Derive the level from the input so all encoders get fuzzed.
    let level = data.first().copied().unwrap_or(0) as u32 % LEVEL_COUNT;

    let mut encoder = Encoder::new(FORMAT_1, level).unwrap();
    let mut packed = vec![0u8; compressed_size(data.len() as u32) as usize];
    let n = encoder
        .encode(data, &mut packed)
        .expect("worst-case output buffer must never overflow");

    let decoder = Decoder::new(FORMAT_1).unwrap();
    let mut unpacked = vec![0u8; data.len()];
    let m = decoder
        .decode(&packed[..n], &mut unpacked)
        .expect("own output must decode");

    assert_eq!(m, data.len(), "round-trip length mismatch at level {level}");
    assert_eq!(&unpacked[..], data, "round-trip bytes mismatch at level {level}");
});
