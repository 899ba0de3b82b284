#![no_main]
use libfuzzer_sys::fuzz_target;

use lzm::{Decoder, FORMAT_1};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode to Ok or a clean error: never panic,
    // never write outside the output buffer (checked here by canary bytes).
    let decoder = Decoder::new(FORMAT_1).unwrap();

    for cap in [0usize, 1, 17, 4096] {
        let mut out = vec![0xA5u8; cap + 64];
        let result = decoder.decode(data, &mut out[..cap]);
        assert!(
            out[cap..].iter().all(|&b| b == 0xA5),
            "decode wrote past its output slice (cap {cap}, result {result:?})"
        );
    }
});
