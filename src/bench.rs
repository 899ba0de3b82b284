//! In-process benchmark behind the `-b` option.
//!
//! The input file is split into chunk-sized buffers once, then each level is
//! timed: repeated full-file encode sweeps until at least
//! [`BENCH_TIME_NS`] has elapsed, for `bench_tests` rounds, keeping the best
//! rate; the same for decode.  Decoded bytes are compared against the
//! originals before the level's result line is printed.
//!
//! With the `bench-pinning` feature the process is pinned to its current CPU
//! and its priority raised before timing, so rates are not blurred by
//! migrations.

use std::fs;
use std::io;
use std::time::Instant;

use crate::displaylevel;
use crate::engine::{compressed_size, Decoder, Encoder, LEVEL_COUNT, LEVEL_DEFAULT};
use crate::io::file_io::engine_error;
use crate::io::prefs::Prefs;

/// Minimum timed span per test round (3 s).
pub const BENCH_TIME_NS: u64 = 3_000_000_000;

#[derive(Debug)]
struct BenchChunk {
    data_orig: Vec<u8>,
    data_comp: Vec<u8>,
    data_decomp: Vec<u8>,
    size_comp_out: usize,
    size_decomp_out: usize,
}

fn load_chunks(path: &str, chunk_size: usize) -> io::Result<(Vec<BenchChunk>, u64)> {
    let mut file = fs::File::open(path)?;
    let mut chunks = Vec::new();
    let mut file_size: u64 = 0;

    loop {
        let mut data_orig = vec![0u8; chunk_size];
        let n = crate::io::read_fill(&mut file, &mut data_orig)?;
        if n == 0 {
            break;
        }
        data_orig.truncate(n);
        file_size += n as u64;
        chunks.push(BenchChunk {
            data_comp: vec![0u8; compressed_size(n as u32) as usize],
            data_decomp: vec![0u8; n],
            data_orig,
            size_comp_out: 0,
            size_decomp_out: 0,
        });
        if n < chunk_size {
            break;
        }
    }

    if file_size == 0 {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "no data to bench"));
    }
    Ok((chunks, file_size))
}

#[cfg(feature = "bench-pinning")]
fn pin_current_cpu() {
    // SAFETY: queries the scheduler only.
    let cpu = unsafe { libc::sched_getcpu() };
    if cpu >= 0 {
        let mut set = nix::sched::CpuSet::new();
        if set.set(cpu as usize).is_ok() {
            let _ = nix::sched::sched_setaffinity(nix::unistd::Pid::from_raw(0), &set);
        }
    }
    // SAFETY: adjusts scheduling priority for this process only.
    unsafe {
        libc::setpriority(libc::PRIO_PROCESS, 0, -20);
    }
}

fn rate_mb_per_s(file_size: u64, iterations: u64, time_ns: u64) -> f64 {
    (file_size as f64) * (iterations as f64) * 1000.0 / (time_ns.max(1) as f64)
}

fn benchmark_level(
    chunks: &mut [BenchChunk],
    file_size: u64,
    prefs: &Prefs,
    level: u32,
    bench_time_ns: u64,
) -> io::Result<()> {
    // ── Encode sweeps ───────────────────────────────────────────────────────
    let mut encoder = Encoder::new(prefs.format, level).map_err(engine_error)?;
    let mut comp_rate = 0.0f64;

    for _ in 0..prefs.bench_tests {
        let mut iterations: u64 = 0;
        let start = Instant::now();
        let time_ns = loop {
            for chunk in chunks.iter_mut() {
                chunk.size_comp_out = encoder
                    .encode(&chunk.data_orig, &mut chunk.data_comp)
                    .map_err(engine_error)?;
            }
            iterations += 1;
            let elapsed = start.elapsed().as_nanos() as u64;
            if elapsed >= bench_time_ns {
                break elapsed;
            }
        };
        let rate = rate_mb_per_s(file_size, iterations, time_ns);
        if rate > comp_rate {
            comp_rate = rate;
        }
        displaylevel!(2, "{:10.4} ", rate);
    }
    displaylevel!(2, "\n");

    let comp_size: u64 = chunks.iter().map(|c| c.size_comp_out as u64).sum();
    let comp_perc = (comp_size as f64) * 100.0 / (file_size as f64);

    // ── Decode sweeps ───────────────────────────────────────────────────────
    let decoder = Decoder::new(prefs.format).map_err(engine_error)?;
    let mut decomp_rate = 0.0f64;

    for _ in 0..prefs.bench_tests {
        let mut iterations: u64 = 0;
        let start = Instant::now();
        let time_ns = loop {
            for chunk in chunks.iter_mut() {
                chunk.size_decomp_out = decoder
                    .decode(&chunk.data_comp[..chunk.size_comp_out], &mut chunk.data_decomp)
                    .map_err(engine_error)?;
            }
            iterations += 1;
            let elapsed = start.elapsed().as_nanos() as u64;
            if elapsed >= bench_time_ns {
                break elapsed;
            }
        };
        let rate = rate_mb_per_s(file_size, iterations, time_ns);
        if rate > decomp_rate {
            decomp_rate = rate;
        }
        displaylevel!(2, "{:10.4} ", rate);
    }
    displaylevel!(2, "\n");

    // ── Verify ──────────────────────────────────────────────────────────────
    let mut offset: u64 = 0;
    for chunk in chunks.iter() {
        if chunk.size_decomp_out != chunk.data_orig.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!(
                    "incorrect chunk size, expect {}, got {}",
                    chunk.data_orig.len(),
                    chunk.size_decomp_out
                ),
            ));
        }
        for (a, b) in chunk.data_orig.iter().zip(chunk.data_decomp.iter()) {
            if a != b {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("corruption, offset {offset}, expect {a:#x}, found {b:#x}"),
                ));
            }
            offset += 1;
        }
    }

    println!(
        "Level {}: --> {}, {:9.4}%, {:10.4} MB/s, {:10.4} MB/s",
        level, comp_size, comp_perc, comp_rate, decomp_rate
    );
    Ok(())
}

/// Benchmark one file at the requested level, or at every level when the
/// level was left at its default.
pub fn benchmark_file(path: &str, prefs: &Prefs) -> io::Result<()> {
    let (mut chunks, file_size) = load_chunks(path, prefs.chunk_size as usize)?;

    #[cfg(feature = "bench-pinning")]
    pin_current_cpu();

    println!("File {}: size {} bytes", path, file_size);

    if prefs.level != LEVEL_DEFAULT {
        benchmark_level(&mut chunks, file_size, prefs, prefs.level, BENCH_TIME_NS)
    } else {
        for level in 0..LEVEL_COUNT {
            benchmark_level(&mut chunks, file_size, prefs, level, BENCH_TIME_NS)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn single_round_all_levels() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let data: Vec<u8> = (0u8..=255).cycle().take(8192).collect();
        tmp.write_all(&data).unwrap();

        let prefs = Prefs { bench_tests: 1, chunk_size: 4096, ..Prefs::default() };
        let (mut chunks, file_size) =
            load_chunks(tmp.path().to_str().unwrap(), prefs.chunk_size as usize).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(file_size, 8192);

        // Zero time budget: each sweep runs exactly once.
        for level in 0..LEVEL_COUNT {
            benchmark_level(&mut chunks, file_size, &prefs, level, 0).unwrap();
        }
    }

    #[test]
    fn empty_file_is_an_error() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let err = load_chunks(tmp.path().to_str().unwrap(), 4096).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
    }
}
