//! `lzdata`: generate files of tunable compressibility.
//!
//! Writes pseudo-random data mixing literal runs and back-references so
//! codec behaviour can be exercised across the whole ratio range, from
//! incompressible noise to long repeats, reproducibly for a given seed.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::process::exit;

use lzm::lzdata::{generate_data, GenParams, GenStats, Lcg};

const FILE_SIZE_DEFAULT: u64 = 100 << 20;
const CHUNK_SIZE_DEFAULT: usize = 4 << 20;

struct LzdataArgs {
    file_size: u64,
    chunk_size: usize,
    params: GenParams,
    seed: u64,
    verbose: bool,
    files: Vec<String>,
}

fn usage() {
    println!("usage: lzdata [options] <files...>");
    println!("\t--filesize <size>\tfile size (MB)");
    println!("\t--chunksize <size>\tchunk size (KB)");
    println!("\t--minlitlen <len>\tminimum literal length");
    println!("\t--maxlitlen <len>\tmaximum literal length");
    println!("\t--minmatchlen <len>\tminimum match length");
    println!("\t--maxmatchlen <len>\tmaximum match length");
    println!("\t--minoffset <len>\tminimum offset");
    println!("\t--maxoffset <len>\tmaximum offset");
    println!("\t--matchprob <prob>\tprobability of match [0..1]");
    println!("\t--litlenscale <val>\tliteral length scale (> 0)");
    println!("\t--matchlenscale <val>\tmatch length scale (> 0)");
    println!("\t--randomseed <val>\trandom number seed");
    println!("\t--verbose\t\treport details used");
    println!("\t--help\t\t\tthis help");
}

fn fail(msg: &str) -> ! {
    eprintln!("lzdata: {msg}");
    exit(1);
}

fn parse_number<T: std::str::FromStr>(name: &str, value: &str) -> T {
    value
        .parse()
        .unwrap_or_else(|_| fail(&format!("bad value for --{name}: {value}")))
}

fn parse_cli() -> LzdataArgs {
    let argv: Vec<String> = std::env::args().skip(1).collect();

    let mut file_size = FILE_SIZE_DEFAULT;
    let mut chunk_size = CHUNK_SIZE_DEFAULT;
    let mut min_lit_len = 0usize;
    let mut max_lit_len = 0usize;
    let mut min_match_len = 0usize;
    let mut max_match_len = 0usize;
    let mut min_offset = 0usize;
    let mut max_offset = 0usize;
    let mut match_prob = 0.67f64;
    let mut lit_len_scale = 2.0f64;
    let mut match_len_scale = 2.0f64;
    let mut seed = 0u64;
    let mut verbose = false;
    let mut files = Vec::new();

    let mut idx = 0;
    while idx < argv.len() {
        let arg = &argv[idx];
        idx += 1;

        let (name, attached) = match arg.strip_prefix("--") {
            Some(rest) => match rest.split_once('=') {
                Some((n, v)) => (n.to_owned(), Some(v.to_owned())),
                None => (rest.to_owned(), None),
            },
            None => {
                if arg == "-v" {
                    verbose = true;
                } else if arg == "-h" {
                    usage();
                    exit(1);
                } else {
                    files.push(arg.clone());
                }
                continue;
            }
        };

        if name == "verbose" {
            verbose = true;
            continue;
        }
        if name == "help" {
            usage();
            exit(1);
        }

        let value = attached.unwrap_or_else(|| {
            if idx < argv.len() {
                let v = argv[idx].clone();
                idx += 1;
                v
            } else {
                fail(&format!("option --{name} requires a value"))
            }
        });

        match name.as_str() {
            "filesize" => {
                let mb: u64 = parse_number(&name, &value);
                if mb == 0 {
                    fail("file size is zero");
                }
                file_size = mb << 20;
            }
            "chunksize" => {
                let kb: usize = parse_number(&name, &value);
                if kb == 0 {
                    fail("chunk size is zero");
                }
                chunk_size = kb << 10;
            }
            "minlitlen" => min_lit_len = parse_number(&name, &value),
            "maxlitlen" => max_lit_len = parse_number(&name, &value),
            "minmatchlen" => min_match_len = parse_number(&name, &value),
            "maxmatchlen" => max_match_len = parse_number(&name, &value),
            "minoffset" => min_offset = parse_number(&name, &value),
            "maxoffset" => max_offset = parse_number(&name, &value),
            "matchprob" => match_prob = parse_number(&name, &value),
            "litlenscale" => lit_len_scale = parse_number(&name, &value),
            "matchlenscale" => match_len_scale = parse_number(&name, &value),
            "randomseed" => seed = parse_number(&name, &value),
            _ => {
                usage();
                exit(1);
            }
        }
    }

    // Unset bounds default to their widest useful values.
    let params = GenParams {
        min_lit_len: if min_lit_len == 0 { 1 } else { min_lit_len },
        max_lit_len: if max_lit_len == 0 { chunk_size } else { max_lit_len },
        min_match_len: if min_match_len == 0 { 4 } else { min_match_len },
        max_match_len: if max_match_len == 0 { chunk_size } else { max_match_len },
        min_offset: if min_offset == 0 { 1 } else { min_offset },
        max_offset: if max_offset == 0 { chunk_size } else { max_offset },
        match_prob,
        lit_len_scale,
        match_len_scale,
    };
    if let Err(e) = params.validate() {
        fail(&e);
    }

    if files.is_empty() {
        usage();
        exit(1);
    }

    LzdataArgs { file_size, chunk_size, params, seed, verbose, files }
}

fn process_file(args: &LzdataArgs, rng: &mut Lcg, path: &str) -> io::Result<()> {
    let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
    let mut stats = GenStats::default();
    let mut buffer = vec![0u8; args.chunk_size];

    let mut written: u64 = 0;
    while written < args.file_size {
        let size = (args.file_size - written).min(args.chunk_size as u64) as usize;
        generate_data(rng, &args.params, &mut stats, &mut buffer[..size]);
        file.write_all(&buffer[..size])?;
        written += size as u64;
    }

    if args.verbose {
        println!(
            "literals {}/{}, matches {}/{}, dupe data {:.4}%",
            stats.literals,
            stats.literal_bytes,
            stats.matches,
            stats.match_bytes,
            stats.dupe_percent()
        );
    }
    Ok(())
}

fn main() {
    let args = parse_cli();

    if args.verbose {
        println!("File size: {}", args.file_size);
        println!("Chunk size: {}", args.chunk_size);
        println!("Min lit len: {}", args.params.min_lit_len);
        println!("Max lit len: {}", args.params.max_lit_len);
        println!("Min match len: {}", args.params.min_match_len);
        println!("Max match len: {}", args.params.max_match_len);
        println!("Min offset: {}", args.params.min_offset);
        println!("Max offset: {}", args.params.max_offset);
        println!("Match probability: {:.4}", args.params.match_prob);
        println!("Lit len scale: {:.4}", args.params.lit_len_scale);
        println!("Match len scale: {:.4}", args.params.match_len_scale);
        println!("Random seed: {}", args.seed);
    }

    let mut rng = Lcg::new(args.seed);
    let mut ret = 0;
    for path in &args.files {
        if let Err(e) = process_file(&args, &mut rng, path) {
            eprintln!("lzdata: {path}: {e}");
            if ret == 0 {
                ret = e.raw_os_error().unwrap_or(1);
            }
        }
    }
    exit(ret);
}
