//! Command-line argument parsing for the `lzm` binary.
//!
//! The entry points are [`parse_args`] (reads `std::env::args()`) and
//! [`parse_args_from`] (takes an explicit slice, suitable for unit tests).
//! Short options may be aggregated (`-dfv`); `-b` and `-x` take a value
//! either attached (`-x64`) or as the next argument; a bare `-` names
//! stdin/stdout; `--` ends option processing.

use anyhow::{anyhow, Result};

use crate::engine::CHUNK_MAX;
use crate::io::prefs::Prefs;
use crate::io::STDIO_MARK;

/// Everything the argument loop produces.
#[derive(Debug)]
pub struct ParsedArgs {
    pub prefs: Prefs,
    pub verbose: bool,
    pub files: Vec<String>,
    /// `-h` was given; the caller prints usage and exits.
    pub show_help: bool,
}

/// Parse `std::env::args()` (skipping argv[0]).
pub fn parse_args() -> Result<ParsedArgs> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    parse_args_from(&argv)
}

/// Parse an explicit argument list.
pub fn parse_args_from(argv: &[String]) -> Result<ParsedArgs> {
    let mut prefs = Prefs::default();
    let mut verbose = false;
    let mut files: Vec<String> = Vec::new();
    let mut all_arguments_are_files = false;

    let mut arg_idx = 0usize;
    while arg_idx < argv.len() {
        let argument = &argv[arg_idx];
        arg_idx += 1;

        if argument.is_empty() {
            continue;
        }

        if all_arguments_are_files
            || argument == STDIO_MARK
            || !argument.starts_with('-')
        {
            files.push(argument.clone());
            continue;
        }

        if argument == "--" {
            all_arguments_are_files = true;
            continue;
        }

        // Aggregated short options.
        let mut chars = argument[1..].chars();
        while let Some(opt) = chars.next() {
            match opt {
                '0'..='6' => prefs.level = opt as u32 - '0' as u32,
                'b' => {
                    let value = take_value(&mut chars, argv, &mut arg_idx, 'b')?;
                    let tests: u32 = value
                        .parse()
                        .map_err(|_| anyhow!("bad value for -b: {value}"))?;
                    if tests == 0 || tests > 100 {
                        return Err(anyhow!("tests must be non-zero and max 100"));
                    }
                    prefs.benchmark = true;
                    prefs.bench_tests = tests;
                    break;
                }
                'c' => prefs.console = true,
                'd' => prefs.compress = false,
                'f' => prefs.clobber = true,
                'k' => prefs.keep_input = true,
                'r' => prefs.recurse = true,
                't' => prefs.test = true,
                'v' => verbose = true,
                'x' => {
                    let value = take_value(&mut chars, argv, &mut arg_idx, 'x')?;
                    let kb: u32 = value
                        .parse()
                        .map_err(|_| anyhow!("bad value for -x: {value}"))?;
                    if kb == 0 || (kb as usize) << 10 > CHUNK_MAX {
                        return Err(anyhow!(
                            "chunk size must be 1..{} KB",
                            CHUNK_MAX >> 10
                        ));
                    }
                    prefs.chunk_size = kb << 10;
                    break;
                }
                'h' => {
                    return Ok(ParsedArgs { prefs, verbose, files, show_help: true });
                }
                other => return Err(anyhow!("unknown option -{other}")),
            }
        }
    }

    Ok(ParsedArgs { prefs, verbose, files, show_help: false })
}

/// Value for an option: the rest of the current token, or the next argument.
fn take_value(
    chars: &mut std::str::Chars<'_>,
    argv: &[String],
    arg_idx: &mut usize,
    opt: char,
) -> Result<String> {
    let rest: String = chars.collect();
    if !rest.is_empty() {
        return Ok(rest);
    }
    if *arg_idx < argv.len() {
        let value = argv[*arg_idx].clone();
        *arg_idx += 1;
        return Ok(value);
    }
    Err(anyhow!("option -{opt} requires a value"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        args.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults() {
        let parsed = parse_args_from(&argv(&["file"])).unwrap();
        assert!(parsed.prefs.compress);
        assert!(!parsed.prefs.clobber);
        assert!(!parsed.prefs.keep_input);
        assert_eq!(parsed.prefs.chunk_size as usize, CHUNK_MAX);
        assert_eq!(parsed.files, ["file"]);
    }

    #[test]
    fn level_flags() {
        for level in 0..=6u32 {
            let arg = format!("-{level}");
            let parsed = parse_args_from(&argv(&[&arg, "f"])).unwrap();
            assert_eq!(parsed.prefs.level, level);
        }
    }

    #[test]
    fn aggregated_flags() {
        let parsed = parse_args_from(&argv(&["-dfv", "f"])).unwrap();
        assert!(!parsed.prefs.compress);
        assert!(parsed.prefs.clobber);
        assert!(parsed.verbose);
    }

    #[test]
    fn chunk_size_attached_and_detached() {
        let parsed = parse_args_from(&argv(&["-x64", "f"])).unwrap();
        assert_eq!(parsed.prefs.chunk_size, 64 << 10);
        let parsed = parse_args_from(&argv(&["-x", "128", "f"])).unwrap();
        assert_eq!(parsed.prefs.chunk_size, 128 << 10);
    }

    #[test]
    fn chunk_size_bounds() {
        assert!(parse_args_from(&argv(&["-x0", "f"])).is_err());
        assert!(parse_args_from(&argv(&["-x4096", "f"])).is_ok());
        assert!(parse_args_from(&argv(&["-x4097", "f"])).is_err());
    }

    #[test]
    fn bench_tests_bounds() {
        let parsed = parse_args_from(&argv(&["-b3", "f"])).unwrap();
        assert!(parsed.prefs.benchmark);
        assert_eq!(parsed.prefs.bench_tests, 3);
        assert!(parse_args_from(&argv(&["-b0", "f"])).is_err());
        assert!(parse_args_from(&argv(&["-b101", "f"])).is_err());
    }

    #[test]
    fn dash_and_double_dash() {
        let parsed = parse_args_from(&argv(&["-", "--", "-not-an-option"])).unwrap();
        assert_eq!(parsed.files, ["-", "-not-an-option"]);
    }

    #[test]
    fn unknown_option_rejected() {
        assert!(parse_args_from(&argv(&["-z"])).is_err());
    }
}
