//! Binary entry point for the `lzm` command-line tool.
//!
//! Handles path dispatch (stdin, regular files, recursive directories),
//! output-filename resolution, the overwrite/keep policies, and operation
//! dispatch (compress, decompress, test, benchmark).  The exit status is 0 on
//! success, otherwise the first failure's errno-style code.

use std::fs;
use std::io::{self, BufReader, BufWriter, IsTerminal, Write};
use std::path::Path;

use lzm::bench::benchmark_file;
use lzm::cli::{help, parse_args};
use lzm::displaylevel;
use lzm::io::{
    compress_stream, decompress_stream, exit_code, open_dst_file, output_filename,
    set_notification_level, transfer_times, Prefs, STDIO_MARK,
};
use lzm::util::create_file_list;

/// Run one direction of the codec between an opened reader and writer.
fn process_data(
    reader: &mut impl io::Read,
    writer: &mut impl Write,
    prefs: &Prefs,
) -> io::Result<(u64, u64)> {
    if prefs.compress && !prefs.test {
        compress_stream(reader, writer, prefs)
    } else {
        decompress_stream(reader, writer, prefs)
    }
}

fn process_stdin(prefs: &Prefs) -> io::Result<()> {
    if io::stdin().is_terminal() {
        eprintln!("lzm: will not read from terminal");
        return Err(io::Error::from_raw_os_error(libc::EIO));
    }

    let stdin = io::stdin();
    let mut reader = stdin.lock();

    if prefs.test {
        let mut sink = io::sink();
        process_data(&mut reader, &mut sink, prefs)?;
        return Ok(());
    }

    if io::stdout().is_terminal() {
        eprintln!("lzm: will not write to terminal");
        return Err(io::Error::from_raw_os_error(libc::EIO));
    }
    let stdout = io::stdout();
    let mut writer = stdout.lock();
    process_data(&mut reader, &mut writer, prefs)?;
    Ok(())
}

/// Remove the input file after successful processing, but only when it is
/// still the same inode that was processed.
#[cfg(unix)]
fn remove_input(path: &str, before: &fs::Metadata) -> io::Result<()> {
    use std::os::unix::fs::MetadataExt;
    let now = fs::metadata(path)?;
    if now.dev() == before.dev() && now.ino() == before.ino() {
        fs::remove_file(path)?;
    }
    Ok(())
}

#[cfg(not(unix))]
fn remove_input(path: &str, _before: &fs::Metadata) -> io::Result<()> {
    fs::remove_file(path)
}

fn process_file(prefs: &Prefs, path: &str, meta: &fs::Metadata) -> io::Result<()> {
    if meta.len() == 0 {
        eprintln!("lzm: {path}: zero size, skipping");
        return Err(io::Error::from_raw_os_error(libc::EINVAL));
    }

    if prefs.benchmark {
        return benchmark_file(path, prefs);
    }

    let mut reader = BufReader::new(fs::File::open(path)?);

    // Test mode: decode and discard.
    if prefs.test {
        let mut sink = io::sink();
        process_data(&mut reader, &mut sink, prefs)?;
        return Ok(());
    }

    // Console mode: write to stdout regardless of direction.
    if prefs.console {
        if io::stdout().is_terminal() {
            eprintln!("lzm: will not write to terminal");
            return Err(io::Error::from_raw_os_error(libc::EIO));
        }
        let stdout = io::stdout();
        let mut writer = stdout.lock();
        process_data(&mut reader, &mut writer, prefs)?;
        return Ok(());
    }

    let path_out = output_filename(path, prefs.compress)?;
    let dst = open_dst_file(&path_out, prefs.clobber)?;
    let mut writer = BufWriter::new(dst);

    let result = process_data(&mut reader, &mut writer, prefs).and_then(|totals| {
        writer.flush()?;
        Ok(totals)
    });

    let (total_in, total_out) = match result {
        Ok(totals) => totals,
        Err(e) => {
            // Do not leave a partial output file behind.
            drop(writer);
            let _ = fs::remove_file(&path_out);
            return Err(e);
        }
    };

    drop(writer);
    transfer_times(meta, &path_out)?;

    if prefs.compress {
        displaylevel!(
            2,
            "Compressed {}: in {}, out {}, {:.4}%\n",
            path_out,
            total_in,
            total_out,
            total_out as f64 / total_in.max(1) as f64 * 100.0
        );
    } else {
        displaylevel!(
            2,
            "Decompressed {}: in {}, out {}, {:.4}%\n",
            path_out,
            total_in,
            total_out,
            total_out as f64 / total_in.max(1) as f64 * 100.0
        );
    }

    if !prefs.keep_input {
        remove_input(path, meta)?;
    }

    Ok(())
}

fn process_dir(prefs: &Prefs, path: &Path) -> i32 {
    let files = match create_file_list(path) {
        Ok(files) => files,
        Err(e) => {
            eprintln!("lzm: {}: {}", path.display(), e);
            return exit_code(&e);
        }
    };

    let mut ret = 0;
    for file in files {
        let name = file.to_string_lossy();
        let err = process_named(prefs, &name);
        if ret == 0 {
            ret = err;
        }
    }
    ret
}

fn process_named(prefs: &Prefs, path: &str) -> i32 {
    let meta = match fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) => {
            eprintln!("lzm: {path}: {e}");
            return exit_code(&e);
        }
    };
    if !meta.is_file() {
        eprintln!("lzm: {path}: not a regular file");
        return libc::EINVAL;
    }
    match process_file(prefs, path, &meta) {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("lzm: {path}: {e}");
            exit_code(&e)
        }
    }
}

fn process_path(prefs: &Prefs, path: &str) -> i32 {
    if path == STDIO_MARK {
        return match process_stdin(prefs) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("lzm: stdin: {e}");
                exit_code(&e)
            }
        };
    }

    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => {
            if !prefs.recurse {
                eprintln!("lzm: {path}: is a directory");
                return libc::EISDIR;
            }
            process_dir(prefs, Path::new(path))
        }
        Ok(_) => process_named(prefs, path),
        Err(e) => {
            eprintln!("lzm: {path}: {e}");
            exit_code(&e)
        }
    }
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("lzm: {e}");
            help::print_usage();
            std::process::exit(1);
        }
    };

    if args.show_help {
        help::print_usage();
        std::process::exit(1);
    }

    set_notification_level(if args.verbose { 2 } else { 1 });

    if args.files.is_empty() {
        help::print_usage();
        std::process::exit(1);
    }

    let mut ret = 0;
    for file in &args.files {
        let err = process_path(&args.prefs, file);
        if ret == 0 {
            ret = err;
        }
    }
    std::process::exit(ret);
}
