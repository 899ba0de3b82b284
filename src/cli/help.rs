//! Usage text for the `lzm` binary.

pub fn print_usage() {
    println!("usage: lzm [options] <files...>");
    println!("\t-0\t\tno compression");
    println!("\t-1\t\tfast compression");
    println!("\t-2 .. -6\thigh compression");
    println!("\t-c\t\twrite output to stdout");
    println!("\t-b <tests>\tbenchmark mode");
    println!("\t-d\t\tdecompress file");
    println!("\t-f\t\toverwrite output file");
    println!("\t-k\t\tkeep input file");
    println!("\t-r\t\trecurse into directories");
    println!("\t-t\t\ttest compressed file");
    println!("\t-v\t\tbe verbose");
    println!("\t-h\t\tthis help message");
    println!("\t-x <size>\tchunk size for compression (KB)");
}
