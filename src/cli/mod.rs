//! Command-line surface of the `lzm` binary.

pub mod args;
pub mod help;

pub use args::{parse_args, parse_args_from, ParsedArgs};
