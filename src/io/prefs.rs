//! Tool preferences and the global notification level.

use std::sync::atomic::{AtomicI32, Ordering};

use crate::container::CHUNK_SIZE_DEFAULT;
use crate::engine::{FORMAT_1, LEVEL_DEFAULT};

/// Default number of benchmark test rounds.
pub const BENCH_TESTS_DEFAULT: u32 = 10;

// ---------------------------------------------------------------------------
// Notification level
// ---------------------------------------------------------------------------

/// Global notification level.  0 = silent, 1 = errors only, 2 = results and
/// warnings, 3+ = verbose detail.
pub static DISPLAY_LEVEL: AtomicI32 = AtomicI32::new(1);

pub fn set_notification_level(level: i32) {
    DISPLAY_LEVEL.store(level, Ordering::Relaxed);
}

pub fn notification_level() -> i32 {
    DISPLAY_LEVEL.load(Ordering::Relaxed)
}

/// Print to stderr when the notification level is at least `$level`.
#[macro_export]
macro_rules! displaylevel {
    ($level:expr, $($arg:tt)*) => {
        if $crate::io::prefs::notification_level() >= $level {
            eprint!($($arg)*);
        }
    };
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

/// All tunable parameters for one tool invocation.
#[derive(Debug, Clone)]
pub struct Prefs {
    pub format: u32,
    /// Requested level; the sentinel [`LEVEL_DEFAULT`] resolves inside the
    /// engine.
    pub level: u32,
    /// Chunk size in bytes.
    pub chunk_size: u32,
    pub compress: bool,
    /// Write to stdout instead of a derived filename.
    pub console: bool,
    /// Overwrite existing output files.
    pub clobber: bool,
    pub recurse: bool,
    /// Keep the input file after successful processing.
    pub keep_input: bool,
    pub benchmark: bool,
    /// Decode without writing output.
    pub test: bool,
    pub bench_tests: u32,
}

impl Default for Prefs {
    fn default() -> Self {
        Prefs {
            format: FORMAT_1,
            level: LEVEL_DEFAULT,
            chunk_size: CHUNK_SIZE_DEFAULT,
            compress: true,
            console: false,
            clobber: false,
            recurse: false,
            keep_input: false,
            benchmark: false,
            test: false,
            bench_tests: BENCH_TESTS_DEFAULT,
        }
    }
}
