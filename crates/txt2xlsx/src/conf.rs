//! Defaults for the conversion binary.

/// Input read when no path is given on the command line.
pub const C_PATH_FILE_IN_DEFAULT: &str = "004.PIMC off 3db setup down 1 time 60s.txt";
/// Workbook written when no path is given on the command line.
pub const C_PATH_FILE_OUT_DEFAULT: &str = "output.xlsx";
/// `tracing` filter used when `RUST_LOG` is unset.
pub const C_LOG_FILTER_DEFAULT: &str = "info";
