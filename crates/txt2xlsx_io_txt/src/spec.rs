//! Reader options, column kinds and top-level error types.

use std::fmt;
use std::io;
use std::path::PathBuf;

use crate::conf::TUP_NA_VALUES_DEFAULT;

////////////////////////////////////////////////////////////////////////////////
// #region Options

/// Input options for [`crate::reader::read_txt_table`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecTxtReadOptions {
    /// Tokens treated as missing values.
    pub na_values: Vec<String>,
    /// Infer integer/decimal/boolean columns; when off every column is text.
    pub if_infer_dtypes: bool,
    /// Rename repeated header names to `name.1`, `name.2`, ...
    pub if_mangle_dupe_cols: bool,
}

impl Default for SpecTxtReadOptions {
    fn default() -> Self {
        Self {
            na_values: TUP_NA_VALUES_DEFAULT.iter().map(ToString::to_string).collect(),
            if_infer_dtypes: true,
            if_mangle_dupe_cols: true,
        }
    }
}

/// Dtype chosen for one parsed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumColumnKind {
    /// Every present token is a 64-bit integer.
    Integer,
    /// Every present token is a float.
    Decimal,
    /// Every present token is a boolean literal.
    Boolean,
    /// Anything else, including all-missing columns.
    Text,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures that abort reading a text table.
#[derive(Debug)]
pub enum ReadTxtError {
    /// The input file could not be opened.
    Open {
        /// Input path.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
    /// Reading a line failed.
    Read {
        /// 1-based line number.
        line: usize,
        /// Underlying IO error.
        source: io::Error,
    },
    /// A line is not valid UTF-8.
    Utf8 {
        /// 1-based line number.
        line: usize,
    },
    /// A data line has more fields than the header.
    RaggedRow {
        /// 1-based line number.
        line: usize,
        /// Header width.
        expected: usize,
        /// Fields found on the line.
        found: usize,
    },
    /// A quoted field is still open at the end of its line.
    UnclosedQuote {
        /// 1-based line number.
        line: usize,
    },
    /// Assembling the data frame failed.
    Frame(String),
}

impl fmt::Display for ReadTxtError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open { path, source } => {
                write!(f, "Failed to open {}: {source}", path.display())
            }
            Self::Read { line, source } => write!(f, "Failed to read line {line}: {source}"),
            Self::Utf8 { line } => write!(f, "Line {line} is not valid UTF-8"),
            Self::RaggedRow {
                line,
                expected,
                found,
            } => write!(f, "Expected {expected} fields in line {line}, saw {found}"),
            Self::UnclosedQuote { line } => write!(f, "Unclosed quote in line {line}"),
            Self::Frame(msg) => write!(f, "Failed to build table: {msg}"),
        }
    }
}

impl std::error::Error for ReadTxtError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open { source, .. } | Self::Read { source, .. } => Some(source),
            _ => None,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
