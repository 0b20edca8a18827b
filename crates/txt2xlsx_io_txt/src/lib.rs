//! `txt2xlsx_io_txt`:
//! Whitespace-delimited text table reader.
//!
//! - `conf`   : NA markers and literal tables
//! - `spec`   : options, column kinds and errors
//! - `util`   : tokenizing and dtype inference helpers
//! - `reader` : text → Polars `DataFrame`
pub mod conf;
pub mod reader;
pub mod spec;
pub mod util;

pub use reader::{parse_txt_table, read_txt_table};
pub use spec::{EnumColumnKind, ReadTxtError, SpecTxtReadOptions};
