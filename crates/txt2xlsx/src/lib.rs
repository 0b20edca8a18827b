//! `txt2xlsx`:
//! Convert a whitespace-delimited text table into a one-sheet XLSX workbook.
//!
//! - `conf`    : default paths and logging filter
//! - `spec`    : options, report and errors
//! - `convert` : read → write orchestration
pub mod conf;
pub mod convert;
pub mod spec;

pub use convert::convert_txt_to_xlsx;
pub use spec::{ConvertError, ReportConvert, SpecConvertOptions};
