//! Conversion options, run report and top-level error type.

use std::fmt;
use std::path::PathBuf;

use txt2xlsx_io_txt::{ReadTxtError, SpecTxtReadOptions};
use txt2xlsx_io_xlsx::{
    C_SHEET_NAME_DEFAULT, SpecSheetSlice, SpecXlsxFormatSet, SpecXlsxSheetWriteOptions,
    SpecXlsxWriteOptions,
};

/// Everything [`crate::convert::convert_txt_to_xlsx`] can be tuned with.
#[derive(Debug, Clone)]
pub struct SpecConvertOptions {
    /// Text parsing options.
    pub read_options: SpecTxtReadOptions,
    /// Cell format presets.
    pub formats: SpecXlsxFormatSet,
    /// Workbook-wide write options.
    pub write_options: SpecXlsxWriteOptions,
    /// Per-sheet write options.
    pub sheet_options: SpecXlsxSheetWriteOptions,
    /// Name of the (first) output sheet.
    pub sheet_name: String,
}

impl Default for SpecConvertOptions {
    fn default() -> Self {
        Self {
            read_options: SpecTxtReadOptions::default(),
            formats: SpecXlsxFormatSet::default(),
            write_options: SpecXlsxWriteOptions::default(),
            sheet_options: SpecXlsxSheetWriteOptions::default(),
            sheet_name: C_SHEET_NAME_DEFAULT.to_string(),
        }
    }
}

/// Summary of one conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportConvert {
    /// Input text file.
    pub path_file_in: PathBuf,
    /// Written workbook.
    pub path_file_out: PathBuf,
    /// Data rows read (header excluded).
    pub height: usize,
    /// Columns read.
    pub width: usize,
    /// Sheets written (more than one only past Excel limits).
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings from the writer.
    pub warnings: Vec<String>,
}

/// Conversion failure.
#[derive(Debug)]
pub enum ConvertError {
    /// Reading or parsing the text table failed.
    Read(ReadTxtError),
    /// Building or saving the workbook failed.
    Write(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read(_) => write!(f, "Failed to read text table"),
            Self::Write(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ConvertError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read(err) => Some(err),
            Self::Write(_) => None,
        }
    }
}

impl From<ReadTxtError> for ConvertError {
    fn from(err: ReadTxtError) -> Self {
        Self::Read(err)
    }
}
