//! `txt2xlsx_io_xlsx`:
//! XLSX writer kernel for Polars data frames.
//!
//! - `conf`   : Excel limits and default format presets
//! - `spec`   : formats/options/report models
//! - `util`   : pure helper functions
//! - `writer` : workbook writer
pub mod conf;
pub mod spec;
pub mod util;
pub mod writer;

pub use conf::{
    C_SHEET_NAME_DEFAULT, N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX,
    TUP_EXCEL_ILLEGAL, derive_default_xlsx_formats, derive_styled_xlsx_formats,
};
pub use spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecColumnRole,
    SpecScientificPolicy, SpecSheetSlice, SpecXlsxFormatSet, SpecXlsxReport, SpecXlsxValuePolicy,
    SpecXlsxWriteOptions,
};
pub use util::{
    convert_cell_value, convert_nan_inf_to_str, plan_sheet_slices, sanitize_sheet_name,
};
pub use writer::{SpecXlsxSheetWriteOptions, XlsxWriter};
