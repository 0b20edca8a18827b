//! XLSX limits and default format presets.

use crate::spec::{SpecCellFormat, SpecXlsxFormatSet};

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];
/// Upper bound Excel accepts for a column width.
pub const N_WIDTH_EXCEL_COLUMN_MAX: usize = 255;

/// Sheet name used when the caller does not pick one.
pub const C_SHEET_NAME_DEFAULT: &str = "Sheet1";

/// Build the default format set used by [`crate::writer::XlsxWriter`].
///
/// Only the header is styled (bold, thin border, centered, top aligned);
/// body cells keep Excel's General format so numbers show as stored.
pub fn derive_default_xlsx_formats() -> SpecXlsxFormatSet {
    SpecXlsxFormatSet {
        header: SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            align: Some("center".to_string()),
            valign: Some("top".to_string()),
            ..Default::default()
        },
        text: SpecCellFormat::default(),
        integer: SpecCellFormat::default(),
        decimal: SpecCellFormat::default(),
        scientific: SpecCellFormat::default(),
    }
}

/// Report-style presets: one font, fixed number formats per column kind.
///
/// Decimals are shown with four places and scientific columns as `0.00E+0`,
/// so displayed values may be rounded; pass this set explicitly to opt in.
pub fn derive_styled_xlsx_formats() -> SpecXlsxFormatSet {
    let fmt_base = SpecCellFormat {
        font_name: Some("Times New Roman".to_string()),
        font_size: Some(11),
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    SpecXlsxFormatSet {
        header: fmt_base.with_(SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            align: Some("center".to_string()),
            ..Default::default()
        }),
        integer: fmt_base.with_(SpecCellFormat {
            num_format: Some("0".to_string()),
            ..Default::default()
        }),
        decimal: fmt_base.with_(SpecCellFormat {
            num_format: Some("0.0000".to_string()),
            ..Default::default()
        }),
        scientific: fmt_base.with_(SpecCellFormat {
            num_format: Some("0.00E+0".to_string()),
            ..Default::default()
        }),
        text: fmt_base,
    }
}
