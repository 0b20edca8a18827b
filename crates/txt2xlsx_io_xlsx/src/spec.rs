//! Format, option and report models shared by the XLSX writer kernel.

use crate::conf::derive_default_xlsx_formats;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Partial cell format; `None` fields inherit from whatever it is merged onto.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font family name.
    pub font_name: Option<String>,
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment (`left`, `center`, ...).
    pub align: Option<String>,
    /// Vertical alignment (`top`, `vcenter`, ...).
    pub valign: Option<String>,

    /// Border style for all sides.
    pub border: Option<i64>,
    /// Top border override.
    pub top: Option<i64>,
    /// Bottom border override.
    pub bottom: Option<i64>,
    /// Left border override.
    pub left: Option<i64>,
    /// Right border override.
    pub right: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats; non-`None` fields of `other` win.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        fn pick<T: Clone>(lhs: &Option<T>, rhs: &Option<T>) -> Option<T> {
            rhs.as_ref().or(lhs.as_ref()).cloned()
        }

        SpecCellFormat {
            font_name: pick(&self.font_name, &other.font_name),
            font_size: pick(&self.font_size, &other.font_size),
            bold: pick(&self.bold, &other.bold),
            align: pick(&self.align, &other.align),
            valign: pick(&self.valign, &other.valign),
            border: pick(&self.border, &other.border),
            top: pick(&self.top, &other.top),
            bottom: pick(&self.bottom, &other.bottom),
            left: pick(&self.left, &other.left),
            right: pick(&self.right, &other.right),
            num_format: pick(&self.num_format, &other.num_format),
        }
    }
}

/// Named presets the writer picks from per column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxFormatSet {
    /// Header row cells.
    pub header: SpecCellFormat,
    /// Text body columns.
    pub text: SpecCellFormat,
    /// Integer body columns.
    pub integer: SpecCellFormat,
    /// Decimal body columns.
    pub decimal: SpecCellFormat,
    /// Decimal columns switched to scientific notation.
    pub scientific: SpecCellFormat,
}

impl Default for SpecXlsxFormatSet {
    fn default() -> Self {
        derive_default_xlsx_formats()
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellValues

/// Normalized cell value handed to the worksheet.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
    /// Boolean value.
    Boolean(bool),
}

/// How a column is classified for value conversion and formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpecColumnRole {
    /// Column holds numbers (integer or decimal).
    pub if_numeric: bool,
    /// Column holds integers only.
    pub if_integer: bool,
    /// Column is rendered in scientific notation.
    pub if_scientific: bool,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WriteOptions

/// Replacement texts for non-finite values and for kept missing values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxValuePolicy {
    /// Replacement text for a null cell.
    pub missing_value_str: String,
    /// Replacement text for NaN.
    pub nan_str: String,
    /// Replacement text for positive infinity.
    pub posinf_str: String,
    /// Replacement text for negative infinity.
    pub neginf_str: String,
}

impl Default for SpecXlsxValuePolicy {
    fn default() -> Self {
        Self {
            missing_value_str: "NA".to_string(),
            nan_str: "NaN".to_string(),
            posinf_str: "inf".to_string(),
            neginf_str: "-inf".to_string(),
        }
    }
}

/// When a decimal column switches to the scientific format.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecScientificPolicy {
    /// Non-zero absolute values below this trigger scientific.
    pub thr_min: f64,
    /// Absolute values at or above this trigger scientific.
    pub thr_max: f64,
    /// Max body rows inspected; `None` inspects all.
    pub height_body_inferred_max: Option<usize>,
}

impl Default for SpecScientificPolicy {
    fn default() -> Self {
        Self {
            thr_min: 0.0001,
            thr_max: 1_000_000_000_000.0,
            height_body_inferred_max: Some(20_000),
        }
    }
}

/// Autofit rule for column width inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnumAutofitColumnsRule {
    /// Keep Excel default widths.
    None,
    /// Header text only.
    #[default]
    Header,
    /// Body cells only.
    Body,
    /// Header and body cells.
    All,
}

/// Column width inference settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecAutofitCellsPolicy {
    /// Which cells feed the width estimate.
    pub rule_columns: EnumAutofitColumnsRule,
    /// Max body rows inspected; `None` inspects all.
    pub height_body_inferred_max: Option<usize>,
    /// Minimum final width.
    pub width_cell_min: usize,
    /// Maximum final width.
    pub width_cell_max: usize,
    /// Width padding added after inference.
    pub width_cell_padding: usize,
}

impl Default for SpecAutofitCellsPolicy {
    fn default() -> Self {
        Self {
            rule_columns: EnumAutofitColumnsRule::Header,
            height_body_inferred_max: Some(20_000),
            width_cell_min: 8,
            width_cell_max: 60,
            width_cell_padding: 2,
        }
    }
}

/// Writer-wide options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecXlsxWriteOptions {
    /// Replacement texts for missing/non-finite values.
    pub value_policy: SpecXlsxValuePolicy,
    /// Render missing/NaN as text instead of blank cells.
    pub keep_missing_values: bool,
    /// Patch merged onto every body column format.
    pub base_format_patch: SpecCellFormat,
}

impl Default for SpecXlsxWriteOptions {
    fn default() -> Self {
        Self {
            value_policy: SpecXlsxValuePolicy::default(),
            keep_missing_values: false,
            base_format_patch: SpecCellFormat::default(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Concrete worksheet emitted for a (possibly split) table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetSlice {
    /// Actual unique sheet name in the workbook.
    pub sheet_name: String,
    /// Inclusive source row start.
    pub row_start_inclusive: usize,
    /// Exclusive source row end.
    pub row_end_exclusive: usize,
    /// Inclusive source column start.
    pub col_start_inclusive: usize,
    /// Exclusive source column end.
    pub col_end_exclusive: usize,
}

impl SpecSheetSlice {
    /// Number of data rows (header excluded) in this slice.
    pub fn height(&self) -> usize {
        self.row_end_exclusive - self.row_start_inclusive
    }

    /// Number of columns in this slice.
    pub fn width(&self) -> usize {
        self.col_end_exclusive - self.col_start_inclusive
    }
}

/// Outcome of one `write_sheet` call.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheets produced by the call.
    pub sheets: Vec<SpecSheetSlice>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Record a warning message and log it.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        tracing::warn!("{}", msg.as_ref());
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
