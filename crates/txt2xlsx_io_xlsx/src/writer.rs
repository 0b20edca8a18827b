//! XLSX writer kernel that renders Polars `DataFrame`s into workbook sheets.

use std::collections::BTreeSet;
use std::path::PathBuf;

use polars::prelude::{AnyValue, Column, DataFrame};
use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet, XlsxError};
use tracing::{debug, info};

use crate::conf::N_WIDTH_EXCEL_COLUMN_MAX;
use crate::spec::{
    EnumAutofitColumnsRule, EnumCellValue, SpecAutofitCellsPolicy, SpecCellFormat, SpecColumnRole,
    SpecScientificPolicy, SpecSheetSlice, SpecXlsxFormatSet, SpecXlsxReport, SpecXlsxWriteOptions,
};
use crate::util::{
    convert_cell_value, derive_slice_indices, derive_unique_sheet_name, estimate_width_len,
    plan_sheet_slices, sanitize_sheet_name, validate_unique_columns,
};

/// Rows occupied by the header (column names) on every sheet; frozen while scrolling.
const N_ROWS_HEADER: usize = 1;

/// Per-sheet call options.
#[derive(Default, Debug, Clone)]
pub struct SpecXlsxSheetWriteOptions {
    /// Override writer-level keep-missing behavior.
    pub if_keep_missing_values: Option<bool>,
    /// Column autofit policy.
    pub policy_autofit: SpecAutofitCellsPolicy,
    /// Scientific-format trigger policy.
    pub policy_scientific: SpecScientificPolicy,
}

/// Column classification, by absolute or slice-local index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct SpecColumnKinds {
    set_numeric: BTreeSet<usize>,
    set_integer: BTreeSet<usize>,
    set_scientific: BTreeSet<usize>,
}

impl SpecColumnKinds {
    fn slice(&self, sheet_slice: &SpecSheetSlice) -> Self {
        let (n_start, n_end) = (
            sheet_slice.col_start_inclusive,
            sheet_slice.col_end_exclusive,
        );
        Self {
            set_numeric: derive_slice_indices(&self.set_numeric, n_start, n_end),
            set_integer: derive_slice_indices(&self.set_integer, n_start, n_end),
            set_scientific: derive_slice_indices(&self.set_scientific, n_start, n_end),
        }
    }

    fn role(&self, n_idx_col: usize) -> SpecColumnRole {
        SpecColumnRole {
            if_numeric: self.set_numeric.contains(&n_idx_col),
            if_integer: self.set_integer.contains(&n_idx_col),
            if_scientific: self.set_scientific.contains(&n_idx_col),
        }
    }
}

struct SpecSheetRenderContext<'a> {
    colnames: &'a [String],
    formats: &'a SpecXlsxFormatSet,
    write_options: &'a SpecXlsxWriteOptions,
    sheet_options: &'a SpecXlsxSheetWriteOptions,
    if_keep_missing_values: bool,
}

/// Stateful workbook writer.
///
/// Sheets are buffered in memory; nothing touches the disk until
/// [`Self::close`] succeeds.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    formats: SpecXlsxFormatSet,
    write_options: SpecXlsxWriteOptions,
    set_sheet_names_existing: BTreeSet<String>,
    l_reports: Vec<SpecXlsxReport>,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create a writer bound to `path_file_out`.
    pub fn new(
        path_file_out: impl Into<PathBuf>,
        formats: SpecXlsxFormatSet,
        write_options: SpecXlsxWriteOptions,
    ) -> Self {
        Self {
            path_file_out: path_file_out.into(),
            workbook: Workbook::new(),
            formats,
            write_options,
            set_sheet_names_existing: BTreeSet::new(),
            l_reports: Vec::new(),
            if_closed: false,
        }
    }

    /// Snapshot of per-call write reports.
    pub fn report(&self) -> Vec<SpecXlsxReport> {
        self.l_reports.clone()
    }

    /// Flush the workbook to disk. Idempotent.
    ///
    /// A workbook with no sheets still gets one empty default sheet.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        info!(path = %self.path_file_out.display(), "workbook saved");
        Ok(())
    }

    /// Write `df` as one logical sheet (split further when it exceeds Excel limits).
    ///
    /// The first row holds the column names; no index column is emitted.
    pub fn write_sheet(
        &mut self,
        df: &DataFrame,
        sheet_name: &str,
        options: &SpecXlsxSheetWriteOptions,
    ) -> Result<(), String> {
        if self.if_closed {
            return Err("Cannot write after close().".to_string());
        }
        validate_policy_autofit(&options.policy_autofit)?;
        validate_policy_scientific(&options.policy_scientific)?;

        let l_colnames: Vec<String> = df
            .get_column_names_str()
            .into_iter()
            .map(ToString::to_string)
            .collect();
        validate_unique_columns(&l_colnames)?;

        let kinds = classify_columns(df, &options.policy_scientific)?;
        debug!(
            numeric = ?kinds.set_numeric,
            integer = ?kinds.set_integer,
            scientific = ?kinds.set_scientific,
            "classified columns"
        );

        let mut report = SpecXlsxReport::default();
        let l_sheet_parts = plan_sheet_slices(
            df.height(),
            l_colnames.len(),
            N_ROWS_HEADER,
            &sanitize_sheet_name(sheet_name, "_"),
            &mut report,
        )?;

        let ctx = SpecSheetRenderContext {
            colnames: &l_colnames,
            formats: &self.formats,
            write_options: &self.write_options,
            sheet_options: options,
            if_keep_missing_values: options
                .if_keep_missing_values
                .unwrap_or(self.write_options.keep_missing_values),
        };

        for sheet_slice in l_sheet_parts {
            let c_sheet_name = derive_unique_sheet_name(
                &sheet_slice.sheet_name,
                &mut self.set_sheet_names_existing,
            );
            let worksheet = self.workbook.add_worksheet();
            worksheet
                .set_name(&c_sheet_name)
                .map_err(derive_xlsx_error_text)?;

            write_sheet_slice(worksheet, df, &sheet_slice, &kinds.slice(&sheet_slice), &ctx)?;
            debug!(
                sheet = %c_sheet_name,
                rows = sheet_slice.height(),
                cols = sheet_slice.width(),
                "sheet written"
            );

            report.sheets.push(SpecSheetSlice {
                sheet_name: c_sheet_name,
                ..sheet_slice
            });
        }

        self.l_reports.push(report);
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SheetRendering

fn write_sheet_slice(
    worksheet: &mut Worksheet,
    df: &DataFrame,
    sheet_slice: &SpecSheetSlice,
    kinds: &SpecColumnKinds,
    ctx: &SpecSheetRenderContext<'_>,
) -> Result<(), String> {
    let n_width = sheet_slice.width();
    let n_height = sheet_slice.height();

    let l_fmt_by_col: Vec<Format> =
        plan_column_formats(n_width, kinds, ctx.formats, ctx.write_options)
            .iter()
            .map(derive_rust_xlsx_format)
            .collect();
    let fmt_header = derive_rust_xlsx_format(&ctx.formats.header);
    let mut autofit = AutofitTracker::new(n_width, &ctx.sheet_options.policy_autofit);

    let l_colnames =
        &ctx.colnames[sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive];
    for (n_idx_col, c_name) in l_colnames.iter().enumerate() {
        autofit.observe_header(n_idx_col, c_name);
        if c_name.is_empty() {
            worksheet
                .write_blank(0, cast_col_num(n_idx_col)?, &fmt_header)
                .map_err(derive_xlsx_error_text)?;
        } else {
            worksheet
                .write_string_with_format(0, cast_col_num(n_idx_col)?, c_name, &fmt_header)
                .map_err(derive_xlsx_error_text)?;
        }
    }

    worksheet
        .set_freeze_panes(cast_row_num(N_ROWS_HEADER)?, 0)
        .map_err(derive_xlsx_error_text)?;

    let l_cols: Vec<Column> = df.get_columns()
        [sheet_slice.col_start_inclusive..sheet_slice.col_end_exclusive]
        .iter()
        .map(|col| col.slice(sheet_slice.row_start_inclusive as i64, n_height))
        .collect();
    let l_roles: Vec<SpecColumnRole> = (0..n_width).map(|n_idx| kinds.role(n_idx)).collect();

    for n_row_local in 0..n_height {
        let n_row_sheet = cast_row_num(N_ROWS_HEADER + n_row_local)?;
        for (n_idx_col, col) in l_cols.iter().enumerate() {
            let value_raw = derive_cell_value_from_any_value(
                col.get(n_row_local)
                    .map_err(|err| format!("Failed to access cell value: {err}"))?,
            );
            let value = convert_cell_value(
                &value_raw,
                l_roles[n_idx_col],
                ctx.if_keep_missing_values,
                &ctx.write_options.value_policy,
            );
            autofit.observe_body(n_idx_col, &value, l_roles[n_idx_col]);
            write_cell_with_format(
                worksheet,
                n_row_sheet,
                cast_col_num(n_idx_col)?,
                &value,
                &l_fmt_by_col[n_idx_col],
            )?;
        }
        autofit.finish_row();
    }

    autofit.apply(worksheet)
}

/// Running width estimates for one sheet slice.
struct AutofitTracker<'a> {
    policy: &'a SpecAutofitCellsPolicy,
    l_width_header: Vec<usize>,
    l_width_body: Vec<usize>,
    n_rows_seen: usize,
}

impl<'a> AutofitTracker<'a> {
    fn new(n_width: usize, policy: &'a SpecAutofitCellsPolicy) -> Self {
        Self {
            policy,
            l_width_header: vec![0; n_width],
            l_width_body: vec![0; n_width],
            n_rows_seen: 0,
        }
    }

    fn if_body_sampled(&self) -> bool {
        matches!(
            self.policy.rule_columns,
            EnumAutofitColumnsRule::Body | EnumAutofitColumnsRule::All
        ) && self
            .policy
            .height_body_inferred_max
            .is_none_or(|n_max| self.n_rows_seen < n_max)
    }

    fn observe_header(&mut self, n_idx_col: usize, text: &str) {
        if matches!(
            self.policy.rule_columns,
            EnumAutofitColumnsRule::Header | EnumAutofitColumnsRule::All
        ) {
            let n_width = estimate_width_len(
                &EnumCellValue::String(text.to_string()),
                SpecColumnRole::default(),
            );
            self.l_width_header[n_idx_col] = self.l_width_header[n_idx_col].max(n_width);
        }
    }

    fn observe_body(&mut self, n_idx_col: usize, value: &EnumCellValue, role: SpecColumnRole) {
        if self.if_body_sampled() {
            let n_width = estimate_width_len(value, role);
            self.l_width_body[n_idx_col] = self.l_width_body[n_idx_col].max(n_width);
        }
    }

    fn finish_row(&mut self) {
        if self.if_body_sampled() {
            self.n_rows_seen += 1;
        }
    }

    /// Final clamped widths, or `None` when autofit is disabled.
    fn derive_widths(&self) -> Option<Vec<usize>> {
        if matches!(self.policy.rule_columns, EnumAutofitColumnsRule::None) {
            return None;
        }
        let n_min = self.policy.width_cell_min.max(1);
        let n_max = self.policy.width_cell_max.max(n_min).min(N_WIDTH_EXCEL_COLUMN_MAX);
        let widths = self
            .l_width_header
            .iter()
            .zip(&self.l_width_body)
            .map(|(n_header, n_body)| {
                ((*n_header).max(*n_body) + self.policy.width_cell_padding).clamp(n_min, n_max)
            })
            .collect();
        Some(widths)
    }

    fn apply(&self, worksheet: &mut Worksheet) -> Result<(), String> {
        let Some(l_widths) = self.derive_widths() else {
            return Ok(());
        };
        for (n_idx_col, n_width) in l_widths.into_iter().enumerate() {
            worksheet
                .set_column_width(cast_col_num(n_idx_col)?, n_width as f64)
                .map_err(derive_xlsx_error_text)?;
        }
        Ok(())
    }
}

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    let result = match value {
        EnumCellValue::None => worksheet.write_blank(row, col, format),
        EnumCellValue::String(val) => worksheet.write_string_with_format(row, col, val, format),
        EnumCellValue::Number(val) => worksheet.write_number_with_format(row, col, *val, format),
        EnumCellValue::Boolean(val) => worksheet.write_boolean_with_format(row, col, *val, format),
    };
    result.map(|_| ()).map_err(derive_xlsx_error_text)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnClassification

/// Classify columns from their dtypes; only decimal columns can turn scientific.
fn classify_columns(
    df: &DataFrame,
    policy_scientific: &SpecScientificPolicy,
) -> Result<SpecColumnKinds, String> {
    let l_cols = df.get_columns();

    let set_numeric: BTreeSet<usize> = (0..l_cols.len())
        .filter(|n_idx| l_cols[*n_idx].dtype().is_numeric())
        .collect();
    let set_integer: BTreeSet<usize> = set_numeric
        .iter()
        .copied()
        .filter(|n_idx| l_cols[*n_idx].dtype().is_integer())
        .collect();

    let mut set_scientific = BTreeSet::new();
    for n_idx in set_numeric.difference(&set_integer) {
        if is_scientific_column(&l_cols[*n_idx], policy_scientific)? {
            set_scientific.insert(*n_idx);
        }
    }

    Ok(SpecColumnKinds {
        set_numeric,
        set_integer,
        set_scientific,
    })
}

/// Whether any sampled finite value is too large or too small for fixed notation.
fn is_scientific_column(col: &Column, policy: &SpecScientificPolicy) -> Result<bool, String> {
    let n_rows_sample = policy
        .height_body_inferred_max
        .map_or(col.len(), |n_max| n_max.min(col.len()));

    for n_idx_row in 0..n_rows_sample {
        let value = col
            .get(n_idx_row)
            .map_err(|err| format!("Failed to inspect scientific trigger value: {err}"))?;
        let Some(n_value) = derive_f64_from_any_value(&value) else {
            continue;
        };
        if !n_value.is_finite() {
            continue;
        }
        let n_abs = n_value.abs();
        if n_abs >= policy.thr_max || (n_abs > 0.0 && n_abs < policy.thr_min) {
            return Ok(true);
        }
    }
    Ok(false)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatPlanning

/// Pick the body format for every column of a sheet slice.
fn plan_column_formats(
    n_width: usize,
    kinds: &SpecColumnKinds,
    formats: &SpecXlsxFormatSet,
    write_options: &SpecXlsxWriteOptions,
) -> Vec<SpecCellFormat> {
    (0..n_width)
        .map(|n_idx_col| {
            let role = kinds.role(n_idx_col);
            let fmt_base = if role.if_scientific {
                &formats.scientific
            } else if role.if_integer {
                &formats.integer
            } else if role.if_numeric {
                &formats.decimal
            } else {
                &formats.text
            };
            fmt_base.merge(&write_options.base_format_patch)
        })
        .collect()
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = &spec.font_name {
        format = format.set_font_name(val.as_str());
    }
    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }
    for val in [&spec.align, &spec.valign].into_iter().flatten() {
        if let Some(align) = derive_format_align(val) {
            format = format.set_align(align);
        }
    }
    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.as_str());
    }

    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }
    if let Some(val) = spec.top {
        format = format.set_border_top(derive_format_border(val));
    }
    if let Some(val) = spec.bottom {
        format = format.set_border_bottom(derive_format_border(val));
    }
    if let Some(val) = spec.left {
        format = format.set_border_left(derive_format_border(val));
    }
    if let Some(val) = spec.right {
        format = format.set_border_right(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    const L_BORDERS: [FormatBorder; 14] = [
        FormatBorder::None,
        FormatBorder::Thin,
        FormatBorder::Medium,
        FormatBorder::Dashed,
        FormatBorder::Dotted,
        FormatBorder::Thick,
        FormatBorder::Double,
        FormatBorder::Hair,
        FormatBorder::MediumDashed,
        FormatBorder::DashDot,
        FormatBorder::MediumDashDot,
        FormatBorder::DashDotDot,
        FormatBorder::MediumDashDotDot,
        FormatBorder::SlantDashDot,
    ];
    usize::try_from(border)
        .ok()
        .and_then(|n_idx| L_BORDERS.get(n_idx).copied())
        .unwrap_or(FormatBorder::None)
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueExtraction

fn derive_f64_from_any_value(value: &AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::UInt32(val) => Some(*val as f64),
        AnyValue::UInt64(val) => Some(*val as f64),
        AnyValue::Int32(val) => Some(*val as f64),
        AnyValue::Int64(val) => Some(*val as f64),
        AnyValue::Float32(val) => Some(*val as f64),
        AnyValue::Float64(val) => Some(*val),
        _ => None,
    }
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    if let Some(n_value) = derive_f64_from_any_value(&value) {
        return EnumCellValue::Number(n_value);
    }
    match value {
        AnyValue::Null => EnumCellValue::None,
        AnyValue::Boolean(val) => EnumCellValue::Boolean(val),
        AnyValue::String(val) => EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => EnumCellValue::String(val.to_string()),
        other => EnumCellValue::String(other.to_string()),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Validation

fn validate_policy_autofit(policy_autofit: &SpecAutofitCellsPolicy) -> Result<(), String> {
    if policy_autofit.width_cell_min == 0 {
        return Err("policy_autofit.width_cell_min must be >= 1.".to_string());
    }
    if policy_autofit.width_cell_max < policy_autofit.width_cell_min {
        return Err(
            "policy_autofit.width_cell_max must be >= policy_autofit.width_cell_min.".to_string(),
        );
    }
    Ok(())
}

fn validate_policy_scientific(policy_scientific: &SpecScientificPolicy) -> Result<(), String> {
    if policy_scientific.thr_min < 0.0 {
        return Err("policy_scientific.thr_min must be >= 0.".to_string());
    }
    if policy_scientific.thr_max <= 0.0 {
        return Err("policy_scientific.thr_max must be > 0.".to_string());
    }
    if policy_scientific.thr_min > policy_scientific.thr_max {
        return Err("policy_scientific.thr_min must be <= policy_scientific.thr_max.".to_string());
    }
    Ok(())
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
