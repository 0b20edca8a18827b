//! Stateless helpers used by the XLSX writer kernel.

use std::collections::{BTreeMap, BTreeSet};

use crate::conf::{
    N_LEN_EXCEL_SHEET_NAME_MAX, N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{
    EnumCellValue, SpecColumnRole, SpecSheetSlice, SpecXlsxReport, SpecXlsxValuePolicy,
};

////////////////////////////////////////////////////////////////////////////////
// #region CellValueConversion

/// Convert `NaN`/`Inf` to policy text; finite values are an error.
pub fn convert_nan_inf_to_str(
    x: f64,
    value_policy: &SpecXlsxValuePolicy,
) -> Result<String, String> {
    if x.is_nan() {
        Ok(value_policy.nan_str.clone())
    } else if x == f64::INFINITY {
        Ok(value_policy.posinf_str.clone())
    } else if x == f64::NEG_INFINITY {
        Ok(value_policy.neginf_str.clone())
    } else {
        Err(format!("Value {x} is neither NaN nor Inf."))
    }
}

/// Infinities are always written as policy text; NaN is a missing value.
fn derive_non_finite_cell(
    x: f64,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    if x.is_nan() && !if_keep_missing_values {
        return EnumCellValue::None;
    }
    convert_nan_inf_to_str(x, value_policy).map_or(EnumCellValue::None, EnumCellValue::String)
}

fn derive_numeric_cell(x: f64, role: SpecColumnRole) -> EnumCellValue {
    // Integer columns never silently round.
    if role.if_integer && x.fract() != 0.0 {
        EnumCellValue::String(x.to_string())
    } else {
        EnumCellValue::Number(x)
    }
}

/// Normalize one raw cell according to its column role and the value policy.
///
/// - blanks and NaN stay blank unless `if_keep_missing_values` is set;
/// - infinities become `inf`/`-inf` text (per the value policy);
/// - numeric columns get numbers, with numeric-looking text parsed;
/// - text columns get text, with stray numbers stringified;
/// - booleans pass through.
pub fn convert_cell_value(
    value: &EnumCellValue,
    role: SpecColumnRole,
    if_keep_missing_values: bool,
    value_policy: &SpecXlsxValuePolicy,
) -> EnumCellValue {
    match value {
        EnumCellValue::None if if_keep_missing_values => {
            EnumCellValue::String(value_policy.missing_value_str.clone())
        }
        EnumCellValue::None => EnumCellValue::None,
        EnumCellValue::Boolean(val) => EnumCellValue::Boolean(*val),
        EnumCellValue::Number(val) if !role.if_numeric => EnumCellValue::String(val.to_string()),
        EnumCellValue::Number(val) if !val.is_finite() => {
            derive_non_finite_cell(*val, if_keep_missing_values, value_policy)
        }
        EnumCellValue::Number(val) => derive_numeric_cell(*val, role),
        EnumCellValue::String(text) if !role.if_numeric => EnumCellValue::String(text.clone()),
        EnumCellValue::String(text) => {
            if role.if_integer {
                return match text.trim().parse::<i64>() {
                    Ok(val) => EnumCellValue::Number(val as f64),
                    Err(_) => EnumCellValue::String(text.clone()),
                };
            }
            match text.trim().parse::<f64>() {
                Ok(val) if val.is_finite() => EnumCellValue::Number(val),
                Ok(val) => derive_non_finite_cell(val, if_keep_missing_values, value_policy),
                Err(_) => EnumCellValue::String(text.clone()),
            }
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ColumnChecks

/// Validate that `columns` has no duplicated names.
pub fn validate_unique_columns(columns: &[String]) -> Result<(), String> {
    let mut dict_pos: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (n_idx, c_name) in columns.iter().enumerate() {
        dict_pos.entry(c_name.as_str()).or_default().push(n_idx);
    }
    if dict_pos.len() == columns.len() {
        return Ok(());
    }

    let c_msg = dict_pos
        .iter()
        .filter(|(_, l_pos)| l_pos.len() > 1)
        .map(|(c_name, l_pos)| format!("{c_name:?} x{} at indices {l_pos:?}", l_pos.len()))
        .collect::<Vec<_>>()
        .join("; ");
    Err(format!("Duplicate column names detected: {c_msg}"))
}

/// Shift absolute column indices into a `[start, end)` window.
pub fn derive_slice_indices(
    indices: &BTreeSet<usize>,
    col_start_inclusive: usize,
    col_end_exclusive: usize,
) -> BTreeSet<usize> {
    indices
        .range(col_start_inclusive..col_end_exclusive)
        .map(|n_idx| n_idx - col_start_inclusive)
        .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetNaming

/// Replace invalid characters and trim to a valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let c_name = TUP_EXCEL_ILLEGAL
        .iter()
        .fold(name.to_string(), |acc, c_illegal| acc.replace(c_illegal, replace_to));
    let c_name = c_name.trim();
    if c_name.is_empty() {
        return "Sheet".to_string();
    }
    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Suffixed part name (`base_1`, `base_2`, ...) within the length cap.
pub fn create_sheet_identifier(base_name: &str, part_idx_1based: usize) -> String {
    let c_suffix = format!("_{part_idx_1based}");
    let n_len_base_max = usize::max(1, N_LEN_EXCEL_SHEET_NAME_MAX.saturating_sub(c_suffix.len()));
    let c_base: String = base_name.chars().take(n_len_base_max).collect();
    format!("{c_base}{c_suffix}")
}

/// Claim `name` in `set_names_taken`, appending `__2`, `__3`, ... on collision.
pub fn derive_unique_sheet_name(name: &str, set_names_taken: &mut BTreeSet<String>) -> String {
    if set_names_taken.insert(name.to_string()) {
        return name.to_string();
    }

    let c_base: String = name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX - 3).collect();
    (2usize..)
        .map(|n_idx| {
            format!("{c_base}__{n_idx}")
                .chars()
                .take(N_LEN_EXCEL_SHEET_NAME_MAX)
                .collect::<String>()
        })
        .find(|candidate| set_names_taken.insert(candidate.clone()))
        .unwrap_or_else(|| name.to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSlicing

fn split_span(n_total: usize, n_step: usize) -> Vec<(usize, usize)> {
    let mut l_spans: Vec<(usize, usize)> = (0..n_total)
        .step_by(n_step)
        .map(|n_start| (n_start, usize::min(n_total, n_start + n_step)))
        .collect();
    if l_spans.is_empty() {
        l_spans.push((0, 0));
    }
    l_spans
}

/// Split a `height_df x width_df` table into Excel-compliant sheet slices.
///
/// Columns are split first, then rows. A table that fits produces one slice
/// named `sheet_name`; otherwise parts are suffixed and a warning recorded.
pub fn plan_sheet_slices(
    height_df: usize,
    width_df: usize,
    height_header: usize,
    sheet_name: &str,
    report: &mut SpecXlsxReport,
) -> Result<Vec<SpecSheetSlice>, String> {
    if height_header == 0 {
        return Err("height_header must be >= 1.".to_string());
    }
    let n_rows_data_max = N_NROWS_EXCEL_MAX.saturating_sub(height_header);
    if n_rows_data_max == 0 {
        return Err(format!(
            "Header too tall: height_header={height_header} exceeds Excel limit."
        ));
    }

    let l_col_spans = split_span(width_df, N_NCOLS_EXCEL_MAX);
    let l_row_spans = split_span(height_df, n_rows_data_max);
    let n_parts_total = l_col_spans.len() * l_row_spans.len();

    let l_sheet_parts: Vec<SpecSheetSlice> = l_col_spans
        .iter()
        .flat_map(|col_span| l_row_spans.iter().map(move |row_span| (*col_span, *row_span)))
        .enumerate()
        .map(|(n_idx_part, ((col_start, col_end), (row_start, row_end)))| SpecSheetSlice {
            sheet_name: if n_parts_total == 1 {
                sheet_name.to_string()
            } else {
                create_sheet_identifier(sheet_name, n_idx_part + 1)
            },
            row_start_inclusive: row_start,
            row_end_exclusive: row_end,
            col_start_inclusive: col_start,
            col_end_exclusive: col_end,
        })
        .collect();

    if n_parts_total > 1 {
        report.warn(format!(
            "Excel limit overflow: split into {n_parts_total} sheets (columns-first, then rows)."
        ));
    }

    Ok(l_sheet_parts)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region WidthEstimation

/// Display width of text, counting non-ASCII characters as 1.6 units.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let (n_ascii, n_non_ascii) = s.chars().fold((0usize, 0usize), |(a, b), chr| {
        if chr.is_ascii() { (a + 1, b) } else { (a, b + 1) }
    });
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

/// Estimate displayed width units for one normalized cell value.
pub fn estimate_width_len(value: &EnumCellValue, role: SpecColumnRole) -> usize {
    match value {
        EnumCellValue::None => 0,
        EnumCellValue::Boolean(val) => {
            if *val {
                4
            } else {
                5
            }
        }
        EnumCellValue::String(text) => estimate_unicode_string_width(text),
        EnumCellValue::Number(val) if !role.if_numeric => {
            estimate_unicode_string_width(&val.to_string())
        }
        EnumCellValue::Number(val) if role.if_scientific => format!("{val:.2E}").len(),
        EnumCellValue::Number(val) if role.if_integer => (*val as i64).to_string().len(),
        EnumCellValue::Number(val) => format!("{val:.4}").len(),
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    fn role(if_numeric: bool, if_integer: bool) -> SpecColumnRole {
        SpecColumnRole {
            if_numeric,
            if_integer,
            if_scientific: false,
        }
    }

    #[test]
    fn convert_cell_value_blanks_missing_unless_kept() {
        let policy = SpecXlsxValuePolicy::default();
        assert_eq!(
            convert_cell_value(&EnumCellValue::None, role(true, false), false, &policy),
            EnumCellValue::None
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::None, role(true, false), true, &policy),
            EnumCellValue::String("NA".to_string())
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::Number(f64::NEG_INFINITY),
                role(true, false),
                true,
                &policy
            ),
            EnumCellValue::String("-inf".to_string())
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::Number(f64::INFINITY),
                role(true, false),
                false,
                &policy
            ),
            EnumCellValue::String("inf".to_string())
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::String("-inf".to_string()),
                role(true, false),
                false,
                &policy
            ),
            EnumCellValue::String("-inf".to_string())
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::Number(f64::NAN),
                role(true, false),
                false,
                &policy
            ),
            EnumCellValue::None
        );
    }

    #[test]
    fn convert_cell_value_respects_column_role() {
        let policy = SpecXlsxValuePolicy::default();
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(2.5), role(false, false), false, &policy),
            EnumCellValue::String("2.5".to_string())
        );
        assert_eq!(
            convert_cell_value(&EnumCellValue::Number(2.5), role(true, true), false, &policy),
            EnumCellValue::String("2.5".to_string())
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::String(" 42 ".to_string()),
                role(true, true),
                false,
                &policy
            ),
            EnumCellValue::Number(42.0)
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::String("1e-3".to_string()),
                role(true, false),
                false,
                &policy
            ),
            EnumCellValue::Number(0.001)
        );
        assert_eq!(
            convert_cell_value(
                &EnumCellValue::String("abc".to_string()),
                role(true, false),
                false,
                &policy
            ),
            EnumCellValue::String("abc".to_string())
        );
    }

    #[test]
    fn convert_nan_inf_to_str_rejects_finite() {
        let policy = SpecXlsxValuePolicy::default();
        assert_eq!(convert_nan_inf_to_str(f64::NAN, &policy), Ok("NaN".to_string()));
        assert_eq!(
            convert_nan_inf_to_str(f64::INFINITY, &policy),
            Ok("inf".to_string())
        );
        assert!(convert_nan_inf_to_str(1.0, &policy).is_err());
    }

    #[test]
    fn validate_unique_columns_reports_positions() {
        let cols = vec!["A".to_string(), "B".to_string(), "A".to_string()];
        let err = validate_unique_columns(&cols).unwrap_err();
        assert!(err.contains("\"A\" x2 at indices [0, 2]"), "{err}");
        assert!(validate_unique_columns(&cols[..2]).is_ok());
    }

    #[test]
    fn sanitize_sheet_name_replaces_illegal_chars_and_truncates() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("  [*]  ", ""), "Sheet");
        assert_eq!(sanitize_sheet_name(&"x".repeat(40), "_").len(), 31);
    }

    #[test]
    fn derive_unique_sheet_name_appends_counter() {
        let mut set_taken = BTreeSet::new();
        assert_eq!(derive_unique_sheet_name("Sheet1", &mut set_taken), "Sheet1");
        assert_eq!(derive_unique_sheet_name("Sheet1", &mut set_taken), "Sheet1__2");
        assert_eq!(derive_unique_sheet_name("Sheet1", &mut set_taken), "Sheet1__3");
    }

    #[test]
    fn plan_sheet_slices_single_and_empty() {
        let mut report = SpecXlsxReport::default();
        let l_parts = plan_sheet_slices(0, 0, 1, "Sheet1", &mut report).unwrap();
        assert_eq!(l_parts.len(), 1);
        assert_eq!(l_parts[0].sheet_name, "Sheet1");
        assert_eq!(l_parts[0].height(), 0);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn plan_sheet_slices_splits_columns_then_rows() {
        let mut report = SpecXlsxReport::default();
        let l_parts =
            plan_sheet_slices(N_NROWS_EXCEL_MAX, N_NCOLS_EXCEL_MAX + 1, 1, "T", &mut report)
                .unwrap();

        assert_eq!(l_parts.len(), 4);
        assert_eq!(l_parts[0].sheet_name, "T_1");
        assert_eq!(l_parts[0].width(), N_NCOLS_EXCEL_MAX);
        assert_eq!(l_parts[0].height(), N_NROWS_EXCEL_MAX - 1);
        assert_eq!(l_parts[1].row_start_inclusive, N_NROWS_EXCEL_MAX - 1);
        assert_eq!(l_parts[1].height(), 1);
        assert_eq!(l_parts[2].col_start_inclusive, N_NCOLS_EXCEL_MAX);
        assert_eq!(l_parts[3].sheet_name, "T_4");
        assert_eq!(report.warnings.len(), 1);
    }

    #[test]
    fn plan_sheet_slices_rejects_zero_header() {
        let mut report = SpecXlsxReport::default();
        assert!(plan_sheet_slices(1, 1, 0, "S", &mut report).is_err());
    }

    #[test]
    fn estimate_width_len_counts_text_and_numbers() {
        assert_eq!(estimate_unicode_string_width("abc"), 3);
        assert_eq!(estimate_unicode_string_width("温度"), 3);
        let r_int = role(true, true);
        assert_eq!(estimate_width_len(&EnumCellValue::Number(1234.0), r_int), 4);
        assert_eq!(
            estimate_width_len(&EnumCellValue::Number(1.5), role(true, false)),
            6
        );
    }
}
