//! Whitespace-delimited text → Polars `DataFrame`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use polars::prelude::{Column, DataFrame, PlSmallStr};
use tracing::{debug, info};

use crate::spec::{EnumColumnKind, ReadTxtError, SpecTxtReadOptions};
use crate::util::{
    infer_column_kind, is_na_token, mangle_duplicate_names, parse_bool_token, parse_float_token,
    parse_int_token, split_fields,
};

const C_UTF8_BOM: char = '\u{feff}';

/// Read a whitespace-delimited text file into a data frame.
///
/// The first non-blank line names the columns; every later non-blank line is
/// one row. The file is opened before anything else happens, so a missing
/// input fails without side effects.
pub fn read_txt_table(
    path_file_in: impl AsRef<Path>,
    options: &SpecTxtReadOptions,
) -> Result<DataFrame, ReadTxtError> {
    let path_file_in = path_file_in.as_ref();
    let file = File::open(path_file_in).map_err(|source| ReadTxtError::Open {
        path: path_file_in.to_path_buf(),
        source,
    })?;

    let df = parse_txt_table(BufReader::new(file), options)?;
    info!(
        path = %path_file_in.display(),
        rows = df.height(),
        cols = df.width(),
        "text table read"
    );
    Ok(df)
}

/// Parse whitespace-delimited text from any buffered reader.
///
/// - blank lines are skipped;
/// - short rows are padded with nulls on the right;
/// - a row longer than the header is a [`ReadTxtError::RaggedRow`];
/// - no header at all yields an empty (0 x 0) frame.
pub fn parse_txt_table<R: BufRead>(
    reader: R,
    options: &SpecTxtReadOptions,
) -> Result<DataFrame, ReadTxtError> {
    let mut l_header: Option<Vec<String>> = None;
    let mut l_cells_by_col: Vec<Vec<Option<String>>> = Vec::new();

    for (n_idx_line, line) in reader.lines().enumerate() {
        let n_line = n_idx_line + 1;
        let line = line.map_err(|source| derive_read_error(n_line, source))?;
        let c_line = if n_idx_line == 0 {
            line.trim_start_matches(C_UTF8_BOM)
        } else {
            line.as_str()
        };

        let Some(l_fields) = split_fields(c_line) else {
            return Err(ReadTxtError::UnclosedQuote { line: n_line });
        };
        if l_fields.is_empty() {
            continue;
        }

        let Some(header) = &l_header else {
            l_cells_by_col = vec![Vec::new(); l_fields.len()];
            l_header = Some(l_fields);
            continue;
        };

        if l_fields.len() > header.len() {
            return Err(ReadTxtError::RaggedRow {
                line: n_line,
                expected: header.len(),
                found: l_fields.len(),
            });
        }
        let mut l_tokens = l_fields.into_iter();
        for cells in l_cells_by_col.iter_mut() {
            let cell = l_tokens
                .next()
                .filter(|token| !is_na_token(token, &options.na_values));
            cells.push(cell);
        }
    }

    let Some(header) = l_header else {
        debug!("no header line found; returning empty table");
        return Ok(DataFrame::empty());
    };
    build_frame(header, l_cells_by_col, options)
}

fn derive_read_error(n_line: usize, source: io::Error) -> ReadTxtError {
    if source.kind() == io::ErrorKind::InvalidData {
        ReadTxtError::Utf8 { line: n_line }
    } else {
        ReadTxtError::Read {
            line: n_line,
            source,
        }
    }
}

fn build_frame(
    header: Vec<String>,
    l_cells_by_col: Vec<Vec<Option<String>>>,
    options: &SpecTxtReadOptions,
) -> Result<DataFrame, ReadTxtError> {
    let l_names = if options.if_mangle_dupe_cols {
        mangle_duplicate_names(&header)
    } else {
        header
    };

    let l_columns: Vec<Column> = l_names
        .iter()
        .zip(&l_cells_by_col)
        .map(|(c_name, cells)| {
            let kind = if options.if_infer_dtypes {
                infer_column_kind(cells)
            } else {
                EnumColumnKind::Text
            };
            debug!(column = %c_name, ?kind, "inferred column kind");
            build_column(PlSmallStr::from(c_name.as_str()), cells, kind)
        })
        .collect();

    DataFrame::new(l_columns).map_err(|err| ReadTxtError::Frame(err.to_string()))
}

fn build_column(name: PlSmallStr, cells: &[Option<String>], kind: EnumColumnKind) -> Column {
    let tokens = cells.iter().map(|cell| cell.as_deref());
    match kind {
        EnumColumnKind::Integer => Column::new(
            name,
            tokens
                .map(|token| token.and_then(parse_int_token))
                .collect::<Vec<Option<i64>>>(),
        ),
        EnumColumnKind::Decimal => Column::new(
            name,
            tokens
                .map(|token| token.and_then(parse_float_token))
                .collect::<Vec<Option<f64>>>(),
        ),
        EnumColumnKind::Boolean => Column::new(
            name,
            tokens
                .map(|token| token.and_then(parse_bool_token))
                .collect::<Vec<Option<bool>>>(),
        ),
        EnumColumnKind::Text => Column::new(name, tokens.collect::<Vec<Option<&str>>>()),
    }
}

#[cfg(test)]
mod tests {
    use polars::prelude::DataType;

    use super::*;

    fn parse(text: &str) -> Result<DataFrame, ReadTxtError> {
        parse_txt_table(text.as_bytes(), &SpecTxtReadOptions::default())
    }

    #[test]
    fn parse_maps_header_to_values() {
        let df = parse("A B\n1 2\n").expect("parse");
        assert_eq!(df.shape(), (1, 2));
        assert_eq!(df.get_column_names_str(), vec!["A", "B"]);
        assert_eq!(df.column("A").unwrap().i64().unwrap().get(0), Some(1));
        assert_eq!(df.column("B").unwrap().i64().unwrap().get(0), Some(2));
    }

    #[test]
    fn parse_collapses_whitespace_and_skips_blank_lines() {
        let df = parse("  time\tvalue   label\n\n0\t 1.5  a\n   \n1   2.5\tb\n").expect("parse");
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("time").unwrap().dtype(), &DataType::Int64);
        assert_eq!(df.column("value").unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column("label").unwrap().dtype(), &DataType::String);
        assert_eq!(df.column("label").unwrap().str().unwrap().get(1), Some("b"));
    }

    #[test]
    fn parse_pads_short_rows_and_reads_na_markers() {
        let df = parse("A B C\n1 NA x\n2\n").expect("parse");
        assert_eq!(df.shape(), (2, 3));

        let col_b = df.column("B").unwrap();
        assert_eq!(col_b.null_count(), 2);
        let col_c = df.column("C").unwrap().str().unwrap();
        assert_eq!(col_c.get(0), Some("x"));
        assert_eq!(col_c.get(1), None);
    }

    #[test]
    fn parse_rejects_rows_longer_than_header() {
        let err = parse("A B\n1 2\n1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            ReadTxtError::RaggedRow {
                line: 3,
                expected: 2,
                found: 3
            }
        ));
        assert_eq!(err.to_string(), "Expected 2 fields in line 3, saw 3");
    }

    #[test]
    fn parse_reads_quoted_header_and_fields() {
        let df = parse("\"a b\" c\n1 2\n").expect("parse");
        assert_eq!(df.get_column_names_str(), vec!["a b", "c"]);
        assert_eq!(df.column("a b").unwrap().i64().unwrap().get(0), Some(1));

        let df = parse("city n\n\"New York\" 3\n\"\" 4\n").expect("parse");
        assert_eq!(df.shape(), (2, 2));
        let col_city = df.column("city").unwrap().str().unwrap();
        assert_eq!(col_city.get(0), Some("New York"));
        assert_eq!(col_city.get(1), None);
        assert_eq!(df.column("n").unwrap().i64().unwrap().get(0), Some(3));
    }

    #[test]
    fn parse_splits_only_on_spaces_and_tabs() {
        let df = parse("name n\nfoo\u{a0}bar 3\n").expect("parse");
        assert_eq!(df.shape(), (1, 2));
        assert_eq!(
            df.column("name").unwrap().str().unwrap().get(0),
            Some("foo\u{a0}bar")
        );
    }

    #[test]
    fn parse_rejects_unclosed_quote() {
        let err = parse("A B\n\"x 1\n").unwrap_err();
        assert!(matches!(err, ReadTxtError::UnclosedQuote { line: 2 }));
    }

    #[test]
    fn parse_empty_input_yields_empty_frame() {
        assert_eq!(parse("").expect("parse").shape(), (0, 0));
        assert_eq!(parse("\n  \n\t\n").expect("parse").shape(), (0, 0));
    }

    #[test]
    fn parse_header_only_yields_zero_rows() {
        let df = parse("A B C\n").expect("parse");
        assert_eq!(df.shape(), (0, 3));
        assert_eq!(df.get_column_names_str(), vec!["A", "B", "C"]);
    }

    #[test]
    fn parse_mangles_duplicate_header_names() {
        let df = parse("A A B\n1 2 3\n").expect("parse");
        assert_eq!(df.get_column_names_str(), vec!["A", "A.1", "B"]);
    }

    #[test]
    fn parse_without_mangling_reports_duplicate_columns() {
        let options = SpecTxtReadOptions {
            if_mangle_dupe_cols: false,
            ..Default::default()
        };
        let err = parse_txt_table("A A\n1 2\n".as_bytes(), &options).unwrap_err();
        assert!(matches!(err, ReadTxtError::Frame(_)));
    }

    #[test]
    fn parse_keeps_text_when_inference_disabled() {
        let options = SpecTxtReadOptions {
            if_infer_dtypes: false,
            ..Default::default()
        };
        let df = parse_txt_table("A\n1\n".as_bytes(), &options).expect("parse");
        assert_eq!(df.column("A").unwrap().dtype(), &DataType::String);
    }

    #[test]
    fn parse_reads_booleans_and_strips_bom() {
        let df = parse("\u{feff}ok n\nTrue 1\nfalse 2\n").expect("parse");
        assert_eq!(df.get_column_names_str(), vec!["ok", "n"]);
        let col_ok = df.column("ok").unwrap().bool().unwrap();
        assert_eq!(col_ok.get(0), Some(true));
        assert_eq!(col_ok.get(1), Some(false));
    }

    #[test]
    fn parse_reports_invalid_utf8_line() {
        let err = parse_txt_table(&b"A B\n\xff\xfe 1\n"[..], &SpecTxtReadOptions::default())
            .unwrap_err();
        assert!(matches!(err, ReadTxtError::Utf8 { line: 2 }));
    }

    #[test]
    fn read_txt_table_reports_missing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("missing.txt");
        let err = read_txt_table(&path, &SpecTxtReadOptions::default()).unwrap_err();
        assert!(matches!(err, ReadTxtError::Open { .. }));
        assert!(err.to_string().contains("missing.txt"));
    }

    #[test]
    fn read_txt_table_reads_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let path = tmp.path().join("table.txt");
        std::fs::write(&path, "Freq  Gain\n100  -3.01\n200  -6.02\n").expect("write input");

        let df = read_txt_table(&path, &SpecTxtReadOptions::default()).expect("read");
        assert_eq!(df.shape(), (2, 2));
        assert_eq!(df.column("Gain").unwrap().f64().unwrap().get(1), Some(-6.02));
    }
}
