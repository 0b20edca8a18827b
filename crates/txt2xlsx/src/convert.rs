//! Read → write orchestration.

use std::path::Path;

use tracing::info;
use txt2xlsx_io_txt::read_txt_table;
use txt2xlsx_io_xlsx::XlsxWriter;

use crate::spec::{ConvertError, ReportConvert, SpecConvertOptions};

/// Convert the text table at `path_file_in` into a workbook at `path_file_out`.
///
/// The input is parsed completely before the writer is created, so a missing
/// or malformed input never leaves an output file behind. An existing output
/// file is overwritten.
pub fn convert_txt_to_xlsx<P, Q>(
    path_file_in: P,
    path_file_out: Q,
    options: &SpecConvertOptions,
) -> Result<ReportConvert, ConvertError>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
{
    let path_file_in = path_file_in.as_ref();
    let path_file_out = path_file_out.as_ref();

    let df = read_txt_table(path_file_in, &options.read_options)?;

    let mut writer = XlsxWriter::new(
        path_file_out,
        options.formats.clone(),
        options.write_options.clone(),
    );
    writer
        .write_sheet(&df, &options.sheet_name, &options.sheet_options)
        .map_err(ConvertError::Write)?;
    writer.close().map_err(ConvertError::Write)?;

    let (sheets, warnings) = writer
        .report()
        .into_iter()
        .fold((Vec::new(), Vec::new()), |(mut sheets, mut warnings), report| {
            sheets.extend(report.sheets);
            warnings.extend(report.warnings);
            (sheets, warnings)
        });

    info!(
        input = %path_file_in.display(),
        output = %path_file_out.display(),
        rows = df.height(),
        cols = df.width(),
        sheets = sheets.len(),
        "conversion finished"
    );

    Ok(ReportConvert {
        path_file_in: path_file_in.to_path_buf(),
        path_file_out: path_file_out.to_path_buf(),
        height: df.height(),
        width: df.width(),
        sheets,
        warnings,
    })
}
