//! Convert a whitespace-delimited text table into an Excel workbook.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};
use txt2xlsx::conf::{C_LOG_FILTER_DEFAULT, C_PATH_FILE_IN_DEFAULT, C_PATH_FILE_OUT_DEFAULT};
use txt2xlsx::{SpecConvertOptions, convert_txt_to_xlsx};

#[derive(Debug, Parser)]
#[command(name = "txt2xlsx", version, about)]
struct Cli {
    /// Whitespace-delimited text file; the first line names the columns
    #[arg(default_value = C_PATH_FILE_IN_DEFAULT)]
    input: PathBuf,

    /// Workbook to create or overwrite
    #[arg(default_value = C_PATH_FILE_OUT_DEFAULT)]
    output: PathBuf,
}

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(C_LOG_FILTER_DEFAULT));
    fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Convert `cli.input` into `cli.output` and print the completion line to `out`.
fn run(cli: &Cli, mut out: impl Write) -> Result<()> {
    let report = convert_txt_to_xlsx(&cli.input, &cli.output, &SpecConvertOptions::default())
        .with_context(|| {
            format!(
                "converting {} into {}",
                cli.input.display(),
                cli.output.display()
            )
        })?;

    writeln!(
        out,
        "Conversion complete! Excel file saved as: {}",
        report.path_file_out.display()
    )?;
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging();
    run(&cli, std::io::stdout().lock())
}
