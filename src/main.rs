use anyhow::Result;
use chrono::NaiveDate;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser};
use log::{error, info};

use std::path::PathBuf;
use std::process;

use vendas_cli::error::CoreError;
use vendas_cli::output::OutputFormat;
use vendas_cli::report::ReportFilters;
use vendas_cli::{compute_report, load_sales, output};

#[derive(Parser, Debug)]
#[command(
    name = "vendas-cli",
    version,
    about = "Generate sales reports from a CSV file with schema-validated aggregation",
    after_help = "EXAMPLES:\n  \
        vendas-cli data.csv --format text\n  \
        vendas-cli data.csv --format json\n  \
        vendas-cli data.csv --start 2025-01-01 --end 2025-01-31\n\n\
        EXIT CODES:\n  \
        0  Success\n  \
        1  Error during validation or processing\n  \
        2  Usage error"
)]
struct Cli {
    /// Path to the CSV file containing sales data
    #[arg(value_parser = csv_path)]
    csv_path: PathBuf,

    /// Output format: 'text' for CLI display or 'json' for structured output
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Start date filter (YYYY-MM-DD); must be used together with --end
    #[arg(long, requires = "end")]
    start: Option<NaiveDate>,

    /// End date filter (YYYY-MM-DD); must be used together with --start
    #[arg(long, requires = "start")]
    end: Option<NaiveDate>,
}

fn csv_path(value: &str) -> Result<PathBuf, String> {
    if !value.to_lowercase().ends_with(".csv") {
        return Err("file must have .csv extension".to_string());
    }
    let path = PathBuf::from(value);
    if !path.is_file() {
        return Err(format!("file '{value}' not found"));
    }
    Ok(path)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    if let (Some(start), Some(end)) = (cli.start, cli.end) {
        if start > end {
            Cli::command()
                .error(
                    ErrorKind::ValueValidation,
                    format!("--start date ({start}) cannot be greater than --end date ({end})"),
                )
                .exit();
        }
    }

    match run(&cli) {
        Ok(rendered) => println!("{rendered}"),
        Err(err) => {
            // Schema errors carry a preformatted user-facing body; print it
            // verbatim. Everything else gets the single-line error log.
            match err.downcast_ref::<CoreError>() {
                Some(CoreError::MissingColumns(_) | CoreError::RowFailures(_)) => {
                    eprintln!("{err}");
                }
                _ => error!("Error: {err:#}"),
            }
            process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> Result<String> {
    info!("loading sales data...");
    let records = load_sales(&cli.csv_path)?;

    info!("computing sales report...");
    let filters = match (cli.start, cli.end) {
        (Some(start), Some(end)) => Some(ReportFilters { start, end }),
        _ => None,
    };
    let summary = compute_report(&records, filters)?;

    info!("rendering output...");
    output::render(&summary, cli.format)
}
