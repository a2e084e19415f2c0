//! # shipment-report-cli
//!
//! Command-line front end for the shipment report workbook builder.

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use shipment_report_core::{generate_report, ReportConfig, ReportError, ReportInputs};
use shipment_report_sheet::{FileSource, TableSource};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const GENERIC_FAILURE: &str = "Something went wrong while generating the Excel.";

/// shipment-report - Build the FedEx shipment report workbook
#[derive(Parser, Debug)]
#[command(name = "shipment-report")]
#[command(author, version, about = "Build the FedEx shipment report workbook", long_about = None)]
struct Cli {
    /// Raw shipment export (.csv, .tsv, .xlsx, .xls)
    #[arg(long, value_name = "FILE")]
    shipments: PathBuf,

    /// Criteria table (the "Criteria" sheet is used when present)
    #[arg(long, value_name = "FILE")]
    criteria: PathBuf,

    /// LOC test data template to reconcile
    #[arg(long = "loc-test-data", value_name = "FILE")]
    loc_test_data: Option<PathBuf>,

    /// Where to write the report
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "FedEx_Report_Automation_Phase1.xlsx"
    )]
    output: PathBuf,

    /// Report configuration (JSON or YAML)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            print_failure(&err);
            ExitCode::FAILURE
        }
    }
}

/// Build the report and write it to `cli.output`.
fn run(cli: &Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ReportConfig::from_path(path)?,
        None => ReportConfig::default(),
    };

    let shipments = FileSource::new(&cli.shipments);
    let criteria = FileSource::new(&cli.criteria);
    let loc_test_data = cli.loc_test_data.as_ref().map(FileSource::new);

    let inputs = ReportInputs {
        shipments: &shipments,
        criteria: &criteria,
        loc_test_data: loc_test_data.as_ref().map(|s| s as &dyn TableSource),
    };

    let report = generate_report(&inputs, &config)?;

    for advisory in &report.advisories {
        println!("{} {advisory}", "Note:".yellow().bold());
    }

    std::fs::write(&cli.output, &report.bytes)
        .with_context(|| format!("Failed to write report: {}", cli.output.display()))?;

    println!(
        "{} {} ({} shipment rows)",
        "Excel built successfully:".green().bold(),
        cli.output.display(),
        report.shipment_rows
    );
    if let Some(summary) = report.reconcile_summary {
        println!(
            "LOC test data: {} matched, {} unmatched, {} skipped",
            summary.matched_rows, summary.unmatched_rows, summary.skipped_rows
        );
    }

    Ok(())
}

/// What to tell the user about a failed run.
///
/// Input diagnostics are shown as-is; anything else gets the generic failure
/// line followed by the full error chain.
#[derive(Debug, PartialEq, Eq)]
enum Failure {
    Diagnostic {
        message: String,
        found_columns: Option<(String, Vec<String>)>,
    },
    Unexpected {
        chain: String,
    },
}

fn classify_failure(err: &anyhow::Error) -> Failure {
    match err.downcast_ref::<ReportError>() {
        Some(report_err) if report_err.is_diagnostic() => {
            let found_columns = match report_err {
                ReportError::MissingColumns { label, found, .. } => {
                    Some((label.clone(), found.clone()))
                }
                _ => None,
            };
            Failure::Diagnostic {
                message: report_err.to_string(),
                found_columns,
            }
        }
        _ => Failure::Unexpected {
            chain: format!("{err:?}"),
        },
    }
}

fn print_failure(err: &anyhow::Error) {
    match classify_failure(err) {
        Failure::Diagnostic {
            message,
            found_columns,
        } => {
            eprintln!("{} {message}", "Error:".red().bold());
            if let Some((label, columns)) = found_columns {
                eprintln!("Columns found in {label}:");
                for column in columns {
                    eprintln!("  - {column}");
                }
            }
        }
        Failure::Unexpected { chain } => {
            eprintln!("{}", GENERIC_FAILURE.red().bold());
            eprintln!("{chain}");
        }
    }
}
