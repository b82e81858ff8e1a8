//! dartfin CLI binary.
//!
//! Builds the quarterly income statement workbook of one company and saves it once
//! every year has been processed.

mod cli;

use clap::Parser;
use cli::Cli;
use dartfin::{PipelineError, build_workbook};
use dartfin_data::DataError;
use dartfin_data::dart::{DartConfig, DartProvider};
use dartfin_output::{OutputError, WorkbookWriter};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::process;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Data(#[from] DataError),
    #[error(transparent)]
    Output(#[from] OutputError),
    #[error("Invalid progress template: {0}")]
    Progress(#[from] indicatif::style::TemplateError),
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli).await {
        error!("{}", e);
        eprintln!("{}", operator_message(&e));
        process::exit(1);
    }
}

const GENERIC_FAILURE: &str =
    "Failed to build the income statement workbook. Check the company name, market and date range.";

/// Message printed on failure; an unknown company is named as queried.
fn operator_message(error: &CliError) -> String {
    match error {
        CliError::Data(e @ DataError::CompanyNotFound { .. })
        | CliError::Pipeline(PipelineError::Data(e @ DataError::CompanyNotFound { .. })) => {
            format!("{}. {}", e, GENERIC_FAILURE)
        }
        _ => GENERIC_FAILURE.to_string(),
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let request = cli.request();
    let output = cli.output_path();
    let provider = DartProvider::new(DartConfig::new(cli.api_key.unwrap_or_default()))?;

    let years = request.years();
    let progress = ProgressBar::new(years.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let mut writer = WorkbookWriter::new();
    let mut processed = 0u64;
    let result = build_workbook(&provider, &request, &mut writer, |year| {
        progress.set_position(processed);
        progress.set_message(year.to_string());
        processed += 1;
    })
    .await;

    let summary = match result {
        Ok(summary) => summary,
        Err(e) => {
            progress.abandon();
            return Err(e.into());
        }
    };
    progress.finish_with_message("done");

    if writer.is_empty() {
        warn!(
            "No income statement data for {} between {} and {}, nothing written",
            summary.company, request.start, request.end
        );
        return Ok(());
    }

    writer.save(&output)?;
    info!("Saved {} sheets for {}", summary.sheets.len(), summary.company);
    println!("{}", output.display());
    Ok(())
}
