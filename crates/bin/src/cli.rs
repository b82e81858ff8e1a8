//! Command-line arguments.

use chrono::NaiveDate;
use clap::Parser;
use dartfin::IncomeStatementRequest;
use dartfin_data::Market;
use dartfin_output::download_file_name;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "dartfin")]
#[command(about = "Quarterly income statements from DART periodic reports", long_about = None)]
#[command(version)]
pub(crate) struct Cli {
    /// Company name, matched exactly against the DART corp-code registry
    #[arg(long, default_value = "삼성전자")]
    pub(crate) corp_name: String,

    /// Market segment: Y (KOSPI), K (KOSDAQ), N (KONEX) or E (other)
    #[arg(long, default_value = "Y")]
    pub(crate) market: Market,

    /// First receipt date searched (YYYYMMDD)
    #[arg(long, default_value = "20220101", value_parser = parse_date_arg)]
    pub(crate) start: NaiveDate,

    /// Last receipt date searched (YYYYMMDD)
    #[arg(long, default_value = "20241231", value_parser = parse_date_arg)]
    pub(crate) end: NaiveDate,

    /// Output file [default: {corp-name}_재무제표.xlsx]
    #[arg(long, short)]
    pub(crate) output: Option<PathBuf>,

    /// DART OpenAPI key
    #[arg(long, env = "DART_API_KEY", hide_env_values = true)]
    pub(crate) api_key: Option<String>,

    /// Take each year's annual report from filings received the following year
    #[arg(long)]
    pub(crate) lagged_annual: bool,
}

fn parse_date_arg(raw: &str) -> Result<NaiveDate, String> {
    dartfin::parse_date(raw).map_err(|e| e.to_string())
}

impl Cli {
    pub(crate) fn request(&self) -> IncomeStatementRequest {
        IncomeStatementRequest::new(self.corp_name.trim(), self.market, self.start, self.end)
            .with_lagged_annual(self.lagged_annual)
    }

    pub(crate) fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| PathBuf::from(download_file_name(&self.corp_name)))
    }
}
