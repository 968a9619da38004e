//! Command-line interface definitions.
//!
//! All arguments can be provided via command-line flags; the gazetteer path
//! can also come from the environment.

use crate::outputs::spreadsheet::SpreadsheetFormat;
use clap::Parser;

/// Search Google News for each term, tag the municipalities every headline
/// mentions, and export the results as a spreadsheet.
///
/// # Examples
///
/// ```sh
/// # Basic usage
/// municipal_news -t termos.txt -o saida -g data/municipios_metadata.xlsx
///
/// # Custom state configuration, CSV output and a JSON dump
/// municipal_news -t termos.txt -o saida -c config/bahia.yaml -f csv --json-output saida.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Text file with one search term per line
    #[arg(short, long)]
    pub terms: String,

    /// Output file prefix; a timestamp and the format's extension are appended
    #[arg(short, long)]
    pub output: String,

    /// Spreadsheet format
    #[arg(short, long, value_enum, default_value_t = SpreadsheetFormat::Xlsx)]
    pub format: SpreadsheetFormat,

    /// Optional path to a YAML config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Gazetteer `.xlsx` or CSV (overrides `gazetteer.path` from the config)
    #[arg(short, long, env = "GAZETTEER_PATH")]
    pub gazetteer: Option<String>,

    /// Articles published before this year are dropped (overrides `search.min_year`)
    #[arg(long)]
    pub min_year: Option<i32>,

    /// Also write the collected articles as JSON to this path
    #[arg(long)]
    pub json_output: Option<String>,
}
