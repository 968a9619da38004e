//! # Municipal News
//!
//! Searches Google News for a list of terms, detects which municipalities of
//! a Brazilian state each headline mentions, and exports the results as a
//! spreadsheet with one row per (article, municipality).
//!
//! ## Usage
//!
//! ```sh
//! municipal_news -t termos.txt -o saida -g data/municipios_metadata.xlsx
//! ```
//!
//! ## Architecture
//!
//! 1. **Setup**: Load config, gazetteer and search terms
//! 2. **Searching**: Fetch and parse the result page of each term
//! 3. **Collecting**: Dedupe links, filter by year, resolve municipalities
//! 4. **Output**: Split rows per municipality and write the spreadsheet (and JSON)

use chrono::Local;
use clap::Parser;
use futures::stream::{self, StreamExt};
use std::error::Error;
use std::path::Path;
use tracing::{debug, error, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod cli;
mod config;
mod fetch;
mod models;
mod municipalities;
mod outputs;
mod pipeline;
mod scrapers;
mod utils;

use cli::Cli;
use config::AppConfig;
use fetch::HttpFetcher;
use municipalities::{CapitalizedSpanExtractor, Gazetteer, MunicipalityResolver};
use outputs::{json, postprocess, spreadsheet};
use pipeline::Collector;
use scrapers::google_news;
use utils::{ensure_writable_dir, load_search_terms, output_dir};

#[tokio::main]
#[instrument]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("municipal_news starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.terms, ?args.output, ?args.format, ?args.config, "Parsed CLI arguments");

    // ---- Setup ----
    let terms = match load_search_terms(&args.terms).await {
        Ok(terms) => terms,
        Err(e) => {
            error!(path = %args.terms, error = %e, "Could not read search terms file");
            return Err(e);
        }
    };
    if terms.is_empty() {
        warn!(path = %args.terms, "Search terms file has no terms; nothing to do");
        return Ok(());
    }

    let mut config = AppConfig::load(args.config.as_deref().map(Path::new)).await?;
    if let Some(path) = &args.gazetteer {
        config.gazetteer.path = Some(path.clone());
    }
    let Some(gazetteer_path) = config.gazetteer.path.clone() else {
        error!("No gazetteer given; pass --gazetteer or set gazetteer.path in the config");
        return Err("missing gazetteer path".into());
    };

    let gazetteer = match Gazetteer::load(&gazetteer_path, &config.gazetteer) {
        Ok(g) => g,
        Err(e) => {
            error!(path = %gazetteer_path, error = %e, "Failed to load gazetteer");
            return Err(e);
        }
    };
    if gazetteer.is_empty() {
        warn!(path = %gazetteer_path, "Gazetteer is empty; no municipality will be detected");
    }

    let extractor = CapitalizedSpanExtractor::for_gazetteer(&gazetteer);
    let resolver = MunicipalityResolver::new(
        gazetteer,
        &config.state,
        &config.disambiguation,
        extractor,
    )?;
    info!(
        municipalities = resolver.gazetteer().len(),
        state = %config.state.name,
        "Municipality resolver ready"
    );

    // Early check: ensure the output location is writable
    let out_dir = output_dir(&args.output);
    if let Err(e) = ensure_writable_dir(out_dir).await {
        error!(
            path = %out_dir.display(),
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Search & collect ----
    let fetcher = HttpFetcher::new(&config.search)?;
    let min_year = args.min_year.unwrap_or(config.search.min_year);
    let mut collector = Collector::new(&resolver, min_year);

    let mut pages = Box::pin(stream::iter(terms.iter()).then(|term| {
        let fetcher = &fetcher;
        let search = &config.search;
        async move { (term, google_news::search(fetcher, search, term).await) }
    }));

    let mut failed_terms = 0usize;
    while let Some((term, result)) = pages.next().await {
        match result {
            Ok(items) if items.is_empty() => {
                warn!(%term, "No news items found for search term; moving on");
            }
            Ok(items) => {
                info!(%term, count = items.len(), "Search results received");
                collector.collect_term(term, items);
            }
            Err(e) => {
                failed_terms += 1;
                error!(%term, error = %e, "Search failed; skipping term");
            }
        }
    }
    let records = collector.into_records();
    info!(
        terms = terms.len(),
        failed_terms,
        articles = records.len(),
        "Finished collecting news"
    );

    // ---- Output ----
    if records.is_empty() {
        warn!("No articles collected; nothing to export");
    } else {
        let rows = postprocess::explode(&records);
        let filename = spreadsheet::output_filename(&args.output, &Local::now(), args.format);
        match spreadsheet::write_rows(&filename, &rows, args.format).await {
            Ok(()) => info!(path = %filename, rows = rows.len(), "Exported spreadsheet"),
            Err(e) => error!(path = %filename, error = %e, "Failed to export spreadsheet"),
        }

        if let Some(json_path) = &args.json_output {
            if let Err(e) = json::write_records(&records, json_path).await {
                error!(path = %json_path, error = %e, "Failed to write JSON records");
            }
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
