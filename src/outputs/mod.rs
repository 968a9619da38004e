//! Output generation for collected articles.
//!
//! # Submodules
//!
//! - [`postprocess`]: splits records into one row per municipality
//! - [`spreadsheet`]: writes those rows as a timestamped `.xlsx` or CSV file
//! - [`json`]: optional JSON dump of the unsplit records
//!
//! # Output Structure
//!
//! ```text
//! saida_2025-05-06_1407.xlsx  # one row per (article, municipality); .csv with -f csv
//! records.json                # with --json-output
//! ```

pub mod json;
pub mod postprocess;
pub mod spreadsheet;
