//! Spreadsheet export.
//!
//! Files are named `{prefix}_{YYYY-MM-DD_HHMM}.{xlsx,csv}`. The workbook
//! holds a single `noticias` sheet with a bold header row; the CSV variant
//! starts with a UTF-8 byte-order mark so spreadsheet programs pick the right
//! encoding for accented names.

use crate::models::ExportRow;
use chrono::{DateTime, TimeZone};
use clap::ValueEnum;
use rust_xlsxwriter::{Format, Workbook};
use std::error::Error;
use std::fmt::Display;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const SHEET_NAME: &str = "noticias";

/// Column order shared by both formats.
const HEADERS: [&str; 9] = [
    "title",
    "content",
    "publisher",
    "published",
    "link",
    "image_url",
    "search_term",
    "municipality",
    "municipality_code",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpreadsheetFormat {
    #[default]
    Xlsx,
    Csv,
}

impl SpreadsheetFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Xlsx => "xlsx",
            Self::Csv => "csv",
        }
    }
}

/// Output path for `prefix` at time `now`.
///
/// A known spreadsheet extension already present on the prefix is dropped
/// and the one matching `format` goes after the timestamp.
pub fn output_filename<Tz>(prefix: &str, now: &DateTime<Tz>, format: SpreadsheetFormat) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    let stem = [".csv", ".CSV", ".xlsx", ".XLSX"]
        .iter()
        .find_map(|ext| prefix.strip_suffix(ext))
        .unwrap_or(prefix);
    format!("{}_{}.{}", stem, now.format("%Y-%m-%d_%H%M"), format.extension())
}

fn cells(row: &ExportRow) -> [&str; 9] {
    [
        &row.title,
        &row.content,
        &row.publisher,
        &row.published,
        &row.link,
        &row.image_url,
        &row.search_term,
        &row.municipality,
        &row.municipality_code,
    ]
}

/// Serialize rows (with header) to CSV bytes.
pub fn to_csv_bytes(rows: &[ExportRow]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut writer = csv::Writer::from_writer(UTF8_BOM.to_vec());
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(writer.into_inner().map_err(|e| e.to_string())?)
}

/// Serialize rows (with header) to an in-memory `.xlsx` workbook.
pub fn to_xlsx_bytes(rows: &[ExportRow]) -> Result<Vec<u8>, Box<dyn Error>> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name(SHEET_NAME)?;
        for (col, header) in (0u16..).zip(HEADERS) {
            sheet.write_string_with_format(0, col, header, &bold)?;
        }
        for (i, row) in rows.iter().enumerate() {
            let r = u32::try_from(i + 1)?;
            for (col, value) in (0u16..).zip(cells(row)) {
                sheet.write_string(r, col, value)?;
            }
        }
    }
    Ok(workbook.save_to_buffer()?)
}

/// Write rows to `path` in `format`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.as_ref().display(), rows = rows.len(), ?format))]
pub async fn write_rows(
    path: impl AsRef<Path>,
    rows: &[ExportRow],
    format: SpreadsheetFormat,
) -> Result<(), Box<dyn Error>> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let bytes = match format {
        SpreadsheetFormat::Xlsx => to_xlsx_bytes(rows)?,
        SpreadsheetFormat::Csv => to_csv_bytes(rows)?,
    };
    fs::write(path, bytes).await?;
    info!("Wrote spreadsheet");
    Ok(())
}
