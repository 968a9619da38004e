//! Data models for scraped search results and exported rows.
//!
//! - [`ListingItem`]: one result block as parsed from a search page
//! - [`NewsRecord`]: a collected article with its resolved municipalities
//! - [`ExportRow`]: one spreadsheet row, a single municipality per row

use serde::{Deserialize, Serialize};

pub const MISSING_TITLE: &str = "Título não encontrado";
pub const MISSING_CONTENT: &str = "Conteúdo não encontrado";
pub const MISSING_PUBLISHER: &str = "Fonte não encontrada";
pub const MISSING_DATE: &str = "Data não encontrada";
pub const MISSING_IMAGE: &str = "Imagem não encontrada";

/// A raw search result before resolution and filtering.
///
/// Every field is optional because the listing markup varies between
/// result layouts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListingItem {
    pub title: Option<String>,
    pub snippet: Option<String>,
    pub publisher: Option<String>,
    /// Absolute article URL.
    pub link: Option<String>,
    /// Absolute image URL.
    pub image_url: Option<String>,
    /// Raw `datetime` attribute of the `<time>` element.
    pub datetime: Option<String>,
}

/// A collected article.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NewsRecord {
    pub title: String,
    pub content: String,
    pub publisher: String,
    /// `dd/mm/YYYY`, or the raw attribute when it could not be parsed.
    pub published: String,
    pub link: String,
    pub image_url: String,
    /// The search term that surfaced this article.
    pub search_term: String,
    /// Resolved `"Name-Code"` labels joined by `,`.
    pub municipalities: String,
}

/// One spreadsheet row: a [`NewsRecord`] with a single municipality split
/// into name and code, appended after the original columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExportRow {
    pub title: String,
    pub content: String,
    pub publisher: String,
    pub published: String,
    pub link: String,
    pub image_url: String,
    pub search_term: String,
    pub municipality: String,
    pub municipality_code: String,
}

impl ExportRow {
    pub fn from_record(record: &NewsRecord, municipality: String, municipality_code: String) -> Self {
        Self {
            title: record.title.clone(),
            content: record.content.clone(),
            publisher: record.publisher.clone(),
            published: record.published.clone(),
            link: record.link.clone(),
            image_url: record.image_url.clone(),
            search_term: record.search_term.clone(),
            municipality,
            municipality_code,
        }
    }
}
