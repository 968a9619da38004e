//! Google News search scraper.
//!
//! Fetches `news.google.com/search` for a term and parses each result block
//! into a [`ListingItem`].
//!
//! # Selectors
//!
//! Google serves two result layouts; each selector lists both.
//!
//! | Field | Selector |
//! |-------|----------|
//! | result block | `div.UW0SDc, article` |
//! | title | `a.JtKRv, h3 a, h4 a` |
//! | snippet | `div.GI74Re.nDgy9d, p` |
//! | link | `a[href]` |
//! | publisher | `div.vr1PYe, div.wsLqz` |
//! | image | `img.Quavad.vwBmvb`, else any `img` |
//! | date | `time.hvbAAd, time` |

use crate::config::SearchConfig;
use crate::fetch::{FetchAsync, fetch_with_backoff};
use crate::models::{ListingItem, MISSING_DATE};
use chrono::{DateTime, Datelike, NaiveDateTime};
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use std::fmt;
use tracing::{debug, info, instrument, warn};
use url::Url;

static ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("div.UW0SDc, article").unwrap());
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.JtKRv, h3 a, h4 a").unwrap());
static SNIPPET: Lazy<Selector> = Lazy::new(|| Selector::parse("div.GI74Re.nDgy9d, p").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static PUBLISHER: Lazy<Selector> = Lazy::new(|| Selector::parse("div.vr1PYe, div.wsLqz").unwrap());
static THUMBNAIL: Lazy<Selector> = Lazy::new(|| Selector::parse("img.Quavad.vwBmvb").unwrap());
static IMAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("img").unwrap());
static TIME: Lazy<Selector> = Lazy::new(|| Selector::parse("time.hvbAAd, time").unwrap());

/// Search URL for `term`.
///
/// Words are percent-encoded individually and joined with `+`.
pub fn search_url(search: &SearchConfig, term: &str) -> String {
    let query = term
        .split_whitespace()
        .map(|w| urlencoding::encode(w).into_owned())
        .collect::<Vec<_>>()
        .join("+");
    format!(
        "{}/search?q={}&hl={}&gl={}&ceid={}",
        search.root_url.trim_end_matches('/'),
        query,
        urlencoding::encode(&search.hl),
        urlencoding::encode(&search.gl),
        urlencoding::encode(&search.ceid),
    )
}

/// Absolute article URL for a result `href`.
///
/// - `./articles/…` resolves under the root
/// - `http…` is kept as is
/// - anything else is appended to the root
pub fn resolve_link(root_url: &str, href: &str) -> String {
    let root = root_url.trim_end_matches('/');
    if let Some(rest) = href.strip_prefix("./articles/") {
        format!("{root}/articles/{rest}")
    } else if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{root}/{}", href.trim_start_matches('/'))
    }
}

/// Image URL from `srcset` (first candidate) or `src`, resolved against the root.
fn resolve_image(root: &Url, img: ElementRef<'_>) -> Option<String> {
    let raw = img
        .value()
        .attr("srcset")
        .and_then(|srcset| srcset.split_whitespace().next())
        .or_else(|| img.value().attr("src"))
        .map(str::trim)
        .filter(|s| !s.is_empty())?;
    match root.join(raw) {
        Ok(resolved) => Some(resolved.to_string()),
        Err(e) => {
            debug!(%raw, error = %e, "Could not resolve image URL");
            Some(raw.to_string())
        }
    }
}

fn text_of(item: ElementRef<'_>, selector: &Selector) -> Option<String> {
    item.select(selector)
        .next()
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|t| t.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|t| !t.is_empty())
}

/// Parse every result block of a search page.
#[instrument(level = "info", skip_all)]
pub fn parse_listing(html: &str, root_url: &str) -> Vec<ListingItem> {
    let document = Html::parse_document(html);
    let root = Url::parse(root_url).ok();

    let items: Vec<ListingItem> = document
        .select(&ITEM)
        .map(|item| {
            let link = item
                .select(&LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .filter(|href| !href.is_empty())
                .map(|href| resolve_link(root_url, href));

            let image = item.select(&THUMBNAIL).next().or_else(|| item.select(&IMAGE).next());
            let image_url = match (&root, image) {
                (Some(root), Some(img)) => resolve_image(root, img),
                _ => None,
            };

            ListingItem {
                title: text_of(item, &TITLE),
                snippet: text_of(item, &SNIPPET),
                publisher: text_of(item, &PUBLISHER),
                link,
                image_url,
                datetime: item
                    .select(&TIME)
                    .next()
                    .and_then(|t| t.value().attr("datetime"))
                    .map(str::to_string),
            }
        })
        .collect();

    info!(count = items.len(), "Parsed search result items");
    items
}

/// Display date and year parsed from a `datetime` attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicationDate {
    /// `dd/mm/YYYY`, or the raw value when unparsable.
    pub display: String,
    /// `None` when the value could not be parsed.
    pub year: Option<i32>,
}

/// Parse an ISO-8601 `datetime` attribute.
///
/// Accepts a trailing `Z` or an explicit offset; a missing offset is read as
/// UTC. Unparsable values are kept verbatim with no year.
pub fn parse_publication_date(raw: Option<&str>) -> PublicationDate {
    let Some(raw) = raw.map(str::trim).filter(|r| !r.is_empty()) else {
        return PublicationDate {
            display: MISSING_DATE.to_string(),
            year: None,
        };
    };

    let date = DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| chrono::NaiveDate::parse_from_str(raw, "%Y-%m-%d"));

    match date {
        Ok(date) => PublicationDate {
            display: date.format("%d/%m/%Y").to_string(),
            year: Some(date.year()),
        },
        Err(e) => {
            warn!(%raw, error = %e, "Could not parse publication date");
            PublicationDate {
                display: raw.to_string(),
                year: None,
            }
        }
    }
}

/// Fetch and parse the result page for one search term.
#[instrument(level = "info", skip(fetcher, config))]
pub async fn search<F>(
    fetcher: &F,
    config: &SearchConfig,
    term: &str,
) -> Result<Vec<ListingItem>, Box<dyn Error>>
where
    F: FetchAsync<Response = String> + fmt::Debug,
{
    let url = search_url(config, term);
    info!(%url, "Fetching Google News search page");
    let html = fetch_with_backoff(fetcher, &url, config.max_retries).await?;
    Ok(parse_listing(&html, &config.root_url))
}
