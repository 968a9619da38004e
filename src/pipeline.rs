//! Turns parsed search results into [`NewsRecord`]s.
//!
//! The collector owns the cross-term state: links already seen (so an
//! article found by two search terms is kept once) and the records gathered
//! so far. A failure on one item is logged and skipped; it never aborts the
//! rest of the batch.

use crate::models::{
    ListingItem, MISSING_CONTENT, MISSING_IMAGE, MISSING_PUBLISHER, MISSING_TITLE, NewsRecord,
};
use crate::municipalities::{EntityExtractor, MunicipalityResolver};
use crate::scrapers::google_news::parse_publication_date;
use crate::utils::truncate_for_log;
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, error, info, instrument};

/// Outcome of offering one listing item to the collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Collected,
    MissingLink,
    DuplicateLink,
    TooOld,
    Failed,
}

#[derive(Debug)]
pub struct Collector<'r, E> {
    resolver: &'r MunicipalityResolver<E>,
    min_year: i32,
    seen_links: HashSet<String>,
    records: Vec<NewsRecord>,
}

impl<'r, E: EntityExtractor> Collector<'r, E> {
    pub fn new(resolver: &'r MunicipalityResolver<E>, min_year: i32) -> Self {
        Self {
            resolver,
            min_year,
            seen_links: HashSet::new(),
            records: Vec::new(),
        }
    }

    /// Offer every item found for `term`; returns how many were collected.
    #[instrument(level = "info", skip(self, items), fields(items = items.len()))]
    pub fn collect_term(&mut self, term: &str, items: Vec<ListingItem>) -> usize {
        let before = self.records.len();
        for (index, item) in items.into_iter().enumerate() {
            let disposition = self.offer(term, item);
            debug!(index, ?disposition, "Listing item handled");
        }
        let collected = self.records.len() - before;
        info!(collected, total = self.records.len(), "Finished search term");
        collected
    }

    /// Offer a single item.
    pub fn offer(&mut self, term: &str, item: ListingItem) -> Disposition {
        let Some(link) = item.link.clone() else {
            return Disposition::MissingLink;
        };
        if !self.seen_links.insert(link.clone()) {
            return Disposition::DuplicateLink;
        }

        match self.build_record(term, link, item) {
            Ok(Some(record)) => {
                info!(
                    title = %record.title,
                    content = %truncate_for_log(&record.content, 200),
                    municipalities = %record.municipalities,
                    publisher = %record.publisher,
                    published = %record.published,
                    link = %record.link,
                    "Collected article"
                );
                self.records.push(record);
                Disposition::Collected
            }
            Ok(None) => Disposition::TooOld,
            Err(e) => {
                error!(error = %e, "Failed to process listing item; skipping");
                Disposition::Failed
            }
        }
    }

    fn build_record(
        &self,
        term: &str,
        link: String,
        item: ListingItem,
    ) -> Result<Option<NewsRecord>, Box<dyn Error>> {
        let title = item.title.unwrap_or_else(|| MISSING_TITLE.to_string());
        let content = item.snippet.unwrap_or_else(|| MISSING_CONTENT.to_string());

        let date = parse_publication_date(item.datetime.as_deref());
        if let Some(year) = date.year.filter(|y| *y < self.min_year) {
            info!(year, min_year = self.min_year, %link, "Ignoring article older than minimum year");
            return Ok(None);
        }

        let municipalities = self.resolver.resolve(&title, &content)?.join(",");

        Ok(Some(NewsRecord {
            title,
            content,
            publisher: item.publisher.unwrap_or_else(|| MISSING_PUBLISHER.to_string()),
            published: date.display,
            link,
            image_url: item.image_url.unwrap_or_else(|| MISSING_IMAGE.to_string()),
            search_term: term.to_string(),
            municipalities,
        }))
    }

    pub fn records(&self) -> &[NewsRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<NewsRecord> {
        self.records
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DisambiguationConfig, StateConfig};
    use crate::municipalities::{CapitalizedSpanExtractor, Gazetteer};

    fn resolver() -> MunicipalityResolver<CapitalizedSpanExtractor> {
        let gazetteer = Gazetteer::from_entries([
            ("Ilhéus", "2913606"),
            ("Salvador", "2927408"),
            ("Nova", "1000003"),
        ]);
        let extractor = CapitalizedSpanExtractor::for_gazetteer(&gazetteer);
        MunicipalityResolver::new(
            gazetteer,
            &StateConfig::default(),
            &DisambiguationConfig::default(),
            extractor,
        )
        .unwrap()
    }

    fn item(link: Option<&str>, title: &str, datetime: Option<&str>) -> ListingItem {
        ListingItem {
            title: Some(title.to_string()),
            snippet: Some("Operação da polícia".to_string()),
            publisher: Some("G1".to_string()),
            link: link.map(str::to_string),
            image_url: None,
            datetime: datetime.map(str::to_string),
        }
    }

    struct Broken;

    impl EntityExtractor for Broken {
        fn extract(&self, _text: &str) -> Result<Vec<String>, Box<dyn Error>> {
            Err("extractor crashed".into())
        }
    }

    #[test]
    fn test_collects_and_resolves() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        let d = c.offer(
            "Peculato Bahia",
            item(Some("https://a/1"), "PF prende prefeito de Ilhéus (BA)", Some("2024-01-10T10:00:00Z")),
        );
        assert_eq!(d, Disposition::Collected);

        let rec = &c.records()[0];
        assert_eq!(rec.municipalities, "Ilhéus-2913606");
        assert_eq!(rec.published, "10/01/2024");
        assert_eq!(rec.search_term, "Peculato Bahia");
        assert_eq!(rec.image_url, MISSING_IMAGE);
    }

    #[test]
    fn test_multiple_municipalities_joined() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        c.offer("t", item(Some("https://a/1"), "Salvador e Ilhéus sob investigação", None));
        assert_eq!(c.records()[0].municipalities, "Salvador-2927408,Ilhéus-2913606");
    }

    #[test]
    fn test_deduplicates_links_across_terms() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        let n1 = c.collect_term("a", vec![item(Some("https://a/1"), "Salvador", None)]);
        let n2 = c.collect_term(
            "b",
            vec![
                item(Some("https://a/1"), "Salvador", None),
                item(Some("https://a/2"), "Ilhéus", None),
            ],
        );
        assert_eq!((n1, n2), (1, 1));
        assert_eq!(c.records().len(), 2);
        assert_eq!(c.records()[0].search_term, "a");
    }

    #[test]
    fn test_skips_missing_link() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        assert_eq!(c.offer("t", item(None, "Salvador", None)), Disposition::MissingLink);
        assert!(c.records().is_empty());
    }

    #[test]
    fn test_year_filter_marks_link_seen() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        let old = item(Some("https://a/old"), "Salvador", Some("2021-05-01T00:00:00Z"));
        assert_eq!(c.offer("t", old.clone()), Disposition::TooOld);
        assert_eq!(c.offer("t", old), Disposition::DuplicateLink);
        assert!(c.into_records().is_empty());
    }

    #[test]
    fn test_unparsable_date_is_kept() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        c.offer("t", item(Some("https://a/1"), "Salvador", Some("há 2 dias")));
        assert_eq!(c.records()[0].published, "há 2 dias");
    }

    #[test]
    fn test_missing_fields_get_placeholders() {
        let r = resolver();
        let mut c = Collector::new(&r, 2023);
        let bare = ListingItem {
            link: Some("https://a/1".to_string()),
            ..ListingItem::default()
        };
        assert_eq!(c.offer("t", bare), Disposition::Collected);
        let rec = &c.records()[0];
        assert_eq!(rec.title, MISSING_TITLE);
        assert_eq!(rec.content, MISSING_CONTENT);
        assert_eq!(rec.publisher, MISSING_PUBLISHER);
        assert_eq!(rec.published, crate::models::MISSING_DATE);
        assert_eq!(rec.municipalities, "");
    }

    #[test]
    fn test_item_failure_does_not_abort_batch() {
        let broken = MunicipalityResolver::new(
            Gazetteer::from_entries([("Salvador", "1")]),
            &StateConfig::default(),
            &DisambiguationConfig::default(),
            Broken,
        )
        .unwrap();
        let mut c = Collector::new(&broken, 2023);
        let collected = c.collect_term(
            "t",
            vec![
                item(Some("https://a/1"), "Salvador", None),
                item(Some("https://a/2"), "Salvador", None),
            ],
        );
        assert_eq!(collected, 0);
        assert_eq!(c.offer("t", item(Some("https://a/3"), "x", None)), Disposition::Failed);
    }
}
