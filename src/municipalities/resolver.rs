//! Turns a headline (and its snippet) into confirmed municipality mentions.

use super::context::{AmbiguityFilter, GeoContext, SuffixStripper};
use super::extractor::EntityExtractor;
use super::gazetteer::Gazetteer;
use super::normalize::normalize_text;
use crate::config::{DisambiguationConfig, StateConfig};
use itertools::Itertools;
use std::collections::HashSet;
use std::error::Error;
use tracing::{debug, instrument};

/// Resolves extractor candidates against the gazetteer.
///
/// Built once; all state is read-only afterwards, so a resolver can be
/// shared between call sites without locking.
#[derive(Debug)]
pub struct MunicipalityResolver<E> {
    gazetteer: Gazetteer,
    stripper: SuffixStripper,
    filter: AmbiguityFilter,
    extractor: E,
}

impl<E: EntityExtractor> MunicipalityResolver<E> {
    pub fn new(
        gazetteer: Gazetteer,
        state: &StateConfig,
        disambiguation: &DisambiguationConfig,
        extractor: E,
    ) -> Result<Self, Box<dyn Error>> {
        let stripper = SuffixStripper::new(&state.code)?;
        let context = GeoContext::new(stripper.clone(), disambiguation);
        let filter = AmbiguityFilter::new(state, disambiguation, context);
        Ok(Self {
            gazetteer,
            stripper,
            filter,
            extractor,
        })
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    /// Municipality labels (`"Name-Code"`) mentioned in `title`.
    ///
    /// Candidates come from the extractor run over the suffix-stripped title;
    /// `body` only serves as context for ambiguous words, falling back to the
    /// title when empty. The result is deduplicated in first-seen order.
    ///
    /// # Errors
    ///
    /// Only extractor failures are returned. Malformed candidates are skipped.
    #[instrument(level = "debug", skip_all)]
    pub fn resolve(&self, title: &str, body: &str) -> Result<Vec<String>, Box<dyn Error>> {
        if title.trim().is_empty() && body.trim().is_empty() {
            return Ok(Vec::new());
        }

        let title = self.stripper.strip(title);
        let body = self.stripper.strip(body);
        let context = if body.trim().is_empty() { &title } else { &body };

        let raw = self.extractor.extract(&title)?;
        let detected: HashSet<String> = raw.iter().map(|name| normalize_text(name.trim())).collect();

        let mut accepted: Vec<String> = Vec::new();
        for name in &raw {
            let name = name.trim();
            if name.is_empty() {
                continue;
            }

            let normalized = normalize_text(name);
            if !self.gazetteer.contains(&normalized) || normalized == self.filter.state_name() {
                continue;
            }
            if self.filter.should_ignore(name, context) {
                debug!(%name, "Discarded ambiguous candidate without geographic context");
                continue;
            }
            // "Santa" is dropped when "Santa Cruz" was extracted as well
            if self.gazetteer.is_part_of_any(&normalized, &detected) {
                debug!(%name, "Suppressed component of a detected multi-word name");
                continue;
            }
            accepted.push(normalized);
        }

        Ok(accepted
            .iter()
            .filter_map(|normalized| self.gazetteer.label(normalized))
            .unique()
            .map(str::to_string)
            .collect())
    }
}
