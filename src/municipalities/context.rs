//! Context heuristics that decide whether a candidate name is a place.
//!
//! Three pieces live here:
//! - [`SuffixStripper`] removes state-abbreviation suffixes such as `(BA)`
//!   so they are never read as municipality names.
//! - [`GeoContext`] looks for geographic trigger phrases around a name
//!   ("prefeitura de X", "em X", "X prefeitura").
//! - [`AmbiguityFilter`] combines both with the ambiguous-word list.

use super::normalize::normalize_text;
use crate::config::{DisambiguationConfig, StateConfig};
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, warn};

/// Removes `(UF)`, `- UF` and `, UF` suffixes for a fixed state code.
#[derive(Debug, Clone)]
pub struct SuffixStripper {
    parenthesised: Regex,
    dashed: Regex,
    comma: Regex,
}

impl SuffixStripper {
    pub fn new(state_code: &str) -> Result<Self, regex::Error> {
        let code = regex::escape(state_code.trim());
        Ok(Self {
            parenthesised: Regex::new(&format!(r"(?i)\s*\(\s*{code}\s*\)\s*"))?,
            dashed: Regex::new(&format!(r"(?i)\s*-\s*{code}\b\s*"))?,
            comma: Regex::new(&format!(r"(?i),\s*{code}\b"))?,
        })
    }

    /// Strip the suffixes and trim the result.
    ///
    /// The parenthesised and dashed forms become a single space so the
    /// words around them stay apart.
    pub fn strip(&self, text: &str) -> String {
        let text = self.parenthesised.replace_all(text, " ");
        let text = self.dashed.replace_all(&text, " ");
        let text = self.comma.replace_all(&text, "");
        text.trim().to_string()
    }
}

/// Regex fragment matching `normalized` with or without accents.
///
/// Each base letter expands to a class of its accented forms, so the
/// normalized `gloria` matches `Glória` as well as `GLORIA`.
fn accent_insensitive(normalized: &str) -> String {
    let mut pattern = String::with_capacity(normalized.len() * 4);
    let mut in_space = false;
    for c in normalized.chars() {
        if c.is_whitespace() {
            if !in_space {
                pattern.push_str(r"\s+");
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match c {
            'a' => pattern.push_str("[aàáâãä]"),
            'e' => pattern.push_str("[eèéêë]"),
            'i' => pattern.push_str("[iìíîï]"),
            'o' => pattern.push_str("[oòóôõö]"),
            'u' => pattern.push_str("[uùúûü]"),
            'c' => pattern.push_str("[cç]"),
            'n' => pattern.push_str("[nñ]"),
            other => pattern.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
        }
    }
    pattern
}

fn alternation<'a>(words: impl IntoIterator<Item = &'a String>, f: impl Fn(&str) -> String) -> String {
    words
        .into_iter()
        .map(|w| w.trim())
        .filter(|w| !w.is_empty())
        .map(f)
        .collect::<Vec<_>>()
        .join("|")
}

/// Decides whether a name is used geographically in a block of text.
#[derive(Debug, Clone)]
pub struct GeoContext {
    stripper: SuffixStripper,
    place_nouns: String,
    prepositions: String,
    trailing_nouns: String,
}

impl GeoContext {
    pub fn new(stripper: SuffixStripper, cfg: &DisambiguationConfig) -> Self {
        let accented = |w: &str| accent_insensitive(&normalize_text(w));
        Self {
            stripper,
            place_nouns: alternation(&cfg.place_nouns, accented),
            prepositions: alternation(&cfg.prepositions, |w| regex::escape(&w.to_lowercase())),
            trailing_nouns: alternation(&cfg.trailing_nouns, accented),
        }
    }

    fn patterns(&self, name: &str) -> Vec<String> {
        let mut patterns = Vec::with_capacity(3);
        if !self.place_nouns.is_empty() {
            patterns.push(format!(
                r"(?i)\b(?:{})\s+(?:de|d[oa]s?)\s+{name}\b",
                self.place_nouns
            ));
        }
        if !self.prepositions.is_empty() {
            patterns.push(format!(r"(?i)\b(?:{})\s+{name}\b", self.prepositions));
        }
        if !self.trailing_nouns.is_empty() {
            patterns.push(format!(r"(?i)\b{name}\s+(?:{})\b", self.trailing_nouns));
        }
        patterns
    }

    /// True if `name` sits next to a geographic trigger in `text`.
    ///
    /// Empty input and patterns that fail to compile count as no match.
    pub fn is_geographic(&self, name: &str, text: &str) -> bool {
        let normalized = normalize_text(name.trim());
        if normalized.is_empty() || text.trim().is_empty() {
            return false;
        }

        let text = self.stripper.strip(text);
        let name_pattern = accent_insensitive(&normalized);

        for pattern in self.patterns(&name_pattern) {
            match Regex::new(&pattern) {
                Ok(re) if re.is_match(&text) => {
                    debug!(%name, %pattern, "Geographic context matched");
                    return true;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(%name, error = %e, "Could not compile geographic pattern");
                }
            }
        }
        false
    }
}

/// Discards the state name and unconfirmed ambiguous words.
#[derive(Debug, Clone)]
pub struct AmbiguityFilter {
    state_name: String,
    ambiguous: HashSet<String>,
    context: GeoContext,
}

impl AmbiguityFilter {
    pub fn new(state: &StateConfig, cfg: &DisambiguationConfig, context: GeoContext) -> Self {
        Self {
            state_name: normalize_text(state.name.trim()),
            ambiguous: cfg
                .ambiguous_words
                .iter()
                .map(|w| normalize_text(w.trim()))
                .filter(|w| !w.is_empty())
                .collect(),
            context,
        }
    }

    /// Normalized state name.
    pub fn state_name(&self) -> &str {
        &self.state_name
    }

    pub fn is_ambiguous(&self, normalized: &str) -> bool {
        self.ambiguous.contains(normalized)
    }

    /// True if `name` should be dropped given the surrounding `text`.
    pub fn should_ignore(&self, name: &str, text: &str) -> bool {
        let normalized = normalize_text(name.trim());
        if normalized.is_empty() || normalized == self.state_name {
            return true;
        }
        if self.is_ambiguous(&normalized) {
            return !self.context.is_geographic(name, text);
        }
        false
    }
}
