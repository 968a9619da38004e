//! Candidate-name extraction.
//!
//! The resolver only needs "text in, candidate names out", so extraction is
//! a trait. [`CapitalizedSpanExtractor`] is the built-in rule-based
//! implementation: it splits a headline into capitalized runs and cuts each
//! run into non-overlapping candidates, preferring the longest span that is
//! a known name.

use super::gazetteer::Gazetteer;
use super::normalize::normalize_text;
use std::collections::HashSet;
use std::error::Error;

/// Produces raw candidate names from a piece of text.
///
/// Order and duplicates are preserved by the resolver as returned.
pub trait EntityExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>, Box<dyn Error>>;
}

impl<T: EntityExtractor + ?Sized> EntityExtractor for Box<T> {
    fn extract(&self, text: &str) -> Result<Vec<String>, Box<dyn Error>> {
        (**self).extract(text)
    }
}

/// Lower-case words allowed inside a proper-noun run.
const DEFAULT_CONNECTORS: &[&str] = &["de", "do", "da", "dos", "das", "e"];

/// Greedy longest-match over capitalized word runs.
///
/// Each run is scanned left to right. At every capitalized word the longest
/// span of up to `max_words` tokens whose normalized form is in the
/// vocabulary is emitted and skipped over; otherwise the word alone is
/// emitted. Candidates never overlap, so "São Félix do Coribe" does not also
/// yield "São Félix".
///
/// Spans may cross lower-case connectors ("Conceição do Coité") but must
/// start and end on a capitalized word. Punctuation ends a run; hyphens and
/// apostrophes inside a word do not ("Xique-Xique", "Dias d'Ávila").
#[derive(Debug, Clone)]
pub struct CapitalizedSpanExtractor {
    max_words: usize,
    connectors: Vec<String>,
    /// Normalized multi-word names worth keeping together.
    known: HashSet<String>,
}

impl Default for CapitalizedSpanExtractor {
    /// No vocabulary: every capitalized word is its own candidate.
    fn default() -> Self {
        Self::new(1, std::iter::empty::<&str>())
    }
}

impl CapitalizedSpanExtractor {
    pub fn new<I, S>(max_words: usize, known: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            max_words: max_words.max(1),
            connectors: DEFAULT_CONNECTORS.iter().map(|s| s.to_string()).collect(),
            known: known
                .into_iter()
                .map(|name| normalize_text(name.as_ref().trim()))
                .filter(|name| name.contains(' '))
                .collect(),
        }
    }

    /// Vocabulary and span limit taken from the gazetteer.
    pub fn for_gazetteer(gazetteer: &Gazetteer) -> Self {
        Self::new(gazetteer.max_words(), gazetteer.names())
    }

    fn is_capitalized(token: &str) -> bool {
        let rest = ["d'", "d’", "D'", "D’"]
            .iter()
            .find_map(|p| token.strip_prefix(p))
            .unwrap_or(token);
        rest.chars().next().is_some_and(char::is_uppercase)
    }

    fn is_connector(&self, token: &str) -> bool {
        self.connectors.iter().any(|c| c == token)
    }

    /// Split `text` into runs of tokens that may form a name.
    fn runs<'t>(&self, text: &'t str) -> Vec<Vec<&'t str>> {
        let mut runs = Vec::new();
        let mut current: Vec<&str> = Vec::new();

        let segments = text.split(|c: char| {
            !(c.is_alphanumeric() || c.is_whitespace() || matches!(c, '-' | '\'' | '’'))
        });
        for segment in segments {
            for raw in segment.split_whitespace() {
                let token = raw.trim_matches(|c: char| matches!(c, '-' | '\'' | '’'));
                if token.is_empty() {
                    // a lone dash separates clauses
                    flush(&mut runs, &mut current);
                } else if Self::is_capitalized(token) {
                    current.push(token);
                } else if !current.is_empty() && self.is_connector(token) {
                    current.push(token);
                } else {
                    flush(&mut runs, &mut current);
                }
            }
            flush(&mut runs, &mut current);
        }
        runs
    }

    /// Token count of the longest known name starting at `tokens[0]`.
    fn longest_known(&self, tokens: &[&str]) -> Option<usize> {
        (2..=tokens.len().min(self.max_words))
            .rev()
            .filter(|&len| Self::is_capitalized(tokens[len - 1]))
            .find(|&len| self.known.contains(&normalize_text(&tokens[..len].join(" "))))
    }
}

fn flush<'t>(runs: &mut Vec<Vec<&'t str>>, current: &mut Vec<&'t str>) {
    while current.last().is_some_and(|t| !CapitalizedSpanExtractor::is_capitalized(t)) {
        current.pop();
    }
    if !current.is_empty() {
        runs.push(std::mem::take(current));
    }
}

impl EntityExtractor for CapitalizedSpanExtractor {
    fn extract(&self, text: &str) -> Result<Vec<String>, Box<dyn Error>> {
        let mut candidates = Vec::new();
        for run in self.runs(text) {
            let mut start = 0;
            while start < run.len() {
                if !Self::is_capitalized(run[start]) {
                    start += 1;
                    continue;
                }
                let len = self.longest_known(&run[start..]).unwrap_or(1);
                candidates.push(run[start..start + len].join(" "));
                start += len;
            }
        }
        Ok(candidates)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(known: &[&str], text: &str) -> Vec<String> {
        CapitalizedSpanExtractor::new(4, known.iter().copied())
            .extract(text)
            .unwrap()
    }

    #[test]
    fn test_longest_known_span_wins() {
        let known = ["Santa", "Santa Cruz", "Santa Cruz Cabrália"];
        assert_eq!(
            extract(&known, "Operação em Santa Cruz Cabrália"),
            vec!["Operação", "Santa Cruz Cabrália"]
        );
        assert_eq!(extract(&known, "Fraude em Santa Cruz"), vec!["Fraude", "Santa Cruz"]);
    }

    #[test]
    fn test_nested_multi_word_names_do_not_overlap() {
        let known = ["São Félix", "São Félix do Coribe"];
        assert_eq!(
            extract(&known, "Prefeito de São Félix do Coribe é afastado"),
            vec!["Prefeito", "São Félix do Coribe"]
        );
        assert_eq!(
            extract(&known, "Prefeito de São Félix é afastado"),
            vec!["Prefeito", "São Félix"]
        );
    }

    #[test]
    fn test_connectors_inside_names() {
        let got = extract(&["Conceição do Coité"], "Prefeitura de Conceição do Coité investigada");
        assert_eq!(got, vec!["Prefeitura", "Conceição do Coité"]);
    }

    #[test]
    fn test_unknown_runs_split_into_words() {
        assert_eq!(
            extract(&[], "Polícia Federal prende Prefeito"),
            vec!["Polícia", "Federal", "Prefeito"]
        );
    }

    #[test]
    fn test_punctuation_breaks_runs() {
        let got = extract(&["Salvador Ilhéus"], "Salvador, Ilhéus: PF age");
        assert_eq!(got, vec!["Salvador", "Ilhéus", "PF"]);
    }

    #[test]
    fn test_hyphens_and_apostrophes_stay_in_words() {
        let got = extract(&["Dias d'Ávila"], "Obra em Xique-Xique e Dias d'Ávila - Bahia");
        assert_eq!(got, vec!["Obra", "Xique-Xique", "Dias d'Ávila", "Bahia"]);
    }

    #[test]
    fn test_max_words_limits_span_length() {
        let got = CapitalizedSpanExtractor::new(1, ["Vitória da Conquista"])
            .extract("Vitória da Conquista")
            .unwrap();
        assert_eq!(got, vec!["Vitória", "Conquista"]);
    }

    #[test]
    fn test_for_gazetteer() {
        let g = Gazetteer::from_entries([("Vitória da Conquista", "2933307"), ("Ilhéus", "2913606")]);
        let got = CapitalizedSpanExtractor::for_gazetteer(&g)
            .extract("Chuva em Vitória da Conquista e Ilhéus")
            .unwrap();
        assert_eq!(got, vec!["Chuva", "Vitória da Conquista", "Ilhéus"]);
    }

    #[test]
    fn test_no_capitals_no_candidates() {
        assert!(extract(&[], "nada a declarar").is_empty());
        assert!(extract(&[], "").is_empty());
    }

    #[test]
    fn test_boxed_extractor() {
        let boxed: Box<dyn EntityExtractor> = Box::new(CapitalizedSpanExtractor::default());
        assert_eq!(boxed.extract("Ilhéus").unwrap(), vec!["Ilhéus"]);
    }
}
