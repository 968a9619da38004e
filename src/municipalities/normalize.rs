//! Case- and accent-insensitive keys for gazetteer lookups.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lower-case `text` and strip its diacritics.
///
/// The text is decomposed (NFKD), combining marks are dropped, and the
/// remainder is lower-cased. Lower-casing runs last so compatibility
/// decompositions that produce capitals (`ℌ` -> `H`) still fold.
///
/// ```ignore
/// assert_eq!(normalize_text("Ilhéus"), "ilheus");
/// assert_eq!(normalize_text("CONCEIÇÃO DO COITÉ"), "conceicao do coite");
/// ```
pub fn normalize_text(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}
