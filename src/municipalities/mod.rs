//! Municipality mention detection.
//!
//! Given a news headline and its snippet, find which municipalities of the
//! configured state are mentioned and return them as `"Name-Code"` labels.
//!
//! # Pipeline
//!
//! 1. [`context::SuffixStripper`] drops `(BA)`, `- BA`, `, BA` suffixes.
//! 2. An [`EntityExtractor`] proposes candidate names from the title.
//! 3. Candidates are normalized ([`normalize_text`]) and looked up in the
//!    [`Gazetteer`]; the state's own name is dropped.
//! 4. [`context::AmbiguityFilter`] requires a geographic phrase around
//!    common words that happen to be municipality names ("Nova", "Glória").
//! 5. Single words that are part of a detected multi-word name are
//!    suppressed ("Santa" when "Santa Cruz" was also extracted).
//! 6. Survivors are mapped to labels and deduplicated in first-seen order.

pub mod context;
pub mod extractor;
pub mod gazetteer;
pub mod normalize;
pub mod resolver;

pub use extractor::{CapitalizedSpanExtractor, EntityExtractor};
pub use gazetteer::Gazetteer;
pub use normalize::normalize_text;
pub use resolver::MunicipalityResolver;
