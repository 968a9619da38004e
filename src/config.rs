//! YAML configuration.
//!
//! Everything that is locale- or state-specific lives here so it can be
//! tuned without recompiling: the state, where the gazetteer comes from,
//! the ambiguous-word list and geographic trigger words, and the Google
//! News locale. Every field has a default, so a config file only needs the
//! keys it changes.
//!
//! ```yaml
//! state:
//!   name: Bahia
//!   code: BA
//! gazetteer:
//!   path: data/municipios_metadata.xlsx
//!   sheet: municipios_bahia
//! disambiguation:
//!   ambiguous_words: [nova, gloria, santana]
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::{info, instrument};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub state: StateConfig,
    pub gazetteer: GazetteerConfig,
    pub disambiguation: DisambiguationConfig,
    pub search: SearchConfig,
}

/// The state whose municipalities are detected.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StateConfig {
    /// Full name; never reported as a municipality.
    pub name: String,
    /// Two-letter abbreviation stripped from `(BA)` style suffixes.
    pub code: String,
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            name: "Bahia".to_string(),
            code: "BA".to_string(),
        }
    }
}

/// Location and layout of the gazetteer table.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GazetteerConfig {
    /// `.xlsx` or CSV; chosen by extension.
    pub path: Option<String>,
    /// Sheet read from `.xlsx` workbooks.
    pub sheet: String,
    pub name_column: String,
    pub code_column: String,
}

impl Default for GazetteerConfig {
    fn default() -> Self {
        Self {
            path: Some("data/municipios_bahia.csv".to_string()),
            sheet: "municipios_bahia".to_string(),
            name_column: "Nome_Município".to_string(),
            code_column: "Município".to_string(),
        }
    }
}

/// Word lists driving the ambiguity heuristics.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DisambiguationConfig {
    /// Common words that are also municipality names. Normalized on load.
    pub ambiguous_words: Vec<String>,
    /// "prefeitura de X"
    pub place_nouns: Vec<String>,
    /// "em X"; matched literally, so `à` differs from `a`.
    pub prepositions: Vec<String>,
    /// "X prefeitura"
    pub trailing_nouns: Vec<String>,
}

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

impl Default for DisambiguationConfig {
    fn default() -> Self {
        Self {
            ambiguous_words: strings(&[
                "saude", "gloria", "vitoria", "esperanca", "nazare", "america", "campo",
                "alegre", "formosa", "nova", "belo", "bonito", "feira", "central", "santana",
                "wagner",
            ]),
            place_nouns: strings(&["prefeitura", "município", "cidade", "câmara"]),
            prepositions: strings(&["em", "na", "no", "de", "do", "da", "para", "à", "às"]),
            trailing_nouns: strings(&["prefeitura", "município", "cidade"]),
        }
    }
}

/// Google News request settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SearchConfig {
    pub root_url: String,
    /// Interface language (`hl`).
    pub hl: String,
    /// Country (`gl`).
    pub gl: String,
    /// Edition (`ceid`).
    pub ceid: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Retries after the first failed request.
    pub max_retries: usize,
    /// Articles published before this year are dropped.
    pub min_year: i32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            root_url: "https://news.google.com".to_string(),
            hl: "pt-BR".to_string(),
            gl: "BR".to_string(),
            ceid: "BR:pt-419".to_string(),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
                         (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
                .to_string(),
            timeout_secs: 15,
            max_retries: 5,
            min_year: 2023,
        }
    }
}

impl AppConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load from `path`, or fall back to the built-in defaults when `None`.
    #[instrument(level = "info")]
    pub async fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(path) => {
                let yaml = tokio::fs::read_to_string(path).await?;
                let config = Self::from_yaml(&yaml)?;
                info!(path = %path.display(), state = %config.state.name, "Loaded configuration");
                Ok(config)
            }
            None => {
                info!("No config file given; using built-in defaults");
                Ok(Self::default())
            }
        }
    }
}
