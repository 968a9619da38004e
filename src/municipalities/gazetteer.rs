//! Municipality gazetteer: canonical names, codes, and the multi-word index.
//!
//! The gazetteer is built once at startup from the official municipality
//! table, either as an `.xlsx` workbook or a CSV export, and is read-only afterwards. Every lookup goes through
//! the normalized name (see [`normalize_text`]).

use super::normalize::normalize_text;
use crate::config::GazetteerConfig;
use calamine::{Reader, Xlsx};
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::{info, instrument, warn};

/// Immutable `normalized name -> "Name-Code"` table plus derived indices.
#[derive(Debug, Default)]
pub struct Gazetteer {
    /// Normalized name to the `"OriginalName-Code"` label.
    labels: HashMap<String, String>,
    /// Normalized multi-word name to its components that are names themselves.
    multi_word: HashMap<String, Vec<String>>,
    /// Reverse of `multi_word`: component to the multi-word names containing it.
    containing: HashMap<String, Vec<String>>,
    /// Word count of the longest name.
    max_words: usize,
}

impl Gazetteer {
    /// Build from `(canonical_name, code)` pairs.
    ///
    /// Names that collide after normalization keep the first entry; the
    /// collision is logged.
    pub fn from_entries<I, N, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (N, C)>,
        N: AsRef<str>,
        C: AsRef<str>,
    {
        let mut labels = HashMap::new();
        let mut max_words = 0;

        for (name, code) in entries {
            let name = name.as_ref().trim();
            let code = code.as_ref().trim();
            let key = normalize_text(name);

            if labels.contains_key(&key) {
                warn!(%name, %key, "Duplicate normalized municipality name; keeping first entry");
                continue;
            }
            max_words = max_words.max(key.split_whitespace().count());
            labels.insert(key, format!("{name}-{code}"));
        }

        let mut multi_word: HashMap<String, Vec<String>> = HashMap::new();
        for key in labels.keys().filter(|k| k.contains(' ')) {
            let mut components = Vec::new();
            for component in key.split_whitespace() {
                if labels.contains_key(component) && !components.iter().any(|c| c == component) {
                    components.push(component.to_string());
                }
            }
            if !components.is_empty() {
                multi_word.insert(key.clone(), components);
            }
        }

        let mut containing: HashMap<String, Vec<String>> = HashMap::new();
        for (multi, components) in &multi_word {
            for component in components {
                containing
                    .entry(component.clone())
                    .or_default()
                    .push(multi.clone());
            }
        }

        Self {
            labels,
            multi_word,
            containing,
            max_words,
        }
    }

    /// Build from a header row and data rows, taking names and codes from
    /// the named columns.
    ///
    /// Rows missing either value are skipped with a warning.
    fn from_table<I>(
        headers: &[String],
        rows: I,
        name_column: &str,
        code_column: &str,
    ) -> Result<Self, Box<dyn Error>>
    where
        I: IntoIterator<Item = Result<Vec<String>, Box<dyn Error>>>,
    {
        let find = |column: &str| {
            headers
                .iter()
                .position(|h| h.trim().trim_start_matches('\u{feff}') == column)
                .ok_or_else(|| format!("gazetteer column {column:?} not found in header {headers:?}"))
        };
        let name_idx = find(name_column)?;
        let code_idx = find(code_column)?;

        let mut entries = Vec::new();
        for (line, row) in rows.into_iter().enumerate() {
            let row = row?;
            let name = row.get(name_idx).map_or("", |s| s.trim());
            let code = row.get(code_idx).map_or("", |s| s.trim());
            if name.is_empty() || code.is_empty() {
                warn!(row = line + 2, "Skipping gazetteer row with empty name or code");
                continue;
            }
            entries.push((name.to_string(), code.to_string()));
        }

        Ok(Self::from_entries(entries))
    }

    /// Read a CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if the CSV is malformed or either column is absent.
    pub fn from_csv_reader<R: Read>(
        reader: R,
        name_column: &str,
        code_column: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let rows = rdr.records().map(|record| {
            record
                .map(|r| r.iter().map(str::to_string).collect::<Vec<String>>())
                .map_err(|e| Box::new(e) as Box<dyn Error>)
        });
        Self::from_table(&headers, rows, name_column, code_column)
    }

    /// Read `sheet` of an `.xlsx` workbook whose first row is the header.
    ///
    /// Numeric codes are rendered without a fractional part.
    ///
    /// # Errors
    ///
    /// Returns an error if the workbook cannot be opened, the sheet is
    /// missing or empty, or either column is absent.
    pub fn from_xlsx_reader<R: Read + Seek>(
        reader: R,
        sheet: &str,
        name_column: &str,
        code_column: &str,
    ) -> Result<Self, Box<dyn Error>> {
        let mut workbook: Xlsx<R> = Xlsx::new(reader)?;
        let range = workbook.worksheet_range(sheet)?;
        let mut rows = range
            .rows()
            .map(|row| row.iter().map(|cell| cell.to_string()).collect::<Vec<String>>());
        let headers = rows
            .next()
            .ok_or_else(|| format!("gazetteer sheet {sheet:?} is empty"))?;
        Self::from_table(&headers, rows.map(Ok), name_column, code_column)
    }

    /// Load the gazetteer from disk.
    ///
    /// `.xlsx` files are read from the configured sheet; anything else is
    /// parsed as CSV.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, cfg: &GazetteerConfig) -> Result<Self, Box<dyn Error>> {
        let path = path.as_ref();
        let is_xlsx = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

        let file = File::open(path)?;
        let gazetteer = if is_xlsx {
            Self::from_xlsx_reader(BufReader::new(file), &cfg.sheet, &cfg.name_column, &cfg.code_column)?
        } else {
            Self::from_csv_reader(file, &cfg.name_column, &cfg.code_column)?
        };
        info!(
            count = gazetteer.len(),
            multi_word = gazetteer.multi_word.len(),
            format = if is_xlsx { "xlsx" } else { "csv" },
            "Loaded municipality gazetteer"
        );
        Ok(gazetteer)
    }

    /// Whether `normalized` is a known municipality key.
    pub fn contains(&self, normalized: &str) -> bool {
        self.labels.contains_key(normalized)
    }

    /// The `"OriginalName-Code"` label for a normalized key.
    pub fn label(&self, normalized: &str) -> Option<&str> {
        self.labels.get(normalized).map(String::as_str)
    }

    /// Every normalized name, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.labels.keys().map(String::as_str)
    }

    /// Multi-word names that list `component` among their components.
    pub fn multi_words_containing<'a>(&'a self, component: &str) -> impl Iterator<Item = &'a str> {
        self.containing
            .get(component)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    /// True if `component` belongs to a multi-word name found in `detected`.
    pub fn is_part_of_any(&self, component: &str, detected: &HashSet<String>) -> bool {
        self.multi_words_containing(component)
            .any(|multi| detected.contains(multi))
    }

    /// Word count of the longest municipality name.
    pub fn max_words(&self) -> usize {
        self.max_words
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Gazetteer {
        Gazetteer::from_entries([
            ("Santa Cruz Cabrália", "2927705"),
            ("Santa Cruz", "1000001"),
            ("Santa", "1000002"),
            ("Ilhéus", "2913606"),
            ("Conceição do Coité", "2908408"),
        ])
    }

    #[test]
    fn test_labels_keep_original_name() {
        let g = sample();
        assert_eq!(g.label("ilheus"), Some("Ilhéus-2913606"));
        assert_eq!(g.label("santa cruz cabralia"), Some("Santa Cruz Cabrália-2927705"));
        assert!(g.contains("conceicao do coite"));
        assert!(!g.contains("Ilhéus"));
        assert_eq!(g.len(), 5);
    }

    #[test]
    fn test_multi_word_index_lists_only_known_components() {
        let g = sample();
        assert_eq!(g.multi_word["santa cruz cabralia"], vec!["santa"]);
        assert_eq!(g.multi_word["santa cruz"], vec!["santa"]);
        // "conceicao", "do" and "coite" are not municipalities on their own
        assert!(!g.multi_word.contains_key("conceicao do coite"));

        let mut parents: Vec<&str> = g.multi_words_containing("santa").collect();
        parents.sort();
        assert_eq!(parents, vec!["santa cruz", "santa cruz cabralia"]);
        assert_eq!(g.multi_words_containing("ilheus").count(), 0);
    }

    #[test]
    fn test_is_part_of_any() {
        let g = sample();
        let detected: HashSet<String> = ["santa".to_string(), "santa cruz".to_string()].into();
        assert!(g.is_part_of_any("santa", &detected));
        assert!(!g.is_part_of_any("ilheus", &detected));

        let only_single: HashSet<String> = ["santa".to_string()].into();
        assert!(!g.is_part_of_any("santa", &only_single));
    }

    #[test]
    fn test_max_words() {
        assert_eq!(sample().max_words(), 3);
        assert_eq!(Gazetteer::default().max_words(), 0);
    }

    #[test]
    fn test_duplicate_normalized_keeps_first() {
        let g = Gazetteer::from_entries([("Glória", "1"), ("Gloria", "2")]);
        assert_eq!(g.len(), 1);
        assert_eq!(g.label("gloria"), Some("Glória-1"));
    }

    #[test]
    fn test_from_csv_reader() {
        let csv = "\u{feff}Município,Nome_Município,UF\n\
                   2913606,Ilhéus,BA\n\
                   ,Sem Código,BA\n\
                   2933604,Xique-Xique,BA\n";
        let g = Gazetteer::from_csv_reader(csv.as_bytes(), "Nome_Município", "Município").unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.label("xique-xique"), Some("Xique-Xique-2933604"));
        assert!(!g.contains("sem codigo"));
    }

    #[test]
    fn test_from_csv_reader_missing_column() {
        let csv = "codigo,nome\n1,Salvador\n";
        let err = Gazetteer::from_csv_reader(csv.as_bytes(), "Nome_Município", "Município")
            .unwrap_err();
        assert!(err.to_string().contains("Nome_Município"));
    }

    fn columns(name: &str, code: &str) -> GazetteerConfig {
        GazetteerConfig {
            name_column: name.to_string(),
            code_column: code.to_string(),
            ..GazetteerConfig::default()
        }
    }

    /// Workbook with a `municipios_bahia` sheet; codes stored as numbers.
    fn workbook_bytes() -> Vec<u8> {
        let mut workbook = rust_xlsxwriter::Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.set_name("municipios_bahia").unwrap();
        sheet.write_string(0, 0, "Município").unwrap();
        sheet.write_string(0, 1, "Nome_Município").unwrap();
        sheet.write_number(1, 0, 2913606.0).unwrap();
        sheet.write_string(1, 1, "Ilhéus").unwrap();
        sheet.write_number(2, 0, 2929370.0).unwrap();
        sheet.write_string(2, 1, "São Félix do Coribe").unwrap();
        workbook.save_to_buffer().unwrap()
    }

    #[test]
    fn test_load_csv_file() {
        let path = std::env::temp_dir().join(format!("gazetteer_test_{}.csv", std::process::id()));
        std::fs::write(&path, "nome,codigo\nSalvador,2927408\n").unwrap();
        let g = Gazetteer::load(&path, &columns("nome", "codigo")).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(g.label("salvador"), Some("Salvador-2927408"));
    }

    #[test]
    fn test_from_xlsx_reader() {
        let g = Gazetteer::from_xlsx_reader(
            std::io::Cursor::new(workbook_bytes()),
            "municipios_bahia",
            "Nome_Município",
            "Município",
        )
        .unwrap();
        assert_eq!(g.len(), 2);
        assert_eq!(g.label("ilheus"), Some("Ilhéus-2913606"));
        assert_eq!(g.label("sao felix do coribe"), Some("São Félix do Coribe-2929370"));
    }

    #[test]
    fn test_from_xlsx_reader_missing_sheet() {
        let res = Gazetteer::from_xlsx_reader(
            std::io::Cursor::new(workbook_bytes()),
            "municipios_sergipe",
            "Nome_Município",
            "Município",
        );
        assert!(res.is_err());
    }

    #[test]
    fn test_load_picks_xlsx_by_extension() {
        let path = std::env::temp_dir().join(format!("gazetteer_test_{}.xlsx", std::process::id()));
        std::fs::write(&path, workbook_bytes()).unwrap();
        let g = Gazetteer::load(&path, &GazetteerConfig::default()).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(g.label("ilheus"), Some("Ilhéus-2913606"));
    }
}
