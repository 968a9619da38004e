//! Splits multi-municipality records into one row per municipality.
//!
//! A record whose `municipalities` field reads `"Ilhéus-2913606,Itabuna-2914802"`
//! becomes two rows, each carrying the full record plus `municipality`
//! (`Ilhéus`) and `municipality_code` (`2913606`).

use crate::models::{ExportRow, NewsRecord};

/// Split a `"Name-Code"` label into name and code.
///
/// The split happens at the last `-` so hyphenated names survive
/// (`Xique-Xique-2933604`). A label without `-` is all name.
pub fn split_label(label: &str) -> (String, String) {
    match label.rsplit_once('-') {
        Some((name, code)) => (name.trim().to_string(), code.trim().to_string()),
        None => (label.trim().to_string(), String::new()),
    }
}

/// One row per `(record, municipality)` pair.
///
/// Records with zero or one municipality produce exactly one row; an empty
/// field yields empty name and code columns.
pub fn explode(records: &[NewsRecord]) -> Vec<ExportRow> {
    let mut rows = Vec::with_capacity(records.len());
    for record in records {
        let field = record.municipalities.as_str();
        let pieces: Vec<&str> = if field.contains(',') {
            field.split(',').map(str::trim).collect()
        } else {
            vec![field]
        };

        for piece in pieces {
            let (name, code) = split_label(piece);
            rows.push(ExportRow::from_record(record, name, code));
        }
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(municipalities: &str) -> NewsRecord {
        NewsRecord {
            title: "t".into(),
            content: "c".into(),
            publisher: "p".into(),
            published: "01/01/2024".into(),
            link: format!("https://x/{municipalities}"),
            image_url: "i".into(),
            search_term: "s".into(),
            municipalities: municipalities.into(),
        }
    }

    #[test]
    fn test_split_label() {
        assert_eq!(split_label("Ilhéus-2913606"), ("Ilhéus".into(), "2913606".into()));
        assert_eq!(split_label(" Ilhéus - 2913606 "), ("Ilhéus".into(), "2913606".into()));
        assert_eq!(split_label("Xique-Xique-2933604"), ("Xique-Xique".into(), "2933604".into()));
        assert_eq!(split_label("Salvador"), ("Salvador".into(), String::new()));
        assert_eq!(split_label(""), (String::new(), String::new()));
    }

    #[test]
    fn test_explode_multiple() {
        let rows = explode(&[record("Ilhéus-2913606, Itabuna-2914802")]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].municipality, "Ilhéus");
        assert_eq!(rows[0].municipality_code, "2913606");
        assert_eq!(rows[1].municipality, "Itabuna");
        assert_eq!(rows[1].municipality_code, "2914802");
        assert!(rows.iter().all(|r| r.title == "t" && r.published == "01/01/2024"));
    }

    #[test]
    fn test_explode_empty_field_keeps_record() {
        let rows = explode(&[record("")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].municipality, "");
        assert_eq!(rows[0].municipality_code, "");
        assert_eq!(rows[0].link, "https://x/");
    }

    #[test]
    fn test_explode_untagged_value() {
        let rows = explode(&[record("Salvador")]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].municipality, "Salvador");
        assert_eq!(rows[0].municipality_code, "");
    }

    #[test]
    fn test_explode_preserves_record_order() {
        let rows = explode(&[record("A-1,B-2"), record(""), record("C-3")]);
        let names: Vec<&str> = rows.iter().map(|r| r.municipality.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "", "C"]);
    }

    #[test]
    fn test_explode_no_records() {
        assert!(explode(&[]).is_empty());
    }
}
