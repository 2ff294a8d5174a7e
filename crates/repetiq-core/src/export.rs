//! Override-lexicon export.
//!
//! Words the lexicon does not know (plus shape-classified proper nouns and
//! acronyms) are written to a per-document TSV the user can hand-edit and
//! feed back as an override table. Rows already present in the file are
//! preserved verbatim — hand edits survive re-export — and only new forms
//! are appended. Rows sort by a diacritic- and case-insensitive key so
//! `École` files next to `ecole`.

use std::collections::HashMap;

use camino::Utf8Path;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::analysis::AnalysisReport;
use crate::error::{LexiconError, LexiconResult};

/// Categories whose lemmas are eligible for export.
const EXPORTABLE_CATEGORIES: &[&str] = &["NOM_PROPRE", "ACRONYME", "ETRANGER", "INCONNU"];

/// One row of the override table.
#[derive(Debug, Clone)]
struct ExportRow {
    ortho: String,
    lemme: String,
    cgram: String,
    freq: f64,
    is_lem: bool,
}

/// Outcome of one export.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ExportSummary {
    /// Rows already in the file, preserved verbatim.
    pub preserved: usize,
    /// New rows appended this run.
    pub added: usize,
}

impl ExportSummary {
    /// Total rows written.
    pub const fn total(&self) -> usize {
        self.preserved + self.added
    }
}

/// Sort key: decomposed, stripped of combining marks, lowercased.
fn sort_key(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Export the report's unknown words to `path`, preserving existing rows.
#[tracing::instrument(skip_all, fields(path = %path))]
pub fn export_unknown_words(
    report: &AnalysisReport,
    path: &Utf8Path,
) -> LexiconResult<ExportSummary> {
    let existing = read_existing(path)?;

    let mut rows: Vec<ExportRow> = existing.values().cloned().collect();
    let mut summary = ExportSummary {
        preserved: rows.len(),
        added: 0,
    };

    for section in &report.categories {
        if !EXPORTABLE_CATEGORIES.contains(&section.category.as_str()) {
            continue;
        }
        for lemma in &section.lemmas {
            if !lemma.is_unknown {
                continue;
            }
            for form in &lemma.forms {
                if existing.contains_key(&form.to_lowercase()) {
                    continue;
                }
                rows.push(ExportRow {
                    ortho: form.clone(),
                    lemme: lemma.display.clone(),
                    cgram: section.category.clone(),
                    freq: lemma.count as f64,
                    is_lem: form == &lemma.display,
                });
                summary.added += 1;
            }
        }
    }

    rows.sort_by_key(|row| (sort_key(&row.ortho), row.ortho.clone()));
    write_rows(path, &rows)?;

    tracing::info!(
        preserved = summary.preserved,
        added = summary.added,
        "override lexicon exported"
    );
    Ok(summary)
}

/// Read the existing override file, keyed by lowercased ortho. A missing
/// file is an empty table, not an error.
fn read_existing(path: &Utf8Path) -> LexiconResult<HashMap<String, ExportRow>> {
    let mut existing = HashMap::new();
    if !path.is_file() {
        return Ok(existing);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path.as_std_path())
        .map_err(|e| io_error(path, e))?;

    let headers = reader.headers().map_err(|e| io_error(path, e))?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);
    let (Some(ortho_col), lemme_col, cgram_col, freq_col, is_lem_col) = (
        column("ortho"),
        column("lemme"),
        column("cgram"),
        column("freq"),
        column("is_lem"),
    ) else {
        return Err(LexiconError::MissingHeader {
            path: path.to_path_buf(),
        });
    };

    for record in reader.records() {
        let Ok(record) = record else { continue };
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
        };
        let ortho = field(Some(ortho_col));
        if ortho.is_empty() {
            continue;
        }
        let lemme = field(lemme_col);
        existing.insert(
            ortho.to_lowercase(),
            ExportRow {
                ortho: ortho.to_string(),
                lemme: if lemme.is_empty() {
                    ortho.to_string()
                } else {
                    lemme.to_string()
                },
                cgram: field(cgram_col).to_string(),
                freq: field(freq_col).parse().unwrap_or(0.0),
                is_lem: matches!(field(is_lem_col), "1" | "true" | ""),
            },
        );
    }

    Ok(existing)
}

fn write_rows(path: &Utf8Path, rows: &[ExportRow]) -> LexiconResult<()> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_path(path.as_std_path())
        .map_err(|e| io_error(path, e))?;

    writer
        .write_record(["ortho", "lemme", "cgram", "freq", "is_lem"])
        .map_err(|e| io_error(path, e))?;
    for row in rows {
        writer
            .write_record([
                row.ortho.as_str(),
                row.lemme.as_str(),
                row.cgram.as_str(),
                &row.freq.to_string(),
                if row.is_lem { "1" } else { "0" },
            ])
            .map_err(|e| io_error(path, e))?;
    }
    writer.flush().map_err(|e| LexiconError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}

fn io_error(path: &Utf8Path, err: csv::Error) -> LexiconError {
    match err.into_kind() {
        csv::ErrorKind::Io(source) => LexiconError::Io {
            path: path.to_path_buf(),
            source,
        },
        _ => LexiconError::MissingHeader {
            path: path.to_path_buf(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisParams, run_analysis};
    use crate::lexicon::{Lexicon, entry};
    use camino::Utf8PathBuf;
    use std::fs;
    use tempfile::TempDir;

    fn analyzed_report() -> AnalysisReport {
        let lexicon = Lexicon::from_entries([entry("le", "le", "ART:def", 38000.0, true)]);
        let text = "Le Zorglub rencontre DNF. Zorglub salue pixel et pixel.";
        run_analysis(text, &lexicon, &AnalysisParams::default()).unwrap()
    }

    #[test]
    fn sort_key_ignores_case_and_diacritics() {
        assert_eq!(sort_key("École"), "ecole");
        assert_eq!(sort_key("élan"), "elan");
        assert_eq!(sort_key("Zèbre"), "zebre");
    }

    #[test]
    fn exports_unknown_words_sorted() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("custom.tsv")).unwrap();

        let summary = export_unknown_words(&analyzed_report(), &path).unwrap();
        assert_eq!(summary.preserved, 0);
        assert!(summary.added >= 3);

        let content = fs::read_to_string(path.as_std_path()).unwrap();
        let mut lines = content.lines();
        assert_eq!(lines.next().unwrap(), "ortho\tlemme\tcgram\tfreq\tis_lem");
        let orthos: Vec<&str> = lines
            .map(|l| l.split('\t').next().unwrap())
            .collect();
        let mut sorted = orthos.clone();
        sorted.sort_by_key(|o| sort_key(o));
        assert_eq!(orthos, sorted);
        assert!(orthos.contains(&"Zorglub"));
        assert!(orthos.contains(&"DNF"));
        assert!(orthos.contains(&"pixel"));
    }

    #[test]
    fn existing_rows_survive_re_export() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("custom.tsv")).unwrap();

        // Hand-edited file: pixel recategorized as foreign.
        fs::write(
            path.as_std_path(),
            "ortho\tlemme\tcgram\tfreq\tis_lem\npixel\tpixel\tETRANGER\t2\t1\n",
        )
        .unwrap();

        let summary = export_unknown_words(&analyzed_report(), &path).unwrap();
        assert_eq!(summary.preserved, 1);

        let content = fs::read_to_string(path.as_std_path()).unwrap();
        let pixel_row = content
            .lines()
            .find(|l| l.starts_with("pixel\t"))
            .expect("pixel row kept");
        assert!(pixel_row.contains("ETRANGER"));
        // The hand edit was not duplicated by the new-entry pass.
        assert_eq!(
            content.lines().filter(|l| l.starts_with("pixel\t")).count(),
            1
        );
    }

    #[test]
    fn re_export_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let path = Utf8PathBuf::try_from(tmp.path().join("custom.tsv")).unwrap();

        let report = analyzed_report();
        export_unknown_words(&report, &path).unwrap();
        let first = fs::read_to_string(path.as_std_path()).unwrap();

        let summary = export_unknown_words(&report, &path).unwrap();
        assert_eq!(summary.added, 0);
        let second = fs::read_to_string(path.as_std_path()).unwrap();
        assert_eq!(first, second);
    }
}
