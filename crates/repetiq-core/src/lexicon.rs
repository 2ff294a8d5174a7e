//! Lexicon store: loading and querying the reference lexicon table.
//!
//! The lexicon is a tab-separated table mapping orthographic forms to one or
//! more candidate readings `(lemme, cgram, freq, is_lem, ...)`. Entries are
//! indexed by lowercased form; within one form the entry list preserves file
//! order, which is what makes frequency tie-breaks deterministic.
//!
//! A per-document override table uses the same schema. Where a form appears
//! in both tables, the override's candidates fully replace the base table's
//! candidates for that form.

use std::collections::{HashMap, HashSet};

use camino::Utf8Path;
use serde::Serialize;

use crate::error::{LexiconError, LexiconResult};

/// One candidate reading for an orthographic form.
#[derive(Debug, Clone, PartialEq)]
pub struct LexiconEntry {
    /// The written form exactly as it appears in the table.
    pub ortho: String,
    /// Canonical/dictionary form this reading belongs to.
    pub lemme: String,
    /// Grammatical category label (NOM, VER, ADJ, ... open-ended).
    pub cgram: String,
    /// Corpus frequency of this reading in general usage.
    pub freq: f64,
    /// Whether this entry is itself the lemma of its group.
    pub is_lem: bool,
    /// Category of the written form itself, when it differs from the lemma's.
    pub cgram_ortho: String,
    /// Free-form category tag (NOM_PROPRE, ACRONYME, ETRANGER, INCONNU, ...).
    pub categorie: String,
    /// Free-form notes column.
    pub notes: String,
}

/// Diagnostics from loading one lexicon file.
///
/// Malformed rows are a data-quality defect, never a fatal error: the load
/// continues and the summary says what was dropped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct LoadSummary {
    /// Rows successfully loaded.
    pub rows: usize,
    /// Rows skipped (wrong shape, missing ortho, unparsable frequency).
    pub skipped: usize,
    /// 1-based line numbers of the first skipped rows (at most 10).
    pub skipped_lines: Vec<u64>,
}

impl LoadSummary {
    fn record_skip(&mut self, line: u64) {
        self.skipped += 1;
        if self.skipped_lines.len() < 10 {
            self.skipped_lines.push(line);
        }
    }
}

/// Header names accepted for each logical column.
///
/// The reference lexicon ships with `Lexique3__`-prefixed headers; override
/// tables use the short names. Both resolve to the same columns.
const ORTHO_HEADERS: &[&str] = &["ortho"];
const LEMME_HEADERS: &[&str] = &["lemme", "Lexique3__lemme"];
const CGRAM_HEADERS: &[&str] = &["cgram", "Lexique3__cgram"];
const FREQ_HEADERS: &[&str] = &["freq", "Lexique3__freqlemlivres"];
const IS_LEM_HEADERS: &[&str] = &["is_lem", "Lexique3__islem"];
const CGRAM_ORTHO_HEADERS: &[&str] = &["cgramortho", "Lexique3__cgramortho"];
const CATEGORIE_HEADERS: &[&str] = &["categorie"];
const NOTES_HEADERS: &[&str] = &["notes"];

/// Resolved column indices for one file's header row.
struct Columns {
    ortho: usize,
    lemme: Option<usize>,
    cgram: Option<usize>,
    freq: Option<usize>,
    is_lem: Option<usize>,
    cgram_ortho: Option<usize>,
    categorie: Option<usize>,
    notes: Option<usize>,
}

impl Columns {
    fn resolve(headers: &csv::StringRecord) -> Option<Self> {
        let find = |names: &[&str]| {
            headers
                .iter()
                .position(|h| names.iter().any(|n| h.trim() == *n))
        };
        Some(Self {
            ortho: find(ORTHO_HEADERS)?,
            lemme: find(LEMME_HEADERS),
            cgram: find(CGRAM_HEADERS),
            freq: find(FREQ_HEADERS),
            is_lem: find(IS_LEM_HEADERS),
            cgram_ortho: find(CGRAM_ORTHO_HEADERS),
            categorie: find(CATEGORIE_HEADERS),
            notes: find(NOTES_HEADERS),
        })
    }
}

/// The loaded lexicon: form → candidate readings, plus the compound index.
#[derive(Debug, Default)]
pub struct Lexicon {
    /// Candidate readings keyed by lowercased form; file order preserved.
    entries: HashMap<String, Vec<LexiconEntry>>,
    /// Lowercased forms containing at least one space.
    compounds_with_spaces: HashSet<String>,
    /// Diagnostics from the base table load.
    summary: LoadSummary,
}

impl Lexicon {
    /// Load the base lexicon from a TSV file.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub fn load(path: &Utf8Path) -> LexiconResult<Self> {
        let mut lexicon = Self::default();
        lexicon.summary = lexicon.load_into(path, false)?;
        tracing::info!(
            forms = lexicon.entries.len(),
            rows = lexicon.summary.rows,
            skipped = lexicon.summary.skipped,
            "lexicon loaded"
        );
        Ok(lexicon)
    }

    /// Merge a per-document override table.
    ///
    /// For every form present in the override file, the base candidates for
    /// that form are fully replaced (not merged). Returns the override file's
    /// own load summary.
    #[tracing::instrument(skip_all, fields(path = %path))]
    pub fn merge_override(&mut self, path: &Utf8Path) -> LexiconResult<LoadSummary> {
        let summary = self.load_into(path, true)?;
        tracing::info!(
            rows = summary.rows,
            skipped = summary.skipped,
            "override lexicon merged"
        );
        Ok(summary)
    }

    /// Shared loader for base and override tables.
    ///
    /// When `replace` is set, the first row for a form clears any candidates
    /// already stored for it; subsequent rows for the same form in the same
    /// file append as usual.
    fn load_into(&mut self, path: &Utf8Path, replace: bool) -> LexiconResult<LoadSummary> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_path(path.as_std_path())
            .map_err(|e| Self::io_error(path, e))?;

        let headers = reader
            .headers()
            .map_err(|e| Self::io_error(path, e))?
            .clone();
        let columns =
            Columns::resolve(&headers).ok_or_else(|| LexiconError::MissingHeader {
                path: path.to_path_buf(),
            })?;

        let mut summary = LoadSummary::default();
        let mut replaced: HashSet<String> = HashSet::new();

        for (idx, record) in reader.records().enumerate() {
            // Header is line 1; data rows start at line 2.
            let line = idx as u64 + 2;
            let record = match record {
                Ok(r) => r,
                Err(err) => {
                    tracing::warn!(%path, line, error = %err, "skipping malformed lexicon row");
                    summary.record_skip(line);
                    continue;
                }
            };

            let Some(entry) = Self::parse_record(&record, &columns) else {
                tracing::warn!(%path, line, "skipping malformed lexicon row");
                summary.record_skip(line);
                continue;
            };

            let key = entry.ortho.to_lowercase();
            if key.contains(' ') {
                self.compounds_with_spaces.insert(key.clone());
            }
            if replace && replaced.insert(key.clone()) {
                self.entries.remove(&key);
            }
            self.entries.entry(key).or_default().push(entry);
            summary.rows += 1;
        }

        Ok(summary)
    }

    /// Parse one record into an entry. Returns `None` for rows that should
    /// be skipped: missing ortho, or a non-empty frequency that fails to
    /// parse. An *empty* frequency field is a valid "unknown" and ranks
    /// lowest (0.0).
    fn parse_record(record: &csv::StringRecord, columns: &Columns) -> Option<LexiconEntry> {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .unwrap_or_default()
        };

        let ortho = record.get(columns.ortho)?.trim();
        if ortho.is_empty() {
            return None;
        }

        let freq_raw = field(columns.freq);
        let freq = if freq_raw.is_empty() {
            0.0
        } else {
            freq_raw.parse::<f64>().ok()?
        };

        let is_lem = matches!(field(columns.is_lem), "1" | "true");

        let lemme = field(columns.lemme);
        Some(LexiconEntry {
            ortho: ortho.to_string(),
            lemme: if lemme.is_empty() {
                ortho.to_string()
            } else {
                lemme.to_string()
            },
            cgram: field(columns.cgram).to_string(),
            freq,
            is_lem,
            cgram_ortho: field(columns.cgram_ortho).to_string(),
            categorie: field(columns.categorie).to_string(),
            notes: field(columns.notes).to_string(),
        })
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

    /// All candidate readings for a form, case-insensitively.
    ///
    /// The returned slice preserves table order. Empty means "no candidate",
    /// never an error.
    pub fn lookup(&self, word: &str) -> &[LexiconEntry] {
        self.entries
            .get(&word.to_lowercase())
            .map_or(&[], Vec::as_slice)
    }

    /// Whether any reading exists for this form.
    pub fn contains_form(&self, word: &str) -> bool {
        self.entries.contains_key(&word.to_lowercase())
    }

    /// The entry where `ortho == lemma` and `is_lem` is set, if any.
    ///
    /// Used to follow an inflected reading back to its lemma's category.
    pub fn find_lemma_entry(&self, lemma: &str) -> Option<&LexiconEntry> {
        self.lookup(lemma).iter().find(|e| e.is_lem)
    }

    /// Lowercased forms containing spaces, for tokenizer lookahead.
    pub const fn compounds_with_spaces(&self) -> &HashSet<String> {
        &self.compounds_with_spaces
    }

    /// Number of distinct orthographic forms.
    pub fn form_count(&self) -> usize {
        self.entries.len()
    }

    /// Diagnostics from the base table load.
    pub const fn summary(&self) -> &LoadSummary {
        &self.summary
    }

    /// Build a lexicon directly from entries, for tests and callers that
    /// already hold an in-memory table.
    pub fn from_entries<I: IntoIterator<Item = LexiconEntry>>(rows: I) -> Self {
        let mut lexicon = Self::default();
        for entry in rows {
            let key = entry.ortho.to_lowercase();
            if key.contains(' ') {
                lexicon.compounds_with_spaces.insert(key.clone());
            }
            lexicon.entries.entry(key).or_default().push(entry);
            lexicon.summary.rows += 1;
        }
        lexicon
    }
}

/// Shorthand entry constructor used by tests across the crate.
#[cfg(test)]
pub(crate) fn entry(ortho: &str, lemme: &str, cgram: &str, freq: f64, is_lem: bool) -> LexiconEntry {
    LexiconEntry {
        ortho: ortho.to_string(),
        lemme: lemme.to_string(),
        cgram: cgram.to_string(),
        freq,
        is_lem,
        cgram_ortho: String::new(),
        categorie: String::new(),
        notes: String::new(),
    }
}
