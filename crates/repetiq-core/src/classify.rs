//! Grammatical classification and frequency disambiguation.
//!
//! Each distinct written form gets exactly one reading. Forms present in the
//! lexicon resolve through their candidate entries; ambiguous forms (several
//! candidate readings) resolve to the reading with the highest corpus
//! frequency, ties going to the earliest entry in table order. Forms absent
//! from the lexicon fall back to shape heuristics (number, acronym, proper
//! noun) or come out as unknown — unknown is a value here, never an error.
//!
//! The statistically dominant reading of a form in general usage is taken as
//! its reading in any given text. That is accurate for the function words
//! that dominate ambiguity counts and an acknowledged simplification for
//! open-class words.

use std::collections::{HashMap, HashSet};

use crate::lexicon::{Lexicon, LexiconEntry};

/// Category assigned to all-caps forms absent from the lexicon.
pub const CATEGORY_ACRONYM: &str = "ACRONYME";
/// Category assigned to capitalized forms absent from the lexicon.
pub const CATEGORY_PROPER_NOUN: &str = "NOM_PROPRE";
/// Category assigned to unresolvable forms.
pub const CATEGORY_UNKNOWN: &str = "INCONNU";
/// Category assigned to numeric tokens.
pub const CATEGORY_NUMBER: &str = "NUM";

/// Replace French ligatures for lexicon lookup.
///
/// The surface form keeps its ligatures everywhere else; only the lookup key
/// is rewritten.
pub fn normalize_ligatures(word: &str) -> String {
    word.replace('œ', "oe")
        .replace('æ', "ae")
        .replace('Œ', "Oe")
        .replace('Æ', "Ae")
}

/// Whether a token is a pure number, separators included.
///
/// Mixed forms like `GRA1` contain letters and are not numbers.
pub fn is_number(word: &str) -> bool {
    if word.chars().any(char::is_alphabetic) {
        return false;
    }
    let cleaned: String = word.chars().filter(|c| *c != ' ' && *c != ',').collect();
    !cleaned.is_empty() && cleaned.chars().all(|c| c.is_ascii_digit())
}

/// Whether a form looks like an acronym: all uppercase, at least two chars,
/// at least one letter.
pub fn is_acronym(word: &str) -> bool {
    word.chars().any(char::is_alphabetic)
        && word.chars().count() > 1
        && word == word.to_uppercase()
        && word != word.to_lowercase()
}

/// Whether a form looks like a proper noun: initial capital followed by at
/// least one lowercase letter.
pub fn is_proper_noun(word: &str) -> bool {
    let mut chars = word.chars();
    chars
        .next()
        .is_some_and(char::is_uppercase)
        && word.chars().skip(1).any(char::is_lowercase)
}

/// Resolution status of one form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Exactly one reading was produced.
    Classified,
    /// Several candidate readings exist and disambiguation was not requested.
    Ambiguous,
    /// No reading could be produced.
    Unknown,
}

/// The resolved reading for one written form.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// The form as passed in.
    pub word: String,
    /// Resolution status.
    pub status: Status,
    /// Grammatical category, when classified.
    pub cgram: Option<String>,
    /// Canonical lemma, when one was resolved from the lexicon.
    pub lemma: Option<String>,
    /// Number of candidate entries found in the lexicon.
    pub entry_count: usize,
}

impl Classification {
    fn unknown(word: &str, entry_count: usize) -> Self {
        Self {
            word: word.to_string(),
            status: Status::Unknown,
            cgram: None,
            lemma: None,
            entry_count,
        }
    }

    fn shaped(word: &str, cgram: &str) -> Self {
        Self {
            word: word.to_string(),
            status: Status::Classified,
            cgram: Some(cgram.to_string()),
            lemma: None,
            entry_count: 0,
        }
    }
}

/// One candidate reading of an ambiguous form, with its resolved category.
#[derive(Debug, Clone)]
pub struct AmbiguousReading {
    /// The lexicon entry backing this reading.
    pub entry: LexiconEntry,
    /// Category after following the lemma chain.
    pub cgram: String,
}

/// Classifier over one lexicon, with a registry of acronym/proper-noun
/// sightings so conflicting casings of the same form resolve consistently.
#[derive(Debug)]
pub struct WordClassifier<'a> {
    lexicon: &'a Lexicon,
    acronyms: HashSet<String>,
    proper_nouns: HashSet<String>,
}

impl<'a> WordClassifier<'a> {
    /// Create a classifier over the given lexicon.
    pub fn new(lexicon: &'a Lexicon) -> Self {
        Self {
            lexicon,
            acronyms: HashSet::new(),
            proper_nouns: HashSet::new(),
        }
    }

    /// First pass: register the casing variants of forms absent from the
    /// lexicon, so that a form seen both as `JOAN` and `Joan` later resolves
    /// to a proper noun for both spellings.
    pub fn register_forms<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for word in words {
            let word = word.as_ref();
            let normalized = normalize_ligatures(word);
            if self.lexicon.lookup(&normalized).is_empty() {
                if is_acronym(word) {
                    self.acronyms.insert(word.to_lowercase());
                } else if is_proper_noun(word) {
                    self.proper_nouns.insert(word.to_lowercase());
                }
            }
        }
    }

    /// Classify one form.
    ///
    /// With `disambiguate` set, a form with several candidate readings
    /// resolves to the highest-frequency one; otherwise it comes back
    /// [`Status::Ambiguous`].
    pub fn classify(&self, word: &str, disambiguate: bool) -> Classification {
        if is_number(word) {
            return Classification::shaped(word, CATEGORY_NUMBER);
        }

        let normalized = normalize_ligatures(word);
        let entries = self.lexicon.lookup(&normalized);

        match entries.len() {
            0 => self.classify_absent(word),
            1 => self.classify_entry(word, &entries[0], 1),
            n if disambiguate => {
                let best = pick_by_frequency(entries);
                self.classify_entry(word, best, n)
            }
            n => Classification {
                word: word.to_string(),
                status: Status::Ambiguous,
                cgram: None,
                lemma: None,
                entry_count: n,
            },
        }
    }

    /// A form with no lexicon candidates: consult the casing registry, then
    /// the form's own shape. A form registered as both acronym and proper
    /// noun counts as a proper noun.
    fn classify_absent(&self, word: &str) -> Classification {
        let key = word.to_lowercase();
        if self.proper_nouns.contains(&key) {
            return Classification::shaped(word, CATEGORY_PROPER_NOUN);
        }
        if self.acronyms.contains(&key) {
            return Classification::shaped(word, CATEGORY_ACRONYM);
        }
        if is_acronym(word) {
            return Classification::shaped(word, CATEGORY_ACRONYM);
        }
        if is_proper_noun(word) {
            return Classification::shaped(word, CATEGORY_PROPER_NOUN);
        }
        Classification::unknown(word, 0)
    }

    /// Resolve one entry, following the lemma chain one hop: an inflected
    /// reading takes its category from the lemma's own entry when the
    /// lexicon has one.
    fn classify_entry(&self, word: &str, entry: &LexiconEntry, entry_count: usize) -> Classification {
        let resolved = if entry.is_lem {
            entry
        } else {
            self.lexicon.find_lemma_entry(&entry.lemme).unwrap_or(entry)
        };
        Classification {
            word: word.to_string(),
            status: Status::Classified,
            cgram: Some(resolved.cgram.clone()),
            lemma: Some(entry.lemme.clone()),
            entry_count,
        }
    }

    /// All candidate readings of an ambiguous form, sorted by frequency
    /// descending (stable: equal frequencies keep table order). Empty when
    /// the form has at most one candidate.
    pub fn ambiguous_readings(&self, word: &str) -> Vec<AmbiguousReading> {
        let entries = self.lexicon.lookup(&normalize_ligatures(word));
        if entries.len() <= 1 {
            return Vec::new();
        }

        let mut readings: Vec<AmbiguousReading> = entries
            .iter()
            .map(|entry| AmbiguousReading {
                cgram: self
                    .classify_entry(word, entry, entries.len())
                    .cgram
                    .unwrap_or_default(),
                entry: entry.clone(),
            })
            .collect();
        readings.sort_by(|a, b| {
            b.entry
                .freq
                .partial_cmp(&a.entry.freq)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        readings
    }
}

/// The candidate with the strictly highest frequency; the comparison only
/// moves on `>`, so equal frequencies keep the earliest table entry.
fn pick_by_frequency(entries: &[LexiconEntry]) -> &LexiconEntry {
    let mut best = &entries[0];
    for candidate in &entries[1..] {
        if candidate.freq > best.freq {
            best = candidate;
        }
    }
    best
}

/// Aggregate counts over a set of classifications.
#[derive(Debug, Clone, Default)]
pub struct ClassifyStats {
    /// Forms examined.
    pub total: usize,
    /// Forms with exactly one resolved reading.
    pub classified: usize,
    /// Forms with no reading.
    pub unknown: usize,
    /// Forms left ambiguous.
    pub ambiguous: usize,
    /// Occurrences per category, sorted by count descending then name.
    pub by_cgram: Vec<(String, usize)>,
}

/// Compute classification statistics.
///
/// Unknown forms are excluded from the per-category counts.
pub fn statistics<'c, I>(classifications: I) -> ClassifyStats
where
    I: IntoIterator<Item = &'c Classification>,
{
    let mut stats = ClassifyStats::default();
    let mut by_cgram: HashMap<String, usize> = HashMap::new();

    for classif in classifications {
        stats.total += 1;
        match classif.status {
            Status::Classified => {
                stats.classified += 1;
                if let Some(ref cgram) = classif.cgram {
                    *by_cgram.entry(cgram.clone()).or_insert(0) += 1;
                }
            }
            Status::Unknown => stats.unknown += 1,
            Status::Ambiguous => stats.ambiguous += 1,
        }
    }

    let mut by_cgram: Vec<(String, usize)> = by_cgram.into_iter().collect();
    by_cgram.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    stats.by_cgram = by_cgram;
    stats
}
