//! Report structs for repetition analysis.
//!
//! All structs derive `Serialize`, `Deserialize`, and `JsonSchema` for
//! use in CLI JSON output and downstream tooling.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Full repetition analysis report.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    /// Global counters over the whole text.
    pub stats: GlobalStats,
    /// Per-category sections, ordered by total occurrence count descending.
    pub categories: Vec<CategorySection>,
}

/// Global counters over the whole text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct GlobalStats {
    /// Words extracted from the text.
    pub total_words: usize,
    /// Distinct written forms (case-insensitive).
    pub unique_forms: usize,
    /// Distinct lemma groups after filtering.
    pub unique_lemmas: usize,
    /// Lemmas with at least one repetition cluster.
    pub lemmas_with_clusters: usize,
    /// Total repetition clusters found.
    pub total_clusters: usize,
}

/// All reported lemmas of one grammatical category.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CategorySection {
    /// Category label (NOM, VER, AUX, NOM_PROPRE, INCONNU, ...).
    pub category: String,
    /// Sum of occurrence counts across the section's lemmas.
    pub total_occurrences: usize,
    /// Lemmas sorted by cluster count, then occurrence count, descending;
    /// ties keep first appearance in the text.
    pub lemmas: Vec<LemmaReport>,
}

/// One lemma's repetition profile.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LemmaReport {
    /// Normalized lemma (lowercase for lexicon words).
    pub lemma: String,
    /// Display form (keeps casing for proper nouns and acronyms).
    pub display: String,
    /// Category label carried by this lemma's occurrences.
    pub category: String,
    /// Total occurrences in the text.
    pub count: usize,
    /// Distinct surface forms, sorted.
    pub forms: Vec<String>,
    /// Whether the word is absent from the lexicon.
    pub is_unknown: bool,
    /// Repetition clusters in text order.
    pub clusters: Vec<ClusterReport>,
    /// Occurrences outside any cluster, in text order.
    pub loose_occurrences: Vec<OccurrenceReport>,
}

/// One repetition cluster, ready for display.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ClusterReport {
    /// Number of member occurrences.
    pub occurrence_count: usize,
    /// Byte offset of the cluster body in the text.
    pub body_start: usize,
    /// Byte offset one past the cluster body's end.
    pub body_end: usize,
    /// Context before the body (may be empty at text start).
    pub before: String,
    /// Context after the body (may be empty at text end).
    pub after: String,
    /// Whether text was cut before `before`.
    pub truncated_before: bool,
    /// Whether text was cut after `after`.
    pub truncated_after: bool,
    /// The body decomposed into plain and highlighted pieces.
    pub segments: Vec<SegmentReport>,
}

/// One piece of a cluster body.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SegmentReport {
    /// Slice of the body text.
    pub text: String,
    /// Whether this piece is a member occurrence.
    pub highlight: bool,
}

/// One occurrence outside any cluster, with its own context window.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct OccurrenceReport {
    /// The written form at this position.
    pub word: String,
    /// Byte offset of the occurrence.
    pub start: usize,
    /// Byte offset one past the occurrence.
    pub end: usize,
    /// Context before the occurrence.
    pub before: String,
    /// Context after the occurrence.
    pub after: String,
    /// Whether text was cut before `before`.
    pub truncated_before: bool,
    /// Whether text was cut after `after`.
    pub truncated_after: bool,
}

impl LemmaReport {
    /// Number of clusters for this lemma.
    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }
}
