//! Repetition analysis pipeline.
//!
//! Orchestrates the full pass over one text: tokenize with positions,
//! classify each distinct form once (disambiguating by corpus frequency),
//! drop function-word categories and single-letter lemmas, group the
//! surviving occurrences per lemma in first-appearance order, run cluster
//! detection per group, and assemble the report.
//!
//! Everything here is deterministic: lemma iteration follows first
//! appearance in the text, never hash order, and the classifier's tie-breaks
//! follow lexicon table order.

pub mod reports;

use std::collections::HashMap;

pub use reports::AnalysisReport;

use crate::classify::{self, Status, WordClassifier};
use crate::clusters::{self, Cluster, ClusterParams};
use crate::error::{AnalysisError, AnalysisResult};
use crate::filters::{EXCLUDED_CATEGORIES, EXCLUDED_CLUSTER_LEMMAS};
use crate::lexicon::Lexicon;
use crate::tokenizer::{self, Token};
use reports::{
    CategorySection, ClusterReport, GlobalStats, LemmaReport, OccurrenceReport, SegmentReport,
};

/// Parameters for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisParams {
    /// Cluster detection tuning.
    pub clusters: ClusterParams,
    /// Context bytes shown around excerpts.
    pub context_chars: usize,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            clusters: ClusterParams::default(),
            context_chars: crate::config::DEFAULT_CONTEXT_CHARS,
        }
    }
}

/// Lemmas whose occurrences always present under the auxiliary category.
const AUXILIARY_LEMMAS: &[&str] = &["être", "avoir"];

/// One lemma group being accumulated during the pass.
struct Group {
    lemma: String,
    display: String,
    category: String,
    is_unknown: bool,
    occurrences: Vec<Token>,
    forms: Vec<String>,
}

/// Run the full repetition analysis over one text.
#[tracing::instrument(skip_all, fields(text_len = text.len()))]
pub fn run_analysis(
    text: &str,
    lexicon: &Lexicon,
    params: &AnalysisParams,
) -> AnalysisResult<AnalysisReport> {
    params.clusters.validate()?;

    if text.trim().is_empty() {
        return Err(AnalysisError::EmptyInput);
    }

    let tokens = tokenizer::extract_tokens(text, lexicon);
    tracing::debug!(tokens = tokens.len(), "tokenization finished");

    // Classify each distinct lowercased form once. The registration pass
    // first records casing variants of out-of-lexicon forms so JOAN/Joan
    // resolve consistently.
    let mut classifier = WordClassifier::new(lexicon);
    classifier.register_forms(tokens.iter().map(|t| t.word.as_str()));

    let mut classifications = HashMap::new();
    for token in &tokens {
        let key = token.word.to_lowercase();
        if !classifications.contains_key(&key) {
            let classification = classifier.classify(&token.word, true);
            classifications.insert(key, classification);
        }
    }
    let unique_forms = classifications.len();

    // Group occurrences per lemma, preserving first-appearance order.
    let mut groups: Vec<Group> = Vec::new();
    let mut group_index: HashMap<String, usize> = HashMap::new();

    for token in &tokens {
        let word_lower = token.word.to_lowercase();
        let classification = &classifications[&word_lower];

        let (key, lemma, display, category, is_unknown) = match classification.status {
            Status::Classified => {
                let cgram = classification.cgram.as_deref().unwrap_or_default();
                if EXCLUDED_CATEGORIES.contains(cgram) {
                    continue;
                }
                match classification.lemma {
                    Some(ref lemma) => {
                        // Reading backed by the lexicon
                        let lemma = lemma.to_lowercase();
                        let category = if AUXILIARY_LEMMAS.contains(&lemma.as_str()) {
                            "AUX".to_string()
                        } else {
                            cgram.to_string()
                        };
                        (lemma.clone(), lemma.clone(), lemma, category, false)
                    }
                    None if cgram == classify::CATEGORY_NUMBER => {
                        // Numbers stand for themselves
                        let lemma = word_lower.clone();
                        (format!("NUM:{lemma}"), lemma.clone(), lemma, cgram.to_string(), false)
                    }
                    None => {
                        // Shape-classified: proper noun or acronym, absent
                        // from the lexicon. The display keeps the casing of
                        // the first sighting.
                        let lemma = word_lower.clone();
                        (
                            format!("{cgram}:{lemma}"),
                            lemma,
                            token.word.clone(),
                            cgram.to_string(),
                            true,
                        )
                    }
                }
            }
            Status::Unknown => {
                let lemma = word_lower.clone();
                (
                    format!("{}:{lemma}", classify::CATEGORY_UNKNOWN),
                    lemma.clone(),
                    lemma,
                    classify::CATEGORY_UNKNOWN.to_string(),
                    true,
                )
            }
            // Unreachable with disambiguation on; skip defensively is wrong
            // here — ambiguity at this point is a programming error.
            Status::Ambiguous => unreachable!("disambiguation requested"),
        };

        if lemma.chars().count() <= 1 {
            continue;
        }

        let index = *group_index.entry(key).or_insert_with(|| {
            groups.push(Group {
                lemma,
                display,
                category,
                is_unknown,
                occurrences: Vec::new(),
                forms: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].occurrences.push(token.clone());
        if !groups[index].forms.iter().any(|f| f == &token.word) {
            groups[index].forms.push(token.word.clone());
        }
    }

    // Detect clusters and build per-lemma reports.
    let mut lemma_reports: Vec<LemmaReport> = Vec::new();
    for group in &groups {
        let reportable =
            group.is_unknown || group.occurrences.len() >= params.clusters.min_occurrences;
        if !reportable {
            continue;
        }

        let detected = if EXCLUDED_CLUSTER_LEMMAS.contains(group.lemma.as_str()) {
            Vec::new()
        } else {
            clusters::find_clusters(&group.occurrences, &params.clusters)
        };

        let cluster_reports: Vec<ClusterReport> = detected
            .iter()
            .map(|cluster| build_cluster_report(text, cluster, params.context_chars))
            .collect();

        let loose = loose_occurrences(text, &group.occurrences, &detected, params.context_chars);

        let mut group_forms = group.forms.clone();
        group_forms.sort();

        let display = if group.is_unknown {
            ideal_display(&group.category, &group.forms, &group.display)
        } else {
            group.display.clone()
        };

        lemma_reports.push(LemmaReport {
            lemma: group.lemma.clone(),
            display,
            category: group.category.clone(),
            count: group.occurrences.len(),
            forms: group_forms,
            is_unknown: group.is_unknown,
            clusters: cluster_reports,
            loose_occurrences: loose,
        });
    }

    let unique_lemmas = lemma_reports.len();
    let lemmas_with_clusters = lemma_reports
        .iter()
        .filter(|l| !l.clusters.is_empty())
        .count();
    let total_clusters: usize = lemma_reports.iter().map(|l| l.clusters.len()).sum();

    // Organize by category: sections keep first-appearance order before the
    // final sort by total occurrences; lemmas sort by cluster count then
    // occurrence count, stable so ties keep text order.
    let mut sections: Vec<CategorySection> = Vec::new();
    let mut section_index: HashMap<String, usize> = HashMap::new();
    for report in lemma_reports {
        let index = *section_index
            .entry(report.category.clone())
            .or_insert_with(|| {
                sections.push(CategorySection {
                    category: report.category.clone(),
                    total_occurrences: 0,
                    lemmas: Vec::new(),
                });
                sections.len() - 1
            });
        sections[index].total_occurrences += report.count;
        sections[index].lemmas.push(report);
    }
    for section in &mut sections {
        section
            .lemmas
            .sort_by(|a, b| {
                (b.cluster_count(), b.count).cmp(&(a.cluster_count(), a.count))
            });
    }
    sections.sort_by(|a, b| b.total_occurrences.cmp(&a.total_occurrences));

    tracing::info!(
        lemmas = unique_lemmas,
        clusters = total_clusters,
        "analysis finished"
    );

    Ok(AnalysisReport {
        stats: GlobalStats {
            total_words: tokens.len(),
            unique_forms,
            unique_lemmas,
            lemmas_with_clusters,
            total_clusters,
        },
        categories: sections,
    })
}

/// Pick the display form for an out-of-lexicon lemma: an all-caps form for
/// acronyms, a capitalized one for proper nouns, any capitalized sighting as
/// a fallback. Other categories keep the normalized lemma.
fn ideal_display(category: &str, forms: &[String], fallback: &str) -> String {
    let shaped = match category {
        classify::CATEGORY_ACRONYM => forms.iter().find(|f| classify::is_acronym(f)),
        classify::CATEGORY_PROPER_NOUN => forms.iter().find(|f| classify::is_proper_noun(f)),
        _ => None,
    };
    shaped
        .or_else(|| match category {
            classify::CATEGORY_ACRONYM | classify::CATEGORY_PROPER_NOUN => forms
                .iter()
                .find(|f| f.chars().next().is_some_and(char::is_uppercase)),
            _ => None,
        })
        .cloned()
        .unwrap_or_else(|| fallback.to_string())
}

fn build_cluster_report(text: &str, cluster: &Cluster, context_chars: usize) -> ClusterReport {
    let context = clusters::extract_context(text, cluster, context_chars);
    let segments = clusters::segment_body(&context.body, context.body_start, &cluster.occurrences);

    ClusterReport {
        occurrence_count: cluster.len(),
        body_start: context.body_start,
        body_end: context.body_end,
        before: context.before,
        after: context.after,
        truncated_before: context.truncated_before,
        truncated_after: context.truncated_after,
        segments: segments
            .into_iter()
            .map(|s| SegmentReport {
                text: s.text,
                highlight: s.highlight,
            })
            .collect(),
    }
}

/// Occurrences not covered by any cluster, each with its own context window.
fn loose_occurrences(
    text: &str,
    occurrences: &[Token],
    detected: &[Cluster],
    context_chars: usize,
) -> Vec<OccurrenceReport> {
    occurrences
        .iter()
        .filter(|occurrence| {
            !detected.iter().any(|cluster| {
                cluster
                    .occurrences
                    .iter()
                    .any(|member| member.start == occurrence.start && member.end == occurrence.end)
            })
        })
        .map(|occurrence| {
            let span = Cluster {
                occurrences: vec![occurrence.clone()],
                start: occurrence.start,
                end: occurrence.end,
            };
            let context = clusters::extract_context(text, &span, context_chars);
            OccurrenceReport {
                word: occurrence.word.clone(),
                start: occurrence.start,
                end: occurrence.end,
                before: context.before,
                after: context.after,
                truncated_before: context.truncated_before,
                truncated_after: context.truncated_after,
            }
        })
        .collect()
}
