//! Curated category and lemma filters for repetition analysis.
//!
//! Closed-class function words (articles, pronouns, conjunctions,
//! prepositions, determiner-like adjectives) repeat in any French text and
//! carry no stylistic signal, so their categories are excluded up front.
//! Categories are open-ended strings in the lexicon; only these labels get
//! special handling, everything else passes through unchanged.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Grammatical categories excluded from repetition analysis.
pub static EXCLUDED_CATEGORIES: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "ART:def", "ART:ind", "PRO:per", "PRO:int", "PRO:rel", "PRO:dem", "PRO:ind", "PRO:pos",
        "CON", "PRE", "ADJ:pos", "ADJ:dem", "ADJ:num",
    ]
    .into_iter()
    .collect()
});

/// Lemmas excluded from cluster detection even when their category survives.
///
/// The negation pair surrounds verbs everywhere; clustering it would flag
/// every negative sentence.
pub static EXCLUDED_CLUSTER_LEMMAS: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| ["ne", "pas"].into_iter().collect());

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn function_word_categories_are_excluded() {
        assert!(EXCLUDED_CATEGORIES.contains("ART:def"));
        assert!(EXCLUDED_CATEGORIES.contains("PRE"));
        assert!(EXCLUDED_CATEGORIES.contains("CON"));
    }

    #[test]
    fn content_word_categories_pass() {
        assert!(!EXCLUDED_CATEGORIES.contains("NOM"));
        assert!(!EXCLUDED_CATEGORIES.contains("VER"));
        assert!(!EXCLUDED_CATEGORIES.contains("ADJ"));
        assert!(!EXCLUDED_CATEGORIES.contains("ADV"));
    }

    #[test]
    fn negation_lemmas_are_excluded_from_clustering() {
        assert!(EXCLUDED_CLUSTER_LEMMAS.contains("ne"));
        assert!(EXCLUDED_CLUSTER_LEMMAS.contains("pas"));
        assert!(!EXCLUDED_CLUSTER_LEMMAS.contains("chat"));
    }
}
