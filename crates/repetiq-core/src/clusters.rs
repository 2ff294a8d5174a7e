//! Repetition cluster detection and excerpt extraction.
//!
//! A cluster is a zone where occurrences of one lemma sit close together.
//! Detection is a single linear pass over the lemma's occurrences in text
//! order: the gap between an occurrence's start and the *previous
//! occurrence's end* decides whether the working group extends or closes.
//! Measuring occurrence-to-occurrence (not against the group's start) means
//! a long chain of nearby repetitions never splits just because its total
//! span grew; a cluster's overall span is unbounded even though every
//! adjacent pair is within `max_distance`.
//!
//! Offsets are byte offsets into the analyzed text. Out-of-range or
//! overlapping positions are upstream defects and fail loudly here; the only
//! place clamping is correct is the context window at the text boundaries.

use crate::error::{AnalysisError, AnalysisResult};
use crate::tokenizer::Token;

/// Tunable parameters for cluster detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClusterParams {
    /// Maximum byte gap between consecutive occurrences in one cluster.
    pub max_distance: usize,
    /// Minimum occurrences for a cluster to be reported.
    pub min_occurrences: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            max_distance: crate::config::DEFAULT_MAX_DISTANCE,
            min_occurrences: crate::config::DEFAULT_MIN_OCCURRENCES,
        }
    }
}

impl ClusterParams {
    /// Check both parameters are in range.
    ///
    /// Rejecting here, at the start of analysis, is deliberate: a value of 0
    /// is a configuration error, never silently replaced with a default.
    pub const fn validate(&self) -> AnalysisResult<()> {
        if self.max_distance < 1 {
            return Err(AnalysisError::InvalidParameter {
                name: "max_distance",
                value: self.max_distance,
                min: 1,
            });
        }
        if self.min_occurrences < 1 {
            return Err(AnalysisError::InvalidParameter {
                name: "min_occurrences",
                value: self.min_occurrences,
                min: 1,
            });
        }
        Ok(())
    }

    /// The effective minimum cluster size: a repetition group always has at
    /// least two members, whatever `min_occurrences` says.
    pub const fn min_cluster_size(&self) -> usize {
        if self.min_occurrences > 2 {
            self.min_occurrences
        } else {
            2
        }
    }
}

/// A spatially concentrated group of occurrences of one lemma.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    /// Member occurrences in text order.
    pub occurrences: Vec<Token>,
    /// Byte offset of the first member's start.
    pub start: usize,
    /// Byte offset of the last member's end.
    pub end: usize,
}

impl Cluster {
    /// Number of member occurrences.
    pub fn len(&self) -> usize {
        self.occurrences.len()
    }

    /// Whether the cluster has no members (never true for emitted clusters).
    pub fn is_empty(&self) -> bool {
        self.occurrences.is_empty()
    }
}

/// Find the repetition clusters among one lemma's occurrences.
///
/// Occurrences are sorted by start position before the pass, so callers may
/// hand over groups in any order. Fewer than two occurrences skip the
/// windowing entirely.
#[tracing::instrument(skip_all, fields(occurrences = occurrences.len()))]
pub fn find_clusters(occurrences: &[Token], params: &ClusterParams) -> Vec<Cluster> {
    let min_size = params.min_cluster_size();
    if occurrences.len() < min_size {
        return Vec::new();
    }

    let mut sorted: Vec<Token> = occurrences.to_vec();
    sorted.sort_by_key(|t| t.start);

    let mut clusters = Vec::new();
    let mut group: Vec<Token> = Vec::new();

    for occurrence in sorted {
        match group.last() {
            None => group.push(occurrence),
            Some(previous) => {
                assert!(
                    occurrence.start >= previous.end,
                    "overlapping occurrences: {}..{} follows {}..{}",
                    occurrence.start,
                    occurrence.end,
                    previous.start,
                    previous.end,
                );
                if occurrence.start - previous.end <= params.max_distance {
                    group.push(occurrence);
                } else {
                    close_group(&mut clusters, std::mem::take(&mut group), min_size);
                    group.push(occurrence);
                }
            }
        }
    }
    close_group(&mut clusters, group, min_size);

    clusters
}

fn close_group(clusters: &mut Vec<Cluster>, group: Vec<Token>, min_size: usize) {
    if group.len() >= min_size {
        let start = group[0].start;
        let end = group[group.len() - 1].end;
        clusters.push(Cluster {
            occurrences: group,
            start,
            end,
        });
    }
}

/// A cluster excerpt ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterContext {
    /// Up to `context_chars` bytes immediately before the body.
    pub before: String,
    /// The text from the cluster's start to its end.
    pub body: String,
    /// Up to `context_chars` bytes immediately after the body.
    pub after: String,
    /// Byte offset of the body in the full text.
    pub body_start: usize,
    /// Byte offset one past the body's last byte.
    pub body_end: usize,
    /// Whether text exists before `before` (i.e. it was cut, not exhausted).
    pub truncated_before: bool,
    /// Whether text exists after `after`.
    pub truncated_after: bool,
}

/// Extract a cluster's body with surrounding context.
///
/// The windows are measured in bytes and snapped inward to character
/// boundaries, so `before` and `after` are always valid UTF-8 and never
/// exceed `context_chars` bytes. Clamping at the text boundaries is the
/// documented behavior here — and only here.
pub fn extract_context(text: &str, cluster: &Cluster, context_chars: usize) -> ClusterContext {
    assert!(
        cluster.start <= cluster.end && cluster.end <= text.len(),
        "cluster span {}..{} outside text of {} bytes",
        cluster.start,
        cluster.end,
        text.len(),
    );

    let mut context_start = cluster.start.saturating_sub(context_chars);
    while !text.is_char_boundary(context_start) {
        context_start += 1;
    }

    let mut context_end = usize::min(text.len(), cluster.end + context_chars);
    while !text.is_char_boundary(context_end) {
        context_end -= 1;
    }

    ClusterContext {
        before: text[context_start..cluster.start].to_string(),
        body: text[cluster.start..cluster.end].to_string(),
        after: text[cluster.end..context_end].to_string(),
        body_start: cluster.start,
        body_end: cluster.end,
        truncated_before: context_start > 0,
        truncated_after: context_end < text.len(),
    }
}

/// One piece of a cluster body: either plain text or a highlighted
/// occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// The slice of the body this segment covers.
    pub text: String,
    /// Whether this segment is a member occurrence.
    pub highlight: bool,
}

/// Decompose a cluster body into plain and highlighted segments.
///
/// A single forward walk over the body emits a boundary at each occurrence
/// edge. Occurrence offsets are absolute; each is rebased against
/// `body_start`. Concatenating the segment texts reproduces the body
/// exactly.
pub fn segment_body(body: &str, body_start: usize, occurrences: &[Token]) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(occurrences.len() * 2 + 1);
    let mut cursor = 0;

    for occurrence in occurrences {
        assert!(
            occurrence.start >= body_start && occurrence.end <= body_start + body.len(),
            "occurrence {}..{} outside body {}..{}",
            occurrence.start,
            occurrence.end,
            body_start,
            body_start + body.len(),
        );
        let rel_start = occurrence.start - body_start;
        let rel_end = occurrence.end - body_start;
        assert!(rel_start >= cursor, "occurrences overlap or are unsorted");

        if rel_start > cursor {
            segments.push(Segment {
                text: body[cursor..rel_start].to_string(),
                highlight: false,
            });
        }
        segments.push(Segment {
            text: body[rel_start..rel_end].to_string(),
            highlight: true,
        });
        cursor = rel_end;
    }

    if cursor < body.len() {
        segments.push(Segment {
            text: body[cursor..].to_string(),
            highlight: false,
        });
    }

    segments
}

#[cfg(test)]
mod tests {
    use super::*;

    fn occurrences_of(text: &str, word: &str) -> Vec<Token> {
        text.match_indices(word)
            .map(|(start, matched)| Token {
                word: matched.to_string(),
                start,
                end: start + matched.len(),
            })
            .collect()
    }

    fn token(start: usize, end: usize) -> Token {
        Token {
            word: "mot".to_string(),
            start,
            end,
        }
    }

    #[test]
    fn three_close_occurrences_form_one_cluster() {
        let text = "Le chat dort. Le chat ronronne. Le chat rêve.";
        let occurrences = occurrences_of(text, "chat");
        assert_eq!(occurrences.len(), 3);

        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 3);
        assert_eq!(clusters[0].start, occurrences[0].start);
        assert_eq!(clusters[0].end, occurrences[2].end);
    }

    #[test]
    fn distant_occurrences_form_no_cluster() {
        // 250 bytes of filler between the two occurrences
        let occurrences = vec![token(0, 4), token(254, 258)];
        let params = ClusterParams {
            max_distance: 200,
            min_occurrences: 2,
        };
        assert!(find_clusters(&occurrences, &params).is_empty());
    }

    #[test]
    fn gap_is_measured_from_previous_end() {
        let params = ClusterParams {
            max_distance: 200,
            min_occurrences: 2,
        };
        // Gap of exactly 200 joins; 201 splits.
        let joined = find_clusters(&[token(0, 4), token(204, 208)], &params);
        assert_eq!(joined.len(), 1);

        let split = find_clusters(&[token(0, 4), token(205, 209)], &params);
        assert!(split.is_empty());
    }

    #[test]
    fn long_chain_never_splits_on_total_span() {
        // Each adjacent pair is 100 apart but the chain spans far past 200.
        let occurrences: Vec<Token> = (0..10).map(|i| token(i * 104, i * 104 + 4)).collect();
        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].len(), 10);
        assert!(clusters[0].end - clusters[0].start > 200);
    }

    #[test]
    fn window_law_holds_within_and_between_clusters() {
        let params = ClusterParams {
            max_distance: 50,
            min_occurrences: 2,
        };
        let occurrences = vec![
            token(0, 4),
            token(20, 24),
            token(40, 44),
            token(300, 304),
            token(320, 324),
        ];
        let clusters = find_clusters(&occurrences, &params);
        assert_eq!(clusters.len(), 2);
        for cluster in &clusters {
            for pair in cluster.occurrences.windows(2) {
                assert!(pair[1].start - pair[0].end <= params.max_distance);
            }
        }
        // The boundary gap strictly exceeds max_distance.
        assert!(clusters[1].occurrences[0].start - clusters[0].occurrences.last().unwrap().end
            > params.max_distance);
    }

    #[test]
    fn too_few_occurrences_skip_windowing() {
        let params = ClusterParams::default();
        assert!(find_clusters(&[], &params).is_empty());
        assert!(find_clusters(&[token(0, 4)], &params).is_empty());
    }

    #[test]
    fn min_occurrences_filters_small_groups() {
        let params = ClusterParams {
            max_distance: 200,
            min_occurrences: 3,
        };
        // Two close occurrences are below the configured minimum.
        assert!(find_clusters(&[token(0, 4), token(10, 14)], &params).is_empty());

        let clusters = find_clusters(&[token(0, 4), token(10, 14), token(20, 24)], &params);
        assert_eq!(clusters.len(), 1);
    }

    #[test]
    fn min_occurrences_of_one_still_requires_pairs() {
        let params = ClusterParams {
            max_distance: 200,
            min_occurrences: 1,
        };
        assert_eq!(params.min_cluster_size(), 2);
        assert!(find_clusters(&[token(0, 4)], &params).is_empty());
    }

    #[test]
    fn max_distance_zero_degenerates_to_no_clusters() {
        // Boundary behavior, not an error: non-overlapping tokens can never
        // sit at identical positions.
        let params = ClusterParams {
            max_distance: 0,
            min_occurrences: 2,
        };
        assert!(find_clusters(&[token(0, 4), token(5, 9)], &params).is_empty());
    }

    #[test]
    fn validation_rejects_out_of_range_parameters() {
        let bad_distance = ClusterParams {
            max_distance: 0,
            min_occurrences: 2,
        };
        assert!(matches!(
            bad_distance.validate(),
            Err(AnalysisError::InvalidParameter {
                name: "max_distance",
                ..
            })
        ));

        let bad_min = ClusterParams {
            max_distance: 200,
            min_occurrences: 0,
        };
        assert!(matches!(
            bad_min.validate(),
            Err(AnalysisError::InvalidParameter {
                name: "min_occurrences",
                ..
            })
        ));

        assert!(ClusterParams::default().validate().is_ok());
    }

    #[test]
    fn detection_is_idempotent() {
        let text = "Le chat dort. Le chat ronronne. Le chat rêve.";
        let occurrences = occurrences_of(text, "chat");
        let params = ClusterParams::default();
        assert_eq!(
            find_clusters(&occurrences, &params),
            find_clusters(&occurrences, &params)
        );
    }

    #[test]
    fn context_windows_clamp_at_text_boundaries() {
        let text = "Le chat est beau. Le chat dort. Le chat mange.";
        let occurrences = occurrences_of(text, "chat");
        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        assert_eq!(clusters.len(), 1);

        let ctx = extract_context(text, &clusters[0], 3);
        assert_eq!(ctx.body, "chat est beau. Le chat dort. Le chat");
        // Only 3 bytes exist before the body; the clamp hits text start
        // exactly, so nothing was cut.
        assert_eq!(ctx.before, "Le ");
        assert!(!ctx.truncated_before);
        assert_eq!(ctx.after, " ma");
        assert!(ctx.truncated_after);
        assert_eq!(ctx.body_start, 3);
        assert_eq!(ctx.body_end, 39);
    }

    #[test]
    fn context_shorter_than_window_near_edges() {
        let text = "chat et chat";
        let occurrences = occurrences_of(text, "chat");
        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        let ctx = extract_context(text, &clusters[0], 80);
        assert!(ctx.before.is_empty());
        assert!(ctx.after.is_empty());
        assert!(!ctx.truncated_before);
        assert!(!ctx.truncated_after);
    }

    #[test]
    fn context_window_snaps_to_char_boundaries() {
        // 'é' is two bytes; a window of 1 byte would land inside it.
        let text = "éé chat ici chat éé";
        let occurrences = occurrences_of(text, "chat");
        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        let ctx = extract_context(text, &clusters[0], 1);
        assert!(ctx.before.len() <= 1);
        assert!(ctx.after.len() <= 1);
        // Whatever came out is valid UTF-8 by construction of the slices.
    }

    #[test]
    fn segments_reproduce_the_body() {
        let text = "Le chat est beau. Le chat dort. Le chat mange.";
        let occurrences = occurrences_of(text, "chat");
        let clusters = find_clusters(&occurrences, &ClusterParams::default());
        let ctx = extract_context(text, &clusters[0], 5);

        let segments = segment_body(&ctx.body, ctx.body_start, &clusters[0].occurrences);
        let rebuilt: String = segments.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(rebuilt, ctx.body);

        let highlighted: Vec<&str> = segments
            .iter()
            .filter(|s| s.highlight)
            .map(|s| s.text.as_str())
            .collect();
        assert_eq!(highlighted, vec!["chat", "chat", "chat"]);

        // Body starts and ends with an occurrence, so the walk alternates.
        assert!(segments[0].highlight);
        assert!(segments.last().unwrap().highlight);
    }

    #[test]
    #[should_panic(expected = "outside text")]
    fn out_of_range_cluster_fails_loudly() {
        let cluster = Cluster {
            occurrences: vec![token(0, 4)],
            start: 0,
            end: 100,
        };
        let _ = extract_context("court", &cluster, 10);
    }
}
