//! Weighted fusion of semantic, phonetic, and lexical similarity.
//!
//! Each vector-search candidate is scored on three dimensions and the
//! weighted total decides rejection. The dominant weighted dimension names
//! the human-readable reason.

use std::collections::HashSet;

use crate::normalize::normalize;
use crate::phonetic::metaphone;
use crate::remote::VectorMatch;

pub const SEMANTIC_WEIGHT: f64 = 0.40;
pub const PHONETIC_WEIGHT: f64 = 0.35;
pub const LEXICAL_WEIGHT: f64 = 0.25;

/// Indel-based string similarity scaled to `[0, 100]`.
pub fn lexical_ratio(a: &str, b: &str) -> f64 {
    rapidfuzz::fuzz::ratio(a.chars(), b.chars()) * 100.0
}

/// Result of scoring one batch of semantic candidates.
#[derive(Debug, Clone, Default)]
pub struct EnsembleOutcome {
    /// Highest weighted total seen across the candidates.
    pub highest_score: f64,
    /// One reason per candidate whose total crossed the rejection threshold.
    pub reasons: Vec<String>,
}

impl EnsembleOutcome {
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Score the candidates returned by the vector search against the query.
///
/// Candidates are deduplicated by raw title on first sight. Iteration stops
/// at the first candidate whose total reaches `reject_threshold`; later
/// candidates cannot change the verdict, only add redundant reasons.
pub fn score_semantic_matches(
    clean_title: &str,
    matches: &[VectorMatch],
    reject_threshold: f64,
) -> EnsembleOutcome {
    let query_phonetic = metaphone(clean_title);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut outcome = EnsembleOutcome::empty();

    for candidate in matches {
        if candidate.title.is_empty() || !seen.insert(candidate.title.as_str()) {
            continue;
        }
        let clean_match = normalize(&candidate.title);
        if clean_match.is_empty() {
            continue;
        }

        let semantic = (candidate.similarity * 100.0).clamp(0.0, 100.0);
        let phonetic = if !query_phonetic.is_empty() && query_phonetic == metaphone(&clean_match) {
            100.0
        } else {
            0.0
        };
        let lexical = lexical_ratio(clean_title, &clean_match);

        let total = SEMANTIC_WEIGHT * semantic + PHONETIC_WEIGHT * phonetic + LEXICAL_WEIGHT * lexical;
        outcome.highest_score = outcome.highest_score.max(total);

        if total >= reject_threshold {
            outcome
                .reasons
                .push(build_reason(&candidate.title, total, semantic, phonetic, lexical));
            break;
        }
    }

    outcome
}

fn build_reason(
    matched_title: &str,
    total: f64,
    semantic: f64,
    phonetic: f64,
    lexical: f64,
) -> String {
    let weighted = [
        (
            "Similarity in meaning (semantic conflict)",
            SEMANTIC_WEIGHT * semantic,
        ),
        (
            "Similarity in sound (phonetic conflict)",
            PHONETIC_WEIGHT * phonetic,
        ),
        (
            "Similarity in spelling (lexical conflict)",
            LEXICAL_WEIGHT * lexical,
        ),
    ];

    // Ties go to the earlier dimension (meaning, then sound, then spelling).
    let mut primary = weighted[0];
    for entry in &weighted[1..] {
        if entry.1 > primary.1 {
            primary = *entry;
        }
    }

    format!(
        "{} with existing title '{}' ({:.1}% total similarity).",
        primary.0, matched_title, total
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(title: &str, similarity: f64) -> VectorMatch {
        VectorMatch {
            title: title.to_string(),
            similarity,
        }
    }

    #[test]
    fn lexical_ratio_bounds() {
        assert_eq!(lexical_ratio("abc", "abc"), 100.0);
        assert_eq!(lexical_ratio("abc", "xyz"), 0.0);
        let mid = lexical_ratio("abcd", "abce");
        assert!(mid > 0.0 && mid < 100.0);
    }

    #[test]
    fn phonetic_dimension_requires_nonempty_keys() {
        // All-vowel strings share the empty key; identical spelling must not
        // count as a phonetic match.
        let outcome = score_semantic_matches("aeiou", &[candidate("Aeiou", 1.0)], 70.0);
        // semantic 40 + phonetic 0 + lexical 25 = 65, below the threshold
        assert!(outcome.reasons.is_empty());
        assert!((outcome.highest_score - 65.0).abs() < 1e-9);
    }

    #[test]
    fn phonetic_match_pushes_total_over_threshold() {
        let outcome =
            score_semantic_matches("dainik jagran", &[candidate("Dainik Jagaran", 0.8)], 70.0);
        assert!(outcome.highest_score >= 70.0);
        assert_eq!(outcome.reasons.len(), 1);
        assert!(outcome.reasons[0].contains("Similarity in sound"));
        assert!(outcome.reasons[0].contains("Dainik Jagaran"));
    }

    #[test]
    fn negative_cosine_clamps_to_zero() {
        let outcome = score_semantic_matches("alpha beta", &[candidate("gamma delta", -0.5)], 70.0);
        assert!(outcome.highest_score < 20.0);
        assert!(outcome.reasons.is_empty());
    }

    #[test]
    fn duplicate_candidates_scored_once() {
        let matches = vec![candidate("Same Title", 0.5), candidate("Same Title", 0.99)];
        let outcome = score_semantic_matches("something else", &matches, 1000.0);
        // The second (higher-cosine) copy is ignored, so the highest total
        // reflects the first sighting only.
        let rescored = score_semantic_matches("something else", &matches[..1], 1000.0);
        assert!((outcome.highest_score - rescored.highest_score).abs() < 1e-9);
    }

    #[test]
    fn stops_after_first_rejecting_candidate() {
        let matches = vec![
            candidate("dainik jagaran", 0.9),
            candidate("dainik jagarann", 0.9),
        ];
        let outcome = score_semantic_matches("dainik jagran", &matches, 70.0);
        assert_eq!(outcome.reasons.len(), 1);
    }

    #[test]
    fn semantic_dominance_names_meaning() {
        // High cosine, unrelated spelling and sound.
        let outcome = score_semantic_matches(
            "dainik jagran",
            &[candidate("dainik jagaran", 1.0)],
            10.0,
        );
        assert_eq!(outcome.reasons.len(), 1);
        assert!(outcome.reasons[0].contains("Similarity in meaning"));
    }
}
