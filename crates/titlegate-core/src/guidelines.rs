//! Regulatory naming rules, applied after the lexical stage.
//!
//! Unlike the lexical rules these do not stop at the first hit: a submission
//! should hear about every violation at once.

use std::collections::HashSet;

use crate::index::TitleIndex;
use crate::normalize::normalize;

/// Words a publication title may never contain.
const DISALLOWED_WORDS: &[&str] = &["police", "crime", "corruption", "cbi", "cid", "army"];

/// Tokens that cannot be prepended or appended to an existing title to mint
/// a "new" one.
const RESERVED_AFFIXES: &[&str] = &["the", "india", "samachar", "news"];

/// Check a title against the naming guidelines.
///
/// Returns one human-readable reason per violation; an empty list is a pass.
/// Rules that compare against the corpus are skipped when no index is given.
pub fn enforce_guidelines(
    title: &str,
    index: Option<&TitleIndex>,
    precleaned: bool,
) -> Vec<String> {
    let clean_title = if precleaned {
        title.to_string()
    } else {
        normalize(title)
    };
    let words: Vec<&str> = clean_title.split(' ').filter(|w| !w.is_empty()).collect();
    if words.is_empty() {
        return vec!["Title cannot be empty.".to_string()];
    }

    let mut reasons = Vec::new();

    let word_set: HashSet<&str> = words.iter().copied().collect();
    let mut disallowed: Vec<&str> = word_set
        .iter()
        .copied()
        .filter(|word| DISALLOWED_WORDS.contains(word))
        .collect();
    disallowed.sort_unstable();
    if !disallowed.is_empty() {
        reasons.push(format!(
            "Contains disallowed words: {}.",
            disallowed.join(", ").to_uppercase()
        ));
    }

    let Some(index) = index else {
        return reasons;
    };

    let periodicity = index.periodicity_terms();
    if words.iter().any(|word| periodicity.contains(*word)) {
        let stripped: Vec<&str> = words
            .iter()
            .copied()
            .filter(|word| !periodicity.contains(*word))
            .collect();
        let base = stripped.join(" ");
        if !base.is_empty() && index.contains(&base) && base != clean_title {
            reasons.push(format!(
                "Uses periodicity term to modify an existing title ('{}').",
                index.display_title(&base)
            ));
        }
    }

    if RESERVED_AFFIXES.contains(&words[0]) {
        let base = words[1..].join(" ");
        if !base.is_empty() && index.contains(&base) {
            reasons.push(format!(
                "Disallowed prefix '{}' creates conflict with existing title '{}'.",
                words[0],
                index.display_title(&base)
            ));
        }
    }

    if let Some(last) = words.last() {
        if RESERVED_AFFIXES.contains(last) {
            let base = words[..words.len() - 1].join(" ");
            if !base.is_empty() && index.contains(&base) {
                reasons.push(format!(
                    "Disallowed suffix '{}' creates conflict with existing title '{}'.",
                    last,
                    index.display_title(&base)
                ));
            }
        }
    }

    reasons
}
