//! Character trigrams over the compact (space-stripped) normalized title.
//!
//! Trigrams drive the fuzzy-candidate vote: any title close in spelling to
//! the query shares most of its trigrams, so the index never needs a full
//! corpus scan.

use once_cell::sync::Lazy;
use std::collections::BTreeSet;

use crate::memo::{MemoCache, TRANSFORM_MEMO_CAPACITY};

static TRIGRAM_MEMO: Lazy<MemoCache<BTreeSet<String>>> =
    Lazy::new(|| MemoCache::new(TRANSFORM_MEMO_CAPACITY));

/// Trigram set of a normalized title.
///
/// The compact form drops spaces first, so "the hindu" and "thehindu" share
/// every trigram. Inputs whose compact form is 3 characters or shorter are
/// their own single gram; empty input yields the empty set.
pub fn trigrams(title: &str) -> BTreeSet<String> {
    TRIGRAM_MEMO.get_or_insert_with(title, || {
        let compact: Vec<char> = title.chars().filter(|c| !c.is_whitespace()).collect();
        let mut grams = BTreeSet::new();
        if compact.is_empty() {
            return grams;
        }
        if compact.len() <= 3 {
            grams.insert(compact.iter().collect());
        } else {
            for window in compact.windows(3) {
                grams.insert(window.iter().collect());
            }
        }
        grams
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gram_vec(title: &str) -> Vec<String> {
        trigrams(title).into_iter().collect()
    }

    #[test]
    fn empty_input_has_no_grams() {
        assert!(trigrams("").is_empty());
    }

    #[test]
    fn short_compact_form_is_a_single_gram() {
        assert_eq!(gram_vec("ab"), vec!["ab"]);
        assert_eq!(gram_vec("a b"), vec!["ab"]);
        assert_eq!(gram_vec("abc"), vec!["abc"]);
    }

    #[test]
    fn sliding_windows_over_compact_form() {
        assert_eq!(gram_vec("abcd"), vec!["abc", "bcd"]);
        assert_eq!(gram_vec("the hindu"), gram_vec("thehindu"));
    }

    #[test]
    fn duplicate_windows_collapse() {
        // "aaaa" produces the window "aaa" twice; the set keeps one.
        assert_eq!(gram_vec("aaaa"), vec!["aaa"]);
    }
}
