//! In-memory multi-index over the registered-title corpus.
//!
//! One aggregate structure holds every lookup map, built in a single pass
//! per insertion. Each map stores normalized-title strings directly; there
//! are no cross-map keys to keep consistent. Value sets are ordered so that
//! every "pick a match" decision is deterministic.

use std::collections::{BTreeSet, HashMap, HashSet};

use crate::ensemble::lexical_ratio;
use crate::ngram::trigrams;
use crate::normalize::normalize;
use crate::phonetic::metaphone;

/// Publication-cycle vocabulary recognized by the periodicity rules, in
/// English and several Indic languages. Extended (never replaced) through
/// configuration; static for the process lifetime.
pub const DEFAULT_PERIODICITY_TERMS: &[&str] = &[
    "daily",
    "weekly",
    "monthly",
    "fortnightly",
    "annual",
    "dainik",
    "saptahik",
    "masik",
    "varshik",
    "pratidin",
    "rozana",
];

/// Cap on the fuzzy-comparison candidate set chosen by the weighted vote.
const MAX_FUZZY_CANDIDATES: usize = 700;

/// Vote weight of a shared token (trigrams and first-char proximity get 1).
const TOKEN_VOTE_WEIGHT: u32 = 3;

/// First-char voters must be within this length difference of the query.
const FIRST_CHAR_LENGTH_SLACK: usize = 8;

/// Minimum `lexical_ratio` for a shared phonetic key to count as a conflict.
const PHONETIC_RATIO_FLOOR: f64 = 60.0;

/// Minimum best-candidate `lexical_ratio` to report a spelling variation.
const FUZZY_REPORT_FLOOR: f64 = 80.0;

#[derive(Debug)]
pub struct TitleIndex {
    /// Normalized form of every registered title.
    existing_titles: HashSet<String>,
    /// normalized -> raw spellings seen for it (display uses the smallest).
    canonical_titles: HashMap<String, BTreeSet<String>>,
    /// phonetic key -> normalized titles sharing it.
    phonetic_map: HashMap<String, BTreeSet<String>>,
    /// space-joined sorted tokens -> normalized titles (word-order variants).
    sorted_titles_map: HashMap<String, BTreeSet<String>>,
    /// first-letter acronym -> multi-word normalized titles.
    acronym_map: HashMap<String, BTreeSet<String>>,
    /// token -> normalized titles containing it.
    token_index: HashMap<String, BTreeSet<String>>,
    /// trigram -> normalized titles containing it.
    trigram_index: HashMap<String, BTreeSet<String>>,
    /// first character -> normalized titles starting with it.
    first_char_index: HashMap<char, BTreeSet<String>>,
    /// Periodicity vocabulary for this process.
    periodicity: HashSet<String>,
}

impl Default for TitleIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl TitleIndex {
    pub fn new() -> Self {
        Self::with_periodicity_terms(&[])
    }

    /// Build an empty index whose periodicity vocabulary is the default set
    /// plus `extra` (normalized; empty entries dropped).
    pub fn with_periodicity_terms(extra: &[String]) -> Self {
        let mut periodicity: HashSet<String> = DEFAULT_PERIODICITY_TERMS
            .iter()
            .map(|term| (*term).to_string())
            .collect();
        periodicity.extend(
            extra
                .iter()
                .map(|term| normalize(term))
                .filter(|term| !term.is_empty()),
        );
        Self {
            existing_titles: HashSet::new(),
            canonical_titles: HashMap::new(),
            phonetic_map: HashMap::new(),
            sorted_titles_map: HashMap::new(),
            acronym_map: HashMap::new(),
            token_index: HashMap::new(),
            trigram_index: HashMap::new(),
            first_char_index: HashMap::new(),
            periodicity,
        }
    }

    /// Number of distinct normalized titles indexed.
    pub fn len(&self) -> usize {
        self.existing_titles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing_titles.is_empty()
    }

    /// Whether a normalized title is registered.
    pub fn contains(&self, normalized: &str) -> bool {
        self.existing_titles.contains(normalized)
    }

    pub fn periodicity_terms(&self) -> &HashSet<String> {
        &self.periodicity
    }

    /// Drop every indexed title. The periodicity vocabulary survives.
    pub fn clear(&mut self) {
        self.existing_titles.clear();
        self.canonical_titles.clear();
        self.phonetic_map.clear();
        self.sorted_titles_map.clear();
        self.acronym_map.clear();
        self.token_index.clear();
        self.trigram_index.clear();
        self.first_char_index.clear();
    }

    /// Index one raw title. A title that normalizes to the empty string is
    /// silently ignored.
    pub fn add_title(&mut self, raw_title: &str) {
        let normalized = normalize(raw_title);
        if normalized.is_empty() {
            return;
        }

        let words: Vec<&str> = normalized.split(' ').collect();
        self.existing_titles.insert(normalized.clone());
        self.canonical_titles
            .entry(normalized.clone())
            .or_default()
            .insert(raw_title.trim().to_string());

        let phonetic = metaphone(&normalized);
        if !phonetic.is_empty() {
            self.phonetic_map
                .entry(phonetic)
                .or_default()
                .insert(normalized.clone());
        }

        if words.len() > 1 {
            self.sorted_titles_map
                .entry(sorted_key(&words))
                .or_default()
                .insert(normalized.clone());

            let acronym: String = words.iter().filter_map(|w| w.chars().next()).collect();
            if !acronym.is_empty() {
                self.acronym_map
                    .entry(acronym)
                    .or_default()
                    .insert(normalized.clone());
            }
        }

        let distinct_tokens: HashSet<&str> = words.iter().copied().collect();
        for token in distinct_tokens {
            self.token_index
                .entry(token.to_string())
                .or_default()
                .insert(normalized.clone());
        }

        for gram in trigrams(&normalized) {
            self.trigram_index
                .entry(gram)
                .or_default()
                .insert(normalized.clone());
        }

        if let Some(first) = normalized.chars().next() {
            self.first_char_index
                .entry(first)
                .or_default()
                .insert(normalized.clone());
        }
    }

    pub fn extend<I, S>(&mut self, titles: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for title in titles {
            self.add_title(title.as_ref());
        }
    }

    /// Human-readable spelling for a normalized title: the lexicographically
    /// smallest raw form seen, so reasons are stable across runs.
    pub fn display_title(&self, normalized: &str) -> String {
        match self
            .canonical_titles
            .get(normalized)
            .and_then(|raw_forms| raw_forms.iter().next())
        {
            Some(raw) => raw.clone(),
            None => title_case(normalized),
        }
    }

    /// Run the lexical conflict rules against one title.
    ///
    /// Rules are evaluated in order and the first hit wins, so the caller
    /// always gets the most specific reason available. The returned score is
    /// in `[0, 100]`; with no conflict the best fuzzy-candidate ratio is
    /// returned alongside an empty reason list.
    pub fn detect_lexical_conflicts(&self, raw_title: &str, precleaned: bool) -> (Vec<String>, f64) {
        let clean_title = if precleaned {
            raw_title.to_string()
        } else {
            normalize(raw_title)
        };
        if clean_title.is_empty() {
            return (
                vec!["Title cannot be empty after normalization.".to_string()],
                100.0,
            );
        }

        let words: Vec<&str> = clean_title.split(' ').collect();

        if self.existing_titles.contains(&clean_title) {
            return (
                vec![format!(
                    "Exact match found with existing title '{}'.",
                    self.display_title(&clean_title)
                )],
                100.0,
            );
        }

        if words.len() > 1 {
            if let Some(matched) = self
                .sorted_titles_map
                .get(&sorted_key(&words))
                .and_then(|matches| matches.iter().next())
            {
                return (
                    vec![format!(
                        "Word-order variation matches existing title '{}'.",
                        self.display_title(matched)
                    )],
                    99.0,
                );
            }
        }

        if clean_title.len() <= 8 && clean_title.chars().all(|c| c.is_ascii_alphabetic()) {
            if let Some(matched) = self
                .acronym_map
                .get(&clean_title)
                .and_then(|matches| matches.iter().next())
            {
                return (
                    vec![format!(
                        "Acronym collision with existing title '{}'.",
                        self.display_title(matched)
                    )],
                    98.0,
                );
            }
        }

        let phonetic = metaphone(&clean_title);
        if !phonetic.is_empty() {
            if let Some(matches) = self.phonetic_map.get(&phonetic) {
                for matched in matches {
                    if matched == &clean_title {
                        continue;
                    }
                    let ratio = lexical_ratio(&clean_title, matched);
                    if ratio >= PHONETIC_RATIO_FLOOR {
                        return (
                            vec![format!(
                                "Phonetic conflict with '{}' (lexical similarity {:.1}%).",
                                self.display_title(matched),
                                ratio
                            )],
                            ratio.max(92.0),
                        );
                    }
                }
            }
        }

        if let Some(base) = self.periodicity_extension(&clean_title, &words) {
            return (
                vec![format!(
                    "Periodicity modifier added to existing title '{}'.",
                    base
                )],
                96.0,
            );
        }

        if let Some(parts) = self.detect_combination(&clean_title, &words) {
            return (
                vec![format!(
                    "Title appears to combine existing titles: {}.",
                    parts.join(" + ")
                )],
                94.0,
            );
        }

        let mut best_score = 0.0f64;
        let mut best_match: Option<&String> = None;
        for candidate in self.candidate_titles(&clean_title) {
            if candidate == &clean_title {
                continue;
            }
            let score = lexical_ratio(&clean_title, candidate);
            if score > best_score {
                best_score = score;
                best_match = Some(candidate);
            }
        }

        if let Some(matched) = best_match {
            if best_score >= FUZZY_REPORT_FLOOR {
                return (
                    vec![format!(
                        "Spelling/transliteration variation too close to existing title \
                         '{}' ({:.1}% lexical match).",
                        self.display_title(matched),
                        best_score
                    )],
                    best_score,
                );
            }
        }

        (Vec::new(), best_score)
    }

    /// Stripping every periodicity token must leave a different, registered
    /// title for the rule to fire.
    fn periodicity_extension(&self, clean_title: &str, words: &[&str]) -> Option<String> {
        if words.len() <= 1 {
            return None;
        }
        let stripped: Vec<&str> = words
            .iter()
            .copied()
            .filter(|word| !self.periodicity.contains(*word))
            .collect();
        if stripped.len() == words.len() {
            return None;
        }
        let base = stripped.join(" ");
        if !base.is_empty() && self.existing_titles.contains(&base) && base != clean_title {
            return Some(self.display_title(&base));
        }
        None
    }

    /// Find a partition of the token sequence into ≥ 2 contiguous spans that
    /// are each a registered title (and none equal to the whole input).
    ///
    /// Dynamic programming over start positions: `can[i]` says the suffix
    /// from token `i` is segmentable, and `next_cut[i]` records the smallest
    /// feasible span end. Reconstructing along `next_cut` yields the same
    /// segmentation a depth-first search trying shorter spans first would
    /// find, without recursion.
    fn detect_combination(&self, clean_title: &str, words: &[&str]) -> Option<Vec<String>> {
        let total = words.len();
        if total < 2 {
            return None;
        }

        let mut can = vec![false; total + 1];
        let mut next_cut: Vec<Option<usize>> = vec![None; total + 1];
        can[total] = true;

        for start in (0..total).rev() {
            for end in (start + 1)..=total {
                if !can[end] {
                    continue;
                }
                let phrase = words[start..end].join(" ");
                if phrase == clean_title || !self.existing_titles.contains(&phrase) {
                    continue;
                }
                can[start] = true;
                next_cut[start] = Some(end);
                break;
            }
        }

        if !can[0] {
            return None;
        }

        let mut spans = Vec::new();
        let mut start = 0;
        while start < total {
            let end = next_cut[start]?;
            spans.push(self.display_title(&words[start..end].join(" ")));
            start = end;
        }

        // A single span covering everything would equal the input and is
        // excluded above, so any reconstruction here has at least two spans.
        if spans.len() >= 2 { Some(spans) } else { None }
    }

    /// Weighted vote for fuzzy-comparison candidates: shared tokens count 3,
    /// shared trigrams 1, and titles on the same first character within a
    /// small length difference 1. The top `MAX_FUZZY_CANDIDATES` by vote are
    /// kept; ties break by first arrival, which is deterministic because the
    /// voters iterate in a fixed order.
    fn candidate_titles(&self, clean_title: &str) -> Vec<&String> {
        let mut votes: HashMap<&String, u32> = HashMap::new();
        let mut arrival: HashMap<&String, usize> = HashMap::new();
        let mut next_rank = 0usize;

        let mut seen_tokens: HashSet<&str> = HashSet::new();
        for token in clean_title.split(' ') {
            if !seen_tokens.insert(token) {
                continue;
            }
            if let Some(matches) = self.token_index.get(token) {
                for candidate in matches {
                    cast_vote(
                        &mut votes,
                        &mut arrival,
                        &mut next_rank,
                        candidate,
                        TOKEN_VOTE_WEIGHT,
                    );
                }
            }
        }

        for gram in trigrams(clean_title) {
            if let Some(matches) = self.trigram_index.get(&gram) {
                for candidate in matches {
                    cast_vote(&mut votes, &mut arrival, &mut next_rank, candidate, 1);
                }
            }
        }

        if let Some(first) = clean_title.chars().next() {
            if let Some(matches) = self.first_char_index.get(&first) {
                for candidate in matches {
                    if candidate.len().abs_diff(clean_title.len()) <= FIRST_CHAR_LENGTH_SLACK {
                        cast_vote(&mut votes, &mut arrival, &mut next_rank, candidate, 1);
                    }
                }
            }
        }

        let mut ranked: Vec<(&String, u32)> = votes.into_iter().collect();
        ranked.sort_by_key(|(candidate, weight)| (std::cmp::Reverse(*weight), arrival[candidate]));
        ranked.truncate(MAX_FUZZY_CANDIDATES);
        ranked.into_iter().map(|(candidate, _)| candidate).collect()
    }
}

fn cast_vote<'a>(
    votes: &mut HashMap<&'a String, u32>,
    arrival: &mut HashMap<&'a String, usize>,
    next_rank: &mut usize,
    candidate: &'a String,
    weight: u32,
) {
    *votes.entry(candidate).or_insert(0) += weight;
    arrival.entry(candidate).or_insert_with(|| {
        let rank = *next_rank;
        *next_rank += 1;
        rank
    });
}

fn sorted_key(words: &[&str]) -> String {
    let mut sorted_words = words.to_vec();
    sorted_words.sort_unstable();
    sorted_words.join(" ")
}

/// Fallback display form for a normalized title with no recorded raw
/// spelling: first letter of each word uppercased.
fn title_case(normalized: &str) -> String {
    normalized
        .split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index_of(titles: &[&str]) -> TitleIndex {
        let mut index = TitleIndex::new();
        index.extend(titles.iter().copied());
        index
    }

    /// Assert the structural invariants for every indexed title.
    fn check_invariants(index: &TitleIndex) {
        for normalized in &index.existing_titles {
            assert!(!normalized.is_empty());

            let raw_forms = index
                .canonical_titles
                .get(normalized)
                .expect("canonical spelling recorded");
            assert!(!raw_forms.is_empty());

            let first = normalized.chars().next().unwrap();
            assert!(index.first_char_index[&first].contains(normalized));

            let words: Vec<&str> = normalized.split(' ').collect();
            for token in &words {
                assert!(index.token_index[*token].contains(normalized));
            }
            for gram in trigrams(normalized) {
                assert!(index.trigram_index[&gram].contains(normalized));
            }

            let phonetic = metaphone(normalized);
            if !phonetic.is_empty() {
                assert!(index.phonetic_map[&phonetic].contains(normalized));
            }

            if words.len() > 1 {
                assert!(index.sorted_titles_map[&sorted_key(&words)].contains(normalized));
                let acronym: String = words.iter().filter_map(|w| w.chars().next()).collect();
                assert!(index.acronym_map[&acronym].contains(normalized));
            }
        }
    }

    // =========================================================================
    // Index maintenance
    // =========================================================================

    #[test]
    fn add_title_maintains_every_map() {
        let index = index_of(&["Indian Express", "The Hindu", "Dainik Bhaskar 24"]);
        assert_eq!(index.len(), 3);
        check_invariants(&index);
    }

    #[test]
    fn unnormalizable_titles_are_ignored() {
        let mut index = TitleIndex::new();
        index.add_title("###");
        index.add_title("   ");
        index.add_title("");
        assert!(index.is_empty());
        check_invariants(&index);
    }

    #[test]
    fn clear_empties_every_map() {
        let mut index = index_of(&["Indian Express", "The Hindu"]);
        index.clear();
        assert!(index.is_empty());
        assert!(index.canonical_titles.is_empty());
        assert!(index.phonetic_map.is_empty());
        assert!(index.sorted_titles_map.is_empty());
        assert!(index.acronym_map.is_empty());
        assert!(index.token_index.is_empty());
        assert!(index.trigram_index.is_empty());
        assert!(index.first_char_index.is_empty());

        // Re-adding after clear works from scratch.
        index.add_title("Indian Express");
        assert_eq!(index.len(), 1);
        check_invariants(&index);
    }

    #[test]
    fn display_title_picks_smallest_raw_form() {
        let index = index_of(&["INDIAN EXPRESS", "Indian Express", "indian express"]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.display_title("indian express"), "INDIAN EXPRESS");
    }

    #[test]
    fn display_title_falls_back_to_title_case() {
        let index = TitleIndex::new();
        assert_eq!(index.display_title("morning herald"), "Morning Herald");
    }

    #[test]
    fn configured_periodicity_terms_extend_the_default_set() {
        let index = TitleIndex::with_periodicity_terms(&["Quarterly".to_string()]);
        assert!(index.periodicity_terms().contains("quarterly"));
        assert!(index.periodicity_terms().contains("daily"));
    }

    // =========================================================================
    // Conflict rules, in priority order
    // =========================================================================

    #[test]
    fn empty_title_scores_100() {
        let index = TitleIndex::new();
        let (reasons, score) = index.detect_lexical_conflicts("###", false);
        assert_eq!(score, 100.0);
        assert!(reasons[0].contains("empty"));
    }

    #[test]
    fn exact_match() {
        let index = index_of(&["Indian Express"]);
        let (reasons, score) = index.detect_lexical_conflicts("Indian Express", false);
        assert_eq!(score, 100.0);
        assert!(reasons[0].starts_with("Exact match"));
        assert!(reasons[0].contains("Indian Express"));
    }

    #[test]
    fn exact_match_after_leet_cleanup() {
        let index = index_of(&["Indian Express"]);
        let (reasons, score) = index.detect_lexical_conflicts("Indi4n Expre55", false);
        assert_eq!(score, 100.0);
        assert!(reasons[0].starts_with("Exact match"));
    }

    #[test]
    fn word_order_variation() {
        let index = index_of(&["Indian Express"]);
        let (reasons, score) = index.detect_lexical_conflicts("Express Indian", false);
        assert!(score >= 99.0);
        assert!(reasons[0].contains("Word-order variation"));
    }

    #[test]
    fn acronym_collision() {
        let index = index_of(&["Times Of India"]);
        let (reasons, score) = index.detect_lexical_conflicts("toi", false);
        assert_eq!(score, 98.0);
        assert!(reasons[0].contains("Acronym collision"));
        assert!(reasons[0].contains("Times Of India"));
    }

    #[test]
    fn acronym_rule_skips_long_or_nonalpha_input() {
        let index = index_of(&["Times Of India"]);
        let (_, score) = index.detect_lexical_conflicts("toi24", false);
        assert!(score < 98.0);
    }

    #[test]
    fn phonetic_conflict() {
        let index = index_of(&["Dainik Jagran"]);
        let (reasons, score) = index.detect_lexical_conflicts("Dainik Jagaran", false);
        assert!(score >= 92.0);
        assert!(reasons[0].contains("Phonetic conflict"));
        assert!(reasons[0].contains("Dainik Jagran"));
    }

    #[test]
    fn periodicity_extension() {
        let index = index_of(&["Morning Herald"]);
        let (reasons, score) = index.detect_lexical_conflicts("Daily Morning Herald", false);
        assert!(score >= 90.0);
        assert!(reasons[0].contains("Periodicity modifier"));
        assert!(reasons[0].contains("Morning Herald"));
    }

    #[test]
    fn combination_of_existing_titles() {
        let index = index_of(&["Hindu", "Indian Express"]);
        let (reasons, score) = index.detect_lexical_conflicts("Hindu Indian Express", false);
        assert!(score >= 90.0);
        assert!(reasons[0].contains("combine existing titles"));
        assert!(reasons[0].contains("Hindu + Indian Express"));
    }

    #[test]
    fn fuzzy_spelling_variation() {
        let index = index_of(&["Rashtriya Sahara"]);
        let (reasons, score) = index.detect_lexical_conflicts("Rashtriya Sahala", false);
        assert!(score >= 80.0);
        assert!(reasons[0].contains("Spelling/transliteration variation"));
        assert!(reasons[0].contains("Rashtriya Sahara"));
    }

    #[test]
    fn unrelated_title_reports_no_conflict() {
        let index = index_of(&["Indian Express", "The Hindu"]);
        let (reasons, score) = index.detect_lexical_conflicts("Zorbal Quent Gazette", false);
        assert!(reasons.is_empty());
        assert!((0.0..82.0).contains(&score));
    }

    #[test]
    fn scores_stay_in_range() {
        let index = index_of(&["Indian Express", "Hindu", "Morning Herald"]);
        for query in [
            "Indian Express",
            "Express Indian",
            "Daily Morning Herald",
            "Hindu Indian Express",
            "a",
            "completely unrelated words here",
            "###",
        ] {
            let (_, score) = index.detect_lexical_conflicts(query, false);
            assert!((0.0..=100.0).contains(&score), "{query}: {score}");
        }
    }

    // =========================================================================
    // Randomized properties (seeded)
    // =========================================================================

    fn random_word(min_len: usize, max_len: usize) -> String {
        let len = fastrand::usize(min_len..=max_len);
        (0..len).map(|_| fastrand::char('a'..='z')).collect()
    }

    #[test]
    fn random_exact_duplicates_always_reject_at_100() {
        fastrand::seed(0x7411);
        let mut index = TitleIndex::new();
        let mut titles = Vec::new();
        for _ in 0..40 {
            let words = fastrand::usize(1..=3);
            let title = (0..words)
                .map(|_| random_word(4, 9))
                .collect::<Vec<_>>()
                .join(" ");
            index.add_title(&title);
            titles.push(title);
        }
        check_invariants(&index);

        for title in &titles {
            let (reasons, score) = index.detect_lexical_conflicts(title, false);
            assert_eq!(score, 100.0, "{title}");
            assert!(reasons[0].starts_with("Exact match"));
        }
    }

    #[test]
    fn single_char_perturbations_reject() {
        fastrand::seed(0x51ed);
        let mut index = TitleIndex::new();
        let mut words = Vec::new();
        for _ in 0..30 {
            let word = random_word(8, 12);
            index.add_title(&word);
            words.push(word);
        }

        for word in &words {
            let mut chars: Vec<char> = word.chars().collect();
            let pos = fastrand::usize(2..chars.len() - 2);
            let old = chars[pos];
            let replacement = (b'a'..=b'z')
                .map(char::from)
                .find(|c| *c != old)
                .unwrap();
            chars[pos] = replacement;
            let perturbed: String = chars.iter().collect();
            if index.contains(&perturbed) {
                continue;
            }

            let (_, score) = index.detect_lexical_conflicts(&perturbed, true);
            assert!(score >= 80.0, "{word} -> {perturbed}: {score}");
        }
    }

    #[test]
    fn fresh_random_tokens_pass() {
        fastrand::seed(0xfee1);
        let mut index = TitleIndex::new();
        for _ in 0..40 {
            let words = fastrand::usize(1..=2);
            let title = (0..words)
                .map(|_| random_word(5, 9))
                .collect::<Vec<_>>()
                .join(" ");
            index.add_title(&title);
        }

        for _ in 0..20 {
            let query = (0..3)
                .map(|_| random_word(8, 10))
                .collect::<Vec<_>>()
                .join(" ");
            if index.contains(&query) {
                continue;
            }
            let (_, score) = index.detect_lexical_conflicts(&query, true);
            assert!(score < 82.0, "{query}: {score}");
        }
    }
}
