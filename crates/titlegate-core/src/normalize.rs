//! Raw-title normalization.
//!
//! Every index and every comparison in the engine operates on the normalized
//! form produced here: lowercase ASCII, only `[a-z0-9 ]`, single-spaced,
//! trimmed.

use once_cell::sync::Lazy;
use regex::Regex;
use unidecode::unidecode;

use crate::memo::{MemoCache, TRANSFORM_MEMO_CAPACITY};

static NON_ALNUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9 ]").unwrap());
static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r" +").unwrap());

static NORMALIZE_MEMO: Lazy<MemoCache<String>> =
    Lazy::new(|| MemoCache::new(TRANSFORM_MEMO_CAPACITY));

/// Leetspeak substitutions applied after transliteration and lowercasing.
/// The `!` entry maps to `b` intentionally; changing it changes which
/// spellings collide and is a product decision, not a cleanup.
fn deleet(c: char) -> char {
    match c {
        '0' => 'o',
        '1' => 'i',
        '3' => 'e',
        '4' => 'a',
        '5' => 's',
        '7' => 't',
        '8' => 'b',
        '@' => 'a',
        '!' => 'b',
        other => other,
    }
}

/// Normalize a raw title to its canonical matching key.
///
/// Steps (order matters):
/// 1. Transliterate Unicode to ASCII (Latin, Indic, and common CJK scripts)
/// 2. Lowercase
/// 3. Leetspeak substitution (`0→o`, `1→i`, `3→e`, …)
/// 4. Replace everything outside `[a-z0-9 ]` with a space
/// 5. Collapse whitespace runs, trim
///
/// Idempotent: `normalize(normalize(x)) == normalize(x)`.
pub fn normalize(title: &str) -> String {
    NORMALIZE_MEMO.get_or_insert_with(title, || {
        let romanized = unidecode(title);
        let de_leeted: String = romanized.to_lowercase().chars().map(deleet).collect();
        // Whitespace variants (tabs, newlines) fall outside the kept class
        // and become spaces here, so one collapse pass suffices.
        let cleaned = NON_ALNUM_RE.replace_all(&de_leeted, " ");
        WHITESPACE_RE.replace_all(&cleaned, " ").trim().to_string()
    })
}
