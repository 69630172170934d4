//! Phonetic hashing for sound-alike title lookups.
//!
//! Implements a Metaphone-style coder producing an ASCII consonant skeleton.
//! Vowels are never emitted, so all-vowel and digit-only inputs map to the
//! empty key. Callers must never match on an empty key.

use once_cell::sync::Lazy;

use crate::memo::{MemoCache, TRANSFORM_MEMO_CAPACITY};

static METAPHONE_MEMO: Lazy<MemoCache<String>> =
    Lazy::new(|| MemoCache::new(TRANSFORM_MEMO_CAPACITY));

fn is_vowel(c: u8) -> bool {
    matches!(c, b'a' | b'e' | b'i' | b'o' | b'u')
}

/// Phonetic key of a normalized title.
pub fn metaphone(text: &str) -> String {
    METAPHONE_MEMO.get_or_insert_with(text, || encode(text))
}

fn encode(text: &str) -> String {
    // Letters only; spaces and digits carry no phonetic weight.
    let word: Vec<u8> = text
        .bytes()
        .filter(u8::is_ascii_alphabetic)
        .map(|b| b.to_ascii_lowercase())
        .collect();
    if word.is_empty() {
        return String::new();
    }

    let n = word.len();
    let mut code = String::new();
    let mut i = 0usize;

    // Word-initial clusters with silent or remapped first letters.
    if n >= 2 {
        match (word[0], word[1]) {
            (b'a', b'e') | (b'g', b'n') | (b'k', b'n') | (b'p', b'n') | (b'w', b'r') => i = 1,
            (b'w', b'h') => {
                code.push('W');
                i = 2;
            }
            (b'x', _) => {
                code.push('S');
                i = 1;
            }
            _ => {}
        }
    } else if word[0] == b'x' {
        code.push('S');
        i = 1;
    }

    while i < n {
        let c = word[i];

        // Doubled letters collapse, except c ("accept").
        if i > 0 && c == word[i - 1] && c != b'c' {
            i += 1;
            continue;
        }

        let prev = if i > 0 { Some(word[i - 1]) } else { None };
        let next = word.get(i + 1).copied();
        let next2 = word.get(i + 2).copied();

        match c {
            b'a' | b'e' | b'i' | b'o' | b'u' => {}
            b'b' => {
                // Terminal "mb" keeps the b silent ("lamb").
                if !(i + 1 == n && prev == Some(b'm')) {
                    code.push('B');
                }
            }
            b'c' => {
                if next == Some(b'i') && next2 == Some(b'a') {
                    code.push('X');
                } else if next == Some(b'h') {
                    code.push(if prev == Some(b's') { 'K' } else { 'X' });
                    i += 2;
                    continue;
                } else if matches!(next, Some(b'i' | b'e' | b'y')) {
                    code.push('S');
                } else {
                    code.push('K');
                }
            }
            b'd' => {
                if next == Some(b'g') && matches!(next2, Some(b'e' | b'y' | b'i')) {
                    code.push('J');
                    i += 2;
                    continue;
                }
                code.push('T');
            }
            b'f' => code.push('F'),
            b'g' => {
                if next == Some(b'h') {
                    // "gh" is silent unless it precedes a vowel ("ghost").
                    if matches!(next2, Some(v) if is_vowel(v)) {
                        code.push('K');
                    }
                    i += 2;
                    continue;
                }
                if next == Some(b'n') {
                    // silent, as in "sign"
                } else if matches!(next, Some(b'i' | b'e' | b'y')) {
                    code.push('J');
                } else {
                    code.push('K');
                }
            }
            b'h' => {
                // Silent after a vowel with no vowel following ("oh").
                let silent = matches!(prev, Some(p) if is_vowel(p))
                    && !matches!(next, Some(v) if is_vowel(v));
                if !silent {
                    code.push('H');
                }
            }
            b'j' => code.push('J'),
            b'k' => {
                if prev != Some(b'c') {
                    code.push('K');
                }
            }
            b'l' => code.push('L'),
            b'm' => code.push('M'),
            b'n' => code.push('N'),
            b'p' => {
                if next == Some(b'h') {
                    code.push('F');
                    i += 2;
                    continue;
                }
                code.push('P');
            }
            b'q' => code.push('K'),
            b'r' => code.push('R'),
            b's' => {
                if next == Some(b'h') {
                    code.push('X');
                    i += 2;
                    continue;
                }
                if next == Some(b'i') && matches!(next2, Some(b'o' | b'a')) {
                    code.push('X');
                } else {
                    code.push('S');
                }
            }
            b't' => {
                if next == Some(b'h') {
                    code.push('0');
                    i += 2;
                    continue;
                }
                if next == Some(b'i') && matches!(next2, Some(b'o' | b'a')) {
                    code.push('X');
                } else {
                    code.push('T');
                }
            }
            b'v' => code.push('F'),
            b'w' => {
                if matches!(next, Some(v) if is_vowel(v)) {
                    code.push('W');
                }
            }
            b'x' => code.push_str("KS"),
            b'y' => {
                if matches!(next, Some(v) if is_vowel(v)) {
                    code.push('Y');
                }
            }
            b'z' => code.push('S'),
            _ => {}
        }
        i += 1;
    }

    code
}
