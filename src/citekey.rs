//! Citation key generation.
//!
//! Keys have the form `{family}{year}{suffix?}`, e.g. `smith2024` or
//! `smith2024b`. Generation is a pure function of the author, the year and the
//! caller's existing key set; nothing is remembered between calls.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Token used when no usable family name can be derived.
pub const UNKNOWN_AUTHOR: &str = "unknown";

/// Token used when no year is supplied.
pub const UNKNOWN_YEAR: &str = "0000";

/// Generates a citation key that is not in `existing`.
///
/// - The family name is the text before the first comma (or the whole string).
/// - It is transliterated to ASCII (`Müller` → `muller`); a name with letters
///   that have no ASCII form (e.g. CJK) becomes `unknown` rather than a
///   partial token.
/// - Only `[a-z0-9]` survive, so `O'Brien` → `obrien` and `van der Berg` → `vanderberg`.
/// - A missing year becomes `0000`.
/// - On collision, suffixes `a..z, aa..az, ba..` are tried in order and the
///   first unused candidate is returned.
#[must_use]
pub fn generate_key<S: std::hash::BuildHasher>(
    author: Option<&str>,
    year: Option<&str>,
    existing: &HashSet<String, S>,
) -> String {
    let base = format!("{}{}", family_token(author), year_token(year));
    if !existing.contains(&base) {
        return base;
    }

    let mut index = 0usize;
    loop {
        let candidate = format!("{base}{}", suffix_for(index));
        if !existing.contains(&candidate) {
            return candidate;
        }
        index += 1;
    }
}

/// Spreadsheet-column suffix for the `index`-th collision (0 → `a`, 25 → `z`,
/// 26 → `aa`, 52 → `ba`).
#[must_use]
pub fn suffix_for(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(b'a' + u8::try_from(n % 26).unwrap_or(0));
        n /= 26;
    }
    letters.iter().rev().map(|&b| char::from(b)).collect()
}

fn family_token(author: Option<&str>) -> String {
    let family = author
        .map(|a| a.split(',').next().unwrap_or(a).trim())
        .unwrap_or_default();
    if family.is_empty() {
        return UNKNOWN_AUTHOR.to_string();
    }

    let Some(ascii) = transliterate(family) else {
        return UNKNOWN_AUTHOR.to_string();
    };
    let token: String = ascii
        .to_ascii_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if token.is_empty() {
        UNKNOWN_AUTHOR.to_string()
    } else {
        token
    }
}

fn year_token(year: Option<&str>) -> String {
    let token: String = year
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect();
    if token.is_empty() {
        UNKNOWN_YEAR.to_string()
    } else {
        token
    }
}

/// Folds `value` to ASCII, or `None` if any character has no ASCII form.
fn transliterate(value: &str) -> Option<String> {
    let mut folded = String::with_capacity(value.len());
    for ch in value.chars() {
        match fold_letter(ch) {
            Some(replacement) => folded.push_str(replacement),
            None => folded.push(ch),
        }
    }

    let ascii: String = folded.nfd().filter(|c| !is_combining_mark(*c)).collect();
    ascii.is_ascii().then_some(ascii)
}

/// Letters that NFD does not decompose into an ASCII base.
fn fold_letter(ch: char) -> Option<&'static str> {
    let folded = match ch {
        'ß' | 'ẞ' => "ss",
        'æ' => "ae",
        'Æ' => "AE",
        'ø' => "o",
        'Ø' => "O",
        'œ' => "oe",
        'Œ' => "OE",
        'ł' => "l",
        'Ł' => "L",
        'đ' | 'ð' => "d",
        'Đ' | 'Ð' => "D",
        'þ' => "th",
        'Þ' => "TH",
        'ı' => "i",
        _ => return None,
    };
    Some(folded)
}
