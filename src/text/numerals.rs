//! Numeral conversion for Arabic book texts.
//!
//! Handles the three digit sets found in extracted Arabic documents (ASCII,
//! Arabic-Indic, Extended Arabic-Indic) and the written ordinals used in
//! headings such as "الباب الثالث" or "المسألة الحادية عشرة".

use super::normalize::normalize_letterforms;

/// Written ordinals, keyed by their letterform-normalized spelling without
/// the definite article. Compound forms are stored with a single space.
const ORDINAL_WORDS: &[(&str, u32)] = &[
    ("اول", 1),
    ("اولي", 1),
    ("ثاني", 2),
    ("ثانيه", 2),
    ("ثالث", 3),
    ("ثالثه", 3),
    ("رابع", 4),
    ("رابعه", 4),
    ("خامس", 5),
    ("خامسه", 5),
    ("سادس", 6),
    ("سادسه", 6),
    ("سابع", 7),
    ("سابعه", 7),
    ("ثامن", 8),
    ("ثامنه", 8),
    ("تاسع", 9),
    ("تاسعه", 9),
    ("عاشر", 10),
    ("عاشره", 10),
    ("حادي عشر", 11),
    ("حاديه عشره", 11),
    ("ثاني عشر", 12),
    ("ثانيه عشره", 12),
];

/// Value of a single digit character in any supported digit set.
pub fn digit_value(c: char) -> Option<u32> {
    match c {
        '0'..='9' => Some(c as u32 - '0' as u32),
        '\u{0660}'..='\u{0669}' => Some(c as u32 - 0x0660),
        '\u{06F0}'..='\u{06F9}' => Some(c as u32 - 0x06F0),
        _ => None,
    }
}

/// Whether `c` is a digit in any supported digit set.
pub fn is_digit(c: char) -> bool {
    digit_value(c).is_some()
}

/// Parse a run of digits (any supported digit set) as a base-10 integer.
///
/// Returns `None` for empty input, any non-digit character, or overflow.
pub fn parse_digits(token: &str) -> Option<u32> {
    if token.is_empty() {
        return None;
    }
    token.chars().try_fold(0u32, |acc, c| {
        let d = digit_value(c)?;
        acc.checked_mul(10)?.checked_add(d)
    })
}

/// Convert a numeral token to an integer.
///
/// Accepts digit strings in any supported digit set and the written ordinals
/// first through twelfth (masculine or feminine, with or without the
/// definite article). Letter-shape variants such as `أول` / `اول` are
/// treated alike.
pub fn to_integer(token: &str) -> Option<u32> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    if let Some(n) = parse_digits(token) {
        return Some(n);
    }

    let canonical = normalize_letterforms(token);
    let words: Vec<&str> = canonical
        .split_whitespace()
        .map(|w| w.strip_prefix("ال").filter(|rest| !rest.is_empty()).unwrap_or(w))
        .collect();
    if words.is_empty() || words.len() > 2 {
        return None;
    }
    let key = words.join(" ");

    ORDINAL_WORDS
        .iter()
        .find(|(word, _)| *word == key)
        .map(|(_, n)| *n)
}
