//! Diacritic and letter-shape normalization.
//!
//! Two independent normalizations live here:
//!
//! - **Matching** (`normalize_for_matching`): strips combining marks and
//!   tatweel and collapses whitespace. The result is only ever compared,
//!   never shown. `normalize_with_offsets` keeps a byte map back into the
//!   source so a hit in normalized space can be located in the original.
//! - **Letterforms** (`normalize_letterforms`): folds presentation forms and
//!   cosmetic glyph variants so lexical lookups are shape-insensitive.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::{decompose_canonical, is_combining_mark};

/// ARABIC TATWEEL (kashida), a purely typographic stretch character.
const TATWEEL: char = '\u{0640}';

/// Zero-width space, non-joiner, joiner and BOM. Extractors leave these
/// inside words and between them.
fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{200B}' | '\u{200C}' | '\u{200D}' | '\u{FEFF}')
}

/// Normalize text for comparison: strip combining marks, drop tatweel and
/// zero-width characters, collapse whitespace runs to a single space, and trim.
pub fn normalize_for_matching(text: &str) -> String {
    normalize_with_offsets(text).0
}

/// Like [`normalize_for_matching`], also returning the source byte offset of
/// every byte of the normalized string.
///
/// `offsets.len() == normalized.len()`; `offsets[i]` is the byte index in
/// `text` of the character that produced normalized byte `i`. A collapsed
/// whitespace run maps to the first whitespace character of the run.
pub fn normalize_with_offsets(text: &str) -> (String, Vec<usize>) {
    let mut out = String::with_capacity(text.len());
    let mut offsets = Vec::with_capacity(text.len());
    let mut pending_space: Option<usize> = None;

    for (idx, ch) in text.char_indices() {
        if is_zero_width(ch) {
            continue;
        }
        if ch.is_whitespace() {
            if !out.is_empty() && pending_space.is_none() {
                pending_space = Some(idx);
            }
            continue;
        }

        decompose_canonical(ch, |c| {
            if c == TATWEEL || is_combining_mark(c) {
                return;
            }
            if let Some(space_at) = pending_space.take() {
                out.push(' ');
                offsets.push(space_at);
            }
            out.push(c);
            offsets.extend(std::iter::repeat_n(idx, c.len_utf8()));
        });
    }

    (out, offsets)
}

/// Canonicalize cosmetic Arabic letter-shape variants.
///
/// Applies NFKC (folding presentation forms such as `ﻻ` or `ﺑ` back to their
/// base letters), then maps hamza/madda/wasla alef seats to bare alef, alef
/// maqsura to yeh, teh marbuta and Persian heh shapes to heh, keheh and
/// Farsi yeh to their Arabic counterparts, and removes tatweel and
/// zero-width characters.
pub fn normalize_letterforms(text: &str) -> String {
    text.nfkc()
        .filter(|&c| c != TATWEEL && !is_zero_width(c))
        .map(|c| match c {
            '\u{0622}' | '\u{0623}' | '\u{0625}' | '\u{0671}' | '\u{0672}' | '\u{0673}' => '\u{0627}',
            '\u{0649}' | '\u{06CC}' => '\u{064A}',
            '\u{06A9}' => '\u{0643}',
            '\u{0629}' | '\u{06C1}' | '\u{06D5}' => '\u{0647}',
            other => other,
        })
        .collect()
}
