//! Text utilities shared by TOC detection and content partitioning.
//!
//! - `numerals`: digit sets and written ordinals to integers
//! - `normalize`: matching normalization (with offset maps) and letterform folding
//! - `clean`: display cleanup of partitioned bodies

pub mod clean;
pub mod normalize;
pub mod numerals;

pub use clean::clean_content;
pub use normalize::{normalize_for_matching, normalize_letterforms, normalize_with_offsets};
pub use numerals::to_integer;

/// Borrow at most the first `max_chars` characters of `text`.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Owned copy of the first `max_chars` characters of `text`.
pub fn leading_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
