//! Structural pattern parsing for classical Arabic tables of contents.
//!
//! Three passes over the leading text of a book:
//!
//! - [`find_toc_section`] locates a TOC header (فهرس المحتويات, المحتويات, …)
//!   and returns a bounded window of lines after it.
//! - [`parse_entries`] turns each line of that window into a leveled
//!   [`TocEntry`], either from a leader-dot/wide-gap layout or from a
//!   structural keyword heading (الباب الأول، الفصل الثاني، مسألة ٣ …).
//! - [`detect_book_info`] picks a title and author out of the front matter.

use std::sync::LazyLock;

use regex::Regex;

use super::model::{BookInfo, TocEntry};
use crate::text::numerals::{is_digit, parse_digits};
use crate::text::{to_integer, truncate_chars};

/// Keywords that open a top-level division.
pub const LEVEL1_KEYWORDS: &[&str] = &["كتاب", "باب", "جزء", "مقصد", "قسم"];
/// Keywords that open a second-level division.
pub const LEVEL2_KEYWORDS: &[&str] = &["فصل", "مبحث", "فرع"];
/// Keywords that open a third-level division.
pub const LEVEL3_KEYWORDS: &[&str] = &["مسألة", "مطلب", "تنبيه", "ملاحظة"];

/// Characters of a title inspected by [`determine_level`].
const LEVEL_PREFIX_CHARS: usize = 20;
/// Shorter lines are never entries.
const MIN_LINE_CHARS: usize = 3;

const TITLE_SEARCH_CHARS: usize = 2000;
const AUTHOR_SEARCH_CHARS: usize = 3000;

static RE_TOC_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"فهرس\s*(?:ال)?(?:محتويات|مواضيع|موضوعات|كتاب|أبواب|فصول)|جدول\s*(?:ال)?محتويات|المحتويات|الفهرس|ثبت\s*(?:ال)?مواضيع",
    )
    .unwrap()
});

/// `title ........ 12` (ASCII leader dots or an ellipsis run).
static RE_LEADER_DOTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?)\s*(?:[.…]{2,}|…)\s*(?P<page>[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+)\s*$")
        .unwrap()
});

/// `title      12` (three or more blanks before the page).
static RE_WIDE_GAP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<title>.+?)\s{3,}(?P<page>[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+)\s*$").unwrap()
});

/// Keyword heading followed by an ordinal: `الباب الأول: …`, `مسألة ٣ …`.
/// The ordinal token is validated with [`to_integer`] after matching.
static RE_NUMBERED_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?P<heading>(?:ال)?(?P<keyword>كتاب|باب|جزء|مقصد|قسم|فصل|مبحث|فرع|مس[أا]لة|مطلب)\s*(?P<ordinal>[^\s:\-–.،]+(?:\s+عشرة?)?))(?P<rest>(?:[\s:\-–.،].*)?)$",
    )
    .unwrap()
});

/// Unnumbered level-3 notes: `تنبيه: …`, `ملاحظة …`.
static RE_NOTE_HEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<heading>(?:ال)?(?:تنبيه|ملاحظة))(?P<rest>(?:[\s:\-–.،].*)?)$").unwrap()
});

static RE_TITLE_KITAB: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*كتاب[ \t]+([^\n]+)").unwrap());

static RE_TITLE_RISALA: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^[ \t]*رسالة[ \t]+([^\n]+)").unwrap());

static RE_TITLE_AFTER_BASMALA: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"بسم\s+الله\s+الرحمن\s+الرحيم[^\n]*\n\s*([^\n]+)").unwrap()
});

static RE_AUTHOR_INTRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:تأليف|للشيخ|للعلامة|للإمام|المؤلف)\s*:?\s*([^\n]+)").unwrap()
});

static RE_AUTHOR_HONORIFIC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*([^\n]+?)[ \t]+(?:قدس سره|دام ظله|حفظه الله)").unwrap()
});

/// Locate a TOC header and return at most `window_lines` lines starting at it.
pub fn find_toc_section(text: &str, window_lines: usize) -> Option<&str> {
    let m = RE_TOC_HEADER.find(text)?;
    let rest = &text[m.start()..];
    let end = rest
        .match_indices('\n')
        .nth(window_lines.max(1) - 1)
        .map(|(idx, _)| idx)
        .unwrap_or(rest.len());
    Some(&rest[..end])
}

/// Parse every recognizable line of a TOC section into an entry.
///
/// Orders are 1-based over the produced entries.
pub fn parse_entries(section_text: &str) -> Vec<TocEntry> {
    let mut entries = Vec::new();

    for raw in section_text.lines() {
        let line = raw.trim();
        if line.chars().count() < MIN_LINE_CHARS {
            continue;
        }
        let order = entries.len() as u32 + 1;
        if let Some(entry) = parse_line(line, order) {
            entries.push(entry);
        }
    }

    entries
}

fn parse_line(line: &str, order: u32) -> Option<TocEntry> {
    if let Some(entry) = parse_generic(line, order) {
        return Some(entry);
    }

    if let Some(caps) = RE_NUMBERED_HEADING.captures(line) {
        let ordinal = caps.name("ordinal").map_or("", |m| m.as_str());
        if to_integer(ordinal).is_some() {
            let keyword = caps.name("keyword").map_or("", |m| m.as_str());
            return Some(heading_entry(&caps, keyword_level(keyword), order));
        }
    }

    RE_NOTE_HEADING
        .captures(line)
        .map(|caps| heading_entry(&caps, 3, order))
}

fn parse_generic(line: &str, order: u32) -> Option<TocEntry> {
    for re in [&*RE_LEADER_DOTS, &*RE_WIDE_GAP] {
        let Some(caps) = re.captures(line) else {
            continue;
        };
        let title = caps["title"].trim();
        if title.is_empty() {
            continue;
        }
        let page = parse_digits(&caps["page"]);
        return Some(TocEntry::new(title, page, determine_level(title), order));
    }
    None
}

/// Entry for a keyword heading: the text after the heading is the title,
/// with any trailing page number split off. A bare heading is its own title.
fn heading_entry(caps: &regex::Captures<'_>, level: u32, order: u32) -> TocEntry {
    let heading = caps.name("heading").map_or("", |m| m.as_str());
    let rest = caps
        .name("rest")
        .map_or("", |m| m.as_str())
        .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | '-' | '–' | '.' | '،'));

    let (title, page) = split_trailing_number(rest);
    let title = if title.is_empty() { heading.trim() } else { title };
    TocEntry::new(title, page, level, order)
}

/// Split a trailing page number off `text`.
///
/// The final token must consist only of digits and be separated from the
/// title by whitespace or leader dots. Leader dots before it are dropped.
fn split_trailing_number(text: &str) -> (&str, Option<u32>) {
    let trimmed = text.trim_end();
    let digits_start = trimmed
        .char_indices()
        .rev()
        .take_while(|&(_, c)| is_digit(c))
        .last()
        .map(|(idx, _)| idx);

    let Some(start) = digits_start else {
        return (trimmed, None);
    };
    let separated = trimmed[..start]
        .chars()
        .next_back()
        .is_none_or(|c| c.is_whitespace() || c == '.' || c == '…');
    if !separated {
        return (trimmed, None);
    }

    let title = trimmed[..start].trim_end_matches(|c: char| c.is_whitespace() || c == '.' || c == '…');
    (title, parse_digits(&trimmed[start..]))
}

fn keyword_level(keyword: &str) -> u32 {
    if LEVEL1_KEYWORDS.contains(&keyword) {
        1
    } else if LEVEL2_KEYWORDS.contains(&keyword) {
        2
    } else {
        3
    }
}

/// Level implied by the structural keywords near the start of a title.
///
/// Only the first 20 characters are inspected; titles without a keyword
/// default to level 2.
pub fn determine_level(title: &str) -> u32 {
    let prefix = truncate_chars(title, LEVEL_PREFIX_CHARS);
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| prefix.contains(k));

    if has_any(LEVEL1_KEYWORDS) {
        1
    } else if has_any(LEVEL2_KEYWORDS) {
        2
    } else if has_any(LEVEL3_KEYWORDS) || prefix.contains("مسالة") {
        3
    } else {
        2
    }
}

/// Best-effort title and author from the front matter of a book.
pub fn detect_book_info(leading_text: &str) -> BookInfo {
    let title_zone = truncate_chars(leading_text, TITLE_SEARCH_CHARS);
    let author_zone = truncate_chars(leading_text, AUTHOR_SEARCH_CHARS);

    BookInfo {
        title: first_capture(
            &[&RE_TITLE_KITAB, &RE_TITLE_RISALA, &RE_TITLE_AFTER_BASMALA],
            title_zone,
        ),
        author: first_capture(&[&RE_AUTHOR_INTRO, &RE_AUTHOR_HONORIFIC], author_zone),
    }
}

fn first_capture(patterns: &[&LazyLock<Regex>], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leader_dots_line() {
        let entries = parse_entries("Introduction .......... 12");
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].title, "Introduction");
        assert_eq!(entries[0].page_number, Some(12));
        assert_eq!(entries[0].level, 2);
        assert_eq!(entries[0].order, 1);
    }

    #[test]
    fn ellipsis_and_wide_gap_lines() {
        let entries = parse_entries("مقدمة المحقق …… ٥\nالباب الأول في الطهارة      ١٧");
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].title, "مقدمة المحقق");
        assert_eq!(entries[0].page_number, Some(5));
        assert_eq!(entries[1].title, "الباب الأول في الطهارة");
        assert_eq!(entries[1].page_number, Some(17));
        assert_eq!(entries[1].level, 1);
    }

    #[test]
    fn short_lines_never_yield_entries() {
        assert!(parse_entries("ab\n١\n .. \n").is_empty());
        assert!(parse_entries("a.5").is_empty());
    }

    #[test]
    fn keyword_headings_get_keyword_levels() {
        let text = "\
الباب الأول: في الطهارة ١٢
الفصل الثاني - في المياه 15
المسألة ٣ حكم الماء المستعمل
تنبيه: في النية
فصل الحادي عشر في التيمم";
        let entries = parse_entries(text);
        let got: Vec<_> = entries
            .iter()
            .map(|e| (e.title.as_str(), e.page_number, e.level, e.order))
            .collect();
        assert_eq!(
            got,
            [
                ("في الطهارة", Some(12), 1, 1),
                ("في المياه", Some(15), 2, 2),
                ("حكم الماء المستعمل", None, 3, 3),
                ("في النية", None, 3, 4),
                ("في التيمم", None, 2, 5),
            ]
        );
    }

    #[test]
    fn bare_heading_is_its_own_title() {
        let entries = parse_entries("الباب الثالث\nالمبحث الأول 40");
        assert_eq!(entries[0].title, "الباب الثالث");
        assert_eq!(entries[0].page_number, None);
        assert_eq!(entries[1].title, "المبحث الأول");
        assert_eq!(entries[1].page_number, Some(40));
        assert_eq!(entries[1].level, 2);
    }

    #[test]
    fn keyword_without_ordinal_is_skipped() {
        assert!(parse_entries("كتاب الطهارة").is_empty());
        assert!(parse_entries("كتابة النص").is_empty());
        assert!(parse_entries("نص عادي لا شيء فيه").is_empty());
    }

    #[test]
    fn orders_count_only_produced_entries() {
        let entries = parse_entries("كلام\nالباب الأول\nكلام آخر\nالباب الثاني");
        let orders: Vec<_> = entries.iter().map(|e| e.order).collect();
        assert_eq!(orders, [1, 2]);
    }

    #[test]
    fn determine_level_uses_prefix() {
        assert_eq!(determine_level("كتاب الصلاة"), 1);
        assert_eq!(determine_level("فصل في السنن"), 2);
        assert_eq!(determine_level("مطلب في الأذان"), 3);
        assert_eq!(determine_level("مقدمة"), 2);
        // Keyword beyond the first 20 characters does not count.
        assert_eq!(determine_level("ذكر ما جاء في فضل العلم وأهله باب"), 2);
    }

    #[test]
    fn finds_toc_section_window() {
        let mut text = String::from("مقدمة الكتاب\nنص\nفهرس المحتويات\n");
        for i in 1..=150 {
            text.push_str(&format!("سطر {i}\n"));
        }
        let section = find_toc_section(&text, 100).unwrap();
        assert!(section.starts_with("فهرس المحتويات"));
        assert_eq!(section.lines().count(), 100);
        assert!(section.ends_with("سطر 99"));
    }

    #[test]
    fn short_document_window_runs_to_end() {
        let section = find_toc_section("الفهرس\nأ ..... 1", 100).unwrap();
        assert_eq!(section, "الفهرس\nأ ..... 1");
        assert!(find_toc_section("لا عنوان هنا", 100).is_none());
    }

    #[test]
    fn trailing_number_split() {
        assert_eq!(split_trailing_number("في المياه 15"), ("في المياه", Some(15)));
        assert_eq!(split_trailing_number("في المياه....١٥"), ("في المياه", Some(15)));
        assert_eq!(split_trailing_number("سنة329"), ("سنة329", None));
        assert_eq!(split_trailing_number("بلا رقم"), ("بلا رقم", None));
    }

    #[test]
    fn book_info_from_front_matter() {
        let text = "بسم الله الرحمن الرحيم\n\nالرسالة التدمرية\nتأليف: شيخ الإسلام ابن تيمية\n";
        let info = detect_book_info(text);
        assert_eq!(info.title.as_deref(), Some("الرسالة التدمرية"));
        assert_eq!(info.author.as_deref(), Some("شيخ الإسلام ابن تيمية"));

        let info = detect_book_info("كتاب التوحيد\nالشيخ محمد بن عبد الوهاب حفظه الله\n");
        assert_eq!(info.title.as_deref(), Some("التوحيد"));
        assert_eq!(info.author.as_deref(), Some("الشيخ محمد بن عبد الوهاب"));
    }

    #[test]
    fn book_info_never_fails() {
        assert_eq!(detect_book_info(""), BookInfo::default());
        assert_eq!(detect_book_info("نص بلا عنوان"), BookInfo::default());
    }
}
