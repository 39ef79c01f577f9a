//! Last-resort TOC from page layout.
//!
//! Classical texts usually open a new division at the top of a page. The
//! first few lines of every page are scanned for a heading-like line, and at
//! most one such line per page becomes an entry pointing at that page.

use std::sync::LazyLock;

use regex::Regex;

use super::hierarchy;
use super::model::{DetectionResult, TocEntry, TocSource};
use crate::content::PageContent;
use crate::text::{normalize_for_matching, normalize_letterforms, truncate_chars};

const HEURISTIC_CONFIDENCE: f32 = 0.5;
const MIN_HEADING_CHARS: usize = 5;
/// Characters of a line searched for a structural keyword.
const KEYWORD_PREFIX_CHARS: usize = 30;

const STRUCTURAL_KEYWORDS: &[&str] = &[
    "كتاب", "باب", "فصل", "مبحث", "مقصد", "جزء", "قسم", "مسألة", "فرع", "مطلب",
];

/// A standalone ordinal (first through fifth) in letterform-normalized text,
/// optionally with the article, a leading conjunction, or a feminine ending.
static RE_ORDINAL_WORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^\p{L}])(?:[وفب]?ال)?(?:اول|ثاني|ثالث|رابع|خامس)[يه]?(?:[^\p{L}]|$)").unwrap()
});

/// Build a TOC from headings found near the top of each page.
pub fn detect_from_layout(pages: &[PageContent], lines_per_page: usize) -> DetectionResult {
    let mut entries = Vec::new();

    for page in pages {
        let heading = page
            .text()
            .lines()
            .take(lines_per_page)
            .map(str::trim)
            .find(|line| looks_like_heading(line));

        if let Some(title) = heading {
            let order = entries.len() as u32 + 1;
            entries.push(TocEntry::new(
                title,
                Some(page.page_number()),
                heading_level(title),
                order,
            ));
        }
    }

    if entries.is_empty() {
        return DetectionResult::empty(TocSource::StructureHeuristic);
    }

    tracing::info!(entries = entries.len(), "layout heuristic found headings");
    DetectionResult {
        toc: hierarchy::build(&entries),
        detected_title: None,
        detected_author: None,
        confidence: HEURISTIC_CONFIDENCE,
        source: TocSource::StructureHeuristic,
    }
}

fn looks_like_heading(line: &str) -> bool {
    if line.chars().count() < MIN_HEADING_CHARS {
        return false;
    }
    let prefix = folded_prefix(line);
    if STRUCTURAL_KEYWORDS
        .iter()
        .any(|k| prefix.contains(&normalize_letterforms(k)))
    {
        return true;
    }
    RE_ORDINAL_WORD.is_match(&normalize_letterforms(&normalize_for_matching(line)))
}

fn folded_prefix(line: &str) -> String {
    normalize_letterforms(truncate_chars(line, KEYWORD_PREFIX_CHARS))
}

fn heading_level(line: &str) -> u32 {
    let prefix = folded_prefix(line);
    let has_any = |keywords: &[&str]| keywords.iter().any(|k| prefix.contains(k));

    if has_any(&["كتاب", "جزء", "قسم"]) {
        1
    } else if has_any(&["باب", "فصل", "مبحث", "مقصد"]) {
        2
    } else {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(n: u32, text: &str) -> PageContent {
        PageContent::new(n, text).unwrap()
    }

    #[test]
    fn one_heading_per_page() {
        let pages = [
            page(1, "كتاب الطهارة\nباب المياه\nنص"),
            page(2, "نص متصل بلا عنوان\nتتمة"),
            page(3, "\nفصل في التيمم\nنص"),
        ];
        let result = detect_from_layout(&pages, 5);
        assert_eq!(result.source, TocSource::StructureHeuristic);
        assert_eq!(result.confidence, 0.5);

        let flat = result.toc.flatten();
        let got: Vec<_> = flat
            .iter()
            .map(|e| (e.title.as_str(), e.page_number, e.level))
            .collect();
        assert_eq!(
            got,
            [("كتاب الطهارة", Some(1), 1), ("فصل في التيمم", Some(3), 2)]
        );
    }

    #[test]
    fn ordinal_anywhere_qualifies() {
        let pages = [page(4, "وهذا هو المقام الثاني من الكلام")];
        let result = detect_from_layout(&pages, 5);
        let flat = result.toc.flatten();
        assert_eq!(flat.len(), 1);
        assert_eq!(flat[0].level, 3);
    }

    #[test]
    fn ordinal_inside_a_word_is_prose() {
        let pages = [
            page(1, "وقد تناول العلماء ذلك بالتفصيل"),
            page(2, "وهو المتداول بين الناس"),
        ];
        assert!(detect_from_layout(&pages, 5).is_empty());
    }

    #[test]
    fn feminine_and_voweled_ordinals_qualify() {
        let pages = [
            page(1, "وهذه هي المقالة الثانية"),
            page(2, "والأوَّلُ منهما أظهر"),
        ];
        let flat = detect_from_layout(&pages, 5).toc.flatten();
        assert_eq!(flat.len(), 2);
    }

    #[test]
    fn persian_letter_shapes_keep_their_level() {
        let pages = [page(1, "کتاب الصلاة\nنص"), page(2, "فصـــل في الأذان\nنص")];
        let flat = detect_from_layout(&pages, 5).toc.flatten();
        let levels: Vec<_> = flat.iter().map(|e| e.level).collect();
        assert_eq!(levels, [1, 2]);
    }

    #[test]
    fn only_leading_lines_are_inspected() {
        let pages = [page(1, "أ\nب\nج\nد\nهـ\nباب متأخر")];
        let result = detect_from_layout(&pages, 5);
        assert!(result.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn short_lines_are_ignored() {
        let pages = [page(1, "باب")];
        assert!(detect_from_layout(&pages, 5).is_empty());
    }
}
