//! Partition page content into chapters and sections along a TOC.
//!
//! Two strategies, chosen by whether the TOC carries page numbers:
//!
//! - **By page range**: each chapter spans from its page up to the page
//!   before the next chapter; sections subdivide the chapter the same way.
//! - **By title matching**: pages are concatenated and each title is located
//!   in the buffer (exact, then diacritic-insensitive, then by its first
//!   words). Chapter bodies are exact slices of the buffer.

use regex::Regex;

use super::model::{ChapterBody, ChapterContent, PageContent, SectionContent};
use crate::text::{normalize_for_matching, normalize_with_offsets};
use crate::toc::{TocEntry, TocTree};

const PAGE_SEPARATOR: &str = "\n\n";
const FUZZY_WORDS: usize = 3;

/// Split `pages` into chapters following the flat `entries`.
///
/// Returns an empty list when either input is empty.
pub fn split(pages: &[PageContent], entries: &[TocEntry]) -> Vec<ChapterContent> {
    tracing::info!(pages = pages.len(), entries = entries.len(), "splitting content");
    if pages.is_empty() || entries.is_empty() {
        return Vec::new();
    }

    let mut ordered_pages: Vec<&PageContent> = pages.iter().collect();
    ordered_pages.sort_by_key(|p| p.page_number());

    let chapters = if entries.iter().any(|e| e.page_number.is_some()) {
        split_by_pages(&ordered_pages, entries)
    } else {
        split_by_titles(&ordered_pages, entries)
    };

    tracing::info!(chapters = chapters.len(), "content split");
    chapters
}

/// Split along a built hierarchy, using its pre-order flattening.
pub fn split_tree(pages: &[PageContent], tree: &TocTree) -> Vec<ChapterContent> {
    split(pages, &tree.flatten())
}

// ── By page range ───────────────────────────────────────────────────────

fn split_by_pages(pages: &[&PageContent], entries: &[TocEntry]) -> Vec<ChapterContent> {
    let mut paged: Vec<(&TocEntry, u32)> = entries
        .iter()
        .filter_map(|e| e.page_number.map(|p| (e, p)))
        .collect();
    paged.sort_by_key(|&(_, page)| page);

    let has_top_level = paged.iter().any(|(e, _)| e.level == 1);
    let chapters: Vec<(&TocEntry, u32)> = paged
        .iter()
        .copied()
        .filter(|(e, _)| !has_top_level || e.level == 1)
        .collect();
    let last_page = pages.last().map_or(0, |p| p.page_number());

    let mut out = Vec::with_capacity(chapters.len());
    for (i, &(entry, start)) in chapters.iter().enumerate() {
        let end = chapters
            .get(i + 1)
            .map_or(last_page, |&(_, next)| next.saturating_sub(1));

        let section_entries: Vec<(&TocEntry, u32)> = if has_top_level {
            paged
                .iter()
                .copied()
                .filter(|&(e, page)| e.level > 1 && (start..=end).contains(&page))
                .collect()
        } else {
            Vec::new()
        };

        let body = if section_entries.is_empty() {
            ChapterBody::Content(join_page_range(pages, start, end))
        } else {
            ChapterBody::Sections(sections_by_pages(pages, &section_entries, end))
        };

        out.push(ChapterContent {
            title: entry.title.clone(),
            order: i as u32 + 1,
            body,
        });
    }
    out
}

fn sections_by_pages(
    pages: &[&PageContent],
    sections: &[(&TocEntry, u32)],
    chapter_end: u32,
) -> Vec<SectionContent> {
    sections
        .iter()
        .enumerate()
        .map(|(i, &(entry, start))| {
            let end = sections
                .get(i + 1)
                .map_or(chapter_end, |&(_, next)| next.saturating_sub(1));
            let page_count = if end >= start { end - start + 1 } else { 1 };
            SectionContent {
                title: entry.title.clone(),
                order: i as u32 + 1,
                content: join_page_range(pages, start, end),
                page_count: Some(page_count),
            }
        })
        .collect()
}

/// Non-empty page texts with `start <= page <= end`, in page order.
fn join_page_range(pages: &[&PageContent], start: u32, end: u32) -> String {
    pages
        .iter()
        .filter(|p| (start..=end).contains(&p.page_number()) && !p.text().is_empty())
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR)
}

// ── By title matching ───────────────────────────────────────────────────

fn split_by_titles(pages: &[&PageContent], entries: &[TocEntry]) -> Vec<ChapterContent> {
    tracing::info!("no page numbers in TOC, splitting by title matching");

    let buffer = pages
        .iter()
        .map(|p| p.text())
        .collect::<Vec<_>>()
        .join(PAGE_SEPARATOR);
    let matcher = TitleMatcher::new(&buffer);

    let has_top_level = entries.iter().any(|e| e.level == 1);
    let chapter_idx: Vec<usize> = (0..entries.len())
        .filter(|&i| !has_top_level || entries[i].level == 1)
        .collect();

    let mut out = Vec::new();
    let mut search_from = 0;

    for (k, &idx) in chapter_idx.iter().enumerate() {
        let entry = &entries[idx];
        let Some(start) = matcher.locate(&entry.title, search_from) else {
            tracing::debug!(title = %entry.title, "chapter title not found in text");
            continue;
        };
        search_from = next_char_boundary(&buffer, start);

        let end = chapter_idx
            .get(k + 1)
            .and_then(|&next| matcher.locate(&entries[next].title, search_from))
            .unwrap_or(buffer.len());
        let slice = &buffer[start..end];

        let next_chapter = chapter_idx.get(k + 1).copied().unwrap_or(entries.len());
        let section_entries = if has_top_level {
            &entries[idx + 1..next_chapter]
        } else {
            &[][..]
        };
        let sections = sections_by_titles(slice, section_entries);

        let body = if sections.is_empty() {
            ChapterBody::Content(slice.to_string())
        } else {
            ChapterBody::Sections(sections)
        };

        out.push(ChapterContent {
            title: entry.title.clone(),
            order: out.len() as u32 + 1,
            body,
        });
    }
    out
}

fn sections_by_titles(chapter: &str, entries: &[TocEntry]) -> Vec<SectionContent> {
    if entries.is_empty() {
        return Vec::new();
    }

    let matcher = TitleMatcher::new(chapter);
    let mut located: Vec<(&TocEntry, usize)> = Vec::new();
    let mut search_from = 0;
    for entry in entries {
        match matcher.locate(&entry.title, search_from) {
            Some(pos) => {
                search_from = next_char_boundary(chapter, pos);
                located.push((entry, pos));
            }
            None => tracing::debug!(title = %entry.title, "section title not found in chapter"),
        }
    }

    located
        .iter()
        .enumerate()
        .map(|(i, &(entry, start))| {
            let end = located.get(i + 1).map_or(chapter.len(), |&(_, next)| next);
            SectionContent {
                title: entry.title.clone(),
                order: i as u32 + 1,
                content: chapter[start..end].to_string(),
                page_count: None,
            }
        })
        .collect()
}

fn next_char_boundary(text: &str, pos: usize) -> usize {
    text[pos..]
        .chars()
        .next()
        .map_or(text.len(), |c| pos + c.len_utf8())
}

/// Locates titles in one haystack, keeping its normalized form around.
struct TitleMatcher<'a> {
    haystack: &'a str,
    normalized: String,
    offsets: Vec<usize>,
}

impl<'a> TitleMatcher<'a> {
    fn new(haystack: &'a str) -> Self {
        let (normalized, offsets) = normalize_with_offsets(haystack);
        Self {
            haystack,
            normalized,
            offsets,
        }
    }

    /// Byte offset of the first occurrence of `title` at or after `from`.
    fn locate(&self, title: &str, from: usize) -> Option<usize> {
        let title = title.trim();
        if title.is_empty() || from > self.haystack.len() {
            return None;
        }
        self.find_exact(title, from)
            .or_else(|| self.find_normalized(title, from))
            .or_else(|| self.find_fuzzy(title, from))
    }

    fn find_exact(&self, title: &str, from: usize) -> Option<usize> {
        self.haystack[from..].find(title).map(|pos| from + pos)
    }

    fn find_normalized(&self, title: &str, from: usize) -> Option<usize> {
        let needle = normalize_for_matching(title);
        if needle.is_empty() {
            return None;
        }
        // Offsets never decrease, so the first normalized byte produced at or
        // after `from` is a partition point.
        let mut start = self.offsets.partition_point(|&off| off < from);
        while start < self.normalized.len() && !self.normalized.is_char_boundary(start) {
            start += 1;
        }
        self.normalized[start..]
            .find(&needle)
            .map(|pos| self.offsets[start + pos])
    }

    fn find_fuzzy(&self, title: &str, from: usize) -> Option<usize> {
        let words: Vec<String> = title
            .split_whitespace()
            .take(FUZZY_WORDS)
            .map(regex::escape)
            .collect();
        if words.is_empty() {
            return None;
        }
        let re = Regex::new(&words.join(r"\s*")).ok()?;
        re.find_at(self.haystack, from).map(|m| m.start())
    }
}
