//! Multi-strategy TOC detection.
//!
//! Strategies run in a fixed order, most trusted first:
//!
//! 1. **Embedded**: outline metadata carried by the source format.
//! 2. **Pattern**: a located TOC section parsed with structural patterns.
//! 3. **Semantic**: a completion provider, when one is configured.
//! 4. **Structure heuristic**: headings at the top of pages.
//!
//! The first strategy that produces an acceptable result wins. A strategy
//! that finds nothing yields to the next one; when all are exhausted the last
//! zero-confidence result is returned.

use super::heuristic;
use super::hierarchy;
use super::model::{DetectionResult, EmbeddedTocItem, TocEntry, TocSource};
use super::patterns::{detect_book_info, find_toc_section, parse_entries};
use super::semantic::SemanticParser;
use crate::config::DetectorConfig;
use crate::content::PageContent;
use crate::text::truncate_chars;

const EMBEDDED_CONFIDENCE: f32 = 0.95;
const PATTERN_CONFIDENCE: f32 = 0.8;

/// Everything known about one document before detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocumentInput<'a> {
    /// Full extracted text.
    pub text: &'a str,
    /// Pages in document order; may be empty.
    pub pages: &'a [PageContent],
    /// Outline supplied by a format-specific reader, if any.
    pub embedded_toc: Option<&'a [EmbeddedTocItem]>,
}

impl<'a> DocumentInput<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            ..Default::default()
        }
    }

    pub fn with_pages(mut self, pages: &'a [PageContent]) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_embedded_toc(mut self, items: &'a [EmbeddedTocItem]) -> Self {
        self.embedded_toc = Some(items);
        self
    }
}

/// Detection strategies in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Embedded,
    Pattern,
    Semantic,
    StructureHeuristic,
}

const STRATEGY_ORDER: [Strategy; 4] = [
    Strategy::Embedded,
    Strategy::Pattern,
    Strategy::Semantic,
    Strategy::StructureHeuristic,
];

/// What one strategy concluded.
enum Outcome {
    /// Use this result; stop.
    Accept(DetectionResult),
    /// Nothing usable, but remember this result if nothing better follows.
    Fallback(DetectionResult),
    /// Strategy not applicable to this input.
    Skip,
}

/// Runs the detection strategies over a document.
#[derive(Debug)]
pub struct TocDetector {
    config: DetectorConfig,
    semantic: Option<SemanticParser>,
}

impl TocDetector {
    /// A detector without semantic parsing.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            semantic: None,
        }
    }

    /// Enable the semantic strategy.
    pub fn with_semantic(mut self, parser: SemanticParser) -> Self {
        self.semantic = Some(parser);
        self
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Detect the TOC of `input`. Never fails.
    ///
    /// Strategies run in their fixed order and the first that finds entries
    /// wins. Otherwise the last strategy that ran and came back empty supplies
    /// the result; when none ran at all the empty result is attributed to
    /// [`TocSource::StructureHeuristic`], the final strategy in the order.
    pub fn detect(&self, input: &DocumentInput<'_>) -> DetectionResult {
        tracing::info!(
            text_chars = input.text.chars().count(),
            pages = input.pages.len(),
            embedded = input.embedded_toc.map_or(0, <[_]>::len),
            "starting TOC detection"
        );

        let toc_section = find_toc_section(input.text, self.config.toc_window_lines);
        let mut fallback = None;

        for strategy in STRATEGY_ORDER {
            let outcome = match strategy {
                Strategy::Embedded => self.embedded(input),
                Strategy::Pattern => self.pattern(input, toc_section),
                Strategy::Semantic => self.semantic(input, toc_section),
                Strategy::StructureHeuristic => self.structure_heuristic(input),
            };
            match outcome {
                Outcome::Accept(result) => {
                    tracing::info!(
                        ?strategy,
                        entries = result.toc.len(),
                        confidence = result.confidence,
                        "TOC strategy accepted"
                    );
                    return result;
                }
                Outcome::Fallback(result) => {
                    tracing::debug!(?strategy, "TOC strategy found nothing");
                    fallback = Some(result);
                }
                Outcome::Skip => tracing::debug!(?strategy, "TOC strategy skipped"),
            }
        }

        tracing::info!("no TOC detected");
        fallback.unwrap_or_else(|| DetectionResult::empty(TocSource::StructureHeuristic))
    }

    fn embedded(&self, input: &DocumentInput<'_>) -> Outcome {
        let Some(items) = input.embedded_toc else {
            return Outcome::Skip;
        };
        if items.len() < self.config.min_entries {
            return Outcome::Skip;
        }
        // Blank titles still count toward the outline but get no node.
        let entries: Vec<TocEntry> = items
            .iter()
            .filter(|item| !item.title.trim().is_empty())
            .enumerate()
            .map(|(i, item)| item.to_entry(i as u32 + 1))
            .collect();
        Outcome::Accept(DetectionResult {
            toc: hierarchy::build(&entries),
            detected_title: None,
            detected_author: None,
            confidence: EMBEDDED_CONFIDENCE,
            source: TocSource::Embedded,
        })
    }

    fn pattern(&self, input: &DocumentInput<'_>, toc_section: Option<&str>) -> Outcome {
        let Some(section) = toc_section else {
            return Outcome::Skip;
        };
        let entries = parse_entries(section);
        if entries.len() < self.config.min_entries {
            tracing::debug!(entries = entries.len(), "too few pattern entries");
            return Outcome::Skip;
        }

        let info = detect_book_info(truncate_chars(input.text, self.config.book_info_chars));
        Outcome::Accept(DetectionResult {
            toc: hierarchy::build(&entries),
            detected_title: info.title,
            detected_author: info.author,
            confidence: PATTERN_CONFIDENCE,
            source: TocSource::Pattern,
        })
    }

    fn semantic(&self, input: &DocumentInput<'_>, toc_section: Option<&str>) -> Outcome {
        let Some(parser) = &self.semantic else {
            return Outcome::Skip;
        };
        let text = toc_section
            .unwrap_or_else(|| truncate_chars(input.text, self.config.semantic_fallback_chars));
        let pages = (!input.pages.is_empty()).then_some(input.pages);

        let result = self.with_book_info(parser.parse(text, pages), input);
        if result.is_empty() {
            Outcome::Fallback(result)
        } else {
            Outcome::Accept(result)
        }
    }

    fn structure_heuristic(&self, input: &DocumentInput<'_>) -> Outcome {
        if input.pages.is_empty() {
            return Outcome::Skip;
        }
        let result = heuristic::detect_from_layout(input.pages, self.config.heuristic_lines_per_page);
        if result.is_empty() {
            Outcome::Fallback(result)
        } else {
            Outcome::Accept(self.with_book_info(result, input))
        }
    }

    /// Fill a missing title or author from the front matter.
    fn with_book_info(&self, mut result: DetectionResult, input: &DocumentInput<'_>) -> DetectionResult {
        if result.detected_title.is_some() && result.detected_author.is_some() {
            return result;
        }
        let info = detect_book_info(truncate_chars(input.text, self.config.book_info_chars));
        result.detected_title = result.detected_title.or(info.title);
        result.detected_author = result.detected_author.or(info.author);
        result
    }
}
