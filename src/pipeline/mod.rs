//! End-to-end processing: TOC detection, then content partitioning.
//!
//! Each stage is timed and recorded as a [`StepLog`] so callers can report
//! progress or diagnose slow documents.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::{ContentConfig, FihrisConfig};
use crate::content::{ChapterBody, ChapterContent, split_tree};
use crate::llm::provider_from_config;
use crate::text::clean_content;
use crate::toc::{DocumentInput, SemanticParser, TocDetector, TocSource, TocTree};

/// Built-in processing stages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    /// Detect the table of contents.
    TocDetection,
    /// Partition page content along the TOC.
    ContentSplitting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Skipped,
}

/// Record of one executed stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepLog {
    pub step: Step,
    pub status: StepStatus,
    pub message: String,
    pub duration_ms: u64,
}

/// Structured result of processing one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookStructure {
    pub title: Option<String>,
    pub author: Option<String>,
    pub total_pages: usize,
    pub confidence: f32,
    pub source: TocSource,
    pub toc: TocTree,
    pub chapters: Vec<ChapterContent>,
    pub steps: Vec<StepLog>,
}

/// Build a detector from configuration, wiring the configured provider.
pub fn detector_from_config(config: &FihrisConfig) -> TocDetector {
    let detector = TocDetector::new(config.detector.clone());
    match provider_from_config(&config.provider) {
        Some(provider) => {
            tracing::info!(provider = provider.name(), "semantic parsing enabled");
            detector.with_semantic(SemanticParser::new(provider))
        }
        None => detector,
    }
}

/// Detect the TOC of `input` and partition its pages along it.
pub fn process_document(
    detector: &TocDetector,
    input: &DocumentInput<'_>,
    content: &ContentConfig,
) -> BookStructure {
    let mut steps = Vec::with_capacity(2);

    let started = Instant::now();
    let detection = detector.detect(input);
    steps.push(StepLog {
        step: Step::TocDetection,
        status: StepStatus::Completed,
        message: format!(
            "{} entries from {} (confidence {:.2})",
            detection.toc.len(),
            detection.source,
            detection.confidence
        ),
        duration_ms: elapsed_ms(started),
    });

    let started = Instant::now();
    let chapters = if input.pages.is_empty() || detection.is_empty() {
        steps.push(StepLog {
            step: Step::ContentSplitting,
            status: StepStatus::Skipped,
            message: "no pages or no TOC entries".into(),
            duration_ms: elapsed_ms(started),
        });
        Vec::new()
    } else {
        let mut chapters = split_tree(input.pages, &detection.toc);
        if content.clean_content {
            chapters.iter_mut().for_each(clean_chapter);
        }
        steps.push(StepLog {
            step: Step::ContentSplitting,
            status: StepStatus::Completed,
            message: format!("{} chapters", chapters.len()),
            duration_ms: elapsed_ms(started),
        });
        chapters
    };

    for step in &steps {
        tracing::info!(step = ?step.step, status = ?step.status, duration_ms = step.duration_ms, "{}", step.message);
    }

    BookStructure {
        title: detection.detected_title,
        author: detection.detected_author,
        total_pages: input.pages.len(),
        confidence: detection.confidence,
        source: detection.source,
        toc: detection.toc,
        chapters,
        steps,
    }
}

fn clean_chapter(chapter: &mut ChapterContent) {
    match &mut chapter.body {
        ChapterBody::Content(text) => *text = clean_content(text),
        ChapterBody::Sections(sections) => {
            for section in sections {
                section.content = clean_content(&section.content);
            }
        }
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX)
}
