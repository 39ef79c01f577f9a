// thiserror's #[error("...{field}...")] format strings reference struct fields,
// but the compiler doesn't see through the derive macro and reports false positives.
#![allow(unused_assignments)]

//! # fihris
//!
//! Table-of-contents detection and chapter partitioning for long-form Arabic
//! and Islamic book texts.
//!
//! ## Architecture
//!
//! - **Text** (`text`): Arabic numerals and ordinals, diacritic-insensitive matching
//! - **TOC detection** (`toc`): embedded outline → structural patterns →
//!   completion provider → page-layout heuristic, into an arena-backed tree
//! - **Providers** (`llm`): Ollama, Anthropic and OpenAI clients over `ureq`
//! - **Content** (`content`): page-range or title-matching chapter/section split
//! - **Pipeline** (`pipeline`): detection + splitting with per-step timing
//!
//! ## Library usage
//!
//! ```no_run
//! use fihris::config::DetectorConfig;
//! use fihris::content::{PageContent, split_tree};
//! use fihris::toc::{DocumentInput, TocDetector};
//!
//! let pages = vec![
//!     PageContent::new(1, "فهرس المحتويات\nالباب الأول .... 2\nالباب الثاني .... 3\nالباب الثالث .... 4").unwrap(),
//!     PageContent::new(2, "الباب الأول\n...").unwrap(),
//! ];
//! let text = pages.iter().map(|p| p.text()).collect::<Vec<_>>().join("\n");
//!
//! let detector = TocDetector::new(DetectorConfig::default());
//! let result = detector.detect(&DocumentInput::new(&text).with_pages(&pages));
//! let chapters = split_tree(&pages, &result.toc);
//! println!("{} chapters from {}", chapters.len(), result.source);
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod text;
pub mod toc;
