//! Table-of-contents detection.
//!
//! [`TocDetector`] runs the strategies; the submodules are usable on their
//! own (e.g. [`patterns::parse_entries`] on a known TOC page).

pub mod detector;
pub mod heuristic;
pub mod hierarchy;
pub mod model;
pub mod patterns;
pub mod semantic;

pub use detector::{DocumentInput, Strategy, TocDetector};
pub use model::{
    BookInfo, DetectionResult, EmbeddedTocItem, NodeId, TocEntry, TocItemView, TocNode, TocSource,
    TocTree,
};
pub use semantic::SemanticParser;
