//! Page content and its partitioning into chapters and sections.

pub mod model;
pub mod splitter;

pub use model::{ChapterBody, ChapterContent, PageContent, SectionContent};
pub use splitter::{split, split_tree};
