//! Page input and partitioned chapter/section output.

use serde::{Deserialize, Serialize};

use crate::error::{InputError, InputResult};

/// Text of one page, in document order by `page_number`.
///
/// Constructed only through [`PageContent::new`] (or deserialization, which
/// applies the same checks), so a page number is always ≥ 1 and a confidence
/// always lies in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PageRecord")]
pub struct PageContent {
    page_number: u32,
    text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
}

/// Unvalidated wire form of a page.
#[derive(Deserialize)]
struct PageRecord {
    #[serde(alias = "page")]
    page_number: i64,
    #[serde(default)]
    text: String,
    #[serde(default)]
    confidence: Option<f32>,
}

impl TryFrom<PageRecord> for PageContent {
    type Error = InputError;

    fn try_from(record: PageRecord) -> InputResult<Self> {
        let page = u32::try_from(record.page_number)
            .map_err(|_| InputError::InvalidPageNumber {
                page: record.page_number,
            })?;
        let page = Self::new(page, record.text)?;
        match record.confidence {
            Some(c) => page.with_confidence(c),
            None => Ok(page),
        }
    }
}

impl PageContent {
    pub fn new(page_number: u32, text: impl Into<String>) -> InputResult<Self> {
        if page_number == 0 {
            return Err(InputError::InvalidPageNumber { page: 0 });
        }
        Ok(Self {
            page_number,
            text: text.into(),
            confidence: None,
        })
    }

    /// Attach an OCR confidence.
    pub fn with_confidence(mut self, confidence: f32) -> InputResult<Self> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(InputError::InvalidConfidence { value: confidence });
        }
        self.confidence = Some(confidence);
        Ok(self)
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn confidence(&self) -> Option<f32> {
        self.confidence
    }

    /// Split plain text into pages of `lines_per_page` lines.
    ///
    /// Pages are trimmed; blank pages are dropped and the remaining pages are
    /// numbered from 1. When nothing survives, the whole trimmed text is
    /// returned as page 1.
    pub fn paginate(text: &str, lines_per_page: usize) -> Vec<PageContent> {
        let lines: Vec<&str> = text.split('\n').collect();
        let mut pages = Vec::new();

        for chunk in lines.chunks(lines_per_page.max(1)) {
            let page_text = chunk.join("\n");
            let page_text = page_text.trim();
            if page_text.is_empty() {
                continue;
            }
            pages.push(PageContent {
                page_number: pages.len() as u32 + 1,
                text: page_text.to_string(),
                confidence: None,
            });
        }

        if pages.is_empty() {
            pages.push(PageContent {
                page_number: 1,
                text: text.trim().to_string(),
                confidence: None,
            });
        }
        pages
    }
}

/// A top-level division of the partitioned document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterContent {
    pub title: String,
    /// 1-based position among chapters.
    pub order: u32,
    #[serde(flatten)]
    pub body: ChapterBody,
}

/// A chapter carries either its own text or its sections, never both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChapterBody {
    Content(String),
    Sections(Vec<SectionContent>),
}

impl ChapterContent {
    /// Chapter text, if this chapter is not split into sections.
    pub fn content(&self) -> Option<&str> {
        match &self.body {
            ChapterBody::Content(text) => Some(text),
            ChapterBody::Sections(_) => None,
        }
    }

    /// Sections, empty when the chapter carries its own text.
    pub fn sections(&self) -> &[SectionContent] {
        match &self.body {
            ChapterBody::Content(_) => &[],
            ChapterBody::Sections(sections) => sections,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionContent {
    pub title: String,
    /// 1-based position within the parent chapter.
    pub order: u32,
    pub content: String,
    /// Number of pages spanned, when page numbers were available.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_zero_is_rejected() {
        assert!(matches!(
            PageContent::new(0, "x"),
            Err(InputError::InvalidPageNumber { page: 0 })
        ));
        let err = serde_json::from_str::<PageContent>(r#"{"page_number": -3, "text": "x"}"#);
        assert!(err.is_err());
    }

    #[test]
    fn confidence_must_be_unit_interval() {
        let page = PageContent::new(1, "x").unwrap();
        assert!(page.clone().with_confidence(0.9).is_ok());
        assert!(page.clone().with_confidence(1.5).is_err());
        assert!(page.with_confidence(f32::NAN).is_err());
    }

    #[test]
    fn deserializes_with_page_alias() {
        let pages: Vec<PageContent> =
            serde_json::from_str(r#"[{"page": 2, "text": "نص", "confidence": 0.5}]"#).unwrap();
        assert_eq!(pages[0].page_number(), 2);
        assert_eq!(pages[0].text(), "نص");
        assert_eq!(pages[0].confidence(), Some(0.5));
    }

    #[test]
    fn paginate_by_lines() {
        let text = (1..=7).map(|i| format!("سطر {i}")).collect::<Vec<_>>().join("\n");
        let pages = PageContent::paginate(&text, 3);
        assert_eq!(pages.len(), 3);
        assert_eq!(pages[0].text(), "سطر 1\nسطر 2\nسطر 3");
        assert_eq!(pages[2].text(), "سطر 7");
        assert_eq!(pages[2].page_number(), 3);
    }

    #[test]
    fn paginate_skips_blank_pages() {
        let pages = PageContent::paginate("a\n\n\n\n\nb", 2);
        let numbers: Vec<_> = pages.iter().map(|p| (p.page_number(), p.text())).collect();
        assert_eq!(numbers, [(1, "a"), (2, "b")]);
        assert_eq!(PageContent::paginate("  ", 50).len(), 1);
    }

    #[test]
    fn chapter_body_serialization() {
        let chapter = ChapterContent {
            title: "الباب الأول".into(),
            order: 1,
            body: ChapterBody::Content("نص".into()),
        };
        let json = serde_json::to_value(&chapter).unwrap();
        assert_eq!(json["content"], "نص");
        assert!(json.get("sections").is_none());
        assert_eq!(chapter.content(), Some("نص"));
        assert!(chapter.sections().is_empty());
    }
}
