//! TOC extraction through a completion provider.
//!
//! The provider sees a truncated slice of the book and is asked for one JSON
//! object. Its reply is untrusted: the first balanced `{...}` is cut out and
//! decoded leniently, item by item. Any failure yields a zero-confidence
//! result rather than an error.

use serde_json::Value;

use super::hierarchy;
use super::model::{DetectionResult, TocEntry, TocSource};
use crate::content::PageContent;
use crate::llm::{CompletionProvider, LlmError};
use crate::text::{to_integer, truncate_chars};

const SEMANTIC_CONFIDENCE: f32 = 0.8;
const DEFAULT_LEVEL: u32 = 2;

const PROMPT_TEMPLATE: &str = "\
Below is the opening of an Arabic book. Identify the book's title, its author, \
and its table of contents.

Answer with exactly one JSON object and no other text:
{\"title\": \"book title or null\", \"author\": \"author or null\", \"toc\": [{\"title\": \"heading\", \"page\": 12, \"level\": 1}]}

Levels: 1 for كتاب / باب / جزء / قسم, 2 for فصل / مبحث, 3 for مسألة / مطلب / فرع.
Use the printed page number for \"page\", or null when there is none.
Copy headings exactly as they appear in the text.

Text:
";

/// Semantic TOC parser over a caller-owned completion provider.
pub struct SemanticParser {
    provider: Box<dyn CompletionProvider>,
}

impl SemanticParser {
    pub fn new(provider: Box<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Ask the provider for a TOC of `text`.
    ///
    /// When `text` is blank, the concatenated `pages` are used instead.
    pub fn parse(&self, text: &str, pages: Option<&[PageContent]>) -> DetectionResult {
        let joined;
        let source_text = match pages {
            Some(pages) if text.trim().is_empty() => {
                joined = pages
                    .iter()
                    .map(PageContent::text)
                    .collect::<Vec<_>>()
                    .join("\n\n");
                joined.as_str()
            }
            _ => text,
        };

        match self.try_parse(source_text) {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(provider = self.provider.name(), error = %e, "semantic TOC parsing failed");
                DetectionResult::empty(TocSource::Semantic)
            }
        }
    }

    fn try_parse(&self, text: &str) -> Result<DetectionResult, LlmError> {
        let budget = self.provider.char_budget();
        let prompt = render_prompt(truncate_chars(text, budget));
        tracing::debug!(
            provider = self.provider.name(),
            prompt_chars = prompt.chars().count(),
            "requesting semantic TOC"
        );

        let reply = self.provider.complete(&prompt)?;
        decode_reply(&reply)
    }
}

impl std::fmt::Debug for SemanticParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SemanticParser")
            .field("provider", &self.provider.name())
            .finish()
    }
}

fn render_prompt(text: &str) -> String {
    format!("{PROMPT_TEMPLATE}{text}\n")
}

/// Decode a provider reply into a detection result.
pub fn decode_reply(reply: &str) -> Result<DetectionResult, LlmError> {
    let object = extract_json_object(reply).ok_or_else(|| LlmError::ParseError {
        message: "no JSON object found in reply".into(),
    })?;
    let json: Value = serde_json::from_str(object).map_err(|e| LlmError::ParseError {
        message: format!("JSON parse error: {e}"),
    })?;

    let entries: Vec<TocEntry> = json["toc"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .filter_map(|(i, item)| decode_item(item, i as u32 + 1))
                .collect()
        })
        .unwrap_or_default();

    let confidence = if entries.is_empty() { 0.0 } else { SEMANTIC_CONFIDENCE };
    Ok(DetectionResult {
        toc: hierarchy::build(&entries),
        detected_title: non_empty_str(&json["title"]),
        detected_author: non_empty_str(&json["author"]),
        confidence,
        source: TocSource::Semantic,
    })
}

fn decode_item(item: &Value, order: u32) -> Option<TocEntry> {
    let obj = item.as_object()?;
    let title = obj.get("title").and_then(Value::as_str)?.trim();
    if title.is_empty() {
        return None;
    }
    let page = obj
        .get("page")
        .or_else(|| obj.get("page_number"))
        .and_then(loose_integer);
    let level = obj
        .get("level")
        .and_then(loose_integer)
        .filter(|&l| l >= 1)
        .unwrap_or(DEFAULT_LEVEL);
    Some(TocEntry::new(title, page, level, order))
}

/// An integer given as a JSON number or as a numeral string.
fn loose_integer(value: &Value) -> Option<u32> {
    match value {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| f.fract() == 0.0 && *f >= 0.0).map(|f| f as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => to_integer(s),
        _ => None,
    }
}

fn non_empty_str(value: &Value) -> Option<String> {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty() && *s != "null")
        .map(str::to_string)
}

/// First balanced `{...}` in `text`, skipping braces inside JSON strings.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}
