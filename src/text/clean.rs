//! Display cleanup for partitioned chapter and section bodies.

use std::sync::LazyLock;

use regex::Regex;

static RE_HORIZONTAL_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());

/// A line holding nothing but a page number, optionally dashed: `12`, `١٢`, `- 12 -`.
static RE_PAGE_NUMBER_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:-[ \t]*)?[0-9\x{0660}-\x{0669}\x{06F0}-\x{06F9}]+(?:[ \t]*-)?[ \t]*$")
        .unwrap()
});

static RE_BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^[ \t]+$").unwrap());

static RE_EXCESS_NEWLINES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Clean extracted page text for display.
///
/// Normalizes line endings, collapses horizontal whitespace, drops lines that
/// hold only a running page number, and squeezes blank-line runs down to a
/// single paragraph break.
pub fn clean_content(content: &str) -> String {
    if content.trim().is_empty() {
        return String::new();
    }

    let text = content.replace("\r\n", "\n");
    let text = RE_HORIZONTAL_SPACE.replace_all(&text, " ");
    let text = RE_PAGE_NUMBER_LINE.replace_all(&text, "");
    let text = RE_BLANK_LINE.replace_all(&text, "");
    let text = RE_EXCESS_NEWLINES.replace_all(&text, "\n\n");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removes_running_page_numbers() {
        let raw = "الفصل الأول\n١٢\nنص الفصل\n- 13 -\nتتمة";
        assert_eq!(clean_content(raw), "الفصل الأول\n\nنص الفصل\n\nتتمة");
    }

    #[test]
    fn collapses_spaces_and_blank_runs() {
        let raw = "سطر   أول\r\n\r\n\r\n\r\n\tسطر ثان  ";
        assert_eq!(clean_content(raw), "سطر أول\n\n سطر ثان");
    }

    #[test]
    fn numbers_inside_prose_survive() {
        assert_eq!(clean_content("في سنة 329 هـ"), "في سنة 329 هـ");
    }

    #[test]
    fn empty_input() {
        assert_eq!(clean_content("  \n "), "");
    }
}
