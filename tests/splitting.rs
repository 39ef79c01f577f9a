//! Integration tests for content partitioning and the end-to-end pipeline.

use fihris::config::{ContentConfig, DetectorConfig, FihrisConfig};
use fihris::content::{ChapterBody, PageContent, split, split_tree};
use fihris::pipeline::{StepStatus, process_document};
use fihris::toc::{DocumentInput, TocDetector, TocEntry, TocSource, hierarchy};

fn numbered_pages(n: u32) -> Vec<PageContent> {
    (1..=n)
        .map(|i| PageContent::new(i, format!("صفحة {i}")).unwrap())
        .collect()
}

#[test]
fn page_ranges_partition_every_page_exactly_once() {
    let pages = numbered_pages(8);
    let toc = [
        TocEntry::new("Ch1", Some(1), 1, 1),
        TocEntry::new("Ch2", Some(5), 1, 2),
    ];
    let chapters = split(&pages, &toc);

    let mut seen = Vec::new();
    for chapter in &chapters {
        let body = chapter.content().unwrap();
        seen.extend(body.split("\n\n").map(str::to_string));
    }
    let expected: Vec<_> = (1..=8).map(|i| format!("صفحة {i}")).collect();
    assert_eq!(seen, expected);
}

#[test]
fn split_tree_matches_split_on_flattening() {
    let entries = vec![
        TocEntry::new("الباب الأول", Some(1), 1, 1),
        TocEntry::new("الفصل الأول", Some(2), 2, 2),
        TocEntry::new("الباب الثاني", Some(4), 1, 3),
    ];
    let tree = hierarchy::build(&entries);
    let pages = numbered_pages(5);
    assert_eq!(split_tree(&pages, &tree), split(&pages, &entries));
}

#[test]
fn title_matching_when_toc_has_no_pages() {
    let pages = vec![
        PageContent::new(1, "توطئة\nالباب الأول\nفي الإيمان").unwrap(),
        PageContent::new(2, "بقية الباب\nالباب الثاني\nفي الإسلام").unwrap(),
    ];
    let toc = [
        TocEntry::new("الباب الأول", None, 1, 1),
        TocEntry::new("الباب الثاني", None, 1, 2),
    ];
    let chapters = split(&pages, &toc);
    let buffer = "توطئة\nالباب الأول\nفي الإيمان\n\nبقية الباب\nالباب الثاني\nفي الإسلام";
    let first = buffer.find("الباب الأول").unwrap();
    let second = buffer.find("الباب الثاني").unwrap();

    assert_eq!(chapters.len(), 2);
    assert_eq!(chapters[0].content(), Some(&buffer[first..second]));
    assert_eq!(chapters[1].content(), Some(&buffer[second..]));
}

#[test]
fn chapters_serialize_content_or_sections() {
    let pages = numbered_pages(4);
    let toc = [
        TocEntry::new("أ", Some(1), 1, 1),
        TocEntry::new("أ.١", Some(2), 2, 2),
        TocEntry::new("ب", Some(4), 1, 3),
    ];
    let chapters = split(&pages, &toc);
    assert!(matches!(chapters[0].body, ChapterBody::Sections(_)));

    let json = serde_json::to_value(&chapters).unwrap();
    assert!(json[0].get("content").is_none());
    assert_eq!(json[0]["sections"][0]["page_count"], 2);
    assert_eq!(json[1]["content"], "صفحة 4");
}

#[test]
fn pipeline_on_paginated_plain_text() {
    let mut text = String::from("فهرس المحتويات\n");
    text.push_str("الباب الأول .... 2\nالباب الثاني .... 3\nالباب الثالث .... 4\n\n");
    for title in ["الباب الأول", "الباب الثاني", "الباب الثالث"] {
        text.push_str(title);
        text.push_str("\nنص الباب\n\n\n\n");
    }
    // Five lines per page puts the TOC and each chapter on pages of their own.
    let pages = PageContent::paginate(&text, 5);
    assert_eq!(pages.len(), 4);

    let detector = TocDetector::new(DetectorConfig::default());
    let input = DocumentInput::new(&text).with_pages(&pages);
    let book = process_document(&detector, &input, &ContentConfig::default());

    assert_eq!(book.source, TocSource::Pattern);
    assert_eq!(book.total_pages, 4);
    assert_eq!(book.chapters.len(), 3);
    assert_eq!(book.chapters[2].content(), Some("الباب الثالث\nنص الباب"));
    assert!(book.steps.iter().all(|s| s.status == StepStatus::Completed));

    let json = serde_json::to_value(&book).unwrap();
    assert_eq!(json["steps"][0]["step"], "toc_detection");
    assert_eq!(json["steps"][1]["step"], "content_splitting");
}

#[test]
fn config_file_drives_content_cleaning() {
    let tmp = tempfile::TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    std::fs::write(&path, "[content]\nclean_content = true\n").unwrap();
    let config = FihrisConfig::load(&path).unwrap();
    assert!(config.content.clean_content);

    let pages = vec![
        PageContent::new(1, "مقدمة").unwrap(),
        PageContent::new(2, "الباب   الأول\n- 2 -\nنص").unwrap(),
    ];
    let toc = [
        TocEntry::new("مقدمة", Some(1), 1, 1),
        TocEntry::new("الباب الأول", Some(2), 1, 2),
        TocEntry::new("الباب الثاني", Some(3), 1, 3),
    ];
    let text = "مقدمة\nالباب الأول";
    let detector = TocDetector::new(config.detector.clone());
    let items: Vec<fihris::toc::EmbeddedTocItem> = toc
        .iter()
        .map(|e| fihris::toc::EmbeddedTocItem {
            level: Some(e.level as i64),
            title: e.title.clone(),
            page_number: e.page_number.map(i64::from),
        })
        .collect();
    let input = DocumentInput::new(text)
        .with_pages(&pages)
        .with_embedded_toc(&items);

    let book = process_document(&detector, &input, &config.content);
    assert_eq!(book.source, TocSource::Embedded);
    assert_eq!(book.chapters[1].content(), Some("الباب الأول\n\nنص"));
}
