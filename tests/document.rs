mod common;

use agency_pdf::pdf::{Align, PdfDocument, TextMetrics};
use agency_pdf::theme::{BODY, PAGE_HEIGHT, PAGE_WIDTH, SMALL};
use agency_pdf::{Error, FontConfig};

fn two_page_document() -> PdfDocument {
    let mut doc = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();
    for label in ["first", "second"] {
        doc.add_page().unwrap();
        let mut canvas = doc.current().unwrap();
        canvas.text(48.0, 120.0, label, BODY);
    }
    doc
}

#[test]
fn stamping_seals_the_page_list() {
    let mut doc = two_page_document();
    let mut seen = Vec::new();
    doc.stamp_pages(|canvas, index, total| {
        canvas.text_aligned(PAGE_WIDTH / 2.0, PAGE_HEIGHT - 24.0, &format!("{} / {total}", index + 1), SMALL, Align::Center);
        seen.push((index, total));
        Ok(())
    })
    .unwrap();
    assert_eq!(seen, vec![(0, 2), (1, 2)]);
    assert!(doc.is_sealed());

    assert!(matches!(doc.add_page(), Err(Error::Generation(_))));
    assert!(matches!(doc.stamp_pages(|_, _, _| Ok(())), Err(Error::Generation(_))));
    assert_eq!(doc.page_count(), 2);

    let bytes = doc.finish().unwrap();
    common::assert_pdf(&bytes);
    assert_eq!(common::page_count(&bytes), 2);
}

#[test]
fn missing_pages_are_generation_errors() {
    let mut empty = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();
    assert!(matches!(empty.current(), Err(Error::Generation(_))));

    let mut doc = two_page_document();
    assert!(doc.canvas(1).is_ok());
    assert!(matches!(doc.canvas(99), Err(Error::Generation(_))));
}

#[test]
fn text_block_advances_by_whole_line_heights() {
    let mut doc = two_page_document();
    let lines = doc.wrap("A paragraph long enough to wrap onto several lines inside a narrow column.", 90.0, BODY);
    assert!(lines.len() > 1);
    let measured = doc.block_height(
        "A paragraph long enough to wrap onto several lines inside a narrow column.",
        90.0,
        BODY,
    );
    let mut canvas = doc.canvas(0).unwrap();
    let bottom = canvas.text_block(48.0, 200.0, &lines, BODY, Align::Left);
    assert!((bottom - 200.0 - measured).abs() < 0.01, "{bottom} vs {measured}");
}

#[test]
fn bold_text_measures_wider() {
    let doc = two_page_document();
    let text = "Total amount due";
    assert!(doc.measure(text, BODY.bold()) > doc.measure(text, BODY));
    assert!(doc.ascent(BODY) > 0.0 && doc.ascent(BODY) < BODY.size);
}
