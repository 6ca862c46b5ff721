use agency_pdf::FontConfig;
use agency_pdf::pdf::{PdfDocument, TextMetrics};
use agency_pdf::proposal::proposal_filename;
use agency_pdf::text::{
    EMPTY_FALLBACK, format_hours, format_money, normalize_text, sanitize_filename_component, split_into_bullets,
    truncate_with_ellipsis, wrap_to_width,
};
use agency_pdf::theme::{BODY, PAGE_HEIGHT, PAGE_WIDTH};

const SAMPLES: &[&str] = &[
    "",
    "   ",
    "plain",
    "  leading and trailing  ",
    "tabs\tand\nnewlines\r\nmixed",
    "control\u{0}chars\u{7}inside",
    "non\u{a0}breaking\u{2003}spaces",
    "Ünïcödé — “quotes” …",
    "\u{1b}[31mansi\u{1b}[0m",
];

#[test]
fn normalize_is_idempotent() {
    for s in SAMPLES {
        let once = normalize_text(s, EMPTY_FALLBACK);
        let twice = normalize_text(&once, EMPTY_FALLBACK);
        assert_eq!(once, twice, "not idempotent for {s:?}");
    }
}

#[test]
fn normalize_collapses_and_falls_back() {
    assert_eq!(normalize_text("  a \t b\n\nc ", "-"), "a b c");
    assert_eq!(normalize_text("\u{0}\u{7} \n", EMPTY_FALLBACK), EMPTY_FALLBACK);
    assert_eq!(normalize_text("x\u{0}y", ""), "xy");
}

fn fixed_width(s: &str) -> f32 {
    s.chars().count() as f32 * 6.0
}

#[test]
fn wrapped_lines_fit_except_lone_long_words() {
    let text = "The quick brown fox jumps over the lazy dog while an extraordinarilylongunbrokenidentifier sits between ordinary words";
    for width in [30.0, 60.0, 90.0, 150.0, 400.0] {
        let lines = wrap_to_width(text, width, fixed_width);
        assert!(!lines.is_empty());
        for line in &lines {
            if fixed_width(line) > width {
                assert!(!line.contains(' '), "overflowing line {line:?} at width {width} holds more than one word");
            }
        }
        let rejoined = lines.join(" ");
        assert_eq!(rejoined, normalize_text(text, ""));
    }
}

#[test]
fn wrap_against_font_metrics() {
    let doc = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();
    let text = "Rebuild the customer portal with a faster checkout and a self-service billing area for every region.";
    let lines = doc.wrap(text, 120.0, BODY);
    assert!(lines.len() > 2);
    for line in &lines {
        assert!(doc.measure(line, BODY) <= 120.0, "{line:?} is too wide");
    }
    assert_eq!(doc.block_height(text, 120.0, BODY), lines.len() as f32 * BODY.line_height());
    assert!(doc.wrap("", 120.0, BODY).is_empty());
}

#[test]
fn truncation_respects_budget() {
    let long = "abcdefghij klmnopqrst uvwxyz ".repeat(5);
    for n in [0, 1, 5, 10, 11, 40, 200] {
        let out = truncate_with_ellipsis(&long, n);
        assert!(out.chars().count() <= n + 1, "budget {n} exceeded: {out:?}");
    }
    assert_eq!(truncate_with_ellipsis("short", 5), "short");
    assert_eq!(truncate_with_ellipsis("short", 10), "short");
    assert_eq!(truncate_with_ellipsis("hello world", 6), "hello\u{2026}");
}

#[test]
fn filenames_use_safe_characters_only() {
    let name = proposal_filename("Acme & Co. LLC");
    assert_eq!(name, "proposal_Acme_Co_LLC.pdf");
    let stem = name.strip_suffix(".pdf").unwrap();
    assert!(stem.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-'));
    assert!(!stem.contains('&') && !stem.contains(' ') && !stem.contains('.'));

    assert_eq!(sanitize_filename_component("  "), "document");
    assert_eq!(sanitize_filename_component("Zürich-Ost / Phase 2"), "Z_rich-Ost_Phase_2");
}

#[test]
fn money_and_hours_formatting() {
    assert_eq!(format_money(0.0, "\u{20ac}"), "\u{20ac}0.00");
    assert_eq!(format_money(12500.0, "\u{20ac}"), "\u{20ac}12,500.00");
    assert_eq!(format_money(960.0, "$"), "$960.00");
    assert_eq!(format_money(1234567.891, "$"), "$1,234,567.89");
    assert_eq!(format_money(-42.5, "$"), "-$42.50");
    assert_eq!(format_hours(14.0), "14.0");
    assert_eq!(format_hours(7.5), "7.5");
}

#[test]
fn bullets_strip_markers_and_cap() {
    let text = "1. First point.\n2) Second point! Third point?\n\n* Fourth\n- Fifth\n• Sixth";
    let bullets = split_into_bullets(text, 200, 5);
    assert_eq!(
        bullets,
        vec!["First point.", "Second point!", "Third point?", "Fourth", "Fifth"]
    );
}
