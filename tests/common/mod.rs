#![allow(dead_code)]

use std::fs;
use std::io::Cursor;
use std::path::PathBuf;

use agency_pdf::{InvoiceExportInput, ProposalInput, TimesheetExportInput};

/// Output directory: tests/output/<case>/, emptied first.
pub fn output_dir(case: &str) -> PathBuf {
    let dir = PathBuf::from("tests/output").join(case);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).expect("create output dir");
    dir
}

/// Page count from the page tree's `/Count` entry.
pub fn page_count(pdf: &[u8]) -> usize {
    let text = String::from_utf8_lossy(pdf);
    let start = text.find("/Count ").expect("page tree /Count") + "/Count ".len();
    text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect::<String>()
        .parse()
        .expect("numeric /Count")
}

pub fn assert_pdf(bytes: &[u8]) {
    assert!(bytes.starts_with(b"%PDF-"), "missing PDF header");
    assert!(bytes.len() > 500, "suspiciously small PDF ({} bytes)", bytes.len());
}

/// Flat wordmark-shaped SVG with the given viewport.
pub fn svg_logo(width: f32, height: f32) -> Vec<u8> {
    format!(
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="{width}" height="{height}" viewBox="0 0 {width} {height}">
  <rect x="0" y="0" width="{width}" height="{height}" fill="#111827"/>
  <rect x="{inset}" y="{inset}" width="{bar}" height="{bar_h}" fill="#c4913e"/>
</svg>"##,
        inset = height * 0.2,
        bar = width * 0.5,
        bar_h = height * 0.6,
    )
    .into_bytes()
}

pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 128, if x < 4 { 0 } else { 255 }])
    });
    let mut buf = Vec::new();
    image::DynamicImage::ImageRgba8(img)
        .write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn proposal(json: &str) -> ProposalInput {
    serde_json::from_str(json).expect("proposal fixture")
}

pub fn sample_proposal() -> ProposalInput {
    proposal(
        r#"{
        "clientName": "Acme & Co. LLC",
        "clientEmail": "ops@acme.example",
        "clientCompany": "Acme",
        "pageTitle": "Customer portal rebuild",
        "description": "Rebuild the customer portal with a faster checkout and a self-service billing area.",
        "whatWeNeed": "Access to the current codebase.\nBrand guidelines and copy.",
        "roadmap": "Discovery, then design, then two build sprints and a launch week.",
        "whyToInvest": "Checkout conversion improves. Support load drops.\n- Billing questions answer themselves",
        "products": [
            {"name": "Discovery & UX", "price": 2500, "timeline": "2 weeks", "techStack": "Figma"},
            {"name": "Portal build", "price": 9000, "timeline": "6 weeks", "techStack": ["React", "Rust", "PostgreSQL"]},
            {"name": "Launch support", "price": 1000, "timeline": "1 week", "techStack": "rust, Grafana"}
        ],
        "totalPrice": 12500,
        "date": "2026-10-17"
    }"#,
    )
}

/// 8h @ $70, 4h @ $50, 2h @ $100: 14h and $960 in total.
pub fn three_entry_timesheet() -> TimesheetExportInput {
    serde_json::from_str(
        r#"{
        "projectName": "Portal rebuild",
        "client": {"name": "Jane Doe", "company": "Acme"},
        "isPaid": false,
        "entries": [
            {"date": "2026-10-01", "hoursWorked": 8, "hourlyRate": 70, "totalPay": 560, "notes": "Kickoff and setup"},
            {"date": "2026-10-02T09:00:00.000Z", "hoursWorked": 4, "hourlyRate": 50, "totalPay": 200},
            {"date": "2026-10-03", "hoursWorked": 2, "hourlyRate": 100, "totalPay": 200, "notes": "  "}
        ]
    }"#,
    )
    .expect("timesheet fixture")
}

pub fn invoice(json: &str) -> InvoiceExportInput {
    serde_json::from_str(json).expect("invoice fixture")
}
