//! Timesheet and invoice exports: one shared single-purpose composer
//! (letterhead, meta block, grayscale table, totals, page footer) fed with
//! per-export content.

pub mod invoice;
pub mod timesheet;

use std::time::Instant;

use crate::config::{BrandConfig, Config};
use crate::error::Result;
use crate::pdf::table::{Table, TableFlow, TableStyle, draw_table};
use crate::pdf::{Align, Canvas, ImageHandle, PdfDocument, TextMetrics};
use crate::raster::RasterImage;
use crate::theme::{
    BODY, CONTENT_BOTTOM, CONTENT_WIDTH, H2, MARGIN, MUTED, PAGE_HEIGHT, PAGE_WIDTH, RULE_WIDTH, Rgb, SMALL,
    SPACE_LG, SPACE_MD, SPACE_SM, SPACE_XL,
};

/// Pixel box export logos are rasterized into.
pub const EXPORT_LOGO_BOX: (u32, u32) = (600, 180);

const LOGO_HEIGHT: f32 = 36.0;
const LOGO_MAX_WIDTH: f32 = 160.0;
const CREDENTIAL_LINE: f32 = 12.0;
const META_LINE: f32 = 15.0;
const META_LABEL_GAP: f32 = 6.0;

const FOOTER_RULE_Y: f32 = PAGE_HEIGHT - 48.0;

pub const GRAY_HEADER_FILL: Rgb = [229, 231, 235];
pub const GRAY_BORDER: Rgb = [209, 213, 219];
pub const GRAY_TOTAL_FILL: Rgb = [243, 244, 246];

/// Bordered grayscale table style shared by both exports.
pub fn export_table_style() -> TableStyle {
    TableStyle {
        header_fill: GRAY_HEADER_FILL,
        header_text: BODY.bold().sized(9.0),
        body_text: BODY.sized(9.0),
        emphasis_fill: GRAY_TOTAL_FILL,
        emphasis_text: BODY.bold().sized(9.0),
        stripe_fill: None,
        border: Some((GRAY_BORDER, 0.5)),
        row_rule: None,
        padding_x: 6.0,
        padding_y: 5.0,
        repeat_header: true,
    }
}

/// Content of one export document.
pub struct ExportLayout {
    pub title: String,
    pub meta: Vec<(String, String)>,
    pub description: Option<String>,
    pub table: Table,
    pub totals: Vec<(String, String)>,
}

fn draw_letterhead(canvas: &mut Canvas<'_>, brand: &BrandConfig, logo: Option<&ImageHandle>) -> f32 {
    let top = MARGIN;
    let left_bottom = match logo {
        Some(logo) => {
            let mut h = LOGO_HEIGHT;
            let mut w = h * logo.aspect_ratio();
            if w > LOGO_MAX_WIDTH {
                w = LOGO_MAX_WIDTH;
                h = logo.height_for_width(w);
            }
            canvas.image(logo, MARGIN, top, w, h);
            top + h
        }
        None => canvas.text_block(MARGIN, top, &[brand.brand_name.clone()], H2, Align::Left),
    };

    let right = MARGIN + CONTENT_WIDTH;
    let mut y = top;
    for (i, line) in brand.company.lines().iter().enumerate() {
        let style = if i == 0 { BODY.bold() } else { SMALL };
        let baseline = y + canvas.ascent(style);
        canvas.text_aligned(right, baseline, line, style, Align::Right);
        y += CREDENTIAL_LINE;
    }
    left_bottom.max(y)
}

/// `Label: value` lines with a bold label. Values wrap under themselves.
fn draw_meta(canvas: &mut Canvas<'_>, meta: &[(String, String)], top: f32) -> f32 {
    let label_style = BODY.bold();
    let label_width = meta
        .iter()
        .map(|(label, _)| canvas.measure(&format!("{label}:"), label_style))
        .fold(0.0, f32::max);
    let value_x = MARGIN + label_width + META_LABEL_GAP;
    let value_width = CONTENT_WIDTH - label_width - META_LABEL_GAP;
    let mut y = top;
    for (label, value) in meta {
        let baseline = y + canvas.ascent(BODY);
        canvas.text(MARGIN, baseline, &format!("{label}:"), label_style);
        let lines = canvas.wrap(value, value_width, BODY);
        for (i, line) in lines.iter().enumerate() {
            canvas.text(value_x, baseline + i as f32 * META_LINE, line, BODY);
        }
        y += META_LINE * lines.len().max(1) as f32;
    }
    y
}

fn draw_totals(canvas: &mut Canvas<'_>, totals: &[(String, String)], top: f32) -> f32 {
    let right = MARGIN + CONTENT_WIDTH;
    let label_right = right - 110.0;
    let mut y = top;
    for (label, value) in totals {
        let baseline = y + canvas.ascent(BODY);
        canvas.text_aligned(label_right, baseline, label, BODY.with_color(MUTED), Align::Right);
        canvas.text_aligned(right, baseline, value, BODY.bold(), Align::Right);
        y += META_LINE;
    }
    y
}

fn draw_footer(canvas: &mut Canvas<'_>, tagline: Option<&str>, index: usize, total: usize) {
    canvas.line(MARGIN, FOOTER_RULE_Y, MARGIN + CONTENT_WIDTH, FOOTER_RULE_Y, RULE_WIDTH, GRAY_BORDER);
    let center = PAGE_WIDTH / 2.0;
    let label = format!("Page {} of {}", index + 1, total);
    let baseline = FOOTER_RULE_Y + SPACE_MD + canvas.ascent(SMALL);
    canvas.text_aligned(center, baseline, &label, SMALL, Align::Center);
    if let Some(tagline) = tagline.filter(|t| !t.trim().is_empty()) {
        canvas.text_aligned(center, baseline + SMALL.line_height(), tagline, SMALL, Align::Center);
    }
}

/// Lay out an export and return the PDF bytes.
pub fn render(layout: &ExportLayout, logo: Option<&RasterImage>, config: &Config) -> Result<Vec<u8>> {
    let t0 = Instant::now();
    let brand = &config.brand;
    let mut doc = PdfDocument::new(&config.fonts, PAGE_WIDTH, PAGE_HEIGHT)?;
    doc.set_title(&layout.title);
    let logo = logo.map(|img| doc.add_image(img));
    doc.add_page()?;

    let mut y = {
        let mut canvas = doc.current()?;
        let mut y = draw_letterhead(&mut canvas, brand, logo.as_ref()) + SPACE_XL;
        y = canvas.text_block(MARGIN, y, &[layout.title.clone()], H2, Align::Left) + SPACE_SM;
        y = draw_meta(&mut canvas, &layout.meta, y) + SPACE_MD;
        if let Some(description) = &layout.description {
            let lines = canvas.wrap(description, CONTENT_WIDTH, BODY);
            y = canvas.text_block(MARGIN, y, &lines, BODY, Align::Left) + SPACE_MD;
        }
        y + SPACE_SM
    };

    let flow = TableFlow {
        top: MARGIN,
        bottom: CONTENT_BOTTOM,
    };
    let outcome = draw_table(&mut doc, &layout.table, MARGIN, y, flow)?;
    y = outcome.end_y + SPACE_LG;

    let totals_h = META_LINE * layout.totals.len() as f32;
    if y + totals_h > CONTENT_BOTTOM {
        doc.add_page()?;
        y = MARGIN;
        log::debug!("export totals moved to a new page");
    }
    {
        let mut canvas = doc.current()?;
        draw_totals(&mut canvas, &layout.totals, y);
    }

    let tagline = brand.tagline.as_deref();
    doc.stamp_pages(|canvas, index, total| {
        draw_footer(canvas, tagline, index, total);
        Ok(())
    })?;
    let pages = doc.page_count();
    let bytes = doc.finish()?;
    log::info!(
        "{}: {} rows on {} page(s) in {:.1}ms",
        layout.title,
        outcome.rows_drawn,
        pages,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    Ok(bytes)
}
