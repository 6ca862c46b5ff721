use crate::error::Result;
use crate::pdf::{Align, Canvas, ImageHandle, PdfDocument, TextMetrics};
use crate::text::format_date_long;
use crate::theme::{CONTENT_WIDTH, H3, MARGIN, MUTED, PAGE_HEIGHT, PAGE_WIDTH, RULE, RULE_WIDTH, SMALL, SPACE_SM};

use super::ProposalContext;

const HEADER_TOP: f32 = 34.0;
const HEADER_RULE_Y: f32 = 72.0;
const HEADER_LOGO_HEIGHT: f32 = 20.0;
const HEADER_LOGO_MAX_WIDTH: f32 = 120.0;
const HEADER_LABEL: &str = "Project Proposal";

const FOOTER_RULE_Y: f32 = PAGE_HEIGHT - 40.0;
const FOOTER_BASELINE: f32 = PAGE_HEIGHT - 24.0;

/// Footer colors over the dark cover band.
const COVER_RULE: [u8; 3] = [64, 64, 70];
const COVER_TEXT: [u8; 3] = [150, 150, 156];

fn draw_header(canvas: &mut Canvas<'_>, ctx: &ProposalContext<'_>, logo: Option<&ImageHandle>) {
    let label_x = match logo {
        Some(logo) => {
            let mut h = HEADER_LOGO_HEIGHT;
            let mut w = h * logo.aspect_ratio();
            if w > HEADER_LOGO_MAX_WIDTH {
                w = HEADER_LOGO_MAX_WIDTH;
                h = logo.height_for_width(w);
            }
            canvas.image(logo, MARGIN, HEADER_TOP + (HEADER_LOGO_HEIGHT - h) / 2.0, w, h);
            MARGIN + w + SPACE_SM * 1.5
        }
        None => {
            let brand = &ctx.brand.brand_name;
            canvas.text_block(MARGIN, HEADER_TOP, &[brand.clone()], H3, Align::Left);
            MARGIN + canvas.measure(brand, H3) + SPACE_SM
        }
    };
    let label_top = HEADER_TOP + (H3.line_height() - SMALL.line_height()) / 2.0;
    canvas.text_block(label_x, label_top, &[HEADER_LABEL.to_string()], SMALL, Align::Left);

    let right = MARGIN + CONTENT_WIDTH;
    let date = format_date_long(ctx.date);
    let y = canvas.text_block(right, HEADER_TOP - 2.0, &[date], SMALL, Align::Right);
    canvas.text_block(right, y, &[ctx.proposal_id.clone()], SMALL, Align::Right);

    canvas.line(MARGIN, HEADER_RULE_Y, MARGIN + CONTENT_WIDTH, HEADER_RULE_Y, RULE_WIDTH, RULE);
}

fn draw_footer(canvas: &mut Canvas<'_>, ctx: &ProposalContext<'_>, index: usize, total: usize) {
    let is_cover = index == 0;
    let (rule, text_color) = if is_cover { (COVER_RULE, COVER_TEXT) } else { (RULE, MUTED) };
    let style = SMALL.with_color(text_color);

    canvas.line(MARGIN, FOOTER_RULE_Y, MARGIN + CONTENT_WIDTH, FOOTER_RULE_Y, RULE_WIDTH, rule);
    canvas.text_aligned(PAGE_WIDTH / 2.0, FOOTER_BASELINE, &format!("{} / {}", index + 1, total), style, Align::Center);
    if !is_cover {
        canvas.text(MARGIN, FOOTER_BASELINE, &ctx.brand.contact_line, style);
        let validity = format!("Valid {} days", ctx.brand.validity_days);
        canvas.text_aligned(MARGIN + CONTENT_WIDTH, FOOTER_BASELINE, &validity, style, Align::Right);
    }
}

/// Running header on every page after the cover, footer on all pages. Runs
/// once, after the page count is final; the document is sealed afterwards.
pub fn stamp(doc: &mut PdfDocument, ctx: &ProposalContext<'_>, logo: Option<&ImageHandle>) -> Result<()> {
    doc.stamp_pages(|canvas, index, total| {
        if index > 0 {
            draw_header(canvas, ctx, logo);
        }
        draw_footer(canvas, ctx, index, total);
        Ok(())
    })
}
