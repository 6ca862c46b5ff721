use crate::error::Result;
use crate::pdf::{Align, Canvas, Paint, PdfDocument, TextMetrics};
use crate::text::{format_date_long, truncate_with_ellipsis};
use crate::theme::{
    BAND, CONTENT_WIDTH, DISPLAY, H2, MARGIN, META, PAGE_HEIGHT, PAGE_WIDTH, PAPER, SMALL, SPACE_LG, SPACE_MD,
    SPACE_XL, SPACE_XS, TextStyle, WHITE,
};

use super::{ProposalContext, ProposalImages};

/// The dark band starts at this fraction of the page height.
pub const BAND_FRACTION: f32 = 0.62;
pub const BAND_TOP: f32 = PAGE_HEIGHT * BAND_FRACTION;

const TITLE: &str = "Offer";
const LOGO_WIDTH: f32 = 150.0;
const LOGO_MAX_HEIGHT: f32 = 70.0;

const CLIENT_SIZE_LARGE: f32 = 22.0;
const CLIENT_SIZE_SMALL: f32 = 16.0;
const CLIENT_MAX_LINES: usize = 3;
const CLIENT_WIDTH: f32 = CONTENT_WIDTH * 0.6;

pub const DATE_BASELINE: f32 = PAGE_HEIGHT - MARGIN - 8.0;
/// Nothing in the "For:" block may reach below this y.
pub const DATE_REGION_TOP: f32 = DATE_BASELINE - SMALL.size - SPACE_MD;

const BAND_MUTED: [u8; 3] = [150, 150, 156];

/// Where the "For:" block lands and at which size.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientBlock {
    pub font_size: f32,
    pub lines: Vec<String>,
    /// Top of the "FOR:" label.
    pub top: f32,
    /// Bottom of the last name line.
    pub bottom: f32,
}

impl ClientBlock {
    pub fn reduced(&self) -> bool {
        self.font_size < CLIENT_SIZE_LARGE
    }

    fn name_style(&self) -> TextStyle {
        H2.sized(self.font_size).with_color(WHITE)
    }
}

fn title_bottom() -> f32 {
    BAND_TOP + SPACE_XL + DISPLAY.line_height()
}

/// Wrap the client name at the large size; fall back to the small size when
/// it needs more than one line, capped at three lines.
pub fn plan_client_block(metrics: &dyn TextMetrics, client_name: &str) -> ClientBlock {
    let name = client_name.to_uppercase();
    let large = H2.sized(CLIENT_SIZE_LARGE);
    let mut lines = metrics.wrap(&name, CLIENT_WIDTH, large);
    let mut font_size = CLIENT_SIZE_LARGE;
    if lines.len() > 1 {
        font_size = CLIENT_SIZE_SMALL;
        lines = metrics.wrap(&name, CLIENT_WIDTH, H2.sized(CLIENT_SIZE_SMALL));
        log::debug!("cover client name wraps, using {CLIENT_SIZE_SMALL}pt");
    }
    if lines.len() > CLIENT_MAX_LINES {
        lines.truncate(CLIENT_MAX_LINES);
        if let Some(last) = lines.last_mut() {
            let keep = last.chars().count().saturating_sub(1);
            *last = truncate_with_ellipsis(last, keep);
        }
    }

    let top = title_bottom() + SPACE_LG;
    let name_top = top + META.line_height() + SPACE_XS;
    let bottom = name_top + lines.len() as f32 * H2.sized(font_size).line_height();
    ClientBlock {
        font_size,
        lines,
        top,
        bottom,
    }
}

/// `(x, y, w, h)` that covers a `width × height` box with an image of the
/// given aspect ratio, centered. Whatever hangs over the box edge is cut off
/// by the page.
pub fn cover_placement(aspect: f32, width: f32, height: f32) -> (f32, f32, f32, f32) {
    if aspect <= 0.0 || !aspect.is_finite() {
        return (0.0, 0.0, width, height);
    }
    let (w, h) = if aspect > width / height {
        (height * aspect, height)
    } else {
        (width, width / aspect)
    };
    ((width - w) / 2.0, (height - h) / 2.0, w, h)
}

fn draw_background(canvas: &mut Canvas<'_>, images: &ProposalImages) {
    if let Some(bg) = &images.background {
        let (x, y, w, h) = cover_placement(bg.aspect_ratio(), PAGE_WIDTH, PAGE_HEIGHT);
        canvas.image(bg, x, y, w, h);
        return;
    }
    canvas.rect(0.0, 0.0, PAGE_WIDTH, BAND_TOP, Paint::fill(PAPER));
    canvas.rect(0.0, BAND_TOP, PAGE_WIDTH, PAGE_HEIGHT - BAND_TOP, Paint::fill(BAND));
}

fn draw_logo(canvas: &mut Canvas<'_>, ctx: &ProposalContext<'_>, images: &ProposalImages) {
    let right = PAGE_WIDTH - MARGIN;
    let bottom = BAND_TOP - SPACE_XL;
    match &images.cover_logo {
        Some(logo) => {
            let mut w = LOGO_WIDTH;
            let mut h = logo.height_for_width(w);
            if h > LOGO_MAX_HEIGHT {
                h = LOGO_MAX_HEIGHT;
                w = h * logo.aspect_ratio();
            }
            canvas.image(logo, right - w, bottom - h, w, h);
        }
        None => {
            canvas.text_aligned(right, bottom - SPACE_XS, &ctx.brand.brand_name, H2, Align::Right);
        }
    }
}

pub fn compose(doc: &mut PdfDocument, ctx: &ProposalContext<'_>, images: &ProposalImages) -> Result<()> {
    let client = plan_client_block(&*doc, &ctx.client_name);
    doc.add_page()?;
    let mut canvas = doc.current()?;

    draw_background(&mut canvas, images);
    canvas.text_aligned(PAGE_WIDTH - MARGIN, MARGIN, &ctx.brand.website, SMALL, Align::Right);
    draw_logo(&mut canvas, ctx, images);

    let right = PAGE_WIDTH - MARGIN;
    canvas.text_block(right, BAND_TOP + SPACE_XL, &[TITLE.to_string()], DISPLAY, Align::Right);

    let label_style = META.with_color(BAND_MUTED);
    let name_top = canvas.text_block(MARGIN, client.top, &["FOR:".to_string()], label_style, Align::Left) + SPACE_XS;
    canvas.text_block(MARGIN, name_top, &client.lines, client.name_style(), Align::Left);

    let date = format_date_long(ctx.date);
    canvas.text_aligned(right, DATE_BASELINE, &date, SMALL.with_color(BAND_MUTED), Align::Right);
    Ok(())
}
