//! Drawing primitives on top of `pdf_writer`: pages, text, rules, rectangles,
//! images, measurement, and (in [`table`]) a paginating table.
//!
//! Composers work in a top-left coordinate space in points; [`Canvas`]
//! flips y into PDF user space when emitting operators.

pub mod table;

use std::collections::HashSet;

use pdf_writer::{Content, Filter, Name, Pdf, Rect, Ref, Str, TextStr};

use crate::error::{Error, Result};
use crate::fonts::{FontConfig, FontSet, FontWeight};
use crate::raster::RasterImage;
use crate::text::wrap_to_width;
use crate::theme::{Rgb, TextStyle};

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Align {
    Left,
    Center,
    Right,
}

/// Fill and/or stroke for a closed shape.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Paint {
    pub fill: Option<Rgb>,
    pub stroke: Option<(Rgb, f32)>,
}

impl Paint {
    pub fn fill(color: Rgb) -> Self {
        Self {
            fill: Some(color),
            stroke: None,
        }
    }

    pub fn stroke(color: Rgb, width: f32) -> Self {
        Self {
            fill: None,
            stroke: Some((color, width)),
        }
    }
}

/// A raster image registered with a document, drawable on any of its pages.
#[derive(Clone, Debug)]
pub struct ImageHandle {
    name: String,
    pub width_px: u32,
    pub height_px: u32,
}

impl ImageHandle {
    /// Width over height of the underlying bitmap.
    pub fn aspect_ratio(&self) -> f32 {
        self.width_px as f32 / self.height_px.max(1) as f32
    }

    /// Height that keeps the bitmap undistorted at `width`.
    pub fn height_for_width(&self, width: f32) -> f32 {
        width / self.aspect_ratio()
    }
}

#[derive(Default)]
struct UsedChars {
    regular: HashSet<char>,
    bold: HashSet<char>,
}

impl UsedChars {
    fn record(&mut self, weight: FontWeight, text: &str) {
        let set = match weight {
            FontWeight::Regular => &mut self.regular,
            FontWeight::Bold => &mut self.bold,
        };
        set.extend(text.chars());
    }
}

/// One document under construction: an ordered page list plus the fonts and
/// images its pages reference. Pages are only ever appended; once
/// [`PdfDocument::stamp_pages`] has run the page list is sealed.
pub struct PdfDocument {
    fonts: FontSet,
    pages: Vec<Content>,
    page_width: f32,
    page_height: f32,
    images: Vec<(String, RasterImage)>,
    used_chars: UsedChars,
    title: String,
    sealed: bool,
}

impl PdfDocument {
    pub fn new(font_config: &FontConfig, page_width: f32, page_height: f32) -> Result<Self> {
        Ok(Self {
            fonts: font_config.load()?,
            pages: Vec::new(),
            page_width,
            page_height,
            images: Vec::new(),
            used_chars: UsedChars::default(),
            title: String::new(),
            sealed: false,
        })
    }

    pub fn set_title(&mut self, title: &str) {
        self.title = title.to_string();
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_width(&self) -> f32 {
        self.page_width
    }

    pub fn page_height(&self) -> f32 {
        self.page_height
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Append a blank page and return its index.
    pub fn add_page(&mut self) -> Result<usize> {
        if self.sealed {
            return Err(Error::Generation(
                "page added after headers and footers were stamped".into(),
            ));
        }
        self.pages.push(Content::new());
        Ok(self.pages.len() - 1)
    }

    pub fn add_image(&mut self, image: &RasterImage) -> ImageHandle {
        let name = format!("Im{}", self.images.len() + 1);
        self.images.push((name.clone(), image.clone()));
        ImageHandle {
            name,
            width_px: image.width(),
            height_px: image.height(),
        }
    }

    pub fn canvas(&mut self, index: usize) -> Result<Canvas<'_>> {
        let page_count = self.pages.len();
        let content = self.pages.get_mut(index).ok_or_else(|| {
            Error::Generation(format!("page {index} does not exist ({page_count} pages)"))
        })?;
        Ok(Canvas {
            content,
            fonts: &self.fonts,
            used_chars: &mut self.used_chars,
            page_height: self.page_height,
        })
    }

    /// Canvas for the most recently added page.
    pub fn current(&mut self) -> Result<Canvas<'_>> {
        match self.pages.len() {
            0 => Err(Error::Generation("no page to draw on".into())),
            n => self.canvas(n - 1),
        }
    }

    /// Run `stamp` once over every page with (canvas, page index, page count),
    /// then seal the document. Page numbering needs the final count, so this
    /// can only happen once.
    pub fn stamp_pages<F>(&mut self, mut stamp: F) -> Result<()>
    where
        F: FnMut(&mut Canvas<'_>, usize, usize) -> Result<()>,
    {
        if self.sealed {
            return Err(Error::Generation("header/footer pass already applied".into()));
        }
        let total = self.pages.len();
        for index in 0..total {
            let mut canvas = self.canvas(index)?;
            stamp(&mut canvas, index, total)?;
        }
        self.sealed = true;
        Ok(())
    }

    /// Serialize to PDF bytes.
    pub fn finish(self) -> Result<Vec<u8>> {
        let t0 = std::time::Instant::now();
        let mut pdf = Pdf::new();
        let mut next_id = 1i32;
        let mut alloc = || {
            let r = Ref::new(next_id);
            next_id += 1;
            r
        };

        let catalog_id = alloc();
        let pages_id = alloc();
        let info_id = alloc();

        let regular_ref = alloc();
        let bold_ref = alloc();
        self.fonts
            .regular
            .write(&mut pdf, regular_ref, &self.used_chars.regular, &mut alloc)?;
        self.fonts
            .bold
            .write(&mut pdf, bold_ref, &self.used_chars.bold, &mut alloc)?;
        let font_pairs = [
            (self.fonts.regular.pdf_name.clone(), regular_ref),
            (self.fonts.bold.pdf_name.clone(), bold_ref),
        ];

        let mut image_xobjects: Vec<(String, Ref)> = Vec::with_capacity(self.images.len());
        for (name, image) in &self.images {
            let xobj_ref = embed_png(&mut pdf, image, &mut alloc)?;
            image_xobjects.push((name.clone(), xobj_ref));
        }

        let n = self.pages.len();
        let page_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();
        let content_ids: Vec<Ref> = (0..n).map(|_| alloc()).collect();

        for (i, c) in self.pages.into_iter().enumerate() {
            let raw = c.finish();
            let compressed = miniz_oxide::deflate::compress_to_vec_zlib(raw.as_slice(), 6);
            pdf.stream(content_ids[i], &compressed).filter(Filter::FlateDecode);
        }

        pdf.catalog(catalog_id).pages(pages_id);
        pdf.pages(pages_id)
            .kids(page_ids.iter().copied())
            .count(n as i32);

        for i in 0..n {
            let mut page = pdf.page(page_ids[i]);
            page.media_box(Rect::new(0.0, 0.0, self.page_width, self.page_height))
                .parent(pages_id)
                .contents(content_ids[i]);
            let mut resources = page.resources();
            {
                let mut fonts = resources.fonts();
                for (name, font_ref) in &font_pairs {
                    fonts.pair(Name(name.as_bytes()), *font_ref);
                }
            }
            if !image_xobjects.is_empty() {
                let mut xobjects = resources.x_objects();
                for (name, xobj_ref) in &image_xobjects {
                    xobjects.pair(Name(name.as_bytes()), *xobj_ref);
                }
            }
        }

        {
            let mut info = pdf.document_info(info_id);
            if !self.title.is_empty() {
                info.title(TextStr(&self.title));
            }
            info.producer(TextStr(concat!("agency-pdf ", env!("CARGO_PKG_VERSION"))));
        }

        let bytes = pdf.finish();
        log::debug!(
            "assembled {} pages, {} images in {:.1}ms ({} bytes)",
            n,
            image_xobjects.len(),
            t0.elapsed().as_secs_f64() * 1000.0,
            bytes.len()
        );
        Ok(bytes)
    }
}

/// Decode the PNG and embed it as FlateDecode RGB plus a gray soft mask when
/// any pixel is translucent.
fn embed_png(pdf: &mut Pdf, image: &RasterImage, alloc: &mut impl FnMut() -> Ref) -> Result<Ref> {
    let decoded = image::load_from_memory_with_format(image.png_bytes(), image::ImageFormat::Png)
        .map_err(|e| Error::Generation(format!("embedding raster image: {e}")))?;
    let rgba: image::RgbaImage = decoded.to_rgba8();
    let (w, h) = (rgba.width(), rgba.height());
    let has_alpha = rgba.pixels().any(|p| p.0[3] < 255);

    let rgb_data: Vec<u8> = rgba
        .pixels()
        .flat_map(|p| [p.0[0], p.0[1], p.0[2]])
        .collect();
    let compressed_rgb = miniz_oxide::deflate::compress_to_vec_zlib(&rgb_data, 6);

    let smask_ref = if has_alpha {
        let alpha_data: Vec<u8> = rgba.pixels().map(|p| p.0[3]).collect();
        let compressed_alpha = miniz_oxide::deflate::compress_to_vec_zlib(&alpha_data, 6);
        let mask_ref = alloc();
        let mut mask = pdf.image_xobject(mask_ref, &compressed_alpha);
        mask.filter(Filter::FlateDecode);
        mask.width(w as i32);
        mask.height(h as i32);
        mask.color_space().device_gray();
        mask.bits_per_component(8);
        Some(mask_ref)
    } else {
        None
    };

    let xobj_ref = alloc();
    let mut xobj = pdf.image_xobject(xobj_ref, &compressed_rgb);
    xobj.filter(Filter::FlateDecode);
    xobj.width(w as i32);
    xobj.height(h as i32);
    xobj.color_space().device_rgb();
    xobj.bits_per_component(8);
    if let Some(mask_ref) = smask_ref {
        xobj.s_mask(mask_ref);
    }
    Ok(xobj_ref)
}

fn set_fill(content: &mut Content, [r, g, b]: Rgb) {
    content.set_fill_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

fn set_stroke(content: &mut Content, [r, g, b]: Rgb) {
    content.set_stroke_rgb(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0);
}

/// Text measurement shared by the document (measure phase) and its
/// canvases (render phase), so both wrap identically.
pub trait TextMetrics {
    fn measure(&self, text: &str, style: TextStyle) -> f32;

    /// Distance from the top of the glyph box to the baseline.
    fn ascent(&self, style: TextStyle) -> f32;

    fn wrap(&self, text: &str, max_width: f32, style: TextStyle) -> Vec<String> {
        wrap_to_width(text, max_width, |s| self.measure(s, style))
    }

    fn block_height(&self, text: &str, max_width: f32, style: TextStyle) -> f32 {
        self.wrap(text, max_width, style).len() as f32 * style.line_height()
    }
}

impl TextMetrics for FontSet {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        FontSet::measure(self, text, style.weight, style.size)
    }

    fn ascent(&self, style: TextStyle) -> f32 {
        style.size * self.get(style.weight).ascender_ratio
    }
}

impl TextMetrics for PdfDocument {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        TextMetrics::measure(&self.fonts, text, style)
    }

    fn ascent(&self, style: TextStyle) -> f32 {
        self.fonts.ascent(style)
    }
}

impl TextMetrics for Canvas<'_> {
    fn measure(&self, text: &str, style: TextStyle) -> f32 {
        TextMetrics::measure(self.fonts, text, style)
    }

    fn ascent(&self, style: TextStyle) -> f32 {
        self.fonts.ascent(style)
    }
}

/// Draw target for one page. Every y is measured from the top of the page;
/// text is positioned by its baseline.
pub struct Canvas<'a> {
    content: &'a mut Content,
    fonts: &'a FontSet,
    used_chars: &'a mut UsedChars,
    page_height: f32,
}

impl Canvas<'_> {
    fn flip(&self, y: f32) -> f32 {
        self.page_height - y
    }

    pub fn text(&mut self, x: f32, baseline: f32, text: &str, style: TextStyle) {
        self.text_aligned(x, baseline, text, style, Align::Left);
    }

    /// `x` is the left edge, the center, or the right edge depending on `align`.
    pub fn text_aligned(&mut self, x: f32, baseline: f32, text: &str, style: TextStyle, align: Align) {
        if text.is_empty() {
            return;
        }
        let width = self.measure(text, style);
        let start_x = match align {
            Align::Left => x,
            Align::Center => x - width / 2.0,
            Align::Right => x - width,
        };
        let entry = self.fonts.get(style.weight);
        let bytes = entry.encode(text);
        self.used_chars.record(style.weight, text);
        let y = self.flip(baseline);

        self.content.save_state();
        set_fill(self.content, style.color);
        self.content.begin_text();
        self.content.set_font(Name(entry.pdf_name.as_bytes()), style.size);
        self.content.next_line(start_x, y);
        self.content.show(Str(&bytes));
        self.content.end_text();
        self.content.restore_state();
    }

    /// Draw pre-wrapped lines as a block whose first line box starts at `top`.
    /// Returns `top + lines × line_height`, the same figure
    /// [`TextMetrics::block_height`] predicts.
    pub fn text_block(&mut self, x: f32, top: f32, lines: &[String], style: TextStyle, align: Align) -> f32 {
        let line_h = style.line_height();
        let first_baseline = top + (line_h - style.size) / 2.0 + self.ascent(style);
        for (i, line) in lines.iter().enumerate() {
            self.text_aligned(x, first_baseline + i as f32 * line_h, line, style, align);
        }
        top + lines.len() as f32 * line_h
    }

    pub fn line(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, width: f32, color: Rgb) {
        let (py1, py2) = (self.flip(y1), self.flip(y2));
        self.content.save_state();
        self.content.set_line_width(width);
        set_stroke(self.content, color);
        self.content.move_to(x1, py1);
        self.content.line_to(x2, py2);
        self.content.stroke();
        self.content.restore_state();
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, paint: Paint) {
        let bottom = self.flip(y + h);
        self.content.save_state();
        self.content.rect(x, bottom, w, h);
        self.paint_path(paint);
        self.content.restore_state();
    }

    pub fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, radius: f32, paint: Paint) {
        let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
        if r == 0.0 {
            self.rect(x, y, w, h, paint);
            return;
        }
        // Bezier circle approximation constant.
        let k = r * 0.552_284_8;
        let (x0, x1) = (x, x + w);
        let (y0, y1) = (self.flip(y + h), self.flip(y));

        self.content.save_state();
        self.content.move_to(x0 + r, y0);
        self.content.line_to(x1 - r, y0);
        self.content.cubic_to(x1 - r + k, y0, x1, y0 + r - k, x1, y0 + r);
        self.content.line_to(x1, y1 - r);
        self.content.cubic_to(x1, y1 - r + k, x1 - r + k, y1, x1 - r, y1);
        self.content.line_to(x0 + r, y1);
        self.content.cubic_to(x0 + r - k, y1, x0, y1 - r + k, x0, y1 - r);
        self.content.line_to(x0, y0 + r);
        self.content.cubic_to(x0, y0 + r - k, x0 + r - k, y0, x0 + r, y0);
        self.content.close_path();
        self.paint_path(paint);
        self.content.restore_state();
    }

    fn paint_path(&mut self, paint: Paint) {
        if let Some(fill) = paint.fill {
            set_fill(self.content, fill);
        }
        if let Some((stroke, width)) = paint.stroke {
            set_stroke(self.content, stroke);
            self.content.set_line_width(width);
        }
        match (paint.fill.is_some(), paint.stroke.is_some()) {
            (true, true) => {
                self.content.fill_nonzero_and_stroke();
            }
            (true, false) => {
                self.content.fill_nonzero();
            }
            (false, true) => {
                self.content.stroke();
            }
            (false, false) => {
                self.content.end_path();
            }
        }
    }

    pub fn image(&mut self, image: &ImageHandle, x: f32, y: f32, w: f32, h: f32) {
        let bottom = self.flip(y + h);
        self.content.save_state();
        self.content.transform([w, 0.0, 0.0, h, x, bottom]);
        self.content.x_object(Name(image.name.as_bytes()));
        self.content.restore_state();
    }
}
