//! Asset rasterization: turn a logo or background (SVG, PNG or JPEG) into a
//! PNG bitmap that fits a target pixel box without distortion.
//!
//! The backend sits behind [`Rasterizer`] so composers never care whether the
//! pixels came from resvg, the `image` crate, or something else entirely.

use std::io::Cursor;
use std::path::Path;

use base64::Engine;
use resvg::{tiny_skia, usvg};

use crate::error::{Error, Result};

/// Lossless bitmap ready for embedding.
#[derive(Clone, Debug)]
pub struct RasterImage {
    png: Vec<u8>,
    width: u32,
    height: u32,
}

impl RasterImage {
    /// Wrap existing PNG bytes, validating them.
    pub fn from_png(png: Vec<u8>) -> Result<Self> {
        let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .map_err(|e| Error::AssetLoad(format!("not a PNG: {e}")))?;
        Ok(Self {
            width: decoded.width(),
            height: decoded.height(),
            png,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn png_bytes(&self) -> &[u8] {
        &self.png
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// `data:image/png;base64,...`
    pub fn to_data_uri(&self) -> String {
        format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&self.png)
        )
    }
}

/// A decoded source image at its natural size.
pub enum SourceImage {
    Vector(usvg::Tree),
    Bitmap(image::DynamicImage),
}

impl SourceImage {
    pub fn natural_size(&self) -> (f32, f32) {
        match self {
            SourceImage::Vector(tree) => (tree.size().width(), tree.size().height()),
            SourceImage::Bitmap(img) => (img.width() as f32, img.height() as f32),
        }
    }
}

pub trait Rasterizer: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage>;

    /// Render `source` into a bitmap no larger than `max_width` × `max_height`,
    /// preserving its aspect ratio and never upscaling.
    fn rasterize(&self, source: &SourceImage, max_width: u32, max_height: u32) -> Result<RasterImage>;
}

/// `min(max_w / w, max_h / h, 1)`
pub fn fit_scale(natural_width: f32, natural_height: f32, max_width: f32, max_height: f32) -> f32 {
    if natural_width <= 0.0 || natural_height <= 0.0 {
        return 0.0;
    }
    (max_width / natural_width)
        .min(max_height / natural_height)
        .min(1.0)
}

/// Pixel dimensions of `natural` scaled into the target box.
pub fn fitted_size(natural: (f32, f32), max_width: u32, max_height: u32) -> Result<(u32, u32)> {
    let scale = fit_scale(natural.0, natural.1, max_width as f32, max_height as f32);
    if scale <= 0.0 || !scale.is_finite() {
        return Err(Error::Measurement(format!(
            "cannot fit {}x{} into {max_width}x{max_height}",
            natural.0, natural.1
        )));
    }
    let w = ((natural.0 * scale).round() as u32).clamp(1, max_width.max(1));
    let h = ((natural.1 * scale).round() as u32).clamp(1, max_height.max(1));
    Ok((w, h))
}

/// resvg for SVG sources, the `image` crate for PNG/JPEG.
#[derive(Clone, Copy, Debug, Default)]
pub struct SoftwareRasterizer;

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(1024)];
    let text = String::from_utf8_lossy(head);
    let trimmed = text.trim_start_matches('\u{feff}').trim_start();
    trimmed.starts_with("<svg") || (trimmed.starts_with('<') && trimmed.contains("<svg"))
}

impl Rasterizer for SoftwareRasterizer {
    fn decode(&self, bytes: &[u8]) -> Result<SourceImage> {
        if bytes.is_empty() {
            return Err(Error::AssetLoad("empty image source".into()));
        }
        if looks_like_svg(bytes) {
            let tree = usvg::Tree::from_data(bytes, &usvg::Options::default())
                .map_err(|e| Error::AssetLoad(format!("SVG parse error: {e}")))?;
            return Ok(SourceImage::Vector(tree));
        }
        image::load_from_memory(bytes)
            .map(SourceImage::Bitmap)
            .map_err(|e| Error::AssetLoad(format!("image decode error: {e}")))
    }

    fn rasterize(&self, source: &SourceImage, max_width: u32, max_height: u32) -> Result<RasterImage> {
        let (w, h) = fitted_size(source.natural_size(), max_width, max_height)?;
        let png = match source {
            SourceImage::Vector(tree) => {
                let mut pixmap = tiny_skia::Pixmap::new(w, h)
                    .ok_or_else(|| Error::Measurement(format!("cannot allocate {w}x{h} surface")))?;
                let size = tree.size();
                let transform =
                    tiny_skia::Transform::from_scale(w as f32 / size.width(), h as f32 / size.height());
                resvg::render(tree, transform, &mut pixmap.as_mut());
                // tiny-skia stores premultiplied alpha.
                let rgba: Vec<u8> = pixmap
                    .pixels()
                    .iter()
                    .flat_map(|p| {
                        let c = p.demultiply();
                        [c.red(), c.green(), c.blue(), c.alpha()]
                    })
                    .collect();
                let bitmap = image::RgbaImage::from_raw(w, h, rgba)
                    .ok_or_else(|| Error::Measurement(format!("pixel buffer mismatch for {w}x{h}")))?;
                encode_png(&image::DynamicImage::ImageRgba8(bitmap))?
            }
            SourceImage::Bitmap(img) => {
                if (img.width(), img.height()) == (w, h) {
                    encode_png(img)?
                } else {
                    encode_png(&img.resize_exact(w, h, image::imageops::FilterType::Lanczos3))?
                }
            }
        };
        Ok(RasterImage {
            png,
            width: w,
            height: h,
        })
    }
}

fn encode_png(img: &image::DynamicImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| Error::AssetLoad(format!("PNG encode error: {e}")))?;
    Ok(buf)
}

/// Decode then rasterize in one step.
pub fn rasterize(rasterizer: &dyn Rasterizer, bytes: &[u8], max_width: u32, max_height: u32) -> Result<RasterImage> {
    let source = rasterizer.decode(bytes)?;
    rasterizer.rasterize(&source, max_width, max_height)
}

/// Like [`rasterize`] but recoverable: asset failures are logged and mapped to
/// `None` so the caller draws its text fallback. Other errors still propagate.
pub fn rasterize_or_fallback(
    rasterizer: &dyn Rasterizer,
    what: &str,
    bytes: Option<&[u8]>,
    max_width: u32,
    max_height: u32,
) -> Result<Option<RasterImage>> {
    let Some(bytes) = bytes else {
        return Ok(None);
    };
    match rasterize(rasterizer, bytes, max_width, max_height) {
        Ok(image) => {
            log::debug!("{what}: rasterized to {}x{}", image.width(), image.height());
            Ok(Some(image))
        }
        Err(e) if e.is_recoverable_asset_error() => {
            log::warn!("{what} unavailable ({e}), falling back to text");
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

/// Resolve an asset reference to raw bytes. Accepts `data:` URIs, base64 or
/// percent-encoded, and file paths.
pub fn read_source_bytes(src: &str) -> Result<Vec<u8>> {
    if let Some(rest) = src.strip_prefix("data:") {
        let comma = rest
            .find(',')
            .ok_or_else(|| Error::AssetLoad("invalid data URI: missing comma".into()))?;
        let (meta, payload) = (&rest[..comma], &rest[comma + 1..]);
        if meta.ends_with(";base64") {
            return base64::engine::general_purpose::STANDARD
                .decode(payload.trim())
                .map_err(|e| Error::AssetLoad(format!("invalid base64 in data URI: {e}")));
        }
        return Ok(urlencoding::decode_binary(payload.as_bytes()).into_owned());
    }
    std::fs::read(Path::new(src)).map_err(|e| Error::AssetLoad(format!("reading {src}: {e}")))
}

/// Where a logo or background comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AssetSource {
    Bytes(Vec<u8>),
    /// A file path or a `data:` URI, resolved by [`read_source_bytes`].
    Reference(String),
}

impl AssetSource {
    pub fn load(&self) -> Result<Vec<u8>> {
        match self {
            AssetSource::Bytes(bytes) => Ok(bytes.clone()),
            AssetSource::Reference(src) => read_source_bytes(src),
        }
    }
}

/// Load and rasterize an optional source. Every recoverable failure, from
/// reading the file to rendering it, degrades to `None`.
pub fn load_or_fallback(
    rasterizer: &dyn Rasterizer,
    what: &str,
    source: Option<&AssetSource>,
    max_width: u32,
    max_height: u32,
) -> Result<Option<RasterImage>> {
    let bytes = match source.map(AssetSource::load).transpose() {
        Ok(bytes) => bytes,
        Err(e) if e.is_recoverable_asset_error() => {
            log::warn!("{what} unavailable ({e}), falling back to text");
            return Ok(None);
        }
        Err(e) => return Err(e),
    };
    rasterize_or_fallback(rasterizer, what, bytes.as_deref(), max_width, max_height)
}
