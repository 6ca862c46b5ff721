//! Offer proposal: cover, overview and pricing pages, then the running
//! header/footer pass over all of them.

pub mod chrome;
pub mod cover;
pub mod overview;
pub mod pricing;

use std::time::Instant;

use chrono::NaiveDate;

use crate::config::{BrandConfig, Config};
use crate::error::Result;
use crate::model::ProposalInput;
use crate::pdf::{ImageHandle, PdfDocument};
use crate::raster::{AssetSource, RasterImage, Rasterizer, load_or_fallback};
use crate::text::{normalize_text, sanitize_filename_component};
use crate::theme::{CONTENT_BOTTOM, HEADER_RESERVED, PAGE_HEIGHT, PAGE_WIDTH};

/// Pixel boxes the assets are rasterized into.
pub const HEADER_LOGO_BOX: (u32, u32) = (600, 120);
pub const COVER_LOGO_BOX: (u32, u32) = (1200, 480);
/// A4 at 150 dpi.
pub const BACKGROUND_BOX: (u32, u32) = (1240, 1754);

/// Unresolved logo and cover background.
#[derive(Clone, Debug, Default)]
pub struct AssetSources {
    pub logo: Option<AssetSource>,
    pub background: Option<AssetSource>,
}

/// Assets after rasterization. `None` means "draw the text fallback".
#[derive(Clone, Debug, Default)]
pub struct ProposalAssets {
    pub cover_logo: Option<RasterImage>,
    pub header_logo: Option<RasterImage>,
    pub background: Option<RasterImage>,
}

impl ProposalAssets {
    /// Rasterize every source before layout starts. The logo and the
    /// background render concurrently; a failure in either only loses that
    /// asset.
    pub fn load(sources: &AssetSources, rasterizer: &dyn Rasterizer) -> Result<Self> {
        let t0 = Instant::now();
        let (logos, background) = rayon::join(
            || -> Result<(Option<RasterImage>, Option<RasterImage>)> {
                let cover = load_or_fallback(
                    rasterizer,
                    "cover logo",
                    sources.logo.as_ref(),
                    COVER_LOGO_BOX.0,
                    COVER_LOGO_BOX.1,
                )?;
                let header = load_or_fallback(
                    rasterizer,
                    "header logo",
                    sources.logo.as_ref(),
                    HEADER_LOGO_BOX.0,
                    HEADER_LOGO_BOX.1,
                )?;
                Ok((cover, header))
            },
            || {
                load_or_fallback(
                    rasterizer,
                    "cover background",
                    sources.background.as_ref(),
                    BACKGROUND_BOX.0,
                    BACKGROUND_BOX.1,
                )
            },
        );
        let (cover_logo, header_logo) = logos?;
        let assets = Self {
            cover_logo,
            header_logo,
            background: background?,
        };
        log::info!("Assets resolved in {:.1}ms", t0.elapsed().as_secs_f64() * 1000.0);
        Ok(assets)
    }
}

/// Images registered with one document.
#[derive(Clone, Debug, Default)]
pub struct ProposalImages {
    pub cover_logo: Option<ImageHandle>,
    pub header_logo: Option<ImageHandle>,
    pub background: Option<ImageHandle>,
}

/// Per-document values every proposal composer reads.
pub struct ProposalContext<'a> {
    pub input: &'a ProposalInput,
    pub brand: &'a BrandConfig,
    pub client_name: String,
    pub date: NaiveDate,
    pub proposal_id: String,
}

impl<'a> ProposalContext<'a> {
    pub fn new(input: &'a ProposalInput, brand: &'a BrandConfig) -> Self {
        let date = input
            .date
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let client_name = normalize_text(&input.client_name, "Client");
        let proposal_id = input
            .proposal_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| proposal_id(&client_name, date));
        Self {
            input,
            brand,
            client_name,
            date,
            proposal_id,
        }
    }
}

/// `ZP-<YYYYMMDD>-<4 hex>`, stable for a given client and date.
pub fn proposal_id(client_name: &str, date: NaiveDate) -> String {
    // FNV-1a
    let mut hash: u32 = 0x811c_9dc5;
    let stamp = date.format("%Y%m%d").to_string();
    for byte in client_name.trim().to_lowercase().bytes().chain(stamp.bytes()) {
        hash ^= u32::from(byte);
        hash = hash.wrapping_mul(0x0100_0193);
    }
    format!("ZP-{stamp}-{:04X}", (hash ^ (hash >> 16)) & 0xffff)
}

pub fn proposal_filename(client_name: &str) -> String {
    format!("proposal_{}.pdf", sanitize_filename_component(client_name.trim()))
}

/// Start a new page when `needed` points would not fit below `y`. Returns the
/// y to continue at.
pub(crate) fn ensure_room(doc: &mut PdfDocument, y: f32, needed: f32) -> Result<f32> {
    if y + needed <= CONTENT_BOTTOM {
        return Ok(y);
    }
    let page = doc.add_page()?;
    log::debug!("page break before a {needed:.0}pt block (now page {})", page + 1);
    Ok(HEADER_RESERVED)
}

/// Lay out the whole proposal and return the PDF bytes.
pub fn render(input: &ProposalInput, assets: &ProposalAssets, config: &Config) -> Result<Vec<u8>> {
    let t0 = Instant::now();
    let ctx = ProposalContext::new(input, &config.brand);

    let mut doc = PdfDocument::new(&config.fonts, PAGE_WIDTH, PAGE_HEIGHT)?;
    doc.set_title(&format!("Proposal for {}", ctx.client_name));
    let images = ProposalImages {
        cover_logo: assets.cover_logo.as_ref().map(|img| doc.add_image(img)),
        header_logo: assets.header_logo.as_ref().map(|img| doc.add_image(img)),
        background: assets.background.as_ref().map(|img| doc.add_image(img)),
    };

    cover::compose(&mut doc, &ctx, &images)?;
    overview::compose(&mut doc, &ctx)?;
    pricing::compose(&mut doc, &ctx)?;
    let t_layout = t0.elapsed();

    chrome::stamp(&mut doc, &ctx, images.header_logo.as_ref())?;
    let pages = doc.page_count();
    let bytes = doc.finish()?;

    log::info!(
        "Proposal {} for {:?}: {} pages (layout {:.1}ms, total {:.1}ms)",
        ctx.proposal_id,
        ctx.client_name,
        pages,
        t_layout.as_secs_f64() * 1000.0,
        t0.elapsed().as_secs_f64() * 1000.0,
    );
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_id_is_stable_and_shaped() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        let a = proposal_id("Acme & Co. LLC", date);
        assert_eq!(a, proposal_id("  acme & co. llc ", date));
        assert!(a.starts_with("ZP-20261017-"));
        assert_eq!(a.len(), "ZP-20261017-".len() + 4);
        assert!(a[12..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn explicit_id_wins() {
        let input: ProposalInput = serde_json::from_str(
            r#"{"clientName": "Acme", "pageTitle": "Site", "proposalId": "ZP-CUSTOM", "date": "2026-01-02"}"#,
        )
        .unwrap();
        let brand = BrandConfig::default();
        let ctx = ProposalContext::new(&input, &brand);
        assert_eq!(ctx.proposal_id, "ZP-CUSTOM");
        assert_eq!(ctx.date, NaiveDate::from_ymd_opt(2026, 1, 2).unwrap());
    }
}
