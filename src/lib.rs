pub mod config;
pub mod draw;
mod error;
pub mod export;
mod fonts;
pub mod model;
pub mod pdf;
pub mod proposal;
pub mod raster;
pub mod text;
pub mod theme;

pub use config::{BrandConfig, CompanyDetails, Config};
pub use error::{Error, Result};
pub use fonts::{FontConfig, FontWeight};
pub use model::{InvoiceExportInput, LineItem, ProposalInput, TechStack, TimesheetEntry, TimesheetExportInput};
pub use proposal::{AssetSources, ProposalAssets};
pub use raster::{AssetSource, RasterImage, Rasterizer, SoftwareRasterizer};

use std::collections::HashSet;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;

/// Lay out a proposal from already rasterized assets.
pub fn render_offer_proposal(input: &ProposalInput, assets: &ProposalAssets, config: &Config) -> Result<Vec<u8>> {
    proposal::render(input, assets, config)
}

/// Rasterize the assets, render the proposal and save it as
/// `proposal_<client>.pdf` inside `out_dir`.
pub fn generate_offer_proposal_pdf(
    input: &ProposalInput,
    sources: &AssetSources,
    config: &Config,
    out_dir: &Path,
) -> Result<PathBuf> {
    let t0 = Instant::now();

    let assets = ProposalAssets::load(sources, &SoftwareRasterizer)?;
    let t_assets = t0.elapsed();

    let bytes = render_offer_proposal(input, &assets, config)?;
    let t_render = t0.elapsed();

    let path = save_pdf(&bytes, out_dir, &proposal::proposal_filename(&input.client_name))?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: assets={:.1}ms, render={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_assets.as_secs_f64() * 1000.0,
        (t_render - t_assets).as_secs_f64() * 1000.0,
        (t_total - t_render).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );
    Ok(path)
}

pub fn render_timesheet(input: &TimesheetExportInput, logo: Option<&RasterImage>, config: &Config) -> Result<Vec<u8>> {
    export::timesheet::render(input, logo, config)
}

/// Render and save as `timesheet_<project>_<today>.pdf`.
pub fn export_timesheet_pdf(
    input: &TimesheetExportInput,
    logo: Option<&RasterImage>,
    config: &Config,
    out_dir: &Path,
) -> Result<PathBuf> {
    let today = chrono::Local::now().date_naive();
    let bytes = render_timesheet(input, logo, config)?;
    save_pdf(&bytes, out_dir, &export::timesheet::timesheet_filename(&input.project_name, today))
}

/// One independent export per project, run in parallel. Each result stands
/// alone: a failed project does not stop the others. Projects whose names
/// sanitize to the same file get `_2`, `_3`, ... so none overwrites another.
pub fn export_all_timesheets(
    inputs: &[TimesheetExportInput],
    logo: Option<&RasterImage>,
    config: &Config,
    out_dir: &Path,
) -> Vec<Result<PathBuf>> {
    let t0 = Instant::now();
    let today = chrono::Local::now().date_naive();
    let names = distinct_file_names(
        inputs
            .iter()
            .map(|input| export::timesheet::timesheet_filename(&input.project_name, today)),
    );
    let results: Vec<Result<PathBuf>> = inputs
        .par_iter()
        .zip(names.par_iter())
        .map(|(input, name)| {
            let bytes = render_timesheet(input, logo, config)?;
            save_pdf(&bytes, out_dir, name)
        })
        .collect();
    let failed = results.iter().filter(|r| r.is_err()).count();
    log::info!(
        "Exported {} timesheet(s), {} failed, in {:.1}ms",
        results.len() - failed,
        failed,
        t0.elapsed().as_secs_f64() * 1000.0
    );
    results
}

pub fn render_invoice(input: &InvoiceExportInput, logo: Option<&RasterImage>, config: &Config) -> Result<Vec<u8>> {
    export::invoice::render(input, logo, config)
}

/// Render and save as `invoice_<number>.pdf`.
pub fn export_invoice_pdf(
    input: &InvoiceExportInput,
    logo: Option<&RasterImage>,
    config: &Config,
    out_dir: &Path,
) -> Result<PathBuf> {
    let bytes = render_invoice(input, logo, config)?;
    save_pdf(&bytes, out_dir, &export::invoice::invoice_filename(&input.invoice_number))
}

/// Rasterize an export logo, or `None` (with a warning) when it cannot be used.
pub fn load_export_logo(source: Option<&AssetSource>) -> Result<Option<RasterImage>> {
    let (w, h) = export::EXPORT_LOGO_BOX;
    raster::load_or_fallback(&SoftwareRasterizer, "export logo", source, w, h)
}

/// Suffix repeated names (compared case-insensitively) with `_2`, `_3`, ...
/// before the extension. Order is kept and the first occurrence is untouched.
pub fn distinct_file_names(names: impl IntoIterator<Item = String>) -> Vec<String> {
    let mut used = HashSet::new();
    names
        .into_iter()
        .map(|name| {
            let (stem, ext) = match name.rfind('.') {
                Some(dot) if dot > 0 => name.split_at(dot),
                _ => (name.as_str(), ""),
            };
            let mut candidate = name.clone();
            let mut n = 2;
            while !used.insert(candidate.to_lowercase()) {
                candidate = format!("{stem}_{n}{ext}");
                n += 1;
            }
            candidate
        })
        .collect()
}

/// Write to a uniquely named `<name>.*.part` file and rename it into place, so
/// an interrupted write never leaves a truncated PDF under the final name and
/// concurrent saves never share a partial file.
pub fn save_pdf(bytes: &[u8], out_dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(out_dir)?;
    let target = out_dir.join(file_name);
    let mut partial = tempfile::Builder::new()
        .prefix(&format!("{file_name}."))
        .suffix(".part")
        .tempfile_in(out_dir)?;
    partial.write_all(bytes)?;
    partial.persist(&target).map_err(|e| Error::from(e.error))?;
    log::debug!("wrote {}", target.display());
    Ok(target)
}
