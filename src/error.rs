use std::io;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// A logo or background image could not be read, decoded or rasterized.
    /// Composers recover from this by drawing a text fallback.
    #[error("asset load failed: {0}")]
    AssetLoad(String),

    /// No drawing surface could be created (zero-sized or oversized pixmap).
    #[error("measurement surface unavailable: {0}")]
    Measurement(String),

    /// Any other drawing or table-layout failure. Aborts the whole document.
    #[error("document generation failed: {0}")]
    Generation(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("invalid input JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// True for failures the orchestrators downgrade to a text fallback.
    pub fn is_recoverable_asset_error(&self) -> bool {
        matches!(self, Error::AssetLoad(_) | Error::Measurement(_))
    }
}
