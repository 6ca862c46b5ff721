use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::fonts::FontConfig;

/// Env var naming a brand JSON file when no path is given explicitly.
pub const CONFIG_ENV: &str = "AGENCY_PDF_CONFIG";

/// Company credentials printed top-right on timesheet and invoice exports.
/// Each line is only drawn when present.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CompanyDetails {
    pub name: String,
    pub address: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub vat: Option<String>,
    pub registration: Option<String>,
}

impl Default for CompanyDetails {
    fn default() -> Self {
        Self {
            name: "Zulbera".into(),
            address: None,
            email: Some("hello@zulbera.com".into()),
            phone: None,
            vat: None,
            registration: None,
        }
    }
}

impl CompanyDetails {
    /// Name first, then every supplied detail line in a fixed order.
    pub fn lines(&self) -> Vec<String> {
        let mut lines = vec![self.name.clone()];
        lines.extend(self.address.iter().cloned());
        lines.extend(self.email.iter().cloned());
        lines.extend(self.phone.iter().cloned());
        lines.extend(self.vat.iter().map(|v| format!("VAT: {v}")));
        lines.extend(self.registration.iter().map(|r| format!("Reg. No.: {r}")));
        lines.retain(|l| !l.trim().is_empty());
        lines
    }
}

/// Branding and commercial wording. Every field has a default, so a brand
/// file only needs the keys it wants to change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BrandConfig {
    pub brand_name: String,
    /// Small label in the cover's top-right corner.
    pub website: String,
    /// Left side of the proposal footer.
    pub contact_line: String,
    pub validity_days: u32,
    pub currency_symbol: String,
    pub currency_code: String,
    /// Currency for timesheet and invoice amounts.
    pub export_currency_symbol: String,
    pub payment_terms: String,
    /// Optional line under the "Page X of Y" footer on exports.
    pub tagline: Option<String>,
    pub company: CompanyDetails,
    /// TrueType faces to embed instead of the builtin Helvetica.
    pub font_regular: Option<PathBuf>,
    pub font_bold: Option<PathBuf>,
}

impl Default for BrandConfig {
    fn default() -> Self {
        Self {
            brand_name: "Zulbera".into(),
            website: "zulbera.com".into(),
            contact_line: "hello@zulbera.com \u{b7} zulbera.com".into(),
            validity_days: 30,
            currency_symbol: "\u{20ac}".into(),
            currency_code: "EUR".into(),
            export_currency_symbol: "$".into(),
            payment_terms: "50% upfront, 50% on delivery".into(),
            tagline: Some("Thank you for your business.".into()),
            company: CompanyDetails::default(),
            font_regular: None,
            font_bold: None,
        }
    }
}

/// Everything a render needs besides its input data.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub brand: BrandConfig,
    pub fonts: FontConfig,
}

impl Config {
    pub fn new(brand: BrandConfig, fonts: FontConfig) -> Self {
        Self { brand, fonts }
    }

    /// Read a brand file from `path`, else from `$AGENCY_PDF_CONFIG`, else use
    /// defaults. Fonts named in the file must load; otherwise the font comes
    /// from [`FontConfig::from_env`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from));
        let brand = match &path {
            Some(path) => {
                let contents = std::fs::read_to_string(path)
                    .map_err(|e| Error::Config(format!("reading {}: {e}", path.display())))?;
                let brand: BrandConfig = serde_json::from_str(&contents)
                    .map_err(|e| Error::Config(format!("parsing {}: {e}", path.display())))?;
                log::info!("Loaded brand config from {}", path.display());
                brand
            }
            None => BrandConfig::default(),
        };
        brand.validate()?;

        let fonts = match &brand.font_regular {
            Some(regular) => FontConfig::from_paths(regular, brand.font_bold.as_deref())
                .map_err(|e| Error::Config(format!("font {}: {e}", regular.display())))?,
            None => FontConfig::from_env(),
        };
        Ok(Self { brand, fonts })
    }
}

impl BrandConfig {
    fn validate(&self) -> Result<()> {
        if self.brand_name.trim().is_empty() {
            return Err(Error::Config("brandName must not be empty".into()));
        }
        if self.validity_days == 0 {
            return Err(Error::Config("validityDays must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_brand_file_keeps_defaults() {
        let brand: BrandConfig = serde_json::from_str(r#"{"brandName": "Acme", "validityDays": 14}"#).unwrap();
        assert_eq!(brand.brand_name, "Acme");
        assert_eq!(brand.validity_days, 14);
        assert_eq!(brand.currency_code, "EUR");
        assert_eq!(brand.export_currency_symbol, "$");
    }

    #[test]
    fn company_lines_skip_missing_fields() {
        let company = CompanyDetails {
            name: "Zulbera".into(),
            address: None,
            email: Some("hello@zulbera.com".into()),
            phone: None,
            vat: Some("DE123".into()),
            registration: None,
        };
        assert_eq!(company.lines(), vec!["Zulbera", "hello@zulbera.com", "VAT: DE123"]);
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = Config::load(Some(Path::new("/nonexistent/brand.json"))).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }
}
