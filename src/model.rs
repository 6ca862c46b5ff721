use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};

/// Tech tags arrive either as one comma separated string or as a list.
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum TechStack {
    List(Vec<String>),
    Text(String),
}

impl Default for TechStack {
    fn default() -> Self {
        TechStack::List(Vec::new())
    }
}

impl TechStack {
    pub fn tags(&self) -> Vec<String> {
        let raw: Vec<&str> = match self {
            TechStack::List(items) => items.iter().map(|s| s.as_str()).collect(),
            TechStack::Text(text) => text.split(',').collect(),
        };
        raw.into_iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(|t| t.to_string())
            .collect()
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub timeline: String,
    #[serde(default)]
    pub tech_stack: TechStack,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInput {
    pub client_name: String,
    #[serde(default)]
    pub client_email: Option<String>,
    #[serde(default)]
    pub client_company: Option<String>,
    #[serde(default)]
    pub client_phone: Option<String>,
    pub page_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub what_we_need: Option<String>,
    #[serde(default)]
    pub roadmap: Option<String>,
    #[serde(default)]
    pub why_to_invest: Option<String>,
    #[serde(default)]
    pub products: Vec<LineItem>,
    #[serde(default)]
    pub total_price: f64,
    /// Issue date printed on the cover and running header. Defaults to today.
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub proposal_id: Option<String>,
}

impl ProposalInput {
    /// Sum of the priced line items. Unpriced items count as zero.
    pub fn items_subtotal(&self) -> f64 {
        self.products.iter().filter_map(|p| p.price).sum()
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
}

impl ClientRef {
    /// "Name (Company)", "Name", "Company" or None.
    pub fn display_name(&self) -> Option<String> {
        let name = self.name.as_deref().map(str::trim).filter(|s| !s.is_empty());
        let company = self.company.as_deref().map(str::trim).filter(|s| !s.is_empty());
        match (name, company) {
            (Some(n), Some(c)) => Some(format!("{n} ({c})")),
            (Some(n), None) => Some(n.to_string()),
            (None, Some(c)) => Some(c.to_string()),
            (None, None) => None,
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(deserialize_with = "lenient_date")]
    pub start_date: NaiveDate,
    #[serde(deserialize_with = "lenient_date")]
    pub end_date: NaiveDate,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetEntry {
    #[serde(deserialize_with = "lenient_date")]
    pub date: NaiveDate,
    pub hours_worked: f64,
    pub hourly_rate: f64,
    /// hours × rate, computed upstream.
    pub total_pay: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimesheetExportInput {
    pub project_name: String,
    #[serde(default)]
    pub client: Option<ClientRef>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub date_range: Option<DateRange>,
    #[serde(default)]
    pub entries: Vec<TimesheetEntry>,
    #[serde(default)]
    pub total_hours: Option<f64>,
    #[serde(default)]
    pub total_pay: Option<f64>,
}

impl TimesheetExportInput {
    pub fn hours_total(&self) -> f64 {
        self.total_hours
            .unwrap_or_else(|| self.entries.iter().map(|e| e.hours_worked).sum())
    }

    pub fn pay_total(&self) -> f64 {
        self.total_pay
            .unwrap_or_else(|| self.entries.iter().map(|e| e.total_pay).sum())
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InvoiceExportInput {
    pub invoice_number: String,
    pub amount: f64,
    #[serde(deserialize_with = "lenient_date")]
    pub due_date: NaiveDate,
    pub status: String,
    #[serde(default, deserialize_with = "lenient_date_opt")]
    pub paid_at: Option<NaiveDate>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client: Option<ClientRef>,
}

/// Accepts `2026-10-17` as well as full timestamps such as
/// `2026-10-17T09:30:00.000Z`; only the calendar date is kept.
pub(crate) fn parse_lenient_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    let date_part = trimmed.get(..10).unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()
}

fn lenient_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_lenient_date(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {raw:?}")))
}

fn lenient_date_opt<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => parse_lenient_date(s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {s:?}"))),
    }
}
