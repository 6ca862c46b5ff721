use crate::config::Config;
use crate::error::Result;
use crate::model::InvoiceExportInput;
use crate::pdf::Align;
use crate::pdf::table::{Column, Row, Table};
use crate::raster::RasterImage;
use crate::text::{EMPTY_FALLBACK, format_date_short, format_money, non_empty, sanitize_filename_component, title_case};
use crate::theme::CONTENT_WIDTH;

use super::{ExportLayout, export_table_style};

const DEFAULT_DESCRIPTION: &str = "Services rendered";

pub fn invoice_table(input: &InvoiceExportInput, currency_symbol: &str) -> Table {
    let amount = format_money(input.amount, currency_symbol);
    let description = non_empty(input.description.as_deref()).unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string());
    Table {
        columns: vec![
            Column::new("Description", CONTENT_WIDTH * 0.7, Align::Left),
            Column::new("Amount", CONTENT_WIDTH * 0.3, Align::Right),
        ],
        rows: vec![
            Row::body(vec![description, amount.clone()]),
            Row::emphasized(vec!["Total".into(), amount]),
        ],
        style: export_table_style(),
    }
}

pub fn invoice_layout(input: &InvoiceExportInput, config: &Config) -> ExportLayout {
    let currency = &config.brand.export_currency_symbol;
    let number = non_empty(Some(&input.invoice_number)).unwrap_or_else(|| EMPTY_FALLBACK.to_string());
    let client = input
        .client
        .as_ref()
        .and_then(|c| c.display_name())
        .unwrap_or_else(|| EMPTY_FALLBACK.to_string());
    let status = title_case(&input.status);

    let mut meta = vec![
        ("Invoice".to_string(), number.clone()),
        ("Client".to_string(), client),
        ("Status".to_string(), status),
        ("Due date".to_string(), format_date_short(input.due_date)),
    ];
    if let Some(paid_at) = input.paid_at {
        meta.push(("Paid on".to_string(), format_date_short(paid_at)));
    }

    let mut totals = vec![("Invoice total".to_string(), format_money(input.amount, currency))];
    if let Some(balance) = balance_due(input) {
        totals.push(("Balance due".to_string(), format_money(balance, currency)));
    }
    ExportLayout {
        title: format!("Invoice {number}"),
        meta,
        description: None,
        table: invoice_table(input, currency),
        totals,
    }
}

/// Zero only for a `PAID` status. A partial payment carries no paid amount,
/// so its balance is unknown; anything else still owes the full amount.
pub fn balance_due(input: &InvoiceExportInput) -> Option<f64> {
    match input.status.trim().to_ascii_lowercase().as_str() {
        "paid" => Some(0.0),
        "partially_paid" | "partially paid" => None,
        _ => Some(input.amount),
    }
}

/// `invoice_<number>.pdf`
pub fn invoice_filename(invoice_number: &str) -> String {
    format!("invoice_{}.pdf", sanitize_filename_component(invoice_number.trim()))
}

pub fn render(input: &InvoiceExportInput, logo: Option<&RasterImage>, config: &Config) -> Result<Vec<u8>> {
    super::render(&invoice_layout(input, config), logo, config)
}
