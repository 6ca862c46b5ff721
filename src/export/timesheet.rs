use chrono::NaiveDate;

use crate::config::Config;
use crate::error::Result;
use crate::model::TimesheetExportInput;
use crate::pdf::Align;
use crate::pdf::table::{Column, Row, Table};
use crate::raster::RasterImage;
use crate::text::{
    EMPTY_FALLBACK, format_date_short, format_hours, format_money, non_empty, normalize_text,
    sanitize_filename_component,
};
use crate::theme::CONTENT_WIDTH;

use super::{ExportLayout, export_table_style};

/// Date / Hours / Rate / Total / Notes as fractions of the content width.
const COLUMN_SHARES: [f32; 5] = [0.18, 0.12, 0.16, 0.18, 0.36];

pub fn timesheet_table(input: &TimesheetExportInput, currency_symbol: &str) -> Table {
    let w = COLUMN_SHARES.map(|share| CONTENT_WIDTH * share);
    let columns = vec![
        Column::new("Date", w[0], Align::Left),
        Column::new("Hours", w[1], Align::Right),
        Column::new("Rate", w[2], Align::Right),
        Column::new("Total", w[3], Align::Right),
        Column::new("Notes", w[4], Align::Left),
    ];
    let mut rows: Vec<Row> = input
        .entries
        .iter()
        .map(|e| {
            Row::body(vec![
                format_date_short(e.date),
                format_hours(e.hours_worked),
                format_money(e.hourly_rate, currency_symbol),
                format_money(e.total_pay, currency_symbol),
                non_empty(e.notes.as_deref()).unwrap_or_default(),
            ])
        })
        .collect();
    rows.push(Row::emphasized(vec![
        "Total".into(),
        format_hours(input.hours_total()),
        String::new(),
        format_money(input.pay_total(), currency_symbol),
        String::new(),
    ]));
    Table {
        columns,
        rows,
        style: export_table_style(),
    }
}

fn period(input: &TimesheetExportInput) -> Option<(NaiveDate, NaiveDate)> {
    if let Some(range) = input.date_range {
        return Some((range.start_date, range.end_date));
    }
    let first = input.entries.iter().map(|e| e.date).min()?;
    let last = input.entries.iter().map(|e| e.date).max()?;
    Some((first, last))
}

pub fn timesheet_layout(input: &TimesheetExportInput, config: &Config, generated_on: NaiveDate) -> ExportLayout {
    let currency = &config.brand.export_currency_symbol;
    let project = normalize_text(&input.project_name, EMPTY_FALLBACK);
    let client = input
        .client
        .as_ref()
        .and_then(|c| c.display_name())
        .unwrap_or_else(|| EMPTY_FALLBACK.to_string());
    let mut meta = vec![
        ("Project".to_string(), project.clone()),
        ("Client".to_string(), client),
        (
            "Status".to_string(),
            if input.is_paid { "Paid" } else { "Unpaid" }.to_string(),
        ),
    ];
    if let Some((start, end)) = period(input) {
        meta.push((
            "Period".to_string(),
            format!("{} \u{2013} {}", format_date_short(start), format_date_short(end)),
        ));
    }
    meta.push(("Generated".to_string(), format_date_short(generated_on)));

    ExportLayout {
        title: format!("Timesheet \u{2013} {project}"),
        meta,
        description: non_empty(input.description.as_deref()),
        table: timesheet_table(input, currency),
        totals: vec![
            ("Total hours".to_string(), format_hours(input.hours_total())),
            ("Total amount".to_string(), format_money(input.pay_total(), currency)),
        ],
    }
}

/// `timesheet_<project>_<YYYY-MM-DD>.pdf`
pub fn timesheet_filename(project_name: &str, date: NaiveDate) -> String {
    format!(
        "timesheet_{}_{}.pdf",
        sanitize_filename_component(project_name.trim()),
        date.format("%Y-%m-%d")
    )
}

pub fn render(input: &TimesheetExportInput, logo: Option<&RasterImage>, config: &Config) -> Result<Vec<u8>> {
    let today = chrono::Local::now().date_naive();
    super::render(&timesheet_layout(input, config, today), logo, config)
}
