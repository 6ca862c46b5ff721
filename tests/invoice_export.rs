mod common;

use agency_pdf::export::invoice::{balance_due, invoice_filename, invoice_layout, invoice_table};
use agency_pdf::{Config, export_invoice_pdf, render_invoice};

const PENDING: &str = r#"{
    "invoiceNumber": "INV-2026-014",
    "amount": 4800,
    "dueDate": "2026-11-16T00:00:00.000Z",
    "status": "PENDING",
    "description": "Portal build, milestone two",
    "client": {"name": "Jane Doe", "company": "Acme"}
}"#;

#[test]
fn pending_invoice_lists_meta_and_full_balance() {
    let input = common::invoice(PENDING);
    let layout = invoice_layout(&input, &Config::default());

    assert_eq!(layout.title, "Invoice INV-2026-014");
    let meta: Vec<(&str, &str)> = layout.meta.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    assert_eq!(
        meta,
        vec![
            ("Invoice", "INV-2026-014"),
            ("Client", "Jane Doe (Acme)"),
            ("Status", "Pending"),
            ("Due date", "Nov 16, 2026"),
        ]
    );
    assert_eq!(layout.totals[0].1, "$4,800.00");
    assert_eq!(layout.totals[1].1, "$4,800.00");

    let table = invoice_table(&input, "$");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].cells[0], "Portal build, milestone two");
    assert!(table.rows[1].emphasis);
}

#[test]
fn partially_paid_invoice_leaves_balance_out() {
    let input = common::invoice(
        r#"{"invoiceNumber": "INV-7", "amount": 1200.5, "dueDate": "2026-10-01",
            "status": "partially_paid", "paidAt": "2026-10-05"}"#,
    );
    let layout = invoice_layout(&input, &Config::default());
    assert!(layout.meta.contains(&("Status".to_string(), "Partially Paid".to_string())));
    assert!(layout.meta.contains(&("Paid on".to_string(), "Oct 05, 2026".to_string())));
    assert!(layout.meta.contains(&("Client".to_string(), "\u{2014}".to_string())));
    assert_eq!(balance_due(&input), None);
    assert_eq!(layout.totals, vec![("Invoice total".to_string(), "$1,200.50".to_string())]);

    let table = invoice_table(&input, "$");
    assert_eq!(table.rows[0].cells, vec!["Services rendered", "$1,200.50"]);
}

#[test]
fn only_paid_status_clears_the_balance() {
    let paid = common::invoice(r#"{"invoiceNumber": "INV-8", "amount": 900, "dueDate": "2026-10-01", "status": "PAID"}"#);
    let layout = invoice_layout(&paid, &Config::default());
    assert_eq!(layout.totals[1], ("Balance due".to_string(), "$0.00".to_string()));

    let overdue = common::invoice(
        r#"{"invoiceNumber": "INV-9", "amount": 900, "dueDate": "2026-10-01",
            "status": "OVERDUE", "paidAt": "2026-10-05"}"#,
    );
    assert_eq!(balance_due(&overdue), Some(900.0));
    let layout = invoice_layout(&overdue, &Config::default());
    assert_eq!(layout.totals[1].1, "$900.00");
}

#[test]
fn invoice_renders_and_saves_under_a_safe_name() {
    let _ = env_logger::try_init();
    assert_eq!(invoice_filename("INV/2026 #7"), "invoice_INV_2026_7.pdf");

    let input = common::invoice(PENDING);
    let bytes = render_invoice(&input, None, &Config::default()).unwrap();
    common::assert_pdf(&bytes);
    assert_eq!(common::page_count(&bytes), 1);

    let out = common::output_dir("invoice_export");
    let path = export_invoice_pdf(&input, None, &Config::default(), &out).unwrap();
    assert_eq!(path.file_name().unwrap(), "invoice_INV-2026-014.pdf");
    common::assert_pdf(&std::fs::read(path).unwrap());
}
