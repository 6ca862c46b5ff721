use crate::draw::{
    Block, BulletList, Card, CardLike, CardStyle, Paragraph, SectionLabel, SignatureLines, Spacer, Stack,
    equal_height_cards, measure_card_row,
};
use crate::error::Result;
use crate::model::ProposalInput;
use crate::pdf::table::{Column, Row, Table, TableFlow, TableStyle, draw_table};
use crate::pdf::{Align, Canvas, Paint, PdfDocument};
use crate::text::{EMPTY_FALLBACK, format_money, non_empty, normalize_text, split_into_bullets};
use crate::theme::{
    ACCENT, BODY, COLUMN_GUTTER, CONTENT_BOTTOM, CONTENT_WIDTH, H3, HEADER_RESERVED, HERO_AMOUNT, INK, MARGIN, META,
    PAGE_WIDTH, RULE, RULE_WIDTH, SMALL, SPACE_LG, SPACE_MD, SPACE_SM, SPACE_XS, SURFACE,
};

use super::{ProposalContext, ensure_room};

pub const HERO_HEIGHT: f32 = 96.0;
/// Deliverable / Timeline / Tech / Price as fractions of the content width.
pub const COLUMN_SHARES: [f32; 4] = [0.35, 0.24, 0.23, 0.18];
pub const NOTE_MAX_CHARS: usize = 110;
pub const MAX_NOTES: usize = 5;

pub const DEFAULT_NOTES: [&str; 3] = [
    "Fixed price for the scope described above; changes are quoted separately.",
    "Work starts once the proposal is accepted and the first payment is received.",
    "Includes 30 days of post-launch support for defects.",
];

pub const TERMS: [&str; 4] = [
    "Invoices are payable within 14 days of issue.",
    "Source code and assets transfer to the client on final payment.",
    "Third-party licenses and hosting are billed at cost.",
    "Either party may end the engagement with 14 days written notice.",
];

const TOTALS_WIDTH: f32 = 210.0;
const TOTALS_ROW: f32 = 18.0;

/// Accent stripe plus band; the figure on the left, commercial terms on the right.
fn draw_hero(canvas: &mut Canvas<'_>, ctx: &ProposalContext<'_>, top: f32) -> f32 {
    let brand = ctx.brand;
    canvas.rect(MARGIN, top, CONTENT_WIDTH, HERO_HEIGHT, Paint::fill(SURFACE));
    canvas.line(MARGIN + 1.5, top, MARGIN + 1.5, top + HERO_HEIGHT, 3.0, ACCENT);

    let left = MARGIN + SPACE_LG;
    let mut y = top + SPACE_MD + SPACE_XS;
    y = canvas.text_block(left, y, &["TOTAL INVESTMENT".to_string()], META, Align::Left) + SPACE_XS;
    let amount = format_money(ctx.input.total_price, &brand.currency_symbol);
    y = canvas.text_block(left, y, &[amount], HERO_AMOUNT, Align::Left);
    canvas.text_block(left, y, &[brand.currency_code.clone()], SMALL, Align::Left);

    let right = MARGIN + CONTENT_WIDTH - SPACE_LG;
    let lines = [
        (brand.payment_terms.clone(), BODY),
        (format!("Valid for {} days", brand.validity_days), SMALL),
        (format!("Proposal ID: {}", ctx.proposal_id), SMALL),
    ];
    lines.into_iter().fold(top + SPACE_LG + SPACE_XS, |y, (text, style)| {
        canvas.text_block(right, y, &[text], style, Align::Right) + SPACE_XS
    });
    top + HERO_HEIGHT
}

pub fn pricing_table(input: &ProposalInput, currency_symbol: &str) -> Table {
    let widths = COLUMN_SHARES.map(|share| CONTENT_WIDTH * share);
    let columns = vec![
        Column::new("Deliverable", widths[0], Align::Left),
        Column::new("Timeline", widths[1], Align::Left),
        Column::new("Tech", widths[2], Align::Left),
        Column::new("Price", widths[3], Align::Right),
    ];
    let rows = input
        .products
        .iter()
        .map(|p| {
            let tags = p.tech_stack.tags();
            Row::body(vec![
                normalize_text(&p.name, EMPTY_FALLBACK),
                normalize_text(&p.timeline, EMPTY_FALLBACK),
                if tags.is_empty() {
                    EMPTY_FALLBACK.to_string()
                } else {
                    tags.join(", ")
                },
                p.price
                    .map(|price| format_money(price, currency_symbol))
                    .unwrap_or_else(|| EMPTY_FALLBACK.to_string()),
            ])
        })
        .collect();
    Table {
        columns,
        rows,
        style: TableStyle {
            header_fill: SURFACE,
            header_text: META.with_color(INK),
            body_text: BODY,
            emphasis_fill: SURFACE,
            emphasis_text: BODY.bold(),
            stripe_fill: Some([250, 250, 249]),
            border: None,
            row_rule: Some((RULE, RULE_WIDTH)),
            padding_x: SPACE_SM,
            padding_y: SPACE_SM,
            repeat_header: true,
        },
    }
}

/// `(label, amount, emphasized)` rows under the table. The subtotal is the
/// sum of the line items; the total is the caller's figure.
pub fn totals_rows(input: &ProposalInput, currency_symbol: &str) -> Vec<(String, String, bool)> {
    let subtotal = input.items_subtotal();
    if (subtotal - input.total_price).abs() > 0.005 {
        log::warn!(
            "total price {:.2} differs from the sum of line items {:.2}; showing both",
            input.total_price,
            subtotal
        );
    }
    vec![
        ("Subtotal".into(), format_money(subtotal, currency_symbol), false),
        ("Taxes".into(), EMPTY_FALLBACK.into(), false),
        ("Total".into(), format_money(input.total_price, currency_symbol), true),
    ]
}

fn draw_totals(canvas: &mut Canvas<'_>, rows: &[(String, String, bool)], top: f32) -> f32 {
    let right = MARGIN + CONTENT_WIDTH;
    let left = right - TOTALS_WIDTH;
    let mut y = top;
    for (label, value, emphasized) in rows {
        if *emphasized {
            canvas.line(left, y, right, y, 0.8, INK);
            y += SPACE_XS;
        }
        let style = if *emphasized { H3 } else { BODY };
        let label_style = if *emphasized { style } else { style.with_color(SMALL.color) };
        canvas.text_block(left, y, &[label.clone()], label_style, Align::Left);
        canvas.text_block(right, y, &[value.clone()], style, Align::Right);
        y += TOTALS_ROW.max(style.line_height());
    }
    y
}

fn totals_height(rows: &[(String, String, bool)]) -> f32 {
    rows.iter()
        .map(|(_, _, emphasized)| {
            let style = if *emphasized { H3 } else { BODY };
            TOTALS_ROW.max(style.line_height()) + if *emphasized { SPACE_XS } else { 0.0 }
        })
        .sum()
}

/// Caller supplied rationale split into short bullets, or the boilerplate.
pub fn commercial_notes(why_to_invest: Option<&str>) -> Vec<String> {
    let notes = why_to_invest
        .and_then(|raw| non_empty(Some(raw)).map(|_| split_into_bullets(raw, NOTE_MAX_CHARS, MAX_NOTES)))
        .unwrap_or_default();
    if notes.is_empty() {
        DEFAULT_NOTES.iter().map(|s| s.to_string()).collect()
    } else {
        notes
    }
}

fn acceptance_line(ctx: &ProposalContext<'_>) -> String {
    match non_empty(ctx.input.client_company.as_deref()) {
        Some(company) => format!("Client: {} ({company})", ctx.client_name),
        None => format!("Client: {}", ctx.client_name),
    }
}

pub fn compose(doc: &mut PdfDocument, ctx: &ProposalContext<'_>) -> Result<()> {
    let currency = &ctx.brand.currency_symbol;
    doc.add_page()?;
    let mut y = {
        let mut canvas = doc.current()?;
        draw_hero(&mut canvas, ctx, HEADER_RESERVED) + SPACE_LG
    };

    let table = pricing_table(ctx.input, currency);
    let flow = TableFlow {
        top: HEADER_RESERVED,
        bottom: CONTENT_BOTTOM,
    };
    let outcome = draw_table(doc, &table, MARGIN, y, flow)?;
    if outcome.pages_added > 0 {
        log::debug!("pricing table spilled onto {} more page(s)", outcome.pages_added);
    }
    y = outcome.end_y + SPACE_MD;

    let totals = totals_rows(ctx.input, currency);
    y = ensure_room(doc, y, totals_height(&totals))?;
    y = {
        let mut canvas = doc.current()?;
        draw_totals(&mut canvas, &totals, y) + SPACE_LG
    };

    let notes = commercial_notes(ctx.input.why_to_invest.as_deref());
    let notes_card = Card::new(
        Stack::new()
            .push(SectionLabel("Commercial Notes"))
            .push(BulletList::bullets(&notes)),
    );
    y = ensure_room(doc, y, notes_card.measure(&*doc, CONTENT_WIDTH))?;
    y = {
        let mut canvas = doc.current()?;
        notes_card.render(&mut canvas, MARGIN, y, CONTENT_WIDTH) + SPACE_LG
    };

    let terms: Vec<String> = TERMS.iter().map(|s| s.to_string()).collect();
    let terms_card = Card::new(
        Stack::new()
            .push(SectionLabel("Terms"))
            .push(BulletList::bullets(&terms)),
    );
    let client_line = acceptance_line(ctx);
    let statement = "By signing below, the client accepts this proposal and its terms.";
    let acceptance_card = Card::new(
        Stack::new()
            .push(SectionLabel("Acceptance"))
            .push(Paragraph::body(&client_line))
            .push(Spacer(SPACE_XS))
            .push(Paragraph {
                text: statement,
                style: SMALL,
            })
            .push(SignatureLines {
                captions: &["Signature", "Date", "Name"],
            }),
    )
    .with_style(CardStyle {
        fill: Some(SURFACE),
        ..CardStyle::default()
    });
    let cards: [&dyn CardLike; 2] = [&terms_card, &acceptance_card];
    let row_h = measure_card_row(&*doc, &cards, CONTENT_WIDTH, COLUMN_GUTTER);
    y = ensure_room(doc, y, row_h)?;
    let mut canvas = doc.current()?;
    equal_height_cards(&mut canvas, &cards, MARGIN, y, CONTENT_WIDTH, COLUMN_GUTTER);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(json: &str) -> ProposalInput {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn column_shares_fill_the_content_width() {
        let p = input(r#"{"clientName": "A", "pageTitle": "T"}"#);
        let table = pricing_table(&p, "\u{20ac}");
        assert!((table.width() - CONTENT_WIDTH).abs() < 0.01);
        assert_eq!(table.columns[3].align, Align::Right);
        assert!(table.style.repeat_header);
    }

    #[test]
    fn unpriced_items_show_a_dash_and_count_as_zero() {
        let p = input(
            r#"{"clientName": "A", "pageTitle": "T", "totalPrice": 1500, "products": [
                {"name": "Design", "price": 1500, "timeline": "2 weeks", "techStack": "Figma"},
                {"name": "Audit", "timeline": "", "techStack": []}
            ]}"#,
        );
        let table = pricing_table(&p, "\u{20ac}");
        assert_eq!(table.rows[1].cells, vec!["Audit", EMPTY_FALLBACK, EMPTY_FALLBACK, EMPTY_FALLBACK]);
        let totals = totals_rows(&p, "\u{20ac}");
        assert_eq!(totals[0].1, "\u{20ac}1,500.00");
        assert_eq!(totals[2].1, "\u{20ac}1,500.00");
    }

    #[test]
    fn stale_total_is_kept_for_display() {
        let p = input(
            r#"{"clientName": "A", "pageTitle": "T", "totalPrice": 900,
                "products": [{"name": "X", "price": 1000, "timeline": "1w"}]}"#,
        );
        let totals = totals_rows(&p, "$");
        assert_eq!(totals[0].1, "$1,000.00");
        assert_eq!(totals[2].1, "$900.00");
    }

    #[test]
    fn notes_fall_back_to_boilerplate() {
        assert_eq!(commercial_notes(None).len(), DEFAULT_NOTES.len());
        assert_eq!(commercial_notes(Some("   ")).len(), DEFAULT_NOTES.len());
        let notes = commercial_notes(Some("Faster checkout. Lower churn.\n- Better SEO"));
        assert_eq!(notes, vec!["Faster checkout.", "Lower churn.", "Better SEO"]);
    }

    #[test]
    fn long_notes_are_capped() {
        let long = "word ".repeat(60);
        let notes = commercial_notes(Some(&long));
        assert_eq!(notes.len(), 1);
        assert!(notes[0].chars().count() <= NOTE_MAX_CHARS + 1);
        assert!(notes[0].ends_with('\u{2026}'));
    }
}
