//! Drawing helpers shared by the composers.
//!
//! Every helper is a [`Block`]: `measure` predicts the height the content will
//! take at a given width, `render` draws it at (x, y) and returns the y just
//! below it. Composers measure first when they need the height up front (cards,
//! page-break decisions) and render afterwards with the same inputs, so the two
//! phases never disagree.

use crate::pdf::{Align, Canvas, Paint, TextMetrics};
use crate::theme::{
    ACCENT, BODY, CARD_PADDING, CARD_RADIUS, INK, META, MUTED, RULE, RULE_WIDTH, Rgb, SMALL, SPACE_MD, SPACE_SM,
    SPACE_XS, TextStyle, H3,
};

pub trait Block {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32;

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32;
}

/// Uppercase "meta" label, e.g. `PREPARED FOR`.
pub struct SectionLabel<'a>(pub &'a str);

impl Block for SectionLabel<'_> {
    fn measure(&self, _metrics: &dyn TextMetrics, _width: f32) -> f32 {
        META.line_height() + SPACE_XS
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let label = self.0.to_uppercase();
        canvas.text_block(x, y, &[label], META, Align::Left);
        y + self.measure(&*canvas, width)
    }
}

/// Horizontal hairline across `width`.
pub struct Divider;

impl Block for Divider {
    fn measure(&self, _metrics: &dyn TextMetrics, _width: f32) -> f32 {
        SPACE_MD
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        canvas.line(x, y, x + width, y, RULE_WIDTH, RULE);
        y + SPACE_MD
    }
}

pub fn divider(canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
    Divider.render(canvas, x, y, width)
}

/// Section heading followed by a thin rule.
pub struct SectionTitle<'a>(pub &'a str);

impl Block for SectionTitle<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        metrics.block_height(self.0, width, H3) + SPACE_XS + Divider.measure(metrics, width)
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let lines = canvas.wrap(self.0, width, H3);
        let y = canvas.text_block(x, y, &lines, H3, Align::Left) + SPACE_XS;
        divider(canvas, x, y, width)
    }
}

/// Wrapped text in one style.
pub struct Paragraph<'a> {
    pub text: &'a str,
    pub style: TextStyle,
}

impl<'a> Paragraph<'a> {
    pub fn body(text: &'a str) -> Self {
        Self { text, style: BODY }
    }
}

impl Block for Paragraph<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        metrics.block_height(self.text, width, self.style)
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let lines = canvas.wrap(self.text, width, self.style);
        canvas.text_block(x, y, &lines, self.style, Align::Left)
    }
}

/// Label / value rows. Labels sit at `x`, values wrap inside a second column
/// starting at `x + label_width`.
pub struct KeyValueStack<'a> {
    pub rows: &'a [(String, String)],
    pub label_width: f32,
}

const KV_ROW_GAP: f32 = SPACE_SM;

impl KeyValueStack<'_> {
    fn value_width(&self, width: f32) -> f32 {
        (width - self.label_width).max(1.0)
    }

    fn row_height(&self, metrics: &dyn TextMetrics, value: &str, width: f32) -> f32 {
        let value_h = metrics.block_height(value, self.value_width(width), BODY);
        META.line_height().max(value_h) + KV_ROW_GAP
    }
}

impl Block for KeyValueStack<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        self.rows
            .iter()
            .map(|(_, value)| self.row_height(metrics, value, width))
            .sum()
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let value_x = x + self.label_width;
        let value_width = self.value_width(width);
        let mut cursor = y;
        for (label, value) in self.rows {
            let row_h = self.row_height(&*canvas, value, width);
            // Labels are smaller than values; nudge them onto the value's first baseline.
            let label_top = cursor + (BODY.line_height() - META.line_height()) / 2.0;
            canvas.text_block(x, label_top, &[label.to_uppercase()], META, Align::Left);
            let lines = canvas.wrap(value, value_width, BODY);
            canvas.text_block(value_x, cursor, &lines, BODY, Align::Left);
            cursor += row_h;
        }
        cursor
    }
}

const TAG_STYLE: TextStyle = SMALL.with_color(INK);
const TAG_PAD_X: f32 = 7.0;
const TAG_PAD_Y: f32 = 4.0;
const TAG_GAP: f32 = 6.0;

/// Outlined rounded pills, flowing onto a new row when the next pill would
/// pass `x + width`.
pub struct TagList<'a> {
    pub tags: &'a [String],
}

/// Offset and width of one pill relative to the list origin.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PillSlot {
    pub dx: f32,
    pub dy: f32,
    pub width: f32,
}

pub fn pill_height() -> f32 {
    TAG_STYLE.size + 2.0 * TAG_PAD_Y
}

/// Where each tag lands. Widths are measured with the same metrics text is
/// drawn with: pill width = text width + 2 × horizontal padding.
pub fn place_tags(metrics: &dyn TextMetrics, tags: &[String], max_width: f32) -> Vec<PillSlot> {
    let row_h = pill_height() + TAG_GAP;
    let mut slots = Vec::with_capacity(tags.len());
    let (mut dx, mut dy) = (0.0f32, 0.0f32);
    for tag in tags {
        let width = metrics.measure(tag, TAG_STYLE) + 2.0 * TAG_PAD_X;
        if dx > 0.0 && dx + width > max_width {
            dx = 0.0;
            dy += row_h;
        }
        slots.push(PillSlot { dx, dy, width });
        dx += width + TAG_GAP;
    }
    slots
}

impl Block for TagList<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        match place_tags(metrics, self.tags, width).last() {
            Some(last) => last.dy + pill_height() + SPACE_MD,
            None => 0.0,
        }
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let slots = place_tags(&*canvas, self.tags, width);
        let h = pill_height();
        for (tag, slot) in self.tags.iter().zip(&slots) {
            let (px, py) = (x + slot.dx, y + slot.dy);
            canvas.rounded_rect(px, py, slot.width, h, h / 2.0, Paint::stroke(RULE, 0.8));
            // Line box top such that the glyphs sit inside the vertical padding.
            let top = py + TAG_PAD_Y - (TAG_STYLE.line_height() - TAG_STYLE.size) / 2.0;
            canvas.text_block(px + TAG_PAD_X, top, &[tag.clone()], TAG_STYLE, Align::Left);
        }
        match slots.last() {
            Some(last) => y + last.dy + h + SPACE_MD,
            None => y,
        }
    }
}

const MILESTONE_INDENT: f32 = 12.0;
const MILESTONE_LABEL: TextStyle = BODY.bold();

/// `(label, duration)` items hung off a vertical accent rule, with hairlines
/// between consecutive items.
pub struct MilestoneList<'a> {
    pub items: &'a [(String, String)],
}

impl MilestoneList<'_> {
    fn item_height(metrics: &dyn TextMetrics, item: &(String, String), text_width: f32) -> f32 {
        let mut h = metrics.block_height(&item.0, text_width, MILESTONE_LABEL);
        if !item.1.is_empty() {
            h += metrics.block_height(&item.1, text_width, SMALL);
        }
        h
    }
}

const MILESTONE_GAP: f32 = SPACE_SM;

impl Block for MilestoneList<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        if self.items.is_empty() {
            return 0.0;
        }
        let text_width = (width - MILESTONE_INDENT).max(1.0);
        let items: f32 = self
            .items
            .iter()
            .map(|item| Self::item_height(metrics, item, text_width))
            .sum();
        items + MILESTONE_GAP * 2.0 * (self.items.len() - 1) as f32 + SPACE_MD
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        if self.items.is_empty() {
            return y;
        }
        let text_x = x + MILESTONE_INDENT;
        let text_width = (width - MILESTONE_INDENT).max(1.0);
        let mut cursor = y;
        for (i, (label, duration)) in self.items.iter().enumerate() {
            if i > 0 {
                cursor += MILESTONE_GAP;
                canvas.line(text_x, cursor, x + width, cursor, RULE_WIDTH, RULE);
                cursor += MILESTONE_GAP;
            }
            let lines = canvas.wrap(label, text_width, MILESTONE_LABEL);
            cursor = canvas.text_block(text_x, cursor, &lines, MILESTONE_LABEL, Align::Left);
            if !duration.is_empty() {
                let lines = canvas.wrap(duration, text_width, SMALL);
                cursor = canvas.text_block(text_x, cursor, &lines, SMALL, Align::Left);
            }
        }
        canvas.line(x + 1.0, y, x + 1.0, cursor, 2.0, ACCENT);
        cursor + SPACE_MD
    }
}

const BULLET_INDENT: f32 = 12.0;

/// Bulleted (`•`) or numbered (`1.`) list. Each item wraps under its own
/// hanging indent.
pub struct BulletList<'a> {
    pub items: &'a [String],
    pub numbered: bool,
    pub style: TextStyle,
}

impl<'a> BulletList<'a> {
    pub fn bullets(items: &'a [String]) -> Self {
        Self {
            items,
            numbered: false,
            style: BODY,
        }
    }

    pub fn numbered(items: &'a [String]) -> Self {
        Self {
            items,
            numbered: true,
            style: BODY,
        }
    }
}

impl Block for BulletList<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        let text_width = (width - BULLET_INDENT).max(1.0);
        self.items
            .iter()
            .map(|item| metrics.block_height(item, text_width, self.style) + SPACE_XS)
            .sum()
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let text_width = (width - BULLET_INDENT).max(1.0);
        let marker_style = self.style.with_color(if self.numbered { ACCENT } else { MUTED });
        let mut cursor = y;
        for (i, item) in self.items.iter().enumerate() {
            let marker = if self.numbered {
                format!("{}.", i + 1)
            } else {
                "\u{2022}".to_string()
            };
            canvas.text_block(x, cursor, &[marker], marker_style, Align::Left);
            let lines = canvas.wrap(item, text_width, self.style);
            cursor = canvas.text_block(x + BULLET_INDENT, cursor, &lines, self.style, Align::Left) + SPACE_XS;
        }
        cursor
    }
}

const SIGNATURE_ROW: f32 = 30.0;

/// Blank ruled lines with a small caption under each (Signature, Date, ...).
pub struct SignatureLines<'a> {
    pub captions: &'a [&'a str],
}

impl Block for SignatureLines<'_> {
    fn measure(&self, _metrics: &dyn TextMetrics, _width: f32) -> f32 {
        self.captions.len() as f32 * (SIGNATURE_ROW + SMALL.line_height())
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let mut cursor = y;
        for caption in self.captions {
            cursor += SIGNATURE_ROW - SPACE_XS;
            canvas.line(x, cursor, x + width, cursor, RULE_WIDTH, MUTED);
            cursor += SPACE_XS;
            cursor = canvas.text_block(x, cursor, &[caption.to_string()], SMALL, Align::Left);
        }
        cursor
    }
}

/// Fixed vertical space.
pub struct Spacer(pub f32);

impl Block for Spacer {
    fn measure(&self, _metrics: &dyn TextMetrics, _width: f32) -> f32 {
        self.0
    }

    fn render(&self, _canvas: &mut Canvas<'_>, _x: f32, y: f32, _width: f32) -> f32 {
        y + self.0
    }
}

/// Blocks stacked top to bottom at the same width.
#[derive(Default)]
pub struct Stack<'a> {
    blocks: Vec<Box<dyn Block + 'a>>,
}

impl<'a> Stack<'a> {
    pub fn new() -> Self {
        Self { blocks: Vec::new() }
    }

    pub fn push(mut self, block: impl Block + 'a) -> Self {
        self.blocks.push(Box::new(block));
        self
    }
}

impl Block for Stack<'_> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        self.blocks.iter().map(|b| b.measure(metrics, width)).sum()
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        self.blocks
            .iter()
            .fold(y, |cursor, b| b.render(canvas, x, cursor, width))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CardStyle {
    pub fill: Option<Rgb>,
    pub border: Option<Rgb>,
    pub padding: f32,
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            fill: None,
            border: Some(RULE),
            padding: CARD_PADDING,
        }
    }
}

/// Rounded rectangle behind caller-positioned content. Never sizes itself.
pub fn card(canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, height: f32, style: CardStyle) {
    let paint = Paint {
        fill: style.fill,
        stroke: style.border.map(|c| (c, 0.8)),
    };
    canvas.rounded_rect(x, y, width, height, CARD_RADIUS, paint);
}

/// A [`Block`] inside a padded card.
pub struct Card<B> {
    pub content: B,
    pub style: CardStyle,
}

impl<B: Block> Card<B> {
    pub fn new(content: B) -> Self {
        Self {
            content,
            style: CardStyle::default(),
        }
    }

    pub fn with_style(mut self, style: CardStyle) -> Self {
        self.style = style;
        self
    }

    fn inner_width(&self, width: f32) -> f32 {
        (width - 2.0 * self.style.padding).max(1.0)
    }

    /// Draw the frame at `height` (which may exceed the content's own
    /// measurement, e.g. when matching a neighbor) and the content on top.
    pub fn render_with_height(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, height: f32) -> f32 {
        card(canvas, x, y, width, height, self.style);
        let pad = self.style.padding;
        self.content.render(canvas, x + pad, y + pad, self.inner_width(width));
        y + height
    }
}

impl<B: Block> Block for Card<B> {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        self.content.measure(metrics, self.inner_width(width)) + 2.0 * self.style.padding
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        let height = self.measure(&*canvas, width);
        self.render_with_height(canvas, x, y, width, height)
    }
}

/// Side by side cards of equal width sharing one height: the tallest
/// content's. Returns the y below the row.
pub fn equal_height_cards(
    canvas: &mut Canvas<'_>,
    cards: &[&dyn CardLike],
    x: f32,
    y: f32,
    width: f32,
    gutter: f32,
) -> f32 {
    let height = measure_card_row(&*canvas, cards, width, gutter);
    let card_w = card_row_width(cards.len(), width, gutter);
    for (i, c) in cards.iter().enumerate() {
        c.render_framed(canvas, x + i as f32 * (card_w + gutter), y, card_w, height);
    }
    y + height
}

pub fn measure_card_row(metrics: &dyn TextMetrics, cards: &[&dyn CardLike], width: f32, gutter: f32) -> f32 {
    let card_w = card_row_width(cards.len(), width, gutter);
    cards
        .iter()
        .map(|c| c.measure_framed(metrics, card_w))
        .fold(0.0, f32::max)
}

fn card_row_width(count: usize, width: f32, gutter: f32) -> f32 {
    let n = count.max(1) as f32;
    (width - gutter * (n - 1.0)) / n
}

/// Object-safe view of a [`Card`] for rows of mixed content types.
pub trait CardLike {
    fn measure_framed(&self, metrics: &dyn TextMetrics, width: f32) -> f32;
    fn render_framed(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, height: f32) -> f32;
}

impl<B: Block> CardLike for Card<B> {
    fn measure_framed(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        self.measure(metrics, width)
    }

    fn render_framed(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32, height: f32) -> f32 {
        self.render_with_height(canvas, x, y, width, height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fonts::{FontConfig, FontSet};
    use crate::pdf::PdfDocument;
    use crate::theme::{PAGE_HEIGHT, PAGE_WIDTH};

    fn fonts() -> FontSet {
        FontConfig::builtin().load().unwrap()
    }

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn pills_are_measured_and_wrap_at_the_edge() {
        let fonts = fonts();
        let tags = strings(&["Rust", "PostgreSQL", "React", "Kubernetes", "Figma"]);

        let one_row = place_tags(&fonts, &tags, 10_000.0);
        for (tag, slot) in tags.iter().zip(&one_row) {
            let text_w = TextMetrics::measure(&fonts, tag, TAG_STYLE);
            assert!((slot.width - (text_w + 2.0 * TAG_PAD_X)).abs() < 1e-4);
            assert_eq!(slot.dy, 0.0);
        }

        let max_width = one_row[1].dx + one_row[1].width;
        let wrapped = place_tags(&fonts, &tags, max_width);
        assert_eq!((wrapped[0].dy, wrapped[1].dy), (0.0, 0.0));
        assert_eq!(wrapped[2].dx, 0.0);
        assert_eq!(wrapped[2].dy, pill_height() + TAG_GAP);
        for slot in &wrapped {
            assert!(slot.dx == 0.0 || slot.dx + slot.width <= max_width, "{slot:?}");
        }

        let list = TagList { tags: &tags };
        let last = wrapped.last().unwrap();
        assert_eq!(list.measure(&fonts, max_width), last.dy + pill_height() + SPACE_MD);
        assert_eq!(TagList { tags: &[] }.measure(&fonts, max_width), 0.0);
    }

    #[test]
    fn milestones_only_separate_consecutive_items() {
        let fonts = fonts();
        let items: Vec<(String, String)> = vec![
            ("Discovery".into(), "2 weeks".into()),
            ("Build".into(), "6 weeks".into()),
            ("Launch".into(), String::new()),
        ];
        let width = 240.0;
        let text_width = width - MILESTONE_INDENT;
        let content: f32 = items
            .iter()
            .map(|item| MilestoneList::item_height(&fonts, item, text_width))
            .sum();

        let list = MilestoneList { items: &items };
        let separators = (list.measure(&fonts, width) - content - SPACE_MD) / (2.0 * MILESTONE_GAP);
        assert!((separators - (items.len() - 1) as f32).abs() < 1e-4);

        let single = MilestoneList { items: &items[..1] };
        let alone = MilestoneList::item_height(&fonts, &items[0], text_width);
        assert!((single.measure(&fonts, width) - alone - SPACE_MD).abs() < 1e-4);

        let mut doc = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();
        doc.add_page().unwrap();
        let mut canvas = doc.current().unwrap();
        let end = list.render(&mut canvas, 48.0, 100.0, width);
        assert!((end - 100.0 - list.measure(&fonts, width)).abs() < 1e-3);
    }

    #[test]
    fn key_value_rows_take_the_taller_column() {
        let fonts = fonts();
        let rows = vec![
            ("Client".to_string(), "Acme".to_string()),
            (
                "Address".to_string(),
                "Unit 4, 221 Harbour Road, Northside Industrial Estate, Port Town".to_string(),
            ),
        ];
        let stack = KeyValueStack {
            rows: &rows,
            label_width: 70.0,
        };
        let width = 200.0;
        let value_width = width - 70.0;

        let expected: f32 = rows
            .iter()
            .map(|(_, value)| {
                let lines = fonts.wrap(value, value_width, BODY).len() as f32;
                META.line_height().max(lines * BODY.line_height()) + KV_ROW_GAP
            })
            .sum();
        assert!(fonts.wrap(&rows[1].1, value_width, BODY).len() > 1);
        assert!((stack.measure(&fonts, width) - expected).abs() < 1e-4);
    }

    #[test]
    fn card_row_shares_the_tallest_height() {
        let fonts = fonts();
        let short = Card::new(Paragraph::body("Short."));
        let long_text = "A much longer card body that wraps over several lines at this width, so it is taller.";
        let long = Card::new(Paragraph::body(long_text));
        let cards: [&dyn CardLike; 2] = [&short, &long];

        let width = 400.0;
        let gutter = 16.0;
        let card_w = (width - gutter) / 2.0;
        let row = measure_card_row(&fonts, &cards, width, gutter);
        assert_eq!(row, long.measure(&fonts, card_w));
        assert!(row > short.measure(&fonts, card_w));

        let mut doc = PdfDocument::new(&FontConfig::builtin(), PAGE_WIDTH, PAGE_HEIGHT).unwrap();
        doc.add_page().unwrap();
        let mut canvas = doc.current().unwrap();
        let end = equal_height_cards(&mut canvas, &cards, 48.0, 300.0, width, gutter);
        assert!((end - 300.0 - row).abs() < 1e-3);
    }
}
