use crate::error::Result;
use crate::theme::{Rgb, TextStyle};

use super::{Align, Canvas, Paint, PdfDocument, TextMetrics};

#[derive(Clone, Debug)]
pub struct Column {
    pub header: String,
    pub width: f32,
    pub align: Align,
}

impl Column {
    pub fn new(header: &str, width: f32, align: Align) -> Self {
        Self {
            header: header.to_string(),
            width,
            align,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Row {
    pub cells: Vec<String>,
    /// Drawn with the emphasis fill and weight, e.g. a closing total row.
    pub emphasis: bool,
}

impl Row {
    pub fn body(cells: Vec<String>) -> Self {
        Self {
            cells,
            emphasis: false,
        }
    }

    pub fn emphasized(cells: Vec<String>) -> Self {
        Self {
            cells,
            emphasis: true,
        }
    }
}

#[derive(Clone, Debug)]
pub struct TableStyle {
    pub header_fill: Rgb,
    pub header_text: TextStyle,
    pub body_text: TextStyle,
    pub emphasis_fill: Rgb,
    pub emphasis_text: TextStyle,
    /// Fill for every other body row (the second, fourth, ...).
    pub stripe_fill: Option<Rgb>,
    /// Full cell borders.
    pub border: Option<(Rgb, f32)>,
    /// Horizontal rule under each row when cells are not bordered.
    pub row_rule: Option<(Rgb, f32)>,
    pub padding_x: f32,
    pub padding_y: f32,
    pub repeat_header: bool,
}

#[derive(Clone, Debug)]
pub struct Table {
    pub columns: Vec<Column>,
    pub rows: Vec<Row>,
    pub style: TableStyle,
}

impl Table {
    pub fn width(&self) -> f32 {
        self.columns.iter().map(|c| c.width).sum()
    }

    pub fn body_rows(&self) -> usize {
        self.rows.iter().filter(|r| !r.emphasis).count()
    }
}

/// Vertical band the table may occupy on continuation pages.
#[derive(Clone, Copy, Debug)]
pub struct TableFlow {
    /// Where rows resume after a page break.
    pub top: f32,
    /// Rows never extend below this y.
    pub bottom: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TableOutcome {
    /// y just below the last drawn row on the final page.
    pub end_y: f32,
    pub pages_added: usize,
    pub rows_drawn: usize,
}

struct RowLayout {
    height: f32,
    cell_lines: Vec<Vec<String>>,
}

fn layout_row(doc: &PdfDocument, columns: &[Column], cells: &[String], style: TextStyle, table_style: &TableStyle) -> RowLayout {
    let mut max_lines = 1usize;
    let cell_lines: Vec<Vec<String>> = columns
        .iter()
        .enumerate()
        .map(|(i, col)| {
            let text = cells.get(i).map(String::as_str).unwrap_or("");
            let inner_w = (col.width - 2.0 * table_style.padding_x).max(1.0);
            let lines = doc.wrap(text, inner_w, style);
            max_lines = max_lines.max(lines.len());
            lines
        })
        .collect();
    RowLayout {
        height: max_lines as f32 * style.line_height() + 2.0 * table_style.padding_y,
        cell_lines,
    }
}

fn draw_row(
    canvas: &mut Canvas<'_>,
    table: &Table,
    layout: &RowLayout,
    x: f32,
    top: f32,
    fill: Option<Rgb>,
    style: TextStyle,
) {
    let ts = &table.style;
    let width = table.width();
    if let Some(color) = fill {
        canvas.rect(x, top, width, layout.height, Paint::fill(color));
    }

    let mut cell_x = x;
    for (col, lines) in table.columns.iter().zip(layout.cell_lines.iter()) {
        let anchor = match col.align {
            Align::Left => cell_x + ts.padding_x,
            Align::Center => cell_x + col.width / 2.0,
            Align::Right => cell_x + col.width - ts.padding_x,
        };
        canvas.text_block(anchor, top + ts.padding_y, lines, style, col.align);
        if let Some((color, w)) = ts.border {
            canvas.rect(cell_x, top, col.width, layout.height, Paint::stroke(color, w));
        }
        cell_x += col.width;
    }

    if ts.border.is_none()
        && let Some((color, w)) = ts.row_rule
    {
        let y = top + layout.height;
        canvas.line(x, y, x + width, y, w, color);
    }
}

/// Draw `table` at (`x`, `y`) on the current page, breaking onto new pages
/// whenever the next row would cross `flow.bottom`. Rows never split; the
/// header row is redrawn at the top of each continuation page when
/// `repeat_header` is set.
pub fn draw_table(doc: &mut PdfDocument, table: &Table, x: f32, y: f32, flow: TableFlow) -> Result<TableOutcome> {
    let ts = &table.style;
    let headers: Vec<String> = table.columns.iter().map(|c| c.header.clone()).collect();
    let header_layout = layout_row(doc, &table.columns, &headers, ts.header_text, ts);
    let row_layouts: Vec<RowLayout> = table
        .rows
        .iter()
        .map(|row| {
            let style = if row.emphasis { ts.emphasis_text } else { ts.body_text };
            layout_row(doc, &table.columns, &row.cells, style, ts)
        })
        .collect();

    let mut pages_added = 0usize;
    let mut cursor = y;

    // Never leave a header stranded at the foot of a page.
    let first_row_h = row_layouts.first().map_or(0.0, |r| r.height);
    if cursor + header_layout.height + first_row_h > flow.bottom && cursor > flow.top {
        doc.add_page()?;
        pages_added += 1;
        cursor = flow.top;
        log::debug!("table moved to a fresh page before its header");
    }

    {
        let mut canvas = doc.current()?;
        draw_row(&mut canvas, table, &header_layout, x, cursor, Some(ts.header_fill), ts.header_text);
    }
    cursor += header_layout.height;

    let mut body_index = 0usize;
    for (row, layout) in table.rows.iter().zip(row_layouts.iter()) {
        let page_has_rows = cursor > flow.top + header_layout.height + 0.5;
        if cursor + layout.height > flow.bottom && page_has_rows {
            doc.add_page()?;
            pages_added += 1;
            cursor = flow.top;
            log::debug!("table continued on a new page (row {body_index})");
            if ts.repeat_header {
                let mut canvas = doc.current()?;
                draw_row(&mut canvas, table, &header_layout, x, cursor, Some(ts.header_fill), ts.header_text);
                cursor += header_layout.height;
            }
        }

        let (fill, style) = if row.emphasis {
            (Some(ts.emphasis_fill), ts.emphasis_text)
        } else {
            let stripe = if body_index % 2 == 1 { ts.stripe_fill } else { None };
            body_index += 1;
            (stripe, ts.body_text)
        };
        let mut canvas = doc.current()?;
        draw_row(&mut canvas, table, layout, x, cursor, fill, style);
        cursor += layout.height;
    }

    Ok(TableOutcome {
        end_y: cursor,
        pages_added,
        rows_drawn: table.rows.len(),
    })
}
