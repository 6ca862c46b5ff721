use std::collections::HashSet;

use crate::draw::{
    Block, BulletList, Card, CardStyle, KeyValueStack, MilestoneList, Paragraph, SectionLabel, SectionTitle, Spacer,
    Stack,
};
use crate::error::Result;
use crate::model::ProposalInput;
use crate::pdf::{Align, Canvas, PdfDocument, TextMetrics};
use crate::text::{EMPTY_FALLBACK, non_empty, normalize_text, truncate_with_ellipsis};
use crate::theme::{
    BODY, COLUMN_GUTTER, CONTENT_BOTTOM, CONTENT_WIDTH, H2, HEADER_RESERVED, MARGIN, SMALL, SPACE_LG, SPACE_XS,
    SURFACE,
};

use super::ProposalContext;

pub const SUMMARY_MAX_CHARS: usize = 600;
const FREE_TEXT_MAX_CHARS: usize = 900;
pub const MAX_SERVICES: usize = 8;
pub const MAX_MILESTONES: usize = 10;
pub const TAG_SEPARATOR: &str = " \u{00b7} ";
/// Free text is never shortened below this when squeezing a section.
const MIN_TEXT_CHARS: usize = 40;
const KV_LABEL_WIDTH: f32 = 70.0;

pub const NEXT_STEPS: [&str; 4] = [
    "Review the scope, timeline and investment in this proposal.",
    "Reply with any questions or requested changes.",
    "Sign the acceptance section to confirm the engagement.",
    "We schedule a kickoff call and share the project plan.",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SectionKind {
    ProjectSummary,
    WhatWeNeed,
    Timeline,
    Roadmap,
    Services,
    TechStack,
    NextSteps,
}

impl SectionKind {
    pub fn title(self) -> &'static str {
        match self {
            SectionKind::ProjectSummary => "Project Summary",
            SectionKind::WhatWeNeed => "What We Need",
            SectionKind::Timeline => "Timeline",
            SectionKind::Roadmap => "Roadmap",
            SectionKind::Services => "Services & Deliverables",
            SectionKind::TechStack => "Tech Stack",
            SectionKind::NextSteps => "Next Steps",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum SectionBody {
    Summary { title: String, description: String },
    Paragraphs(Vec<String>),
    /// Capped list; `more` counts the items left out.
    Milestones { items: Vec<(String, String)>, more: usize },
    Bullets { items: Vec<String>, more: usize },
    Inline(String),
    Steps { steps: Vec<String>, notice: String },
}

/// "+N more" under a capped list. Zero renders nothing.
struct MoreNote(usize);

impl MoreNote {
    fn text(&self) -> String {
        format!("+{} more", self.0)
    }
}

impl Block for MoreNote {
    fn measure(&self, metrics: &dyn TextMetrics, width: f32) -> f32 {
        if self.0 == 0 {
            return 0.0;
        }
        metrics.block_height(&self.text(), width, SMALL) + SPACE_XS
    }

    fn render(&self, canvas: &mut Canvas<'_>, x: f32, y: f32, width: f32) -> f32 {
        if self.0 == 0 {
            return y;
        }
        let lines = canvas.wrap(&self.text(), width, SMALL);
        canvas.text_block(x, y, &lines, SMALL, Align::Left) + SPACE_XS
    }
}

/// Half of `text` with an ellipsis, or `None` when that would go below
/// `MIN_TEXT_CHARS`.
fn shorten(text: &str) -> Option<String> {
    let half = text.chars().count() / 2;
    (half >= MIN_TEXT_CHARS).then(|| truncate_with_ellipsis(text, half))
}

#[derive(Clone, Debug, PartialEq)]
pub struct Section {
    pub kind: SectionKind,
    pub body: SectionBody,
}

impl Section {
    fn block(&self) -> Stack<'_> {
        let stack = Stack::new().push(SectionTitle(self.kind.title()));
        let stack = match &self.body {
            SectionBody::Summary { title, description } => stack
                .push(Paragraph {
                    text: title,
                    style: BODY.bold(),
                })
                .push(Spacer(SPACE_XS))
                .push(Paragraph::body(description)),
            SectionBody::Paragraphs(paras) => paras
                .iter()
                .fold(stack, |s, p| s.push(Paragraph::body(p)).push(Spacer(SPACE_XS))),
            SectionBody::Milestones { items, more } => stack.push(MilestoneList { items }).push(MoreNote(*more)),
            SectionBody::Bullets { items, more } => stack.push(BulletList::bullets(items)).push(MoreNote(*more)),
            SectionBody::Inline(text) => stack.push(Paragraph::body(text)).push(Spacer(SPACE_XS)),
            SectionBody::Steps { steps, notice } => stack
                .push(BulletList::numbered(steps))
                .push(Spacer(SPACE_XS))
                .push(Paragraph {
                    text: notice,
                    style: SMALL,
                }),
        };
        stack.push(Spacer(SPACE_LG))
    }

    /// A smaller version of this section: one list item fewer, one
    /// paragraph fewer, or text cut in half. `None` once nothing is left to
    /// give up.
    pub fn shrink(&self) -> Option<Section> {
        let body = match &self.body {
            SectionBody::Summary { title, description } => SectionBody::Summary {
                title: title.clone(),
                description: shorten(description)?,
            },
            SectionBody::Paragraphs(paras) if paras.len() > 1 => {
                SectionBody::Paragraphs(paras[..paras.len() - 1].to_vec())
            }
            SectionBody::Paragraphs(paras) => SectionBody::Paragraphs(vec![shorten(paras.first()?)?]),
            SectionBody::Milestones { items, more } if items.len() > 1 => SectionBody::Milestones {
                items: items[..items.len() - 1].to_vec(),
                more: more + 1,
            },
            SectionBody::Bullets { items, more } if items.len() > 1 => SectionBody::Bullets {
                items: items[..items.len() - 1].to_vec(),
                more: more + 1,
            },
            SectionBody::Inline(text) => SectionBody::Inline(shorten(text)?),
            SectionBody::Steps { steps, notice } if steps.len() > 1 => SectionBody::Steps {
                steps: steps[..steps.len() - 1].to_vec(),
                notice: notice.clone(),
            },
            _ => return None,
        };
        Some(Section { kind: self.kind, body })
    }
}

/// Shrink `section` until it measures at most `room`. Falls back to the
/// smallest form when even that is too tall.
pub fn fit_section(metrics: &dyn TextMetrics, section: &Section, width: f32, room: f32) -> Section {
    let mut current = section.clone();
    while current.block().measure(metrics, width) > room {
        match current.shrink() {
            Some(smaller) => current = smaller,
            None => break,
        }
    }
    current
}

#[derive(Clone, Debug, PartialEq)]
pub struct OverviewPlan {
    pub left: Vec<Section>,
    pub right: Vec<Section>,
}

impl OverviewPlan {
    pub fn kinds(&self) -> Vec<SectionKind> {
        self.left.iter().chain(&self.right).map(|s| s.kind).collect()
    }
}

/// Non-empty lines of free text, normalized, each a paragraph.
fn paragraphs(raw: Option<&str>) -> Option<Vec<String>> {
    let text = raw?;
    let text = truncate_with_ellipsis(text.trim(), FREE_TEXT_MAX_CHARS);
    let paras: Vec<String> = text.lines().filter_map(|l| non_empty(Some(l))).collect();
    (!paras.is_empty()).then_some(paras)
}

/// Union of all line items' tags, first occurrence order, case-insensitive.
pub fn unique_tech_tags(input: &ProposalInput) -> Vec<String> {
    let mut seen = HashSet::new();
    input
        .products
        .iter()
        .flat_map(|p| p.tech_stack.tags())
        .filter(|t| seen.insert(t.to_lowercase()))
        .collect()
}

/// Decide which sections appear in which column. Free text sections without
/// backing data are left out entirely. Tech Stack and Next Steps always appear.
pub fn plan_sections(input: &ProposalInput, validity_days: u32) -> OverviewPlan {
    let mut left = vec![Section {
        kind: SectionKind::ProjectSummary,
        body: SectionBody::Summary {
            title: normalize_text(&input.page_title, EMPTY_FALLBACK),
            description: truncate_with_ellipsis(&normalize_text(&input.description, EMPTY_FALLBACK), SUMMARY_MAX_CHARS),
        },
    }];
    if let Some(paras) = paragraphs(input.what_we_need.as_deref()) {
        left.push(Section {
            kind: SectionKind::WhatWeNeed,
            body: SectionBody::Paragraphs(paras),
        });
    }
    let milestones: Vec<(String, String)> = input
        .products
        .iter()
        .filter_map(|p| {
            let name = non_empty(Some(&p.name))?;
            Some((name, normalize_text(&p.timeline, "")))
        })
        .collect();
    if !milestones.is_empty() {
        left.push(Section {
            kind: SectionKind::Timeline,
            body: SectionBody::Milestones {
                items: milestones.iter().take(MAX_MILESTONES).cloned().collect(),
                more: milestones.len().saturating_sub(MAX_MILESTONES),
            },
        });
    }
    if let Some(paras) = paragraphs(input.roadmap.as_deref()) {
        left.push(Section {
            kind: SectionKind::Roadmap,
            body: SectionBody::Paragraphs(paras),
        });
    }
    if !milestones.is_empty() {
        let more = milestones.len().saturating_sub(MAX_SERVICES);
        let items = milestones.into_iter().map(|(name, _)| name).take(MAX_SERVICES).collect();
        left.push(Section {
            kind: SectionKind::Services,
            body: SectionBody::Bullets { items, more },
        });
    }

    let tags = unique_tech_tags(input);
    let tech = if tags.is_empty() {
        EMPTY_FALLBACK.to_string()
    } else {
        tags.join(TAG_SEPARATOR)
    };
    let mut right = vec![Section {
        kind: SectionKind::TechStack,
        body: SectionBody::Inline(tech),
    }];
    right.push(Section {
        kind: SectionKind::NextSteps,
        body: SectionBody::Steps {
            steps: NEXT_STEPS.iter().map(|s| s.to_string()).collect(),
            notice: format!("This proposal is valid for {validity_days} days from the date of issue."),
        },
    });

    OverviewPlan { left, right }
}

fn prepared_for_rows(ctx: &ProposalContext<'_>) -> Vec<(String, String)> {
    let input = ctx.input;
    let mut rows = vec![("Client".to_string(), ctx.client_name.clone())];
    let optional = [
        ("Company", input.client_company.as_deref()),
        ("Email", input.client_email.as_deref()),
        ("Phone", input.client_phone.as_deref()),
    ];
    rows.extend(
        optional
            .into_iter()
            .filter_map(|(label, value)| Some((label.to_string(), non_empty(value)?))),
    );
    rows
}

/// Lay out one column with its own cursor. A section that would run past the
/// content area is shrunk to the room left instead of being dropped.
fn render_column(doc: &mut PdfDocument, sections: &[Section], x: f32, top: f32, width: f32) -> Result<f32> {
    let mut y = top;
    for section in sections {
        let fitted = fit_section(&*doc, section, width, CONTENT_BOTTOM - y);
        if fitted != *section {
            log::warn!("overview: {:?} shortened to fit the page", section.kind);
        }
        let block = fitted.block();
        if y + block.measure(&*doc, width) > CONTENT_BOTTOM {
            log::warn!("overview: {:?} runs past the content area", section.kind);
        }
        let mut canvas = doc.current()?;
        y = block.render(&mut canvas, x, y, width);
    }
    Ok(y)
}

pub fn compose(doc: &mut PdfDocument, ctx: &ProposalContext<'_>) -> Result<()> {
    doc.add_page()?;
    let mut y = HEADER_RESERVED;

    let rows = prepared_for_rows(ctx);
    let title = normalize_text(&ctx.input.page_title, EMPTY_FALLBACK);
    let prepared = Card::new(
        Stack::new()
            .push(SectionLabel("Prepared for"))
            .push(KeyValueStack {
                rows: &rows,
                label_width: KV_LABEL_WIDTH,
            })
            .push(Paragraph {
                text: &title,
                style: H2,
            }),
    )
    .with_style(CardStyle {
        fill: Some(SURFACE),
        ..CardStyle::default()
    });
    {
        let mut canvas = doc.current()?;
        y = prepared.render(&mut canvas, MARGIN, y, CONTENT_WIDTH) + SPACE_LG;
    }

    let plan = plan_sections(ctx.input, ctx.brand.validity_days);
    let col_w = (CONTENT_WIDTH - COLUMN_GUTTER) / 2.0;
    let left_end = render_column(doc, &plan.left, MARGIN, y, col_w)?;
    let right_end = render_column(doc, &plan.right, MARGIN + col_w + COLUMN_GUTTER, y, col_w)?;
    log::debug!("overview columns end at {left_end:.0} / {right_end:.0}");
    Ok(())
}
