//! Report-to-page planning. Reports are flattened into renderable blocks,
//! then packed onto pages by a character-weight budget so the renderer never
//! has to break a block across a page boundary.

use crate::report::models::{ClientReport, HighlightPoints, PractitionerReport};

/// Rough per-page content budget, in weighted characters. The client report
/// runs lighter per block (question prose) than the practitioner report
/// (tables, phase groups), hence the distinct budgets.
pub const CLIENT_PAGE_CHAR_BUDGET: usize = 3200;
pub const PRACTITIONER_PAGE_CHAR_BUDGET: usize = 2400;

/// Fixed per-block overhead standing in for headings, spacing and separators.
const BLOCK_OVERHEAD: usize = 160;
const ITEM_OVERHEAD: usize = 30;

// ────────────────────────────────────────────────────────────────────────────
// Blocks
// ────────────────────────────────────────────────────────────────────────────

/// One renderable unit. Blocks are atomic: pagination places each block on
/// exactly one page.
#[derive(Debug, Clone)]
pub enum Block {
    Title {
        text: String,
        subtitle: Option<String>,
    },
    Question {
        title: String,
        client_response: String,
        insights: Vec<String>,
    },
    Highlight {
        title: String,
        content: String,
        /// `(Some(name), description)` for named tool points, `(None, text)`
        /// for plain bullets.
        points: Vec<(Option<String>, String)>,
        closing: String,
    },
    Section {
        title: String,
        content: Option<String>,
        sub_title: Option<String>,
        reason: Option<String>,
        primary_objective: Option<String>,
        items: Vec<String>,
    },
    PhaseGroup {
        title: String,
        phases: Vec<PhaseEntry>,
    },
    MilestoneTable(Vec<MilestoneRow>),
    Closing(String),
}

#[derive(Debug, Clone)]
pub struct PhaseEntry {
    pub title: String,
    pub focus: String,
    pub tools: String,
    pub goal: String,
}

#[derive(Debug, Clone)]
pub struct MilestoneRow {
    pub milestone: String,
    pub target_week: String,
    pub tools_and_focus: String,
}

// ────────────────────────────────────────────────────────────────────────────
// Flattening
// ────────────────────────────────────────────────────────────────────────────

pub fn client_blocks(report: &ClientReport, first_name: &str) -> Vec<Block> {
    let mut blocks = vec![Block::Title {
        text: format!("Client Assessment Report for {first_name}"),
        subtitle: Some("Prepared by DreamScape AI".to_string()),
    }];

    for insight in &report.question_section {
        blocks.push(Block::Question {
            title: insight.title.clone(),
            client_response: insight.client_response.clone(),
            insights: insight.ai_insights.clone(),
        });
    }

    let highlight = &report.highlight_section;
    let points = match &highlight.points {
        Some(HighlightPoints::Named(map)) => map
            .iter()
            .map(|(k, v)| (Some(k.clone()), v.clone()))
            .collect(),
        Some(HighlightPoints::Plain(list)) => {
            list.iter().map(|p| (None, p.clone())).collect()
        }
        None => Vec::new(),
    };
    blocks.push(Block::Highlight {
        title: highlight.title.clone(),
        content: highlight.content.clone(),
        points,
        closing: highlight.closing_statement.clone(),
    });

    blocks
}

pub fn practitioner_blocks(report: &PractitionerReport, first_name: &str) -> Vec<Block> {
    let mut blocks = vec![Block::Title {
        text: format!("Practitioner Case Report: {first_name}"),
        subtitle: None,
    }];

    // Summary first, phase groups after the plain sections, source order
    // otherwise.
    let is_summary = |title: &str| title.contains("Summary");

    for section in report.sections.iter().filter(|s| is_summary(&s.title)) {
        blocks.push(section_block(section));
    }
    for section in report
        .sections
        .iter()
        .filter(|s| !is_summary(&s.title) && s.phases.is_empty())
    {
        blocks.push(section_block(section));
    }
    for section in report.sections.iter().filter(|s| !s.phases.is_empty()) {
        blocks.push(Block::PhaseGroup {
            title: section.title.clone(),
            phases: section
                .phases
                .iter()
                .map(|p| PhaseEntry {
                    title: p.title.clone(),
                    focus: p.items.focus.clone(),
                    tools: p.items.tools.clone(),
                    goal: p.items.goal.clone(),
                })
                .collect(),
        });
    }

    if !report.milestones.is_empty() {
        blocks.push(Block::MilestoneTable(
            report
                .milestones
                .iter()
                .map(|m| MilestoneRow {
                    milestone: m.milestone.clone(),
                    target_week: m.target_week.clone(),
                    tools_and_focus: m.tools_and_focus.clone(),
                })
                .collect(),
        ));
    }

    if !report.projected_transformation_outcomes.is_empty() {
        blocks.push(Block::Section {
            title: "Projected Transformation Outcomes".to_string(),
            content: None,
            sub_title: None,
            reason: None,
            primary_objective: None,
            items: report.projected_transformation_outcomes.clone(),
        });
    }

    if let Some(notes) = &report.practitioner_notes {
        blocks.push(Block::Section {
            title: "Practitioner Notes".to_string(),
            content: Some(notes.temperament.clone()),
            sub_title: None,
            reason: None,
            primary_objective: None,
            items: notes.best_practices.clone(),
        });
    }

    if !report.closing_statement.is_empty() {
        blocks.push(Block::Closing(report.closing_statement.clone()));
    }

    blocks
}

fn section_block(section: &crate::report::models::ReportSection) -> Block {
    Block::Section {
        title: section.title.clone(),
        content: section.content.clone(),
        sub_title: section.sub_title.clone(),
        reason: section.reason.clone(),
        primary_objective: section.primary_objective.clone(),
        items: section.items.clone(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Pagination
// ────────────────────────────────────────────────────────────────────────────

/// Weighted character cost of a block, used as a proxy for rendered height.
pub fn block_weight(block: &Block) -> usize {
    match block {
        Block::Title { text, subtitle } => {
            BLOCK_OVERHEAD + text.len() + subtitle.as_deref().map_or(0, str::len)
        }
        Block::Question {
            title,
            client_response,
            insights,
        } => {
            BLOCK_OVERHEAD
                + title.len()
                + client_response.len()
                + insights.iter().map(|i| i.len() + ITEM_OVERHEAD).sum::<usize>()
        }
        Block::Highlight {
            title,
            content,
            points,
            closing,
        } => {
            BLOCK_OVERHEAD
                + title.len()
                + content.len()
                + closing.len()
                + points
                    .iter()
                    .map(|(k, v)| k.as_deref().map_or(0, str::len) + v.len() + ITEM_OVERHEAD)
                    .sum::<usize>()
        }
        Block::Section {
            title,
            content,
            sub_title,
            reason,
            primary_objective,
            items,
        } => {
            BLOCK_OVERHEAD
                + title.len()
                + content.as_deref().map_or(0, str::len)
                + sub_title.as_deref().map_or(0, str::len)
                + reason.as_deref().map_or(0, str::len)
                + primary_objective.as_deref().map_or(0, str::len)
                + items.iter().map(|i| i.len() + ITEM_OVERHEAD).sum::<usize>()
        }
        Block::PhaseGroup { title, phases } => {
            BLOCK_OVERHEAD
                + title.len()
                + phases
                    .iter()
                    .map(|p| {
                        p.title.len() + p.focus.len() + p.tools.len() + p.goal.len() + 3 * ITEM_OVERHEAD
                    })
                    .sum::<usize>()
        }
        Block::MilestoneTable(rows) => {
            BLOCK_OVERHEAD
                + rows
                    .iter()
                    .map(|r| {
                        r.milestone.len()
                            + r.target_week.len()
                            + r.tools_and_focus.len()
                            + 2 * ITEM_OVERHEAD
                    })
                    .sum::<usize>()
        }
        Block::Closing(text) => BLOCK_OVERHEAD + text.len(),
    }
}

/// Greedy first-fit packing. A block heavier than the whole budget still gets
/// a page to itself; nothing is ever split.
pub fn paginate(blocks: Vec<Block>, budget: usize) -> Vec<Vec<Block>> {
    let mut pages: Vec<Vec<Block>> = Vec::new();
    let mut current: Vec<Block> = Vec::new();
    let mut used = 0usize;

    for block in blocks {
        let weight = block_weight(&block);
        if !current.is_empty() && used + weight > budget {
            pages.push(std::mem::take(&mut current));
            used = 0;
        }
        used += weight;
        current.push(block);
    }
    if !current.is_empty() {
        pages.push(current);
    }
    if pages.is_empty() {
        pages.push(Vec::new());
    }
    pages
}
