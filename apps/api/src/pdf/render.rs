//! PDF Renderer — draws paginated report blocks onto A4 pages with printpdf.
//!
//! Every page carries the institute banner band at the top. Body text uses
//! the builtin Helvetica family; `™`/`®` are drawn as raised superscript runs
//! rather than inline glyphs the WinAnsi fonts would garble.

use std::io::BufWriter;

use printpdf::path::{PaintMode, WindingOrder};
use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Polygon, Rgb,
};
use thiserror::Error;

use crate::pdf::layout::{
    client_blocks, paginate, practitioner_blocks, Block, MilestoneRow, PhaseEntry,
    CLIENT_PAGE_CHAR_BUDGET, PRACTITIONER_PAGE_CHAR_BUDGET,
};
use crate::pdf::text::{clean_text, split_marks, text_width_mm, wrap_to_width, Seg, PT_TO_MM};

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const TEXT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const BANNER_HEIGHT: f32 = 28.0;
const CONTENT_TOP: f32 = PAGE_HEIGHT - BANNER_HEIGHT - 14.0;
const LINE_STEP: f32 = 5.2;

const BANNER_TITLE: &str = "DreamScape AI";
const BANNER_TAGLINE: &str = "Neuro Change Institute";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("font load failed: {0}")]
    Font(String),
    #[error("document write failed: {0}")]
    Save(String),
}

/// Renders the client report to PDF bytes.
pub fn render_client_pdf(
    report: &crate::report::models::ClientReport,
    first_name: &str,
) -> Result<Vec<u8>, RenderError> {
    let blocks = client_blocks(report, &clean_text(first_name));
    render_document("Client Assessment Report", blocks, CLIENT_PAGE_CHAR_BUDGET)
}

/// Renders the practitioner report to PDF bytes.
pub fn render_practitioner_pdf(
    report: &crate::report::models::PractitionerReport,
    first_name: &str,
) -> Result<Vec<u8>, RenderError> {
    let blocks = practitioner_blocks(report, &clean_text(first_name));
    render_document(
        "Practitioner Case Report",
        blocks,
        PRACTITIONER_PAGE_CHAR_BUDGET,
    )
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    oblique: IndirectFontRef,
}

fn render_document(
    doc_title: &str,
    blocks: Vec<Block>,
    budget: usize,
) -> Result<Vec<u8>, RenderError> {
    let (doc, page1, layer1) =
        PdfDocument::new(doc_title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
    let fonts = load_fonts(&doc)?;

    let pages = paginate(blocks, budget);
    for (i, page_blocks) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(page1).get_layer(layer1)
        } else {
            let (page, layer) = doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };

        let mut writer = PageWriter {
            layer,
            fonts: &fonts,
            y: CONTENT_TOP,
        };
        writer.draw_banner();
        for block in page_blocks {
            writer.draw_block(block);
        }
    }

    let mut buf = BufWriter::new(Vec::new());
    doc.save(&mut buf)
        .map_err(|e| RenderError::Save(e.to_string()))?;
    buf.into_inner().map_err(|e| RenderError::Save(e.to_string()))
}

fn load_fonts(doc: &PdfDocumentReference) -> Result<Fonts, RenderError> {
    Ok(Fonts {
        regular: doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| RenderError::Font(e.to_string()))?,
        bold: doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| RenderError::Font(e.to_string()))?,
        oblique: doc
            .add_builtin_font(BuiltinFont::HelveticaOblique)
            .map_err(|e| RenderError::Font(e.to_string()))?,
    })
}

struct PageWriter<'a> {
    layer: PdfLayerReference,
    fonts: &'a Fonts,
    y: f32,
}

impl PageWriter<'_> {
    fn draw_banner(&mut self) {
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.13, 0.12, 0.35, None)));
        let rect = vec![
            (Point::new(Mm(0.0), Mm(PAGE_HEIGHT)), false),
            (Point::new(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT)), false),
            (
                Point::new(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT - BANNER_HEIGHT)),
                false,
            ),
            (Point::new(Mm(0.0), Mm(PAGE_HEIGHT - BANNER_HEIGHT)), false),
        ];
        self.layer.add_polygon(Polygon {
            rings: vec![rect],
            mode: PaintMode::Fill,
            winding_order: WindingOrder::NonZero,
        });

        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(1.0, 1.0, 1.0, None)));
        self.layer.use_text(
            BANNER_TITLE,
            17.0,
            Mm(MARGIN),
            Mm(PAGE_HEIGHT - 14.0),
            &self.fonts.bold,
        );
        self.layer.use_text(
            BANNER_TAGLINE,
            9.0,
            Mm(MARGIN),
            Mm(PAGE_HEIGHT - 21.0),
            &self.fonts.regular,
        );
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(0.0, 0.0, 0.0, None)));
    }

    fn draw_block(&mut self, block: &Block) {
        match block {
            Block::Title { text, subtitle } => {
                self.marked_paragraph(text, 17.0, &FontKind::Bold, 0.0);
                if let Some(sub) = subtitle {
                    self.marked_paragraph(sub, 11.0, &FontKind::Oblique, 0.0);
                }
                self.divider();
            }
            Block::Question {
                title,
                client_response,
                insights,
            } => {
                self.marked_paragraph(title, 13.0, &FontKind::Bold, 0.0);
                self.labeled_paragraph("Client Response: ", client_response, &FontKind::Oblique, 4.0);
                self.gap(1.5);
                self.marked_paragraph(
                    "DreamScape AI Reflection:",
                    12.0,
                    &FontKind::Bold,
                    0.0,
                );
                for insight in insights {
                    self.marked_paragraph(insight, 11.0, &FontKind::Regular, 0.0);
                    self.gap(1.5);
                }
                self.divider();
            }
            Block::Highlight {
                title,
                content,
                points,
                closing,
            } => {
                self.marked_paragraph(title, 14.0, &FontKind::Bold, 0.0);
                if !content.is_empty() {
                    self.marked_paragraph(content, 11.0, &FontKind::Regular, 0.0);
                }
                for (name, description) in points {
                    match name {
                        Some(name) => self.labeled_paragraph(
                            &format!("{name}: "),
                            description,
                            &FontKind::Regular,
                            6.0,
                        ),
                        None => self.bullet(description),
                    }
                }
                if !closing.is_empty() {
                    self.gap(2.0);
                    self.marked_paragraph(closing, 11.0, &FontKind::Oblique, 0.0);
                }
            }
            Block::Section {
                title,
                content,
                sub_title,
                reason,
                primary_objective,
                items,
            } => {
                self.marked_paragraph(title, 14.0, &FontKind::Bold, 0.0);
                if let Some(sub) = sub_title {
                    self.marked_paragraph(sub, 12.0, &FontKind::Oblique, 0.0);
                }
                if let Some(content) = content {
                    self.marked_paragraph(content, 11.0, &FontKind::Regular, 0.0);
                }
                if let Some(reason) = reason {
                    self.marked_paragraph(reason, 11.0, &FontKind::Regular, 0.0);
                }
                if let Some(objective) = primary_objective {
                    self.gap(1.5);
                    self.marked_paragraph("Primary Objective:", 12.0, &FontKind::Bold, 0.0);
                    self.marked_paragraph(objective, 11.0, &FontKind::Regular, 0.0);
                }
                for item in items {
                    self.bullet(item);
                }
                self.divider();
            }
            Block::PhaseGroup { title, phases } => {
                self.marked_paragraph(title, 14.0, &FontKind::Bold, 0.0);
                for phase in phases {
                    self.draw_phase(phase);
                }
                self.divider();
            }
            Block::MilestoneTable(rows) => {
                self.marked_paragraph("12-Week Milestone Map", 14.0, &FontKind::Bold, 0.0);
                self.draw_milestone_table(rows);
                self.divider();
            }
            Block::Closing(text) => {
                self.marked_paragraph(text, 11.0, &FontKind::Oblique, 0.0);
            }
        }
        self.gap(3.0);
    }

    fn draw_phase(&mut self, phase: &PhaseEntry) {
        self.marked_paragraph(&phase.title, 12.0, &FontKind::Bold, 2.0);
        if !phase.focus.is_empty() {
            self.labeled_paragraph("Focus: ", &phase.focus, &FontKind::Regular, 8.0);
        }
        if !phase.tools.is_empty() {
            self.labeled_paragraph("Tools: ", &phase.tools, &FontKind::Regular, 8.0);
        }
        if !phase.goal.is_empty() {
            self.labeled_paragraph("Goal: ", &phase.goal, &FontKind::Regular, 8.0);
        }
        self.gap(2.0);
    }

    // Three fixed columns: Milestone | Target Week | Tools & Focus.
    fn draw_milestone_table(&mut self, rows: &[MilestoneRow]) {
        const COLS: [(f32, f32); 3] = [(MARGIN, 64.0), (90.0, 30.0), (124.0, 66.0)];
        const HEADERS: [&str; 3] = ["Milestone", "Target Week", "Tools & Focus"];
        const CELL_SIZE: f32 = 10.0;
        const ROW_STEP: f32 = 4.6;

        for (header, (x, _)) in HEADERS.iter().zip(COLS) {
            self.layer
                .use_text(*header, CELL_SIZE, Mm(x), Mm(self.y), &self.fonts.bold);
        }
        self.y -= 2.0;
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, 0.6);
        self.y -= ROW_STEP;

        for row in rows {
            let cells = [
                clean_text(&row.milestone),
                clean_text(&row.target_week),
                clean_text(&row.tools_and_focus),
            ];
            let wrapped: Vec<Vec<String>> = cells
                .iter()
                .zip(COLS)
                .map(|(cell, (_, width))| wrap_to_width(cell, CELL_SIZE, false, width))
                .collect();
            let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

            for (lines, (x, _)) in wrapped.iter().zip(COLS) {
                for (i, line) in lines.iter().enumerate() {
                    self.layer.use_text(
                        line,
                        CELL_SIZE,
                        Mm(x),
                        Mm(self.y - i as f32 * ROW_STEP),
                        &self.fonts.regular,
                    );
                }
            }
            self.y -= height as f32 * ROW_STEP + 1.0;
            self.rule(MARGIN, PAGE_WIDTH - MARGIN, 0.3);
            self.y -= ROW_STEP;
        }
    }

    /// Bold lead-in label followed by wrapped body text, indented.
    fn labeled_paragraph(&mut self, label: &str, body: &str, body_font: &FontKind, indent: f32) {
        let size = 11.0;
        let x = MARGIN + indent;
        let label_width = text_width_mm(label, size, true);
        self.layer
            .use_text(label, size, Mm(x), Mm(self.y), &self.fonts.bold);

        let body = clean_text(body);
        let first_width = TEXT_WIDTH - indent - label_width;
        let mut lines = wrap_to_width(&body, size, false, first_width);
        // Re-wrap the overflow to the full indented width.
        if lines.len() > 1 {
            let rest = lines.split_off(1).join(" ");
            lines.extend(wrap_to_width(&rest, size, false, TEXT_WIDTH - indent));
        }
        for (i, line) in lines.iter().enumerate() {
            let line_x = if i == 0 { x + label_width } else { x };
            self.draw_marked_line(line, size, line_x, body_font);
            self.y -= LINE_STEP;
        }
    }

    fn marked_paragraph(&mut self, text: &str, size: f32, font: &FontKind, indent: f32) {
        let cleaned = clean_text(text);
        let step = LINE_STEP * (size / 11.0).max(1.0);
        for line in wrap_to_width(&cleaned, size, matches!(font, FontKind::Bold), TEXT_WIDTH - indent) {
            self.draw_marked_line(&line, size, MARGIN + indent, font);
            self.y -= step;
        }
    }

    fn bullet(&mut self, text: &str) {
        let size = 11.0;
        self.layer
            .use_text("\u{2022}", size, Mm(MARGIN + 2.0), Mm(self.y), &self.fonts.bold);
        let cleaned = clean_text(text);
        for line in wrap_to_width(&cleaned, size, false, TEXT_WIDTH - 8.0) {
            self.draw_marked_line(&line, size, MARGIN + 8.0, &FontKind::Regular);
            self.y -= LINE_STEP;
        }
    }

    /// Draws one line, rendering `™`/`®` as raised superscript runs.
    fn draw_marked_line(&mut self, line: &str, size: f32, x0: f32, font: &FontKind) {
        let font_ref = match font {
            FontKind::Regular => &self.fonts.regular,
            FontKind::Bold => &self.fonts.bold,
            FontKind::Oblique => &self.fonts.oblique,
        };
        let bold = matches!(font, FontKind::Bold);
        let mut x = x0;
        for seg in split_marks(line) {
            match seg {
                Seg::Text(text) => {
                    self.layer
                        .use_text(&text, size, Mm(x), Mm(self.y), font_ref);
                    x += text_width_mm(&text, size, bold);
                }
                Seg::Trademark | Seg::Registered => {
                    let mark = if seg == Seg::Trademark { "TM" } else { "(R)" };
                    let small = size * 0.6;
                    let raise = size * 0.35 * PT_TO_MM;
                    self.layer.use_text(
                        mark,
                        small,
                        Mm(x),
                        Mm(self.y + raise),
                        &self.fonts.regular,
                    );
                    x += text_width_mm(mark, small, false);
                }
            }
        }
    }

    fn divider(&mut self) {
        self.gap(2.0);
        self.rule(MARGIN, PAGE_WIDTH - MARGIN, 0.4);
        self.gap(3.0);
    }

    fn rule(&mut self, x0: f32, x1: f32, thickness: f32) {
        self.layer
            .set_outline_color(Color::Rgb(Rgb::new(0.49, 0.49, 0.49, None)));
        self.layer.set_outline_thickness(thickness);
        self.layer.add_line(Line {
            points: vec![
                (Point::new(Mm(x0), Mm(self.y)), false),
                (Point::new(Mm(x1), Mm(self.y)), false),
            ],
            is_closed: false,
        });
    }

    fn gap(&mut self, mm: f32) {
        self.y -= mm;
    }
}

enum FontKind {
    Regular,
    Bold,
    Oblique,
}
