//! Page layout and PDF serialization.
//!
//! Blocks are laid out top to bottom on A4 pages. A block that does not
//! fit on the remaining space starts a new page; paragraphs break between
//! lines and tables between rows.

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, Stream, StringFormat, dictionary};

use super::text::{text_width, win_ansi, wrap};
use super::{Block, RenderError, Table};

const PAGE_WIDTH: f32 = 595.28;
const PAGE_HEIGHT: f32 = 841.89;
const MARGIN: f32 = 56.69;
const CONTENT_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;
const CONTENT_TOP: f32 = PAGE_HEIGHT - MARGIN;
const CONTENT_BOTTOM: f32 = MARGIN;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

const CELL_SIZE: f32 = 9.0;
const CELL_LEADING: f32 = 11.0;
const CELL_PADDING: f32 = 4.0;

const GRID_GREY: f32 = 0.83;
const HEADER_GREY: f32 = 0.96;
const CAPTION_GREY: f32 = 0.5;

/// Font settings for one kind of text block.
#[derive(Debug, Clone, Copy)]
struct TextStyle {
    size: f32,
    leading: f32,
    bold: bool,
    space_before: f32,
    space_after: f32,
    grey: f32,
}

const TITLE: TextStyle = TextStyle {
    size: 18.0,
    leading: 22.0,
    bold: true,
    space_before: 0.0,
    space_after: 12.0,
    grey: 0.0,
};
const HEADING: TextStyle = TextStyle {
    size: 14.0,
    leading: 18.0,
    bold: true,
    space_before: 18.0,
    space_after: 8.0,
    grey: 0.0,
};
const SUBHEADING: TextStyle = TextStyle {
    size: 12.0,
    leading: 15.0,
    bold: true,
    space_before: 10.0,
    space_after: 4.0,
    grey: 0.0,
};
const BODY: TextStyle = TextStyle {
    size: 10.0,
    leading: 14.0,
    bold: false,
    space_before: 0.0,
    space_after: 6.0,
    grey: 0.0,
};
const CAPTION: TextStyle = TextStyle {
    size: 9.0,
    leading: 11.0,
    bold: false,
    space_before: 0.0,
    space_after: 4.0,
    grey: CAPTION_GREY,
};

/// Indent applied to bullet text after the bullet glyph.
const BULLET_INDENT: f32 = 12.0;

fn font(bold: bool) -> &'static str {
    if bold { BOLD } else { REGULAR }
}

/// Accumulates drawing operations page by page.
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    ops: Vec<Operation>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: Vec::new(),
            ops: Vec::new(),
            y: CONTENT_TOP,
        }
    }

    fn at_page_top(&self) -> bool {
        self.y >= CONTENT_TOP
    }

    fn new_page(&mut self) {
        self.pages.push(std::mem::take(&mut self.ops));
        self.y = CONTENT_TOP;
    }

    /// Start a new page unless `height` still fits below the cursor.
    fn ensure_space(&mut self, height: f32) {
        if self.y - height < CONTENT_BOTTOM && !self.at_page_top() {
            self.new_page();
        }
    }

    /// Vertical gap; swallowed at the top of a page.
    fn skip(&mut self, height: f32) {
        if !self.at_page_top() {
            self.y = (self.y - height).max(CONTENT_BOTTOM);
        }
    }

    fn text(&mut self, x: f32, baseline: f32, text: &str, size: f32, bold: bool, grey: f32) {
        self.ops.extend([
            Operation::new("rg", vec![grey.into(), grey.into(), grey.into()]),
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font(bold).into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new(
                "Tj",
                vec![Object::String(win_ansi(text), StringFormat::Literal)],
            ),
            Operation::new("ET", vec![]),
        ]);
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, grey: f32) {
        self.ops.extend([
            Operation::new("rg", vec![grey.into(), grey.into(), grey.into()]),
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("f", vec![]),
        ]);
    }

    fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.ops.extend([
            Operation::new("w", vec![0.5f32.into()]),
            Operation::new("RG", vec![GRID_GREY.into(), GRID_GREY.into(), GRID_GREY.into()]),
            Operation::new("re", vec![x.into(), y.into(), w.into(), h.into()]),
            Operation::new("S", vec![]),
        ]);
    }

    fn lines(&mut self, lines: &[String], style: TextStyle, indent: f32) {
        for line in lines {
            self.ensure_space(style.leading);
            let baseline = self.y - style.size;
            self.text(MARGIN + indent, baseline, line, style.size, style.bold, style.grey);
            self.y -= style.leading;
        }
    }

    fn styled(&mut self, text: &str, style: TextStyle) {
        let lines = wrap(text, style.size, style.bold, CONTENT_WIDTH);
        if lines.is_empty() {
            return;
        }
        self.skip(style.space_before);
        // Keep a heading together with at least the first line after it.
        self.ensure_space(style.leading * lines.len().min(2) as f32);
        self.lines(&lines, style, 0.0);
        self.skip(style.space_after);
    }

    fn bullet(&mut self, text: &str) {
        let lines = wrap(text, BODY.size, false, CONTENT_WIDTH - BULLET_INDENT);
        if lines.is_empty() {
            return;
        }
        self.ensure_space(BODY.leading);
        let baseline = self.y - BODY.size;
        self.text(MARGIN, baseline, "•", BODY.size, false, 0.0);
        self.lines(&lines, BODY, BULLET_INDENT);
        self.skip(BODY.space_after);
    }

    fn table(&mut self, table: &Table) -> Result<(), RenderError> {
        let columns = table.column_fractions.len();
        let widths: Vec<f32> = table
            .column_fractions
            .iter()
            .map(|f| f * CONTENT_WIDTH)
            .collect();

        for (index, row) in table.rows.iter().enumerate() {
            if row.len() != columns {
                return Err(RenderError::ColumnMismatch {
                    row: index,
                    expected: columns,
                    found: row.len(),
                });
            }

            let is_header = table.header && index == 0;
            let cells: Vec<Vec<String>> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| wrap(cell, CELL_SIZE, is_header, width - 2.0 * CELL_PADDING))
                .collect();
            let line_count = cells.iter().map(Vec::len).max().unwrap_or(0).max(1);
            let height = line_count as f32 * CELL_LEADING + 2.0 * CELL_PADDING;

            if height > CONTENT_TOP - CONTENT_BOTTOM {
                return Err(RenderError::RowTooTall { row: index, height });
            }
            self.ensure_space(height);

            let bottom = self.y - height;
            if is_header {
                self.fill_rect(MARGIN, bottom, CONTENT_WIDTH, height, HEADER_GREY);
            }

            let mut x = MARGIN;
            for (lines, width) in cells.iter().zip(&widths) {
                let mut baseline = self.y - CELL_PADDING - CELL_SIZE;
                for line in lines {
                    self.text(x + CELL_PADDING, baseline, line, CELL_SIZE, is_header, 0.0);
                    baseline -= CELL_LEADING;
                }
                self.stroke_rect(x, bottom, *width, height);
                x += width;
            }
            self.y = bottom;
        }
        Ok(())
    }

    fn block(&mut self, block: &Block) -> Result<(), RenderError> {
        match block {
            Block::Title(text) => self.styled(text, TITLE),
            Block::Heading(text) => self.styled(text, HEADING),
            Block::Subheading(text) => self.styled(text, SUBHEADING),
            Block::Paragraph(text) => self.styled(text, BODY),
            Block::Caption(text) => self.styled(text, CAPTION),
            Block::Bullet(text) => self.bullet(text),
            Block::Table(table) => {
                self.table(table)?;
                self.skip(BODY.space_after);
            }
            Block::Spacer(height) => self.skip(*height),
        }
        Ok(())
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        if !self.ops.is_empty() || self.pages.is_empty() {
            self.new_page();
        }
        self.pages
    }
}

fn footer(page: usize, total: usize) -> Vec<Operation> {
    let label = format!("Página {page} de {total}");
    let x = PAGE_WIDTH - MARGIN - text_width(&label, CAPTION.size, false);
    let baseline = CONTENT_BOTTOM / 2.0;
    vec![
        Operation::new("rg", vec![CAPTION_GREY.into(), CAPTION_GREY.into(), CAPTION_GREY.into()]),
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![REGULAR.into(), CAPTION.size.into()]),
        Operation::new("Td", vec![x.into(), baseline.into()]),
        Operation::new(
            "Tj",
            vec![Object::String(win_ansi(&label), StringFormat::Literal)],
        ),
        Operation::new("ET", vec![]),
    ]
}

/// Lay out `blocks` and serialize the pages into PDF bytes.
pub(super) fn write_pdf(blocks: &[Block], title: &str) -> Result<Vec<u8>, RenderError> {
    let mut writer = PageWriter::new();
    for block in blocks {
        writer.block(block)?;
    }
    let pages = writer.finish();
    let total = pages.len();

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(total);
    for (index, mut operations) in pages.into_iter().enumerate() {
        operations.extend(footer(index + 1, total));
        let content = Content { operations };
        let encoded = content
            .encode()
            .map_err(|e| RenderError::Pdf(format!("encoding page {}: {e}", index + 1)))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => total as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    let info_id = doc.add_object(dictionary! {
        "Title" => Object::String(win_ansi(title), StringFormat::Literal),
        "Producer" => Object::string_literal("itinera"),
    });
    doc.trailer.set("Root", catalog_id);
    doc.trailer.set("Info", info_id);
    doc.compress();

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| RenderError::Pdf(format!("writing document: {e}")))?;
    Ok(bytes)
}
