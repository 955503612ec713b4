//! PDF rendering of a [`Plan`].
//!
//! Rendering happens in two steps: [`layout`] turns the plan into an ordered
//! list of [`Block`]s, and the PDF writer places those blocks on pages.
//! Both are pure functions of the plan.

mod pdf;
mod text;

use thiserror::Error;

use crate::model::Plan;

/// Document title stored in the PDF metadata.
pub const DOCUMENT_TITLE: &str = "Itinerario de viaje";

pub const HEADING_TITLE: &str = "Plan Maestro de Viaje";
pub const HEADING_SUMMARY: &str = "Resumen ejecutivo";
pub const HEADING_AGENDA: &str = "Agenda día por día";
pub const HEADING_RECOMMENDATIONS: &str = "Recomendaciones estratégicas";
pub const HEADING_ATTACHMENTS: &str = "Documentos recibidos";

const EXECUTIVE_SUMMARY: &str = "Este documento reúne un programa integral con experiencias personalizadas, logística minuciosa y recomendaciones premium para garantizar un viaje impecable.";

/// Errors that abort rendering. No partial document is produced.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("table row {row} has {found} cells, expected {expected}")]
    ColumnMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("table row {row} is {height:.0}pt tall and cannot fit on a page")]
    RowTooTall { row: usize, height: f32 },

    #[error("pdf error: {0}")]
    Pdf(String),
}

/// A table whose column widths are fractions of the usable page width.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub column_fractions: Vec<f32>,
    pub rows: Vec<Vec<String>>,
    /// Shade and embolden the first row.
    pub header: bool,
}

/// One element of the document story.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Title(String),
    Heading(String),
    Subheading(String),
    Paragraph(String),
    /// Small grey text.
    Caption(String),
    Bullet(String),
    Table(Table),
    /// Vertical gap in points.
    Spacer(f32),
}

/// Build the document story for `plan`.
pub fn layout(plan: &Plan) -> Vec<Block> {
    let mut story = Vec::new();
    header(plan, &mut story);
    agenda(plan, &mut story);
    recommendations(plan, &mut story);
    attachments(plan, &mut story);
    story
}

/// Render `plan` as PDF bytes.
pub fn render(plan: &Plan) -> Result<Vec<u8>, RenderError> {
    let story = layout(plan);
    let bytes = pdf::write_pdf(&story, DOCUMENT_TITLE)?;
    tracing::debug!(
        client = %plan.client.name,
        blocks = story.len(),
        bytes = bytes.len(),
        "rendered plan"
    );
    Ok(bytes)
}

fn header(plan: &Plan, story: &mut Vec<Block>) {
    let client = &plan.client;
    let trip = &plan.trip;
    let requests = if client.special_requests.is_empty() {
        "N/A".to_owned()
    } else {
        client.special_requests.clone()
    };

    story.push(Block::Title(HEADING_TITLE.to_owned()));
    story.push(Block::Table(Table {
        column_fractions: vec![0.16, 0.34, 0.16, 0.34],
        rows: vec![
            vec![
                "Cliente".to_owned(),
                client.name.clone(),
                "Estilo".to_owned(),
                client.style.clone(),
            ],
            vec![
                "Destino".to_owned(),
                trip.destination.clone(),
                "Duración".to_owned(),
                format!("{} noches", trip.nights),
            ],
            vec![
                "Fechas".to_owned(),
                format!("{} - {}", trip.start_date, trip.end_date),
                "Peticiones".to_owned(),
                requests,
            ],
        ],
        header: true,
    }));
    story.push(Block::Spacer(12.0));
    story.push(Block::Heading(HEADING_SUMMARY.to_owned()));
    story.push(Block::Paragraph(EXECUTIVE_SUMMARY.to_owned()));
}

fn agenda(plan: &Plan, story: &mut Vec<Block>) {
    story.push(Block::Heading(HEADING_AGENDA.to_owned()));
    for day in &plan.days {
        story.push(Block::Subheading(day.title.clone()));
        story.push(Block::Caption(day.date.clone()));
        story.push(Block::Paragraph(day.summary.clone()));
        story.push(Block::Table(Table {
            column_fractions: vec![0.25, 0.75],
            rows: vec![
                vec!["Mañana".to_owned(), day.morning.clone()],
                vec!["Tarde".to_owned(), day.afternoon.clone()],
                vec!["Noche".to_owned(), day.evening.clone()],
            ],
            header: false,
        }));
        story.push(Block::Spacer(12.0));
    }
}

fn recommendations(plan: &Plan, story: &mut Vec<Block>) {
    story.push(Block::Heading(HEADING_RECOMMENDATIONS.to_owned()));
    for (category, items) in plan.recommendations.iter() {
        story.push(Block::Subheading(category.label().to_owned()));
        story.extend(items.iter().cloned().map(Block::Bullet));
    }
    story.push(Block::Spacer(12.0));
}

fn attachments(plan: &Plan, story: &mut Vec<Block>) {
    if plan.attachments.is_empty() {
        return;
    }

    let mut rows = vec![vec![
        "Archivo".to_owned(),
        "Tipo".to_owned(),
        "Notas".to_owned(),
    ]];
    rows.extend(plan.attachments.iter().map(|a| {
        vec![a.filename.clone(), a.content_type.clone(), a.notes.clone()]
    }));

    story.push(Block::Heading(HEADING_ATTACHMENTS.to_owned()));
    story.push(Block::Table(Table {
        column_fractions: vec![0.375, 0.25, 0.375],
        rows,
        header: true,
    }));
}
