//! Best-effort text extraction from uploaded attachments.
//!
//! Each upload is processed independently: a failure on one file becomes a
//! note on that file's [`AttachmentSummary`] and never aborts the batch.

#[cfg(feature = "pdf-text")]
mod pdf;

use thiserror::Error;

use crate::model::AttachmentSummary;

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_PDF: &str = "application/pdf";
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Filename used when the upload did not carry one.
pub const DEFAULT_FILENAME: &str = "documento";

/// Upper bound, in characters, for error notes.
pub const MAX_NOTE_CHARS: usize = 200;

const NOTE_TEXT_READ: &str = "Texto leído correctamente.";
const NOTE_PDF_READ: &str = "Texto extraído del PDF.";
const NOTE_NOT_PROCESSED: &str =
    "Formato no procesado automáticamente; se considerará para contexto general.";

/// Errors that can occur while reading a single attachment.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("{0}")]
    Pdf(String),
}

impl ExtractError {
    fn note(&self) -> String {
        let note = match self {
            Self::Pdf(msg) => format!("No se pudo leer el PDF: {msg}"),
        };
        note.chars().take(MAX_NOTE_CHARS).collect()
    }
}

// ---------------------------------------------------------------------------
// Upload handle
// ---------------------------------------------------------------------------

/// A buffered uploaded file with a read position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    filename: Option<String>,
    content_type: Option<String>,
    data: Vec<u8>,
    position: usize,
}

/// Media type without parameters, trimmed and lowercased:
/// `Text/Plain; charset=utf-8` becomes `text/plain`.
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

impl Upload {
    /// The declared content type is reduced to its [`mime_essence`].
    pub fn new(filename: Option<String>, content_type: Option<String>, data: Vec<u8>) -> Self {
        Self {
            filename,
            content_type: content_type.map(|ct| mime_essence(&ct)),
            data,
            position: 0,
        }
    }

    /// Filename, or [`DEFAULT_FILENAME`] when missing or blank.
    pub fn filename(&self) -> &str {
        match self.filename.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => DEFAULT_FILENAME,
        }
    }

    /// Declared content type, or [`OCTET_STREAM`] when missing or blank.
    pub fn content_type(&self) -> &str {
        match self.content_type.as_deref() {
            Some(ct) if !ct.is_empty() => ct,
            _ => OCTET_STREAM,
        }
    }

    /// Whether the upload carried a filename at all. Form submissions
    /// include an empty file part when nothing was selected.
    pub fn has_filename(&self) -> bool {
        self.filename.as_deref().is_some_and(|n| !n.is_empty())
    }

    pub fn position(&self) -> usize {
        self.position
    }

    /// Return the unread bytes and move the read position to the end.
    pub fn read_to_end(&mut self) -> &[u8] {
        let start = self.position;
        self.position = self.data.len();
        &self.data[start..]
    }

    /// Reset the read position to the beginning.
    pub fn rewind(&mut self) {
        self.position = 0;
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

/// Outcome of reading one attachment successfully.
#[derive(Debug)]
enum Extracted {
    /// Decoded text with the note describing how it was obtained.
    Fragments(Vec<String>, &'static str),
    /// Pages read before a later page failed.
    #[cfg_attr(not(feature = "pdf-text"), allow(dead_code))]
    Partial(Vec<String>, ExtractError),
    /// Nothing could be read automatically.
    NotProcessed,
}

fn extract_one(upload: &mut Upload) -> Result<Extracted, ExtractError> {
    let content_type = upload.content_type().to_owned();
    match content_type.as_str() {
        TEXT_PLAIN => {
            let body = String::from_utf8_lossy(upload.read_to_end()).into_owned();
            Ok(Extracted::Fragments(vec![body], NOTE_TEXT_READ))
        }
        #[cfg(feature = "pdf-text")]
        APPLICATION_PDF => {
            let result = pdf::read_pages(upload.read_to_end());
            upload.rewind();
            match result? {
                (pages, None) => Ok(Extracted::Fragments(pages, NOTE_PDF_READ)),
                (pages, Some(err)) => Ok(Extracted::Partial(pages, err)),
            }
        }
        _ => Ok(Extracted::NotProcessed),
    }
}

/// Extract text from every upload, in order.
///
/// Returns the text fragments joined with `\n` and one summary per upload.
pub fn extract(uploads: &mut [Upload]) -> (String, Vec<AttachmentSummary>) {
    let mut fragments: Vec<String> = Vec::new();
    let mut summaries = Vec::with_capacity(uploads.len());

    for upload in uploads.iter_mut() {
        let notes = match extract_one(upload) {
            Ok(Extracted::Fragments(texts, note)) => {
                fragments.extend(texts);
                note.to_owned()
            }
            Ok(Extracted::Partial(texts, err)) => {
                tracing::warn!(
                    filename = upload.filename(),
                    pages = texts.len(),
                    error = %err,
                    "attachment only partially read"
                );
                fragments.extend(texts);
                err.note()
            }
            Ok(Extracted::NotProcessed) => NOTE_NOT_PROCESSED.to_owned(),
            Err(err) => {
                tracing::warn!(filename = upload.filename(), error = %err, "attachment could not be read");
                err.note()
            }
        };

        tracing::debug!(
            filename = upload.filename(),
            content_type = upload.content_type(),
            bytes = upload.len(),
            "processed attachment"
        );

        summaries.push(AttachmentSummary {
            filename: upload.filename().to_owned(),
            content_type: upload.content_type().to_owned(),
            notes,
        });
    }

    (fragments.join("\n"), summaries)
}
