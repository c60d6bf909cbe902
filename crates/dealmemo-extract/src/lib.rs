//! Text extraction from uploaded deal documents.
//!
//! Converts a document's raw bytes, given a declared format, into plain text
//! with tabular content serialized as pipe-delimited rows. Output preserves
//! source order (pages top-to-bottom, paragraphs then tables), so the
//! reasoning backend keeps the surrounding context of each field mention.

mod docx;
mod pdf;

use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported document format: {0}")]
    UnsupportedFormat(String),
    #[error("PDF parse error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("DOCX parse error: {0}")]
    Docx(#[from] docx_rs::ReaderError),
}

/// Supported document families, derived from the filename extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    /// Derive the format tag from a filename extension (case-insensitive).
    /// The filename must carry a real `.ext` suffix; a bare `pdf` or `docx`
    /// with no dot is not an extension.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Some(Self::Pdf),
            "docx" => Some(Self::Docx),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Docx => "docx",
        }
    }
}

/// One uploaded document as supplied by the ingestion boundary. Transient:
/// created at ingestion, consumed once by extraction, then discarded.
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Upload slot label, e.g. `sow` or `contract`.
    pub label: String,
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl RawDocument {
    pub fn new(label: impl Into<String>, filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            label: label.into(),
            filename: filename.into(),
            bytes,
        }
    }

    /// The format tag for this document, or `UnsupportedFormat`.
    pub fn format(&self) -> Result<DocumentFormat, ExtractError> {
        DocumentFormat::from_filename(&self.filename)
            .ok_or_else(|| ExtractError::UnsupportedFormat(self.filename.clone()))
    }
}

/// Extract plain text from document bytes. Pure transformation: no network
/// or disk access beyond the input bytes.
pub fn extract_text(format: DocumentFormat, bytes: &[u8]) -> Result<String, ExtractError> {
    match format {
        DocumentFormat::Pdf => pdf::extract(bytes),
        DocumentFormat::Docx => docx::extract(bytes),
    }
}

/// Extract and concatenate several documents into one normalized text, each
/// introduced by a labeled separator, in input order. Documents that yield
/// no text are skipped.
pub fn normalize_documents(documents: &[RawDocument]) -> Result<String, ExtractError> {
    let mut sections = Vec::with_capacity(documents.len());

    for doc in documents {
        let format = doc.format()?;
        info!(label = %doc.label, filename = %doc.filename, format = format.as_str(), "extracting text");

        let text = extract_text(format, &doc.bytes)?;
        if text.trim().is_empty() {
            warn!(label = %doc.label, filename = %doc.filename, "document yielded no text");
            continue;
        }

        sections.push(format!(
            "--- {} ({}) ---\n{}",
            doc.label.to_uppercase(),
            doc.filename,
            text
        ));
    }

    Ok(sections.join("\n\n"))
}

/// Join table cells into a pipe-delimited row. Returns `None` when the row
/// is empty once the separators are stripped out, so rows of only empty
/// cells never pollute the output.
pub(crate) fn join_row(cells: &[String]) -> Option<String> {
    let row = cells.join(" | ");
    if row.replace('|', "").trim().is_empty() {
        None
    } else {
        Some(row)
    }
}
