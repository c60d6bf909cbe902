//! Deal memo rendering: fills a pre-authored .docx template with a merged
//! [`DealMemoRecord`].
//!
//! The template is an ordinary .docx whose body text carries `{{field_name}}`
//! placeholders. Rendering rewrites `word/document.xml` inside the archive
//! and copies every other entry through unchanged. The template is read-only
//! and held in memory, so one [`MemoTemplate`] may serve concurrent renders.

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use dealmemo_core::DealMemoRecord;
use thiserror::Error;
use tracing::info;
use zip::write::SimpleFileOptions;
use zip::{ZipArchive, ZipWriter};

/// Built-in template location, overridable by configuration.
pub const DEFAULT_TEMPLATE_PATH: &str = "templates/deal_memo_template.docx";

const DOCUMENT_ENTRY: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("deal memo template not found at: {0}")]
    TemplateNotFound(PathBuf),
    #[error("template archive error: {0}")]
    Archive(#[from] zip::result::ZipError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// A pre-authored .docx template held in memory.
#[derive(Debug, Clone)]
pub struct MemoTemplate {
    bytes: Vec<u8>,
}

impl MemoTemplate {
    /// Load the template from disk, failing with
    /// [`RenderError::TemplateNotFound`] when the path does not resolve to a
    /// readable file.
    pub fn open(path: &Path) -> Result<Self, RenderError> {
        info!(path = %path.display(), "loading deal memo template");
        let bytes = std::fs::read(path)
            .map_err(|_| RenderError::TemplateNotFound(path.to_path_buf()))?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    /// Fill the template with `record`, producing complete .docx bytes ready
    /// for transport.
    ///
    /// A placeholder whose key is missing from the record renders as the
    /// empty string; rendering never fails on record contents.
    pub fn render(&self, record: &DealMemoRecord) -> Result<Vec<u8>, RenderError> {
        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();

        info!(fields = record.len(), "rendering deal memo");

        for index in 0..archive.len() {
            let mut entry = archive.by_index(index)?;
            let name = entry.name().to_string();

            if entry.is_dir() {
                writer.add_directory(name, options)?;
                continue;
            }

            if name == DOCUMENT_ENTRY {
                let mut xml = String::new();
                entry.read_to_string(&mut xml)?;
                writer.start_file(name, options)?;
                writer.write_all(fill_placeholders(&xml, record).as_bytes())?;
            } else {
                let mut raw = Vec::new();
                entry.read_to_end(&mut raw)?;
                writer.start_file(name, options)?;
                writer.write_all(&raw)?;
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Substitute every `{{key}}` placeholder with the XML-escaped record value,
/// or the empty string when the key is missing. An unterminated `{{` passes
/// through verbatim.
pub fn fill_placeholders(xml: &str, record: &DealMemoRecord) -> String {
    let mut out = String::with_capacity(xml.len());
    let mut rest = xml;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = after[..end].trim();
                let value = record.get(key).unwrap_or("");
                out.push_str(&quick_xml::escape::escape(value));
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

/// Suggested download filename, derived from the vendor field.
pub fn suggested_filename(record: &DealMemoRecord) -> String {
    let vendor = record
        .get("vendor_name")
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("Document");
    format!("Deal_Memo_{vendor}.docx")
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};

    fn record(entries: &[(&str, &str)]) -> DealMemoRecord {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn template_bytes(body: &str) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text(body)))
            .build()
            .pack(&mut cursor)
            .unwrap();
        cursor.into_inner()
    }

    fn document_xml(docx_bytes: &[u8]) -> String {
        let mut archive = ZipArchive::new(Cursor::new(docx_bytes)).unwrap();
        let mut xml = String::new();
        archive
            .by_name(DOCUMENT_ENTRY)
            .unwrap()
            .read_to_string(&mut xml)
            .unwrap();
        xml
    }

    #[test]
    fn fill_substitutes_known_keys() {
        let rec = record(&[("vendor_name", "Acme Corp"), ("total_cost", "$10,000")]);
        let out = fill_placeholders("Vendor {{vendor_name}} at {{total_cost}}", &rec);
        assert_eq!(out, "Vendor Acme Corp at $10,000");
    }

    #[test]
    fn fill_missing_key_becomes_empty_string() {
        let rec = record(&[]);
        let out = fill_placeholders("<w:t>{{vendor_name}}</w:t>", &rec);
        assert_eq!(out, "<w:t></w:t>");
    }

    #[test]
    fn fill_escapes_xml_special_characters() {
        let rec = record(&[("vendor_name", "Smith & Sons <LLC>")]);
        let out = fill_placeholders("{{vendor_name}}", &rec);
        assert_eq!(out, "Smith &amp; Sons &lt;LLC&gt;");
    }

    #[test]
    fn fill_leaves_unterminated_braces_alone() {
        let rec = record(&[("vendor_name", "Acme")]);
        let out = fill_placeholders("{{vendor_name}} and {{broken", &rec);
        assert_eq!(out, "Acme and {{broken");
    }

    #[test]
    fn open_missing_template_fails_without_bytes() {
        let err = MemoTemplate::open(Path::new("/nonexistent/deal_memo_template.docx"))
            .map(|_| ())
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }

    #[test]
    fn open_unreadable_path_is_template_not_found() {
        // A directory exists but cannot be read as a template file.
        let dir = tempfile::tempdir().unwrap();
        let err = MemoTemplate::open(dir.path()).map(|_| ()).unwrap_err();
        assert!(matches!(err, RenderError::TemplateNotFound(_)));
    }

    #[test]
    fn open_reads_template_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("template.docx");
        std::fs::write(&path, template_bytes("{{vendor_name}}")).unwrap();

        let template = MemoTemplate::open(&path).unwrap();
        let rendered = template.render(&record(&[("vendor_name", "Acme")])).unwrap();
        assert!(document_xml(&rendered).contains("Acme"));
    }

    #[test]
    fn render_replaces_placeholders_in_document_xml() {
        let template = MemoTemplate::from_bytes(template_bytes(
            "Deal with {{vendor_name}} for {{total_cost}} ({{payment_terms}})",
        ));
        let rec = record(&[
            ("vendor_name", "Acme Corp"),
            ("total_cost", "$10,000"),
            ("payment_terms", "Net 30"),
        ]);

        let rendered = template.render(&rec).unwrap();
        let xml = document_xml(&rendered);

        assert!(xml.contains("Deal with Acme Corp for $10,000 (Net 30)"));
        assert!(!xml.contains("{{vendor_name}}"));
    }

    #[test]
    fn render_preserves_other_archive_entries() {
        let template_bytes = template_bytes("{{vendor_name}}");
        let entry_count = ZipArchive::new(Cursor::new(template_bytes.as_slice()))
            .unwrap()
            .len();

        let rendered = MemoTemplate::from_bytes(template_bytes)
            .render(&record(&[("vendor_name", "Acme")]))
            .unwrap();

        let mut archive = ZipArchive::new(Cursor::new(rendered.as_slice())).unwrap();
        assert_eq!(archive.len(), entry_count);
        assert!(archive.by_name("[Content_Types].xml").is_ok());
    }

    #[test]
    fn render_with_missing_record_key_never_fails() {
        let template = MemoTemplate::from_bytes(template_bytes("{{deal_owner}} owns this"));
        let rendered = template.render(&DealMemoRecord::default()).unwrap();
        assert!(document_xml(&rendered).contains(" owns this"));
    }

    #[test]
    fn suggested_filename_from_vendor() {
        let rec = record(&[("vendor_name", "Acme Corp")]);
        assert_eq!(suggested_filename(&rec), "Deal_Memo_Acme Corp.docx");
    }

    #[test]
    fn suggested_filename_fallback() {
        assert_eq!(
            suggested_filename(&DealMemoRecord::default()),
            "Deal_Memo_Document.docx"
        );
        let blank = record(&[("vendor_name", "   ")]);
        assert_eq!(suggested_filename(&blank), "Deal_Memo_Document.docx");
    }
}
