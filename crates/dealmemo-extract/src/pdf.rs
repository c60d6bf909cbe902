//! PDF text extraction via lopdf, page by page.
//!
//! Each page contributes its flowed text first, then any table-like rows
//! re-serialized as pipe-delimited cells. lopdf exposes no table geometry,
//! so rows are detected lexically: a line whose cells are separated by tabs
//! or runs of two-plus spaces is treated as a table row.

use lopdf::Document;
use tracing::debug;

use crate::{join_row, ExtractError};

pub(crate) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes)?;
    let mut parts: Vec<String> = Vec::new();

    // get_pages returns a BTreeMap, so iteration is already in page order.
    for (page_number, _) in doc.get_pages() {
        let text = match doc.extract_text(&[page_number]) {
            Ok(text) => text,
            Err(e) => {
                debug!(page = page_number, error = %e, "no extractable text on page");
                continue;
            }
        };

        let flowed = text.trim();
        if !flowed.is_empty() {
            parts.push(flowed.to_string());
        }

        parts.extend(table_rows(&text));
    }

    Ok(parts.join("\n"))
}

/// Detect table-like rows in a page's text, in source order.
fn table_rows(page_text: &str) -> Vec<String> {
    page_text.lines().filter_map(row_from_line).collect()
}

/// Split a line into cells on tabs or runs of two-plus spaces. A line is a
/// table row only when it yields at least two cells; single-gap prose lines
/// pass through as flowed text instead.
fn row_from_line(line: &str) -> Option<String> {
    let normalized = line.replace('\t', "  ");
    let cells: Vec<String> = normalized
        .split("  ")
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_string)
        .collect();

    if cells.len() < 2 {
        return None;
    }
    join_row(&cells)
}
