//! DOCX text extraction: block-level paragraphs in order, then embedded
//! tables as pipe-delimited rows.

use docx_rs::{
    DocumentChild, Paragraph, ParagraphChild, RunChild, Table, TableCell, TableCellContent,
    TableChild, TableRowChild,
};

use crate::{join_row, ExtractError};

pub(crate) fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = docx_rs::read_docx(bytes)?;
    let mut parts: Vec<String> = Vec::new();

    for child in &docx.document.children {
        if let DocumentChild::Paragraph(p) = child {
            let text = paragraph_text(p);
            let text = text.trim();
            if !text.is_empty() {
                parts.push(text.to_string());
            }
        }
    }

    for child in &docx.document.children {
        if let DocumentChild::Table(table) = child {
            parts.extend(table_rows(table));
        }
    }

    Ok(parts.join("\n"))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut out = String::new();
    for child in &paragraph.children {
        if let ParagraphChild::Run(run) = child {
            for run_child in &run.children {
                if let RunChild::Text(text) = run_child {
                    out.push_str(&text.text);
                }
            }
        }
    }
    out
}

fn table_rows(table: &Table) -> Vec<String> {
    let mut rows = Vec::new();
    for child in &table.rows {
        let TableChild::TableRow(row) = child;
        let cells: Vec<String> = row
            .cells
            .iter()
            .map(|cell_child| {
                let TableRowChild::TableCell(cell) = cell_child;
                cell_text(cell)
            })
            .collect();
        if let Some(row_text) = join_row(&cells) {
            rows.push(row_text);
        }
    }
    rows
}

/// Cell text is its paragraphs joined with a space; nested tables are not
/// descended into.
fn cell_text(cell: &TableCell) -> String {
    let mut texts = Vec::new();
    for content in &cell.children {
        if let TableCellContent::Paragraph(p) = content {
            let text = paragraph_text(p);
            let text = text.trim();
            if !text.is_empty() {
                texts.push(text.to_string());
            }
        }
    }
    texts.join(" ")
}
