//! The fixed system directive sent with every extraction call.
//!
//! Built from the field schema so the two can never drift apart: every field
//! the schema promises to fill is enumerated here with its semantic
//! description and any canonical-value constraint.

use std::fmt::Write;

use dealmemo_core::FieldSchema;

const PREAMBLE: &str = "\
You are an expert at extracting structured deal information from business documents.
You will be given text extracted from a Statement of Work (SOW) and/or a contract/quote document.

Extract the following fields and return them as a JSON object. If a field is not found in the
documents, return an empty string for that field. Do NOT fabricate information.

Return all dates in MM-DD-YYYY format (e.g., 01-15-2026).

Required fields:
";

const OUTPUT_CONTRACT: &str = "\

Also return a \"confidence\" object with the same keys, where each value is a number between 0 and 1
indicating how confident you are that the extracted value is correct. Use 0.0 if the field was not
found in the documents.

Return your response as a JSON object with exactly two top-level keys: \"fields\" and \"confidence\".
";

/// Render the system directive for a schema.
pub fn build_directive(schema: &FieldSchema) -> String {
    let mut directive = String::from(PREAMBLE);

    for spec in schema.fields() {
        match spec.allowed {
            Some(allowed) => {
                let values = allowed
                    .iter()
                    .map(|v| format!("\"{v}\""))
                    .collect::<Vec<_>>()
                    .join(", ");
                let _ = writeln!(
                    directive,
                    "- {}: Must be one of: {}. Pick the closest match from the document.",
                    spec.name, values
                );
            }
            None => {
                let _ = writeln!(directive, "- {}: {}", spec.name, spec.description);
            }
        }
    }

    directive.push_str(OUTPUT_CONTRACT);
    directive
}
