//! The closed field schema the extraction pipeline promises to fill.
//!
//! A [`FieldSchema`] is the contract between the reasoning backend and the
//! rest of the pipeline: an ordered list of field names, each with a semantic
//! description and, where applicable, a canonical value set. Reconciling
//! arbitrary backend output against the schema happens in one place,
//! [`FieldSchema::project`], so the "every key present, no extras" invariant
//! is enforced and testable in isolation.

use serde_json::{Map, Value};

use crate::record::ExtractionResult;

/// Canonical payment terms the backend must choose between.
pub const PAYMENT_TERMS: &[&str] = &["Net 30", "Net 60", "When Invoiced", "Cash on Delivery"];

/// One extractable field: its key, what it means, and (optionally) the
/// canonical values the backend must pick from.
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub allowed: Option<&'static [&'static str]>,
}

const fn field(name: &'static str, description: &'static str) -> FieldSpec {
    FieldSpec {
        name,
        description,
        allowed: None,
    }
}

const fn constrained(
    name: &'static str,
    description: &'static str,
    allowed: &'static [&'static str],
) -> FieldSpec {
    FieldSpec {
        name,
        description,
        allowed: Some(allowed),
    }
}

/// Ordered, closed set of extractable fields.
///
/// The schema is an explicit configuration input to the pipeline rather than
/// a hardcoded constant; two variants ship built in ([`deal_terms`] and
/// [`contact_info`]) and callers select between them.
///
/// [`deal_terms`]: FieldSchema::deal_terms
/// [`contact_info`]: FieldSchema::contact_info
#[derive(Debug, Clone)]
pub struct FieldSchema {
    name: &'static str,
    fields: Vec<FieldSpec>,
}

impl FieldSchema {
    /// The richer contract-terms field set.
    pub fn deal_terms() -> Self {
        Self {
            name: "deal_terms",
            fields: vec![
                field(
                    "vendor_name",
                    "The name of the vendor, contractor, or service provider",
                ),
                field(
                    "description_of_services",
                    "A concise summary of the services being provided",
                ),
                field(
                    "total_cost",
                    "The total cost/price of the deal (include currency)",
                ),
                constrained(
                    "payment_terms",
                    "The payment terms of the deal",
                    PAYMENT_TERMS,
                ),
                field(
                    "contract_start_date",
                    "When the contract begins (MM-DD-YYYY format)",
                ),
                field(
                    "contract_end_date",
                    "When the contract ends (MM-DD-YYYY format)",
                ),
                field(
                    "contract_type",
                    "The contract type, e.g. fixed price, time and materials, subscription",
                ),
                field(
                    "renewal_terms",
                    "How and when the contract renews, including auto-renewal clauses",
                ),
                field(
                    "termination_clause",
                    "Conditions under which either party may terminate the contract",
                ),
                field(
                    "key_deliverables",
                    "The main deliverables or milestones the vendor commits to",
                ),
                field(
                    "sla_terms",
                    "Service level agreement terms: uptime, response times, penalties",
                ),
                field(
                    "confidentiality_terms",
                    "Confidentiality or non-disclosure obligations",
                ),
                field(
                    "liability_cap",
                    "The limit on either party's liability, if stated",
                ),
                field(
                    "insurance_requirements",
                    "Insurance coverage the vendor is required to carry",
                ),
            ],
        }
    }

    /// The leaner field set focused on vendor contact details.
    pub fn contact_info() -> Self {
        Self {
            name: "contact_info",
            fields: vec![
                field(
                    "vendor_name",
                    "The name of the vendor, contractor, or service provider",
                ),
                field(
                    "description_of_services",
                    "A concise summary of the services being provided",
                ),
                field(
                    "total_cost",
                    "The total cost/price of the deal (include currency)",
                ),
                constrained(
                    "payment_terms",
                    "The payment terms of the deal",
                    PAYMENT_TERMS,
                ),
                field(
                    "contract_start_date",
                    "When the contract begins (MM-DD-YYYY format)",
                ),
                field(
                    "contract_end_date",
                    "When the contract ends (MM-DD-YYYY format)",
                ),
                field(
                    "contractor_email",
                    "The contractor's or vendor's email address",
                ),
                field(
                    "contractor_phone",
                    "The contractor's or vendor's phone number",
                ),
                field(
                    "contractor_address",
                    "The contractor's or vendor's business address",
                ),
            ],
        }
    }

    /// Variant label, e.g. `deal_terms`.
    pub fn name(&self) -> &str {
        self.name
    }

    /// The fields in declaration order.
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Whether `key` belongs to the schema.
    pub fn contains(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.name == key)
    }

    /// Reconcile arbitrary backend output against the schema.
    ///
    /// Schema keys absent from `raw_fields` default to the empty string;
    /// keys outside the schema are dropped silently. Confidence values are
    /// clamped into [0, 1] and non-numeric values default to 0.0; confidence
    /// is advisory, so a bad value never rejects the whole result.
    ///
    /// Projection is idempotent: re-projecting an already-complete result is
    /// a no-op.
    pub fn project(
        &self,
        raw_fields: &Map<String, Value>,
        raw_confidence: &Map<String, Value>,
    ) -> ExtractionResult {
        let mut result = ExtractionResult::default();

        for spec in &self.fields {
            let value = raw_fields
                .get(spec.name)
                .map(coerce_to_string)
                .unwrap_or_default();
            result.fields.insert(spec.name.to_string(), value);

            if let Some(raw) = raw_confidence.get(spec.name) {
                result
                    .confidence
                    .insert(spec.name.to_string(), clamp_confidence(raw));
            }
        }

        result
    }
}

/// Coerce a JSON value to a field string. Scalars are stringified; nulls,
/// arrays, and objects become the empty string (no field-level validation
/// beyond this coercion).
fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn clamp_confidence(value: &Value) -> f64 {
    match value.as_f64() {
        Some(c) if c.is_finite() => c.clamp(0.0, 1.0),
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn as_map(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn deal_terms_field_set() {
        let schema = FieldSchema::deal_terms();
        assert_eq!(schema.fields().len(), 14);
        assert_eq!(schema.fields()[0].name, "vendor_name");
        assert!(schema.contains("insurance_requirements"));
        assert!(!schema.contains("contractor_email"));
    }

    #[test]
    fn contact_info_field_set() {
        let schema = FieldSchema::contact_info();
        assert_eq!(schema.fields().len(), 9);
        assert!(schema.contains("contractor_email"));
        assert!(!schema.contains("renewal_terms"));
    }

    #[test]
    fn payment_terms_are_constrained() {
        let schema = FieldSchema::deal_terms();
        let spec = schema
            .fields()
            .iter()
            .find(|f| f.name == "payment_terms")
            .unwrap();
        assert_eq!(spec.allowed, Some(PAYMENT_TERMS));
    }

    #[test]
    fn project_completes_missing_keys() {
        let schema = FieldSchema::contact_info();
        let fields = as_map(json!({"vendor_name": "Acme Corp"}));
        let confidence = as_map(json!({"vendor_name": 0.9}));

        let result = schema.project(&fields, &confidence);

        assert_eq!(result.fields.len(), schema.fields().len());
        assert_eq!(result.fields["vendor_name"], "Acme Corp");
        assert_eq!(result.fields["contractor_email"], "");
        assert_eq!(result.confidence["vendor_name"], 0.9);
        assert!(!result.confidence.contains_key("contractor_email"));
    }

    #[test]
    fn project_drops_unknown_keys() {
        let schema = FieldSchema::contact_info();
        let fields = as_map(json!({"vendor_name": "Acme", "hallucinated": "value"}));
        let confidence = as_map(json!({"hallucinated": 1.0}));

        let result = schema.project(&fields, &confidence);

        assert!(!result.fields.contains_key("hallucinated"));
        assert!(!result.confidence.contains_key("hallucinated"));
    }

    #[test]
    fn project_is_idempotent() {
        let schema = FieldSchema::contact_info();
        let fields = as_map(json!({"vendor_name": "Acme", "total_cost": "$10,000"}));
        let confidence = as_map(json!({"vendor_name": 0.8, "total_cost": 0.7}));

        let once = schema.project(&fields, &confidence);

        let refields = as_map(serde_json::to_value(&once.fields).unwrap());
        let reconf = as_map(serde_json::to_value(&once.confidence).unwrap());
        let twice = schema.project(&refields, &reconf);

        assert_eq!(once, twice);
    }

    #[test]
    fn project_clamps_confidence() {
        let schema = FieldSchema::contact_info();
        let fields = as_map(json!({}));
        let confidence = as_map(json!({
            "vendor_name": 1.7,
            "total_cost": -0.3,
            "payment_terms": "high",
            "contractor_email": 0.42
        }));

        let result = schema.project(&fields, &confidence);

        assert_eq!(result.confidence["vendor_name"], 1.0);
        assert_eq!(result.confidence["total_cost"], 0.0);
        assert_eq!(result.confidence["payment_terms"], 0.0);
        assert_eq!(result.confidence["contractor_email"], 0.42);
    }

    #[test]
    fn project_coerces_scalar_values() {
        let schema = FieldSchema::contact_info();
        let fields = as_map(json!({
            "total_cost": 10000,
            "vendor_name": null,
            "payment_terms": ["Net 30"]
        }));

        let result = schema.project(&fields, &Map::new());

        assert_eq!(result.fields["total_cost"], "10000");
        assert_eq!(result.fields["vendor_name"], "");
        assert_eq!(result.fields["payment_terms"], "");
    }
}
