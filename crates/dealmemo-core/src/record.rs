//! Deal memo record types: extracted fields, manual fields, and the merged
//! record handed to the renderer.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::FieldSchema;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("extracted fields missing schema key: {0}")]
    MissingField(String),
}

/// Output of the structured extractor after schema projection.
///
/// Invariant: `fields` holds exactly the schema key set (every key present,
/// no extras) regardless of what the backend returned. `confidence` carries
/// backend-reported estimates in [0, 1]; missing keys are simply absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub fields: BTreeMap<String, String>,
    #[serde(default)]
    pub confidence: BTreeMap<String, f64>,
}

/// Operator-supplied bookkeeping fields, disjoint from the extractable
/// schema by design: a document cannot express who owns the deal internally
/// or which budget code pays for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ManualFields {
    pub deal_owner: String,
    pub department: String,
    pub business_justification: String,
    pub budget_code: String,
    pub approver_name: String,
    pub deal_priority: String,
    pub internal_notes: String,
}

impl Default for ManualFields {
    fn default() -> Self {
        Self {
            deal_owner: String::new(),
            department: String::new(),
            business_justification: String::new(),
            budget_code: String::new(),
            approver_name: String::new(),
            deal_priority: "Medium".to_string(),
            internal_notes: String::new(),
        }
    }
}

impl ManualFields {
    /// Flatten into a field-name → value map for merging.
    pub fn to_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("deal_owner".to_string(), self.deal_owner.clone()),
            ("department".to_string(), self.department.clone()),
            (
                "business_justification".to_string(),
                self.business_justification.clone(),
            ),
            ("budget_code".to_string(), self.budget_code.clone()),
            ("approver_name".to_string(), self.approver_name.clone()),
            ("deal_priority".to_string(), self.deal_priority.clone()),
            ("internal_notes".to_string(), self.internal_notes.clone()),
        ])
    }
}

/// The flat field-name → value map consumed by the document renderer.
///
/// Union of extracted and manual fields; covers every placeholder the
/// renderer's template expects. Transient: built once per generation
/// request, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DealMemoRecord(BTreeMap<String, String>);

impl DealMemoRecord {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl From<BTreeMap<String, String>> for DealMemoRecord {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}

impl FromIterator<(String, String)> for DealMemoRecord {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Build the deal memo record from its two sources.
///
/// The inputs occupy disjoint key namespaces, so this is a plain union;
/// should they ever overlap, the manual value wins: operators correct the
/// model, not vice versa. Fails with [`RecordError::MissingField`] if the
/// extracted map lacks a schema key, which cannot happen after
/// [`FieldSchema::project`] has run.
pub fn merge(
    schema: &FieldSchema,
    extracted: &BTreeMap<String, String>,
    manual: &BTreeMap<String, String>,
) -> Result<DealMemoRecord, RecordError> {
    for spec in schema.fields() {
        if !extracted.contains_key(spec.name) {
            return Err(RecordError::MissingField(spec.name.to_string()));
        }
    }

    let mut record = extracted.clone();
    for (key, value) in manual {
        record.insert(key.clone(), value.clone());
    }

    Ok(DealMemoRecord(record))
}
