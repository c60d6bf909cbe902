//! Structured field extraction: sends normalized document text to the
//! reasoning backend under a fixed instruction contract and reconciles the
//! response against the field schema.

mod directive;
mod extractor;

pub use directive::build_directive;
pub use extractor::{parse_extraction, BackendConfig, FieldExtractor};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("backend returned {status}: {body}")]
    Backend { status: u16, body: String },
    #[error("backend returned no content")]
    EmptyBackendResponse,
    #[error("backend response is not parseable structured data: {0}")]
    MalformedBackendResponse(String),
}
