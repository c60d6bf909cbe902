pub mod record;
pub mod schema;

pub use record::{merge, DealMemoRecord, ExtractionResult, ManualFields, RecordError};
pub use schema::{FieldSchema, FieldSpec};
