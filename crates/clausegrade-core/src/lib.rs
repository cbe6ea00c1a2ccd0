//! Core types, clause segmentation, content fingerprints, and wire/record schemas.

pub mod analysis;
pub mod error;
pub mod fingerprint;
pub mod report;
pub mod schema;
pub mod segment;

pub use analysis::{Clause, DocumentAnalysis, Grade, Severity};
pub use error::AnalysisError;
pub use fingerprint::{FINGERPRINT_VERSION, fingerprint, normalize_whitespace};
pub use report::{AnalysisResponse, AnalyzeRequest, DocumentSummary, RiskyClauseView};
pub use schema::records;
pub use segment::{segment, segment_spans};
