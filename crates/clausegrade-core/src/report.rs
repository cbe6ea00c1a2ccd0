//! Wire types exchanged with the text-analysis endpoint and the storage pipeline.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::analysis::{DocumentAnalysis, Grade, Severity};
use crate::error::AnalysisError;
use crate::fingerprint::FINGERPRINT_VERSION;

/// Body of a stateless text-analysis request: `{ "text": "..." }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub text: String,
}

impl AnalyzeRequest {
    /// Parse a JSON request body.
    ///
    /// A missing, null, or non-string `text` is rejected as
    /// [`AnalysisError::InvalidInput`]; it is never coerced. An empty string
    /// is accepted.
    pub fn from_json(body: &str) -> Result<Self, AnalysisError> {
        let value: Value = serde_json::from_str(body)
            .map_err(|e| AnalysisError::invalid_input(format!("request is not valid JSON: {e}")))?;

        let mut fields = match value {
            Value::Object(fields) => fields,
            other => {
                return Err(AnalysisError::invalid_input(format!(
                    "request must be a JSON object, got {}",
                    json_kind(&other)
                )));
            }
        };

        match fields.remove("text") {
            Some(Value::String(text)) => Ok(Self { text }),
            None | Some(Value::Null) => Err(AnalysisError::invalid_input("`text` is required")),
            Some(other) => Err(AnalysisError::invalid_input(format!(
                "`text` must be a string, got {}",
                json_kind(&other)
            ))),
        }
    }

    /// Build a request from raw bytes, rejecting anything that is not UTF-8.
    pub fn from_utf8(bytes: Vec<u8>) -> Result<Self, AnalysisError> {
        String::from_utf8(bytes)
            .map(|text| Self { text })
            .map_err(|e| AnalysisError::invalid_input(format!("text is not valid UTF-8: {e}")))
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// One risky clause as presented to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskyClauseView {
    pub clause_number: usize,
    pub text: String,
    pub score: u8,
    /// Sorted matched categories.
    pub reasons: Vec<String>,
    pub severity: Severity,
    pub explanation: String,
    #[serde(default)]
    pub mitigations_found: Vec<String>,
}

/// Response of the text-analysis endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub total_clauses: usize,
    pub risky_clauses: Vec<RiskyClauseView>,
    pub risky_percent: f64,
    pub overall_rating: Grade,
    pub risk_breakdown: BTreeMap<String, usize>,
    pub risky_clauses_count: usize,
}

/// Document-level summary handed to the storage collaborator.
///
/// Storage decides what a repeated `fingerprint` means.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub fingerprint: String,
    pub fingerprint_version: u32,
    pub total_clauses: usize,
    pub risky_clauses_count: usize,
    pub risky_percent: f64,
    pub overall_rating: Grade,
    pub risk_breakdown: BTreeMap<String, usize>,
    /// ISO 8601 timestamp string, set by the caller.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyzed_at: Option<String>,
}

impl DocumentSummary {
    pub fn new(fingerprint: String, analysis: &DocumentAnalysis) -> Self {
        Self {
            fingerprint,
            fingerprint_version: FINGERPRINT_VERSION,
            total_clauses: analysis.total_clauses,
            risky_clauses_count: analysis.risky_clauses_count(),
            risky_percent: analysis.risky_percent,
            overall_rating: analysis.grade,
            risk_breakdown: analysis.risk_breakdown.clone(),
            analyzed_at: None,
        }
    }

    pub fn with_analyzed_at(mut self, timestamp: impl Into<String>) -> Self {
        self.analyzed_at = Some(timestamp.into());
        self
    }
}
