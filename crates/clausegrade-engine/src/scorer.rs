//! Document scoring: segment, classify every clause, summarise.

use clausegrade_core::{
    AnalysisError, AnalysisResponse, AnalyzeRequest, Clause, DocumentAnalysis, RiskyClauseView,
    Severity, segment,
};
use tracing::debug;

use crate::classifier::Classifier;
use crate::dictionary::PhraseDictionary;
use crate::error::RuleError;
use crate::severity;

/// Runs the full analysis pipeline over raw document text.
///
/// Stateless between calls. Share one instance behind an `Arc` to serve
/// concurrent requests.
#[derive(Debug, Clone)]
pub struct DocumentScorer {
    classifier: Classifier,
}

impl DocumentScorer {
    pub fn new(dictionary: PhraseDictionary) -> Self {
        Self {
            classifier: Classifier::new(dictionary),
        }
    }

    /// Scorer backed by the embedded default rule table.
    pub fn builtin() -> Result<Self, RuleError> {
        Ok(Self::new(PhraseDictionary::builtin()?))
    }

    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    pub fn dictionary(&self) -> &PhraseDictionary {
        self.classifier.dictionary()
    }

    /// Every clause of `raw_text`, classified, with sequence numbers from 1.
    pub fn score_clauses(&self, raw_text: &str) -> Vec<Clause> {
        segment(raw_text)
            .into_iter()
            .enumerate()
            .map(|(i, text)| self.classifier.classify_clause(i + 1, text))
            .collect()
    }

    pub fn analyze(&self, raw_text: &str) -> DocumentAnalysis {
        let analysis = DocumentAnalysis::from_clauses(self.score_clauses(raw_text));
        debug!(
            total = analysis.total_clauses,
            risky = analysis.risky_clauses_count(),
            percent = analysis.risky_percent,
            grade = %analysis.grade,
            "document analysed"
        );
        analysis
    }

    pub fn severity(&self, clause: &Clause) -> Option<Severity> {
        severity::severity(clause, self.dictionary().high_priority())
    }

    pub fn explain(&self, clause: &Clause) -> String {
        severity::explain(clause, self.dictionary())
    }

    /// Wire response for an analysis, with severity and explanation per risky clause.
    pub fn respond(&self, analysis: &DocumentAnalysis) -> AnalysisResponse {
        let risky_clauses = analysis
            .risky_clauses
            .iter()
            .filter_map(|clause| {
                let severity = self.severity(clause)?;
                Some(RiskyClauseView {
                    clause_number: clause.sequence_number,
                    text: clause.raw_text.clone(),
                    score: clause.score,
                    reasons: clause.reasons(),
                    severity,
                    explanation: self.explain(clause),
                    mitigations_found: clause.protections.clone(),
                })
            })
            .collect();

        AnalysisResponse {
            total_clauses: analysis.total_clauses,
            risky_clauses,
            risky_percent: analysis.risky_percent,
            overall_rating: analysis.grade,
            risk_breakdown: analysis.risk_breakdown.clone(),
            risky_clauses_count: analysis.risky_clauses_count(),
        }
    }

    /// Stateless text-analysis entry point: JSON request body in, response out.
    pub fn handle_request(&self, body: &str) -> Result<AnalysisResponse, AnalysisError> {
        let request = AnalyzeRequest::from_json(body)?;
        Ok(self.respond(&self.analyze(&request.text)))
    }
}
