//! Clause-level and document-level analysis results.
//!
//! A [`Clause`] is produced by the segmenter (text only) and enriched by the
//! classifier. A [`DocumentAnalysis`] aggregates one run over a document and is
//! handed to callers as a transfer object; nothing here is persisted.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Deserialize, Serialize};

/// Document-level letter grade derived from the percentage of risky clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
}

impl Grade {
    /// Map a risky-clause percentage onto a grade.
    ///
    /// Thresholds are closed intervals evaluated in order, first match wins:
    /// `<= 1` → A, `<= 5` → B, `<= 15` → C, otherwise D.
    pub fn from_percent(risky_percent: f64) -> Self {
        if risky_percent <= 1.0 {
            Self::A
        } else if risky_percent <= 5.0 {
            Self::B
        } else if risky_percent <= 15.0 {
            Self::C
        } else {
            Self::D
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
            Self::D => "D",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::A => "Low Risk",
            Self::B => "Moderate Risk",
            Self::C => "Elevated Risk",
            Self::D => "High Risk",
        }
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Three-level presentation tier for a risky clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Severity implied by a clamped clause score alone. Score 0 has no severity.
    pub fn from_score(score: u8) -> Option<Self> {
        match score {
            0 => None,
            1 => Some(Self::Low),
            2 => Some(Self::Medium),
            _ => Some(Self::High),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One segmented unit of document text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clause {
    /// 1-based position in the document.
    pub sequence_number: usize,
    /// Verbatim (trimmed) substring of the source text.
    pub raw_text: String,
    pub matched_categories: BTreeSet<String>,
    /// Sum of matched rule weights, clamped to `0..=3`.
    pub score: u8,
    pub is_risky: bool,
    /// Protective phrases found in the clause. Never affects `score`.
    #[serde(default)]
    pub protections: Vec<String>,
}

impl Clause {
    /// An unclassified clause as it leaves the segmenter.
    pub fn new(sequence_number: usize, raw_text: impl Into<String>) -> Self {
        Self {
            sequence_number,
            raw_text: raw_text.into(),
            matched_categories: BTreeSet::new(),
            score: 0,
            is_risky: false,
            protections: Vec::new(),
        }
    }

    /// Matched categories in sorted order.
    pub fn reasons(&self) -> Vec<String> {
        self.matched_categories.iter().cloned().collect()
    }

    /// Matched categories joined with `", "` for tabular output.
    pub fn risk_reason(&self) -> String {
        self.matched_categories
            .iter()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Aggregate result for one text submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentAnalysis {
    pub total_clauses: usize,
    /// Risky clauses in ascending `sequence_number` order.
    pub risky_clauses: Vec<Clause>,
    pub risky_percent: f64,
    pub grade: Grade,
    /// category → number of risky clauses carrying that category.
    pub risk_breakdown: BTreeMap<String, usize>,
}

impl DocumentAnalysis {
    /// Summarise an ordered list of classified clauses.
    ///
    /// Zero clauses is a valid state: `risky_percent = 0` and grade A.
    pub fn from_clauses(clauses: Vec<Clause>) -> Self {
        let total_clauses = clauses.len();

        let mut risky_clauses: Vec<Clause> = clauses.into_iter().filter(|c| c.is_risky).collect();
        risky_clauses.sort_by_key(|c| c.sequence_number);

        let mut risk_breakdown: BTreeMap<String, usize> = BTreeMap::new();
        for clause in &risky_clauses {
            for category in &clause.matched_categories {
                *risk_breakdown.entry(category.clone()).or_insert(0) += 1;
            }
        }

        let risky_percent = if total_clauses == 0 {
            0.0
        } else {
            risky_clauses.len() as f64 * 100.0 / total_clauses as f64
        };

        Self {
            total_clauses,
            risky_percent,
            grade: Grade::from_percent(risky_percent),
            risky_clauses,
            risk_breakdown,
        }
    }

    pub fn risky_clauses_count(&self) -> usize {
        self.risky_clauses.len()
    }

    /// True when the document produced no clauses at all.
    pub fn is_empty(&self) -> bool {
        self.total_clauses == 0
    }

    /// Breakdown entries ordered by count (descending), then category name.
    pub fn breakdown_by_count(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self
            .risk_breakdown
            .iter()
            .map(|(k, v)| (k.as_str(), *v))
            .collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}
