//! Phrase-pattern classification for single clauses.
//!
//! Every rule in the [`PhraseDictionary`] is tested against the clause.
//! Each match adds its category to the result set and its weight to a running
//! total. Several rules of the same category all contribute weight even
//! though the category appears once. The total is then clamped to `0..=3`.

use std::collections::BTreeSet;

use clausegrade_core::Clause;

use crate::dictionary::PhraseDictionary;

/// Upper bound of the clause score band.
pub const MAX_SCORE: u8 = 3;

/// Classification result for a single clause.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Classification {
    pub categories: BTreeSet<String>,
    /// Sum of matched weights, clamped to `0..=MAX_SCORE`.
    pub score: u8,
    pub is_risky: bool,
    /// Protective phrases present in the clause.
    pub protections: Vec<String>,
}

/// Rule-based clause classifier.
///
/// Holds the compiled dictionary. Read-only after construction, so one
/// instance can serve concurrent analyses behind an `Arc`.
#[derive(Debug, Clone)]
pub struct Classifier {
    dictionary: PhraseDictionary,
}

impl Classifier {
    pub fn new(dictionary: PhraseDictionary) -> Self {
        Self { dictionary }
    }

    pub fn dictionary(&self) -> &PhraseDictionary {
        &self.dictionary
    }

    /// Classify one clause. Unmatched text yields an empty, zero, non-risky result.
    pub fn classify(&self, clause_text: &str) -> Classification {
        let mut categories = BTreeSet::new();
        let mut total: u32 = 0;

        for rule in self.dictionary.matching_rules(clause_text) {
            categories.insert(rule.category.clone());
            total = total.saturating_add(u32::from(rule.weight));
        }

        let score = total.min(u32::from(MAX_SCORE)) as u8;
        let protections = if categories.is_empty() {
            Vec::new()
        } else {
            self.dictionary
                .matching_protections(clause_text)
                .into_iter()
                .map(str::to_string)
                .collect()
        };

        Classification {
            categories,
            score,
            is_risky: score >= 1,
            protections,
        }
    }

    /// Build an enriched [`Clause`] from segmenter output.
    pub fn classify_clause(&self, sequence_number: usize, clause_text: &str) -> Clause {
        let Classification {
            categories,
            score,
            is_risky,
            protections,
        } = self.classify(clause_text);

        Clause {
            sequence_number,
            raw_text: clause_text.to_string(),
            matched_categories: categories,
            score,
            is_risky,
            protections,
        }
    }
}
