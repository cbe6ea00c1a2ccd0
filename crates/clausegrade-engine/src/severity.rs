//! Presentation-layer policy: severity tiers and plain-language explanations.
//!
//! Both are derived from a classified [`Clause`] after the fact. Neither
//! changes the stored numeric score.

use std::collections::BTreeSet;

use clausegrade_core::{Clause, Severity};

use crate::dictionary::PhraseDictionary;

const NO_PATTERN: &str = "No specific risky legal pattern was detected in this clause.";
const NO_PROTECTION: &str =
    "No strong protective phrases were found, so you should read this clause carefully.";

/// Severity surfaced to callers for `clause`.
///
/// Score maps to `1 → low`, `2 → medium`, `3 → high`. A clause matching any
/// category in `high_priority` is always `high`. Non-risky clauses have none.
pub fn severity(clause: &Clause, high_priority: &BTreeSet<String>) -> Option<Severity> {
    if !clause.is_risky {
        return None;
    }
    if clause
        .matched_categories
        .iter()
        .any(|c| high_priority.contains(c))
    {
        return Some(Severity::High);
    }
    Severity::from_score(clause.score)
}

/// Plain-language explanation of why `clause` was flagged.
///
/// One sentence per matched category (sorted by category name), then a note
/// on whether protective language was found.
pub fn explain(clause: &Clause, dictionary: &PhraseDictionary) -> String {
    if clause.matched_categories.is_empty() {
        return NO_PATTERN.to_string();
    }

    let mut pieces: Vec<String> = clause
        .matched_categories
        .iter()
        .map(|category| match dictionary.explanation(category) {
            Some(text) => text.to_string(),
            None => format!(
                "This clause matches risky language in the `{category}` category."
            ),
        })
        .collect();

    if clause.protections.is_empty() {
        pieces.push(NO_PROTECTION.to_string());
    } else {
        pieces.push(format!(
            "However, there is also some protective language that reduces the risk: {}.",
            clause.protections.join("; ")
        ));
    }

    pieces.join(" ")
}
