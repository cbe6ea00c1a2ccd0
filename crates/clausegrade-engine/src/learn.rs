//! Vocabulary suggestion from already-classified clauses.
//!
//! Looks at the words that co-occur with each category in risky clauses and
//! proposes the frequent ones as candidate phrases. Output only: a loaded
//! dictionary is never changed. Accepted terms go into a rule table by hand.

use std::collections::{BTreeMap, HashMap, HashSet};

use clausegrade_core::Clause;
use once_cell::sync::Lazy;
use serde::Serialize;

use crate::dictionary::PhraseDictionary;

/// Common English words that carry no risk signal on their own.
static STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "about", "above", "after", "again", "against", "also", "been", "before", "being", "below",
        "between", "both", "could", "does", "doing", "down", "during", "each", "either", "from",
        "further", "have", "having", "here", "hereby", "herein", "into", "itself", "just", "more",
        "most", "must", "only", "other", "ours", "over", "same", "shall", "should", "some",
        "such", "than", "that", "their", "them", "then", "there", "these", "they", "this",
        "those", "through", "under", "until", "upon", "very", "were", "what", "when", "where",
        "which", "while", "will", "with", "within", "without", "would", "your", "yours",
    ]
    .into_iter()
    .collect()
});

/// Tuning for [`suggest_terms`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuggestOptions {
    /// Shortest token considered, in characters.
    pub min_len: usize,
    /// Minimum occurrences within a category.
    pub min_count: usize,
    /// Maximum suggestions per category.
    pub limit: usize,
}

impl Default for SuggestOptions {
    fn default() -> Self {
        Self {
            min_len: 4,
            min_count: 2,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TermSuggestion {
    pub term: String,
    pub count: usize,
}

/// Lowercase alphanumeric runs. Hyphens inside a word are kept.
fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|t| t.trim_matches('-'))
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Candidate terms per category, ranked by count (descending) then term.
///
/// Categories with no candidate above the threshold are omitted.
pub fn suggest_terms(
    clauses: &[Clause],
    dictionary: &PhraseDictionary,
    options: SuggestOptions,
) -> BTreeMap<String, Vec<TermSuggestion>> {
    let known = dictionary.literal_terms();
    let mut counts: HashMap<&str, HashMap<String, usize>> = HashMap::new();

    for clause in clauses.iter().filter(|c| c.is_risky) {
        let tokens: Vec<String> = tokenize(&clause.raw_text)
            .filter(|t| t.chars().count() >= options.min_len)
            .filter(|t| !STOPWORDS.contains(t.as_str()) && !known.contains(t))
            .collect();
        if tokens.is_empty() {
            continue;
        }
        for category in &clause.matched_categories {
            let per_category = counts.entry(category.as_str()).or_default();
            for token in &tokens {
                *per_category.entry(token.clone()).or_insert(0) += 1;
            }
        }
    }

    counts
        .into_iter()
        .filter_map(|(category, terms)| {
            let mut ranked: Vec<TermSuggestion> = terms
                .into_iter()
                .filter(|(_, count)| *count >= options.min_count)
                .map(|(term, count)| TermSuggestion { term, count })
                .collect();
            if ranked.is_empty() {
                return None;
            }
            ranked.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
            ranked.truncate(options.limit);
            Some((category.to_string(), ranked))
        })
        .collect()
}
