//! Risk analysis engine: phrase dictionary, clause classifier, document scorer.

pub mod classifier;
pub mod dictionary;
pub mod error;
pub mod learn;
pub mod scorer;
pub mod severity;

pub use classifier::{Classification, Classifier, MAX_SCORE};
pub use dictionary::{DictionarySummary, Pattern, PhraseDictionary, PhraseRule, RULE_TABLE_VERSION};
pub use error::RuleError;
pub use learn::{SuggestOptions, TermSuggestion, suggest_terms};
pub use scorer::DocumentScorer;
pub use severity::{explain, severity};
