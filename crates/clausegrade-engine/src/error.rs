use std::path::PathBuf;

use thiserror::Error;

/// Failures while loading or validating a rule table. These only occur at
/// process start; a loaded dictionary never fails at analysis time.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("failed to read rule table {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("rule table is not valid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("unsupported rule table version {found} (expected {expected})")]
    Version { found: u32, expected: u32 },

    #[error("duplicate category `{0}`")]
    DuplicateCategory(String),

    #[error("category `{0}` has no rules")]
    EmptyCategory(String),

    #[error("category `{category}` rule {index}: weight {weight} is outside 1..=3")]
    Weight {
        category: String,
        index: usize,
        weight: u8,
    },

    #[error("category `{category}` rule {index}: exactly one of `phrase` or `regex` is required")]
    PatternKind { category: String, index: usize },

    #[error("category `{category}` rule {index}: pattern is empty")]
    EmptyPattern { category: String, index: usize },

    #[error("category `{category}` rule {index}: invalid regex: {source}")]
    InvalidRegex {
        category: String,
        index: usize,
        source: regex::Error,
    },

    #[error("failed to compile pattern set: {0}")]
    PatternSet(#[from] regex::Error),
}
