//! Phrase dictionary: the versioned rule table of risky phrase patterns.
//!
//! Rules are grouped by category. Each rule is either a literal phrase or a
//! regular-expression fragment with a weight in `1..=3`. All patterns are
//! compiled once, case-insensitively, into a single [`RegexSet`] so one pass
//! over a clause reports every matching rule. The table is immutable after
//! load and safe to share across threads.
//!
//! A built-in table ships with the crate (`rules/default.toml`). Alternative
//! tables use the same TOML layout.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::path::Path;

use regex::{RegexBuilder, RegexSet, RegexSetBuilder};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::RuleError;

/// Rule table format version understood by this build.
pub const RULE_TABLE_VERSION: u32 = 1;

/// Weight range accepted for a single rule.
pub const MIN_WEIGHT: u8 = 1;
pub const MAX_WEIGHT: u8 = 3;

const DEFAULT_RULES: &str = include_str!("../rules/default.toml");

/// How a rule matches clause text. Both kinds are case-insensitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// Literal substring.
    Phrase(String),
    /// Regular-expression fragment.
    Regex(String),
}

impl Pattern {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Phrase(s) | Self::Regex(s) => s,
        }
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Phrase(_))
    }

    fn regex_source(&self) -> String {
        match self {
            Self::Phrase(p) => regex::escape(p),
            Self::Regex(r) => r.clone(),
        }
    }
}

/// One detection rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhraseRule {
    pub category: String,
    pub pattern: Pattern,
    pub weight: u8,
}

// ── On-disk layout ──

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    version: u32,
    #[serde(default)]
    high_priority: Vec<String>,
    #[serde(default)]
    protections: Vec<String>,
    #[serde(default, rename = "category")]
    categories: Vec<RawCategory>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCategory {
    name: String,
    #[serde(default)]
    explanation: Option<String>,
    #[serde(default)]
    rules: Vec<RawRule>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawRule {
    phrase: Option<String>,
    regex: Option<String>,
    weight: u8,
}

/// Loaded, validated, compiled rule table.
#[derive(Debug, Clone)]
pub struct PhraseDictionary {
    rules: Vec<PhraseRule>,
    matcher: RegexSet,
    /// Category names in declaration order.
    categories: Vec<String>,
    explanations: BTreeMap<String, String>,
    high_priority: BTreeSet<String>,
    protections: Vec<String>,
    protection_matcher: RegexSet,
}

/// Summary statistics for a loaded dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionarySummary {
    pub categories: usize,
    pub rules: usize,
    pub literal_rules: usize,
    pub regex_rules: usize,
    pub high_priority: usize,
    pub protections: usize,
    /// category → number of rules, declaration order.
    pub rules_per_category: Vec<(String, usize)>,
}

impl PhraseDictionary {
    /// The rule table embedded in this crate.
    pub fn builtin() -> Result<Self, RuleError> {
        Self::from_toml_str(DEFAULT_RULES)
    }

    /// A dictionary with no rules. Every clause classifies as non-risky.
    pub fn empty() -> Self {
        Self {
            rules: Vec::new(),
            matcher: RegexSet::empty(),
            categories: Vec::new(),
            explanations: BTreeMap::new(),
            high_priority: BTreeSet::new(),
            protections: Vec::new(),
            protection_matcher: RegexSet::empty(),
        }
    }

    /// Load a rule table from a TOML file.
    pub fn from_path(path: &Path) -> Result<Self, RuleError> {
        let source = std::fs::read_to_string(path).map_err(|source| RuleError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Parse, validate, and compile a rule table.
    pub fn from_toml_str(source: &str) -> Result<Self, RuleError> {
        let raw: RawTable = toml::from_str(source)?;
        if raw.version != RULE_TABLE_VERSION {
            return Err(RuleError::Version {
                found: raw.version,
                expected: RULE_TABLE_VERSION,
            });
        }

        let mut rules = Vec::new();
        let mut categories = Vec::with_capacity(raw.categories.len());
        let mut explanations = BTreeMap::new();
        let mut seen = HashSet::new();

        for category in raw.categories {
            let name = category.name.trim().to_string();
            if !seen.insert(name.clone()) {
                return Err(RuleError::DuplicateCategory(name));
            }
            if category.rules.is_empty() {
                return Err(RuleError::EmptyCategory(name));
            }

            for (index, rule) in category.rules.into_iter().enumerate() {
                rules.push(validate_rule(&name, index, rule)?);
            }

            if let Some(text) = category.explanation
                && !text.trim().is_empty()
            {
                explanations.insert(name.clone(), text.trim().to_string());
            }
            categories.push(name);
        }

        let matcher = RegexSetBuilder::new(rules.iter().map(|r| r.pattern.regex_source()))
            .case_insensitive(true)
            .build()?;

        let protections: Vec<String> = raw
            .protections
            .into_iter()
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .collect();
        let protection_matcher = RegexSetBuilder::new(protections.iter().map(|p| regex::escape(p)))
            .case_insensitive(true)
            .build()?;

        let high_priority: BTreeSet<String> = raw
            .high_priority
            .into_iter()
            .map(|c| c.trim().to_string())
            .collect();

        if rules.is_empty() {
            warn!("rule table has no rules; every clause will classify as non-risky");
        }
        debug!(
            categories = categories.len(),
            rules = rules.len(),
            protections = protections.len(),
            "loaded phrase dictionary"
        );

        Ok(Self {
            rules,
            matcher,
            categories,
            explanations,
            high_priority,
            protections,
            protection_matcher,
        })
    }

    /// All rules in table order.
    pub fn rules(&self) -> &[PhraseRule] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Category names in declaration order.
    pub fn categories(&self) -> impl Iterator<Item = &str> {
        self.categories.iter().map(String::as_str)
    }

    /// Rules whose pattern matches `text`, in table order.
    pub fn matching_rules<'a>(&'a self, text: &str) -> impl Iterator<Item = &'a PhraseRule> + 'a {
        self.matcher
            .matches(text)
            .into_iter()
            .map(move |i| &self.rules[i])
    }

    /// Protective phrases found in `text`, in table order.
    pub fn matching_protections(&self, text: &str) -> Vec<&str> {
        self.protection_matcher
            .matches(text)
            .into_iter()
            .map(|i| self.protections[i].as_str())
            .collect()
    }

    pub fn explanation(&self, category: &str) -> Option<&str> {
        self.explanations.get(category).map(String::as_str)
    }

    /// Categories whose clauses are always surfaced as high severity.
    pub fn high_priority(&self) -> &BTreeSet<String> {
        &self.high_priority
    }

    pub fn protections(&self) -> &[String] {
        &self.protections
    }

    /// Lowercase words appearing in any literal phrase.
    pub fn literal_terms(&self) -> HashSet<String> {
        self.rules
            .iter()
            .filter(|r| r.pattern.is_literal())
            .flat_map(|r| {
                r.pattern
                    .as_str()
                    .split(|c: char| !c.is_alphanumeric() && c != '-')
                    .filter(|w| !w.is_empty())
                    .map(str::to_lowercase)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Summary statistics.
    pub fn summary(&self) -> DictionarySummary {
        let literal_rules = self.rules.iter().filter(|r| r.pattern.is_literal()).count();
        let rules_per_category = self
            .categories
            .iter()
            .map(|c| {
                let n = self.rules.iter().filter(|r| &r.category == c).count();
                (c.clone(), n)
            })
            .collect();

        DictionarySummary {
            categories: self.categories.len(),
            rules: self.rules.len(),
            literal_rules,
            regex_rules: self.rules.len() - literal_rules,
            high_priority: self.high_priority.len(),
            protections: self.protections.len(),
            rules_per_category,
        }
    }
}

fn validate_rule(category: &str, index: usize, rule: RawRule) -> Result<PhraseRule, RuleError> {
    if !(MIN_WEIGHT..=MAX_WEIGHT).contains(&rule.weight) {
        return Err(RuleError::Weight {
            category: category.to_string(),
            index,
            weight: rule.weight,
        });
    }

    let pattern = match (rule.phrase, rule.regex) {
        (Some(phrase), None) => Pattern::Phrase(phrase.trim().to_string()),
        (None, Some(regex)) => Pattern::Regex(regex),
        _ => {
            return Err(RuleError::PatternKind {
                category: category.to_string(),
                index,
            });
        }
    };

    if pattern.as_str().trim().is_empty() {
        return Err(RuleError::EmptyPattern {
            category: category.to_string(),
            index,
        });
    }

    if let Pattern::Regex(source) = &pattern {
        // Compile alone first so a bad pattern is reported against its rule.
        RegexBuilder::new(source)
            .case_insensitive(true)
            .build()
            .map_err(|source| RuleError::InvalidRegex {
                category: category.to_string(),
                index,
                source,
            })?;
    }

    Ok(PhraseRule {
        category: category.to_string(),
        pattern,
        weight: rule.weight,
    })
}
