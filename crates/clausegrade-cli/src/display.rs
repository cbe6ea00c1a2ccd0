//! Human-readable rendering of analysis results, summaries, and rule tables.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use clausegrade_core::{AnalysisResponse, DocumentSummary, Grade, RiskyClauseView};
use clausegrade_engine::{PhraseDictionary, TermSuggestion};

const MAX_LIST_ITEMS: usize = 10;
const MAX_CLAUSE_CHARS: usize = 100;

// ── Public API ──

pub fn print_rules(dictionary: &PhraseDictionary) {
    print!("{}", render_rules(dictionary));
}

pub fn print_suggestions(suggestions: &BTreeMap<String, Vec<TermSuggestion>>) {
    print!("{}", render_suggestions(suggestions));
}

// ── Rendering ──

/// Analysis report: totals, grade, breakdown, then each risky clause.
pub fn render_analysis(response: &AnalysisResponse) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", grade_heading(response.overall_rating));
    if response.total_clauses == 0 {
        let _ = writeln!(out, "No clauses found in the submitted text.");
        return out;
    }
    let _ = writeln!(out);

    row(&mut out, "total_clauses", response.total_clauses);
    row(&mut out, "risky_clauses", response.risky_clauses_count);
    row(&mut out, "risky_percent", format!("{:.2}%", response.risky_percent));
    let _ = writeln!(out);

    render_breakdown(&mut out, &response.risk_breakdown);

    if !response.risky_clauses.is_empty() {
        let _ = writeln!(out, "Risky clauses");
        for view in &response.risky_clauses {
            render_clause(&mut out, view);
        }
    }
    out
}

fn render_clause(out: &mut String, view: &RiskyClauseView) {
    let _ = writeln!(
        out,
        "  #{:<4} [{}] score {}  {}",
        view.clause_number,
        view.severity,
        view.score,
        view.reasons.join(", ")
    );
    let _ = writeln!(out, "        {}", shorten(&view.text, MAX_CLAUSE_CHARS));
    let _ = writeln!(out, "        {}", view.explanation);
    let _ = writeln!(out);
}

fn render_breakdown(out: &mut String, breakdown: &BTreeMap<String, usize>) {
    if breakdown.is_empty() {
        return;
    }
    let mut entries: Vec<(&String, &usize)> = breakdown.iter().collect();
    entries.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    let _ = writeln!(out, "Risk breakdown");
    for (category, count) in entries {
        row(out, category, count);
    }
    let _ = writeln!(out);
}

pub fn render_summary(summary: &DocumentSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", grade_heading(summary.overall_rating));
    let _ = writeln!(out);
    row(
        &mut out,
        "fingerprint",
        format!("{} (v{})", summary.fingerprint, summary.fingerprint_version),
    );
    if let Some(at) = &summary.analyzed_at {
        row(&mut out, "analyzed_at", at);
    }
    row(&mut out, "total_clauses", summary.total_clauses);
    row(&mut out, "risky_clauses", summary.risky_clauses_count);
    row(&mut out, "risky_percent", format!("{:.2}%", summary.risky_percent));
    let _ = writeln!(out);
    render_breakdown(&mut out, &summary.risk_breakdown);
    out
}

fn render_rules(dictionary: &PhraseDictionary) -> String {
    let summary = dictionary.summary();
    let mut out = String::new();

    let _ = writeln!(out, "=== Rule table ===");
    let _ = writeln!(out);
    row(&mut out, "categories", summary.categories);
    row(
        &mut out,
        "rules",
        format!(
            "{} ({} phrase, {} regex)",
            summary.rules, summary.literal_rules, summary.regex_rules
        ),
    );
    row(&mut out, "protections", summary.protections);
    if !dictionary.high_priority().is_empty() {
        let names: Vec<&str> = dictionary.high_priority().iter().map(String::as_str).collect();
        row(&mut out, "high_priority", names.join(", "));
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Categories");
    for (category, n) in &summary.rules_per_category {
        let _ = writeln!(out, "  {category:<26} {n} rules");
        let rules: Vec<_> = dictionary
            .rules()
            .iter()
            .filter(|r| &r.category == category)
            .collect();
        for rule in rules.iter().take(MAX_LIST_ITEMS) {
            let kind = if rule.pattern.is_literal() { "phrase" } else { "regex" };
            let _ = writeln!(out, "    w{} {:<6} {}", rule.weight, kind, rule.pattern.as_str());
        }
        if rules.len() > MAX_LIST_ITEMS {
            let _ = writeln!(out, "    ... and {} more", rules.len() - MAX_LIST_ITEMS);
        }
    }
    out
}

fn render_suggestions(suggestions: &BTreeMap<String, Vec<TermSuggestion>>) -> String {
    let mut out = String::new();
    if suggestions.is_empty() {
        let _ = writeln!(out, "No candidate terms found.");
        return out;
    }
    for (category, terms) in suggestions {
        let _ = writeln!(out, "{category}");
        for t in terms {
            let _ = writeln!(out, "  {:<26} {}", t.term, t.count);
        }
    }
    out
}

// ── Helpers ──

fn grade_heading(grade: Grade) -> String {
    format!("Grade {grade}: {}", grade.label())
}

fn row(out: &mut String, key: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "  {key:<26} {value}");
}

/// Truncate to `max` characters, appending `...` when cut.
fn shorten(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let head: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{head}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clausegrade_engine::DocumentScorer;

    fn response(text: &str) -> AnalysisResponse {
        let scorer = DocumentScorer::builtin().unwrap();
        scorer.respond(&scorer.analyze(text))
    }

    #[test]
    fn analysis_lists_risky_clauses_with_severity() {
        let out = render_analysis(&response("Hello. You agree to indemnify us. Bye."));
        assert!(out.contains("#2"), "{out}");
        assert!(out.contains("[high]"), "{out}");
        assert!(out.contains("indemnity"), "{out}");
        assert!(out.contains("33.33%"), "{out}");
    }

    #[test]
    fn empty_document_says_so() {
        let out = render_analysis(&response(""));
        assert!(out.starts_with("=== Grade A"));
        assert!(out.contains("No clauses found"));
    }

    #[test]
    fn breakdown_sorted_by_count() {
        let mut breakdown = BTreeMap::new();
        breakdown.insert("a_low".to_string(), 1);
        breakdown.insert("z_high".to_string(), 3);
        let mut out = String::new();
        render_breakdown(&mut out, &breakdown);
        assert!(out.find("z_high").unwrap() < out.find("a_low").unwrap());
    }

    #[test]
    fn rules_render_lists_categories() {
        let out = render_rules(&PhraseDictionary::builtin().unwrap());
        assert!(out.contains("data_sharing"));
        assert!(out.contains("regex"));
        assert!(out.contains("high_priority"));
    }

    #[test]
    fn shorten_respects_char_boundaries() {
        assert_eq!(shorten("short", 10), "short");
        assert_eq!(shorten("ééééééééééé", 6), "ééé...");
    }
}
