//! Clause segmentation.
//!
//! Splits raw document text into an ordered sequence of clauses.
//!
//! # Boundary rules
//!
//! - Clause-terminal punctuation (`.`, `!`, `?`, `;`) immediately followed by
//!   whitespace. The punctuation stays with the left clause; the whitespace
//!   run is consumed.
//! - One or more newline characters, consumed.
//!
//! Boundaries are found scanning left to right, whichever occurs first.
//! Each clause is trimmed and empty clauses are dropped. Abbreviations and
//! decimal numbers are not special-cased: "e.g. this" splits after "e.g.".

use std::ops::Range;

use once_cell::sync::Lazy;
use regex::Regex;

static BOUNDARY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?;]\s+|\n+").unwrap());

const TERMINALS: [char; 4] = ['.', '!', '?', ';'];

/// Split `text` into trimmed, non-empty clauses in document order.
pub fn segment(text: &str) -> Vec<&str> {
    segment_spans(text)
        .into_iter()
        .map(|span| &text[span])
        .collect()
}

/// Byte ranges of each trimmed, non-empty clause within `text`.
///
/// `segment(text)[i] == &text[segment_spans(text)[i]]` for every clause.
pub fn segment_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut start = 0;

    for m in BOUNDARY_RE.find_iter(text) {
        // Keep the terminal punctuation (always one ASCII byte) in the left clause.
        let end = if m.as_str().starts_with(TERMINALS) {
            m.start() + 1
        } else {
            m.start()
        };
        push_trimmed(text, start..end, &mut spans);
        start = m.end();
    }
    push_trimmed(text, start..text.len(), &mut spans);

    spans
}

fn push_trimmed(text: &str, span: Range<usize>, spans: &mut Vec<Range<usize>>) {
    let piece = &text[span.clone()];
    let trimmed = piece.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = piece.len() - piece.trim_start().len();
    let from = span.start + lead;
    spans.push(from..from + trimmed.len());
}
