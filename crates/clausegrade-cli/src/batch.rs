//! Batch pipeline: extracted document text → per-clause records + document summary.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use arrow::array::AsArray;
use arrow::compute::filter_record_batch;
use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, SecondsFormat, Utc};
use clausegrade_core::{DocumentAnalysis, DocumentSummary, fingerprint, records};
use clausegrade_engine::DocumentScorer;

pub struct BatchOutput {
    pub records: RecordBatch,
    pub summary: DocumentSummary,
}

/// Score every clause of `text` and build both outputs.
pub fn run_batch(
    scorer: &DocumentScorer,
    text: &str,
    analyzed_at: DateTime<Utc>,
) -> anyhow::Result<BatchOutput> {
    let clauses = scorer.score_clauses(text);
    let records = records::clause_records(&clauses).context("building clause records")?;

    let analysis = DocumentAnalysis::from_clauses(clauses);
    let summary = DocumentSummary::new(fingerprint(text), &analysis)
        .with_analyzed_at(analyzed_at.to_rfc3339_opts(SecondsFormat::Secs, true));

    tracing::info!(
        fingerprint = %summary.fingerprint,
        clauses = summary.total_clauses,
        risky = summary.risky_clauses_count,
        "batch scored"
    );

    Ok(BatchOutput { records, summary })
}

/// Keep only the rows whose `is_risky` column is true.
pub fn risky_only(batch: &RecordBatch) -> anyhow::Result<RecordBatch> {
    let column = batch
        .column_by_name("is_risky")
        .context("clause records have no `is_risky` column")?;
    let mask = column
        .as_boolean_opt()
        .context("`is_risky` column is not boolean")?;
    filter_record_batch(batch, mask).context("filtering risky clause records")
}

/// Write clause records as CSV with a header row.
pub fn write_csv<W: Write>(writer: W, batch: &RecordBatch) -> anyhow::Result<()> {
    let mut csv = WriterBuilder::new().with_header(true).build(writer);
    csv.write(batch).context("writing clause records as CSV")?;
    Ok(())
}

pub fn write_csv_file(path: &Path, batch: &RecordBatch) -> anyhow::Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    write_csv(file, batch)
}

pub fn write_summary_file(path: &Path, summary: &DocumentSummary) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(summary)?;
    std::fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn pretty_table(batch: &RecordBatch) -> anyhow::Result<String> {
    let table = arrow::util::pretty::pretty_format_batches(std::slice::from_ref(batch))
        .context("formatting clause records")?;
    Ok(table.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()
    }

    fn sample() -> BatchOutput {
        let scorer = DocumentScorer::builtin().unwrap();
        run_batch(
            &scorer,
            "Welcome to the service. All sales are final. We may share your data at our sole discretion.",
            fixed_time(),
        )
        .unwrap()
    }

    #[test]
    fn records_have_one_row_per_clause() {
        let out = sample();
        assert_eq!(out.records.num_rows(), 3);
        assert_eq!(out.summary.total_clauses, 3);
        assert_eq!(out.summary.risky_clauses_count, 2);
    }

    #[test]
    fn summary_carries_fingerprint_and_timestamp() {
        let out = sample();
        assert_eq!(out.summary.fingerprint.len(), 64);
        assert_eq!(out.summary.analyzed_at.as_deref(), Some("2026-01-02T03:04:05Z"));
    }

    #[test]
    fn csv_has_header_and_joined_reasons() {
        let out = sample();
        let mut buf = Vec::new();
        write_csv(&mut buf, &out.records).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let mut lines = csv.lines();

        assert_eq!(lines.next(), Some("clause_id,text,is_risky,risk_reason,risk_score"));
        assert_eq!(lines.next(), Some("1,Welcome to the service.,false,,0"));
        assert_eq!(lines.next(), Some("2,All sales are final.,true,fees_charges,2"));
        assert_eq!(
            lines.next(),
            Some("3,We may share your data at our sole discretion.,true,\"data_sharing, generic_risk\",3")
        );
    }

    #[test]
    fn risky_only_keeps_flagged_rows_in_order() {
        let out = sample();
        let risky = risky_only(&out.records).unwrap();
        assert_eq!(risky.num_rows(), 2);
        assert_eq!(risky.schema(), out.records.schema());

        let mut buf = Vec::new();
        write_csv(&mut buf, &risky).unwrap();
        let csv = String::from_utf8(buf).unwrap();
        let ids: Vec<&str> = csv.lines().skip(1).map(|l| &l[..1]).collect();
        assert_eq!(ids, vec!["2", "3"]);
        assert!(!csv.contains("Welcome"));
    }

    #[test]
    fn risky_only_on_clean_document_is_header_only() {
        let scorer = DocumentScorer::builtin().unwrap();
        let out = run_batch(&scorer, "Nothing to see here.", fixed_time()).unwrap();
        let risky = risky_only(&out.records).unwrap();
        assert_eq!(risky.num_rows(), 0);
        assert_eq!(out.summary.total_clauses, 1, "summary still covers every clause");
    }

    #[test]
    fn summary_file_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let out = sample();
        write_summary_file(&path, &out.summary).unwrap();

        let read: DocumentSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(read.fingerprint, out.summary.fingerprint);
        assert_eq!(read.risk_breakdown, out.summary.risk_breakdown);
    }

    #[test]
    fn csv_file_is_written() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clauses.csv");
        write_csv_file(&path, &sample().records).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn table_mentions_columns() {
        let table = pretty_table(&sample().records).unwrap();
        assert!(table.contains("risk_reason"));
        assert!(table.contains("fees_charges"));
    }
}
