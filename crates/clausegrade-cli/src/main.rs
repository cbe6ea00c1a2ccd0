//! clausegrade CLI
//!
//! Scores terms-and-conditions text for risky clauses.
//!
//! ## Usage
//!
//! ```bash
//! # Analyse a text file (or stdin)
//! clausegrade analyze --input terms.txt
//!
//! # JSON request in, JSON response out
//! echo '{"text": "All sales are final."}' | clausegrade analyze --request
//!
//! # Per-clause CSV plus a document summary for storage
//! clausegrade batch terms.txt --csv clauses.csv --summary summary.json
//!
//! # Use a custom rule table
//! CLAUSEGRADE_RULES=rules.toml clausegrade rules
//! ```
//!
//! ## Exit Codes
//!
//! - 0: success
//! - 1: error (I/O, rule table, output)
//! - 2: invalid request input

mod batch;
mod display;

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use clausegrade_core::{AnalysisError, AnalyzeRequest, fingerprint};
use clausegrade_engine::{DocumentScorer, PhraseDictionary, SuggestOptions, suggest_terms};
use tracing::info;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

#[derive(Parser)]
#[command(name = "clausegrade")]
#[command(version)]
#[command(about = "Flag risky clauses in terms-and-conditions text", long_about = None)]
struct Cli {
    /// Rule table to load instead of the built-in one
    #[arg(long, global = true, env = "CLAUSEGRADE_RULES")]
    rules: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyse one document and report its risky clauses
    Analyze {
        /// Text file to analyse (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Treat input as a JSON request body `{"text": "..."}`
        #[arg(long)]
        request: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: AnalyzeFormat,
    },

    /// Score every clause and emit tabular records plus a document summary
    Batch {
        /// Extracted document text (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Write clause records to this CSV file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Write the document summary as JSON to this file
        #[arg(long)]
        summary: Option<PathBuf>,

        /// Format for records written to stdout
        #[arg(short, long, default_value = "csv")]
        format: BatchFormat,

        /// Only emit records for risky clauses (the summary still covers all)
        #[arg(long)]
        risky_only: bool,

        /// Explicit analysis timestamp (RFC 3339), for reproducible output
        #[arg(long, value_parser = parse_datetime)]
        analyzed_at: Option<DateTime<Utc>>,
    },

    /// Print the content fingerprint of a document
    Fingerprint {
        /// Text file (reads from stdin if not provided)
        input: Option<PathBuf>,
    },

    /// Validate the active rule table and show its contents
    Rules,

    /// Suggest candidate phrases from documents' risky clauses
    Learn {
        /// Text files to learn from (reads one document from stdin if none)
        inputs: Vec<PathBuf>,

        /// Shortest token considered
        #[arg(long, default_value_t = SuggestOptions::default().min_len)]
        min_len: usize,

        /// Minimum occurrences within a category
        #[arg(long, default_value_t = SuggestOptions::default().min_count)]
        min_count: usize,

        /// Maximum suggestions per category
        #[arg(long, default_value_t = SuggestOptions::default().limit)]
        limit: usize,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: AnalyzeFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum AnalyzeFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum BatchFormat {
    Csv,
    Table,
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("invalid timestamp: {e}. Expected RFC 3339 (e.g. 2026-01-01T00:00:00Z)"))
}

/// Log filter from `RUST_LOG`-style directives. `warn` applies only when none are given.
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::WARN.into())
        .parse_lossy(directives)
}

fn main() -> ExitCode {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    // stdout carries command output only.
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(log_filter(&directives))
        .init();

    match run() {
        Ok(exit_code) => exit_code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    let rules = cli.rules.as_deref();
    let mut stdout = io::stdout().lock();

    match cli.command {
        Commands::Analyze {
            input,
            request,
            format,
        } => {
            let scorer = load_scorer(rules)?;
            let bytes = read_input(input.as_deref())?;
            analyze_command(&scorer, bytes, request, format, &mut stdout)
        }

        Commands::Batch {
            input,
            csv,
            summary,
            format,
            risky_only,
            analyzed_at,
        } => {
            let scorer = load_scorer(rules)?;
            let bytes = read_input(input.as_deref())?;
            let targets = BatchTargets {
                csv: csv.as_deref(),
                summary: summary.as_deref(),
                format,
                risky_only,
            };
            batch_command(
                &scorer,
                bytes,
                &targets,
                analyzed_at.unwrap_or_else(Utc::now),
                &mut stdout,
            )
        }

        Commands::Fingerprint { input } => {
            let text = match read_text(input.as_deref())? {
                Ok(text) => text,
                Err(e) => return Ok(invalid_input(e)),
            };
            writeln!(stdout, "{}", fingerprint(&text))?;
            Ok(ExitCode::SUCCESS)
        }

        Commands::Rules => {
            let dictionary = load_dictionary(rules)?;
            display::print_rules(&dictionary);
            Ok(ExitCode::SUCCESS)
        }

        Commands::Learn {
            inputs,
            min_len,
            min_count,
            limit,
            format,
        } => learn_command(
            rules,
            &inputs,
            SuggestOptions {
                min_len,
                min_count,
                limit,
            },
            format,
        ),
    }
}

// ── Commands ──

fn analyze_command(
    scorer: &DocumentScorer,
    input: Vec<u8>,
    request: bool,
    format: AnalyzeFormat,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let parsed = AnalyzeRequest::from_utf8(input).and_then(|raw| {
        if request {
            AnalyzeRequest::from_json(&raw.text)
        } else {
            Ok(raw)
        }
    });
    let request = match parsed {
        Ok(request) => request,
        Err(e) => return Ok(invalid_input(e)),
    };

    let response = scorer.respond(&scorer.analyze(&request.text));
    match format {
        AnalyzeFormat::Json => writeln!(out, "{}", serde_json::to_string_pretty(&response)?)?,
        AnalyzeFormat::Text => out.write_all(display::render_analysis(&response).as_bytes())?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Where `batch` sends its records and summary.
struct BatchTargets<'a> {
    csv: Option<&'a Path>,
    summary: Option<&'a Path>,
    format: BatchFormat,
    risky_only: bool,
}

impl BatchTargets<'_> {
    /// True when `out` receives the records as CSV.
    fn csv_on_stdout(&self) -> bool {
        self.csv.is_none() && matches!(self.format, BatchFormat::Csv)
    }
}

/// Records go to `--csv` or `out`. The summary goes to `--summary`, or to
/// `out` as text when `out` is not carrying CSV.
fn batch_command(
    scorer: &DocumentScorer,
    input: Vec<u8>,
    targets: &BatchTargets<'_>,
    analyzed_at: DateTime<Utc>,
    out: &mut dyn Write,
) -> Result<ExitCode> {
    let text = match AnalyzeRequest::from_utf8(input) {
        Ok(request) => request.text,
        Err(e) => return Ok(invalid_input(e)),
    };

    let batch::BatchOutput { records, summary } = batch::run_batch(scorer, &text, analyzed_at)?;
    let records = if targets.risky_only {
        batch::risky_only(&records)?
    } else {
        records
    };

    match targets.csv {
        Some(path) => {
            batch::write_csv_file(path, &records)?;
            eprintln!("  Wrote {} clause records to {}", records.num_rows(), path.display());
        }
        None => match targets.format {
            BatchFormat::Csv => batch::write_csv(&mut *out, &records)?,
            BatchFormat::Table => writeln!(out, "{}", batch::pretty_table(&records)?)?,
        },
    }

    match targets.summary {
        Some(path) => {
            batch::write_summary_file(path, &summary)?;
            eprintln!("  Wrote document summary to {}", path.display());
        }
        None if !targets.csv_on_stdout() => {
            out.write_all(display::render_summary(&summary).as_bytes())?;
        }
        None => info!(fingerprint = %summary.fingerprint, "summary not written; pass --summary"),
    }

    Ok(ExitCode::SUCCESS)
}

fn learn_command(
    rules: Option<&Path>,
    inputs: &[PathBuf],
    options: SuggestOptions,
    format: AnalyzeFormat,
) -> Result<ExitCode> {
    let scorer = load_scorer(rules)?;

    let mut texts = Vec::new();
    if inputs.is_empty() {
        match read_text(None)? {
            Ok(text) => texts.push(text),
            Err(e) => return Ok(invalid_input(e)),
        }
    }
    for path in inputs {
        match read_text(Some(path))? {
            Ok(text) => texts.push(text),
            Err(e) => return Ok(invalid_input(e)),
        }
    }

    let clauses: Vec<_> = texts
        .iter()
        .flat_map(|text| scorer.score_clauses(text))
        .collect();
    info!(documents = texts.len(), clauses = clauses.len(), "learning from clauses");

    let suggestions = suggest_terms(&clauses, scorer.dictionary(), options);
    match format {
        AnalyzeFormat::Json => println!("{}", serde_json::to_string_pretty(&suggestions)?),
        AnalyzeFormat::Text => display::print_suggestions(&suggestions),
    }
    Ok(ExitCode::SUCCESS)
}

// ── Helpers ──

fn load_dictionary(rules: Option<&Path>) -> Result<PhraseDictionary> {
    let dictionary = match rules {
        Some(path) => PhraseDictionary::from_path(path)
            .with_context(|| format!("Failed to load rule table from {}", path.display()))?,
        None => PhraseDictionary::builtin().context("Failed to load built-in rule table")?,
    };
    let summary = dictionary.summary();
    info!(
        source = %rules.map_or_else(|| "built-in".to_string(), |p| p.display().to_string()),
        categories = summary.categories,
        rules = summary.rules,
        "rule table loaded"
    );
    Ok(dictionary)
}

fn load_scorer(rules: Option<&Path>) -> Result<DocumentScorer> {
    Ok(DocumentScorer::new(load_dictionary(rules)?))
}

fn read_input(input: Option<&Path>) -> Result<Vec<u8>> {
    match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("Failed to read input from {}", path.display()))
        }
        None => {
            let mut buffer = Vec::new();
            io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read from stdin")?;
            Ok(buffer)
        }
    }
}

/// Read document text. The outer error is I/O, the inner one is invalid content.
fn read_text(input: Option<&Path>) -> Result<Result<String, AnalysisError>> {
    let bytes = read_input(input)?;
    Ok(AnalyzeRequest::from_utf8(bytes).map(|request| request.text))
}

fn invalid_input(e: AnalysisError) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::from(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn analyze_flags_parse() {
        let cli = Cli::try_parse_from(["clausegrade", "analyze", "--request", "--format", "json"]).unwrap();
        match cli.command {
            Commands::Analyze { input, request, format } => {
                assert!(input.is_none());
                assert!(request);
                assert!(matches!(format, AnalyzeFormat::Json));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn rules_flag_is_global() {
        let cli = Cli::try_parse_from(["clausegrade", "rules", "--rules", "custom.toml"]).unwrap();
        assert_eq!(cli.rules.as_deref(), Some(Path::new("custom.toml")));
    }

    #[test]
    fn learn_defaults_match_options() {
        let cli = Cli::try_parse_from(["clausegrade", "learn", "a.txt"]).unwrap();
        match cli.command {
            Commands::Learn { inputs, min_len, min_count, limit, .. } => {
                assert_eq!(inputs, vec![PathBuf::from("a.txt")]);
                let defaults = SuggestOptions::default();
                assert_eq!((min_len, min_count, limit), (defaults.min_len, defaults.min_count, defaults.limit));
            }
            _ => panic!("expected learn"),
        }
    }

    #[test]
    fn analyzed_at_must_be_rfc3339() {
        assert!(parse_datetime("2026-01-01T00:00:00Z").is_ok());
        assert!(parse_datetime("yesterday").is_err());
    }

    #[test]
    fn read_text_rejects_non_utf8_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.txt");
        std::fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let result = read_text(Some(&path)).unwrap();
        assert!(matches!(result, Err(AnalysisError::InvalidInput(_))));
    }

    fn scorer() -> DocumentScorer {
        DocumentScorer::builtin().unwrap()
    }

    fn is_code(actual: ExitCode, expected: u8) -> bool {
        format!("{actual:?}") == format!("{:?}", ExitCode::from(expected))
    }

    fn csv_targets() -> BatchTargets<'static> {
        BatchTargets {
            csv: None,
            summary: None,
            format: BatchFormat::Csv,
            risky_only: false,
        }
    }

    fn fixed_time() -> DateTime<Utc> {
        parse_datetime("2026-03-04T05:06:07Z").unwrap()
    }

    const DOC: &[u8] = b"Welcome. All sales are final. You agree to indemnify us.";

    fn run_batch_to_string(targets: &BatchTargets<'_>) -> (ExitCode, String) {
        let mut out = Vec::new();
        let code = batch_command(&scorer(), DOC.to_vec(), targets, fixed_time(), &mut out).unwrap();
        (code, String::from_utf8(out).unwrap())
    }

    #[test]
    fn log_filter_keeps_requested_level() {
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(
            log_filter("clausegrade_engine=debug").max_level_hint(),
            Some(LevelFilter::DEBUG)
        );
        assert_eq!(log_filter("error").max_level_hint(), Some(LevelFilter::ERROR));
    }

    #[test]
    fn log_filter_defaults_to_warn() {
        assert_eq!(log_filter("").max_level_hint(), Some(LevelFilter::WARN));
    }

    #[test]
    fn analyze_non_utf8_exits_with_code_2() {
        let mut out = Vec::new();
        let code = analyze_command(&scorer(), vec![0x66, 0xff], false, AnalyzeFormat::Json, &mut out).unwrap();
        assert!(is_code(code, 2), "{code:?}");
        assert!(out.is_empty());
    }

    #[test]
    fn analyze_request_without_text_exits_with_code_2() {
        for body in [r#"{}"#, r#"{"text": null}"#, r#"{"text": 1}"#, "nope"] {
            let mut out = Vec::new();
            let code =
                analyze_command(&scorer(), body.as_bytes().to_vec(), true, AnalyzeFormat::Json, &mut out).unwrap();
            assert!(is_code(code, 2), "{body}: {code:?}");
        }
    }

    #[test]
    fn analyze_request_writes_json_response() {
        let mut out = Vec::new();
        let body = br#"{"text": "All sales are final. Thanks."}"#.to_vec();
        let code = analyze_command(&scorer(), body, true, AnalyzeFormat::Json, &mut out).unwrap();
        assert!(is_code(code, 0));

        let json: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(json["total_clauses"], 2);
        assert_eq!(json["risky_clauses"][0]["reasons"][0], "fees_charges");
    }

    #[test]
    fn analyze_text_report() {
        let mut out = Vec::new();
        analyze_command(&scorer(), DOC.to_vec(), false, AnalyzeFormat::Text, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("=== Grade D"), "{text}");
    }

    #[test]
    fn batch_stdout_is_csv_only_without_summary_path() {
        let (code, out) = run_batch_to_string(&csv_targets());
        assert!(is_code(code, 0));

        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "clause_id,text,is_risky,risk_reason,risk_score");
        assert_eq!(lines.len(), 4, "{out}");
        assert!(!out.contains('{'), "no JSON on stdout: {out}");
        assert!(!out.contains("Grade"), "no summary text on stdout: {out}");
    }

    #[test]
    fn batch_summary_path_keeps_json_off_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.json");
        let targets = BatchTargets {
            summary: Some(path.as_path()),
            ..csv_targets()
        };
        let (_, out) = run_batch_to_string(&targets);
        assert!(!out.contains('{'), "{out}");
        assert_eq!(out.lines().count(), 4);

        let summary: clausegrade_core::DocumentSummary =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(summary.total_clauses, 3);
        assert_eq!(summary.risky_clauses_count, 2);
        assert_eq!(summary.analyzed_at.as_deref(), Some("2026-03-04T05:06:07Z"));
    }

    #[test]
    fn batch_csv_file_puts_summary_text_on_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clauses.csv");
        let targets = BatchTargets {
            csv: Some(path.as_path()),
            ..csv_targets()
        };
        let (_, out) = run_batch_to_string(&targets);
        assert!(out.starts_with("=== Grade D"), "{out}");
        assert!(!out.contains("clause_id"));
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 4);
    }

    #[test]
    fn batch_table_format_appends_summary() {
        let targets = BatchTargets {
            format: BatchFormat::Table,
            ..csv_targets()
        };
        let (_, out) = run_batch_to_string(&targets);
        assert!(out.contains("risk_reason"));
        assert!(out.contains("=== Grade D"));
    }

    #[test]
    fn batch_risky_only_drops_clean_rows() {
        let targets = BatchTargets {
            risky_only: true,
            ..csv_targets()
        };
        let (_, out) = run_batch_to_string(&targets);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3, "{out}");
        assert!(lines[1].starts_with("2,"));
        assert!(lines[2].starts_with("3,"));
    }

    #[test]
    fn batch_non_utf8_exits_with_code_2() {
        let mut out = Vec::new();
        let code = batch_command(&scorer(), vec![0xc3, 0x28], &csv_targets(), fixed_time(), &mut out).unwrap();
        assert!(is_code(code, 2), "{code:?}");
        assert!(out.is_empty());
    }

    #[test]
    fn batch_risky_only_flag_parses() {
        let cli = Cli::try_parse_from(["clausegrade", "batch", "doc.txt", "--risky-only"]).unwrap();
        assert!(matches!(cli.command, Commands::Batch { risky_only: true, .. }));
    }

    #[test]
    fn load_dictionary_reports_bad_rule_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "version = 99\n").unwrap();
        let err = load_dictionary(Some(&path)).unwrap_err();
        assert!(format!("{err:#}").contains("unsupported rule table version"));
    }
}
