//! Batch evaluation against oracle files
//!
//! An oracle record pairs a source text with its reference classification. The
//! [`Evaluator`] drives a batch of records through a [`Predictor`] one file at a time
//! and keeps every outcome: failures are file-scoped and reported as such, they never
//! abort the batch and never count as a zero score.
//!
//! Three predictors are provided:
//!
//! - [`EnginePredictor`] classifies each source with this crate's engine.
//! - [`ModelPredictor`] replays per-token predictions of a learned model.
//! - [`BaselinePredictor`] replays payloads of a baseline lexer tool.

use super::annotation::Heta;
use super::baseline::{self, BaselineError};
use super::hcode::HCode;
use super::highlighter::{HighlightError, Highlighter};
use super::projection::HCharSeq;
use super::scoring::{score_chars, score_tokens, ScoreError};
use super::syntax::SourceParser;
use super::task::TaskCode;
use md5::{Digest, Md5};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum EvalError {
    #[error(transparent)]
    Highlight(#[from] HighlightError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Baseline(#[from] BaselineError),
    #[error("no prediction for file {file_id}")]
    MissingPrediction { file_id: String },
    #[error("oracle line {line}: {source}")]
    Oracle {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("malformed predictions: {0}")]
    Predictions(#[source] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OracleRecord {
    pub source: OracleSource,
    pub hetas: Vec<Heta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSource {
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<OracleFile>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleFile {
    #[serde(default)]
    pub url: Option<String>,
}

impl OracleRecord {
    pub fn text(&self) -> &str {
        &self.source.source
    }

    pub fn file_id(&self) -> String {
        file_id(self.text())
    }

    pub fn url(&self) -> Option<&str> {
        self.source.file.as_ref().and_then(|file| file.url.as_deref())
    }

    /// Records without source text or reference tokens cannot be scored.
    pub fn is_degenerate(&self) -> bool {
        self.source.source.is_empty() || self.hetas.is_empty()
    }
}

/// Lowercase hex MD5 of the source text, the key prediction and payload files use.
pub fn file_id(source: &str) -> String {
    format!("{:x}", Md5::digest(source.as_bytes()))
}

/// Parses an oracle file, either one JSON array or one record per line.
///
/// A record that does not decode is logged and skipped, the rest of the file is kept.
/// Only an array that is not JSON at all fails the whole file.
pub fn parse_oracle(text: &str) -> Result<Vec<OracleRecord>, EvalError> {
    if text.trim_start().starts_with('[') {
        let values: Vec<serde_json::Value> =
            serde_json::from_str(text).map_err(|source| EvalError::Oracle {
                line: source.line(),
                source,
            })?;
        return Ok(values
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| decode_record(index + 1, serde_json::from_value(value)))
            .collect());
    }
    Ok(text
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(index, line)| decode_record(index + 1, serde_json::from_str(line)))
        .collect())
}

fn decode_record(
    position: usize,
    decoded: Result<OracleRecord, serde_json::Error>,
) -> Option<OracleRecord> {
    decoded
        .map_err(|error| warn!(record = position, %error, "skipping malformed oracle record"))
        .ok()
}

pub fn load_oracle(path: impl AsRef<Path>) -> Result<Vec<OracleRecord>, EvalError> {
    let text = fs::read_to_string(path)?;
    parse_oracle(&text)
}

/// Size statistics of one oracle record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileSize {
    #[serde(rename = "fileId")]
    pub file_id: String,
    #[serde(rename = "ntoks")]
    pub tokens: usize,
    #[serde(rename = "nchars")]
    pub chars: usize,
    pub whitespace: usize,
    pub lines: usize,
}

impl FileSize {
    pub fn of(record: &OracleRecord) -> Self {
        let source = record.text();
        Self {
            file_id: record.file_id(),
            tokens: record.hetas.len(),
            chars: source.chars().count(),
            whitespace: source.chars().filter(|c| c.is_whitespace()).count(),
            lines: line_count(source),
        }
    }
}

/// Largest files first.
pub fn sizes(records: &[OracleRecord]) -> Vec<FileSize> {
    let mut sizes: Vec<_> = records.iter().map(FileSize::of).collect();
    sizes.sort_by(|a, b| b.tokens.cmp(&a.tokens));
    sizes
}

/// Lines separated by `\n`, `\r\n` or `\r`. A trailing terminator opens an empty line.
fn line_count(source: &str) -> usize {
    let mut lines = 1;
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\n' => lines += 1,
            '\r' => {
                chars.next_if_eq(&'\n');
                lines += 1;
            }
            _ => {}
        }
    }
    lines
}

/// One entry of the oracle index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleIndexEntry {
    pub id: String,
    pub url: String,
    pub source: String,
}

/// Index of distinct sources, first occurrence wins.
pub fn index(records: &[OracleRecord]) -> Vec<OracleIndexEntry> {
    let mut seen = HashSet::new();
    records
        .iter()
        .filter_map(|record| {
            let id = record.file_id();
            seen.insert(id.clone()).then(|| OracleIndexEntry {
                id,
                url: record.url().unwrap_or("Unavailable").to_string(),
                source: record.text().to_string(),
            })
        })
        .collect()
}

/// Produces a score for one oracle record.
pub trait Predictor {
    fn name(&self) -> &str;

    fn score(&mut self, record: &OracleRecord, task: TaskCode) -> Result<f64, EvalError>;
}

/// Classifies sources with the engine, then scores per character.
pub struct EnginePredictor {
    highlighter: Highlighter,
    parser: Box<dyn SourceParser>,
}

impl EnginePredictor {
    pub fn new(highlighter: Highlighter, parser: Box<dyn SourceParser>) -> Self {
        Self {
            highlighter,
            parser,
        }
    }
}

impl Predictor for EnginePredictor {
    fn name(&self) -> &str {
        "engine"
    }

    fn score(&mut self, record: &OracleRecord, task: TaskCode) -> Result<f64, EvalError> {
        let hetas = self
            .highlighter
            .classify_file(record.text(), self.parser.as_ref())?;
        let predicted = HCharSeq::project(hetas.as_slice(), record.text());
        Ok(score_chars(&predicted, &record.hetas, record.text(), task)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelPrediction {
    file_id: String,
    ps: Vec<HCode>,
}

/// Per-token predictions of a learned model, keyed by file id.
#[derive(Debug, Default)]
pub struct ModelPredictor {
    predictions: HashMap<String, Vec<HCode>>,
}

impl ModelPredictor {
    /// Reads `[{"fileId": .., "ps": [..]}, ..]`.
    pub fn from_json(text: &str) -> Result<Self, EvalError> {
        let entries: Vec<ModelPrediction> =
            serde_json::from_str(text).map_err(EvalError::Predictions)?;
        let predictions = entries
            .into_iter()
            .map(|entry| (entry.file_id, entry.ps))
            .collect();
        Ok(Self { predictions })
    }

    pub fn insert(&mut self, file_id: impl Into<String>, predictions: Vec<HCode>) {
        self.predictions.insert(file_id.into(), predictions);
    }
}

impl Predictor for ModelPredictor {
    fn name(&self) -> &str {
        "model"
    }

    fn score(&mut self, record: &OracleRecord, task: TaskCode) -> Result<f64, EvalError> {
        let file_id = record.file_id();
        let predicted = self
            .predictions
            .get(&file_id)
            .ok_or(EvalError::MissingPrediction { file_id })?;
        Ok(score_tokens(predicted, &record.hetas, record.text(), task)?)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BaselinePayload {
    file_id: String,
    res_json: String,
}

/// Raw baseline tool responses, keyed by file id. Payloads are decoded per file so a
/// malformed one only fails its own file.
#[derive(Debug, Default)]
pub struct BaselinePredictor {
    payloads: HashMap<String, String>,
}

impl BaselinePredictor {
    /// Reads `[{"fileId": .., "resJson": ".."}, ..]`.
    pub fn from_json(text: &str) -> Result<Self, EvalError> {
        let entries: Vec<BaselinePayload> =
            serde_json::from_str(text).map_err(EvalError::Predictions)?;
        let mut predictor = Self::default();
        for entry in entries {
            predictor.insert(entry.file_id, entry.res_json);
        }
        Ok(predictor)
    }

    pub fn insert(&mut self, file_id: impl Into<String>, payload: impl Into<String>) {
        self.payloads.insert(file_id.into(), payload.into());
    }
}

impl Predictor for BaselinePredictor {
    fn name(&self) -> &str {
        "baseline"
    }

    fn score(&mut self, record: &OracleRecord, task: TaskCode) -> Result<f64, EvalError> {
        let file_id = record.file_id();
        let payload = self
            .payloads
            .get(&file_id)
            .ok_or(EvalError::MissingPrediction { file_id })?;
        let tokens = baseline::decode(payload)?;
        let predicted = HCharSeq::project(tokens.as_slice(), record.text());
        Ok(score_chars(&predicted, &record.hetas, record.text(), task)?)
    }
}

#[derive(Debug)]
pub struct FileOutcome {
    pub file_id: String,
    pub is_snippet: bool,
    pub result: Result<f64, EvalError>,
}

/// Serialized form of a [`FileOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub file_id: String,
    pub is_snippet: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub acc: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileOutcome {
    pub fn record(&self) -> FileRecord {
        let (acc, error) = match &self.result {
            Ok(acc) => (Some(*acc), None),
            Err(error) => (None, Some(error.to_string())),
        };
        FileRecord {
            file_id: self.file_id.clone(),
            is_snippet: self.is_snippet,
            acc,
            error,
        }
    }
}

#[derive(Debug)]
pub struct BatchReport {
    pub predictor: String,
    pub task: TaskCode,
    pub outcomes: Vec<FileOutcome>,
    pub skipped: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub predictor: String,
    pub task: TaskCode,
    pub scored: usize,
    pub failed: usize,
    pub skipped: usize,
    pub mean: Option<f64>,
}

impl BatchReport {
    pub fn scored(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.scored()
    }

    /// Mean over scored files only, `None` when nothing scored.
    pub fn mean(&self) -> Option<f64> {
        let scores: Vec<f64> = self
            .outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().ok().copied())
            .collect();
        if scores.is_empty() {
            return None;
        }
        Some(scores.iter().sum::<f64>() / scores.len() as f64)
    }

    pub fn summary(&self) -> BatchSummary {
        BatchSummary {
            predictor: self.predictor.clone(),
            task: self.task,
            scored: self.scored(),
            failed: self.failed(),
            skipped: self.skipped,
            mean: self.mean(),
        }
    }

    pub fn records(&self) -> Vec<FileRecord> {
        self.outcomes.iter().map(FileOutcome::record).collect()
    }

    /// Appends another batch scored for the same predictor and task.
    pub fn merge(&mut self, other: BatchReport) {
        self.outcomes.extend(other.outcomes);
        self.skipped += other.skipped;
    }
}

/// Drives batches of oracle records through a predictor.
#[derive(Debug, Clone)]
pub struct Evaluator {
    task: TaskCode,
    progress_every: usize,
    skip_degenerate: bool,
}

impl Evaluator {
    pub fn new(task: TaskCode) -> Self {
        Self {
            task,
            progress_every: 100,
            skip_degenerate: true,
        }
    }

    /// Logs a running mean every `n` files; `0` disables progress logging.
    pub fn with_progress_every(mut self, n: usize) -> Self {
        self.progress_every = n;
        self
    }

    /// When disabled, degenerate records are scored and fail instead of being skipped.
    pub fn with_skip_degenerate(mut self, skip: bool) -> Self {
        self.skip_degenerate = skip;
        self
    }

    pub fn task(&self) -> TaskCode {
        self.task
    }

    pub fn run(
        &self,
        records: &[OracleRecord],
        predictor: &mut dyn Predictor,
        is_snippet: bool,
    ) -> BatchReport {
        let mut report = BatchReport {
            predictor: predictor.name().to_string(),
            task: self.task,
            outcomes: Vec::with_capacity(records.len()),
            skipped: 0,
        };
        let mut running = 0.0;
        let mut scored = 0usize;
        for record in records {
            if self.skip_degenerate && record.is_degenerate() {
                report.skipped += 1;
                continue;
            }
            let file_id = record.file_id();
            let result = predictor.score(record, self.task);
            match &result {
                Ok(acc) => {
                    running += acc;
                    scored += 1;
                    debug!(file = %file_id, acc, "scored file");
                }
                Err(error) => warn!(file = %file_id, %error, "file failed"),
            }
            report.outcomes.push(FileOutcome {
                file_id,
                is_snippet,
                result,
            });
            let done = report.outcomes.len();
            if self.progress_every > 0 && done % self.progress_every == 0 && scored > 0 {
                info!(done, mean = running / scored as f64, "progress");
            }
        }
        let summary = report.summary();
        info!(
            predictor = %summary.predictor,
            task = %summary.task,
            scored = summary.scored,
            failed = summary.failed,
            skipped = summary.skipped,
            mean = ?summary.mean,
            "batch done"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::languages::Language;
    use crate::semhl::testing::{self, FixtureParser};

    fn oracle_line(source: &str, hetas: &[Heta]) -> String {
        serde_json::to_string(&OracleRecord {
            source: OracleSource {
                source: source.to_string(),
                file: None,
            },
            hetas: hetas.to_vec(),
        })
        .unwrap()
    }

    fn int_declaration() -> OracleRecord {
        let tree = testing::cpp_int_declaration().unwrap();
        let hetas = Highlighter::new(Language::Cpp).classify(&tree);
        OracleRecord {
            source: OracleSource {
                source: testing::CPP_INT_DECLARATION.to_string(),
                file: Some(OracleFile {
                    url: Some("https://example.org/a.cpp".to_string()),
                }),
            },
            hetas,
        }
    }

    #[test]
    fn test_parses_array_and_json_lines() {
        let record = int_declaration();
        let line = oracle_line(record.text(), &record.hetas);
        let from_lines = parse_oracle(&format!("{}\n\n{}\n", line, line)).unwrap();
        assert_eq!(from_lines.len(), 2);
        let from_array = parse_oracle(&format!("[{}]", line)).unwrap();
        assert_eq!(from_array, vec![from_lines[0].clone()]);
        assert_eq!(from_array[0].hetas, record.hetas);
    }

    #[test]
    fn test_malformed_records_are_skipped() {
        let line = oracle_line("a", &int_declaration().hetas);
        let records =
            parse_oracle(&format!("{}\n{{\"source\": 1}}\n{}\n", line, line)).unwrap();
        assert_eq!(records.len(), 2);
        let records = parse_oracle(&format!("[{}, {{\"source\": 1}}]", line)).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_unreadable_array_fails_the_file() {
        let error = parse_oracle("[\n{\"source\": \n").unwrap_err();
        assert!(matches!(error, EvalError::Oracle { .. }));
    }

    #[test]
    fn test_synthetic_tokens_do_not_lose_the_file() {
        let record = int_declaration();
        let line = oracle_line(record.text(), &record.hetas);
        let mut eof: serde_json::Value = serde_json::from_str(&line).unwrap();
        eof["hetas"]
            .as_array_mut()
            .unwrap()
            .push(serde_json::json!({
                "eta": {"startIndex": -1, "stopIndex": -1, "text": "<EOF>",
                        "tokenRule": -1, "symbolicName": "EOF"},
                "highlightCode": 0
            }));
        let records = parse_oracle(&format!("{}\n{}\n{}\n", line, eof, line)).unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[1].hetas.len(), record.hetas.len() + 1);

        let predicted = HCharSeq::project(records[1].hetas.as_slice(), records[1].text());
        assert_eq!(
            score_chars(&predicted, &records[1].hetas, records[1].text(), TaskCode::Full),
            Ok(1.0)
        );
    }

    #[test]
    fn test_file_id_is_md5_hex() {
        assert_eq!(file_id(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(file_id("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn test_sizes_count_lines_like_text_editors() {
        assert_eq!(line_count(""), 1);
        assert_eq!(line_count("a\nb"), 2);
        assert_eq!(line_count("a\r\nb\rc\n"), 4);

        let mut small = int_declaration();
        small.hetas.truncate(2);
        let sizes = sizes(&[small, int_declaration()]);
        assert_eq!(sizes[0].tokens, 5);
        assert_eq!(sizes[0].chars, 10);
        assert_eq!(sizes[0].whitespace, 3);
        assert_eq!(sizes[0].lines, 1);
        assert_eq!(sizes[1].tokens, 2);
    }

    #[test]
    fn test_index_deduplicates_sources() {
        let mut anonymous = int_declaration();
        anonymous.source.file = None;
        let entries = index(&[int_declaration(), anonymous]);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://example.org/a.cpp");
    }

    #[test]
    fn test_engine_predictor_agrees_with_itself() {
        let mut predictor = EnginePredictor::new(
            Highlighter::new(Language::Cpp),
            Box::new(FixtureParser::cpp()),
        );
        let report = Evaluator::new(TaskCode::Full).run(&[int_declaration()], &mut predictor, false);
        assert_eq!(report.scored(), 1);
        assert_eq!(report.mean(), Some(1.0));
    }

    #[test]
    fn test_failures_are_kept_apart_from_scores() {
        let record = int_declaration();
        let mut degenerate = record.clone();
        degenerate.hetas.clear();

        let mut predictor = ModelPredictor::default();
        predictor.insert(
            record.file_id(),
            vec![HCode::Keyword, HCode::Any, HCode::Any, HCode::Literal, HCode::Any],
        );
        let mut unknown = record.clone();
        unknown.source.source = "int y = 1;".to_string();

        let report = Evaluator::new(TaskCode::Declarators).run(
            &[record, degenerate, unknown],
            &mut predictor,
            true,
        );
        assert_eq!(report.skipped, 1);
        assert_eq!(report.scored(), 1);
        assert_eq!(report.failed(), 1);
        // "x" predicted ANY against VARIABLE_DECLARATOR.
        let mean = report.mean().unwrap();
        assert!((mean - 0.9).abs() < 1e-12);

        let records = report.records();
        assert!(records[0].is_snippet);
        assert!(records[1].acc.is_none());
        assert!(records[1].error.as_deref().unwrap().starts_with("no prediction"));
    }

    #[test]
    fn test_baseline_failure_is_file_scoped() {
        let good = int_declaration();
        let mut other = good.clone();
        other.source.source = "int z = 1;".to_string();

        let mut predictor = BaselinePredictor::default();
        predictor.insert(
            good.file_id(),
            r#"[["int", "Keyword", 1], [" ", "Text", 0], ["x", "Name", 7],
                [" ", "Text", 0], ["=", "Operator", 0], [" ", "Text", 0],
                ["1", "Number", "2"], [";", "Punctuation", 0]]"#,
        );
        predictor.insert(other.file_id(), r#"[["int", "Keyword", "kw"]]"#);

        let report = Evaluator::new(TaskCode::Full).run(&[good, other], &mut predictor, false);
        assert_eq!(report.mean(), Some(1.0));
        assert!(matches!(
            report.outcomes[1].result,
            Err(EvalError::Baseline(BaselineError::BadCategory { .. }))
        ));
    }

    #[test]
    fn test_degenerate_records_fail_when_not_skipped() {
        let mut degenerate = int_declaration();
        degenerate.hetas.clear();
        let mut predictor = ModelPredictor::default();
        predictor.insert(degenerate.file_id(), Vec::new());
        let report = Evaluator::new(TaskCode::Full)
            .with_skip_degenerate(false)
            .run(&[degenerate], &mut predictor, false);
        assert_eq!(report.skipped, 0);
        assert!(matches!(
            report.outcomes[0].result,
            Err(EvalError::Score(ScoreError::EmptyReference))
        ));
        assert_eq!(report.mean(), None);
    }
}
