//! Char-weighted accuracy
//!
//! Accuracy is measured over the characters of the source. Characters covered by a
//! reference token count as correct when the prediction agrees with the reference at
//! the task's granularity. Characters no reference token covers (whitespace, mostly)
//! are credited as correct, so files heavy on formatting are not dominated by it:
//!
//! ```text
//! score = (matched + (num_chars - covered_chars)) / num_chars
//! ```
//!
//! A prediction that disagrees on every covered character therefore still scores
//! `(num_chars - covered_chars) / num_chars`, never zero.

use super::annotation::Heta;
use super::hcode::HCode;
use super::projection::HCharSeq;
use super::task::TaskCode;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScoreError {
    #[error("source is empty")]
    EmptySource,
    #[error("reference has no tokens")]
    EmptyReference,
    #[error("{predicted} predictions for {reference} reference tokens")]
    LengthMismatch { predicted: usize, reference: usize },
}

/// Scores a per-character prediction against reference tokens.
///
/// Both sides are adapted to `task` before comparison. Predicted cells past the end of
/// `predicted`, or left unclassified, never match.
pub fn score_chars(
    predicted: &HCharSeq,
    reference: &[Heta],
    source: &str,
    task: TaskCode,
) -> Result<f64, ScoreError> {
    let num_chars = checked_len(reference, source)?;
    let mut covered = 0usize;
    let mut matched = 0usize;
    for heta in reference {
        let Some(span) = heta.span().filter(|span| !span.is_empty()) else {
            continue;
        };
        covered += span.len();
        let target = task.adapt(heta.hcode);
        matched += (span.start..=span.stop)
            .filter(|&index| predicted.get(index).map(|hcode| task.adapt(hcode)) == Some(target))
            .count();
    }
    Ok(ratio(matched, covered, num_chars))
}

/// Scores one whole-token prediction per reference token.
///
/// Predictions are expected at `task` granularity already; only the reference side is
/// adapted. A token counts with its full text length when its prediction matches.
pub fn score_tokens(
    predicted: &[HCode],
    reference: &[Heta],
    source: &str,
    task: TaskCode,
) -> Result<f64, ScoreError> {
    let num_chars = checked_len(reference, source)?;
    if predicted.len() != reference.len() {
        return Err(ScoreError::LengthMismatch {
            predicted: predicted.len(),
            reference: reference.len(),
        });
    }
    let mut covered = 0usize;
    let mut matched = 0usize;
    for (prediction, heta) in predicted.iter().zip(reference) {
        let size = heta.eta.char_len();
        covered += size;
        if *prediction == task.adapt(heta.hcode) {
            matched += size;
        }
    }
    Ok(ratio(matched, covered, num_chars))
}

fn checked_len(reference: &[Heta], source: &str) -> Result<usize, ScoreError> {
    let num_chars = source.chars().count();
    if num_chars == 0 {
        return Err(ScoreError::EmptySource);
    }
    if reference.is_empty() {
        return Err(ScoreError::EmptyReference);
    }
    Ok(num_chars)
}

fn ratio(matched: usize, covered: usize, num_chars: usize) -> f64 {
    // `covered` may exceed `num_chars` on overlapping references; keep the signed form.
    (matched as f64 + num_chars as f64 - covered as f64) / num_chars as f64
}
