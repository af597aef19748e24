//! Baseline lexer payloads
//!
//! A baseline tool answers with a JSON array of `[text, label, category]` triples that
//! cover the source in order, whitespace included. The category is an HCode ordinal,
//! sent either as a number or as a numeric string.

use super::hcode::{HCode, UnknownHCode};
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BaselineError {
    #[error("malformed baseline payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("triple {index}: category {value} is not an integer")]
    BadCategory { index: usize, value: Value },
    #[error("triple {index}: {source}")]
    UnknownCategory {
        index: usize,
        #[source]
        source: UnknownHCode,
    },
}

/// One token as classified by a baseline tool.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaselineToken {
    pub text: String,
    /// The tool's own token label, kept verbatim.
    pub label: Value,
    pub category: HCode,
}

impl BaselineToken {
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

pub fn decode(payload: &str) -> Result<Vec<BaselineToken>, BaselineError> {
    let triples: Vec<(String, Value, Value)> = serde_json::from_str(payload)?;
    triples
        .into_iter()
        .enumerate()
        .map(|(index, (text, label, category))| {
            let ordinal = category_ordinal(&category)
                .ok_or_else(|| BaselineError::BadCategory {
                    index,
                    value: category.clone(),
                })?;
            let category = HCode::from_ordinal(ordinal)
                .map_err(|source| BaselineError::UnknownCategory { index, source })?;
            Ok(BaselineToken {
                text,
                label,
                category,
            })
        })
        .collect()
}

fn category_ordinal(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}
