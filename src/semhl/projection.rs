//! Per-character projection
//!
//! Scoring and rendering work on one category per character of the source. Anything
//! that can list `(span, category)` pairs projects onto that representation through
//! [`ClassifiedSpans`]: the engine's own [`Heta`]s carry their spans, while baseline
//! tokens are laid end to end from offset zero by their text length.
//!
//! Cells no span covers stay unclassified (`None`).

use super::annotation::Heta;
use super::baseline::BaselineToken;
use super::hcode::HCode;
use super::syntax::Span;
use super::task::TaskCode;
use serde::Serialize;

pub trait ClassifiedSpans {
    fn classified_spans(&self) -> Vec<(Span, HCode)>;
}

impl ClassifiedSpans for [Heta] {
    fn classified_spans(&self) -> Vec<(Span, HCode)> {
        self.iter()
            .filter_map(|heta| heta.span().map(|span| (span, heta.hcode)))
            .collect()
    }
}

impl ClassifiedSpans for [BaselineToken] {
    fn classified_spans(&self) -> Vec<(Span, HCode)> {
        let mut offset = 0;
        self.iter()
            .filter_map(|token| {
                let len = token.char_len();
                let start = offset;
                offset += len;
                // An empty text yields no cells; its span would be degenerate anyway.
                (len > 0).then(|| (Span::new(start, start + len - 1), token.category))
            })
            .collect()
    }
}

/// One category per source character.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HCharSeq {
    cells: Vec<Option<HCode>>,
}

impl HCharSeq {
    /// Projects `spans` over `source`.
    ///
    /// Later spans overwrite earlier ones. Degenerate spans and spans starting past the
    /// end are skipped; a span running past the end is clipped.
    pub fn project<S>(spans: &S, source: &str) -> Self
    where
        S: ClassifiedSpans + ?Sized,
    {
        let len = source.chars().count();
        let mut cells = vec![None; len];
        for (span, hcode) in spans.classified_spans() {
            if span.is_empty() || span.start >= len {
                continue;
            }
            let stop = span.stop.min(len - 1);
            cells[span.start..=stop].fill(Some(hcode));
        }
        Self { cells }
    }

    pub fn from_cells(cells: Vec<Option<HCode>>) -> Self {
        Self { cells }
    }

    /// Coarsens every classified cell to `task`'s granularity.
    pub fn adapt(&mut self, task: TaskCode) {
        for hcode in self.cells.iter_mut().flatten() {
            *hcode = task.adapt(*hcode);
        }
    }

    pub fn adapted(&self, task: TaskCode) -> Self {
        let mut adapted = self.clone();
        adapted.adapt(task);
        adapted
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<HCode> {
        self.cells.get(index).copied().flatten()
    }

    pub fn cells(&self) -> &[Option<HCode>] {
        &self.cells
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semhl::annotation::Eta;
    use crate::semhl::syntax::TokenKind;
    use serde_json::Value;

    fn heta(start: i64, stop: i64, text: &str, hcode: HCode) -> Heta {
        Heta::new(
            Eta {
                start,
                stop,
                text: text.to_string(),
                token_rule: TokenKind(1),
                parent_rule: None,
                symbolic_name: String::new(),
            },
            hcode,
        )
    }

    fn baseline(text: &str, category: HCode) -> BaselineToken {
        BaselineToken {
            text: text.to_string(),
            label: Value::Null,
            category,
        }
    }

    #[test]
    fn test_gaps_stay_unclassified() {
        let hetas = vec![
            heta(0, 2, "int", HCode::Keyword),
            heta(4, 4, "x", HCode::VariableDeclarator),
        ];
        let seq = HCharSeq::project(hetas.as_slice(), "int x");
        assert_eq!(seq.len(), 5);
        assert_eq!(seq.get(0), Some(HCode::Keyword));
        assert_eq!(seq.get(3), None);
        assert_eq!(seq.get(4), Some(HCode::VariableDeclarator));
        assert_eq!(seq.get(5), None);
    }

    #[test]
    fn test_out_of_range_and_degenerate_spans() {
        let hetas = vec![
            heta(3, 2, "", HCode::Keyword),
            heta(-1, -1, "<EOF>", HCode::Comment),
            heta(2, 9, "xyz", HCode::Literal),
            heta(7, 8, "zz", HCode::Comment),
        ];
        let seq = HCharSeq::project(hetas.as_slice(), "abcd");
        assert_eq!(
            seq.cells(),
            &[None, None, Some(HCode::Literal), Some(HCode::Literal)]
        );
    }

    #[test]
    fn test_baseline_tokens_are_laid_end_to_end() {
        let tokens = vec![
            baseline("int", HCode::Keyword),
            baseline(" ", HCode::Any),
            baseline("", HCode::Comment),
            baseline("é", HCode::VariableDeclarator),
        ];
        let seq = HCharSeq::project(tokens.as_slice(), "int é");
        assert_eq!(seq.get(2), Some(HCode::Keyword));
        assert_eq!(seq.get(3), Some(HCode::Any));
        assert_eq!(seq.get(4), Some(HCode::VariableDeclarator));
    }

    #[test]
    fn test_adapt_keeps_unclassified_cells() {
        let mut seq = HCharSeq::from_cells(vec![Some(HCode::FieldIdentifier), None]);
        seq.adapt(TaskCode::Lexical);
        assert_eq!(seq.cells(), &[Some(HCode::Any), None]);
    }
}
