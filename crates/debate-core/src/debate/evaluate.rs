// Advocate scoring heuristic.
//
// This is a keyword-presence check, not a fact-check. `evidence_found` only
// means one of the configured words ("study", "research" by default) appears
// somewhere in the text; it does not mean the text cites anything real. That
// limitation is intentional and should not be "fixed" by tightening the match.

use serde::Serialize;

use crate::config::EvaluationConfig;

/// Word count divisor for `length_score`.
pub const WORDS_PER_POINT: f64 = 100.0;

/// Heuristic metrics for one turn of text.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EvaluationMetrics {
    /// Whitespace-delimited word count / 100. Unbounded above.
    pub length_score: f64,
    /// Whether any evidence keyword appears (case-insensitive).
    pub evidence_found: bool,
}

impl EvaluationMetrics {
    /// `evidence_found` as the 1/0 score the metric display uses.
    pub fn evidence_score(&self) -> u8 {
        u8::from(self.evidence_found)
    }
}

/// Keyword-based evaluator. Keywords are stored lowercase.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluator {
    keywords: Vec<String>,
}

impl Default for Evaluator {
    fn default() -> Self {
        Evaluator::from_config(&EvaluationConfig::default())
    }
}

impl Evaluator {
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Evaluator {
            keywords: keywords
                .into_iter()
                .map(|k| k.as_ref().to_lowercase())
                .collect(),
        }
    }

    pub fn from_config(config: &EvaluationConfig) -> Self {
        Evaluator::with_keywords(&config.evidence_keywords)
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn evaluate(&self, text: &str) -> EvaluationMetrics {
        let word_count = text.split_whitespace().count();
        let lowered = text.to_lowercase();
        EvaluationMetrics {
            length_score: word_count as f64 / WORDS_PER_POINT,
            evidence_found: self.keywords.iter().any(|k| lowered.contains(k.as_str())),
        }
    }
}

/// Evaluate `text` with the default keywords ("study", "research").
pub fn evaluate(text: &str) -> EvaluationMetrics {
    Evaluator::default().evaluate(text)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
