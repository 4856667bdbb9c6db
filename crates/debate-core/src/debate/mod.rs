// Two-turn debate pipeline: prompt templates, the orchestrator that runs the
// skeptic and advocate turns, output post-processing, and the evidence
// heuristic that scores the advocate.

pub mod evaluate;
pub mod orchestrator;
pub mod postprocess;
pub mod prompt;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::provider::ProviderError;

pub use evaluate::{evaluate, EvaluationMetrics, Evaluator};
pub use orchestrator::DebateOrchestrator;
pub use postprocess::{continuation, remove_label, strip_label, RepetitionGuard};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Which side of the debate produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Skeptic,
    Advocate,
}

impl Role {
    pub fn display_name(self) -> &'static str {
        match self {
            Role::Skeptic => "Skeptic",
            Role::Advocate => "Advocate",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Role::Skeptic => "skeptic",
            Role::Advocate => "advocate",
        })
    }
}

/// Raw text of one model invocation and the role that asked for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
}

/// Outcome of one debate. Built once per request and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateResult {
    pub claim: String,
    pub skeptic_text: String,
    pub advocate_text: String,
}

/// A debate together with the advocate's evaluation, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebateReport {
    pub result: DebateResult,
    pub metrics: EvaluationMetrics,
}

impl DebateReport {
    pub fn new(result: DebateResult, evaluator: &Evaluator) -> Self {
        let metrics = evaluator.evaluate(&result.advocate_text);
        DebateReport { result, metrics }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A debate could not be completed. Always names the turn that failed.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("model unavailable during the {turn} turn: {source}")]
    ModelUnavailable {
        turn: Role,
        #[source]
        source: ProviderError,
    },

    #[error("generation failed during the {turn} turn: {source}")]
    GenerationFailed {
        turn: Role,
        #[source]
        source: ProviderError,
    },
}

impl GenerationError {
    /// Classify a provider failure for the given turn.
    pub fn from_provider(turn: Role, source: ProviderError) -> Self {
        if source.is_unavailable() {
            GenerationError::ModelUnavailable { turn, source }
        } else {
            GenerationError::GenerationFailed { turn, source }
        }
    }

    pub fn turn(&self) -> Role {
        match self {
            GenerationError::ModelUnavailable { turn, .. }
            | GenerationError::GenerationFailed { turn, .. } => *turn,
        }
    }
}
