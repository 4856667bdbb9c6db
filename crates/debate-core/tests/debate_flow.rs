// Integration tests for the debate pipeline.
//
// These drive the public API end-to-end with stub providers: prompt
// construction, both model turns, label stripping, the repetition guard, and
// evaluation of the advocate turn.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use debate_core::config::{PromptConfig, RepetitionGuardConfig};
use debate_core::debate::{
    evaluate, strip_label, DebateOrchestrator, Evaluator, RepetitionGuard,
};
use debate_core::{
    DebateReport, GenerationError, GenerationParams, ModelProvider, ProviderError, Role,
};

// ===========================================================================
// Test helpers
// ===========================================================================

/// Echoes the prompt back followed by a fixed continuation, the way a causal
/// LM's decoded output does.
struct EchoProvider {
    continuation: &'static str,
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for EchoProvider {
    fn name(&self) -> &str {
        "echo"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("{prompt} {}", self.continuation))
    }
}

/// Returns fixed strings by call index.
struct FixedProvider {
    outputs: [&'static str; 2],
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for FixedProvider {
    fn name(&self) -> &str {
        "fixed"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let idx = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.outputs[idx.min(1)].to_string())
    }
}

/// Fails every call.
struct BrokenProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl ModelProvider for BrokenProvider {
    fn name(&self) -> &str {
        "broken"
    }

    async fn generate(
        &self,
        _prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(ProviderError::Status {
            status: 500,
            message: "internal error".into(),
        })
    }
}

fn issues_evidence_prompts() -> PromptConfig {
    PromptConfig {
        skeptic_template: "Critique this: {claim}\nIssues:".into(),
        skeptic_label: "Issues:".into(),
        advocate_template: "Defend this: {claim}\nCritique: {skeptic}\nEvidence:".into(),
        advocate_label: "Evidence:".into(),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[tokio::test]
async fn non_failing_provider_yields_both_turns() {
    let provider = Arc::new(EchoProvider {
        continuation: "a study shows otherwise",
        calls: AtomicUsize::new(0),
    });
    let orch = DebateOrchestrator::new(
        provider.clone(),
        PromptConfig::default(),
        GenerationParams::default(),
        None,
    );

    for claim in ["Vaccines cause autism", "x", "{claim} {skeptic}"] {
        let result = orch.run_debate(claim).await.expect("debate should succeed");
        assert_eq!(result.claim, claim);
        assert_eq!(result.skeptic_text, "a study shows otherwise");
        assert_eq!(result.advocate_text, "a study shows otherwise");
    }
    assert_eq!(provider.calls.load(Ordering::SeqCst), 6);
}

#[tokio::test]
async fn fixed_issue_and_evidence_outputs() {
    let provider = Arc::new(FixedProvider {
        outputs: ["Issues: X", "Evidence: Y"],
        calls: AtomicUsize::new(0),
    });
    let orch = DebateOrchestrator::new(
        provider,
        issues_evidence_prompts(),
        GenerationParams::default(),
        None,
    );

    let result = orch.run_debate("Test claim").await.unwrap();
    assert!(result.skeptic_text.contains('X'));
    assert!(result.advocate_text.contains('Y'));
    assert!(!result.skeptic_text.contains("Issues:"));
    assert!(!result.advocate_text.contains("Evidence:"));
}

#[tokio::test]
async fn failing_provider_surfaces_generation_failure() {
    let provider = Arc::new(BrokenProvider {
        calls: AtomicUsize::new(0),
    });
    let orch = DebateOrchestrator::new(
        provider.clone(),
        PromptConfig::default(),
        GenerationParams::default(),
        None,
    );

    match orch.run_debate("claim").await {
        Err(GenerationError::GenerationFailed { turn, source }) => {
            assert_eq!(turn, Role::Skeptic);
            assert!(source.to_string().contains("500"));
        }
        other => panic!("expected GenerationFailed, got {other:?}"),
    }
    // No retry.
    assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn report_evaluates_advocate_turn() {
    let provider = Arc::new(FixedProvider {
        outputs: ["Issues: research is thin", "Evidence: trust me"],
        calls: AtomicUsize::new(0),
    });
    let orch = DebateOrchestrator::new(
        provider,
        issues_evidence_prompts(),
        GenerationParams::default(),
        None,
    );

    let result = orch.run_debate("claim").await.unwrap();
    let report = DebateReport::new(result, &Evaluator::default());

    assert!(!report.metrics.evidence_found, "skeptic keywords must not count");
    assert!((report.metrics.length_score - 0.02).abs() < 1e-9);
}

#[tokio::test]
async fn looping_turn_is_replaced_by_warning() {
    let provider = Arc::new(EchoProvider {
        continuation: "Defense: Defense: Defense: Defense: Defense:",
        calls: AtomicUsize::new(0),
    });
    let guard_config = RepetitionGuardConfig::default();
    let orch = DebateOrchestrator::new(
        provider,
        PromptConfig::default(),
        GenerationParams::default(),
        RepetitionGuard::from_config(&guard_config),
    );

    let result = orch.run_debate("claim").await.unwrap();
    assert_eq!(result.skeptic_text, guard_config.warning);
    // The advocate loops on its own label; the guard sees it before the
    // label copies are removed.
    assert_eq!(result.advocate_text, guard_config.warning);
}

/// Echoes the prompt, then keeps re-emitting the prompt's last line.
struct EchoLoopProvider;

#[async_trait]
impl ModelProvider for EchoLoopProvider {
    fn name(&self) -> &str {
        "echo-loop"
    }

    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, ProviderError> {
        let last_line = prompt.lines().last().unwrap_or_default();
        let tail = format!(" same point.\n{last_line}").repeat(4);
        Ok(format!("{prompt}{tail}"))
    }
}

#[tokio::test]
async fn echo_loop_on_default_labels_trips_guard() {
    let guard_config = RepetitionGuardConfig::default();
    let orch = DebateOrchestrator::new(
        Arc::new(EchoLoopProvider),
        PromptConfig::default(),
        GenerationParams::default(),
        RepetitionGuard::from_config(&guard_config),
    );

    let result = orch.run_debate("Coffee is healthy").await.unwrap();
    assert_eq!(result.skeptic_text, guard_config.warning);
    assert_eq!(result.advocate_text, guard_config.warning);
}

#[test]
fn documented_examples_hold() {
    assert_eq!(
        strip_label("Critique this. Issues: it is flawed.", "Issues:"),
        "it is flawed."
    );
    let once = strip_label("Critique this. Issues: it is flawed.", "Issues:");
    assert_eq!(strip_label(&once, "Issues:"), once);

    let metrics = evaluate("This has no support.");
    assert!((metrics.length_score - 0.04).abs() < 1e-9);
    assert!(!metrics.evidence_found);

    assert!(evaluate("A recent study supports this.").evidence_found);
}
