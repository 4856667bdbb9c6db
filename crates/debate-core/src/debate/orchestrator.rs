// Debate orchestrator: runs the skeptic turn, then the advocate turn with the
// skeptic's raw output embedded in its prompt, then cleans both turns.
//
// Turns are strictly sequential. The orchestrator holds no per-debate state,
// so one instance can serve concurrent debates as long as the provider can.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::config::{Config, PromptConfig};
use crate::provider::{GenerationParams, ModelProvider};

use super::postprocess::{continuation, remove_label, RepetitionGuard};
use super::prompt::{build_advocate_prompt, build_skeptic_prompt};
use super::{DebateResult, GenerationError, Role, Turn};

pub struct DebateOrchestrator {
    provider: Arc<dyn ModelProvider>,
    prompts: PromptConfig,
    params: GenerationParams,
    guard: Option<RepetitionGuard>,
}

impl DebateOrchestrator {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        prompts: PromptConfig,
        params: GenerationParams,
        guard: Option<RepetitionGuard>,
    ) -> Self {
        DebateOrchestrator {
            provider,
            prompts,
            params,
            guard,
        }
    }

    /// Build an orchestrator from the `[prompts]`, `[generation]` and
    /// `[repetition_guard]` sections.
    pub fn from_config(provider: Arc<dyn ModelProvider>, config: &Config) -> Self {
        DebateOrchestrator::new(
            provider,
            config.prompts.clone(),
            config.generation.clone(),
            RepetitionGuard::from_config(&config.repetition_guard),
        )
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Run both turns for `claim`.
    ///
    /// The claim is passed through as-is. A provider failure in either turn
    /// aborts the debate; no partial result is returned and nothing is retried.
    pub async fn run_debate(&self, claim: &str) -> Result<DebateResult, GenerationError> {
        info!(claim, provider = self.provider.name(), "starting debate");

        let skeptic_prompt = build_skeptic_prompt(&self.prompts, claim);
        let skeptic = self.run_turn(Role::Skeptic, &skeptic_prompt).await?;

        let advocate_prompt = build_advocate_prompt(&self.prompts, claim, &skeptic.text);
        let advocate = self.run_turn(Role::Advocate, &advocate_prompt).await?;

        let result = DebateResult {
            claim: claim.to_string(),
            skeptic_text: self.clean(&skeptic, &skeptic_prompt),
            advocate_text: self.clean(&advocate, &advocate_prompt),
        };

        info!(
            skeptic_len = result.skeptic_text.len(),
            advocate_len = result.advocate_text.len(),
            "debate complete"
        );
        Ok(result)
    }

    async fn run_turn(&self, role: Role, prompt: &str) -> Result<Turn, GenerationError> {
        debug!(turn = %role, prompt_len = prompt.len(), "invoking model");

        let text = self
            .provider
            .generate(prompt, &self.params)
            .await
            .map_err(|e| {
                warn!(turn = %role, error = %e, "model invocation failed");
                GenerationError::from_provider(role, e)
            })?;

        debug!(turn = %role, output_len = text.len(), "turn generated");
        Ok(Turn { role, text })
    }

    /// Cut the echoed `prompt`, check the continuation against the repetition
    /// guard, then remove leftover copies of the role's label.
    pub fn clean(&self, turn: &Turn, prompt: &str) -> String {
        let label = match turn.role {
            Role::Skeptic => &self.prompts.skeptic_label,
            Role::Advocate => &self.prompts.advocate_label,
        };
        let own_text = continuation(&turn.text, prompt, label);
        if let Some(warning) = self.guard.as_ref().and_then(|g| g.check(own_text)) {
            return warning.to_string();
        }
        remove_label(own_text, label)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
