// App orchestrator: owns the debate engine and runs the event loop that
// connects the TUI to spawned debate tasks.
//
// At most one debate is in flight. Starting a new one aborts the previous
// task and bumps `debate_generation`; any result that still arrives from an
// older generation is discarded.

use std::sync::Arc;

use debate_core::config::Config;
use debate_core::debate::{DebateOrchestrator, Evaluator};
use debate_core::{DebateReport, LoadError, ModelProvider};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::protocol::{DebateEvent, DebateStatus, ProviderStatus, UiUpdate, UserCommand};

// ---------------------------------------------------------------------------
// DebateEngine
// ---------------------------------------------------------------------------

/// Either a ready orchestrator or the reason the provider failed to load.
pub enum DebateEngine {
    Active(Arc<DebateOrchestrator>),
    Disabled { reason: String },
}

impl DebateEngine {
    /// Wrap the result of `debate_llm::build_provider`.
    pub fn from_provider(
        provider: Result<Arc<dyn ModelProvider>, LoadError>,
        config: &Config,
    ) -> Self {
        match provider {
            Ok(provider) => {
                DebateEngine::Active(Arc::new(DebateOrchestrator::from_config(provider, config)))
            }
            Err(e) => DebateEngine::Disabled {
                reason: e.to_string(),
            },
        }
    }

    pub fn status(&self) -> ProviderStatus {
        match self {
            DebateEngine::Active(orch) => ProviderStatus::Ready(orch.provider_name().to_string()),
            DebateEngine::Disabled { reason } => ProviderStatus::Unavailable(reason.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// AppState
// ---------------------------------------------------------------------------

pub struct AppState {
    pub engine: DebateEngine,
    pub evaluator: Evaluator,
    pub status: DebateStatus,
    pub current_task: Option<tokio::task::JoinHandle<()>>,
    /// Incremented each time a debate task is spawned. Events from other
    /// generations are discarded in `handle_debate_event`.
    pub debate_generation: u64,
    /// Spawned tasks report their outcome through a clone of this sender.
    pub debate_tx: mpsc::Sender<DebateEvent>,
}

impl AppState {
    pub fn new(
        engine: DebateEngine,
        evaluator: Evaluator,
        debate_tx: mpsc::Sender<DebateEvent>,
    ) -> Self {
        AppState {
            engine,
            evaluator,
            status: DebateStatus::Idle,
            current_task: None,
            debate_generation: 0,
            debate_tx,
        }
    }

    /// Cancel the current debate task if one is running.
    pub fn cancel_debate_task(&mut self) {
        if let Some(handle) = self.current_task.take() {
            handle.abort();
            info!("Cancelled previous debate task");
        }
    }

    /// Spawn a debate task for `claim`.
    ///
    /// Returns the update to show: `DebateStarted` when a task was spawned,
    /// `DebateFailed` when the claim is blank or no provider is loaded.
    pub fn start_debate(&mut self, claim: &str) -> UiUpdate {
        if claim.trim().is_empty() {
            return UiUpdate::DebateFailed {
                message: "Enter a claim to debate.".to_string(),
            };
        }

        let orchestrator = match &self.engine {
            DebateEngine::Active(orch) => Arc::clone(orch),
            DebateEngine::Disabled { reason } => {
                warn!(%reason, "debate refused: model not loaded");
                return UiUpdate::DebateFailed {
                    message: format!("Model not loaded: {reason}"),
                };
            }
        };

        self.cancel_debate_task();
        self.debate_generation += 1;
        let generation = self.debate_generation;
        self.status = DebateStatus::Running;

        let tx = self.debate_tx.clone();
        let task_claim = claim.to_string();
        let handle = tokio::spawn(async move {
            let outcome = orchestrator.run_debate(&task_claim).await;
            let _ = tx.send(DebateEvent { generation, outcome }).await;
        });
        self.current_task = Some(handle);

        info!(generation, "Started debate");
        UiUpdate::DebateStarted {
            claim: claim.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Event loop
// ---------------------------------------------------------------------------

/// Run the app orchestrator until `Quit` arrives or the command channel
/// closes.
///
/// Listens on two channels with `tokio::select!`:
/// 1. Debate outcomes from spawned tasks
/// 2. User commands from the TUI
pub async fn run(
    mut debate_rx: mpsc::Receiver<DebateEvent>,
    mut cmd_rx: mpsc::Receiver<UserCommand>,
    ui_tx: mpsc::Sender<UiUpdate>,
    mut state: AppState,
) -> anyhow::Result<()> {
    info!("Application event loop started");
    let _ = ui_tx
        .send(UiUpdate::ProviderStatus(state.engine.status()))
        .await;

    // AppState holds a sender, so this only closes if the state is torn
    // down; guard anyway so select! never spins on a closed channel.
    let mut debate_open = true;

    loop {
        tokio::select! {
            event = debate_rx.recv(), if debate_open => {
                match event {
                    Some(event) => handle_debate_event(&mut state, event, &ui_tx).await,
                    None => {
                        info!("Debate channel closed");
                        debate_open = false;
                    }
                }
            }

            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(UserCommand::Quit) => {
                        info!("Quit command received, shutting down");
                        break;
                    }
                    Some(UserCommand::StartDebate { claim }) => {
                        let update = state.start_debate(&claim);
                        let _ = ui_tx.send(update).await;
                    }
                    None => {
                        info!("Command channel closed, shutting down");
                        break;
                    }
                }
            }
        }
    }

    state.cancel_debate_task();
    info!("Application event loop exiting");
    Ok(())
}

/// Apply a finished debate if it belongs to the current generation.
async fn handle_debate_event(
    state: &mut AppState,
    event: DebateEvent,
    ui_tx: &mpsc::Sender<UiUpdate>,
) {
    if event.generation != state.debate_generation {
        debug!(
            event_generation = event.generation,
            current = state.debate_generation,
            "Discarding stale debate result"
        );
        return;
    }
    state.current_task = None;

    match event.outcome {
        Ok(result) => {
            let report = DebateReport::new(result, &state.evaluator);
            info!(
                length_score = report.metrics.length_score,
                evidence_found = report.metrics.evidence_found,
                "Debate evaluated"
            );
            state.status = DebateStatus::Complete;
            let _ = ui_tx.send(UiUpdate::DebateComplete(Box::new(report))).await;
        }
        Err(e) => {
            warn!(turn = %e.turn(), error = %e, "Debate failed");
            state.status = DebateStatus::Error;
            let _ = ui_tx
                .send(UiUpdate::DebateFailed {
                    message: e.to_string(),
                })
                .await;
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
