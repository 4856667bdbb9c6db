// Messages exchanged between the TUI, the app orchestrator, and spawned
// debate tasks.
//
// TUI -> app: `UserCommand`
// app -> TUI: `UiUpdate`
// debate task -> app: `DebateEvent` (tagged with a generation so results from
// a superseded debate are dropped)

use debate_core::{DebateReport, DebateResult, GenerationError};

/// Commands the TUI sends to the app orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub enum UserCommand {
    /// Run a debate on `claim`, replacing any debate in flight.
    StartDebate { claim: String },
    Quit,
}

/// Whether the model provider could be built at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderStatus {
    /// Ready to debate; carries the provider's display name.
    Ready(String),
    /// Provider failed to load; debates are refused.
    Unavailable(String),
}

/// Lifecycle of the debate shown in the TUI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebateStatus {
    #[default]
    Idle,
    Running,
    Complete,
    Error,
}

/// Updates the app orchestrator pushes to the TUI.
#[derive(Debug, Clone, PartialEq)]
pub enum UiUpdate {
    ProviderStatus(ProviderStatus),
    /// A debate task was spawned for `claim`. Earlier results are stale.
    DebateStarted { claim: String },
    DebateComplete(Box<DebateReport>),
    /// The debate failed or was refused. `message` names the failing turn
    /// when a model call was the cause.
    DebateFailed { message: String },
}

/// Outcome of a spawned debate task.
#[derive(Debug)]
pub struct DebateEvent {
    pub generation: u64,
    pub outcome: Result<DebateResult, GenerationError>,
}
