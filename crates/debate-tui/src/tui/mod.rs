// TUI debate form: layout, input handling, and widget rendering.
//
// The TUI owns a `ViewState` that mirrors what the app orchestrator reports.
// The app pushes `UiUpdate` messages over an mpsc channel; the TUI applies
// them to `ViewState` and re-renders at ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::time::Duration;

use crossterm::event::{Event, EventStream};
use debate_core::{DebateReport, Role};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::mpsc;

use crate::protocol::{DebateStatus, ProviderStatus, UiUpdate, UserCommand};

use layout::{build_layout, AppLayout};

// ---------------------------------------------------------------------------
// Focus
// ---------------------------------------------------------------------------

/// Which pane receives keyboard input. Tab cycles forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Claim,
    Skeptic,
    Advocate,
}

impl Focus {
    pub fn next(self) -> Focus {
        match self {
            Focus::Claim => Focus::Skeptic,
            Focus::Skeptic => Focus::Advocate,
            Focus::Advocate => Focus::Claim,
        }
    }

    pub fn prev(self) -> Focus {
        match self {
            Focus::Claim => Focus::Advocate,
            Focus::Skeptic => Focus::Claim,
            Focus::Advocate => Focus::Skeptic,
        }
    }

    /// The turn panel this focus scrolls, if any.
    pub fn role(self) -> Option<Role> {
        match self {
            Focus::Claim => None,
            Focus::Skeptic => Some(Role::Skeptic),
            Focus::Advocate => Some(Role::Advocate),
        }
    }
}

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state, updated incrementally via `UiUpdate` messages.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Editable claim text.
    pub claim_input: String,
    pub focus: Focus,
    /// `None` until the app reports whether the provider loaded.
    pub provider_status: Option<ProviderStatus>,
    pub debate_status: DebateStatus,
    /// Claim of the debate currently running or last shown.
    pub active_claim: Option<String>,
    pub report: Option<DebateReport>,
    /// Last error or refusal, shown in the status bar.
    pub error_message: Option<String>,
    pub skeptic_scroll: u16,
    pub advocate_scroll: u16,
    /// Whether the quit confirmation dialog is showing.
    pub confirm_quit: bool,
}

impl ViewState {
    /// Fresh state with the claim input pre-filled.
    pub fn new(default_claim: &str) -> Self {
        ViewState {
            claim_input: default_claim.to_string(),
            ..ViewState::default()
        }
    }

    pub fn scroll_mut(&mut self, role: Role) -> &mut u16 {
        match role {
            Role::Skeptic => &mut self.skeptic_scroll,
            Role::Advocate => &mut self.advocate_scroll,
        }
    }

    /// Text for a turn panel, if a report is showing.
    pub fn turn_text(&self, role: Role) -> Option<&str> {
        self.report.as_ref().map(|r| match role {
            Role::Skeptic => r.result.skeptic_text.as_str(),
            Role::Advocate => r.result.advocate_text.as_str(),
        })
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
pub fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::ProviderStatus(status) => {
            state.provider_status = Some(status);
        }
        UiUpdate::DebateStarted { claim } => {
            state.debate_status = DebateStatus::Running;
            state.active_claim = Some(claim);
            state.report = None;
            state.error_message = None;
            state.skeptic_scroll = 0;
            state.advocate_scroll = 0;
        }
        UiUpdate::DebateComplete(report) => {
            state.debate_status = DebateStatus::Complete;
            state.active_claim = Some(report.result.claim.clone());
            state.report = Some(*report);
        }
        UiUpdate::DebateFailed { message } => {
            state.debate_status = DebateStatus::Error;
            state.report = None;
            state.error_message = Some(message);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

/// Render the complete form.
pub fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::claim_input::render(frame, layout.claim_input, state, state.focus == Focus::Claim);
    render_turns(frame, &layout, state);
    widgets::evaluation::render(frame, layout.evaluation, state);
    render_help_bar(frame, &layout, state);

    if state.confirm_quit {
        widgets::quit_confirm::render(frame, frame.area());
    }
}

fn render_turns(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    for (role, area, scroll) in [
        (Role::Skeptic, layout.skeptic, state.skeptic_scroll),
        (Role::Advocate, layout.advocate, state.advocate_scroll),
    ] {
        widgets::turn_panel::render(
            frame,
            area,
            widgets::turn_panel::TurnView {
                role,
                text: state.turn_text(role),
                status: state.debate_status,
                scroll,
            },
            state.focus.role() == Some(role),
        );
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let text = match state.focus {
        Focus::Claim => " Enter:Debate | Ctrl+U:Clear | Tab:Focus | Esc:Quit",
        Focus::Skeptic | Focus::Advocate => {
            " Enter:Debate | Up/Down:Scroll | Tab:Focus | Esc:Quit"
        }
    };
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        text,
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs an async select loop: UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
    default_claim: &str,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::new(default_claim);
    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            update = ui_rx.recv() => {
                match update {
                    Some(ui_update) => apply_ui_update(&mut view_state, ui_update),
                    // App is shutting down.
                    None => break Ok(()),
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    // Mouse, resize, focus
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::from(e)),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::from(e));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
