// Status bar widget: provider indicator, debate status, last error.

use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use crate::protocol::{DebateStatus, ProviderStatus};
use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [provider indicator] [provider name] | [debate status] [error]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    let (dot, dot_color) = provider_indicator(state.provider_status.as_ref());
    spans.push(Span::styled(format!(" {dot} "), Style::default().fg(dot_color)));
    spans.push(Span::styled(
        provider_label(state.provider_status.as_ref()),
        Style::default().fg(Color::White),
    ));

    spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));

    let (status_text, status_color) = debate_status_indicator(state.debate_status);
    spans.push(Span::styled(status_text, Style::default().fg(status_color)));

    if let Some(message) = &state.error_message {
        spans.push(Span::styled(" | ", Style::default().fg(Color::Gray)));
        spans.push(Span::styled(message.clone(), Style::default().fg(Color::Red)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot character and color for the provider state.
pub fn provider_indicator(status: Option<&ProviderStatus>) -> (&'static str, Color) {
    match status {
        Some(ProviderStatus::Ready(_)) => ("●", Color::Green),
        Some(ProviderStatus::Unavailable(_)) => ("●", Color::Red),
        None => ("●", Color::DarkGray),
    }
}

pub fn provider_label(status: Option<&ProviderStatus>) -> String {
    match status {
        Some(ProviderStatus::Ready(name)) => name.clone(),
        Some(ProviderStatus::Unavailable(reason)) => format!("model not loaded: {reason}"),
        None => "loading model...".to_string(),
    }
}

pub fn debate_status_indicator(status: DebateStatus) -> (&'static str, Color) {
    match status {
        DebateStatus::Idle => ("ready", Color::DarkGray),
        DebateStatus::Running => ("debating...", Color::Yellow),
        DebateStatus::Complete => ("complete", Color::Green),
        DebateStatus::Error => ("error", Color::Red),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
