// Turn panel widget: one side of the debate (skeptic or advocate).
//
// Header: "Skeptic -- debating.../complete"
// Body: the cleaned turn text with word wrap, scrolled by the user.

use debate_core::Role;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;

use super::focused_border_style;
use crate::protocol::DebateStatus;

/// What one panel shows.
#[derive(Debug, Clone, Copy)]
pub struct TurnView<'a> {
    pub role: Role,
    /// `None` until a report is available.
    pub text: Option<&'a str>,
    pub status: DebateStatus,
    pub scroll: u16,
}

pub fn render(frame: &mut Frame, area: Rect, view: TurnView<'_>, focused: bool) {
    let (body, body_style) = match view.text {
        Some("") => ("(no output)".to_string(), Style::default().fg(Color::DarkGray)),
        Some(text) => (text.to_string(), Style::default()),
        None => (
            placeholder_text(view.status).to_string(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let border = focused_border_style(focused, border_style(view.status));
    let paragraph = Paragraph::new(body)
        .style(body_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(build_title(view.role, view.status))
                .border_style(border),
        )
        .wrap(Wrap { trim: false })
        .scroll((view.scroll, 0));
    frame.render_widget(paragraph, area);
}

fn build_title(role: Role, status: DebateStatus) -> Line<'static> {
    let mut spans = vec![Span::styled(
        role.display_name(),
        Style::default()
            .fg(role_color(role))
            .add_modifier(Modifier::BOLD),
    )];
    if status == DebateStatus::Running {
        spans.push(Span::styled(" -- ", Style::default().fg(Color::DarkGray)));
        spans.push(Span::styled("debating...", Style::default().fg(Color::Yellow)));
    }
    Line::from(spans)
}

pub fn role_color(role: Role) -> Color {
    match role {
        Role::Skeptic => Color::Magenta,
        Role::Advocate => Color::Cyan,
    }
}

fn border_style(status: DebateStatus) -> Style {
    match status {
        DebateStatus::Running => Style::default().fg(Color::Yellow),
        DebateStatus::Error => Style::default().fg(Color::Red),
        _ => Style::default(),
    }
}

/// Body text when no report is showing.
pub fn placeholder_text(status: DebateStatus) -> &'static str {
    match status {
        DebateStatus::Idle => "Press Enter to start the debate.",
        DebateStatus::Running => "Waiting for the model...",
        DebateStatus::Complete => "",
        DebateStatus::Error => "Debate failed. See the status bar.",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
