// Evaluation bar: the advocate turn's keyword heuristic.
//
// "Evidence found" only means an evidence keyword appeared in the advocate's
// text; the label says so to avoid reading it as a fact-check.

use debate_core::debate::EvaluationMetrics;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = match &state.report {
        Some(report) => metrics_line(&report.metrics),
        None => Line::from(Span::styled(
            "No debate evaluated yet.",
            Style::default().fg(Color::DarkGray),
        )),
    };

    let paragraph = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .title("Evaluation (advocate)"),
    );
    frame.render_widget(paragraph, area);
}

pub fn metrics_line(metrics: &EvaluationMetrics) -> Line<'static> {
    let (evidence, evidence_color) = if metrics.evidence_found {
        ("Yes", Color::Green)
    } else {
        ("No", Color::Red)
    };
    Line::from(vec![
        Span::raw(" Evidence found: "),
        Span::styled(
            evidence,
            Style::default()
                .fg(evidence_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" (keyword match)", Style::default().fg(Color::DarkGray)),
        Span::styled("  |  ", Style::default().fg(Color::Gray)),
        Span::raw(format!("Length score: {:.2}", metrics.length_score)),
    ])
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
