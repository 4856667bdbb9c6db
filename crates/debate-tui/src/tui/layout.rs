// Screen layout for the debate form.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +--------------------------------------------------+
// | Claim Input (3 rows)                              |
// +-------------------------+------------------------+
// | Skeptic (50%)            | Advocate (50%)         |
// +-------------------------+------------------------+
// | Evaluation (3 rows)                               |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each zone.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Provider, debate status, and the last error.
    pub status_bar: Rect,
    pub claim_input: Rect,
    pub skeptic: Rect,
    pub advocate: Rect,
    /// Metrics for the advocate turn.
    pub evaluation: Rect,
    /// Keyboard shortcut hints.
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(3), // claim input
            Constraint::Min(6),    // turns
            Constraint::Length(3), // evaluation
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let turns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(vertical[2]);

    AppLayout {
        status_bar: vertical[0],
        claim_input: vertical[1],
        skeptic: turns[0],
        advocate: turns[1],
        evaluation: vertical[3],
        help_bar: vertical[4],
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
