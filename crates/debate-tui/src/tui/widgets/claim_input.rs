// Claim input widget: single-line editable claim with a cursor when focused.

use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use super::focused_border_style;
use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState, focused: bool) {
    let inner_width = area.width.saturating_sub(2) as usize;
    let visible = visible_tail(&state.claim_input, inner_width.saturating_sub(1));

    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled("Claim", Style::default().add_modifier(Modifier::BOLD)))
        .border_style(focused_border_style(focused, Style::default()));

    let paragraph = if state.claim_input.is_empty() {
        Paragraph::new(Span::styled(PLACEHOLDER, placeholder_style()))
    } else {
        Paragraph::new(visible)
    };
    frame.render_widget(paragraph.block(block), area);

    if focused && area.width > 2 && area.height > 2 {
        let cursor_x = area.x + 1 + visible.chars().count() as u16;
        frame.set_cursor_position(Position::new(
            cursor_x.min(area.x + area.width - 2),
            area.y + 1,
        ));
    }
}

/// The last `width` characters of `text`, so the cursor end stays visible.
pub fn visible_tail(text: &str, width: usize) -> &str {
    let count = text.chars().count();
    if count <= width {
        return text;
    }
    let skip = count - width;
    match text.char_indices().nth(skip) {
        Some((idx, _)) => &text[idx..],
        None => "",
    }
}

/// Hint shown when the claim is empty.
const PLACEHOLDER: &str = "Type a claim and press Enter";

fn placeholder_style() -> Style {
    Style::default().fg(Color::DarkGray)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
