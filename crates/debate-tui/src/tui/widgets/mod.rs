// TUI widget modules for each panel of the debate form.

pub mod claim_input;
pub mod evaluation;
pub mod quit_confirm;
pub mod status_bar;
pub mod turn_panel;

use ratatui::style::{Color, Style};

/// Highlight the border of the focused panel, otherwise keep `base`.
pub fn focused_border_style(focused: bool, base: Style) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        base
    }
}
