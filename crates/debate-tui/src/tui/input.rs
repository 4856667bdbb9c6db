// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the app
// orchestrator, or into local ViewState edits (claim text, focus, scroll).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::protocol::UserCommand;
use super::ViewState;

/// Lines moved by PageUp/PageDown.
const PAGE_SIZE: u16 = 10;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key press should go to the app
/// orchestrator (StartDebate, Quit), `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // On Windows crossterm emits both Press and Release; only act on Press.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);

    // Ctrl+C always quits immediately regardless of mode.
    if ctrl && key_event.code == KeyCode::Char('c') {
        return Some(UserCommand::Quit);
    }

    if view_state.confirm_quit {
        return handle_confirm_quit(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Enter => submit_claim(view_state),
        KeyCode::Esc => {
            view_state.confirm_quit = true;
            None
        }
        KeyCode::Tab => {
            view_state.focus = view_state.focus.next();
            None
        }
        KeyCode::BackTab => {
            view_state.focus = view_state.focus.prev();
            None
        }
        KeyCode::Up => {
            scroll_up(view_state, 1);
            None
        }
        KeyCode::Down => {
            scroll_down(view_state, 1);
            None
        }
        KeyCode::PageUp => {
            scroll_up(view_state, PAGE_SIZE);
            None
        }
        KeyCode::PageDown => {
            scroll_down(view_state, PAGE_SIZE);
            None
        }
        _ if view_state.focus.role().is_none() => {
            edit_claim(key_event.code, ctrl, view_state);
            None
        }
        _ => None,
    }
}

/// y/q confirm, n/Esc cancel, everything else is blocked.
fn handle_confirm_quit(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Char('q') | KeyCode::Char('Q') => {
            Some(UserCommand::Quit)
        }
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            view_state.confirm_quit = false;
            None
        }
        _ => None,
    }
}

/// Blank claims are rejected here and never reach the app. Anything else is
/// sent as typed.
fn submit_claim(view_state: &mut ViewState) -> Option<UserCommand> {
    if view_state.claim_input.trim().is_empty() {
        view_state.error_message = Some("Enter a claim to debate.".to_string());
        return None;
    }
    Some(UserCommand::StartDebate {
        claim: view_state.claim_input.clone(),
    })
}

fn edit_claim(code: KeyCode, ctrl: bool, view_state: &mut ViewState) {
    match code {
        KeyCode::Char('u') if ctrl => view_state.claim_input.clear(),
        KeyCode::Char(_) if ctrl => {}
        KeyCode::Char(c) => view_state.claim_input.push(c),
        KeyCode::Backspace => {
            view_state.claim_input.pop();
        }
        _ => {}
    }
}

fn scroll_up(view_state: &mut ViewState, lines: u16) {
    if let Some(role) = view_state.focus.role() {
        let offset = view_state.scroll_mut(role);
        *offset = offset.saturating_sub(lines);
    }
}

fn scroll_down(view_state: &mut ViewState, lines: u16) {
    if let Some(role) = view_state.focus.role() {
        let offset = view_state.scroll_mut(role);
        *offset = offset.saturating_add(lines);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
