//! Keyboard input handling for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::runtime::App;

/// Maps a key event to an application action.
///
/// Guards on [`KeyEventKind::Press`] to avoid double-fire on some terminals.
pub fn handle_key(app: &mut App, key: KeyEvent) {
    if key.kind != KeyEventKind::Press {
        return;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit = true;
        return;
    }

    if app.editing.is_some() {
        match key.code {
            KeyCode::Enter => app.commit_edit(),
            KeyCode::Esc => app.cancel_edit(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        }
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit = true,
        KeyCode::Enter | KeyCode::Char('n') => app.advance(),
        KeyCode::Char('b') | KeyCode::Backspace => app.back(),
        KeyCode::Up | KeyCode::Char('k') => app.focus_prev(),
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => app.focus_next(),
        KeyCode::Char(' ') | KeyCode::Char('e') => app.activate(),
        KeyCode::Right | KeyCode::Char('l') => app.cycle(true),
        KeyCode::Left | KeyCode::Char('h') => app.cycle(false),
        KeyCode::Char('d') => app.request_download(),
        KeyCode::Char('c') => app.clear_load(),
        _ => {}
    }
}
