//! Input handling — maps key events to picker state mutations.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::config::Action;

use super::state::PickerState;

/// Process a key event.
pub fn handle_key(state: &mut PickerState, key: KeyEvent) {
    if key.kind == KeyEventKind::Release {
        return;
    }

    // Ctrl+c always cancels, regardless of bindings.
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        cancel(state);
        return;
    }

    if let Some(action) = state.config.match_key(key) {
        apply_action(state, action);
        return;
    }

    // Unbound keys edit the query.
    match key.code {
        KeyCode::Backspace => {
            if state.query.pop().is_some() {
                state.refilter();
            }
        }
        KeyCode::Char(c)
            if !key
                .modifiers
                .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
        {
            state.query.push(c);
            state.refilter();
        }
        _ => {}
    }
}

fn apply_action(state: &mut PickerState, action: Action) {
    let count = state.visible.len();
    match action {
        Action::MoveUp => state.list_state.select_prev(),
        Action::MoveDown => state.list_state.select_next(count),
        Action::First => state.list_state.selected = 0,
        Action::Last => state.list_state.selected = count.saturating_sub(1),
        Action::Accept => {
            // Accepting with no match is a no-op; the user can refine or cancel.
            if let Some(line) = state.highlighted() {
                state.chosen = Some(line.to_string());
                state.should_quit = true;
            }
        }
        Action::Cancel => cancel(state),
        Action::ClearQuery => {
            if !state.query.is_empty() {
                state.query.clear();
                state.refilter();
            }
        }
        Action::ToggleCase => {
            state.case_sensitive = !state.case_sensitive;
            state.refilter();
        }
    }
}

fn cancel(state: &mut PickerState) {
    state.chosen = None;
    state.should_quit = true;
}
