//! Builtin selector — a full-screen ratatui picker drawn on stderr, so stdout
//! stays free for whatever wraps the launcher.

use std::io::{self, stderr};
use std::time::Duration;

use crossterm::{
    cursor, execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame, Terminal,
};

use crate::config::AppConfig;
use crate::ui::{layout::AppLayout, list_widget::ListWidget, theme::Theme};

use super::event::{AppEvent, EventReader};
use super::handler;
use super::selector::{Selector, SelectorError};
use super::state::PickerState;

const TICK_RATE: Duration = Duration::from_millis(100);
const PROMPT: &str = "> ";

pub struct BuiltinSelector {
    config: AppConfig,
}

impl BuiltinSelector {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }
}

impl Selector for BuiltinSelector {
    async fn select(&mut self, candidates: &[String]) -> Result<Option<String>, SelectorError> {
        let mut state = PickerState::new(candidates.to_vec(), self.config.clone());

        enable_raw_mode()?;
        if let Err(e) = execute!(stderr(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }

        // Always restore the terminal, even when the loop failed.
        let result = run_loop(&mut state).await;
        let restored = restore_terminal();
        result?;
        restored?;

        tracing::debug!(chosen = ?state.chosen, "builtin picker closed");
        Ok(state.chosen)
    }
}

async fn run_loop(state: &mut PickerState) -> io::Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stderr()))?;
    let mut events = EventReader::spawn(TICK_RATE);

    let drawn = loop {
        if let Err(e) = terminal.draw(|frame| draw(frame, state)) {
            break Err(e);
        }

        match events.recv().await {
            Some(AppEvent::Key(k)) => handler::handle_key(state, k),
            Some(AppEvent::Resize(_, _)) | Some(AppEvent::Tick) => {}
            None => break Ok(()),
        }

        if state.should_quit {
            break Ok(());
        }
    };

    // Keystrokes typed while the action is dispatched belong to the shell.
    events.shutdown().await;
    drawn
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(stderr(), LeaveAlternateScreen, cursor::Show)?;
    Ok(())
}

fn draw(frame: &mut Frame, state: &mut PickerState) {
    let layout = AppLayout::from_area(frame.area());

    let prompt = Line::from(vec![
        Span::styled(PROMPT, Theme::title_style()),
        Span::styled(state.query.as_str(), Theme::query_style()),
    ]);
    frame.render_widget(Paragraph::new(prompt), layout.query_area);
    let cursor_x = layout.query_area.x + (PROMPT.len() + state.query.chars().count()) as u16;
    frame.set_cursor_position((
        cursor_x.min(layout.query_area.right().saturating_sub(1)),
        layout.query_area.y,
    ));

    let list_block = Block::default()
        .title(format!(" {}/{} ", state.visible.len(), state.candidates.len()))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    let list = ListWidget::new(&state.candidates, &state.visible)
        .query(&state.query, state.case_sensitive)
        .block(list_block);
    frame.render_stateful_widget(list, layout.list_area, &mut state.list_state);

    let status = Paragraph::new(state.config.status_bar_hint()).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn rendered(state: &mut PickerState, width: u16, height: u16) -> Vec<String> {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| draw(frame, state)).unwrap();
        let buf = terminal.backend().buffer();
        (0..height)
            .map(|y| {
                (0..width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    #[test]
    fn draws_query_counts_and_rows() {
        let mut state = PickerState::new(
            vec!["Terminal".into(), "Firefox".into(), "Files".into()],
            AppConfig::default(),
        );
        state.query = "fi".into();
        state.refilter();

        let screen = rendered(&mut state, 40, 8);
        assert!(screen[0].starts_with("> fi"));
        assert!(screen[1].contains("2/3"));
        assert!(screen[2].contains("▸ Firefox"));
        assert!(screen[3].contains("Files"));
        assert!(!screen.iter().any(|row| row.contains("Terminal")));
        assert!(screen[7].contains("Enter: run"));
    }

    #[test]
    fn draws_placeholder_without_matches() {
        let mut state = PickerState::new(vec!["a".into()], AppConfig::default());
        state.query = "zzz".into();
        state.refilter();
        let screen = rendered(&mut state, 30, 6);
        assert!(screen[2].contains("no matches"));
    }
}
