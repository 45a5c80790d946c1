//! Candidate list widget for the builtin picker.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, StatefulWidget, Widget},
};

use crate::core::filter;

use super::theme::Theme;

// ───────────────────────────────────────── state ─────────────

/// Persistent state for the list widget (selected index, scroll offset).
#[derive(Debug, Default)]
pub struct ListWidgetState {
    /// Index into the *visible* rows that is currently highlighted.
    pub selected: usize,
    /// Vertical scroll offset (first visible row).
    pub offset: usize,
}

impl ListWidgetState {
    pub fn select_next(&mut self, max: usize) {
        if max > 0 && self.selected < max - 1 {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Ensure the selected row is visible within the viewport of `height` rows.
    pub fn clamp_scroll(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.offset {
            self.offset = self.selected;
        } else if self.selected >= self.offset + height {
            self.offset = self.selected - height + 1;
        }
    }
}

// ───────────────────────────────────────── widget ────────────

/// Created fresh each frame from the picker state.
pub struct ListWidget<'a> {
    candidates: &'a [String],
    visible: &'a [usize],
    query: &'a str,
    case_sensitive: bool,
    block: Option<Block<'a>>,
}

impl<'a> ListWidget<'a> {
    pub fn new(candidates: &'a [String], visible: &'a [usize]) -> Self {
        Self {
            candidates,
            visible,
            query: "",
            case_sensitive: false,
            block: None,
        }
    }

    /// Highlight occurrences of `query` in each row.
    pub fn query(mut self, query: &'a str, case_sensitive: bool) -> Self {
        self.query = query;
        self.case_sensitive = case_sensitive;
        self
    }

    pub fn block(mut self, block: Block<'a>) -> Self {
        self.block = Some(block);
        self
    }

    fn row_line(&self, text: &'a str, selected: bool) -> Line<'a> {
        let (base, hit) = if selected {
            (Theme::selected_style(), Theme::selected_match_style())
        } else {
            (Theme::item_style(), Theme::match_style())
        };
        let marker = Span::styled(if selected { "▸ " } else { "  " }, base);

        match filter::match_range(text, self.query, self.case_sensitive) {
            Some(range) => Line::from(vec![
                marker,
                Span::styled(&text[..range.start], base),
                Span::styled(&text[range.clone()], hit),
                Span::styled(&text[range.end..], base),
            ]),
            None => Line::from(vec![marker, Span::styled(text, base)]),
        }
    }
}

impl<'a> StatefulWidget for ListWidget<'a> {
    type State = ListWidgetState;

    fn render(mut self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let inner = match self.block.take() {
            Some(block) => {
                let inner = block.inner(area);
                block.render(area, buf);
                inner
            }
            None => area,
        };
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        if self.visible.is_empty() {
            buf.set_line(
                inner.x,
                inner.y,
                &Line::from(Span::styled("  no matches", Theme::empty_style())),
                inner.width,
            );
            return;
        }

        let height = inner.height as usize;
        state.selected = state.selected.min(self.visible.len() - 1);
        state.clamp_scroll(height);

        for (row, &idx) in self
            .visible
            .iter()
            .enumerate()
            .skip(state.offset)
            .take(height)
        {
            let Some(text) = self.candidates.get(idx) else {
                continue;
            };
            let y = inner.y + (row - state.offset) as u16;
            let selected = row == state.selected;
            if selected {
                buf.set_style(Rect::new(inner.x, y, inner.width, 1), Theme::selected_style());
            }
            buf.set_line(inner.x, y, &self.row_line(text, selected), inner.width);
        }
    }
}
