//! Builtin picker state.
//!
//! All mutable state lives here so that rendering is a pure function over
//! `&PickerState` and key handling a function over `&mut PickerState`.

use crate::config::AppConfig;
use crate::core::filter;
use crate::ui::list_widget::ListWidgetState;

pub struct PickerState {
    /// Display lines, in listing order.
    pub candidates: Vec<String>,
    /// Indices into `candidates` that match `query`, in listing order.
    pub visible: Vec<usize>,
    pub query: String,
    pub case_sensitive: bool,
    /// Selection / scroll over `visible`.
    pub list_state: ListWidgetState,
    /// The accepted line, set when the user confirms.
    pub chosen: Option<String>,
    /// Controls the event loop.
    pub should_quit: bool,
    pub config: AppConfig,
}

impl PickerState {
    pub fn new(candidates: Vec<String>, config: AppConfig) -> Self {
        let visible = (0..candidates.len()).collect();
        Self {
            candidates,
            visible,
            query: String::new(),
            case_sensitive: false,
            list_state: ListWidgetState::default(),
            chosen: None,
            should_quit: false,
            config,
        }
    }

    /// Recompute `visible` after the query changed.  The highlight returns
    /// to the first match.
    pub fn refilter(&mut self) {
        self.visible = filter::filter_candidates(&self.candidates, &self.query, self.case_sensitive);
        self.list_state.selected = 0;
        self.list_state.offset = 0;
    }

    /// The currently highlighted candidate line.
    pub fn highlighted(&self) -> Option<&str> {
        let &idx = self.visible.get(self.list_state.selected)?;
        self.candidates.get(idx).map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(lines: &[&str]) -> PickerState {
        PickerState::new(
            lines.iter().map(|s| s.to_string()).collect(),
            AppConfig::default(),
        )
    }

    #[test]
    fn starts_on_first_candidate() {
        let s = state(&["a", "b"]);
        assert_eq!(s.visible, vec![0, 1]);
        assert_eq!(s.highlighted(), Some("a"));
    }

    #[test]
    fn refilter_resets_highlight() {
        let mut s = state(&["alpha", "beta", "alphabet"]);
        s.list_state.selected = 2;
        s.query = "alp".into();
        s.refilter();
        assert_eq!(s.visible, vec![0, 2]);
        assert_eq!(s.highlighted(), Some("alpha"));
    }

    #[test]
    fn nothing_highlighted_without_matches() {
        let mut s = state(&["alpha"]);
        s.query = "zzz".into();
        s.refilter();
        assert_eq!(s.highlighted(), None);
    }
}
