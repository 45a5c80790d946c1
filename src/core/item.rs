//! Launcher items and the label ↔ item mapping used around selection.

use super::sexpr::Expr;

/// An opaque action expression.  Kept alongside the exact text it was
/// decoded from so it can be sent back untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    expr: Expr,
    source: String,
}

impl Action {
    pub fn new(expr: Expr, source: impl Into<String>) -> Self {
        Self {
            expr,
            source: source.into(),
        }
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    /// The action as the runtime wrote it.
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// One selectable entry of a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub label: String,
    pub on_click: Action,
}

impl Item {
    /// The label as a single selector row.  Control characters (newlines
    /// included) become spaces so one item never spans several rows.
    pub fn display_line(&self) -> String {
        self.label
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect()
    }
}

/// One display line per item, in listing order.
pub fn display_lines(items: &[Item]) -> Vec<String> {
    items.iter().map(Item::display_line).collect()
}

/// Map a chosen line back to the first item (by position) displayed as it.
pub fn resolve_choice<'a>(items: &'a [Item], choice: &str) -> Option<&'a Item> {
    items.iter().find(|item| item.display_line() == choice)
}

/// Display lines shared by more than one item, each reported once, in
/// first-seen order.
pub fn duplicate_labels(items: &[Item]) -> Vec<String> {
    let lines = display_lines(items);
    let mut dups: Vec<String> = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !dups.contains(line) && lines[i + 1..].contains(line) {
            dups.push(line.clone());
        }
    }
    dups
}
