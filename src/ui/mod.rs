//! UI / rendering layer — everything that touches Ratatui widgets.
//!
//! Only the builtin picker draws anything; the pipeline itself never touches
//! the terminal.

pub mod layout;
pub mod list_widget;
pub mod theme;
