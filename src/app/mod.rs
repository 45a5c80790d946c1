//! Application orchestration — the launcher pipeline, its collaborators, and
//! the builtin picker's state, event loop and input handling.

pub mod event;
pub mod handler;
pub mod picker;
pub mod pipeline;
pub mod selector;
pub mod state;
pub mod transport;
