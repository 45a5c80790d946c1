//! Core algorithms – the wire codec, launcher items, and candidate filtering.
//!
//! Nothing in this module performs I/O or depends on any TUI crate.

pub mod codec;
pub mod filter;
pub mod item;
pub mod sexpr;
