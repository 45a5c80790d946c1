//! Shell environment helpers.
//!
//! The launcher talks to two programs it does not own: the runtime's call
//! client and (usually) an external selector.  Both are resolved here before
//! anything runs.

pub mod path;
