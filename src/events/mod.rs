//! Event types emitted by the mixer.
//!
//! Submodules:
//! - [`action`] – `loop` and `finished` notifications raised by playing actions
//!
//! See each submodule for concrete event data, semantics, and example usage.
pub mod action;
