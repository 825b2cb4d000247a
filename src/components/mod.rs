//! ECS components for animated billboards.
//!
//! Submodules overview:
//! - [`action`] – a tile sub-sequence with its timing, loop/clamp/hide policy and state machine
//! - [`tilegridsprite`] – grid dimensions, current tile, accumulator and UV offset of a billboard

pub mod action;
pub mod tilegridsprite;
