//! Billboard bound to a sprite-sheet texture divided into a grid of tiles.
//!
//! Tiles are addressed by a single row-major index read top-to-bottom,
//! left-to-right. The renderer samples the texture with a repeat of
//! `(1 / tiles_horizontal, 1 / tiles_vertical)` and the [`UvOffset`] written
//! here, so exactly one cell fills the billboard.
//!
//! # Related
//!
//! - [`crate::components::action::Action`] – sub-sequences that drive this sprite
//! - [`crate::systems::animation::tile_grid_animation`] – per-tick driver

use bevy_ecs::prelude::{Component, Entity};
use serde::{Deserialize, Serialize};

use crate::error::MixerError;

/// Texture-space offset selecting one grid cell. Written by the mixer, read by
/// the renderer every frame.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct UvOffset {
    pub u: f32,
    pub v: f32,
}

/// Animation state of one tile-grid billboard.
///
/// The grid dimensions and the UV offset are private: the former are fixed at
/// construction, the latter is only recomputed through
/// [`TileGridSprite::update_uv_offset`].
#[derive(Component, Clone, Debug)]
pub struct TileGridSprite {
    /// Key of the externally loaded texture holding every tile.
    pub tex_key: String,
    tiles_horizontal: u32,
    tiles_vertical: u32,
    /// Row-major index of the displayed tile.
    pub current_tile: u32,
    /// Milliseconds accumulated since the last tile advance.
    pub current_display_time: f64,
    /// When true the driver skips this sprite.
    pub paused: bool,
    /// Rendering flag, independent from `paused`.
    pub visible: bool,
    /// Action currently driving this sprite. The entity may have been despawned.
    pub current_action: Option<Entity>,
    uv_offset: UvOffset,
}

impl TileGridSprite {
    /// Create a paused, visible sprite showing tile 0.
    ///
    /// Both dimensions must be non-zero and the tile count must fit a `u32`.
    pub fn new(
        tex_key: impl Into<String>,
        tiles_horizontal: u32,
        tiles_vertical: u32,
    ) -> Result<Self, MixerError> {
        if tiles_horizontal == 0 || tiles_vertical == 0 {
            return Err(MixerError::invalid(format!(
                "tile grid must be at least 1x1, got {}x{}",
                tiles_horizontal, tiles_vertical
            )));
        }
        if tiles_horizontal.checked_mul(tiles_vertical).is_none() {
            return Err(MixerError::invalid(format!(
                "tile grid {}x{} has more tiles than can be indexed",
                tiles_horizontal, tiles_vertical
            )));
        }
        let mut sprite = Self {
            tex_key: tex_key.into(),
            tiles_horizontal,
            tiles_vertical,
            current_tile: 0,
            current_display_time: 0.0,
            paused: true,
            visible: true,
            current_action: None,
            uv_offset: UvOffset::default(),
        };
        sprite.update_uv_offset();
        Ok(sprite)
    }

    pub fn tiles_horizontal(&self) -> u32 {
        self.tiles_horizontal
    }

    pub fn tiles_vertical(&self) -> u32 {
        self.tiles_vertical
    }

    pub fn tile_count(&self) -> u32 {
        self.tiles_horizontal * self.tiles_vertical
    }

    /// Row of the current tile, counted from the top of the sheet.
    pub fn row(&self) -> u32 {
        self.current_tile / self.tiles_horizontal
    }

    pub fn column(&self) -> u32 {
        self.current_tile % self.tiles_horizontal
    }

    pub fn uv_offset(&self) -> UvOffset {
        self.uv_offset
    }

    /// Texture repeat that makes a single tile cover the billboard.
    pub fn uv_repeat(&self) -> UvOffset {
        UvOffset {
            u: 1.0 / self.tiles_horizontal as f32,
            v: 1.0 / self.tiles_vertical as f32,
        }
    }

    /// Recompute the UV offset for `current_tile`.
    ///
    /// Must be called after every tile index mutation. Texture V grows upward
    /// while rows are read downward, so row 0 maps to the highest V band.
    /// Computed in floating point: an out-of-range index from
    /// [`seek_frame`](Self::seek_frame) yields an off-sheet offset instead of
    /// underflowing.
    pub fn update_uv_offset(&mut self) {
        let h = self.tiles_horizontal as f32;
        let v = self.tiles_vertical as f32;
        self.uv_offset = UvOffset {
            u: self.column() as f32 / h,
            v: (v - self.row() as f32 - 1.0) / v,
        };
    }

    /// Pause and show `frame` directly.
    ///
    /// The index is not validated; [`Action::resume`](crate::components::action::Action::resume)
    /// and the driver cope with out-of-range values.
    pub fn seek_frame(&mut self, frame: u32) {
        self.paused = true;
        self.current_tile = frame;
        self.current_display_time = 0.0;
        self.update_uv_offset();
    }

    pub fn snapshot(&self) -> SpriteSnapshot {
        SpriteSnapshot {
            tex_key: self.tex_key.clone(),
            tile: self.current_tile,
            row: self.row(),
            column: self.column(),
            uv_offset: self.uv_offset,
            paused: self.paused,
            visible: self.visible,
        }
    }
}

/// Serializable view of a sprite's observable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpriteSnapshot {
    pub tex_key: String,
    pub tile: u32,
    pub row: u32,
    pub column: u32,
    pub uv_offset: UvOffset,
    pub paused: bool,
    pub visible: bool,
}
