//! Named sub-sequences of a tile grid and their playback state machine.
//!
//! An [`Action`] plays the inclusive tile range `index_start..=index_end` of
//! one [`TileGridSprite`], showing each tile for `tile_display_duration`
//! milliseconds. Several actions may target the same sprite; the one stored
//! in [`TileGridSprite::current_action`] is the one the driver advances.
//!
//! # States
//!
//! - `Idle` – not the sprite's current action, or stopped
//! - `Playing` – advanced by the driver every tick
//! - `Paused` – accumulator frozen mid-sequence
//! - `Finished` – a non-looping run hit its terminal tile
//!
//! # Boundary policy
//!
//! When the tile after `index_end` is due:
//!
//! - looping: wrap to `index_start` and emit `loop`
//! - not looping, `clamp_when_finished == false`: wrap to `index_start`,
//!   pause and emit `finished`
//!
//! With `clamp_when_finished == true` a non-looping run pauses as soon as it
//! arrives on `index_end`, so the held frame is the last one of the sequence.
//!
//! The sprite's tile always stays inside the range while the action drives
//! it: `resume` and `advance` both move an out-of-range tile to `index_start`.

use bevy_ecs::prelude::{Component, Entity};
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};

use crate::components::tilegridsprite::TileGridSprite;
use crate::error::MixerError;
use crate::events::action::ActionEventKind;

/// Upper bound on `loop` events a single advance reports. Larger catch-ups
/// (a host resuming from suspend) still land on the right tile, but the
/// extra crossings are only logged.
pub const MAX_LOOP_EVENTS_PER_TICK: u64 = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ActionState {
    #[default]
    Idle,
    Playing,
    Paused,
    Finished,
}

#[derive(Component, Debug, Clone)]
pub struct Action {
    /// Sprite entity this action drives.
    pub sprite: Entity,
    index_start: u32,
    index_end: u32,
    tile_display_duration: f64,
    /// Wrap to `index_start` at the end of the sequence instead of stopping.
    pub must_loop: bool,
    /// When not looping, hold the last tile (`true`) or rewind to the first (`false`).
    pub clamp_when_finished: bool,
    /// Clear the sprite's `visible` flag when the sequence ends or on `stop`.
    pub hide_when_finished: bool,
    state: ActionState,
}

impl Action {
    /// Build an action over `index_start..=index_end` of `sprite`.
    ///
    /// Fails when the range is reversed, does not fit the grid, or the
    /// duration is not a positive number of milliseconds.
    pub fn new(
        sprite_entity: Entity,
        sprite: &TileGridSprite,
        index_start: u32,
        index_end: u32,
        tile_display_duration: f64,
    ) -> Result<Self, MixerError> {
        if index_start > index_end {
            return Err(MixerError::invalid(format!(
                "index_start {} is after index_end {}",
                index_start, index_end
            )));
        }
        if index_end >= sprite.tile_count() {
            return Err(MixerError::invalid(format!(
                "index_end {} is outside a grid of {} tiles",
                index_end,
                sprite.tile_count()
            )));
        }
        if !tile_display_duration.is_finite() || tile_display_duration <= 0.0 {
            return Err(MixerError::invalid(format!(
                "tile display duration must be positive, got {}",
                tile_display_duration
            )));
        }
        Ok(Self {
            sprite: sprite_entity,
            index_start,
            index_end,
            tile_display_duration,
            must_loop: true,
            clamp_when_finished: true,
            hide_when_finished: false,
            state: ActionState::Idle,
        })
    }

    pub fn with_must_loop(mut self, must_loop: bool) -> Self {
        self.must_loop = must_loop;
        self
    }

    pub fn with_clamp_when_finished(mut self, clamp: bool) -> Self {
        self.clamp_when_finished = clamp;
        self
    }

    pub fn with_hide_when_finished(mut self, hide: bool) -> Self {
        self.hide_when_finished = hide;
        self
    }

    pub fn index_start(&self) -> u32 {
        self.index_start
    }

    pub fn index_end(&self) -> u32 {
        self.index_end
    }

    pub fn tile_display_duration(&self) -> f64 {
        self.tile_display_duration
    }

    /// Number of tiles in the sequence.
    pub fn sequence_len(&self) -> u32 {
        self.index_end - self.index_start + 1
    }

    pub fn contains_tile(&self, tile: u32) -> bool {
        (self.index_start..=self.index_end).contains(&tile)
    }

    /// Last state set by a transition, regardless of which action the sprite
    /// is currently playing. See [`Action::status`].
    pub fn state(&self) -> ActionState {
        self.state
    }

    /// Observable state of the action identified by `this` on `sprite`.
    pub fn status(&self, this: Entity, sprite: &TileGridSprite) -> ActionState {
        if sprite.current_action != Some(this) {
            return ActionState::Idle;
        }
        match self.state {
            ActionState::Playing if sprite.paused => ActionState::Paused,
            state => state,
        }
    }

    /// Reveal the sprite and play the sequence once from `index_start`.
    pub fn play_once(&mut self, this: Entity, sprite: &mut TileGridSprite) {
        self.must_loop = false;
        self.start(this, sprite);
    }

    /// Reveal the sprite and play the sequence in a loop from `index_start`.
    pub fn play_loop(&mut self, this: Entity, sprite: &mut TileGridSprite) {
        self.must_loop = true;
        self.start(this, sprite);
    }

    fn start(&mut self, this: Entity, sprite: &mut TileGridSprite) {
        sprite.current_action = Some(this);
        sprite.current_tile = self.index_start;
        sprite.current_display_time = 0.0;
        sprite.update_uv_offset();
        sprite.paused = false;
        sprite.visible = true;
        self.state = ActionState::Playing;
        debug!(
            "Action {:?} playing tiles {}..={} (loop={})",
            this, self.index_start, self.index_end, self.must_loop
        );
    }

    /// Unpause without rewinding.
    ///
    /// Only the two boundary tiles are kept. Anything strictly inside the
    /// range may have been left there by an explicit seek, and anything
    /// outside it belongs to another sequence, so playback restarts from
    /// `index_start` in both cases.
    pub fn resume(&mut self, sprite: &mut TileGridSprite) {
        if sprite.current_tile != self.index_start && sprite.current_tile != self.index_end {
            sprite.current_tile = self.index_start;
            sprite.update_uv_offset();
        }
        sprite.paused = false;
        sprite.visible = true;
        self.state = ActionState::Playing;
    }

    /// Stop looping; takes effect the next time the sequence end is crossed.
    pub fn pause_next_end(&mut self) {
        self.must_loop = false;
    }

    /// Freeze the sprite on its current tile.
    pub fn pause(&mut self, sprite: &mut TileGridSprite) {
        sprite.paused = true;
        self.state = ActionState::Paused;
    }

    /// Pause and rewind to `index_start`, hiding the sprite if configured to.
    pub fn stop(&mut self, sprite: &mut TileGridSprite) {
        sprite.current_display_time = 0.0;
        sprite.current_tile = self.index_start;
        sprite.paused = true;
        if self.hide_when_finished {
            sprite.visible = false;
        }
        sprite.update_uv_offset();
        self.state = ActionState::Idle;
    }

    /// Advance the sprite by `dt_ms` milliseconds.
    ///
    /// Each elapsed tile duration is one step. The number of due steps is
    /// computed up front and the boundary policy is applied to it directly,
    /// so the cost does not depend on `dt_ms`. A looping run reports one
    /// `loop` per crossing (capped at [`MAX_LOOP_EVENTS_PER_TICK`]); a
    /// non-looping run stops at its terminal step and drops the remaining
    /// time. Returns the number of steps taken.
    pub fn advance(
        &mut self,
        sprite: &mut TileGridSprite,
        dt_ms: f64,
        mut emit: impl FnMut(ActionEventKind),
    ) -> u64 {
        if sprite.paused || dt_ms.is_nan() || dt_ms <= 0.0 {
            return 0;
        }
        if !self.contains_tile(sprite.current_tile) {
            debug!(
                "Tile {} is outside {}..={}, restarting from {}",
                sprite.current_tile, self.index_start, self.index_end, self.index_start
            );
            sprite.current_tile = self.index_start;
            sprite.update_uv_offset();
        }

        sprite.current_display_time += dt_ms;
        let due = (sprite.current_display_time / self.tile_display_duration).floor();
        if due < 1.0 {
            return 0;
        }
        // `NaN.max(0.0)` is 0.0, which covers an infinite delta.
        sprite.current_display_time =
            (sprite.current_display_time - due * self.tile_display_duration).max(0.0);
        // Saturating float to int conversion.
        let steps = due as u64;
        let offset = u64::from(sprite.current_tile - self.index_start);

        if self.must_loop {
            let len = u64::from(self.sequence_len());
            let target = offset.saturating_add(steps);
            let crossings = target / len;
            sprite.current_tile = self.index_start + (target % len) as u32;
            sprite.update_uv_offset();
            trace!("tile -> {} after {} steps", sprite.current_tile, steps);

            let reported = crossings.min(MAX_LOOP_EVENTS_PER_TICK);
            if crossings > reported {
                warn!(
                    "Catch-up of {} steps crossed the sequence end {} times; reporting {}",
                    steps, crossings, reported
                );
            }
            for _ in 0..reported {
                emit(ActionEventKind::Loop);
            }
            return steps;
        }

        let to_end = u64::from(self.index_end - sprite.current_tile);
        // Clamping stops on arrival at `index_end` (one step when already there);
        // rewinding needs the extra step past it.
        let needed = if self.clamp_when_finished {
            to_end.max(1)
        } else {
            to_end + 1
        };
        if steps < needed {
            sprite.current_tile += steps as u32;
            sprite.update_uv_offset();
            trace!("tile -> {}", sprite.current_tile);
            return steps;
        }

        sprite.current_tile = if self.clamp_when_finished {
            self.index_end
        } else {
            self.index_start
        };
        self.finish(sprite);
        emit(ActionEventKind::Finished);
        needed
    }

    fn finish(&mut self, sprite: &mut TileGridSprite) {
        sprite.paused = true;
        sprite.current_display_time = 0.0;
        if self.hide_when_finished {
            sprite.visible = false;
        }
        sprite.update_uv_offset();
        self.state = ActionState::Finished;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::world::World;

    fn setup(start: u32, end: u32, duration: f64) -> (Entity, Action, TileGridSprite) {
        let mut world = World::new();
        let sprite_entity = world.spawn_empty().id();
        let action_entity = world.spawn_empty().id();
        let sprite = TileGridSprite::new("sheet", 4, 2).unwrap();
        let action = Action::new(sprite_entity, &sprite, start, end, duration).unwrap();
        (action_entity, action, sprite)
    }

    fn advance_collect(
        action: &mut Action,
        sprite: &mut TileGridSprite,
        dt_ms: f64,
    ) -> Vec<ActionEventKind> {
        let mut events = Vec::new();
        action.advance(sprite, dt_ms, |kind| events.push(kind));
        events
    }

    #[test]
    fn test_new_rejects_reversed_range() {
        let (_, _, sprite) = setup(0, 3, 100.0);
        let mut world = World::new();
        let e = world.spawn_empty().id();
        assert!(matches!(
            Action::new(e, &sprite, 3, 1, 100.0),
            Err(MixerError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_new_rejects_range_outside_grid() {
        let (_, _, sprite) = setup(0, 3, 100.0);
        let mut world = World::new();
        let e = world.spawn_empty().id();
        assert!(Action::new(e, &sprite, 0, 8, 100.0).is_err());
        assert!(Action::new(e, &sprite, 0, 7, 100.0).is_ok());
    }

    #[test]
    fn test_new_rejects_non_positive_duration() {
        let (_, _, sprite) = setup(0, 3, 100.0);
        let mut world = World::new();
        let e = world.spawn_empty().id();
        assert!(Action::new(e, &sprite, 0, 3, 0.0).is_err());
        assert!(Action::new(e, &sprite, 0, 3, -5.0).is_err());
        assert!(Action::new(e, &sprite, 0, 3, f64::NAN).is_err());
    }

    #[test]
    fn test_play_loop_claims_sprite_and_rewinds() {
        let (this, mut action, mut sprite) = setup(2, 5, 100.0);
        sprite.current_tile = 7;
        sprite.visible = false;
        action.play_loop(this, &mut sprite);
        assert_eq!(sprite.current_action, Some(this));
        assert_eq!(sprite.current_tile, 2);
        assert!(!sprite.paused);
        assert!(sprite.visible);
        assert!(action.must_loop);
        assert_eq!(action.status(this, &sprite), ActionState::Playing);
    }

    #[test]
    fn test_play_once_clears_loop_flag() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        assert!(action.must_loop);
        action.play_once(this, &mut sprite);
        assert!(!action.must_loop);
    }

    #[test]
    fn test_zero_dt_is_noop() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 0.0);
        assert!(events.is_empty());
        assert_eq!(sprite.current_tile, 0);
        assert_eq!(sprite.current_display_time, 0.0);
    }

    #[test]
    fn test_accumulates_partial_frames() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, 60.0);
        assert_eq!(sprite.current_tile, 0);
        advance_collect(&mut action, &mut sprite, 60.0);
        assert_eq!(sprite.current_tile, 1);
        assert!((sprite.current_display_time - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_loop_wraps_and_emits_loop() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 400.0);
        assert_eq!(events, vec![ActionEventKind::Loop]);
        assert_eq!(sprite.current_tile, 0);
        assert!(!sprite.paused);
    }

    #[test]
    fn test_large_dt_emits_every_loop() {
        let (this, mut action, mut sprite) = setup(0, 1, 10.0);
        action.play_loop(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 65.0);
        // 6 steps over a 2-tile loop: wraps on steps 2, 4 and 6.
        assert_eq!(events.len(), 3);
        assert_eq!(sprite.current_tile, 0);
    }

    #[test]
    fn test_clamped_once_holds_last_tile() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_once(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 300.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 3);
        assert!(sprite.paused);
        assert_eq!(action.status(this, &sprite), ActionState::Finished);
    }

    #[test]
    fn test_unclamped_once_rewinds_then_pauses() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.clamp_when_finished = false;
        action.play_once(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 300.0);
        assert!(events.is_empty());
        assert_eq!(sprite.current_tile, 3);
        let events = advance_collect(&mut action, &mut sprite, 100.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 0);
        assert!(sprite.paused);
    }

    #[test]
    fn test_finish_stops_consuming_time() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_once(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, 1000.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 3);
        assert_eq!(sprite.current_display_time, 0.0);
        assert!(advance_collect(&mut action, &mut sprite, 1000.0).is_empty());
    }

    #[test]
    fn test_hide_when_finished_clears_visible() {
        let (this, mut action, mut sprite) = setup(0, 1, 100.0);
        action.hide_when_finished = true;
        action.play_once(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, 100.0);
        assert!(sprite.paused);
        assert!(!sprite.visible);
    }

    #[test]
    fn test_single_tile_clamped_finishes_after_one_duration() {
        let (this, mut action, mut sprite) = setup(5, 5, 50.0);
        action.play_once(this, &mut sprite);
        assert!(advance_collect(&mut action, &mut sprite, 49.0).is_empty());
        let events = advance_collect(&mut action, &mut sprite, 1.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 5);
    }

    #[test]
    fn test_pause_next_end_finishes_at_boundary() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, 100.0);
        action.pause_next_end();
        assert!(!sprite.paused);
        let events = advance_collect(&mut action, &mut sprite, 200.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 3);
    }

    #[test]
    fn test_pause_keeps_position() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, 250.0);
        action.pause(&mut sprite);
        assert!(sprite.paused);
        assert_eq!(sprite.current_tile, 2);
        assert_eq!(action.status(this, &sprite), ActionState::Paused);
        assert!(advance_collect(&mut action, &mut sprite, 500.0).is_empty());
        assert_eq!(sprite.current_tile, 2);
    }

    #[test]
    fn test_stop_rewinds_and_is_idempotent() {
        let (this, mut action, mut sprite) = setup(1, 4, 100.0);
        action.hide_when_finished = true;
        action.play_loop(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, 250.0);
        action.stop(&mut sprite);
        let once = sprite.clone();
        action.stop(&mut sprite);
        assert_eq!(sprite.snapshot(), once.snapshot());
        assert_eq!(sprite.current_tile, 1);
        assert_eq!(sprite.current_display_time, 0.0);
        assert!(sprite.paused);
        assert!(!sprite.visible);
        assert_eq!(action.status(this, &sprite), ActionState::Idle);
    }

    #[test]
    fn test_resume_after_mid_range_seek_restarts() {
        let (this, mut action, mut sprite) = setup(0, 5, 100.0);
        action.play_loop(this, &mut sprite);
        sprite.seek_frame(3);
        action.resume(&mut sprite);
        assert_eq!(sprite.current_tile, 0);
        assert!(!sprite.paused);
        assert!(sprite.visible);
    }

    #[test]
    fn test_resume_keeps_boundary_tiles() {
        let (this, mut action, mut sprite) = setup(1, 5, 100.0);
        action.play_loop(this, &mut sprite);
        sprite.seek_frame(5);
        action.resume(&mut sprite);
        assert_eq!(sprite.current_tile, 5);
    }

    #[test]
    fn test_resume_restarts_seek_past_end() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        sprite.seek_frame(7);
        action.resume(&mut sprite);
        assert_eq!(sprite.current_tile, 0);
        let events = advance_collect(&mut action, &mut sprite, 100.0);
        assert!(events.is_empty());
        assert_eq!(sprite.current_tile, 1);
    }

    #[test]
    fn test_resume_restarts_seek_before_start() {
        let (this, mut action, mut sprite) = setup(4, 7, 100.0);
        action.play_loop(this, &mut sprite);
        sprite.seek_frame(1);
        action.resume(&mut sprite);
        assert_eq!(sprite.current_tile, 4);
        advance_collect(&mut action, &mut sprite, 100.0);
        assert_eq!(sprite.current_tile, 5);
    }

    #[test]
    fn test_advance_pulls_stray_tile_into_range() {
        let (this, mut action, mut sprite) = setup(4, 7, 100.0);
        action.play_once(this, &mut sprite);
        sprite.current_tile = 2;
        advance_collect(&mut action, &mut sprite, 100.0);
        assert_eq!(sprite.current_tile, 5);

        sprite.current_tile = 0;
        let events = advance_collect(&mut action, &mut sprite, 1000.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 7);
    }

    #[test]
    fn test_clamped_finish_lands_on_index_end() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_once(this, &mut sprite);
        sprite.current_tile = 6;
        let events = advance_collect(&mut action, &mut sprite, 1000.0);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 3);
        assert!(sprite.paused);
    }

    #[test]
    fn test_huge_dt_is_bounded() {
        let (this, mut action, mut sprite) = setup(0, 3, 1.0);
        action.play_loop(this, &mut sprite);
        // Six hours of 1ms tiles: 21.6M steps, 5.4M crossings.
        let events = advance_collect(&mut action, &mut sprite, 6.0 * 3600.0 * 1000.0);
        assert_eq!(events.len() as u64, MAX_LOOP_EVENTS_PER_TICK);
        assert!(events.iter().all(|&kind| kind == ActionEventKind::Loop));
        assert_eq!(sprite.current_tile, 0);
        assert_eq!(sprite.current_display_time, 0.0);
    }

    #[test]
    fn test_infinite_dt_terminates() {
        let (this, mut action, mut sprite) = setup(1, 3, 10.0);
        action.play_loop(this, &mut sprite);
        advance_collect(&mut action, &mut sprite, f64::INFINITY);
        assert!(action.contains_tile(sprite.current_tile));
        assert_eq!(sprite.current_display_time, 0.0);

        action.play_once(this, &mut sprite);
        let events = advance_collect(&mut action, &mut sprite, f64::INFINITY);
        assert_eq!(events, vec![ActionEventKind::Finished]);
        assert_eq!(sprite.current_tile, 3);
    }

    #[test]
    fn test_nan_dt_is_ignored() {
        let (this, mut action, mut sprite) = setup(0, 3, 100.0);
        action.play_loop(this, &mut sprite);
        assert!(advance_collect(&mut action, &mut sprite, f64::NAN).is_empty());
        assert_eq!(sprite.current_tile, 0);
        assert_eq!(sprite.current_display_time, 0.0);
    }

    #[test]
    fn test_status_idle_when_not_current() {
        let mut world = World::new();
        let sprite_entity = world.spawn_empty().id();
        let walk = world.spawn_empty().id();
        let jump = world.spawn_empty().id();
        let mut sprite = TileGridSprite::new("sheet", 4, 2).unwrap();
        let mut walk_action = Action::new(sprite_entity, &sprite, 0, 3, 100.0).unwrap();
        let mut jump_action = Action::new(sprite_entity, &sprite, 4, 7, 100.0).unwrap();
        walk_action.play_loop(walk, &mut sprite);
        jump_action.play_once(jump, &mut sprite);
        assert_eq!(walk_action.status(walk, &sprite), ActionState::Idle);
        assert_eq!(jump_action.status(jump, &sprite), ActionState::Playing);
        assert_eq!(sprite.current_tile, 4);
    }
}
