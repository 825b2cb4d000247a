//! Host-facing facade.
//!
//! [`SpriteMixer`] owns the ECS world and the update schedule. Hosts create
//! sprites and actions through its factory methods, drive it with
//! [`SpriteMixer::tick`] once per rendered frame, and read each sprite's UV
//! offset back for their renderer.
//!
//! ```ignore
//! let mut mixer = SpriteMixer::new();
//! let sprite = mixer.create_tile_grid_sprite("explosion", 4, 2)?;
//! let boom = mixer.create_action(sprite, 0, 7, 80.0)?;
//! mixer.on(ActionEventKind::Finished, |ev, _| println!("{:?} done", ev.action));
//! mixer.play_once(boom)?;
//! loop {
//!     mixer.tick(frame_delta_seconds);
//!     let uv = mixer.uv_offset(sprite);
//!     // hand `uv` to the billboard material
//! }
//! ```

use bevy_ecs::prelude::*;
use log::{debug, info};

use crate::components::action::{Action, ActionState};
use crate::components::tilegridsprite::{SpriteSnapshot, TileGridSprite, UvOffset};
use crate::error::MixerError;
use crate::events::action::{ActionEvent, ActionEventKind};
use crate::resources::animationregistry::AnimationRegistry;
use crate::resources::eventbus::{ActionListener, EventBus};
use crate::resources::mixerconfig::MixerConfig;
use crate::resources::worldtime::WorldTime;
use crate::systems::animation::{flush_action_events, tile_grid_animation};
use crate::systems::time::update_world_time;

pub struct SpriteMixer {
    world: World,
    update: Schedule,
}

impl Default for SpriteMixer {
    fn default() -> Self {
        Self::new()
    }
}

impl SpriteMixer {
    pub fn new() -> Self {
        Self::with_config(MixerConfig::new())
    }

    pub fn with_config(config: MixerConfig) -> Self {
        let mut world = World::new();
        world.insert_resource(WorldTime::default().with_time_scale(config.time_scale));
        world.insert_resource(AnimationRegistry::new());
        world.insert_resource(EventBus::new());
        world.init_resource::<Messages<ActionEvent>>();
        world.insert_resource(config);

        let mut update = Schedule::default();
        update.add_systems(tile_grid_animation);

        Self { world, update }
    }

    /// Create and register a paused sprite over a `tiles_horizontal` x
    /// `tiles_vertical` grid of the texture identified by `tex_key`.
    pub fn create_tile_grid_sprite(
        &mut self,
        tex_key: impl Into<String>,
        tiles_horizontal: u32,
        tiles_vertical: u32,
    ) -> Result<Entity, MixerError> {
        let sprite = TileGridSprite::new(tex_key, tiles_horizontal, tiles_vertical)?;
        let entity = self.world.spawn(sprite).id();
        self.world
            .resource_mut::<AnimationRegistry>()
            .register(entity);
        debug!(
            "Registered sprite {:?} ({}x{} tiles)",
            entity, tiles_horizontal, tiles_vertical
        );
        Ok(entity)
    }

    /// Create an action playing `index_start..=index_end` of `sprite`, each
    /// tile shown for `tile_display_duration_ms` milliseconds.
    ///
    /// Policy flags start from the [`MixerConfig`] defaults.
    pub fn create_action(
        &mut self,
        sprite: Entity,
        index_start: u32,
        index_end: u32,
        tile_display_duration_ms: f64,
    ) -> Result<Entity, MixerError> {
        let grid = self.world.get::<TileGridSprite>(sprite).ok_or_else(|| {
            MixerError::invalid(format!("{:?} is not a tile grid sprite", sprite))
        })?;
        let config = self.world.resource::<MixerConfig>();
        let action = Action::new(
            sprite,
            grid,
            index_start,
            index_end,
            tile_display_duration_ms,
        )?
        .with_must_loop(config.must_loop)
        .with_clamp_when_finished(config.clamp_when_finished)
        .with_hide_when_finished(config.hide_when_finished);
        let entity = self.world.spawn(action).id();
        debug!(
            "Created action {:?} on sprite {:?}: tiles {}..={} every {}ms",
            entity, sprite, index_start, index_end, tile_display_duration_ms
        );
        Ok(entity)
    }

    /// Advance every playing sprite by `dt_seconds` of host time, then deliver
    /// the events this produced.
    pub fn tick(&mut self, dt_seconds: f32) {
        update_world_time(&mut self.world, dt_seconds);
        self.update.run(&mut self.world);
        flush_action_events(&mut self.world);
    }

    /// Subscribe by event name. See [`EventBus::subscribe`].
    pub fn subscribe<F>(
        &mut self,
        event_name: &str,
        callback: Option<F>,
    ) -> Result<(), MixerError>
    where
        F: Fn(&ActionEvent, &World) + Send + Sync + 'static,
    {
        let callback = callback.map(|f| Box::new(f) as ActionListener);
        self.world
            .resource_mut::<EventBus>()
            .subscribe(event_name, callback)
    }

    pub fn on<F>(&mut self, kind: ActionEventKind, callback: F)
    where
        F: Fn(&ActionEvent, &World) + Send + Sync + 'static,
    {
        self.world.resource_mut::<EventBus>().on(kind, callback);
    }

    pub fn play_once(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, sprite| act.play_once(action, sprite))
    }

    pub fn play_loop(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, sprite| act.play_loop(action, sprite))
    }

    pub fn resume(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, sprite| act.resume(sprite))
    }

    pub fn pause(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, sprite| act.pause(sprite))
    }

    pub fn pause_next_end(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, _| act.pause_next_end())
    }

    pub fn stop(&mut self, action: Entity) -> Result<(), MixerError> {
        self.with_action(action, |act, sprite| act.stop(sprite))
    }

    pub fn set_clamp_when_finished(
        &mut self,
        action: Entity,
        clamp: bool,
    ) -> Result<(), MixerError> {
        self.with_action(action, |act, _| act.clamp_when_finished = clamp)
    }

    pub fn set_hide_when_finished(
        &mut self,
        action: Entity,
        hide: bool,
    ) -> Result<(), MixerError> {
        self.with_action(action, |act, _| act.hide_when_finished = hide)
    }

    /// Pause `sprite` on `frame`. The index is not validated.
    pub fn seek_frame(&mut self, sprite: Entity, frame: u32) -> Result<(), MixerError> {
        let mut grid = self
            .world
            .get_mut::<TileGridSprite>(sprite)
            .ok_or_else(|| {
                MixerError::invalid(format!("{:?} is not a tile grid sprite", sprite))
            })?;
        grid.seek_frame(frame);
        Ok(())
    }

    /// Observable state of `action`; `Idle` when it does not exist.
    pub fn action_state(&self, action: Entity) -> ActionState {
        let Some(act) = self.world.get::<Action>(action) else {
            return ActionState::Idle;
        };
        match self.world.get::<TileGridSprite>(act.sprite) {
            Some(sprite) => act.status(action, sprite),
            None => ActionState::Idle,
        }
    }

    pub fn sprite(&self, sprite: Entity) -> Option<&TileGridSprite> {
        self.world.get::<TileGridSprite>(sprite)
    }

    pub fn action(&self, action: Entity) -> Option<&Action> {
        self.world.get::<Action>(action)
    }

    pub fn uv_offset(&self, sprite: Entity) -> Option<UvOffset> {
        self.sprite(sprite).map(TileGridSprite::uv_offset)
    }

    pub fn snapshot(&self, sprite: Entity) -> Option<SpriteSnapshot> {
        self.sprite(sprite).map(TileGridSprite::snapshot)
    }

    pub fn registry(&self) -> &AnimationRegistry {
        self.world.resource::<AnimationRegistry>()
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    /// Despawn every sprite and action, drop all listeners and pending events.
    pub fn teardown(&mut self) {
        let sprites: Vec<Entity> = self.registry().sprites().to_vec();
        let actions: Vec<Entity> = self
            .world
            .query_filtered::<Entity, With<Action>>()
            .iter(&self.world)
            .collect();
        for entity in sprites.iter().chain(actions.iter()) {
            self.world.despawn(*entity);
        }
        self.world.resource_mut::<AnimationRegistry>().clear();
        self.world.resource_mut::<EventBus>().clear();
        self.world.resource_mut::<Messages<ActionEvent>>().clear();
        info!(
            "Mixer teardown: released {} sprites and {} actions",
            sprites.len(),
            actions.len()
        );
    }

    fn with_action<R>(
        &mut self,
        action: Entity,
        f: impl FnOnce(&mut Action, &mut TileGridSprite) -> R,
    ) -> Result<R, MixerError> {
        with_action(&mut self.world, action, f)
    }
}

/// Run `f` on an action and its sprite, writing the action back afterwards.
///
/// This is the world-level form of the facade's per-action methods. Event bus
/// listeners only get `&World`, so a host that wants to start another action
/// when one finishes does it from an observer through a queued command:
///
/// ```ignore
/// mixer.world_mut().add_observer(move |ev: On<ActionEvent>, mut commands: Commands| {
///     if ev.event().action == jump && ev.event().kind == ActionEventKind::Finished {
///         commands.queue(move |world: &mut World| {
///             if let Err(e) = with_action(world, walk, |act, sprite| act.play_loop(walk, sprite)) {
///                 log::warn!("{}", e);
///             }
///         });
///     }
/// });
/// ```
pub fn with_action<R>(
    world: &mut World,
    action: Entity,
    f: impl FnOnce(&mut Action, &mut TileGridSprite) -> R,
) -> Result<R, MixerError> {
    let mut act = world
        .get::<Action>(action)
        .cloned()
        .ok_or_else(|| MixerError::invalid(format!("{:?} is not an action", action)))?;
    let result = {
        let mut sprite = world.get_mut::<TileGridSprite>(act.sprite).ok_or_else(|| {
            MixerError::invalid(format!(
                "sprite {:?} of action {:?} no longer exists",
                act.sprite, action
            ))
        })?;
        f(&mut act, &mut *sprite)
    };
    if let Some(mut slot) = world.get_mut::<Action>(action) {
        *slot = act;
    }
    Ok(result)
}
