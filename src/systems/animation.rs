//! Tile-grid animation systems.
//!
//! - [`tile_grid_animation`] advances the current action of every registered,
//!   unpaused sprite by the frame delta and queues boundary events.
//! - [`flush_action_events`] delivers the queued events once the tick's state
//!   mutation is complete.
//!
//! # Tick Flow
//!
//! 1. [`update_world_time`](crate::systems::time::update_world_time) stores the scaled host delta
//! 2. `tile_grid_animation` walks the [`AnimationRegistry`] in registration order,
//!    converting the delta to milliseconds for each [`Action`]
//! 3. Every `loop`/`finished` crossing is written to `Messages<ActionEvent>`
//! 4. `flush_action_events` drains the queue in emission order, calling the
//!    [`EventBus`] listeners and then triggering bevy observers
//!
//! # Related
//!
//! - [`crate::components::action::Action`] – state machine and boundary policy
//! - [`crate::components::tilegridsprite::TileGridSprite`] – tile index and UV offset
//! - [`crate::resources::eventbus::EventBus`] – callback registry

use bevy_ecs::prelude::*;
use log::{debug, warn};

use crate::components::action::Action;
use crate::components::tilegridsprite::TileGridSprite;
use crate::events::action::ActionEvent;
use crate::resources::animationregistry::AnimationRegistry;
use crate::resources::eventbus::EventBus;
use crate::resources::worldtime::WorldTime;

/// Advance every playing sprite by the current frame delta.
///
/// Contract
/// - Reads [`WorldTime`] for the scaled delta.
/// - Skips paused sprites, sprites without a current action and registry
///   entries whose entity has been despawned.
/// - Mutates [`TileGridSprite`] tile/accumulator/UV and [`Action`] state.
/// - Writes one [`ActionEvent`] per boundary crossing, in crossing order.
pub fn tile_grid_animation(
    registry: Res<AnimationRegistry>,
    time: Res<WorldTime>,
    mut sprites: Query<&mut TileGridSprite>,
    mut actions: Query<&mut Action>,
    mut outbox: MessageWriter<ActionEvent>,
) {
    let dt_ms = time.delta_millis();
    if dt_ms <= 0.0 {
        return;
    }

    for &sprite_entity in registry.sprites() {
        let Ok(mut sprite) = sprites.get_mut(sprite_entity) else {
            debug!("Sprite {:?} no longer exists, skipping", sprite_entity);
            continue;
        };
        if sprite.paused {
            continue;
        }
        let Some(action_entity) = sprite.current_action else {
            continue;
        };
        let Ok(mut action) = actions.get_mut(action_entity) else {
            warn!(
                "Sprite {:?} points at missing action {:?}",
                sprite_entity, action_entity
            );
            continue;
        };

        action.advance(&mut sprite, dt_ms, |kind| {
            outbox.write(ActionEvent {
                kind,
                action: action_entity,
                sprite: sprite_entity,
            });
        });
    }
}

/// Deliver every queued [`ActionEvent`] in emission order.
///
/// Runs after the animation schedule, so listeners observe the settled state
/// of the tick that produced the event and run before the next tick starts.
/// [`EventBus`] listeners are called first, then the event is triggered for
/// `On<ActionEvent>` observers. Commands queued by observers are applied
/// before returning, so an action started from a `finished` observer is
/// already playing on the next tick.
pub fn flush_action_events(world: &mut World) {
    let pending: Vec<ActionEvent> = world
        .resource_mut::<Messages<ActionEvent>>()
        .drain()
        .collect();

    for event in pending {
        debug!("Action {:?}: {}", event.action, event.kind);
        world.resource_scope(|world, bus: Mut<EventBus>| {
            bus.publish(&event, world);
        });
        world.trigger(event);
    }
    world.flush();
}
