//! Registry of every sprite the mixer drives.
//!
//! Sprites are appended when the factory creates them and are never removed
//! implicitly. A host releases a sprite by despawning its entity; the driver
//! then skips the stale entry. Iteration follows registration order so a
//! given sequence of ticks always produces the same sequence of events.

use bevy_ecs::prelude::{Entity, Resource};

#[derive(Resource, Debug, Default, Clone)]
pub struct AnimationRegistry {
    sprites: Vec<Entity>,
}

impl AnimationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, sprite: Entity) {
        self.sprites.push(sprite);
    }

    /// Registered sprites in registration order.
    pub fn sprites(&self) -> &[Entity] {
        &self.sprites
    }

    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }

    /// Forget every entry. Used by explicit teardown.
    pub fn clear(&mut self) {
        self.sprites.clear();
    }
}
