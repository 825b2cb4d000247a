//! Tile-grid sprite animation mixer.
//!
//! Drives sprite-sheet animation for 2D billboards: a texture split into a
//! grid of tiles is played through named [`Action`](components::action::Action)
//! sub-sequences, advanced by the host's frame delta, looping or stopping at
//! the sequence boundaries and notifying listeners of `loop`/`finished`
//! events. Rendering, texture loading and the frame clock stay with the host;
//! the mixer only writes the UV offset each billboard should sample.
//!
//! The state lives in a `bevy_ecs` world: components, resources, systems and
//! events are exposed here for hosts that embed the systems in their own
//! schedule, while [`mixer::SpriteMixer`] wraps them behind a small facade.

pub mod components;
pub mod error;
pub mod events;
pub mod mixer;
pub mod resources;
pub mod systems;

pub use components::action::{Action, ActionState};
pub use components::tilegridsprite::{SpriteSnapshot, TileGridSprite, UvOffset};
pub use error::MixerError;
pub use events::action::{ActionEvent, ActionEventKind};
pub use mixer::SpriteMixer;
