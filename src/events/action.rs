//! Action boundary notifications.
//!
//! The driver writes an [`ActionEvent`] into the ECS message queue whenever a
//! playing [`Action`](crate::components::action::Action) wraps around
//! (`loop`) or stops at the end of its sequence (`finished`). Pending events
//! are delivered once the tick's state mutation is complete, first to the
//! [`EventBus`](crate::resources::eventbus::EventBus) listeners and then to
//! any bevy observer.
//!
//! # Example
//!
//! ```ignore
//! world.add_observer(|trigger: On<ActionEvent>| {
//!     if trigger.event().kind == ActionEventKind::Finished {
//!         // swap to an idle action, despawn a one-shot effect, ...
//!     }
//! });
//! ```

use std::fmt;
use std::str::FromStr;

use bevy_ecs::message::Message;
use bevy_ecs::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::MixerError;

/// Name of a notification an action can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionEventKind {
    /// A looping action wrapped from its last tile to its first.
    Loop,
    /// A non-looping action reached the end of its sequence and paused.
    Finished,
}

impl ActionEventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionEventKind::Loop => "loop",
            ActionEventKind::Finished => "finished",
        }
    }
}

impl fmt::Display for ActionEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionEventKind {
    type Err = MixerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loop" => Ok(ActionEventKind::Loop),
            "finished" => Ok(ActionEventKind::Finished),
            "" => Err(MixerError::invalid("event name is missing")),
            other => Err(MixerError::invalid(format!(
                "unknown event name '{}', expected 'loop' or 'finished'",
                other
            ))),
        }
    }
}

/// Payload delivered to listeners: the event type and the action that caused it.
#[derive(Event, Message, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionEvent {
    pub kind: ActionEventKind,
    /// Entity holding the [`Action`](crate::components::action::Action).
    pub action: Entity,
    /// Sprite the action was driving.
    pub sprite: Entity,
}
