//! Listener registry for action notifications.
//!
//! Callbacks subscribe to an [`ActionEventKind`] and are invoked
//! synchronously, in subscription order, by [`EventBus::publish`]. The driver
//! never publishes directly: it queues events while the tick mutates sprites
//! and [`flush_action_events`](crate::systems::animation::flush_action_events)
//! publishes them afterwards, so a listener always sees settled state through
//! the `&World` it receives.
//!
//! Listeners are read-only. To react by mutating the mixer, for instance
//! looping an idle action once another one finishes, add an
//! `On<ActionEvent>` observer and queue the change through `Commands` with
//! [`with_action`](crate::mixer::with_action).

use bevy_ecs::prelude::{Resource, World};
use rustc_hash::FxHashMap;

use crate::error::MixerError;
use crate::events::action::{ActionEvent, ActionEventKind};

/// Callback invoked with the event and read access to the world.
pub type ActionListener = Box<dyn Fn(&ActionEvent, &World) + Send + Sync>;

#[derive(Resource, Default)]
pub struct EventBus {
    listeners: FxHashMap<ActionEventKind, Vec<ActionListener>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback` under `event_name` (`"loop"` or `"finished"`).
    ///
    /// Fails with [`MixerError::InvalidArgument`] and registers nothing when
    /// either argument is missing or the name is unknown.
    pub fn subscribe(
        &mut self,
        event_name: &str,
        callback: Option<ActionListener>,
    ) -> Result<(), MixerError> {
        let kind: ActionEventKind = event_name.parse()?;
        let callback =
            callback.ok_or_else(|| MixerError::invalid("an event callback is missing"))?;
        self.listeners.entry(kind).or_default().push(callback);
        Ok(())
    }

    /// Typed subscription.
    pub fn on<F>(&mut self, kind: ActionEventKind, callback: F)
    where
        F: Fn(&ActionEvent, &World) + Send + Sync + 'static,
    {
        self.listeners.entry(kind).or_default().push(Box::new(callback));
    }

    /// Invoke every listener of `event.kind` in subscription order.
    /// Returns how many were called; zero listeners is not an error.
    pub fn publish(&self, event: &ActionEvent, world: &World) -> usize {
        let Some(listeners) = self.listeners.get(&event.kind) else {
            return 0;
        };
        for listener in listeners {
            listener(event, world);
        }
        listeners.len()
    }

    pub fn listener_count(&self, kind: ActionEventKind) -> usize {
        self.listeners.get(&kind).map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.listeners.clear();
    }
}
