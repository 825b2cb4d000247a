use bevy_ecs::prelude::Resource;

/// Host clock as seen by the mixer.
///
/// `delta` is the scaled frame delta in seconds; the driver converts it to
/// milliseconds before feeding it to actions.
#[derive(Resource, Clone, Copy, Debug)]
pub struct WorldTime {
    pub elapsed: f32,
    pub delta: f32,
    pub time_scale: f32,
    pub frame_count: u64,
}

impl Default for WorldTime {
    fn default() -> Self {
        WorldTime {
            elapsed: 0.0,
            delta: 0.0,
            time_scale: 1.0,
            frame_count: 0,
        }
    }
}

impl WorldTime {
    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Scaled delta of the current frame in milliseconds, widened for the
    /// per-sprite accumulators.
    pub fn delta_millis(&self) -> f64 {
        f64::from(self.delta * 1000.0)
    }
}
