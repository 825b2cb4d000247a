//! ECS systems driving the mixer.
//!
//! - [`animation`] – advances actions and delivers their events
//! - [`time`] – updates the shared clock from the host delta
pub mod animation;
pub mod time;
