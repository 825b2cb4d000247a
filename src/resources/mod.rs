//! ECS resources made available to systems.
//!
//! Overview
//! - `animationregistry` – ordered set of sprites the driver advances
//! - `eventbus` – listener callbacks for action events
//! - `mixerconfig` – time scale and default action policy, loadable from INI
//! - `worldtime` – simulation time and delta
pub mod animationregistry;
pub mod eventbus;
pub mod mixerconfig;
pub mod worldtime;
