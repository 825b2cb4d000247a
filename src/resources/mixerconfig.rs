//! Mixer configuration resource.
//!
//! Holds the clock scale and the policy flags new actions start with. Values
//! can be loaded from an INI file; missing keys keep their defaults.
//!
//! # Configuration File Format
//!
//! ```ini
//! [time]
//! time_scale = 1.0
//!
//! [action]
//! must_loop = true
//! clamp_when_finished = true
//! hide_when_finished = false
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::info;
use std::path::PathBuf;

const DEFAULT_TIME_SCALE: f32 = 1.0;
const DEFAULT_MUST_LOOP: bool = true;
const DEFAULT_CLAMP_WHEN_FINISHED: bool = true;
const DEFAULT_HIDE_WHEN_FINISHED: bool = false;
const DEFAULT_CONFIG_PATH: &str = "./tilegrid-mixer.ini";

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct MixerConfig {
    /// Multiplier applied to the host delta before it reaches the actions.
    pub time_scale: f32,
    /// Initial `must_loop` of new actions.
    pub must_loop: bool,
    /// Initial `clamp_when_finished` of new actions.
    pub clamp_when_finished: bool,
    /// Initial `hide_when_finished` of new actions.
    pub hide_when_finished: bool,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for MixerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MixerConfig {
    pub fn new() -> Self {
        Self {
            time_scale: DEFAULT_TIME_SCALE,
            must_loop: DEFAULT_MUST_LOOP,
            clamp_when_finished: DEFAULT_CLAMP_WHEN_FINISHED,
            hide_when_finished: DEFAULT_HIDE_WHEN_FINISHED,
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Returns an error if the file cannot be read or parsed, or if
    /// `time_scale` is negative.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [time] section
        if let Some(scale) = config.getfloat("time", "time_scale").ok().flatten() {
            if scale < 0.0 {
                return Err(format!("time_scale must not be negative, got {}", scale));
            }
            self.time_scale = scale as f32;
        }

        // [action] section
        if let Some(must_loop) = config.getbool("action", "must_loop").ok().flatten() {
            self.must_loop = must_loop;
        }
        if let Some(clamp) = config
            .getbool("action", "clamp_when_finished")
            .ok()
            .flatten()
        {
            self.clamp_when_finished = clamp;
        }
        if let Some(hide) = config
            .getbool("action", "hide_when_finished")
            .ok()
            .flatten()
        {
            self.hide_when_finished = hide;
        }

        info!(
            "Loaded config: time_scale={}, must_loop={}, clamp_when_finished={}, hide_when_finished={}",
            self.time_scale, self.must_loop, self.clamp_when_finished, self.hide_when_finished
        );

        Ok(())
    }

    /// Save configuration to the INI file, creating it if needed.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        config.set("time", "time_scale", Some(self.time_scale.to_string()));

        config.set("action", "must_loop", Some(self.must_loop.to_string()));
        config.set(
            "action",
            "clamp_when_finished",
            Some(self.clamp_when_finished.to_string()),
        );
        config.set(
            "action",
            "hide_when_finished",
            Some(self.hide_when_finished.to_string()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}
