//! Headless driver for the tile-grid mixer.
//!
//! Builds one sprite grid and one action from the command line, ticks it at a
//! simulated frame rate and logs every `loop`/`finished` event. The final
//! state of the sprite is printed at the end, as JSON with `--json`.
//!
//! # Running
//!
//! ```sh
//! RUST_LOG=debug cargo run -- --tiles-h 4 --tiles-v 2 --end 3 --frame-ms 100 --once
//! ```

use clap::Parser;
use std::path::PathBuf;

use tilegrid_mixer::resources::mixerconfig::MixerConfig;
use tilegrid_mixer::{ActionEventKind, SpriteMixer};

/// Tile-grid sprite mixer demo
#[derive(Parser)]
#[command(version, about = "Plays a tile-grid sprite action without a renderer.")]
struct Cli {
    /// INI file with the mixer configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Texture key of the sprite sheet.
    #[arg(long, default_value = "spritesheet")]
    texture: String,

    /// Number of tiles along the texture width.
    #[arg(long, default_value_t = 4)]
    tiles_h: u32,

    /// Number of tiles along the texture height.
    #[arg(long, default_value_t = 2)]
    tiles_v: u32,

    /// First tile of the action.
    #[arg(long, default_value_t = 0)]
    start: u32,

    /// Last tile of the action (inclusive).
    #[arg(long, default_value_t = 3)]
    end: u32,

    /// Milliseconds each tile stays on screen.
    #[arg(long, default_value_t = 100.0)]
    frame_ms: f64,

    /// Simulated render frame rate.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Number of render frames to simulate.
    #[arg(long, default_value_t = 120)]
    frames: u32,

    /// Random variation of each frame delta, as a fraction of the nominal delta.
    #[arg(long, default_value_t = 0.0)]
    jitter: f32,

    /// Play the action once instead of looping.
    #[arg(long)]
    once: bool,

    /// Print the final sprite state as JSON.
    #[arg(long)]
    json: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MixerConfig::with_path(path),
        None => MixerConfig::new(),
    };
    if cli.config.is_some() {
        if let Err(e) = config.load_from_file() {
            log::error!("{}", e);
            std::process::exit(1);
        }
    }

    let mut mixer = SpriteMixer::with_config(config);
    let sprite = match mixer.create_tile_grid_sprite(cli.texture.clone(), cli.tiles_h, cli.tiles_v)
    {
        Ok(sprite) => sprite,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };
    let action = match mixer.create_action(sprite, cli.start, cli.end, cli.frame_ms) {
        Ok(action) => action,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    for kind in [ActionEventKind::Loop, ActionEventKind::Finished] {
        mixer.on(kind, |event, world| {
            let time = world.resource::<tilegrid_mixer::resources::worldtime::WorldTime>();
            log::info!(
                "[frame {}] {} from action {:?}",
                time.frame_count,
                event.kind,
                event.action
            );
        });
    }

    let started = if cli.once {
        mixer.play_once(action)
    } else {
        mixer.play_loop(action)
    };
    if let Err(e) = started {
        log::error!("{}", e);
        std::process::exit(1);
    }

    let nominal_dt = 1.0 / cli.fps.max(1.0);
    let jitter = cli.jitter.clamp(0.0, 1.0);
    for _ in 0..cli.frames {
        let variation = (fastrand::f32() * 2.0 - 1.0) * jitter;
        mixer.tick(nominal_dt * (1.0 + variation));
    }

    let Some(snapshot) = mixer.snapshot(sprite) else {
        return;
    };
    if cli.json {
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize sprite state: {}", e),
        }
    } else {
        println!(
            "tile {} (row {}, column {}), uv ({:.4}, {:.4}), paused={}, visible={}, state={:?}",
            snapshot.tile,
            snapshot.row,
            snapshot.column,
            snapshot.uv_offset.u,
            snapshot.uv_offset.v,
            snapshot.paused,
            snapshot.visible,
            mixer.action_state(action)
        );
    }
}
