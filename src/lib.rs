//! Beat Brawler - rhythm brawler gameplay core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (character state machine, walls, judgment)
//! - `settings`: Data-driven tuning and difficulty presets

pub mod settings;
pub mod sim;

pub use settings::{Difficulty, Settings};

/// Game configuration constants
pub mod consts {
    /// Nominal frame step (60 Hz frame-driven loop)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Nominal frame step in milliseconds
    pub const FRAME_MS: f64 = 1000.0 / 60.0;

    /// Playfield dimensions
    pub const GAME_WIDTH: f32 = 1600.0;
    pub const GAME_HEIGHT: f32 = 900.0;

    /// Character defaults - spawned at horizontal center, standing on the ground line
    pub const CHARACTER_SPAWN_X: f32 = GAME_WIDTH / 2.0;
    pub const CHARACTER_GROUND_Y: f32 = GAME_HEIGHT - 200.0;
    pub const CHARACTER_SCALE: f32 = 3.0;
    /// Width of the character's collision interval
    pub const CHARACTER_WIDTH: f32 = 100.0;
    /// Initial jump velocity (pixels/frame, negative = up)
    pub const JUMP_SPEED: f32 = -15.0;
    /// Jump gravity (pixels/frame²)
    pub const JUMP_GRAVITY: f32 = 1.0;

    /// Wall defaults
    pub const WALL_WIDTH: f32 = 160.0;
    pub const WALL_HEIGHT: f32 = 300.0;
    pub const WALL_DEFAULT_SPEED: f32 = 8.0;
    /// Extra distance past the left edge before a wall is culled
    pub const WALL_CULL_MARGIN: f32 = 100.0;

    /// Shatter effect
    pub const SHARD_COUNT: usize = 10;
    pub const SHARD_GRAVITY: f32 = 0.6;
    pub const SHARD_FADE_PER_FRAME: f32 = 6.0;
    pub const SHARD_SHRINK: f32 = 0.95;
    pub const SHARD_MIN_SIZE: f32 = 2.0;
    pub const SHARD_START_ALPHA: f32 = 255.0;

    /// Spawning
    pub const SPAWN_INTERVAL_MS: f64 = 2000.0;
    pub const BASE_WALL_SPEED: f32 = 16.0;
    pub const MAX_SPEED_MULTIPLIER: f32 = 2.5;
    /// Walls appear this far past the right edge
    pub const SPAWN_MARGIN: f32 = 100.0;
    /// Minimum gap between a new wall and the newest standing wall
    pub const SPAWN_SAFE_DISTANCE: f32 = 60.0;

    /// Hit zone (screen-space, ahead of the character)
    pub const HIT_ZONE_OFFSET: f32 = 150.0;
    pub const HIT_ZONE_WIDTH: f32 = 200.0;

    /// Judgment popup lifetime
    pub const JUDGMENT_DISPLAY_MS: f64 = 800.0;
    /// Duration of one hit-effect frame
    pub const HIT_EFFECT_FRAME_MS: f64 = 40.0;
    pub const HIT_EFFECT_FRAMES: u32 = 8;

    /// Ticks of invulnerability after a non-lethal hit (~1 s)
    pub const INVINCIBILITY_TICKS: u32 = 60;
    /// Ticks a mid-attack press stays buffered
    pub const ATTACK_BUFFER_TICKS: u32 = 8;
}

/// Y coordinate walls travel along for a given playfield height
#[inline]
pub fn wall_lane_y(game_height: f32) -> f32 {
    game_height - 200.0 - 225.0
}

/// `value` if finite and positive, otherwise `fallback` with a warning
pub(crate) fn positive_or<T>(name: &str, value: T, fallback: T) -> T
where
    T: Copy + Into<f64> + std::fmt::Display,
{
    let v: f64 = value.into();
    if v.is_finite() && v > 0.0 {
        value
    } else {
        log::warn!("Invalid {name} {value}, using {fallback}");
        fallback
    }
}

/// `value` if finite and not negative, otherwise `fallback` with a warning
pub(crate) fn non_negative_or<T>(name: &str, value: T, fallback: T) -> T
where
    T: Copy + Into<f64> + std::fmt::Display,
{
    let v: f64 = value.into();
    if v.is_finite() && v >= 0.0 {
        value
    } else {
        log::warn!("Invalid {name} {value}, using {fallback}");
        fallback
    }
}
