//! Galton Board - a bean machine simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (board layout, physics, collisions, binning)
//! - `settings`: Run parameters and board configuration
//! - `stats`: Read-only run statistics for a host display

pub mod settings;
pub mod sim;
pub mod stats;

pub use settings::{Settings, SettingsError};
pub use stats::RunStats;

/// Simulation configuration constants
pub mod consts {
    /// Host frame rate the spawn pacing formula assumes
    pub const TICKS_PER_SECOND: f32 = 60.0;

    /// Gravity, added to vertical velocity every tick (pixels/tick²)
    pub const GRAVITY: f32 = 0.3;
    /// Horizontal velocity multiplier per tick (air resistance)
    pub const DRAG_X: f32 = 0.98;
    /// Vertical velocity multiplier per tick
    pub const DRAG_Y: f32 = 0.99;

    /// Speed multiplier applied on every pin bounce
    pub const BOUNCE_DAMPING: f32 = 0.4;
    /// Half-width of the uniform angular noise added to a pin bounce (radians)
    pub const BOUNCE_ANGLE_JITTER: f32 = 0.15;
    /// Below this horizontal speed a bounced ball gets kicked sideways
    pub const MIN_HORIZONTAL_SPEED: f32 = 0.5;
    /// Horizontal speed of the sideways kick
    pub const STALL_KICK_SPEED: f32 = 0.75;

    /// Fraction of horizontal speed kept after hitting a side wall
    pub const WALL_RESTITUTION: f32 = 0.5;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    pub const PIN_RADIUS: f32 = 6.0;
    /// Trail positions kept per ball
    pub const TRAIL_LENGTH: usize = 5;

    /// Spawn height (from top of the board)
    pub const SPAWN_Y: f32 = 50.0;
    /// Half-width of the uniform horizontal spawn jitter
    pub const SPAWN_JITTER: f32 = 10.0;

    /// Collection threshold, measured up from the bottom of the board
    pub const COLLECT_MARGIN: f32 = 120.0;
    /// Discard threshold, measured down from the bottom of the board
    pub const DISCARD_MARGIN: f32 = 100.0;

    /// Ball colors (0xRRGGBB)
    pub const PALETTE: [u32; 8] = [
        0xFF6B6B, 0x4ECDC4, 0x45B7D1, 0x96CEB4, 0xFECA57, 0xFF9FF3, 0x54A0FF, 0x5F27CD,
    ];
}
