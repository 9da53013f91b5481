//! Tako Jump - a charge-and-jump vertical platformer
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, stage generation, session flow)
//! - `tuning`: Data-driven stage table and scoring
//! - `persistence`: High score storage
//! - `platform`: Browser bindings (wasm32 only)

pub mod persistence;
pub mod platform;
pub mod sim;
pub mod tuning;

#[cfg(not(target_arch = "wasm32"))]
pub use persistence::FileStore;
pub use persistence::{HighScoreStore, MemoryStore, StoreError};
pub use sim::{Session, TickInput};
pub use tuning::{Scoring, StageConfig, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
///
/// Per-tick quantities are expressed per 60 Hz step.
pub mod consts {
    /// Fixed simulation timestep (60 Hz, the rate the tuning was authored at)
    pub const SIM_DT: f32 = 1.0 / SIM_RATE as f32;
    /// Fixed steps per simulated second
    pub const SIM_RATE: u32 = 60;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Play field dimensions
    pub const CANVAS_WIDTH: f32 = 390.0;
    pub const CANVAS_HEIGHT: f32 = 844.0;
    /// Ground plane top, measured from the top of the first screen
    pub const GROUND_Y: f32 = CANVAS_HEIGHT - 50.0;
    /// Character spawns this far right of the ground's left edge
    pub const SPAWN_OFFSET_X: f32 = 50.0;

    /// Character body
    pub const CHARACTER_WIDTH: f32 = 29.0;
    pub const CHARACTER_HEIGHT: f32 = 35.0;
    pub const GRAVITY: f32 = 0.36;
    pub const MAX_FALL_SPEED: f32 = 10.5;
    /// Lateral nudge per tick while airborne (not charging)
    pub const AIR_CONTROL: f32 = 0.25;
    /// Lateral nudge per tick while charging in the air
    pub const AIR_CONTROL_CHARGING: f32 = 0.05;
    /// Scales every horizontal contribution of a jump or nudge
    pub const HORIZONTAL_FACTOR: f32 = 0.7;
    /// Hard cap on |velocity.x|
    pub const MAX_HORIZONTAL_SPEED: f32 = 6.0;
    /// Cap on the slide speed kept when landing on ice
    pub const MAX_SLIDE_SPEED: f32 = 4.0;

    /// Jump charge
    pub const MAX_CHARGE_TIME: f32 = 1.0; // seconds
    pub const MIN_JUMP_SPEED: f32 = 5.3;
    pub const MAX_JUMP_SPEED: f32 = 15.8;
    /// Deflection from vertical when a direction is latched (0.08π ≈ 14.4°)
    pub const JUMP_TILT: f32 = std::f32::consts::PI * 0.08;

    /// Platforms are tiled from square blocks
    pub const BLOCK_SIZE: f32 = 14.0;
    pub const PLATFORM_HEIGHT: f32 = 14.0;
    /// Inward margin for landing overlap tests
    pub const LANDING_MARGIN: f32 = 2.0;
    /// Generated platforms stay this far from the side walls
    pub const EDGE_MARGIN: f32 = 20.0;
    /// How far a platform centre may sit from the previous one
    pub const MAX_HORIZONTAL_REACH: f32 = 160.0;

    /// Conveyor belts
    pub const CONVEYOR_SPEED: f32 = 1.5;
    pub const CONVEYOR_SEGMENT_WIDTH: f32 = 7.0;
    pub const CONVEYOR_ANIM_SPEED: f32 = 0.5;

    /// Goal (moon)
    pub const GOAL_SIZE: f32 = 80.0;
    pub const GOAL_OFFSET: f32 = 200.0;

    /// Hazard (eel)
    pub const EEL_SIZE: f32 = 32.0;
    pub const EEL_HOVER: f32 = 60.0;
    pub const EEL_IMPULSE: f32 = 24.0;
    pub const EEL_ROTATION_SPEED: f32 = 0.02;

    /// Fraction of the combined radii used by proximity tests
    pub const PROXIMITY_FACTOR: f32 = 0.7;

    /// Water
    pub const WATER_START_BELOW_GROUND: f32 = 300.0;
    pub const WATER_WAVE_SPEED: f32 = 0.05;

    /// Camera
    pub const CAMERA_LEAD: f32 = CANVAS_HEIGHT * 0.6;
    pub const CAMERA_SPAWN_OFFSET: f32 = 200.0;
    pub const CAMERA_FOLLOW: f32 = 0.1;

    /// Delay between death and respawn / game over (seconds)
    pub const DEATH_DELAY: f64 = 1.0;
}

/// Centre-distance proximity test between two circles.
///
/// Hits when the centres are closer than `PROXIMITY_FACTOR` of the combined radii.
#[inline]
pub fn within_reach(a: Vec2, a_radius: f32, b: Vec2, b_radius: f32) -> bool {
    a.distance(b) < (a_radius + b_radius) * consts::PROXIMITY_FACTOR
}

/// Snap a coordinate to the platform block grid
#[inline]
pub fn snap_to_grid(x: f32) -> f32 {
    (x / consts::BLOCK_SIZE).round() * consts::BLOCK_SIZE
}
