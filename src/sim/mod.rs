//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only, on the session's own clock
//! - Stage layouts come from a generator seeded by the stage number
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod character;
pub mod collision;
pub mod physics;
pub mod rng;
pub mod stage;
pub mod state;
pub mod tick;
pub mod timers;

pub use autopilot::Autopilot;
pub use character::{JumpVector, compute_jump};
pub use rng::StageRng;
pub use stage::{StageLayout, build_stage, generate_stage};
pub use state::{
    Camera, Character, CharacterPose, CharacterState, Goal, Hazard, LandingRule, Platform,
    PlatformKind, Screen, SessionState, Star, StarKind, Water,
};
pub use tick::{Session, TickInput};
pub use timers::{Scheduler, TaskKind};
