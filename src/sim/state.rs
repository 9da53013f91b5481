//! Game state and core simulation types
//!
//! Everything the renderer needs lives in [`SessionState`]; it is plain data
//! and serializes to JSON for the web host.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::stage::StageLayout;
use crate::consts::*;

/// Screen-level flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Screen {
    /// Title card, waiting for confirm
    #[default]
    Title,
    /// Active gameplay
    Playing,
    /// Gameplay frozen, pause menu shown
    Paused,
    /// Goal reached, waiting for confirm
    Cleared,
    /// Out of lives, waiting for confirm
    GameOver,
}

/// Character finite-state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CharacterState {
    #[default]
    Idle,
    Charging,
    Jumping,
    Dead,
}

/// Sprite frame for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CharacterPose {
    Charge0,
    Charge33,
    Charge66,
    Charge100,
    Dead,
}

/// The player character (top-left anchored box)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub pos: Vec2,
    pub vel: Vec2,
    pub state: CharacterState,
    /// Simulation clock time the current charge started
    pub charge_start: Option<f64>,
    /// Charge progress in [0, 1]
    pub charge_ratio: f32,
    pub is_grounded: bool,
    pub facing_right: bool,
    /// Horizontal speed captured when an in-air charge began
    pub air_charge_locked_vel_x: Option<f32>,
    /// Horizontal direction latched during a grounded charge (-1, 0, 1)
    pub latched_direction: i8,
    /// Index of the platform the character stands on
    pub ground: Option<usize>,
}

impl Character {
    /// A fresh character standing on `platform`
    pub fn spawn_on(platform: &Platform, index: usize) -> Self {
        Self {
            pos: Vec2::new(platform.x + SPAWN_OFFSET_X, platform.y - CHARACTER_HEIGHT),
            vel: Vec2::ZERO,
            state: CharacterState::Idle,
            charge_start: None,
            charge_ratio: 0.0,
            is_grounded: true,
            facing_right: true,
            air_charge_locked_vel_x: None,
            latched_direction: 0,
            ground: Some(index),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + CHARACTER_WIDTH
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + CHARACTER_HEIGHT
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::new(CHARACTER_WIDTH, CHARACTER_HEIGHT) * 0.5
    }

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.state == CharacterState::Dead
    }

    /// Whether a charge is in progress
    #[inline]
    pub fn is_charging(&self) -> bool {
        self.charge_start.is_some()
    }

    /// Drop any charge in progress
    pub fn clear_charge(&mut self) {
        self.charge_start = None;
        self.charge_ratio = 0.0;
        self.air_charge_locked_vel_x = None;
        self.latched_direction = 0;
    }

    /// Leave the ground without a jump (walked or carried off an edge)
    pub fn detach(&mut self) {
        self.is_grounded = false;
        self.ground = None;
        self.state = CharacterState::Jumping;
    }

    /// Sprite frame by charge progress
    pub fn pose(&self) -> CharacterPose {
        if self.is_dead() {
            return CharacterPose::Dead;
        }
        match self.charge_ratio {
            r if r >= 1.0 => CharacterPose::Charge100,
            r if r >= 0.66 => CharacterPose::Charge66,
            r if r >= 0.33 => CharacterPose::Charge33,
            _ => CharacterPose::Charge0,
        }
    }
}

/// Platform surface kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    /// Frictionless: landing keeps horizontal speed
    Ice,
    /// Moving belt: carries a grounded character
    Conveyor { direction: i8 },
}

/// How a platform kind sets horizontal speed on landing
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LandingRule {
    /// Horizontal speed is zeroed
    Stop,
    /// Horizontal speed is kept, clamped to the max slide speed
    Slide,
}

impl PlatformKind {
    pub fn landing_rule(self) -> LandingRule {
        match self {
            PlatformKind::Normal | PlatformKind::Conveyor { .. } => LandingRule::Stop,
            PlatformKind::Ice => LandingRule::Slide,
        }
    }

    /// Per-tick horizontal displacement applied to a grounded character
    pub fn carry(self) -> f32 {
        match self {
            PlatformKind::Normal | PlatformKind::Ice => 0.0,
            PlatformKind::Conveyor { direction } => CONVEYOR_SPEED * f32::from(direction),
        }
    }

    /// Whether directional input is latched while charging on this surface
    pub fn allows_aim(self) -> bool {
        !matches!(self, PlatformKind::Ice)
    }
}

/// A platform (top-left anchored)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Platform {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub kind: PlatformKind,
    pub block_count: u32,
    /// Belt animation offset (conveyors only, cosmetic)
    #[serde(default)]
    pub belt_offset: f32,
}

impl Platform {
    /// Full-width ground plane
    pub fn ground() -> Self {
        Self {
            x: 0.0,
            y: GROUND_Y,
            width: CANVAS_WIDTH,
            kind: PlatformKind::Normal,
            block_count: (CANVAS_WIDTH / BLOCK_SIZE).ceil() as u32,
            belt_offset: 0.0,
        }
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    /// Whether the character's footprint overlaps this platform at all
    #[inline]
    pub fn overlaps(&self, character: &Character) -> bool {
        character.right() > self.x && character.left() < self.right()
    }

    /// Overlap with a small inward margin, so grazing an edge neither lands
    /// nor keeps the character standing
    #[inline]
    pub fn supports(&self, character: &Character) -> bool {
        character.right() - LANDING_MARGIN > self.x && character.left() + LANDING_MARGIN < self.right()
    }

    /// Advance the belt animation
    pub fn animate(&mut self) {
        if matches!(self.kind, PlatformKind::Conveyor { .. }) {
            self.belt_offset =
                (self.belt_offset + CONVEYOR_ANIM_SPEED) % (CONVEYOR_SEGMENT_WIDTH * 2.0);
        }
    }
}

/// Collectible hazard (eel) granting a super jump
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard {
    pub pos: Vec2,
    pub size: f32,
    /// Cosmetic spin, only ever increases
    pub rotation: f32,
    pub is_collected: bool,
}

impl Hazard {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size * 0.5)
    }
}

/// Stage goal (moon)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub pos: Vec2,
    pub size: f32,
}

impl Goal {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size * 0.5)
    }
}

/// Rising death boundary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Water {
    /// Surface y (decreasing = rising)
    pub y: f32,
    pub speed: f32,
    pub is_rising: bool,
    /// Cosmetic wave phase
    pub wave_phase: f32,
}

impl Water {
    /// Still water below the ground, out of view
    pub fn new(speed: f32) -> Self {
        Self {
            y: GROUND_Y + WATER_START_BELOW_GROUND,
            speed,
            is_rising: false,
            wave_phase: 0.0,
        }
    }

    /// Rise one tick if the delay has elapsed
    pub fn update(&mut self) {
        if self.is_rising {
            self.y -= self.speed;
            self.wave_phase += WATER_WAVE_SPEED * 60.0;
        }
    }
}

/// Vertical camera follow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    pub y: f32,
    pub target_y: f32,
}

impl Camera {
    /// Camera framing the spawn platform
    pub fn centered_on(platform: &Platform) -> Self {
        let y = platform.y - CANVAS_HEIGHT + CAMERA_SPAWN_OFFSET;
        Self { y, target_y: y }
    }

    /// Exponential approach toward a target derived from the character's height
    pub fn follow(&mut self, character: &Character) {
        self.target_y = character.pos.y - CAMERA_LEAD;
        self.y += (self.target_y - self.y) * CAMERA_FOLLOW;
    }
}

/// Decorative star shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StarKind {
    Dot,
    Cross,
    Crescent,
    Sparkle,
}

impl StarKind {
    pub const ALL: [StarKind; 4] = [
        StarKind::Dot,
        StarKind::Cross,
        StarKind::Crescent,
        StarKind::Sparkle,
    ];
}

/// Background star (cosmetic only)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Star {
    pub pos: Vec2,
    pub size: f32,
    pub kind: StarKind,
}

/// Complete session state handed to the renderer each tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub screen: Screen,
    /// 1-based stage number
    pub stage: u32,
    pub score: u64,
    pub high_score: u64,
    pub lives: u32,
    /// Simulation clock time the stage started
    pub stage_start: f64,
    /// Seconds since stage start
    pub elapsed_time: f32,
    pub is_high_score_updated: bool,
    /// Set when the cleared stage was the last one
    pub is_all_clear: bool,
    pub character: Character,
    pub platforms: Vec<Platform>,
    pub hazards: Vec<Hazard>,
    pub goal: Goal,
    pub water: Water,
    pub camera: Camera,
    pub stars: Vec<Star>,
}

impl SessionState {
    /// Fresh state on the title screen, showing `layout` as the backdrop
    pub fn new(layout: StageLayout, water_speed: f32, high_score: u64, lives: u32) -> Self {
        let ground = layout
            .platforms
            .first()
            .cloned()
            .unwrap_or_else(Platform::ground);
        Self {
            screen: Screen::Title,
            stage: 1,
            score: 0,
            high_score,
            lives,
            stage_start: 0.0,
            elapsed_time: 0.0,
            is_high_score_updated: false,
            is_all_clear: false,
            character: Character::spawn_on(&ground, 0),
            camera: Camera::centered_on(&ground),
            platforms: layout.platforms,
            hazards: layout.hazards,
            goal: layout.goal,
            water: Water::new(water_speed),
            stars: layout.stars,
        }
    }

    /// Swap in a newly generated stage, keeping score and lives
    pub fn load_stage(&mut self, stage: u32, layout: StageLayout, water_speed: f32, now: f64) {
        self.stage = stage;
        self.platforms = layout.platforms;
        self.hazards = layout.hazards;
        self.goal = layout.goal;
        self.stars = layout.stars;
        self.water = Water::new(water_speed);
        self.stage_start = now;
        self.elapsed_time = 0.0;
        self.is_all_clear = false;
        self.reset_character();
    }

    /// Stand the character back on the ground with the camera framing it
    pub fn reset_character(&mut self) {
        let ground = self.platforms.first().cloned().unwrap_or_else(Platform::ground);
        self.character = Character::spawn_on(&ground, 0);
        self.camera = Camera::centered_on(&ground);
    }

    /// Make every hazard collectible again
    pub fn reset_hazards(&mut self) {
        for hazard in &mut self.hazards {
            hazard.is_collected = false;
        }
    }

    /// Platform the character currently stands on
    pub fn ground_platform(&self) -> Option<&Platform> {
        self.character.ground.and_then(|i| self.platforms.get(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_stands_on_platform() {
        let ground = Platform::ground();
        let character = Character::spawn_on(&ground, 0);
        assert_eq!(character.bottom(), ground.y);
        assert!(character.is_grounded);
        assert!(ground.overlaps(&character));
        assert_eq!(character.pose(), CharacterPose::Charge0);
    }

    #[test]
    fn test_kind_behavior_table() {
        assert_eq!(PlatformKind::Normal.landing_rule(), LandingRule::Stop);
        assert_eq!(PlatformKind::Ice.landing_rule(), LandingRule::Slide);
        assert_eq!(
            PlatformKind::Conveyor { direction: -1 }.carry(),
            -CONVEYOR_SPEED
        );
        assert_eq!(PlatformKind::Ice.carry(), 0.0);
        assert!(!PlatformKind::Ice.allows_aim());
    }

    #[test]
    fn test_belt_animation_wraps() {
        let mut platform = Platform {
            kind: PlatformKind::Conveyor { direction: 1 },
            ..Platform::ground()
        };
        for _ in 0..100 {
            platform.animate();
            assert!(platform.belt_offset < CONVEYOR_SEGMENT_WIDTH * 2.0);
        }
        let mut plain = Platform::ground();
        plain.animate();
        assert_eq!(plain.belt_offset, 0.0);
    }

    #[test]
    fn test_water_rises_only_when_armed() {
        let mut water = Water::new(1.0);
        let start = water.y;
        water.update();
        assert_eq!(water.y, start);
        water.is_rising = true;
        water.update();
        assert_eq!(water.y, start - 1.0);
    }

    #[test]
    fn test_camera_follow_approaches_target() {
        let ground = Platform::ground();
        let mut camera = Camera::centered_on(&ground);
        assert_eq!(camera.y, GROUND_Y - CANVAS_HEIGHT + CAMERA_SPAWN_OFFSET);
        assert_eq!(camera.target_y, camera.y);

        let mut character = Character::spawn_on(&ground, 0);
        character.pos.y = -2000.0;
        let target = character.pos.y - CAMERA_LEAD;
        let start = camera.y;
        camera.follow(&character);
        assert_eq!(camera.target_y, target);
        assert!((camera.y - (start + (target - start) * 0.1)).abs() < 1e-3);

        // Each step closes a tenth of the remaining distance
        let mut gap = (target - camera.y).abs();
        for _ in 0..200 {
            camera.follow(&character);
            let next = (target - camera.y).abs();
            assert!(next <= gap);
            gap = next;
        }
        assert!(gap < 1e-2);
    }

    #[test]
    fn test_reset_character_reframes_camera() {
        let config = crate::tuning::Tuning::default().stage(3).cloned().unwrap();
        let layout = crate::sim::stage::build_stage(3, &config);
        let mut state = SessionState::new(layout, config.water_speed, 0, 3);
        state.character.pos = Vec2::new(40.0, -900.0);
        state.character.state = CharacterState::Jumping;
        for _ in 0..30 {
            state.camera.follow(&state.character);
        }
        assert_ne!(state.camera, Camera::centered_on(&state.platforms[0]));

        state.reset_character();
        assert_eq!(state.camera, Camera::centered_on(&state.platforms[0]));
        assert_eq!(state.character, Character::spawn_on(&state.platforms[0], 0));
    }

    #[test]
    fn test_pose_thresholds() {
        let mut character = Character::spawn_on(&Platform::ground(), 0);
        character.charge_ratio = 0.5;
        assert_eq!(character.pose(), CharacterPose::Charge33);
        character.charge_ratio = 1.0;
        assert_eq!(character.pose(), CharacterPose::Charge100);
        character.state = CharacterState::Dead;
        assert_eq!(character.pose(), CharacterPose::Dead);
    }
}
