//! Collision detection and response
//!
//! The tricky part: landing must be swept between the previous and current
//! bottom edge, since a body falling at terminal velocity moves further per
//! tick than a platform is thick. Everything here is a guarded no-op for a
//! dead character.

use super::state::{
    Character, CharacterState, Goal, Hazard, LandingRule, Platform, PlatformKind, Water,
};
use crate::consts::*;
use crate::within_reach;

/// Land on the first platform whose top the bottom edge crossed this tick.
///
/// Only evaluated while falling. Returns the index of the platform landed on.
pub fn resolve_platforms(character: &mut Character, platforms: &[Platform]) -> Option<usize> {
    if character.is_dead() || character.vel.y <= 0.0 {
        return None;
    }

    let bottom = character.bottom();
    let prev_bottom = bottom - character.vel.y;

    let index = platforms
        .iter()
        .position(|p| p.supports(character) && prev_bottom <= p.y && bottom >= p.y)?;
    land(character, index, &platforms[index]);
    Some(index)
}

/// Snap onto a platform top and apply its landing rule
fn land(character: &mut Character, index: usize, platform: &Platform) {
    character.pos.y = platform.y - CHARACTER_HEIGHT;
    character.vel.y = 0.0;
    character.vel.x = match platform.kind.landing_rule() {
        LandingRule::Stop => 0.0,
        LandingRule::Slide => character.vel.x.clamp(-MAX_SLIDE_SPEED, MAX_SLIDE_SPEED),
    };
    character.is_grounded = true;
    character.ground = Some(index);
    character.air_charge_locked_vel_x = None;
    // A charge held through the landing carries on and can be released as a jump
    character.state = if character.is_charging() {
        CharacterState::Charging
    } else {
        CharacterState::Idle
    };
}

/// Detach when the footprint no longer rests on the platform stood on
/// (e.g. slid off an ice edge). Returns true on detach.
pub fn detect_detachment(character: &mut Character, platforms: &[Platform]) -> bool {
    if character.is_dead() || !character.is_grounded {
        return false;
    }
    let supported = character
        .ground
        .and_then(|i| platforms.get(i))
        .is_some_and(|p| p.supports(character));
    if !supported {
        character.detach();
    }
    !supported
}

/// Per-tick surface behaviour of the platform stood on
pub fn apply_surface_behavior(character: &mut Character, platforms: &[Platform]) {
    if character.is_dead() || !character.is_grounded {
        return;
    }
    let Some(platform) = character.ground.and_then(|i| platforms.get(i)) else {
        return;
    };
    match platform.kind {
        PlatformKind::Normal => {}
        // Zero friction: slide speed is constant until leaving or jumping
        PlatformKind::Ice => {}
        PlatformKind::Conveyor { .. } => apply_conveyor_behavior(character, platform),
    }
}

/// Carry a grounded character along a belt, detaching past its end
pub fn apply_conveyor_behavior(character: &mut Character, platform: &Platform) {
    if character.is_dead() || !character.is_grounded {
        return;
    }
    character.pos.x += platform.kind.carry();
    if !platform.supports(character) {
        character.detach();
    }
}

/// Hard cap on horizontal speed
#[inline]
pub fn clamp_horizontal_velocity(character: &mut Character) {
    character.vel.x = character.vel.x.clamp(-MAX_HORIZONTAL_SPEED, MAX_HORIZONTAL_SPEED);
}

/// Cylindrical play field: fully leaving one side re-enters from the other
#[inline]
pub fn wrap_horizontally(character: &mut Character) {
    if character.pos.x > CANVAS_WIDTH {
        character.pos.x = -CHARACTER_WIDTH;
    } else if character.pos.x < -CHARACTER_WIDTH {
        character.pos.x = CANVAS_WIDTH;
    }
}

/// Collect the first uncollected eel in reach, granting a super jump.
///
/// Returns true if one was collected.
pub fn resolve_hazard(character: &mut Character, hazards: &mut [Hazard]) -> bool {
    if character.is_dead() {
        return false;
    }
    let center = character.center();
    let Some(hazard) = hazards.iter_mut().find(|h| {
        !h.is_collected && within_reach(center, CHARACTER_WIDTH / 2.0, h.center(), h.size / 2.0)
    }) else {
        return false;
    };

    hazard.is_collected = true;
    character.vel.y = -EEL_IMPULSE;
    character.state = CharacterState::Jumping;
    character.is_grounded = false;
    character.ground = None;
    character.clear_charge();
    true
}

/// Whether the character touches the goal
pub fn resolve_goal(character: &Character, goal: &Goal) -> bool {
    !character.is_dead()
        && within_reach(
            character.center(),
            CHARACTER_WIDTH / 2.0,
            goal.center(),
            goal.size / 2.0,
        )
}

/// Whether the character's bottom edge is below the water surface
pub fn resolve_water(character: &Character, water: &Water) -> bool {
    !character.is_dead() && character.bottom() > water.y
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    fn platform(x: f32, y: f32, width: f32, kind: PlatformKind) -> Platform {
        Platform {
            x,
            y,
            width,
            kind,
            block_count: (width / BLOCK_SIZE) as u32,
            belt_offset: 0.0,
        }
    }

    /// Character falling with its bottom edge at `bottom` after this tick's move
    fn falling(x: f32, bottom: f32, vel: Vec2) -> Character {
        let mut character = Character::spawn_on(&Platform::ground(), 0);
        character.pos = Vec2::new(x, bottom - CHARACTER_HEIGHT);
        character.vel = vel;
        character.is_grounded = false;
        character.ground = None;
        character.state = CharacterState::Jumping;
        character
    }

    #[test]
    fn test_lands_on_crossed_platform() {
        let platforms = vec![Platform::ground(), platform(100.0, 400.0, 140.0, PlatformKind::Normal)];
        let mut character = falling(120.0, 403.0, Vec2::new(1.5, 5.0));
        assert_eq!(resolve_platforms(&mut character, &platforms), Some(1));
        assert_eq!(character.bottom(), 400.0);
        assert_eq!(character.vel, Vec2::ZERO);
        assert!(character.is_grounded);
        assert_eq!(character.state, CharacterState::Idle);
    }

    #[test]
    fn test_fast_fall_does_not_tunnel() {
        // Moves 10.5px in one tick through a 14px platform; the top is crossed
        let platforms = vec![platform(100.0, 400.0, 140.0, PlatformKind::Normal)];
        let mut character = falling(120.0, 409.0, Vec2::new(0.0, MAX_FALL_SPEED));
        assert_eq!(resolve_platforms(&mut character, &platforms), Some(0));
        assert_eq!(character.bottom(), 400.0);
    }

    #[test]
    fn test_no_landing_while_rising_or_from_below() {
        let platforms = vec![platform(100.0, 400.0, 140.0, PlatformKind::Normal)];
        let mut rising = falling(120.0, 403.0, Vec2::new(0.0, -5.0));
        assert_eq!(resolve_platforms(&mut rising, &platforms), None);

        // Bottom was already below the top last tick
        let mut below = falling(120.0, 420.0, Vec2::new(0.0, 5.0));
        assert_eq!(resolve_platforms(&mut below, &platforms), None);
    }

    #[test]
    fn test_edge_graze_misses() {
        let platforms = vec![platform(100.0, 400.0, 140.0, PlatformKind::Normal)];
        // Right edge overlaps by 1px, inside the margin
        let mut character = falling(100.0 - CHARACTER_WIDTH + 1.0, 403.0, Vec2::new(0.0, 5.0));
        assert_eq!(resolve_platforms(&mut character, &platforms), None);
    }

    #[test]
    fn test_ice_landing_keeps_clamped_slide() {
        let platforms = vec![platform(0.0, 400.0, 390.0, PlatformKind::Ice)];
        let mut slow = falling(120.0, 403.0, Vec2::new(2.5, 5.0));
        resolve_platforms(&mut slow, &platforms);
        assert_eq!(slow.vel, Vec2::new(2.5, 0.0));

        let mut fast = falling(120.0, 403.0, Vec2::new(-9.0, 5.0));
        resolve_platforms(&mut fast, &platforms);
        assert_eq!(fast.vel, Vec2::new(-MAX_SLIDE_SPEED, 0.0));
    }

    #[test]
    fn test_landing_while_charging_keeps_charge() {
        let platforms = vec![platform(100.0, 400.0, 140.0, PlatformKind::Normal)];
        let mut character = falling(120.0, 403.0, Vec2::new(1.0, 5.0));
        character.charge_start = Some(0.5);
        character.air_charge_locked_vel_x = Some(1.0);
        character.state = CharacterState::Charging;
        resolve_platforms(&mut character, &platforms);
        assert_eq!(character.state, CharacterState::Charging);
        assert!(character.is_charging());
        assert_eq!(character.air_charge_locked_vel_x, None);
    }

    #[test]
    fn test_slide_off_ice_detaches() {
        let platforms = vec![platform(100.0, 400.0, 56.0, PlatformKind::Ice)];
        let mut character = falling(120.0, 403.0, Vec2::new(3.0, 5.0));
        resolve_platforms(&mut character, &platforms);
        assert!(!detect_detachment(&mut character, &platforms));
        character.pos.x = 160.0;
        assert!(detect_detachment(&mut character, &platforms));
        assert!(!character.is_grounded);
        assert_eq!(character.state, CharacterState::Jumping);
        assert_eq!(character.ground, None);
    }

    #[test]
    fn test_conveyor_carries_then_drops() {
        let belt = platform(100.0, 400.0, 56.0, PlatformKind::Conveyor { direction: 1 });
        let platforms = vec![belt.clone()];
        let mut character = falling(110.0, 403.0, Vec2::new(0.0, 5.0));
        resolve_platforms(&mut character, &platforms);
        let start = character.pos.x;
        apply_surface_behavior(&mut character, &platforms);
        assert_eq!(character.pos.x, start + CONVEYOR_SPEED);
        assert!(character.is_grounded);

        for _ in 0..100 {
            apply_conveyor_behavior(&mut character, &belt);
        }
        assert!(!character.is_grounded);
        assert!(character.left() + LANDING_MARGIN >= belt.right());
    }

    #[test]
    fn test_clamp_and_wrap() {
        let mut character = falling(0.0, 400.0, Vec2::new(50.0, 1.0));
        clamp_horizontal_velocity(&mut character);
        assert_eq!(character.vel.x, MAX_HORIZONTAL_SPEED);

        character.pos.x = CANVAS_WIDTH + 0.5;
        wrap_horizontally(&mut character);
        assert_eq!(character.pos.x, -CHARACTER_WIDTH);
        assert_eq!(character.vel.x, MAX_HORIZONTAL_SPEED);

        character.pos.x = -CHARACTER_WIDTH - 0.5;
        wrap_horizontally(&mut character);
        assert_eq!(character.pos.x, CANVAS_WIDTH);

        // Partially off screen stays put
        character.pos.x = -10.0;
        wrap_horizontally(&mut character);
        assert_eq!(character.pos.x, -10.0);
    }

    #[test]
    fn test_hazard_grants_impulse_once() {
        let mut character = falling(100.0, 400.0, Vec2::new(1.0, 3.0));
        character.charge_start = Some(0.0);
        let center = character.center();
        let mut hazards = vec![Hazard {
            pos: center - Vec2::splat(EEL_SIZE / 2.0),
            size: EEL_SIZE,
            rotation: 0.0,
            is_collected: false,
        }];

        assert!(resolve_hazard(&mut character, &mut hazards));
        assert_eq!(character.vel, Vec2::new(1.0, -EEL_IMPULSE));
        assert_eq!(character.state, CharacterState::Jumping);
        assert!(!character.is_charging());
        assert!(hazards[0].is_collected);

        // Collected eels are inert
        character.vel = Vec2::new(1.0, 3.0);
        character.state = CharacterState::Jumping;
        assert!(!resolve_hazard(&mut character, &mut hazards));
        assert_eq!(character.vel, Vec2::new(1.0, 3.0));
    }

    #[test]
    fn test_goal_and_water_checks() {
        let mut character = falling(100.0, 400.0, Vec2::ZERO);
        let goal = Goal {
            pos: character.center() - Vec2::splat(GOAL_SIZE / 2.0) + Vec2::new(30.0, 0.0),
            size: GOAL_SIZE,
        };
        assert!(resolve_goal(&character, &goal));
        let far = Goal {
            pos: goal.pos - Vec2::new(0.0, 300.0),
            size: GOAL_SIZE,
        };
        assert!(!resolve_goal(&character, &far));

        let mut water = Water::new(1.0);
        water.y = 401.0;
        assert!(!resolve_water(&character, &water));
        water.y = 399.0;
        assert!(resolve_water(&character, &water));

        character.state = CharacterState::Dead;
        assert!(!resolve_water(&character, &water));
        assert!(!resolve_goal(&character, &goal));
    }
}
