//! Character state machine: charging, jump release and air control
//!
//! `Idle ⇄ Charging → Jumping → Idle` on landing, or `→ Dead` on water contact.
//! Landing and detaching are driven from [`super::collision`]; this module owns
//! everything driven by input.

use glam::Vec2;

use super::state::{Character, CharacterState, PlatformKind};
use super::tick::TickInput;
use crate::consts::*;

/// Launch velocity and facing for a grounded release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpVector {
    pub vel: Vec2,
    pub facing_right: bool,
}

/// Jump velocity from charge ratio, latched direction and inherited slide.
///
/// The base angle is straight up, tilted by [`JUMP_TILT`] toward the latched
/// direction. Power interpolates linearly between the min and max jump speed.
pub fn compute_jump(
    charge_ratio: f32,
    direction: i8,
    slide_vel_x: f32,
    facing_right: bool,
) -> JumpVector {
    let ratio = charge_ratio.clamp(0.0, 1.0);
    let power = MIN_JUMP_SPEED + (MAX_JUMP_SPEED - MIN_JUMP_SPEED) * ratio;

    let (lateral, vertical) = match direction.signum() {
        0 => (0.0, power),
        sign => {
            let angle = std::f32::consts::FRAC_PI_2 - f32::from(sign) * JUMP_TILT;
            (power * angle.cos(), power * angle.sin())
        }
    };
    let vx = lateral * HORIZONTAL_FACTOR + slide_vel_x;

    let facing_right = if vx > 0.0 {
        true
    } else if vx < 0.0 {
        false
    } else {
        match direction.signum() {
            1 => true,
            -1 => false,
            _ => facing_right,
        }
    };

    JumpVector {
        vel: Vec2::new(vx, -vertical),
        facing_right,
    }
}

/// Accumulate a held charge.
///
/// `surface` is the kind of platform stood on, `now` the simulation clock.
pub fn update_charge(
    character: &mut Character,
    input: &TickInput,
    surface: Option<PlatformKind>,
    now: f64,
    dt: f32,
) {
    if !input.charge_held || character.is_dead() {
        return;
    }

    let start = match character.charge_start {
        Some(start) => start,
        None => {
            character.charge_start = Some(now);
            character.state = CharacterState::Charging;
            if !character.is_grounded {
                character.air_charge_locked_vel_x = Some(character.vel.x);
            }
            now
        }
    };
    character.charge_ratio = ((now - start) as f32 / MAX_CHARGE_TIME).clamp(0.0, 1.0);

    if character.is_grounded {
        // No steering a charge while already sliding on ice
        let can_aim = surface.is_none_or(PlatformKind::allows_aim);
        if can_aim && (input.direction_x != 0 || input.direction_y != 0) {
            character.latched_direction = input.direction_x.signum();
        }
    } else if input.direction_x != 0 {
        character.vel.x +=
            f32::from(input.direction_x.signum()) * AIR_CONTROL_CHARGING * HORIZONTAL_FACTOR * dt * 60.0;
    }
}

/// Handle a charge release. Returns true if a jump was launched.
///
/// Releasing in the air only cancels the charge and keeps current drift.
pub fn release_charge(
    character: &mut Character,
    released: bool,
    surface: Option<PlatformKind>,
) -> bool {
    if !released || !character.is_charging() || character.is_dead() {
        return false;
    }

    if !character.is_grounded {
        character.state = CharacterState::Jumping;
        character.clear_charge();
        return false;
    }

    let slide = match surface {
        Some(PlatformKind::Ice) => character.vel.x,
        _ => 0.0,
    };
    let jump = compute_jump(
        character.charge_ratio,
        character.latched_direction,
        slide,
        character.facing_right,
    );
    log::trace!(
        "Jump: ratio={:.2} dir={} vel=({:.2}, {:.2})",
        character.charge_ratio,
        character.latched_direction,
        jump.vel.x,
        jump.vel.y
    );

    character.vel = jump.vel;
    character.facing_right = jump.facing_right;
    character.state = CharacterState::Jumping;
    character.is_grounded = false;
    character.ground = None;
    character.clear_charge();
    true
}

/// Lateral nudge while airborne and not under an in-air charge lock
pub fn apply_air_control(character: &mut Character, direction_x: i8, dt: f32) {
    if character.is_grounded
        || character.is_dead()
        || character.air_charge_locked_vel_x.is_some()
        || direction_x == 0
    {
        return;
    }
    character.vel.x += f32::from(direction_x.signum()) * AIR_CONTROL * HORIZONTAL_FACTOR * dt * 60.0;
}

/// Mark the character dead and freeze it
pub fn kill(character: &mut Character) {
    character.state = CharacterState::Dead;
    character.vel = Vec2::ZERO;
    character.clear_charge();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::Platform;

    fn grounded() -> Character {
        Character::spawn_on(&Platform::ground(), 0)
    }

    fn airborne(vel_x: f32) -> Character {
        let mut character = grounded();
        character.is_grounded = false;
        character.ground = None;
        character.state = CharacterState::Jumping;
        character.vel = Vec2::new(vel_x, -2.0);
        character
    }

    fn held(direction_x: i8) -> TickInput {
        TickInput {
            charge_held: true,
            direction_x,
            ..Default::default()
        }
    }

    #[test]
    fn test_straight_jump_has_no_drift() {
        let jump = compute_jump(1.0, 0, 0.0, false);
        assert_eq!(jump.vel, Vec2::new(0.0, -MAX_JUMP_SPEED));
        assert!(!jump.facing_right);

        let weak = compute_jump(0.0, 0, 0.0, true);
        assert_eq!(weak.vel.y, -MIN_JUMP_SPEED);
    }

    #[test]
    fn test_tilted_jump() {
        let right = compute_jump(1.0, 1, 0.0, false);
        assert!(right.vel.x > 0.0);
        assert!(right.facing_right);
        let left = compute_jump(1.0, -1, 0.0, true);
        assert!((left.vel.x + right.vel.x).abs() < 1e-5);
        assert!(!left.facing_right);
        let expected = MAX_JUMP_SPEED * (std::f32::consts::FRAC_PI_2 - JUMP_TILT).cos() * HORIZONTAL_FACTOR;
        assert!((right.vel.x - expected).abs() < 1e-5);
    }

    #[test]
    fn test_jump_inherits_slide() {
        let jump = compute_jump(0.5, 0, -3.0, true);
        assert_eq!(jump.vel.x, -3.0);
        assert!(!jump.facing_right);
    }

    #[test]
    fn test_charge_accumulates_and_clamps() {
        let mut character = grounded();
        update_charge(&mut character, &held(0), Some(PlatformKind::Normal), 2.0, SIM_DT);
        assert_eq!(character.state, CharacterState::Charging);
        assert_eq!(character.charge_start, Some(2.0));
        assert_eq!(character.charge_ratio, 0.0);
        assert_eq!(character.air_charge_locked_vel_x, None);

        update_charge(&mut character, &held(0), Some(PlatformKind::Normal), 2.5, SIM_DT);
        assert!((character.charge_ratio - 0.5).abs() < 1e-6);
        update_charge(&mut character, &held(0), Some(PlatformKind::Normal), 9.0, SIM_DT);
        assert_eq!(character.charge_ratio, 1.0);
    }

    #[test]
    fn test_direction_latched_except_on_ice() {
        let mut character = grounded();
        update_charge(&mut character, &held(-1), Some(PlatformKind::Normal), 0.0, SIM_DT);
        assert_eq!(character.latched_direction, -1);
        // Releasing the arrow keeps the latch
        update_charge(&mut character, &held(0), Some(PlatformKind::Normal), 0.1, SIM_DT);
        assert_eq!(character.latched_direction, -1);

        let mut on_ice = grounded();
        update_charge(&mut on_ice, &held(1), Some(PlatformKind::Ice), 0.0, SIM_DT);
        assert_eq!(on_ice.latched_direction, 0);
    }

    #[test]
    fn test_air_charge_locks_momentum() {
        let mut character = airborne(2.0);
        update_charge(&mut character, &held(0), None, 1.0, SIM_DT);
        assert_eq!(character.air_charge_locked_vel_x, Some(2.0));
        assert_eq!(character.vel.x, 2.0);

        // Regular air control is suppressed under the lock
        apply_air_control(&mut character, 1, SIM_DT);
        assert_eq!(character.vel.x, 2.0);

        // Only the smaller charging nudge applies
        update_charge(&mut character, &held(1), None, 1.1, SIM_DT);
        let nudge = AIR_CONTROL_CHARGING * HORIZONTAL_FACTOR;
        assert!((character.vel.x - (2.0 + nudge)).abs() < 1e-5);
    }

    #[test]
    fn test_air_release_cancels_without_jump() {
        let mut character = airborne(2.0);
        update_charge(&mut character, &held(0), None, 1.0, SIM_DT);
        update_charge(&mut character, &held(0), None, 1.8, SIM_DT);
        let before = character.vel;
        assert!(!release_charge(&mut character, true, None));
        assert_eq!(character.vel, before);
        assert_eq!(character.state, CharacterState::Jumping);
        assert!(!character.is_charging());
        assert_eq!(character.charge_ratio, 0.0);
        assert_eq!(character.air_charge_locked_vel_x, None);
    }

    #[test]
    fn test_grounded_release_jumps() {
        let mut character = grounded();
        update_charge(&mut character, &held(1), Some(PlatformKind::Normal), 0.0, SIM_DT);
        update_charge(&mut character, &held(1), Some(PlatformKind::Normal), 1.0, SIM_DT);
        assert!(release_charge(&mut character, true, Some(PlatformKind::Normal)));
        assert_eq!(character.vel, compute_jump(1.0, 1, 0.0, true).vel);
        assert_eq!(character.state, CharacterState::Jumping);
        assert!(!character.is_grounded);
        assert_eq!(character.ground, None);
        assert_eq!(character.latched_direction, 0);
    }

    #[test]
    fn test_release_without_charge_is_ignored() {
        let mut character = grounded();
        assert!(!release_charge(&mut character, true, Some(PlatformKind::Normal)));
        assert_eq!(character.state, CharacterState::Idle);
    }

    #[test]
    fn test_dead_ignores_input() {
        let mut character = airborne(1.0);
        kill(&mut character);
        update_charge(&mut character, &held(1), None, 0.0, SIM_DT);
        apply_air_control(&mut character, 1, SIM_DT);
        assert_eq!(character.state, CharacterState::Dead);
        assert_eq!(character.vel, Vec2::ZERO);
        assert!(!character.is_charging());
    }

    #[test]
    fn test_air_control_nudges() {
        let mut character = airborne(0.0);
        apply_air_control(&mut character, -1, SIM_DT);
        assert!((character.vel.x + AIR_CONTROL * HORIZONTAL_FACTOR).abs() < 1e-5);
    }
}
