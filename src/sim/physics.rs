//! Gravity and position integration for the character body

use super::state::Character;
use crate::consts::*;

/// Accelerate downward, clamped to terminal velocity. A dead body stays put.
pub fn apply_gravity(character: &mut Character) {
    if character.is_dead() {
        return;
    }
    character.vel.y = (character.vel.y + GRAVITY).min(MAX_FALL_SPEED);
}

/// Move by one tick of velocity
#[inline]
pub fn advance(character: &mut Character) {
    character.pos += character.vel;
}
