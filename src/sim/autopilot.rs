//! Demo autopilot
//!
//! Synthesises [`TickInput`]s from the current state: confirms through menus,
//! charges toward the next platform up and steers while airborne. Used by the
//! headless runner and the title attract mode. Deterministic, so replays match.

use super::state::{Screen, SessionState};
use super::tick::TickInput;
use crate::consts::*;

/// Beyond this horizontal distance the autopilot hops sideways first
const HOP_DISTANCE: f32 = 90.0;
/// Extra height aimed for above a platform top
const CLEARANCE: f32 = 30.0;

#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    /// Charge ratio to release at, while a charge is held
    release_at: Option<f32>,
    direction: i8,
    /// Horizontal centre being aimed for
    target_x: Option<f32>,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input for the next tick
    pub fn next_input(&mut self, state: &SessionState) -> TickInput {
        match state.screen {
            Screen::Title | Screen::Cleared | Screen::GameOver | Screen::Paused => {
                *self = Self::default();
                TickInput {
                    confirm_just_released: true,
                    ..Default::default()
                }
            }
            Screen::Playing => self.play(state),
        }
    }

    fn play(&mut self, state: &SessionState) -> TickInput {
        let character = &state.character;
        if character.is_dead() {
            *self = Self::default();
            return TickInput::default();
        }

        if !character.is_grounded {
            if self.release_at.take().is_some() {
                return release();
            }
            return TickInput {
                direction_x: self.steer(state),
                ..Default::default()
            };
        }

        match self.release_at {
            Some(ratio) if character.charge_ratio >= ratio => {
                self.release_at = None;
                release()
            }
            Some(_) => TickInput {
                charge_held: true,
                direction_x: self.direction,
                ..Default::default()
            },
            None => {
                self.plan_jump(state);
                TickInput {
                    charge_held: true,
                    direction_x: self.direction,
                    ..Default::default()
                }
            }
        }
    }

    /// Pick the next platform up (or the goal) and the charge to reach it
    fn plan_jump(&mut self, state: &SessionState) {
        let character = &state.character;
        let feet = character.bottom();
        let target = state
            .platforms
            .iter()
            .filter(|p| p.y < feet - 1.0)
            .max_by(|a, b| a.y.total_cmp(&b.y))
            .map(|p| (p.center_x(), p.y))
            .unwrap_or((state.goal.center().x, state.goal.center().y));

        let dx = target.0 - character.center().x;
        self.target_x = Some(target.0);

        if dx.abs() > HOP_DISTANCE {
            self.direction = dx.signum() as i8;
            self.release_at = Some(0.0);
            return;
        }

        self.direction = if dx.abs() < BLOCK_SIZE { 0 } else { dx.signum() as i8 };
        let height = (feet - target.1 + CLEARANCE).max(0.0);
        let mut needed = (2.0 * GRAVITY * height).sqrt();
        if self.direction != 0 {
            needed /= (std::f32::consts::FRAC_PI_2 - JUMP_TILT).sin();
        }
        let ratio = (needed - MIN_JUMP_SPEED) / (MAX_JUMP_SPEED - MIN_JUMP_SPEED);
        self.release_at = Some(ratio.clamp(0.0, 1.0));
    }

    /// Proportional steering toward the target centre
    fn steer(&self, state: &SessionState) -> i8 {
        let Some(target_x) = self.target_x else {
            return 0;
        };
        let character = &state.character;
        let desired = ((target_x - character.center().x) / 20.0).clamp(-3.0, 3.0);
        let error = desired - character.vel.x;
        if error.abs() < 0.2 { 0 } else { error.signum() as i8 }
    }
}

fn release() -> TickInput {
    TickInput {
        charge_just_released: true,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::sim::tick::Session;
    use crate::tuning::Tuning;

    #[test]
    fn test_confirms_through_menus() {
        let session = Session::new(Tuning::default(), Box::new(MemoryStore::new())).unwrap();
        let mut pilot = Autopilot::new();
        assert!(pilot.next_input(session.state()).confirm_just_released);
    }

    #[test]
    fn test_charges_then_jumps() {
        let mut session = Session::new(Tuning::default(), Box::new(MemoryStore::new())).unwrap();
        let mut pilot = Autopilot::new();
        let spawn_y = session.state().character.pos.y;
        let mut left_ground = false;
        let mut highest = spawn_y;
        for _ in 0..240 {
            let mut input = pilot.next_input(session.state());
            session.step(&mut input);
            let character = &session.state().character;
            left_ground |= !character.is_grounded;
            highest = highest.min(character.pos.y);
        }
        assert!(left_ground);
        assert!(highest < spawn_y - 20.0);
    }
}
