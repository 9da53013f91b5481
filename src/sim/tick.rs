//! Fixed timestep session loop
//!
//! [`Session`] owns the whole game: the screen flow, the per-tick pipeline
//! while playing, lives, scoring and the delayed transitions. It advances only
//! in whole [`SIM_DT`] steps on its own clock, so a run is reproducible from
//! its input sequence.

use super::character;
use super::collision;
use super::physics;
use super::stage::{StageLayout, build_stage};
use super::state::{Screen, SessionState, Water};
use super::timers::{Scheduler, TaskKind};
use crate::consts::*;
use crate::persistence::HighScoreStore;
use crate::tuning::{StageConfig, Tuning, TuningError};

/// Input snapshot for a single tick
///
/// `*_just_released` and `*_requested` flags are edges: the session clears them
/// once read, so each edge acts at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Jump button is down
    pub charge_held: bool,
    /// Jump button went up since the last tick
    pub charge_just_released: bool,
    /// -1, 0 or 1
    pub direction_x: i8,
    /// -1, 0 or 1
    pub direction_y: i8,
    /// Menu confirm went up since the last tick
    pub confirm_just_released: bool,
    pub pause_toggle_requested: bool,
    /// Restart from stage 1 (pause menu)
    pub restart_requested: bool,
}

impl TickInput {
    pub fn take_charge_release(&mut self) -> bool {
        std::mem::take(&mut self.charge_just_released)
    }

    pub fn take_confirm(&mut self) -> bool {
        std::mem::take(&mut self.confirm_just_released)
    }

    pub fn take_pause_toggle(&mut self) -> bool {
        std::mem::take(&mut self.pause_toggle_requested)
    }

    pub fn take_restart(&mut self) -> bool {
        std::mem::take(&mut self.restart_requested)
    }

    /// Drop any edge nobody acted on
    pub fn clear_edges(&mut self) {
        self.charge_just_released = false;
        self.confirm_just_released = false;
        self.pause_toggle_requested = false;
        self.restart_requested = false;
    }
}

/// One playthrough from title screen to game over
pub struct Session {
    state: SessionState,
    tuning: Tuning,
    store: Box<dyn HighScoreStore>,
    timers: Scheduler,
    /// Fixed steps simulated while playing; the clock is derived from it
    ticks: u64,
    accumulator: f32,
}

impl Session {
    /// Validate `tuning`, read the stored high score and show the title screen
    pub fn new(tuning: Tuning, store: Box<dyn HighScoreStore>) -> Result<Self, TuningError> {
        tuning.validate()?;
        let high_score = store.load_high_score();
        let state = title_state(&tuning, high_score);
        log::info!(
            "Session ready: {} stages, {} lives, high score {}",
            tuning.stage_count(),
            tuning.lives,
            high_score
        );
        Ok(Self {
            state,
            tuning,
            store,
            timers: Scheduler::new(),
            ticks: 0,
            accumulator: 0.0,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct access for hosts and tests that stage a situation
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn timers(&self) -> &Scheduler {
        &self.timers
    }

    /// Simulation clock in seconds, frozen outside of play
    pub fn clock(&self) -> f64 {
        self.ticks as f64 / f64::from(SIM_RATE)
    }

    /// Run as many fixed steps as `frame_dt` covers. Returns the step count.
    pub fn update(&mut self, input: &mut TickInput, frame_dt: f32) -> u32 {
        if !frame_dt.is_finite() {
            log::warn!("Ignoring non-finite frame time {}", frame_dt);
            return 0;
        }
        // Clamp long frames (tab switch, debugger)
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.step(input);
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        substeps
    }

    /// Advance exactly one fixed step
    pub fn step(&mut self, input: &mut TickInput) {
        match self.state.screen {
            Screen::Title => {
                if input.take_confirm() {
                    self.start_game();
                }
            }
            Screen::Playing => {
                if input.take_pause_toggle() {
                    self.state.screen = Screen::Paused;
                    log::info!("Paused at t={:.2}", self.clock());
                } else {
                    self.ticks += 1;
                    self.run_due_tasks();
                    if self.state.screen == Screen::Playing {
                        self.simulate(input);
                    }
                }
            }
            Screen::Paused => {
                if input.take_restart() {
                    log::info!("Restart requested");
                    self.start_game();
                } else if input.take_pause_toggle() || input.take_confirm() {
                    self.state.screen = Screen::Playing;
                    log::info!("Resumed");
                }
            }
            Screen::Cleared => {
                if input.take_confirm() {
                    self.next_stage();
                }
            }
            Screen::GameOver => {
                if input.take_confirm() {
                    self.return_to_title();
                }
            }
        }
        input.clear_edges();
    }

    /// The gameplay pipeline for one tick
    fn simulate(&mut self, input: &mut TickInput) {
        let now = self.clock();
        let state = &mut self.state;
        state.elapsed_time = (now - state.stage_start) as f32;

        let surface = state.ground_platform().map(|p| p.kind);
        let body = &mut state.character;
        // A button already up while a charge is running is a release whose
        // edge was missed (e.g. it came in while paused)
        let released =
            input.take_charge_release() || (!input.charge_held && body.is_charging());

        character::update_charge(body, input, surface, now, SIM_DT);
        character::release_charge(body, released, surface);
        character::apply_air_control(body, input.direction_x, SIM_DT);

        if !body.is_grounded {
            physics::apply_gravity(body);
        }
        physics::advance(body);

        collision::resolve_platforms(body, &state.platforms);
        collision::apply_surface_behavior(body, &state.platforms);
        collision::detect_detachment(body, &state.platforms);
        collision::clamp_horizontal_velocity(body);
        collision::wrap_horizontally(body);
        if collision::resolve_hazard(body, &mut state.hazards) {
            log::info!("Eel collected at y={:.0}", body.pos.y);
        }

        for hazard in &mut state.hazards {
            hazard.rotation += EEL_ROTATION_SPEED;
        }
        for platform in &mut state.platforms {
            platform.animate();
        }

        let reached_goal = collision::resolve_goal(&state.character, &state.goal);
        let drowned = !reached_goal && collision::resolve_water(&state.character, &state.water);

        state.water.update();
        state.camera.follow(&state.character);

        if reached_goal {
            self.clear_stage();
        } else if drowned {
            self.lose_life();
        }
    }

    fn run_due_tasks(&mut self) {
        for task in self.timers.poll(self.clock()) {
            match task {
                TaskKind::WaterRise => {
                    self.state.water.is_rising = true;
                    log::info!("Water rising on stage {}", self.state.stage);
                }
                TaskKind::Respawn => self.respawn(),
                TaskKind::GameOver => self.game_over(),
            }
        }
    }

    fn config(&self, stage: u32) -> Option<StageConfig> {
        self.tuning.stage(stage).cloned()
    }

    /// New game from stage 1
    fn start_game(&mut self) {
        self.state.score = 0;
        self.state.lives = self.tuning.lives;
        self.state.is_high_score_updated = false;
        self.start_stage(1);
    }

    fn start_stage(&mut self, stage: u32) {
        let Some(config) = self.config(stage) else {
            log::warn!("Stage {} is not configured, returning to title", stage);
            self.return_to_title();
            return;
        };
        let layout = build_stage(stage, &config);
        self.state.load_stage(stage, layout, config.water_speed, self.clock());
        self.state.screen = Screen::Playing;
        self.begin_life(&config);
        log::info!("Stage {} ({}) started with {} lives", stage, config.name, self.state.lives);
    }

    /// Fresh life: stale timers are dropped and the water delay is armed
    fn begin_life(&mut self, config: &StageConfig) {
        self.timers.begin_life();
        self.timers
            .schedule(TaskKind::WaterRise, self.clock() + f64::from(config.water_delay));
    }

    fn clear_stage(&mut self) {
        let stage = self.state.stage;
        let base_time = self.config(stage).map_or(0.0, |c| c.base_time);
        let gained = self
            .tuning
            .scoring
            .stage_score(stage, self.state.elapsed_time, base_time);

        self.timers.cancel_all();
        self.state.score += gained;
        self.record_high_score();
        self.state.is_all_clear = self.tuning.is_final_stage(stage);
        self.state.screen = Screen::Cleared;
        log::info!(
            "Stage {} cleared in {:.1}s: +{} (total {})",
            stage,
            self.state.elapsed_time,
            gained,
            self.state.score
        );
    }

    fn next_stage(&mut self) {
        if self.state.is_all_clear {
            log::info!("All stages cleared with {} points", self.state.score);
            self.return_to_title();
        } else {
            self.start_stage(self.state.stage + 1);
        }
    }

    fn lose_life(&mut self) {
        character::kill(&mut self.state.character);
        self.state.lives = self.state.lives.saturating_sub(1);
        self.timers.cancel(TaskKind::WaterRise);

        let due = self.clock() + DEATH_DELAY;
        let task = if self.state.lives == 0 {
            TaskKind::GameOver
        } else {
            TaskKind::Respawn
        };
        self.timers.schedule(task, due);
        log::info!("Drowned on stage {}, {} lives left", self.state.stage, self.state.lives);
    }

    fn respawn(&mut self) {
        let Some(config) = self.config(self.state.stage) else {
            self.return_to_title();
            return;
        };
        self.state.reset_character();
        self.state.reset_hazards();
        self.state.water = Water::new(config.water_speed);
        self.begin_life(&config);
        log::info!("Respawned on stage {}", self.state.stage);
    }

    fn game_over(&mut self) {
        self.timers.cancel_all();
        self.record_high_score();
        self.state.screen = Screen::GameOver;
        log::info!("Game over with {} points", self.state.score);
    }

    /// Save only when the score strictly beats the known best
    fn record_high_score(&mut self) {
        if self.state.score > self.state.high_score {
            self.state.high_score = self.state.score;
            self.state.is_high_score_updated = true;
            self.store.save_high_score(self.state.score);
            log::info!("New high score {}", self.state.score);
        }
    }

    fn return_to_title(&mut self) {
        self.timers.cancel_all();
        let high_score = self.store.load_high_score().max(self.state.high_score);
        self.state = title_state(&self.tuning, high_score);
    }
}

fn title_state(tuning: &Tuning, high_score: u64) -> SessionState {
    let (layout, water_speed) = match tuning.stage(1) {
        Some(config) => (build_stage(1, config), config.water_speed),
        None => (StageLayout::ground_only(), 0.0),
    };
    SessionState::new(layout, water_speed, high_score, tuning.lives)
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("screen", &self.state.screen)
            .field("stage", &self.state.stage)
            .field("clock", &self.clock())
            .field("timers", &self.timers)
            .finish_non_exhaustive()
    }
}
