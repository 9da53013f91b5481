//! Procedural stage generation
//!
//! A stage is a vertical shaft: the ground plane, a column of floating
//! platforms each reachable from the one below, a goal above the highest
//! platform, eels among the upper platforms and a decorative star field.
//! Everything is drawn from one [`StageRng`] in a fixed order, so a stage
//! number always yields the same layout.

use glam::Vec2;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use super::rng::StageRng;
use super::state::{Goal, Hazard, Platform, PlatformKind, Star, StarKind};
use crate::consts::*;
use crate::snap_to_grid;
use crate::tuning::StageConfig;

/// Stars per screen of stage height
const STARS_PER_SCREEN: f32 = 30.0;

/// Everything generated for one stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageLayout {
    /// Index 0 is always the ground
    pub platforms: Vec<Platform>,
    pub goal: Goal,
    pub hazards: Vec<Hazard>,
    pub stars: Vec<Star>,
}

impl StageLayout {
    /// Ground and goal only
    pub fn ground_only() -> Self {
        let platforms = vec![Platform::ground()];
        let goal = place_goal(&platforms);
        Self {
            platforms,
            goal,
            hazards: Vec::new(),
            stars: Vec::new(),
        }
    }
}

/// Generate the layout for `stage_number`, seeding from the stage number
pub fn build_stage(stage_number: u32, config: &StageConfig) -> StageLayout {
    let mut rng = StageRng::for_stage(stage_number);
    let layout = generate_stage(config, &mut rng);
    log::info!(
        "Stage {} generated: {} platforms, {} eels, {} stars, goal at y={}",
        stage_number,
        layout.platforms.len(),
        layout.hazards.len(),
        layout.stars.len(),
        layout.goal.pos.y
    );
    layout
}

/// Generate a stage from a freshly seeded generator
pub fn generate_stage(config: &StageConfig, rng: &mut StageRng) -> StageLayout {
    let platforms = generate_platforms(config, rng);
    let goal = place_goal(&platforms);
    let hazards = place_hazards(config, &platforms, rng);
    let stars = generate_stars(config.total_height, rng);
    StageLayout {
        platforms,
        goal,
        hazards,
        stars,
    }
}

fn generate_platforms(config: &StageConfig, rng: &mut StageRng) -> Vec<Platform> {
    let mut platforms = Vec::with_capacity(config.platform_count as usize + 1);
    platforms.push(Platform::ground());

    let mut y = GROUND_Y;
    let mut last_center = CANVAS_WIDTH / 2.0;

    for i in 0..config.platform_count {
        y -= if i == 0 {
            config.first_platform_gap
        } else {
            rng.range(config.gap_min, config.gap_max)
        };

        let block_count = rng.range_inclusive(config.block_count_min, config.block_count_max);
        let width = block_count as f32 * BLOCK_SIZE;

        // Keep the centre within reach of the previous platform's centre
        let half = width / 2.0;
        let min_x = EDGE_MARGIN.max(last_center - MAX_HORIZONTAL_REACH - half);
        let max_x = (CANVAS_WIDTH - width - EDGE_MARGIN)
            .min(last_center + MAX_HORIZONTAL_REACH - half)
            .max(min_x);
        let x = snap_to_grid(rng.range(min_x, max_x))
            .min(CANVAS_WIDTH - width)
            .max(0.0);

        let kind = pick_kind(config, rng);

        platforms.push(Platform {
            x,
            y,
            width,
            kind,
            block_count,
            belt_offset: 0.0,
        });
        last_center = x + half;
    }

    platforms
}

/// Sample a platform kind against the configured ratios
fn pick_kind(config: &StageConfig, rng: &mut StageRng) -> PlatformKind {
    let roll = rng.next_f64();
    kind_for_roll(config, roll, || rng.coin())
}

/// Map a `[0, 1)` roll onto the cumulative kind ratios.
///
/// Compared in f64: a roll just below 1.0 must not round up past the last cutoff.
fn kind_for_roll(config: &StageConfig, roll: f64, coin: impl FnOnce() -> bool) -> PlatformKind {
    let normal_cutoff = f64::from(config.normal_ratio);
    let ice_cutoff = normal_cutoff + f64::from(config.ice_ratio);
    let conveyor_cutoff = ice_cutoff + f64::from(config.conveyor_ratio);

    if roll < normal_cutoff {
        PlatformKind::Normal
    } else if roll < ice_cutoff {
        PlatformKind::Ice
    } else if roll < conveyor_cutoff {
        let direction = if coin() { 1 } else { -1 };
        PlatformKind::Conveyor { direction }
    } else {
        PlatformKind::Normal
    }
}

/// Centre the goal a fixed distance above the highest platform
fn place_goal(platforms: &[Platform]) -> Goal {
    let top = platforms
        .iter()
        .map(|p| p.y)
        .fold(GROUND_Y, f32::min);
    Goal {
        pos: Vec2::new(CANVAS_WIDTH / 2.0 - GOAL_SIZE / 2.0, top - GOAL_OFFSET),
        size: GOAL_SIZE,
    }
}

/// One eel above each of `hazard_count` platforms in the upper two thirds
fn place_hazards(config: &StageConfig, platforms: &[Platform], rng: &mut StageRng) -> Vec<Hazard> {
    let floating = platforms.len().saturating_sub(1);
    let first = 1 + floating / 3;
    let mut candidates: Vec<usize> = (first..platforms.len()).collect();
    let count = (config.hazard_count as usize).min(candidates.len());
    if count == 0 {
        return Vec::new();
    }

    let (chosen, _) = candidates.partial_shuffle(rng, count);
    let mut chosen = chosen.to_vec();
    chosen.sort_unstable();

    chosen
        .into_iter()
        .map(|index| {
            let platform = &platforms[index];
            Hazard {
                pos: Vec2::new(
                    platform.center_x() - EEL_SIZE / 2.0,
                    platform.y - EEL_HOVER - EEL_SIZE,
                ),
                size: EEL_SIZE,
                rotation: 0.0,
                is_collected: false,
            }
        })
        .collect()
}

/// Star count scales with the stage height in screens
fn generate_stars(screens: f32, rng: &mut StageRng) -> Vec<Star> {
    let stage_height = screens * CANVAS_HEIGHT;
    let count = (screens * STARS_PER_SCREEN).floor().max(0.0) as usize;
    (0..count)
        .map(|_| {
            let slot = (rng.next_f64() * StarKind::ALL.len() as f64) as usize;
            let kind = StarKind::ALL[slot.min(StarKind::ALL.len() - 1)];
            let x = rng.range(0.0, CANVAS_WIDTH);
            let y = -stage_height + rng.range(0.0, stage_height + CANVAS_HEIGHT);
            let size = match kind {
                StarKind::Crescent => 12.0,
                StarKind::Sparkle => 8.0,
                StarKind::Dot | StarKind::Cross => rng.range(2.0, 4.0),
            };
            Star {
                pos: Vec2::new(x, y),
                size,
                kind,
            }
        })
        .collect()
}
