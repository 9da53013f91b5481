//! Data-driven stage table and scoring
//!
//! The built-in table reproduces the ten shipped stages. A custom table can be
//! loaded from JSON; loading validates the authoring invariants so the simulation
//! core can assume well-formed data.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a stage table
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("tuning must contain at least one stage")]
    NoStages,

    #[error("stage {stage}: {field} min ({min}) exceeds max ({max})")]
    InvertedRange {
        stage: u32,
        field: &'static str,
        min: f32,
        max: f32,
    },

    #[error("stage {stage}: platform type ratios must lie in [0, 1] and sum to at most 1 (got {sum})")]
    BadRatios { stage: u32, sum: f32 },

    #[error("stage {stage}: {field} must be positive")]
    NotPositive { stage: u32, field: &'static str },

    #[error("lives must be at least 1")]
    NoLives,
}

/// Per-stage tunables
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    /// 1-based stage number (also the generation seed)
    pub id: u32,
    pub name: String,
    /// Stage height in screens (drives star density)
    pub total_height: f32,
    /// Floating platforms, not counting the ground
    pub platform_count: u32,
    /// Gap between the ground and the first floating platform
    pub first_platform_gap: f32,
    pub block_count_min: u32,
    pub block_count_max: u32,
    pub gap_min: f32,
    pub gap_max: f32,
    pub normal_ratio: f32,
    pub ice_ratio: f32,
    pub conveyor_ratio: f32,
    /// Eels placed among the upper platforms
    pub hazard_count: u32,
    /// Water rise per tick once rising
    pub water_speed: f32,
    /// Seconds from life start until the water begins to rise
    pub water_delay: f32,
    /// Clear time (seconds) below which a time bonus is awarded
    pub base_time: f32,
}

impl StageConfig {
    fn validate(&self) -> Result<(), TuningError> {
        if self.block_count_min > self.block_count_max {
            return Err(TuningError::InvertedRange {
                stage: self.id,
                field: "block_count",
                min: self.block_count_min as f32,
                max: self.block_count_max as f32,
            });
        }
        if self.gap_min > self.gap_max {
            return Err(TuningError::InvertedRange {
                stage: self.id,
                field: "gap",
                min: self.gap_min,
                max: self.gap_max,
            });
        }
        let ratios = [self.normal_ratio, self.ice_ratio, self.conveyor_ratio];
        let sum: f32 = ratios.iter().sum();
        if ratios.iter().any(|r| !(0.0..=1.0).contains(r)) || sum > 1.0 + 1e-4 {
            return Err(TuningError::BadRatios { stage: self.id, sum });
        }
        if self.block_count_min == 0 {
            return Err(TuningError::NotPositive {
                stage: self.id,
                field: "block_count_min",
            });
        }
        if self.water_speed <= 0.0 {
            return Err(TuningError::NotPositive {
                stage: self.id,
                field: "water_speed",
            });
        }
        Ok(())
    }
}

/// Stage score formula parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scoring {
    pub base_score: u32,
    pub time_bonus_multiplier: f32,
}

impl Default for Scoring {
    fn default() -> Self {
        Self {
            base_score: 1000,
            time_bonus_multiplier: 10.0,
        }
    }
}

impl Scoring {
    /// Score for clearing `stage_number` in `clear_time` seconds.
    ///
    /// `floor((base + max(0, base_time - clear_time) * mult) * (1 + (stage - 1) * 0.5))`
    pub fn stage_score(&self, stage_number: u32, clear_time: f32, base_time: f32) -> u64 {
        let time_bonus =
            (f64::from(base_time) - f64::from(clear_time)).max(0.0) * f64::from(self.time_bonus_multiplier);
        let stage_multiplier = 1.0 + f64::from(stage_number.saturating_sub(1)) * 0.5;
        ((f64::from(self.base_score) + time_bonus) * stage_multiplier).floor() as u64
    }
}

/// Complete tuning: stage table, lives and scoring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tuning {
    pub lives: u32,
    #[serde(default)]
    pub scoring: Scoring,
    pub stages: Vec<StageConfig>,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            lives: 3,
            scoring: Scoring::default(),
            stages: default_stages(),
        }
    }
}

impl Tuning {
    /// Parse and validate a JSON stage table
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        log::info!("Loaded tuning with {} stages", tuning.stages.len());
        Ok(tuning)
    }

    /// Load a JSON stage table from disk
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load(path: impl AsRef<std::path::Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Check the authoring invariants the simulation relies on
    pub fn validate(&self) -> Result<(), TuningError> {
        if self.stages.is_empty() {
            return Err(TuningError::NoStages);
        }
        if self.lives == 0 {
            return Err(TuningError::NoLives);
        }
        self.stages.iter().try_for_each(StageConfig::validate)
    }

    /// Config for a 1-based stage number, `None` past the last stage
    pub fn stage(&self, stage_number: u32) -> Option<&StageConfig> {
        let index = stage_number.checked_sub(1)?;
        self.stages.get(index as usize)
    }

    pub fn stage_count(&self) -> u32 {
        self.stages.len() as u32
    }

    pub fn is_final_stage(&self, stage_number: u32) -> bool {
        stage_number >= self.stage_count()
    }
}

#[allow(clippy::too_many_arguments)]
fn stage(
    id: u32,
    total_height: f32,
    platform_count: u32,
    first_platform_gap: f32,
    blocks: (u32, u32),
    gaps: (f32, f32),
    ratios: (f32, f32, f32),
    hazard_count: u32,
    water: (f32, f32),
    base_time: f32,
) -> StageConfig {
    StageConfig {
        id,
        name: format!("Stage {id}"),
        total_height,
        platform_count,
        first_platform_gap,
        block_count_min: blocks.0,
        block_count_max: blocks.1,
        gap_min: gaps.0,
        gap_max: gaps.1,
        normal_ratio: ratios.0,
        ice_ratio: ratios.1,
        conveyor_ratio: ratios.2,
        hazard_count,
        water_speed: water.0,
        water_delay: water.1,
        base_time,
    }
}

/// The shipped stage table
///
/// Stages 1-2 are plain, 3-5 introduce ice, 6-7 add eels, 8-10 add conveyors.
pub fn default_stages() -> Vec<StageConfig> {
    vec![
        stage(1, 5.3, 12, 180.0, (10, 14), (150.0, 200.0), (1.0, 0.0, 0.0), 0, (0.6, 8.0), 45.0),
        stage(2, 5.3, 12, 200.0, (4, 8), (220.0, 280.0), (1.0, 0.0, 0.0), 0, (0.8, 6.0), 50.0),
        stage(3, 5.3, 12, 180.0, (8, 12), (150.0, 200.0), (0.5, 0.5, 0.0), 0, (1.0, 8.0), 55.0),
        stage(4, 5.3, 12, 220.0, (4, 8), (220.0, 280.0), (0.3, 0.7, 0.0), 0, (1.1, 8.0), 60.0),
        stage(5, 5.3, 12, 250.0, (4, 7), (250.0, 300.0), (0.0, 1.0, 0.0), 0, (1.0, 8.0), 65.0),
        stage(6, 7.1, 16, 180.0, (8, 12), (150.0, 220.0), (0.8, 0.2, 0.0), 3, (1.0, 6.0), 70.0),
        stage(7, 8.0, 18, 200.0, (4, 8), (200.0, 260.0), (0.6, 0.4, 0.0), 5, (1.2, 6.0), 80.0),
        stage(8, 6.2, 14, 200.0, (6, 10), (180.0, 250.0), (0.4, 0.4, 0.2), 2, (1.3, 9.0), 65.0),
        stage(9, 7.1, 16, 220.0, (4, 8), (220.0, 280.0), (0.2, 0.4, 0.4), 2, (1.1, 4.0), 75.0),
        stage(10, 7.1, 16, 250.0, (4, 7), (250.0, 300.0), (0.0, 0.4, 0.6), 2, (0.6, 3.0), 80.0),
    ]
}
