//! Gameplay tuning
//!
//! Every balance constant lives here so a run can be reconfigured from JSON
//! without touching the simulation.

use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Gameplay tuning values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Enemies ===
    /// Enemy descent per tick at the start of each level (pixels)
    pub base_speed: f32,
    /// Speed added to every enemy on a wrong answer
    pub speed_increase: f32,
    /// Enemies spawned per level
    pub enemy_count: usize,
    /// Spawn height of a fresh roster
    pub enemy_start_y: f32,
    /// Distance above the cannon that ends the run
    pub lose_margin: f32,

    // === Scoring ===
    /// Points per destroyed enemy
    pub kill_score: u64,

    // === Difficulty ===
    /// Largest operand on level 1
    pub start_max_number: u32,
    /// Geometric growth of the largest operand per level
    pub difficulty_growth: f64,

    // === Transitions ===
    /// Length of the laser/destroy transition in ticks (30 = 500ms at 60 Hz)
    pub destroy_ticks: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            base_speed: 0.1,
            speed_increase: 0.05,
            enemy_count: 6,
            enemy_start_y: 100.0,
            lose_margin: 25.0,

            kill_score: 10,

            start_max_number: 5,
            difficulty_growth: 1.2,

            destroy_ticks: 30,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, QuizError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, QuizError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), QuizError> {
        let invalid = |msg: &str| Err(QuizError::InvalidTuning(msg.to_string()));

        if !self.base_speed.is_finite() || self.base_speed < 0.0 {
            return invalid("base_speed must be a finite, non-negative number");
        }
        if !self.speed_increase.is_finite() || self.speed_increase < 0.0 {
            return invalid("speed_increase must be a finite, non-negative number");
        }
        if self.enemy_count == 0 {
            return invalid("enemy_count must be at least 1");
        }
        if !self.enemy_start_y.is_finite() || !self.lose_margin.is_finite() {
            return invalid("enemy_start_y and lose_margin must be finite");
        }
        if self.start_max_number == 0 {
            return invalid("start_max_number must be at least 1");
        }
        if !self.difficulty_growth.is_finite() || self.difficulty_growth < 1.0 {
            return invalid("difficulty_growth must be at least 1.0");
        }
        if self.destroy_ticks == 0 {
            return invalid("destroy_ticks must be at least 1");
        }
        Ok(())
    }

    /// Largest operand for a level: floor(start * growth^(level - 1))
    pub fn max_number_for_level(&self, level: u32) -> u32 {
        let exponent = level.saturating_sub(1) as i32;
        let value = self.start_max_number as f64 * self.difficulty_growth.powi(exponent);
        (value.floor().min(u32::MAX as f64) as u32).max(1)
    }
}
