//! Cannon Quiz - an arithmetic arcade game
//!
//! Core modules:
//! - `sim`: Deterministic game state (problems, answers, levels, lose check)
//! - `settings`: Data-driven tuning of every gameplay constant
//! - `hud`: Presentation port the core writes its display state through
//! - `error`: Error types for input adapters and configuration

pub mod error;
pub mod hud;
pub mod settings;
pub mod sim;

pub use error::QuizError;
pub use hud::{Hud, HudElement, sync_hud};
pub use settings::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Maximum ticks per rendered frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default viewport the layout is designed against
    pub const VIEWPORT_WIDTH: f32 = 800.0;
    pub const VIEWPORT_HEIGHT: f32 = 600.0;

    /// Cannon position as a fraction of the viewport
    pub const CANNON_X_FRACTION: f32 = 0.1;
    pub const CANNON_Y_FRACTION: f32 = 0.9;

    /// First enemy column as a fraction of viewport width
    pub const ENEMY_COLUMN_START: f32 = 0.25;
    /// Enemy columns are spaced width / ENEMY_COLUMN_DIVISOR apart
    pub const ENEMY_COLUMN_DIVISOR: f32 = 8.0;

    /// Number of answer buttons shown to the player
    pub const ANSWER_SLOTS: usize = 3;
}

/// Cannon position for a viewport of the given size
#[inline]
pub fn cannon_position(viewport: Vec2) -> Vec2 {
    Vec2::new(
        viewport.x * consts::CANNON_X_FRACTION,
        viewport.y * consts::CANNON_Y_FRACTION,
    )
}

/// Horizontal position of the enemy in column `index`
#[inline]
pub fn enemy_column_x(viewport_width: f32, index: usize) -> f32 {
    viewport_width * consts::ENEMY_COLUMN_START
        + index as f32 * (viewport_width / consts::ENEMY_COLUMN_DIVISOR)
}
