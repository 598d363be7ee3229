//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per frame, no wall-clock reads
//! - Seeded RNG only
//! - Stable roster order (spawn order)
//! - No rendering or platform dependencies

pub mod problem;
pub mod state;
pub mod tick;

pub use problem::{Operator, Problem, distractor_spread, generate_distractors, generate_problem};
pub use state::{
    DestroyTransition, Enemy, GameEvent, GamePhase, GameState, Snapshot, SymbolSlot, THEMES, Theme,
    theme_index_for_level,
};
pub use tick::{
    AnswerOutcome, IgnoreReason, begin_destroy, complete_destroy, level_up, submit_answer,
    submit_payload, submit_slot, tick,
};
