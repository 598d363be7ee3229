//! Game state and core simulation types
//!
//! Everything the presentation layer reads back each frame lives here.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::problem::{Problem, generate_problem};
use crate::consts::{VIEWPORT_HEIGHT, VIEWPORT_WIDTH};
use crate::error::QuizError;
use crate::settings::Tuning;
use crate::{cannon_position, enemy_column_x};

/// Pending events kept when the presentation layer stops draining; oldest are dropped
pub const MAX_QUEUED_EVENTS: usize = 256;

/// Enemy glyph sets, one per level (cycled)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub symbols: [&'static str; 2],
}

pub const THEMES: [Theme; 6] = [
    Theme { name: "spooky", symbols: ["👻", "💀"] },
    Theme { name: "fantasy", symbols: ["🐉", "🦄"] },
    Theme { name: "tech", symbols: ["🤖", "🛸"] },
    Theme { name: "wild", symbols: ["🦁", "🐯"] },
    Theme { name: "magic", symbols: ["🧙‍♂️", "🧚"] },
    Theme { name: "ocean", symbols: ["🦈", "🐋"] },
];

/// Theme used on a level (1-based)
pub fn theme_index_for_level(level: u32) -> usize {
    (level.saturating_sub(1) as usize) % THEMES.len()
}

/// Which of the theme's two glyphs an enemy shows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolSlot {
    Primary,
    Secondary,
}

impl SymbolSlot {
    /// Alternate glyphs across the roster
    pub fn for_index(index: usize) -> Self {
        if index % 2 == 0 { SymbolSlot::Primary } else { SymbolSlot::Secondary }
    }
}

/// A descending enemy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    /// Spawn column, used to relayout on resize
    pub column: usize,
    pub pos: Vec2,
    /// Descent per tick (pixels)
    pub speed: f32,
    pub theme: usize,
    pub slot: SymbolSlot,
}

impl Enemy {
    pub fn glyph(&self) -> &'static str {
        let symbols = THEMES[self.theme % THEMES.len()].symbols;
        match self.slot {
            SymbolSlot::Primary => symbols[0],
            SymbolSlot::Secondary => symbols[1],
        }
    }
}

/// In-flight laser shot; the target dies when `remaining_ticks` reaches zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyTransition {
    pub target: u32,
    pub remaining_ticks: u32,
}

/// Coarse gameplay phase, derived from the state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the player to pick an answer
    AwaitingAnswer,
    /// A destroy transition is running; answers are ignored
    Destroying,
    /// Run ended
    GameOver,
}

/// Notifications for the presentation layer (drained once per frame)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A new question and answer set is showing
    ProblemGenerated,
    /// Laser fired at an enemy; it is destroyed after the transition
    EnemyTargeted { enemy_id: u32 },
    EnemyDestroyed { enemy_id: u32, score: u64 },
    /// Wrong answer; all enemies now move at `speed`
    WrongAnswer { speed: f32 },
    LevelUp { level: u32 },
    GameOver { score: u64, level: u32 },
}

/// Read-only summary for HUDs and logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub score: u64,
    pub level: u32,
    pub max_number: u32,
    pub current_speed: f32,
    pub enemies_left: usize,
    pub question: String,
    pub game_over: bool,
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub score: u64,
    /// Current level (1-based)
    pub level: u32,
    /// Largest operand for the current level
    pub max_number: u32,
    /// Speed every enemy moves at; raised by wrong answers, reset per level
    pub current_speed: f32,
    /// Live roster, in spawn order
    pub enemies: Vec<Enemy>,
    pub problem: Problem,
    pub destroy: Option<DestroyTransition>,
    pub game_over: bool,
    /// Simulation tick counter
    pub time_ticks: u64,
    /// Layout size (pixels)
    pub viewport: Vec2,
    pub(crate) rng: Pcg32,
    /// Must be drained by the presentation layer each frame (see `drain_events`)
    pub(crate) events: Vec<GameEvent>,
    next_id: u32,
}

impl GameState {
    /// Create a new game with default tuning
    pub fn new(seed: u64) -> Self {
        Self::build(seed, Tuning::default())
    }

    /// Create a new game with custom tuning; rejects tuning that fails validation
    pub fn with_tuning(seed: u64, tuning: Tuning) -> Result<Self, QuizError> {
        tuning.validate()?;
        Ok(Self::build(seed, tuning))
    }

    /// Level 1 roster and first problem are ready immediately
    fn build(seed: u64, tuning: Tuning) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let max_number = tuning.max_number_for_level(1);
        let problem = generate_problem(&mut rng, max_number);

        let mut state = Self {
            seed,
            current_speed: tuning.base_speed,
            tuning,
            score: 0,
            level: 1,
            max_number,
            enemies: Vec::new(),
            problem,
            destroy: None,
            game_over: false,
            time_ticks: 0,
            viewport: Vec2::new(VIEWPORT_WIDTH, VIEWPORT_HEIGHT),
            rng,
            events: vec![GameEvent::ProblemGenerated],
            next_id: 1,
        };
        state.spawn_enemies();

        log::info!(
            "New game (seed {}): {} enemies, max number {}",
            seed,
            state.enemies.len(),
            state.max_number
        );
        state
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Replace the roster with a fresh one for the current level
    pub fn spawn_enemies(&mut self) {
        let theme = theme_index_for_level(self.level);
        let count = self.tuning.enemy_count;
        let start_y = self.tuning.enemy_start_y;

        self.enemies.clear();
        for column in 0..count {
            let id = self.next_entity_id();
            self.enemies.push(Enemy {
                id,
                column,
                pos: Vec2::new(enemy_column_x(self.viewport.x, column), start_y),
                speed: self.current_speed,
                theme,
                slot: SymbolSlot::for_index(column),
            });
        }
    }

    /// Replace the active problem
    pub fn new_problem(&mut self) {
        self.problem = generate_problem(&mut self.rng, self.max_number);
        self.push_event(GameEvent::ProblemGenerated);
    }

    /// Queue an event, dropping the oldest once `MAX_QUEUED_EVENTS` are pending
    pub(crate) fn push_event(&mut self, event: GameEvent) {
        if self.events.len() >= MAX_QUEUED_EVENTS {
            let excess = self.events.len() + 1 - MAX_QUEUED_EVENTS;
            self.events.drain(..excess);
            log::warn!("Event queue full, dropped {} undrained event(s)", excess);
        }
        self.events.push(event);
    }

    /// Pick a uniformly random live enemy
    pub(crate) fn random_enemy(&mut self) -> Option<u32> {
        if self.enemies.is_empty() {
            return None;
        }
        let index = self.rng.random_range(0..self.enemies.len());
        Some(self.enemies[index].id)
    }

    pub fn enemy(&self, id: u32) -> Option<&Enemy> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Cannon position for the current viewport
    pub fn cannon_pos(&self) -> Vec2 {
        cannon_position(self.viewport)
    }

    /// Enemies below this height end the run
    pub fn lose_line(&self) -> f32 {
        self.cannon_pos().y - self.tuning.lose_margin
    }

    /// Update the viewport and move enemies to their new columns.
    /// Heights are kept so a resize never moves an enemy closer to the cannon.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width, height);
        for enemy in &mut self.enemies {
            enemy.pos.x = enemy_column_x(width, enemy.column);
        }
    }

    pub fn phase(&self) -> GamePhase {
        if self.game_over {
            GamePhase::GameOver
        } else if self.destroy.is_some() {
            GamePhase::Destroying
        } else {
            GamePhase::AwaitingAnswer
        }
    }

    /// Single-flight guard: true while a destroy transition runs
    pub fn is_busy(&self) -> bool {
        self.destroy.is_some()
    }

    /// Take all pending events. Call once per frame; undrained events are capped
    /// at `MAX_QUEUED_EVENTS` and the oldest are discarded.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            score: self.score,
            level: self.level,
            max_number: self.max_number,
            current_speed: self.current_speed,
            enemies_left: self.enemies.len(),
            question: self.problem.question(),
            game_over: self.game_over,
        }
    }
}
