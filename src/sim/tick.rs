//! Fixed timestep simulation tick and player answers
//!
//! The presentation layer calls [`tick`] once per 60 Hz frame and one of the
//! `submit_*` functions when an answer button is clicked. Both run on the same
//! thread, so the destroy transition timer strictly serializes with answers.

use super::state::{DestroyTransition, GameEvent, GameState};
use crate::consts::ANSWER_SLOTS;
use crate::error::{QuizError, parse_answer};

/// Why an answer was dropped without effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    GameOver,
    /// A destroy transition is already running
    Busy,
    /// Roster empty (between level clear and respawn)
    NoEnemies,
}

/// Result of submitting an answer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AnswerOutcome {
    /// Correct; a destroy transition started against `target`
    Correct { target: u32 },
    /// Wrong; every enemy now moves at `speed`
    Wrong { speed: f32 },
    Ignored(IgnoreReason),
}

/// Advance the game state by one frame
pub fn tick(state: &mut GameState) {
    if !state.game_over {
        state.time_ticks += 1;

        for enemy in &mut state.enemies {
            enemy.pos.y += enemy.speed;
        }

        let lose_line = state.lose_line();
        if state.enemies.iter().any(|e| e.pos.y > lose_line) {
            state.game_over = true;
            log::info!("Game over at level {} with score {}", state.level, state.score);
            state.push_event(GameEvent::GameOver {
                score: state.score,
                level: state.level,
            });
        }
    }

    // Transitions always run to completion, even after the run has ended
    if let Some(transition) = state.destroy.as_mut() {
        transition.remaining_ticks = transition.remaining_ticks.saturating_sub(1);
        if transition.remaining_ticks == 0 {
            complete_destroy(state);
        }
    }
}

/// Submit the value on an answer button
pub fn submit_answer(state: &mut GameState, value: u32) -> AnswerOutcome {
    if state.game_over {
        return AnswerOutcome::Ignored(IgnoreReason::GameOver);
    }
    if state.is_busy() {
        return AnswerOutcome::Ignored(IgnoreReason::Busy);
    }
    if state.enemies.is_empty() {
        return AnswerOutcome::Ignored(IgnoreReason::NoEnemies);
    }

    if state.problem.is_correct(value) {
        let Some(target) = state.random_enemy() else {
            return AnswerOutcome::Ignored(IgnoreReason::NoEnemies);
        };
        log::debug!("Correct answer {} for '{}'", value, state.problem.question());
        begin_destroy(state, target);
        AnswerOutcome::Correct { target }
    } else {
        state.current_speed += state.tuning.speed_increase;
        let speed = state.current_speed;
        for enemy in &mut state.enemies {
            enemy.speed = speed;
        }
        log::debug!(
            "Wrong answer {} for '{}', speed now {:.2}",
            value,
            state.problem.question(),
            speed
        );
        state.push_event(GameEvent::WrongAnswer { speed });
        AnswerOutcome::Wrong { speed }
    }
}

/// Submit the answer shown in button `slot` (0-based)
pub fn submit_slot(state: &mut GameState, slot: usize) -> Result<AnswerOutcome, QuizError> {
    if slot >= ANSWER_SLOTS {
        return Err(QuizError::AnswerSlotOutOfRange(slot));
    }
    let value = state.problem.choices[slot];
    Ok(submit_answer(state, value))
}

/// Submit the raw text of a clicked button
pub fn submit_payload(state: &mut GameState, payload: &str) -> Result<AnswerOutcome, QuizError> {
    let value = parse_answer(payload)?;
    Ok(submit_answer(state, value))
}

/// Start the laser transition toward `target` and raise the busy guard.
/// No-op if a transition is already running.
pub fn begin_destroy(state: &mut GameState, target: u32) {
    if state.destroy.is_some() {
        return;
    }
    state.destroy = Some(DestroyTransition {
        target,
        remaining_ticks: state.tuning.destroy_ticks,
    });
    state.push_event(GameEvent::EnemyTargeted { enemy_id: target });
}

/// Finish the running transition: remove the target, score it, then either
/// level up or move on to the next problem. No-op without a transition.
pub fn complete_destroy(state: &mut GameState) {
    let Some(transition) = state.destroy.take() else {
        return;
    };

    let before = state.enemies.len();
    state.enemies.retain(|e| e.id != transition.target);
    if state.enemies.len() < before {
        state.score += state.tuning.kill_score;
        state.push_event(GameEvent::EnemyDestroyed {
            enemy_id: transition.target,
            score: state.score,
        });
    }

    if state.game_over {
        return;
    }

    if state.enemies.is_empty() {
        level_up(state);
    } else {
        state.new_problem();
    }
}

/// Advance to the next level: harder numbers, base speed, fresh roster and problem
pub fn level_up(state: &mut GameState) {
    state.level += 1;
    state.max_number = state.tuning.max_number_for_level(state.level);
    state.current_speed = state.tuning.base_speed;
    state.spawn_enemies();
    state.new_problem();

    log::info!(
        "Level {}: max number {}, {} enemies",
        state.level,
        state.max_number,
        state.enemies.len()
    );
    state.push_event(GameEvent::LevelUp { level: state.level });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::problem::{Operator, Problem};
    use crate::sim::state::GamePhase;

    fn wrong_value(state: &GameState) -> u32 {
        state.problem.answer + 1
    }

    /// A problem the generator can never produce (operands above any max number used here)
    fn stale_problem() -> Problem {
        Problem {
            lhs: 1000,
            rhs: 1000,
            op: Operator::Add,
            answer: 2000,
            choices: [2000, 1999, 2001],
        }
    }

    fn problems_generated(events: &[GameEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, GameEvent::ProblemGenerated))
            .count()
    }

    #[test]
    fn test_correct_answer_flow() {
        let mut state = GameState::new(12345);
        state.problem = Problem {
            lhs: 3,
            rhs: 2,
            op: Operator::Add,
            answer: 5,
            choices: [4, 5, 7],
        };

        let outcome = submit_answer(&mut state, 5);
        let AnswerOutcome::Correct { target } = outcome else {
            panic!("expected correct outcome, got {:?}", outcome);
        };
        assert_eq!(state.phase(), GamePhase::Destroying);
        // Nothing changes until the transition finishes
        assert_eq!(state.score, 0);
        assert_eq!(state.enemies.len(), 6);

        for _ in 0..state.tuning.destroy_ticks - 1 {
            tick(&mut state);
        }
        assert!(state.is_busy());
        tick(&mut state);

        assert!(!state.is_busy());
        assert_eq!(state.score, 10);
        assert_eq!(state.enemies.len(), 5);
        assert!(state.enemy(target).is_none());
        assert_eq!(state.phase(), GamePhase::AwaitingAnswer);
    }

    #[test]
    fn test_busy_guard_rejects_answers() {
        let mut state = GameState::new(7);
        let answer = state.problem.answer;
        assert!(matches!(submit_answer(&mut state, answer), AnswerOutcome::Correct { .. }));

        let speed = state.current_speed;
        assert_eq!(
            submit_answer(&mut state, answer),
            AnswerOutcome::Ignored(IgnoreReason::Busy)
        );
        assert_eq!(
            submit_answer(&mut state, answer + 1),
            AnswerOutcome::Ignored(IgnoreReason::Busy)
        );
        assert!((state.current_speed - speed).abs() < f32::EPSILON);

        complete_destroy(&mut state);
        assert_eq!(state.enemies.len(), 5);
        assert_eq!(state.score, 10);
    }

    #[test]
    fn test_wrong_answer_ratchets_speed() {
        let mut state = GameState::new(99);
        let problem = state.problem.clone();
        let base = state.tuning.base_speed;
        let step = state.tuning.speed_increase;

        let wrong = wrong_value(&state);
        let outcome = submit_answer(&mut state, wrong);
        assert!(matches!(outcome, AnswerOutcome::Wrong { .. }));
        submit_answer(&mut state, wrong);

        assert!((state.current_speed - (base + 2.0 * step)).abs() < 1e-6);
        for enemy in &state.enemies {
            assert!((enemy.speed - state.current_speed).abs() < 1e-6);
        }
        assert_eq!(state.problem, problem);
        assert_eq!(state.score, 0);
        assert_eq!(state.enemies.len(), 6);
        assert!(!state.is_busy());
    }

    #[test]
    fn test_empty_roster_ignores_answers() {
        let mut state = GameState::new(5);
        state.enemies.clear();
        let answer = state.problem.answer;
        assert_eq!(
            submit_answer(&mut state, answer),
            AnswerOutcome::Ignored(IgnoreReason::NoEnemies)
        );
        assert!(!state.is_busy());
    }

    #[test]
    fn test_level_up_after_last_kill() {
        let mut state = GameState::new(11);
        state.enemies.truncate(1);
        let wrong = wrong_value(&state);
        submit_answer(&mut state, wrong);
        assert!(state.current_speed > state.tuning.base_speed);

        let answer = state.problem.answer;
        submit_answer(&mut state, answer);
        complete_destroy(&mut state);

        assert_eq!(state.level, 2);
        assert_eq!(state.max_number, 6);
        assert_eq!(state.enemies.len(), 6);
        assert!((state.current_speed - state.tuning.base_speed).abs() < f32::EPSILON);
        assert!(state.enemies.iter().all(|e| e.theme == 1));
        assert!(state.problem.lhs <= 6 && state.problem.rhs <= 6);
        assert!(state.drain_events().contains(&GameEvent::LevelUp { level: 2 }));
    }

    #[test]
    fn test_kill_generates_new_problem() {
        let mut state = GameState::new(31);
        let target = state.enemies[0].id;
        begin_destroy(&mut state, target);
        state.problem = stale_problem();
        state.drain_events();

        complete_destroy(&mut state);

        let events = state.drain_events();
        assert_eq!(problems_generated(&events), 1);
        assert_ne!(state.problem, stale_problem());
        assert_eq!(state.level, 1);
        assert_eq!(state.enemies.len(), 5);
    }

    #[test]
    fn test_last_kill_levels_up_with_new_problem() {
        let mut state = GameState::new(32);
        state.enemies.truncate(1);
        let target = state.enemies[0].id;
        begin_destroy(&mut state, target);
        state.problem = stale_problem();
        state.drain_events();

        complete_destroy(&mut state);

        let events = state.drain_events();
        assert_eq!(problems_generated(&events), 1);
        assert!(events.contains(&GameEvent::LevelUp { level: 2 }));
        assert_ne!(state.problem, stale_problem());
        assert_eq!(state.level, 2);
    }

    #[test]
    fn test_level_up_generates_new_problem() {
        let mut state = GameState::new(33);
        state.problem = stale_problem();
        state.drain_events();

        level_up(&mut state);

        let events = state.drain_events();
        assert_eq!(problems_generated(&events), 1);
        assert_ne!(state.problem, stale_problem());
        assert!(state.problem.lhs <= state.max_number && state.problem.rhs <= state.max_number);
    }

    #[test]
    fn test_enemy_reaching_cannon_ends_game() {
        let mut state = GameState::new(3);
        let lose_line = state.lose_line();
        state.enemies[4].pos.y = lose_line - 0.05;
        tick(&mut state);
        assert!(state.game_over);
        assert_eq!(state.phase(), GamePhase::GameOver);

        let positions: Vec<f32> = state.enemies.iter().map(|e| e.pos.y).collect();
        tick(&mut state);
        let after: Vec<f32> = state.enemies.iter().map(|e| e.pos.y).collect();
        assert_eq!(positions, after);

        let answer = state.problem.answer;
        assert_eq!(
            submit_answer(&mut state, answer),
            AnswerOutcome::Ignored(IgnoreReason::GameOver)
        );
        assert!(state.game_over);
    }

    #[test]
    fn test_enemy_on_the_line_is_safe() {
        let mut state = GameState::new(3);
        for enemy in &mut state.enemies {
            enemy.speed = 0.0;
        }
        state.enemies[0].pos.y = state.lose_line();
        tick(&mut state);
        assert!(!state.game_over);
    }

    #[test]
    fn test_transition_completes_after_game_over() {
        let mut state = GameState::new(21);
        let answer = state.problem.answer;
        let problem = state.problem.clone();
        submit_answer(&mut state, answer);

        let lose_line = state.lose_line();
        state.enemies[0].pos.y = lose_line + 1.0;
        tick(&mut state);
        assert!(state.game_over);

        for _ in 0..state.tuning.destroy_ticks {
            tick(&mut state);
        }
        assert!(!state.is_busy());
        assert_eq!(state.score, 10);
        assert_eq!(state.enemies.len(), 5);
        // No new round after the run ended
        assert_eq!(state.problem, problem);
    }

    #[test]
    fn test_slot_and_payload_input() {
        let mut state = GameState::new(8);
        assert!(matches!(
            submit_slot(&mut state, 3),
            Err(QuizError::AnswerSlotOutOfRange(3))
        ));
        assert!(matches!(
            submit_payload(&mut state, "abc"),
            Err(QuizError::InvalidAnswerInput(_))
        ));
        assert_eq!(state.enemies.len(), 6);
        assert!((state.current_speed - state.tuning.base_speed).abs() < f32::EPSILON);

        let slot = state
            .problem
            .choices
            .iter()
            .position(|&c| c == state.problem.answer)
            .unwrap();
        assert!(matches!(submit_slot(&mut state, slot), Ok(AnswerOutcome::Correct { .. })));
    }

    #[test]
    fn test_determinism() {
        // Two states with same seed and inputs should produce identical results
        let mut state1 = GameState::new(99999);
        let mut state2 = GameState::new(99999);

        for round in 0..20 {
            for state in [&mut state1, &mut state2] {
                let value = if round % 3 == 0 {
                    state.problem.answer + 1
                } else {
                    state.problem.answer
                };
                submit_answer(state, value);
                for _ in 0..40 {
                    tick(state);
                }
            }
        }

        assert_eq!(state1.snapshot(), state2.snapshot());
        assert_eq!(state1.problem, state2.problem);
        assert_eq!(state1.time_ticks, state2.time_ticks);
    }
}
