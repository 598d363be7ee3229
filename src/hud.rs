//! HUD presentation port
//!
//! The core never touches the DOM. The browser entry point implements [`Hud`]
//! over its elements; tests use an in-memory recorder.

use crate::consts::ANSWER_SLOTS;
use crate::sim::GameState;

/// Controls the core writes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HudElement {
    Score,
    Level,
    Problem,
    /// Answer button by slot (0-based)
    Answer(usize),
    /// Container holding the answer buttons
    AnswerPanel,
    GameOver,
}

impl HudElement {
    /// DOM id of the element; `None` for an answer slot with no button
    pub fn dom_id(&self) -> Option<&'static str> {
        let id = match self {
            HudElement::Score => "score",
            HudElement::Level => "level",
            HudElement::Problem => "current-problem",
            HudElement::Answer(0) => "button1",
            HudElement::Answer(1) => "button2",
            HudElement::Answer(2) => "button3",
            HudElement::Answer(_) => return None,
            HudElement::AnswerPanel => "answer-buttons",
            HudElement::GameOver => "game-over",
        };
        Some(id)
    }
}

pub trait Hud {
    fn set_text(&mut self, element: HudElement, text: &str);
    fn set_visible(&mut self, element: HudElement, visible: bool);
}

/// Write the current score, level, problem and game-over state to a HUD
pub fn sync_hud(state: &GameState, hud: &mut impl Hud) {
    hud.set_text(HudElement::Score, &format!("Score: {}", state.score));
    hud.set_text(HudElement::Level, &format!("Level: {}", state.level));

    let playing = !state.game_over;
    hud.set_visible(HudElement::Problem, playing);
    hud.set_visible(HudElement::AnswerPanel, playing);
    hud.set_visible(HudElement::GameOver, state.game_over);

    if playing {
        hud.set_text(HudElement::Problem, &state.problem.question());
        for slot in 0..ANSWER_SLOTS {
            hud.set_text(HudElement::Answer(slot), &state.problem.choices[slot].to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::tick;
    use std::collections::HashMap;

    #[derive(Default)]
    struct RecordingHud {
        text: HashMap<HudElement, String>,
        visible: HashMap<HudElement, bool>,
    }

    impl Hud for RecordingHud {
        fn set_text(&mut self, element: HudElement, text: &str) {
            self.text.insert(element, text.to_string());
        }

        fn set_visible(&mut self, element: HudElement, visible: bool) {
            self.visible.insert(element, visible);
        }
    }

    #[test]
    fn test_sync_playing() {
        let state = GameState::new(4);
        let mut hud = RecordingHud::default();
        sync_hud(&state, &mut hud);

        assert_eq!(hud.text[&HudElement::Score], "Score: 0");
        assert_eq!(hud.text[&HudElement::Level], "Level: 1");
        assert_eq!(hud.text[&HudElement::Problem], state.problem.question());
        for slot in 0..ANSWER_SLOTS {
            assert_eq!(
                hud.text[&HudElement::Answer(slot)],
                state.problem.choices[slot].to_string()
            );
        }
        assert!(hud.visible[&HudElement::AnswerPanel]);
        assert!(!hud.visible[&HudElement::GameOver]);
    }

    #[test]
    fn test_sync_game_over_hides_input() {
        let mut state = GameState::new(4);
        let lose_line = state.lose_line();
        state.enemies[0].pos.y = lose_line + 1.0;
        tick(&mut state);

        let mut hud = RecordingHud::default();
        sync_hud(&state, &mut hud);
        assert!(!hud.visible[&HudElement::AnswerPanel]);
        assert!(!hud.visible[&HudElement::Problem]);
        assert!(hud.visible[&HudElement::GameOver]);
    }

    #[test]
    fn test_dom_ids() {
        assert_eq!(HudElement::Answer(0).dom_id(), Some("button1"));
        assert_eq!(HudElement::Answer(1).dom_id(), Some("button2"));
        assert_eq!(HudElement::Answer(2).dom_id(), Some("button3"));
        assert_eq!(HudElement::Problem.dom_id(), Some("current-problem"));
        // Every answer slot maps to a button, nothing beyond
        for slot in 0..ANSWER_SLOTS {
            assert!(HudElement::Answer(slot).dom_id().is_some());
        }
        assert_eq!(HudElement::Answer(ANSWER_SLOTS).dom_id(), None);
    }
}
