//! Arithmetic problem generation
//!
//! A problem is one `a + b` or `a - b` question plus three shuffled answer
//! choices: the correct result and two nearby distractors.

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

use crate::consts::ANSWER_SLOTS;

/// Distractor sampling attempts before switching to the deterministic scan
pub const MAX_DISTRACTOR_ATTEMPTS: u32 = 64;

/// Arithmetic operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Add,
    Sub,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
        }
    }

    /// Evaluate `lhs op rhs`; `None` if subtraction would go negative
    pub fn apply(&self, lhs: u32, rhs: u32) -> Option<u32> {
        match self {
            Operator::Add => lhs.checked_add(rhs),
            Operator::Sub => lhs.checked_sub(rhs),
        }
    }
}

/// One question shown to the player
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    pub lhs: u32,
    pub rhs: u32,
    pub op: Operator,
    pub answer: u32,
    /// Shuffled answer buttons (correct answer appears exactly once)
    pub choices: [u32; ANSWER_SLOTS],
}

impl Problem {
    /// Text shown above the answer buttons, e.g. `3 + 2 = ?`
    pub fn question(&self) -> String {
        format!("{} {} {} = ?", self.lhs, self.op.symbol(), self.rhs)
    }

    pub fn is_correct(&self, value: u32) -> bool {
        value == self.answer
    }
}

/// Generate a fresh problem whose operands lie in `[0, max_number]`
pub fn generate_problem<R: Rng + ?Sized>(rng: &mut R, max_number: u32) -> Problem {
    let op = if rng.random_bool(0.5) { Operator::Add } else { Operator::Sub };

    let (lhs, rhs) = match op {
        Operator::Add => (rng.random_range(0..=max_number), rng.random_range(0..=max_number)),
        Operator::Sub => {
            let lhs = rng.random_range(0..=max_number);
            (lhs, rng.random_range(0..=lhs))
        }
    };
    // Operands are bounded by max_number so neither branch can overflow or underflow
    let answer = match op {
        Operator::Add => lhs + rhs,
        Operator::Sub => lhs - rhs,
    };

    let [first, second] = generate_distractors(rng, answer, max_number);
    let mut choices = [answer, first, second];
    choices.shuffle(rng);

    Problem { lhs, rhs, op, answer, choices }
}

/// Largest distance a distractor may sit from the correct answer
pub fn distractor_spread(max_number: u32) -> u32 {
    (max_number / 5).max(2)
}

/// Two distinct wrong answers near `answer`, within `[0, 2 * max_number]`
pub fn generate_distractors<R: Rng + ?Sized>(rng: &mut R, answer: u32, max_number: u32) -> [u32; 2] {
    let upper = max_number.saturating_mul(2);
    let spread = distractor_spread(max_number);
    let mut found: Vec<u32> = Vec::with_capacity(2);

    let accept = |found: &mut Vec<u32>, candidate: u32, upper: u32| {
        if candidate != answer && candidate <= upper && !found.contains(&candidate) {
            found.push(candidate);
        }
    };

    for _ in 0..MAX_DISTRACTOR_ATTEMPTS {
        if found.len() == 2 {
            break;
        }
        let delta = rng.random_range(1..=spread);
        let candidate = if rng.random_bool(0.5) {
            answer.checked_add(delta)
        } else {
            answer.checked_sub(delta)
        };
        if let Some(candidate) = candidate {
            accept(&mut found, candidate, upper);
        }
    }

    if found.len() < 2 {
        log::warn!(
            "Distractor sampling exhausted for answer {} (max {}), using fallback",
            answer,
            max_number
        );
        // Nearest valid values first, then drop the upper bound if the range is too narrow
        for bound in [upper, u32::MAX] {
            let mut offset = 1u32;
            while found.len() < 2 && offset <= spread.max(upper).saturating_add(2) {
                if let Some(candidate) = answer.checked_add(offset) {
                    accept(&mut found, candidate, bound);
                }
                if found.len() < 2 {
                    if let Some(candidate) = answer.checked_sub(offset) {
                        accept(&mut found, candidate, bound);
                    }
                }
                offset += 1;
            }
        }
    }

    [found[0], found[1]]
}
