use std::fmt;

use mathtrail_game::{MathQuestion, Player};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha20Rng;

/// Answer chosen by an [`AnswerPolicy`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnswerDecision {
    pub value: i64,
    pub use_calculator: bool,
}

/// Policy interface for automated quiz answering.
pub trait AnswerPolicy {
    /// Name used for logging/debug output.
    fn name(&self) -> &'static str;

    /// Answer the active question for `player`.
    fn answer(&mut self, question: &MathQuestion, player: &Player) -> AnswerDecision;
}

/// Built-in answering strategies for automated runs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnswerStrategy {
    Perfect,
    Careless,
    Steady,
    CalculatorFan,
}

impl AnswerStrategy {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Perfect => "Perfect",
            Self::Careless => "Careless",
            Self::Steady => "Steady",
            Self::CalculatorFan => "Calculator Fan",
        }
    }

    #[must_use]
    pub fn create_policy(self, seed: u64) -> Box<dyn AnswerPolicy + Send> {
        match self {
            Self::Perfect => Box::new(PerfectPolicy),
            Self::Careless => Box::new(CarelessPolicy),
            Self::Steady => Box::new(SteadyPolicy::new(seed)),
            Self::CalculatorFan => Box::new(CalculatorFanPolicy),
        }
    }
}

impl fmt::Display for AnswerStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

struct PerfectPolicy;
struct CarelessPolicy;
struct CalculatorFanPolicy;

struct SteadyPolicy {
    rng: ChaCha20Rng,
    accuracy: f64,
}

impl SteadyPolicy {
    fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha20Rng::seed_from_u64(seed),
            accuracy: 0.7,
        }
    }
}

impl AnswerPolicy for PerfectPolicy {
    fn name(&self) -> &'static str {
        "Perfect"
    }

    fn answer(&mut self, question: &MathQuestion, _player: &Player) -> AnswerDecision {
        AnswerDecision {
            value: question.correct_answer,
            use_calculator: false,
        }
    }
}

impl AnswerPolicy for CarelessPolicy {
    fn name(&self) -> &'static str {
        "Careless"
    }

    fn answer(&mut self, question: &MathQuestion, _player: &Player) -> AnswerDecision {
        AnswerDecision {
            value: wrong_answer(question),
            use_calculator: false,
        }
    }
}

impl AnswerPolicy for SteadyPolicy {
    fn name(&self) -> &'static str {
        "Steady"
    }

    fn answer(&mut self, question: &MathQuestion, _player: &Player) -> AnswerDecision {
        let value = if self.rng.gen_bool(self.accuracy) {
            question.correct_answer
        } else {
            wrong_answer(question)
        };
        AnswerDecision {
            value,
            use_calculator: false,
        }
    }
}

impl AnswerPolicy for CalculatorFanPolicy {
    fn name(&self) -> &'static str {
        "Calculator Fan"
    }

    fn answer(&mut self, question: &MathQuestion, player: &Player) -> AnswerDecision {
        AnswerDecision {
            value: question.correct_answer,
            use_calculator: player.calculator_uses_left() > 0,
        }
    }
}

/// First listed option that is wrong, or one past the answer.
fn wrong_answer(question: &MathQuestion) -> i64 {
    question
        .options
        .iter()
        .copied()
        .find(|&option| option != question.correct_answer)
        .unwrap_or(question.correct_answer + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathtrail_game::fallback_question;

    #[test]
    fn perfect_and_careless_are_opposites() {
        let question = fallback_question();
        let player = Player::default();
        let right = AnswerStrategy::Perfect
            .create_policy(1)
            .answer(&question, &player);
        let wrong = AnswerStrategy::Careless
            .create_policy(1)
            .answer(&question, &player);
        assert!(question.is_correct(right.value));
        assert!(!question.is_correct(wrong.value));
    }

    #[test]
    fn steady_policy_is_mostly_right_and_reproducible() {
        let question = fallback_question();
        let player = Player::default();
        let run = |seed| {
            let mut policy = AnswerStrategy::Steady.create_policy(seed);
            (0..200)
                .map(|_| question.is_correct(policy.answer(&question, &player).value))
                .collect::<Vec<_>>()
        };
        let answers = run(9);
        assert_eq!(answers, run(9));
        let correct = answers.iter().filter(|&&ok| ok).count();
        assert!((110..=170).contains(&correct), "correct={correct}");
    }

    #[test]
    fn calculator_fan_stops_when_uses_run_out() {
        let question = fallback_question();
        let mut policy = AnswerStrategy::CalculatorFan.create_policy(0);
        assert!(policy.answer(&question, &Player::new("p", "P", 0, 1)).use_calculator);
        assert!(!policy.answer(&question, &Player::new("p", "P", 0, 0)).use_calculator);
    }
}
