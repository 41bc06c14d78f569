//! Quiz questions and the providers that feed them to the engine.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::constants::{
    DRILL_OPERAND_MAX, FALLBACK_QUESTION_ANSWER, FALLBACK_QUESTION_ID, FALLBACK_QUESTION_OPTIONS,
    FALLBACK_QUESTION_PROMPT,
};
use crate::session::ScoringMode;

/// A multiple-choice arithmetic question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MathQuestion {
    pub id: String,
    pub prompt: String,
    pub correct_answer: i64,
    #[serde(default)]
    pub options: Vec<i64>,
}

impl MathQuestion {
    #[must_use]
    pub fn is_correct(&self, value: i64) -> bool {
        value == self.correct_answer
    }

    /// Addition drill `a + b` with four shuffled options.
    pub fn addition<R: Rng + ?Sized>(id: impl Into<String>, a: i64, b: i64, rng: &mut R) -> Self {
        let answer = a + b;
        let mut options = vec![answer, answer + 1, answer - 1, answer + 2];
        options.shuffle(rng);
        Self {
            id: id.into(),
            prompt: format!("{a} + {b}"),
            correct_answer: answer,
            options,
        }
    }
}

/// The question served when a provider has nothing left.
#[must_use]
pub fn fallback_question() -> MathQuestion {
    MathQuestion {
        id: FALLBACK_QUESTION_ID.to_string(),
        prompt: FALLBACK_QUESTION_PROMPT.to_string(),
        correct_answer: FALLBACK_QUESTION_ANSWER,
        options: FALLBACK_QUESTION_OPTIONS.to_vec(),
    }
}

/// Supplies one question per question-tile landing.
///
/// Implementations must never leave the engine waiting: when nothing is
/// left, return [`fallback_question`].
pub trait QuestionProvider {
    fn next_question(&mut self) -> MathQuestion;
}

impl<T: QuestionProvider + ?Sized> QuestionProvider for &mut T {
    fn next_question(&mut self) -> MathQuestion {
        (**self).next_question()
    }
}

impl<T: QuestionProvider + ?Sized> QuestionProvider for Box<T> {
    fn next_question(&mut self) -> MathQuestion {
        (**self).next_question()
    }
}

/// Ordered question pool; serves the fallback question once drained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuestionPool {
    queue: VecDeque<MathQuestion>,
    served: usize,
    fallbacks: usize,
}

impl QuestionPool {
    pub fn new(questions: impl IntoIterator<Item = MathQuestion>) -> Self {
        Self {
            queue: questions.into_iter().collect(),
            served: 0,
            fallbacks: 0,
        }
    }

    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// `count` addition drills with operands in `1..=20`.
    pub fn generated<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Self {
        Self::new((0..count).map(|i| {
            let a = rng.gen_range(1..=DRILL_OPERAND_MAX);
            let b = rng.gen_range(1..=DRILL_OPERAND_MAX);
            MathQuestion::addition(format!("drill-{i}"), a, b, rng)
        }))
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Questions handed out, fallbacks included.
    #[must_use]
    pub const fn served(&self) -> usize {
        self.served
    }

    #[must_use]
    pub const fn fallbacks(&self) -> usize {
        self.fallbacks
    }
}

impl QuestionProvider for QuestionPool {
    fn next_question(&mut self) -> MathQuestion {
        self.served += 1;
        self.queue.pop_front().unwrap_or_else(|| {
            self.fallbacks += 1;
            log::debug!("question pool exhausted; serving fallback question");
            fallback_question()
        })
    }
}

/// Question sets per scoring mode, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct QuestionBank {
    #[serde(default)]
    pub classroom: Vec<MathQuestion>,
    #[serde(default)]
    pub freeplay: Vec<MathQuestion>,
}

impl QuestionBank {
    /// Load a question bank from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a question bank.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn questions(&self, mode: ScoringMode) -> &[MathQuestion] {
        match mode {
            ScoringMode::Classroom => &self.classroom,
            ScoringMode::Freeplay => &self.freeplay,
        }
    }

    /// Shuffled pool for `mode`.
    pub fn pool<R: Rng + ?Sized>(&self, mode: ScoringMode, rng: &mut R) -> QuestionPool {
        let mut questions = self.questions(mode).to_vec();
        questions.shuffle(rng);
        QuestionPool::new(questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn empty_pool_serves_fallback() {
        let mut pool = QuestionPool::empty();
        let q = pool.next_question();
        assert_eq!(q, fallback_question());
        assert_eq!(q.prompt, "1 + 1");
        assert!(q.is_correct(2));
        assert_eq!(pool.fallbacks(), 1);
        assert_eq!(pool.served(), 1);
    }

    #[test]
    fn generated_drills_are_consistent() {
        let mut pool = QuestionPool::generated(&mut SmallRng::seed_from_u64(4), 25);
        assert_eq!(pool.remaining(), 25);
        for _ in 0..25 {
            let q = pool.next_question();
            let (a, b) = q.prompt.split_once(" + ").unwrap();
            let sum = a.parse::<i64>().unwrap() + b.parse::<i64>().unwrap();
            assert_eq!(q.correct_answer, sum);
            assert_eq!(q.options.len(), 4);
            assert!(q.options.contains(&sum));
        }
        assert_eq!(pool.next_question().id, FALLBACK_QUESTION_ID);
    }

    #[test]
    fn bank_loads_per_mode() {
        let bank = QuestionBank::from_json(
            r#"{ "classroom": [ { "id": "c1", "prompt": "3 x 4", "correct_answer": 12, "options": [12, 7] } ] }"#,
        )
        .unwrap();
        assert_eq!(bank.questions(ScoringMode::Classroom).len(), 1);
        assert!(bank.questions(ScoringMode::Freeplay).is_empty());
        let mut pool = bank.pool(ScoringMode::Classroom, &mut SmallRng::seed_from_u64(1));
        assert_eq!(pool.next_question().id, "c1");
    }
}
