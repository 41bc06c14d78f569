use anyhow::{Context, Result, bail};
use mathtrail_game::{
    Board, GameConfig, MemoryRecorder, Player, QuestionPool, ScoringMode, SessionSetup,
    TurnEngine, TurnEvent, TurnPhase,
};

use crate::logic::policy::AnswerPolicy;

/// Configuration for a simulation session.
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    pub seed: u64,
    pub mode: ScoringMode,
    pub seats: usize,
    pub max_turns: u32,
    pub game: GameConfig,
}

impl SimulationConfig {
    #[must_use]
    pub fn new(mode: ScoringMode, seed: u64) -> Self {
        Self {
            seed,
            mode,
            seats: 1,
            max_turns: 200,
            game: GameConfig::default(),
        }
    }

    #[must_use]
    pub fn with_seats(mut self, seats: usize) -> Self {
        self.seats = seats.max(1);
        self
    }

    #[must_use]
    pub const fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = max_turns;
        self
    }

    #[must_use]
    pub fn with_game_config(mut self, game: GameConfig) -> Self {
        self.game = game;
        self
    }
}

/// One answered question inside a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub prompt: String,
    pub given: i64,
    pub correct: bool,
    pub used_calculator: bool,
    pub points: u32,
}

/// Result of playing one full turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn: u32,
    pub seat: usize,
    pub roll: u8,
    pub start: usize,
    pub end: usize,
    pub score_before: u32,
    pub score_after: u32,
    pub answers: Vec<AnswerRecord>,
    pub continuations_resumed: usize,
    pub game_over: bool,
    pub events: Vec<TurnEvent>,
}

/// Deterministic harness that plays turns through the engine.
pub struct SimulationSession {
    engine: TurnEngine<QuestionPool, MemoryRecorder>,
    max_turns: u32,
    violations: Vec<String>,
}

impl SimulationSession {
    /// Build a session around `questions`.
    ///
    /// # Errors
    ///
    /// Returns an error if the game configuration is rejected by the engine.
    pub fn new(config: SimulationConfig, questions: QuestionPool) -> Result<Self> {
        let setup = SessionSetup::new(config.seed)
            .with_mode(config.mode)
            .with_config(config.game)
            .with_seats(config.seats);
        let recorder = MemoryRecorder::new(format!("sim-{:016x}", config.seed));
        let engine = TurnEngine::new(setup, questions, recorder)
            .context("engine rejected the game configuration")?;
        Ok(Self {
            engine,
            max_turns: config.max_turns,
            violations: Vec::new(),
        })
    }

    #[must_use]
    pub const fn engine(&self) -> &TurnEngine<QuestionPool, MemoryRecorder> {
        &self.engine
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        self.engine.board()
    }

    #[must_use]
    pub fn violations(&self) -> &[String] {
        &self.violations
    }

    /// Whether the session should stop: game over, exited, or out of turns.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.engine.is_game_over() || self.engine.turn() >= self.max_turns
    }

    /// Leave the session early.
    pub fn exit(&mut self) {
        self.engine.exit();
    }

    #[must_use]
    pub fn into_engine(self) -> TurnEngine<QuestionPool, MemoryRecorder> {
        self.engine
    }

    /// Play one full turn for the current seat.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine rejects an operation the harness
    /// expected to be valid.
    pub fn advance(&mut self, policy: &mut dyn AnswerPolicy) -> Result<TurnOutcome> {
        if self.engine.phase() != TurnPhase::Idle {
            bail!("turn cannot start during {}", self.engine.phase());
        }
        let seat = self.engine.seat();
        let start = self.engine.current_player().position();
        let score_before = self.engine.current_player().score();
        let roll = self.engine.roll_dice()?;
        let mut continuations_resumed = self.settle()?;
        let mut answers = Vec::new();

        while self.engine.phase() == TurnPhase::AwaitingAnswer {
            let question = self
                .engine
                .active_question()
                .cloned()
                .context("awaiting an answer without an active question")?;
            let decision = policy.answer(&question, self.engine.current_player());
            let resolution = self
                .engine
                .submit_answer(decision.value, decision.use_calculator)?;
            answers.push(AnswerRecord {
                prompt: question.prompt,
                given: decision.value,
                correct: question.correct_answer == decision.value,
                used_calculator: resolution.power_up_consumed,
                points: resolution.points,
            });
            continuations_resumed += self.settle()?;
        }

        let turn = self.engine.turn();
        let events = self.engine.turn_log().to_vec();
        let player = self.engine.players()[seat].clone();
        self.check_invariants(turn, score_before, &player);

        let game_over = match self.engine.phase() {
            TurnPhase::TurnEnd => {
                self.engine.end_turn()?;
                false
            }
            TurnPhase::GameOver => true,
            phase => bail!("turn {turn} stopped in unexpected phase {phase}"),
        };

        log::debug!(
            "turn {turn}: seat {seat} ({}) rolled {roll} {start}->{} score {}",
            policy.name(),
            player.position(),
            player.score()
        );

        Ok(TurnOutcome {
            turn,
            seat,
            roll,
            start,
            end: player.position(),
            score_before,
            score_after: player.score(),
            answers,
            continuations_resumed,
            game_over,
            events,
        })
    }

    /// Run scheduled continuations immediately, ignoring their delays.
    fn settle(&mut self) -> Result<usize> {
        let mut resumed = 0;
        while let Some(next) = self.engine.scheduled() {
            self.engine
                .resume(next.token)
                .with_context(|| format!("resuming {:?}", next.kind))?;
            resumed += 1;
        }
        Ok(resumed)
    }

    fn check_invariants(&mut self, turn: u32, score_before: u32, player: &Player) {
        let last = self.engine.board().last_index();
        if player.position() > last {
            self.violations.push(format!(
                "turn {turn}: position {} beyond finish {last}",
                player.position()
            ));
        }
        if player.calculator_uses_left() > player.calculator_allowance() {
            self.violations.push(format!(
                "turn {turn}: calculator uses {} exceed allowance {}",
                player.calculator_uses_left(),
                player.calculator_allowance()
            ));
        }
        if player.score() < score_before {
            self.violations.push(format!(
                "turn {turn}: score fell from {score_before} to {}",
                player.score()
            ));
        }
        if self.engine.phase() == TurnPhase::TurnEnd && self.engine.state().pending_steps != 0 {
            self.violations.push(format!(
                "turn {turn}: {} pending steps left at turn end",
                self.engine.state().pending_steps
            ));
        }
    }
}
