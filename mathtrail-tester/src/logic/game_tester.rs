use std::fs;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use mathtrail_game::{
    Board, GameConfig, Player, QuestionBank, QuestionPool, RngBundle, ScoringMode,
    SessionRecord,
};

use crate::logic::policy::AnswerStrategy;
use crate::logic::simulation::{SimulationConfig, SimulationSession, TurnOutcome};

const DEFAULT_MAX_TURNS: u32 = 200;
const FREEPLAY_DRILLS: usize = 120;
const BUNDLED_QUESTIONS: &str = include_str!("../../assets/questions.json");

/// Immutable data shared by every simulation.
#[derive(Debug, Clone, Default)]
pub struct TesterAssets {
    config: GameConfig,
    bank: QuestionBank,
}

impl TesterAssets {
    /// Bundled classroom questions with the default game configuration.
    pub fn load_default() -> Self {
        let bank = QuestionBank::from_json(BUNDLED_QUESTIONS).unwrap_or_else(|err| {
            eprintln!("⚠️ Failed to parse bundled questions: {err}");
            QuestionBank::default()
        });
        Self {
            config: GameConfig::default(),
            bank,
        }
    }

    /// Override the game configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or fails validation.
    pub fn with_config_file(mut self, path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        self.config = GameConfig::from_json(&json)
            .with_context(|| format!("invalid config {}", path.display()))?;
        Ok(self)
    }

    /// Override the question bank from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn with_question_file(mut self, path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read questions {}", path.display()))?;
        self.bank = QuestionBank::from_json(&json)
            .with_context(|| format!("invalid question bank {}", path.display()))?;
        Ok(self)
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn bank(&self) -> &QuestionBank {
        &self.bank
    }

    /// Questions for one run: the classroom bank shuffled, or generated drills.
    fn question_pool(&self, mode: ScoringMode, seed: u64) -> QuestionPool {
        let mut rngs = RngBundle::from_user_seed(seed);
        match mode {
            ScoringMode::Classroom => self.bank.pool(mode, rngs.questions()),
            ScoringMode::Freeplay if !self.bank.freeplay.is_empty() => {
                self.bank.pool(mode, rngs.questions())
            }
            ScoringMode::Freeplay => QuestionPool::generated(rngs.questions(), FREEPLAY_DRILLS),
        }
    }
}

/// Scenario definition: who plays, how they answer, and what must hold.
#[derive(Debug, Clone)]
pub struct SimulationPlan {
    pub mode: ScoringMode,
    pub strategy: AnswerStrategy,
    pub seats: usize,
    pub max_turns: Option<u32>,
    pub exit_after: Option<u32>,
    pub setup: Option<fn(&mut GameConfig)>,
    pub expectations: Vec<SimulationExpectation>,
}

impl SimulationPlan {
    #[must_use]
    pub const fn new(mode: ScoringMode, strategy: AnswerStrategy) -> Self {
        Self {
            mode,
            strategy,
            seats: 1,
            max_turns: None,
            exit_after: None,
            setup: None,
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_seats(mut self, seats: usize) -> Self {
        self.seats = seats.max(1);
        self
    }

    #[must_use]
    pub fn with_max_turns(mut self, max_turns: u32) -> Self {
        self.max_turns = Some(max_turns);
        self
    }

    /// Call `exit()` once this many turns have been played.
    #[must_use]
    pub fn with_exit_after(mut self, turns: u32) -> Self {
        self.exit_after = Some(turns);
        self
    }

    #[must_use]
    pub fn with_setup(mut self, setup: fn(&mut GameConfig)) -> Self {
        self.setup = Some(setup);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: impl Into<SimulationExpectation>) -> Self {
        self.expectations.push(expectation.into());
        self
    }
}

/// Assertion hook run after a simulation completes.
type SimulationExpectationFn =
    Arc<dyn Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static>;

#[derive(Clone)]
pub struct SimulationExpectation(SimulationExpectationFn);

impl std::fmt::Debug for SimulationExpectation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimulationExpectation").finish()
    }
}

impl SimulationExpectation {
    pub fn evaluate(&self, summary: &SimulationSummary) -> Result<()> {
        (self.0)(summary)
    }
}

impl<F> From<F> for SimulationExpectation
where
    F: Fn(&SimulationSummary) -> Result<()> + Send + Sync + 'static,
{
    fn from(f: F) -> Self {
        Self(Arc::new(f))
    }
}

/// Complete record of a simulation run.
#[derive(Debug, Clone)]
pub struct SimulationSummary {
    pub seed: u64,
    pub mode: ScoringMode,
    pub strategy: AnswerStrategy,
    pub config: GameConfig,
    pub board: Board,
    pub turns: Vec<TurnOutcome>,
    pub players: Vec<Player>,
    pub record: Option<SessionRecord>,
    pub finalize_calls: usize,
    pub fallback_questions: usize,
    pub violations: Vec<String>,
    pub game_over: bool,
    pub exited: bool,
    pub error: Option<String>,
}

impl SimulationSummary {
    #[must_use]
    pub fn questions_answered(&self) -> usize {
        self.turns.iter().map(|turn| turn.answers.len()).sum()
    }

    #[must_use]
    pub fn correct_answers(&self) -> usize {
        self.turns
            .iter()
            .flat_map(|turn| &turn.answers)
            .filter(|answer| answer.correct)
            .count()
    }

    /// Seat that reached the finish tile, if any.
    #[must_use]
    pub fn winner(&self) -> Option<usize> {
        self.players.iter().position(Player::is_finished)
    }

    #[must_use]
    pub fn ending_label(&self) -> &'static str {
        if self.error.is_some() {
            "error"
        } else if self.game_over && !self.exited {
            "finished"
        } else if self.exited {
            "exited"
        } else {
            "turn cap"
        }
    }
}

/// Headless deterministic runner for the turn engine.
#[derive(Clone)]
pub struct GameTester {
    verbose: bool,
    assets: Arc<TesterAssets>,
}

impl GameTester {
    pub const fn new(assets: Arc<TesterAssets>, verbose: bool) -> Self {
        Self { verbose, assets }
    }

    pub fn try_new(verbose: bool) -> Self {
        Self::new(Arc::new(TesterAssets::load_default()), verbose)
    }

    pub const fn verbose(&self) -> bool {
        self.verbose
    }

    #[must_use]
    pub fn assets(&self) -> &TesterAssets {
        &self.assets
    }

    pub fn run_plan(&self, plan: &SimulationPlan, seed: u64) -> SimulationSummary {
        let mut game = self.assets.config.clone();
        if let Some(setup) = plan.setup {
            setup(&mut game);
        }
        let config = SimulationConfig::new(plan.mode, seed)
            .with_seats(plan.seats)
            .with_max_turns(plan.max_turns.unwrap_or(DEFAULT_MAX_TURNS))
            .with_game_config(game.clone());
        let questions = self.assets.question_pool(plan.mode, seed);

        let mut session = match SimulationSession::new(config, questions) {
            Ok(session) => session,
            Err(err) => return Self::failed_summary(plan, seed, game, &err),
        };

        if self.verbose {
            println!(
                "  {} seed {seed} | {} seat(s) | {} | {} | board of {}",
                "▶".cyan(),
                plan.seats,
                plan.mode,
                plan.strategy,
                session.board().len()
            );
        }

        let mut policy = plan.strategy.create_policy(seed);
        let mut turns = Vec::new();
        let mut error = None;
        let mut exited = false;

        while !session.is_done() {
            if let Some(limit) = plan.exit_after
                && u32::try_from(turns.len()).unwrap_or(u32::MAX) >= limit
            {
                session.exit();
                exited = true;
                break;
            }
            match session.advance(policy.as_mut()) {
                Ok(outcome) => turns.push(outcome),
                Err(err) => {
                    log::warn!("seed {seed}: {err:#}");
                    error = Some(format!("{err:#}"));
                    break;
                }
            }
        }

        let violations = session.violations().to_vec();
        let engine = session.into_engine();
        let game_over = engine.is_game_over();
        let board = engine.board().clone();
        let players = engine.players().to_vec();
        let fallback_questions = engine.questions().fallbacks();
        let recorder = engine.into_recorder();

        SimulationSummary {
            seed,
            mode: plan.mode,
            strategy: plan.strategy,
            config: game,
            board,
            turns,
            players,
            finalize_calls: recorder.finalize_calls(),
            record: recorder.into_record(),
            fallback_questions,
            violations,
            game_over,
            exited,
            error,
        }
    }

    fn failed_summary(
        plan: &SimulationPlan,
        seed: u64,
        config: GameConfig,
        err: &anyhow::Error,
    ) -> SimulationSummary {
        SimulationSummary {
            seed,
            mode: plan.mode,
            strategy: plan.strategy,
            board: Board::from_kinds(&[]),
            config,
            turns: Vec::new(),
            players: Vec::new(),
            record: None,
            finalize_calls: 0,
            fallback_questions: 0,
            violations: Vec::new(),
            game_over: false,
            exited: false,
            error: Some(format!("{err:#}")),
        }
    }
}
