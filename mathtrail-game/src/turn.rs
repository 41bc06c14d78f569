//! Turn state machine binding the board, dice, movement, effects and ledger.
//!
//! A turn runs `Idle -> Rolling -> Moving -> TurnEnd`, detouring through
//! `AwaitingAnswer` on question tiles and `ResolvingEvent` on trap or
//! treasure landings. Reaching the finish tile ends the game.
//!
//! Work after a roll is split into continuations. With instant pacing the
//! engine runs them inside the calling operation. With paced pacing it
//! leaves exactly one [`ScheduledContinuation`] for the host to run through
//! [`TurnEngine::resume`] once its delay has passed.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::board::{Board, BoardGenerator, TileKind};
use crate::config::{ConfigError, GameConfig};
use crate::constants::{DEFAULT_PLAYER_ID, DEFAULT_PLAYER_NAME};
use crate::dice::{DiceSource, DiceSpin, SeededDice};
use crate::effects::{AnswerResolution, EffectOutcome, TileEffectResolver};
use crate::event::{EventId, TurnEvent, TurnEventKind, TurnLog};
use crate::movement::{MovementStepper, StepOutcome};
use crate::player::Player;
use crate::question::{MathQuestion, QuestionProvider};
use crate::rng::RngBundle;
use crate::session::{QuestionDetail, ScoringMode, SessionRecorder};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TurnPhase {
    #[default]
    Idle,
    Rolling,
    Moving,
    AwaitingAnswer,
    ResolvingEvent,
    TurnEnd,
    GameOver,
}

impl TurnPhase {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "IDLE",
            Self::Rolling => "ROLLING",
            Self::Moving => "MOVING",
            Self::AwaitingAnswer => "AWAITING_ANSWER",
            Self::ResolvingEvent => "RESOLVING_EVENT",
            Self::TurnEnd => "TURN_END",
            Self::GameOver => "GAME_OVER",
        }
    }
}

impl fmt::Display for TurnPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Landing effect waiting in `ResolvingEvent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PendingEvent {
    Treasure { at: usize },
    Trap { at: usize },
}

/// Per-turn state; replaced at the start of every turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct TurnState {
    pub phase: TurnPhase,
    pub pending_steps: u8,
    pub pending_event: Option<PendingEvent>,
}

impl TurnState {
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            phase: TurnPhase::Idle,
            pending_steps: 0,
            pending_event: None,
        }
    }
}

/// Engine-issued handle for one scheduled continuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContinuationToken(pub u64);

impl fmt::Display for ContinuationToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContinuationKind {
    /// The die has stopped spinning; start moving.
    SettleRoll,
    /// Advance one tile.
    Step,
    /// Apply the pending trap or treasure.
    ResolveEvent,
}

/// Work the host must hand back through [`TurnEngine::resume`] after `delay`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduledContinuation {
    pub token: ContinuationToken,
    pub delay: Duration,
    pub kind: ContinuationKind,
}

/// Identifies one tile landing within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LandingKey {
    pub turn: u32,
    pub step: u8,
}

/// Single-use guard so one landing is resolved at most once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LandingGuard {
    in_flight: Option<LandingKey>,
    last_resolved: Option<LandingKey>,
}

impl LandingGuard {
    /// Claim `key`. Fails while another landing is in flight or when `key`
    /// was already resolved.
    pub fn begin(&mut self, key: LandingKey) -> bool {
        if self.in_flight.is_some() || self.last_resolved == Some(key) {
            return false;
        }
        self.in_flight = Some(key);
        true
    }

    /// Release the in-flight landing and remember it as resolved.
    pub fn complete(&mut self) {
        if let Some(key) = self.in_flight.take() {
            self.last_resolved = Some(key);
        }
    }

    /// Drop any in-flight claim without marking it resolved.
    pub fn release(&mut self) {
        self.in_flight = None;
    }

    #[must_use]
    pub const fn in_flight(&self) -> Option<LandingKey> {
        self.in_flight
    }
}

/// Why an operation was ignored. State is unchanged whenever one is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TurnRejection {
    #[error("{operation} is not valid during {phase}")]
    OutOfPhase {
        operation: &'static str,
        phase: TurnPhase,
    },
    #[error("continuation {0} is stale or was already run")]
    StaleContinuation(ContinuationToken),
    #[error("session has exited")]
    Exited,
}

/// Read-only view for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TurnSnapshot {
    pub phase: TurnPhase,
    pub seat: usize,
    pub player: Player,
    pub pending_steps: u8,
    pub pending_event: Option<PendingEvent>,
    pub active_question: Option<MathQuestion>,
    pub last_roll: Option<u8>,
    pub turn: u32,
    pub scheduled: Option<ScheduledContinuation>,
}

/// Inputs for a new session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SessionSetup {
    pub seed: u64,
    pub mode: ScoringMode,
    /// Seats in turn order. Empty means one default player.
    pub players: Vec<Player>,
    pub config: GameConfig,
}

impl SessionSetup {
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_mode(mut self, mode: ScoringMode) -> Self {
        self.mode = mode;
        self
    }

    #[must_use]
    pub fn with_config(mut self, config: GameConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_players(mut self, players: Vec<Player>) -> Self {
        self.players = players;
        self
    }

    /// Seat `count` fresh players using the configured calculator allowance.
    #[must_use]
    pub fn with_seats(mut self, count: usize) -> Self {
        let allowance = self.config.scoring.calculator_allowance;
        self.players = (1..=count.max(1))
            .map(|n| Player::new(format!("player-{n}"), format!("Player {n}"), 0, allowance))
            .collect();
        self
    }
}

/// Drives turns for one session.
pub struct TurnEngine<Q, R> {
    config: GameConfig,
    mode: ScoringMode,
    board: Board,
    players: Vec<Player>,
    seat: usize,
    state: TurnState,
    rngs: RngBundle,
    dice: Box<dyn DiceSource>,
    resolver: TileEffectResolver,
    questions: Q,
    recorder: R,
    active_question: Option<MathQuestion>,
    last_roll: Option<u8>,
    turn: u32,
    steps_this_turn: u8,
    scheduled: Option<ScheduledContinuation>,
    next_token: u64,
    guard: LandingGuard,
    unrecorded: Vec<QuestionDetail>,
    turn_log: TurnLog,
    history: Vec<TurnEvent>,
    event_seq: u16,
    finalized: bool,
    exited: bool,
}

impl<Q, R> TurnEngine<Q, R>
where
    Q: QuestionProvider,
    R: SessionRecorder,
{
    /// Start a session: generate the board and seat the players at the start
    /// tile. The first seat is selected and the phase is `Idle`.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration violates an invariant.
    pub fn new(setup: SessionSetup, questions: Q, recorder: R) -> Result<Self, ConfigError> {
        let SessionSetup {
            seed,
            mode,
            players,
            config,
        } = setup;
        config.validate()?;

        let mut rngs = RngBundle::from_user_seed(seed);
        let board = BoardGenerator::new(config.board.clone()).generate_default(rngs.board());
        let players = if players.is_empty() {
            vec![Player::new(
                DEFAULT_PLAYER_ID,
                DEFAULT_PLAYER_NAME,
                0,
                config.scoring.calculator_allowance,
            )]
        } else {
            players
        };
        log::debug!(
            "session seed={seed} mode={mode} board={} tiles ({:?}) seats={}",
            board.len(),
            board.placement(),
            players.len()
        );

        let mut engine = Self {
            resolver: TileEffectResolver::new(config.scoring.clone()),
            config,
            mode,
            board,
            players,
            seat: 0,
            state: TurnState::idle(),
            rngs,
            dice: Box::new(SeededDice::from_user_seed(seed)),
            questions,
            recorder,
            active_question: None,
            last_roll: None,
            turn: 0,
            steps_this_turn: 0,
            scheduled: None,
            next_token: 0,
            guard: LandingGuard::default(),
            unrecorded: Vec::new(),
            turn_log: TurnLog::new(),
            history: Vec::new(),
            event_seq: 0,
            finalized: false,
            exited: false,
        };
        engine.clamp_positions();
        Ok(engine)
    }

    /// Replace the generated board, e.g. with a hand-built layout.
    #[must_use]
    pub fn with_board(mut self, board: Board) -> Self {
        self.board = board;
        self.clamp_positions();
        self
    }

    /// Replace the seeded dice.
    #[must_use]
    pub fn with_dice(mut self, dice: Box<dyn DiceSource>) -> Self {
        self.dice = dice;
        self
    }

    fn clamp_positions(&mut self) {
        let last = self.board.last_index();
        for player in &mut self.players {
            if player.position() > last {
                player.set_position(last);
            }
        }
    }

    // Operations ---------------------------------------------------------

    /// Roll for the current seat and start moving.
    ///
    /// # Errors
    ///
    /// Rejected outside `Idle` or after exit.
    pub fn roll_dice(&mut self) -> Result<u8, TurnRejection> {
        self.ensure_phase("roll_dice", TurnPhase::Idle)?;
        let value = self.dice.roll(self.config.dice.faces);
        self.turn = self.turn.saturating_add(1);
        self.event_seq = 0;
        self.steps_this_turn = 0;
        self.turn_log.clear();
        self.last_roll = Some(value);
        self.state = TurnState {
            phase: TurnPhase::Rolling,
            pending_steps: value,
            pending_event: None,
        };
        self.emit(TurnEventKind::Rolled { value });
        log::debug!(
            "turn {} seat {} rolled {value} from {}",
            self.turn,
            self.seat,
            self.current_player().position()
        );
        self.schedule(ContinuationKind::SettleRoll, self.config.dice.spin_duration());
        self.drive();
        Ok(value)
    }

    /// Resolve the active question.
    ///
    /// # Errors
    ///
    /// Rejected outside `AwaitingAnswer` or after exit.
    pub fn answer_question(
        &mut self,
        is_correct: bool,
        used_power_up: bool,
    ) -> Result<AnswerResolution, TurnRejection> {
        self.ensure_phase("answer_question", TurnPhase::AwaitingAnswer)?;
        let question = self.active_question.take();
        let resolution = self.resolver.resolve_answer(
            &mut self.players[self.seat],
            is_correct,
            used_power_up,
            self.state.pending_steps,
        );
        let (question_id, question_text) = question
            .map(|q| (q.id, q.prompt))
            .unwrap_or_default();
        self.unrecorded.push(QuestionDetail {
            question_text,
            is_correct,
            score_earned: resolution.points,
        });
        self.emit(TurnEventKind::QuestionAnswered {
            question_id,
            is_correct,
            power_up_consumed: resolution.power_up_consumed,
            points: resolution.points,
        });
        self.guard.complete();

        match resolution.outcome {
            EffectOutcome::ResumeMovement { steps } => {
                self.state.phase = TurnPhase::Moving;
                self.state.pending_steps = steps;
                self.schedule(ContinuationKind::Step, self.config.pacing.step_delay());
            }
            _ => self.enter_turn_end(),
        }
        self.drive();
        Ok(resolution)
    }

    /// Check `value` against the active question and resolve it.
    ///
    /// # Errors
    ///
    /// Rejected outside `AwaitingAnswer` or after exit.
    pub fn submit_answer(
        &mut self,
        value: i64,
        used_power_up: bool,
    ) -> Result<AnswerResolution, TurnRejection> {
        self.ensure_phase("submit_answer", TurnPhase::AwaitingAnswer)?;
        let is_correct = self
            .active_question
            .as_ref()
            .is_some_and(|q| q.is_correct(value));
        self.answer_question(is_correct, used_power_up)
    }

    /// Hand the turn to the next seat that has not finished. Returns the new
    /// seat index.
    ///
    /// # Errors
    ///
    /// Rejected outside `TurnEnd` or after exit.
    pub fn end_turn(&mut self) -> Result<usize, TurnRejection> {
        self.ensure_phase("end_turn", TurnPhase::TurnEnd)?;
        let count = self.players.len();
        self.seat = (1..=count)
            .map(|offset| (self.seat + offset) % count)
            .find(|&seat| !self.players[seat].is_finished())
            .unwrap_or(self.seat);
        self.state = TurnState::idle();
        log::debug!("seat {} is up", self.seat);
        Ok(self.seat)
    }

    /// Run the continuation identified by `token`.
    ///
    /// # Errors
    ///
    /// Rejected when the token is not the one currently scheduled, or after
    /// exit.
    pub fn resume(&mut self, token: ContinuationToken) -> Result<(), TurnRejection> {
        if self.exited {
            log::debug!("resume({token}) rejected: session has exited");
            return Err(TurnRejection::Exited);
        }
        match self.scheduled {
            Some(next) if next.token == token => {
                self.scheduled = None;
                self.run(next.kind);
                self.drive();
                Ok(())
            }
            _ => {
                log::debug!("resume({token}) rejected: stale continuation");
                Err(TurnRejection::StaleContinuation(token))
            }
        }
    }

    /// Leave the session. Cancels scheduled work, records resolved questions
    /// and finalizes once. Repeated calls do nothing.
    pub fn exit(&mut self) {
        if self.exited {
            log::debug!("exit ignored: session already exited");
            return;
        }
        self.exited = true;
        if let Some(cancelled) = self.scheduled.take() {
            log::debug!("cancelled continuation {}", cancelled.token);
        }
        self.guard.release();
        self.active_question = None;
        self.flush_details();
        self.finalize_once();
        self.state = TurnState {
            phase: TurnPhase::GameOver,
            pending_steps: 0,
            pending_event: None,
        };
        self.emit(TurnEventKind::Exited);
        log::info!("session exited at turn {}", self.turn);
    }

    #[must_use]
    pub fn snapshot(&self) -> TurnSnapshot {
        TurnSnapshot {
            phase: self.state.phase,
            seat: self.seat,
            player: self.current_player().clone(),
            pending_steps: self.state.pending_steps,
            pending_event: self.state.pending_event,
            active_question: self.active_question.clone(),
            last_roll: self.last_roll,
            turn: self.turn,
            scheduled: self.scheduled,
        }
    }

    /// Cosmetic spin frames for the last roll, drawn from the cosmetic stream.
    pub fn dice_spin(&mut self) -> Option<DiceSpin> {
        let settled = self.last_roll?;
        Some(DiceSpin::animate(
            &self.config.dice,
            settled,
            self.rngs.cosmetic(),
        ))
    }

    // Accessors ----------------------------------------------------------

    #[must_use]
    pub const fn phase(&self) -> TurnPhase {
        self.state.phase
    }

    #[must_use]
    pub const fn state(&self) -> &TurnState {
        &self.state
    }

    #[must_use]
    pub const fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[must_use]
    pub const fn seat(&self) -> usize {
        self.seat
    }

    #[must_use]
    pub fn current_player(&self) -> &Player {
        &self.players[self.seat]
    }

    #[must_use]
    pub const fn active_question(&self) -> Option<&MathQuestion> {
        self.active_question.as_ref()
    }

    #[must_use]
    pub const fn last_roll(&self) -> Option<u8> {
        self.last_roll
    }

    #[must_use]
    pub const fn turn(&self) -> u32 {
        self.turn
    }

    #[must_use]
    pub const fn scheduled(&self) -> Option<ScheduledContinuation> {
        self.scheduled
    }

    #[must_use]
    pub const fn config(&self) -> &GameConfig {
        &self.config
    }

    #[must_use]
    pub const fn mode(&self) -> ScoringMode {
        self.mode
    }

    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.rngs.seed()
    }

    /// Events of the current (or most recent) turn.
    #[must_use]
    pub fn turn_log(&self) -> &[TurnEvent] {
        &self.turn_log
    }

    /// Every event since the session started.
    #[must_use]
    pub fn history(&self) -> &[TurnEvent] {
        &self.history
    }

    #[must_use]
    pub const fn is_exited(&self) -> bool {
        self.exited
    }

    #[must_use]
    pub const fn is_game_over(&self) -> bool {
        matches!(self.state.phase, TurnPhase::GameOver)
    }

    #[must_use]
    pub const fn landing_guard(&self) -> &LandingGuard {
        &self.guard
    }

    #[must_use]
    pub const fn questions(&self) -> &Q {
        &self.questions
    }

    #[must_use]
    pub const fn recorder(&self) -> &R {
        &self.recorder
    }

    pub fn into_recorder(self) -> R {
        self.recorder
    }

    // Internals ----------------------------------------------------------

    fn ensure_phase(
        &self,
        operation: &'static str,
        expected: TurnPhase,
    ) -> Result<(), TurnRejection> {
        if self.exited {
            log::debug!("{operation} rejected: session has exited");
            return Err(TurnRejection::Exited);
        }
        let phase = self.state.phase;
        if phase != expected {
            log::debug!("{operation} rejected during {phase}");
            return Err(TurnRejection::OutOfPhase { operation, phase });
        }
        Ok(())
    }

    fn schedule(&mut self, kind: ContinuationKind, delay: Duration) {
        self.next_token = self.next_token.wrapping_add(1);
        let delay = if self.config.pacing.is_instant() {
            Duration::ZERO
        } else {
            delay
        };
        let next = ScheduledContinuation {
            token: ContinuationToken(self.next_token),
            delay,
            kind,
        };
        log::debug!("scheduled {kind:?} {} after {delay:?}", next.token);
        self.scheduled = Some(next);
    }

    /// Under instant pacing, run continuations until none is left.
    fn drive(&mut self) {
        if !self.config.pacing.is_instant() {
            return;
        }
        while let Some(next) = self.scheduled.take() {
            self.run(next.kind);
        }
    }

    fn run(&mut self, kind: ContinuationKind) {
        match (kind, self.state.phase) {
            (ContinuationKind::SettleRoll, TurnPhase::Rolling) => {
                self.state.phase = TurnPhase::Moving;
                self.schedule(ContinuationKind::Step, self.config.pacing.step_delay());
            }
            (ContinuationKind::Step, TurnPhase::Moving) => self.step(),
            (ContinuationKind::ResolveEvent, TurnPhase::ResolvingEvent) => self.resolve_event(),
            (kind, phase) => log::debug!("dropped {kind:?} continuation during {phase}"),
        }
    }

    fn step(&mut self) {
        let outcome = MovementStepper::step(
            &self.board,
            &mut self.players[self.seat],
            self.state.pending_steps,
        );
        self.steps_this_turn = self.steps_this_turn.saturating_add(1);
        let at = self.current_player().position();
        let tile = self.board.kind_at(at);

        match outcome {
            StepOutcome::Continue { tiles_remaining } => {
                self.state.pending_steps = tiles_remaining;
                if tile.is_special() {
                    self.emit(TurnEventKind::PassedThrough { at, tile });
                } else {
                    self.emit(TurnEventKind::Stepped { to: at, tile });
                }
                self.schedule(ContinuationKind::Step, self.config.pacing.step_delay());
            }
            StepOutcome::Exhausted => {
                self.state.pending_steps = 0;
                self.emit(TurnEventKind::Stepped { to: at, tile });
                self.enter_turn_end();
            }
            StepOutcome::Finished => {
                self.state.pending_steps = 0;
                self.emit(TurnEventKind::Stepped { to: at, tile });
                let outcome = TileEffectResolver::resolve_finish(&mut self.players[self.seat]);
                debug_assert_eq!(outcome, EffectOutcome::GameOver);
                self.enter_game_over(at);
            }
            StepOutcome::DeferToQuestion { pending_steps } => {
                self.state.pending_steps = pending_steps;
                self.emit(TurnEventKind::Stepped { to: at, tile });
                if !self.guard.begin(self.landing_key()) {
                    log::warn!("question landing at {at} already claimed; ending turn");
                    self.guard.release();
                    self.enter_turn_end();
                    return;
                }
                let question = self.questions.next_question();
                self.emit(TurnEventKind::QuestionAsked {
                    question_id: question.id.clone(),
                    at,
                });
                self.active_question = Some(question);
                self.state.phase = TurnPhase::AwaitingAnswer;
            }
            StepOutcome::TrapLanding | StepOutcome::TreasureLanding => {
                self.state.pending_steps = 0;
                self.emit(TurnEventKind::Stepped { to: at, tile });
                if !self.guard.begin(self.landing_key()) {
                    log::warn!("{tile} landing at {at} already claimed; ending turn");
                    self.guard.release();
                    self.enter_turn_end();
                    return;
                }
                self.state.pending_event = Some(if tile == TileKind::Trap {
                    PendingEvent::Trap { at }
                } else {
                    PendingEvent::Treasure { at }
                });
                self.state.phase = TurnPhase::ResolvingEvent;
                self.schedule(ContinuationKind::ResolveEvent, self.config.pacing.event_delay());
            }
        }
    }

    fn resolve_event(&mut self) {
        let Some(event) = self.state.pending_event.take() else {
            log::debug!("no pending event to resolve");
            self.enter_turn_end();
            return;
        };
        match event {
            PendingEvent::Treasure { at } => {
                let bonus = self.resolver.resolve_treasure(&mut self.players[self.seat]);
                self.emit(TurnEventKind::TreasureFound { at, bonus });
            }
            PendingEvent::Trap { .. } => {
                let trap = self
                    .resolver
                    .resolve_trap(&mut self.players[self.seat], self.rngs.trap());
                self.emit(TurnEventKind::TrapSprung {
                    landed_on: trap.landed_on,
                    knocked_back: trap.knocked_back,
                    final_position: trap.final_position,
                });
            }
        }
        self.guard.complete();
        self.enter_turn_end();
    }

    fn enter_turn_end(&mut self) {
        self.state = TurnState {
            phase: TurnPhase::TurnEnd,
            pending_steps: 0,
            pending_event: None,
        };
        self.flush_details();
        let position = self.current_player().position();
        self.emit(TurnEventKind::TurnEnded { position });
        log::info!(
            "turn {} ended: seat {} at {position} with {} points",
            self.turn,
            self.seat,
            self.current_player().score()
        );
    }

    fn enter_game_over(&mut self, at: usize) {
        self.state = TurnState {
            phase: TurnPhase::GameOver,
            pending_steps: 0,
            pending_event: None,
        };
        self.scheduled = None;
        self.flush_details();
        self.emit(TurnEventKind::Finished { at });
        self.finalize_once();
        log::info!(
            "game over: {} finished on turn {}",
            self.current_player().name(),
            self.turn
        );
    }

    fn flush_details(&mut self) {
        for detail in std::mem::take(&mut self.unrecorded) {
            self.recorder.record(&detail);
        }
    }

    fn finalize_once(&mut self) {
        if self.finalized {
            return;
        }
        self.finalized = true;
        let total = self.players.first().map_or(0, Player::score);
        self.recorder.finalize(total, self.mode);
    }

    const fn landing_key(&self) -> LandingKey {
        LandingKey {
            turn: self.turn,
            step: self.steps_this_turn,
        }
    }

    fn emit(&mut self, kind: TurnEventKind) {
        let event = TurnEvent {
            id: EventId::new(self.turn, self.event_seq),
            seat: self.seat,
            kind,
        };
        self.event_seq = self.event_seq.saturating_add(1);
        self.turn_log.push(event.clone());
        self.history.push(event);
    }
}
