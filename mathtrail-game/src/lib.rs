//! Math Trail Game Engine
//!
//! Platform-agnostic turn resolution for the Math Trail educational board game.
//! This crate lays out boards, rolls dice, walks players tile by tile, resolves
//! question, treasure and trap tiles, and keeps score. It has no UI or
//! platform-specific dependencies; hosts plug in questions and result storage
//! through [`QuestionProvider`] and [`SessionRecorder`].

pub mod board;
pub mod config;
pub mod constants;
pub mod dice;
pub mod effects;
pub mod event;
pub mod ledger;
pub mod movement;
pub mod player;
pub mod question;
pub mod rng;
pub mod session;
pub mod turn;

// Re-export commonly used types
pub use board::{Board, BoardGenerator, PathCoord, Placement, Tile, TileKind, path_coords};
pub use config::{
    BoardConfig, ConfigError, ConfigLoadError, DiceConfig, GameConfig, PacingConfig, PacingMode,
    ScoringConfig,
};
pub use dice::{DiceRoller, DiceSource, DiceSpin, ScriptedDice, SeededDice, SpinFrame};
pub use effects::{AnswerResolution, EffectOutcome, TileEffectResolver, TrapResolution};
pub use event::{EventId, TurnEvent, TurnEventKind, TurnLog};
pub use ledger::ScoreLedger;
pub use movement::{MovementStepper, StepOutcome};
pub use player::Player;
pub use question::{MathQuestion, QuestionBank, QuestionPool, QuestionProvider, fallback_question};
pub use rng::{CountingRng, RngBundle};
pub use session::{
    MemoryRecorder, QuestionDetail, ScoringMode, SessionRecord, SessionRecorder,
    UnknownScoringMode,
};
pub use turn::{
    ContinuationKind, ContinuationToken, LandingGuard, LandingKey, PendingEvent,
    ScheduledContinuation, SessionSetup, TurnEngine, TurnPhase, TurnRejection, TurnSnapshot,
    TurnState,
};

/// Start a session with a freeplay drill pool and an in-memory recorder.
///
/// # Errors
///
/// Returns an error if the configuration violates an invariant.
pub fn drill_session(
    setup: SessionSetup,
    drills: usize,
) -> Result<TurnEngine<QuestionPool, MemoryRecorder>, ConfigError> {
    let mut rngs = RngBundle::from_user_seed(setup.seed);
    let pool = QuestionPool::generated(rngs.questions(), drills);
    let recorder = MemoryRecorder::new(format!("session-{:016x}", setup.seed));
    TurnEngine::new(setup, pool, recorder)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drill_session_is_reproducible() {
        let play = |seed| {
            let mut engine = drill_session(SessionSetup::new(seed).with_seats(2), 50).unwrap();
            for _ in 0..60 {
                match engine.phase() {
                    TurnPhase::Idle => {
                        engine.roll_dice().unwrap();
                    }
                    TurnPhase::AwaitingAnswer => {
                        let answer = engine.active_question().map_or(0, |q| q.correct_answer);
                        engine.submit_answer(answer, false).unwrap();
                    }
                    TurnPhase::TurnEnd => {
                        engine.end_turn().unwrap();
                    }
                    _ => break,
                }
            }
            (engine.history().to_vec(), engine.players().to_vec())
        };
        assert_eq!(play(2024), play(2024));
    }

    #[test]
    fn default_board_comes_from_board_stream() {
        let engine = drill_session(SessionSetup::new(8), 0).unwrap();
        let mut rngs = RngBundle::from_user_seed(8);
        let expected = BoardGenerator::default().generate_default(rngs.board());
        assert_eq!(engine.board(), &expected);
        assert_eq!(engine.phase(), TurnPhase::Idle);
        assert_eq!(engine.seat(), 0);
    }
}
