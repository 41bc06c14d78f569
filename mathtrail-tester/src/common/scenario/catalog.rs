use anyhow::{Context, Result, ensure};

use crate::common::scenario::TestScenario;
use crate::logic::game_tester::SimulationSummary;
use crate::logic::{AnswerStrategy, SimulationPlan};
use mathtrail_game::{
    BoardGenerator, GameConfig, PacingConfig, RngBundle, ScoringMode, SessionSetup, TileKind,
    TurnEventKind, TurnPhase, drill_session,
};

const CLASSROOM_BANK_SIZE_HINT: usize = 16;
const REPLAY_DRILLS: usize = 60;
const REPLAY_ACTION_CAP: usize = 2_000;

pub fn catalog_scenarios() -> Vec<TestScenario> {
    vec![
        TestScenario::simulation(
            "smoke",
            "Smoke Test",
            SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Perfect)
                .with_expectation(finished_expectation)
                .with_expectation(record_expectation),
        ),
        TestScenario::simulation(
            "board-layout",
            "Board Layout Constraints",
            SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Perfect)
                .with_max_turns(0)
                .with_expectation(board_layout_expectation),
        ),
        TestScenario::simulation(
            "full-game-perfect",
            "Full Game - Perfect Answers",
            full_game_plan(AnswerStrategy::Perfect).with_expectation(perfect_points_expectation),
        ),
        TestScenario::simulation(
            "full-game-careless",
            "Full Game - Careless Answers",
            full_game_plan(AnswerStrategy::Careless).with_expectation(careless_points_expectation),
        ),
        TestScenario::simulation(
            "full-game-steady",
            "Full Game - Steady Answers",
            full_game_plan(AnswerStrategy::Steady),
        ),
        TestScenario::simulation(
            "calculator",
            "Calculator Power-Up Budget",
            full_game_plan(AnswerStrategy::CalculatorFan)
                .with_expectation(calculator_budget_expectation),
        ),
        TestScenario::simulation(
            "multiplayer",
            "Multiplayer Seat Rotation",
            full_game_plan(AnswerStrategy::Steady)
                .with_seats(3)
                .with_expectation(seat_rotation_expectation),
        ),
        TestScenario::simulation(
            "paced",
            "Paced Continuations",
            full_game_plan(AnswerStrategy::Perfect)
                .with_setup(paced_setup)
                .with_expectation(paced_expectation),
        ),
        TestScenario::simulation(
            "classroom",
            "Classroom Question Bank",
            SimulationPlan::new(ScoringMode::Classroom, AnswerStrategy::Steady)
                .with_expectation(finished_expectation)
                .with_expectation(score_accounting_expectation)
                .with_expectation(classroom_expectation),
        ),
        TestScenario::simulation(
            "deterministic",
            "Deterministic Replay Verification",
            SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Perfect)
                .with_seats(2)
                .with_expectation(deterministic_expectation),
        ),
        TestScenario::simulation(
            "exit-midgame",
            "Exit Mid-Game",
            SimulationPlan::new(ScoringMode::Freeplay, AnswerStrategy::Steady)
                .with_exit_after(5)
                .with_expectation(exit_expectation)
                .with_expectation(record_expectation),
        ),
    ]
}

pub fn find_catalog_scenario(key: &str) -> Option<TestScenario> {
    catalog_scenarios()
        .into_iter()
        .find(|scenario| scenario.key == key)
}

fn full_game_plan(strategy: AnswerStrategy) -> SimulationPlan {
    SimulationPlan::new(ScoringMode::Freeplay, strategy)
        .with_expectation(finished_expectation)
        .with_expectation(score_accounting_expectation)
        .with_expectation(record_expectation)
}

fn paced_setup(config: &mut GameConfig) {
    config.pacing = PacingConfig::paced();
}

fn finished_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.game_over, "game did not reach the finish");
    let winner = summary.winner().context("no player marked finished")?;
    ensure!(
        summary.players[winner].position() == summary.board.last_index(),
        "winner stopped at {} instead of the finish tile",
        summary.players[winner].position()
    );
    ensure!(
        summary.players.iter().filter(|p| p.is_finished()).count() == 1,
        "more than one player finished"
    );
    Ok(())
}

/// Each turn's score change equals its answer points plus treasure bonuses.
fn score_accounting_expectation(summary: &SimulationSummary) -> Result<()> {
    for turn in &summary.turns {
        let answered: u32 = turn.answers.iter().map(|a| a.points).sum();
        let treasure: u32 = turn
            .events
            .iter()
            .filter_map(|event| match event.kind {
                TurnEventKind::TreasureFound { bonus, .. } => Some(bonus),
                _ => None,
            })
            .sum();
        ensure!(
            turn.score_after.saturating_sub(turn.score_before) == answered + treasure,
            "turn {}: score moved {} -> {} but answers gave {answered} and treasure {treasure}",
            turn.turn,
            turn.score_before,
            turn.score_after
        );
    }
    Ok(())
}

fn record_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(
        summary.finalize_calls == 1,
        "session finalized {} times",
        summary.finalize_calls
    );
    let record = summary
        .record
        .as_ref()
        .context("finalize did not produce a record")?;
    let lead = summary.players.first().context("no players seated")?;
    ensure!(
        record.score == lead.score(),
        "record score {} differs from first seat score {}",
        record.score,
        lead.score()
    );
    ensure!(record.mode == summary.mode, "record mode mismatch");
    ensure!(
        record.details.len() == summary.questions_answered(),
        "{} details recorded for {} answers",
        record.details.len(),
        summary.questions_answered()
    );
    ensure!(
        record.correct_answers() == summary.correct_answers(),
        "recorded correct answers disagree with the run"
    );
    Ok(())
}

fn board_layout_expectation(summary: &SimulationSummary) -> Result<()> {
    let board = &summary.board;
    let cfg = &summary.config.board;
    ensure!(board.len() == cfg.length, "board has {} tiles", board.len());
    ensure!(board.kind_at(0) == TileKind::Start, "tile 0 is not start");
    ensure!(
        board.kind_at(board.last_index()) == TileKind::Finish,
        "last tile is not finish"
    );
    for (kind, count, gap) in [
        (TileKind::Question, cfg.question_tiles, cfg.question_gap),
        (TileKind::Treasure, cfg.treasure_tiles, cfg.treasure_gap),
        (TileKind::Trap, cfg.trap_tiles, cfg.trap_gap),
    ] {
        ensure!(
            board.count(kind) == count,
            "{} {kind} tiles, expected {count}",
            board.count(kind)
        );
        if board.placement() == mathtrail_game::Placement::Constrained
            && let Some(found) = board.min_gap(kind)
        {
            ensure!(found >= gap, "{kind} tiles only {found} apart (min {gap})");
        }
    }
    ensure!(summary.turns.is_empty(), "no turns should be played");
    Ok(())
}

fn perfect_points_expectation(summary: &SimulationSummary) -> Result<()> {
    let full = summary.config.scoring.points_per_question;
    for answer in summary.turns.iter().flat_map(|t| &t.answers) {
        ensure!(answer.correct, "perfect policy answered '{}' wrong", answer.prompt);
        ensure!(answer.points == full, "correct answer earned {}", answer.points);
    }
    Ok(())
}

fn careless_points_expectation(summary: &SimulationSummary) -> Result<()> {
    for answer in summary.turns.iter().flat_map(|t| &t.answers) {
        ensure!(!answer.correct, "careless policy answered '{}' right", answer.prompt);
        ensure!(answer.points == 0, "wrong answer earned {}", answer.points);
    }
    Ok(())
}

fn calculator_budget_expectation(summary: &SimulationSummary) -> Result<()> {
    let allowance = summary.config.scoring.calculator_allowance;
    let assisted = summary.config.scoring.assisted_points();
    let full = summary.config.scoring.points_per_question;
    let answers: Vec<_> = summary.turns.iter().flat_map(|t| &t.answers).collect();
    let expected_uses = answers.len().min(usize::from(allowance));

    for (index, answer) in answers.iter().enumerate() {
        let assisted_answer = index < expected_uses;
        ensure!(
            answer.used_calculator == assisted_answer,
            "answer {index} calculator use was {}",
            answer.used_calculator
        );
        let expected = if assisted_answer { assisted } else { full };
        ensure!(
            answer.points == expected,
            "answer {index} earned {} (expected {expected})",
            answer.points
        );
    }
    let lead = summary.players.first().context("no players seated")?;
    ensure!(
        usize::from(lead.calculator_uses_left()) == usize::from(allowance) - expected_uses,
        "{} calculator uses left",
        lead.calculator_uses_left()
    );
    Ok(())
}

fn seat_rotation_expectation(summary: &SimulationSummary) -> Result<()> {
    let seats = summary.players.len();
    ensure!(seats == 3, "expected three seats, found {seats}");
    for (index, turn) in summary.turns.iter().enumerate() {
        ensure!(
            turn.seat == index % seats,
            "turn {} went to seat {}",
            turn.turn,
            turn.seat
        );
        ensure!(
            turn.events.iter().all(|event| event.seat == turn.seat),
            "turn {} logged events for another seat",
            turn.turn
        );
    }
    Ok(())
}

fn paced_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(!summary.config.pacing.is_instant(), "pacing setup not applied");
    for turn in &summary.turns {
        ensure!(
            turn.continuations_resumed >= 2,
            "turn {} resumed only {} continuations",
            turn.turn,
            turn.continuations_resumed
        );
    }
    Ok(())
}

fn classroom_expectation(summary: &SimulationSummary) -> Result<()> {
    ensure!(summary.mode == ScoringMode::Classroom, "wrong scoring mode");
    let answered = summary.questions_answered();
    if answered <= CLASSROOM_BANK_SIZE_HINT {
        ensure!(
            summary.fallback_questions == 0,
            "{} fallback questions served with bank questions left",
            summary.fallback_questions
        );
    }
    Ok(())
}

fn exit_expectation(summary: &SimulationSummary) -> Result<()> {
    if !summary.exited {
        // The game may legitimately finish before the exit point.
        return finished_expectation(summary);
    }
    ensure!(summary.game_over, "exit did not end the session");
    ensure!(summary.turns.len() == 5, "exited after {} turns", summary.turns.len());
    ensure!(summary.winner().is_none(), "nobody should finish on exit");
    Ok(())
}

/// Replays the seed twice straight through the engine and checks both the
/// event stream and the board match, and that the board depends only on the
/// seed and board configuration.
fn deterministic_expectation(summary: &SimulationSummary) -> Result<()> {
    let mut rngs = RngBundle::from_user_seed(summary.seed);
    let expected_board =
        BoardGenerator::new(summary.config.board.clone()).generate_default(rngs.board());
    ensure!(
        expected_board == summary.board,
        "board for seed {} is not reproducible",
        summary.seed
    );

    let first = replay(summary)?;
    let second = replay(summary)?;
    ensure!(first == second, "replays of seed {} diverged", summary.seed);
    Ok(())
}

fn replay(summary: &SimulationSummary) -> Result<Vec<TurnEventKind>> {
    let setup = SessionSetup::new(summary.seed)
        .with_config(summary.config.clone())
        .with_seats(summary.players.len().max(1));
    let mut engine = drill_session(setup, REPLAY_DRILLS).context("replay setup")?;
    for _ in 0..REPLAY_ACTION_CAP {
        match engine.phase() {
            TurnPhase::Idle => {
                engine.roll_dice()?;
            }
            TurnPhase::AwaitingAnswer => {
                engine.answer_question(true, false)?;
            }
            TurnPhase::TurnEnd => {
                engine.end_turn()?;
            }
            TurnPhase::GameOver => break,
            _ => {
                let token = engine.scheduled().context("engine stalled")?.token;
                engine.resume(token)?;
            }
        }
    }
    Ok(engine
        .history()
        .iter()
        .map(|event| event.kind.clone())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::GameTester;

    #[test]
    fn catalog_keys_are_unique() {
        let scenarios = catalog_scenarios();
        let mut keys: Vec<_> = scenarios.iter().map(|s| s.key.as_str()).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), scenarios.len());
    }

    #[test]
    fn catalog_scenarios_pass_for_a_fixed_seed() {
        let tester = GameTester::try_new(false);
        for scenario in catalog_scenarios() {
            let summary = tester.run_plan(&scenario.plan, 1337);
            assert!(summary.error.is_none(), "{}: {:?}", scenario.key, summary.error);
            for expectation in &scenario.plan.expectations {
                expectation
                    .evaluate(&summary)
                    .unwrap_or_else(|err| panic!("{}: {err:#}", scenario.key));
            }
        }
    }
}
