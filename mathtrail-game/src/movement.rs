//! Single-tile movement with landing precedence.
use serde::{Deserialize, Serialize};

use crate::board::{Board, TileKind};
use crate::player::Player;

/// What happened after advancing one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    /// Keep walking.
    Continue { tiles_remaining: u8 },
    /// The roll is used up on a tile with no effect.
    Exhausted,
    /// Reached the finish tile. The finish effect ends the game.
    Finished,
    /// Question tile; movement pauses until it is answered.
    DeferToQuestion { pending_steps: u8 },
    /// Trap on the final step of the roll.
    TrapLanding,
    /// Treasure on the final step of the roll.
    TreasureLanding,
}

pub struct MovementStepper;

impl MovementStepper {
    /// Advance `player` by one tile (clamped at the finish) and classify the
    /// tile reached.
    ///
    /// Precedence is finish, then question, then trap and treasure on the
    /// final step only. Traps and treasures passed mid-roll have no effect.
    pub fn step(board: &Board, player: &mut Player, tiles_remaining: u8) -> StepOutcome {
        let next = (player.position() + 1).min(board.last_index());
        player.set_position(next);
        let after = tiles_remaining.saturating_sub(1);
        let is_final = tiles_remaining <= 1;

        let outcome = match board.kind_at(next) {
            TileKind::Finish => StepOutcome::Finished,
            TileKind::Question => StepOutcome::DeferToQuestion {
                pending_steps: after,
            },
            TileKind::Trap if is_final => StepOutcome::TrapLanding,
            TileKind::Treasure if is_final => StepOutcome::TreasureLanding,
            _ if after == 0 => StepOutcome::Exhausted,
            _ => StepOutcome::Continue {
                tiles_remaining: after,
            },
        };
        log::trace!(
            "{} stepped to {next} ({}) -> {outcome:?}",
            player.id(),
            board.kind_at(next)
        );
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use TileKind::{Normal, Question, Trap, Treasure};

    fn board_with(overrides: &[(usize, TileKind)], length: usize) -> Board {
        let mut kinds = vec![Normal; length];
        for &(index, kind) in overrides {
            kinds[index] = kind;
        }
        Board::from_kinds(&kinds)
    }

    #[test]
    fn finish_wins_over_remaining_steps() {
        let board = board_with(&[], 40);
        let mut player = Player::default().at_position(38);
        assert_eq!(MovementStepper::step(&board, &mut player, 3), StepOutcome::Finished);
        assert_eq!(player.position(), 39);
        assert!(!player.is_finished());
    }

    #[test]
    fn position_is_clamped_at_finish() {
        let board = board_with(&[], 5);
        let mut player = Player::default().at_position(4);
        MovementStepper::step(&board, &mut player, 2);
        assert_eq!(player.position(), 4);
    }

    #[test]
    fn question_defers_with_remaining_steps() {
        let board = board_with(&[(3, Question)], 40);
        let mut player = Player::default().at_position(2);
        assert_eq!(
            MovementStepper::step(&board, &mut player, 4),
            StepOutcome::DeferToQuestion { pending_steps: 3 }
        );
    }

    #[test]
    fn trap_and_treasure_only_fire_on_final_step() {
        let board = board_with(&[(1, Trap), (2, Treasure)], 40);
        let mut player = Player::default();
        assert_eq!(
            MovementStepper::step(&board, &mut player, 3),
            StepOutcome::Continue { tiles_remaining: 2 }
        );
        assert_eq!(
            MovementStepper::step(&board, &mut player, 1),
            StepOutcome::TreasureLanding
        );

        let mut player = Player::default();
        assert_eq!(MovementStepper::step(&board, &mut player, 1), StepOutcome::TrapLanding);
    }

    #[test]
    fn last_normal_step_exhausts_roll() {
        let board = board_with(&[], 40);
        let mut player = Player::default();
        assert_eq!(MovementStepper::step(&board, &mut player, 1), StepOutcome::Exhausted);
    }
}
