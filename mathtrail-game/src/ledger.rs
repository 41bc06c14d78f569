//! Score and power-up bookkeeping.
use crate::player::Player;

/// Sole writer of `score` and `calculator_uses_left`.
pub struct ScoreLedger;

impl ScoreLedger {
    /// Add `amount` to the player's score, saturating at `u32::MAX`.
    pub fn award(player: &mut Player, amount: u32) -> u32 {
        let total = player.score().saturating_add(amount);
        player.set_score(total);
        total
    }

    /// Spend one calculator use. Returns false, changing nothing, when none
    /// are left.
    pub fn consume_power_up(player: &mut Player) -> bool {
        match player.calculator_uses_left().checked_sub(1) {
            Some(left) => {
                player.set_calculator_uses_left(left);
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub const fn total(player: &Player) -> u32 {
        player.score()
    }
}
