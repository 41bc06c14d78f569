//! Tile effects applied once movement halts.
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::ScoringConfig;
use crate::ledger::ScoreLedger;
use crate::player::Player;

/// Where the turn goes after an effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "next", rename_all = "snake_case")]
pub enum EffectOutcome {
    ResumeMovement { steps: u8 },
    EndTurn,
    GameOver,
}

/// Result of scoring a question answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerResolution {
    pub points: u32,
    pub power_up_consumed: bool,
    pub outcome: EffectOutcome,
}

/// Result of a trap knock-back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrapResolution {
    pub landed_on: usize,
    pub knocked_back: usize,
    pub final_position: usize,
}

/// Applies question, treasure, trap and finish effects to a player.
#[derive(Debug, Clone, Default)]
pub struct TileEffectResolver {
    scoring: ScoringConfig,
}

impl TileEffectResolver {
    #[must_use]
    pub const fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    #[must_use]
    pub const fn scoring(&self) -> &ScoringConfig {
        &self.scoring
    }

    /// Score an answer and decide whether movement resumes.
    ///
    /// A requested power-up is spent whether or not the answer is right.
    /// Points are halved only when a use was actually available.
    pub fn resolve_answer(
        &self,
        player: &mut Player,
        is_correct: bool,
        used_power_up: bool,
        pending_steps: u8,
    ) -> AnswerResolution {
        let power_up_consumed = used_power_up && ScoreLedger::consume_power_up(player);
        let points = match (is_correct, power_up_consumed) {
            (false, _) => 0,
            (true, true) => self.scoring.assisted_points(),
            (true, false) => self.scoring.points_per_question,
        };
        if points > 0 {
            ScoreLedger::award(player, points);
        }
        let outcome = if pending_steps > 0 {
            EffectOutcome::ResumeMovement {
                steps: pending_steps,
            }
        } else {
            EffectOutcome::EndTurn
        };
        AnswerResolution {
            points,
            power_up_consumed,
            outcome,
        }
    }

    /// Award the treasure bonus. Returns the bonus granted.
    pub fn resolve_treasure(&self, player: &mut Player) -> u32 {
        ScoreLedger::award(player, self.scoring.treasure_bonus);
        self.scoring.treasure_bonus
    }

    /// Knock the player back `1..=trap_max_back` tiles from the trap.
    pub fn resolve_trap<R: Rng + ?Sized>(&self, player: &mut Player, rng: &mut R) -> TrapResolution {
        let landed_on = player.position();
        let knocked_back = rng.gen_range(1..=self.scoring.trap_max_back.max(1));
        let final_position = landed_on.saturating_sub(knocked_back);
        player.set_position(final_position);
        TrapResolution {
            landed_on,
            knocked_back,
            final_position,
        }
    }

    /// Mark the player as the winner. Always ends the game.
    pub fn resolve_finish(player: &mut Player) -> EffectOutcome {
        player.mark_finished();
        EffectOutcome::GameOver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn correct_answer_scores_full_or_half() {
        let resolver = TileEffectResolver::default();
        let mut player = Player::new("p", "P", 0, 1);

        let plain = resolver.resolve_answer(&mut player, true, false, 0);
        assert_eq!(plain.points, 10);
        assert_eq!(plain.outcome, EffectOutcome::EndTurn);

        let assisted = resolver.resolve_answer(&mut player, true, true, 2);
        assert_eq!(assisted.points, 5);
        assert!(assisted.power_up_consumed);
        assert_eq!(assisted.outcome, EffectOutcome::ResumeMovement { steps: 2 });
        assert_eq!(player.score(), 15);

        let no_uses = resolver.resolve_answer(&mut player, true, true, 0);
        assert!(!no_uses.power_up_consumed);
        assert_eq!(no_uses.points, 10);
        assert_eq!(player.calculator_uses_left(), 0);
    }

    #[test]
    fn wrong_answer_still_spends_power_up() {
        let resolver = TileEffectResolver::default();
        let mut player = Player::new("p", "P", 20, 2);
        let res = resolver.resolve_answer(&mut player, false, true, 0);
        assert_eq!(res.points, 0);
        assert!(res.power_up_consumed);
        assert_eq!(player.calculator_uses_left(), 1);
        assert_eq!(player.score(), 20);
    }

    #[test]
    fn trap_knock_back_stays_in_range() {
        let resolver = TileEffectResolver::default();
        let mut rng = SmallRng::seed_from_u64(13);
        for start in 0..12 {
            let mut player = Player::default().at_position(start);
            let res = resolver.resolve_trap(&mut player, &mut rng);
            assert!((1..=3).contains(&res.knocked_back));
            assert_eq!(res.final_position, start.saturating_sub(res.knocked_back));
            assert_eq!(player.position(), res.final_position);
        }
    }

    #[test]
    fn treasure_and_finish() {
        let resolver = TileEffectResolver::default();
        let mut player = Player::default();
        assert_eq!(resolver.resolve_treasure(&mut player), 10);
        assert_eq!(player.score(), 10);
        assert_eq!(
            TileEffectResolver::resolve_finish(&mut player),
            EffectOutcome::GameOver
        );
        assert!(player.is_finished());
    }
}
