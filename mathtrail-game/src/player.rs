use serde::{Deserialize, Serialize};

use crate::constants::{CALCULATOR_ALLOWANCE, DEFAULT_PLAYER_ID, DEFAULT_PLAYER_NAME};

/// One seat at the board.
///
/// Fields are read-only outside the crate; only the ledger, the movement
/// stepper and the effect resolver change them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    id: String,
    name: String,
    position: usize,
    score: u32,
    calculator_uses_left: u8,
    calculator_allowance: u8,
    is_finished: bool,
}

impl Player {
    /// New player at the start tile with a carried-in score.
    pub fn new(id: impl Into<String>, name: impl Into<String>, score: u32, allowance: u8) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            position: 0,
            score,
            calculator_uses_left: allowance,
            calculator_allowance: allowance,
            is_finished: false,
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub const fn calculator_uses_left(&self) -> u8 {
        self.calculator_uses_left
    }

    /// Uses granted when the player was seated.
    #[must_use]
    pub const fn calculator_allowance(&self) -> u8 {
        self.calculator_allowance
    }

    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.is_finished
    }

    /// Seat the player at `position`, e.g. when restoring a saved game.
    #[must_use]
    pub fn at_position(mut self, position: usize) -> Self {
        self.position = position;
        self
    }

    pub(crate) const fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    pub(crate) const fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    pub(crate) const fn set_calculator_uses_left(&mut self, uses: u8) {
        self.calculator_uses_left = uses;
    }

    pub(crate) const fn mark_finished(&mut self) {
        self.is_finished = true;
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(DEFAULT_PLAYER_ID, DEFAULT_PLAYER_NAME, 0, CALCULATOR_ALLOWANCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_player_starts_at_origin_with_full_allowance() {
        let player = Player::new("p1", "Ada", 30, 2);
        assert_eq!(player.position(), 0);
        assert_eq!(player.score(), 30);
        assert_eq!(player.calculator_uses_left(), 2);
        assert_eq!(player.calculator_allowance(), 2);
        assert!(!player.is_finished());
    }

    #[test]
    fn serde_shape_is_stable() {
        let player = Player::default().at_position(7);
        let json = serde_json::to_value(&player).unwrap();
        assert_eq!(json["position"], 7);
        assert_eq!(json["id"], "player-1");
        let back: Player = serde_json::from_value(json).unwrap();
        assert_eq!(back, player);
    }
}
