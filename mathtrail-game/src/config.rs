//! Engine configuration with serde defaults and validation.
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::constants::{
    BOARD_LENGTH, CALCULATOR_ALLOWANCE, DICE_SPIN_DURATION_MS, DICE_SPIN_FRAME_MS, DIE_FACES,
    EVENT_DELAY_MS, MAX_PLACEMENT_ATTEMPTS, MIN_BOARD_LENGTH, POINTS_PER_QUESTION,
    QUESTION_MIN_GAP, QUESTION_TILE_COUNT, STEP_DELAY_MS, TRAP_MAX_BACK, TRAP_MIN_GAP,
    TRAP_TILE_COUNT, TREASURE_BONUS, TREASURE_MIN_GAP, TREASURE_TILE_COUNT,
};

/// Errors raised when configuration invariants are violated.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} must be at least {min} (got {value})")]
    MinViolation {
        field: &'static str,
        min: u64,
        value: u64,
    },
    #[error("special tiles ({requested}) do not fit inside a board of length {length}")]
    BoardOverfull { requested: usize, length: usize },
    #[error("dice spin frame ({frame_ms}ms) exceeds spin duration ({duration_ms}ms)")]
    SpinFrameTooLong { frame_ms: u64, duration_ms: u64 },
}

/// Errors raised while loading a configuration document.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("config is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameConfig {
    #[serde(default)]
    pub board: BoardConfig,
    #[serde(default)]
    pub dice: DiceConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub pacing: PacingConfig,
}

impl GameConfig {
    /// Parse and validate a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed or violates a config invariant.
    pub fn from_json(json: &str) -> Result<Self, ConfigLoadError> {
        let cfg: Self = serde_json::from_str(json)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check cross-field invariants.
    ///
    /// # Errors
    ///
    /// Returns the first violated invariant.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.board.validate()?;
        self.dice.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}

/// Board shape and special-tile placement rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(default = "BoardConfig::default_length")]
    pub length: usize,
    #[serde(default = "BoardConfig::default_question_tiles")]
    pub question_tiles: usize,
    #[serde(default = "BoardConfig::default_treasure_tiles")]
    pub treasure_tiles: usize,
    #[serde(default = "BoardConfig::default_trap_tiles")]
    pub trap_tiles: usize,
    #[serde(default = "BoardConfig::default_question_gap")]
    pub question_gap: usize,
    #[serde(default = "BoardConfig::default_treasure_gap")]
    pub treasure_gap: usize,
    #[serde(default = "BoardConfig::default_trap_gap")]
    pub trap_gap: usize,
    #[serde(default = "BoardConfig::default_max_placement_attempts")]
    pub max_placement_attempts: u32,
}

impl BoardConfig {
    const fn default_length() -> usize {
        BOARD_LENGTH
    }

    const fn default_question_tiles() -> usize {
        QUESTION_TILE_COUNT
    }

    const fn default_treasure_tiles() -> usize {
        TREASURE_TILE_COUNT
    }

    const fn default_trap_tiles() -> usize {
        TRAP_TILE_COUNT
    }

    const fn default_question_gap() -> usize {
        QUESTION_MIN_GAP
    }

    const fn default_treasure_gap() -> usize {
        TREASURE_MIN_GAP
    }

    const fn default_trap_gap() -> usize {
        TRAP_MIN_GAP
    }

    const fn default_max_placement_attempts() -> u32 {
        MAX_PLACEMENT_ATTEMPTS
    }

    /// Total number of special tiles requested, saturating at `usize::MAX`.
    #[must_use]
    pub const fn special_tiles(&self) -> usize {
        self.question_tiles
            .saturating_add(self.treasure_tiles)
            .saturating_add(self.trap_tiles)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.length < MIN_BOARD_LENGTH {
            return Err(ConfigError::MinViolation {
                field: "board.length",
                min: MIN_BOARD_LENGTH as u64,
                value: self.length as u64,
            });
        }
        let interior = self.length - MIN_BOARD_LENGTH;
        let requested = self.special_tiles();
        if requested > interior {
            return Err(ConfigError::BoardOverfull {
                requested,
                length: self.length,
            });
        }
        if self.max_placement_attempts == 0 {
            return Err(ConfigError::MinViolation {
                field: "board.max_placement_attempts",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            length: Self::default_length(),
            question_tiles: Self::default_question_tiles(),
            treasure_tiles: Self::default_treasure_tiles(),
            trap_tiles: Self::default_trap_tiles(),
            question_gap: Self::default_question_gap(),
            treasure_gap: Self::default_treasure_gap(),
            trap_gap: Self::default_trap_gap(),
            max_placement_attempts: Self::default_max_placement_attempts(),
        }
    }
}

/// Die shape and the cosmetic spin animation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceConfig {
    #[serde(default = "DiceConfig::default_faces")]
    pub faces: u8,
    #[serde(default = "DiceConfig::default_spin_duration_ms")]
    pub spin_duration_ms: u64,
    #[serde(default = "DiceConfig::default_spin_frame_ms")]
    pub spin_frame_ms: u64,
}

impl DiceConfig {
    const fn default_faces() -> u8 {
        DIE_FACES
    }

    const fn default_spin_duration_ms() -> u64 {
        DICE_SPIN_DURATION_MS
    }

    const fn default_spin_frame_ms() -> u64 {
        DICE_SPIN_FRAME_MS
    }

    #[must_use]
    pub const fn spin_duration(&self) -> Duration {
        Duration::from_millis(self.spin_duration_ms)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.faces == 0 {
            return Err(ConfigError::MinViolation {
                field: "dice.faces",
                min: 1,
                value: 0,
            });
        }
        if self.spin_frame_ms == 0 {
            return Err(ConfigError::MinViolation {
                field: "dice.spin_frame_ms",
                min: 1,
                value: 0,
            });
        }
        if self.spin_frame_ms > self.spin_duration_ms && self.spin_duration_ms > 0 {
            return Err(ConfigError::SpinFrameTooLong {
                frame_ms: self.spin_frame_ms,
                duration_ms: self.spin_duration_ms,
            });
        }
        Ok(())
    }
}

impl Default for DiceConfig {
    fn default() -> Self {
        Self {
            faces: Self::default_faces(),
            spin_duration_ms: Self::default_spin_duration_ms(),
            spin_frame_ms: Self::default_spin_frame_ms(),
        }
    }
}

/// Points, bonuses, penalties and the calculator allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "ScoringConfig::default_points_per_question")]
    pub points_per_question: u32,
    #[serde(default = "ScoringConfig::default_treasure_bonus")]
    pub treasure_bonus: u32,
    #[serde(default = "ScoringConfig::default_calculator_allowance")]
    pub calculator_allowance: u8,
    #[serde(default = "ScoringConfig::default_trap_max_back")]
    pub trap_max_back: usize,
}

impl ScoringConfig {
    const fn default_points_per_question() -> u32 {
        POINTS_PER_QUESTION
    }

    const fn default_treasure_bonus() -> u32 {
        TREASURE_BONUS
    }

    const fn default_calculator_allowance() -> u8 {
        CALCULATOR_ALLOWANCE
    }

    const fn default_trap_max_back() -> usize {
        TRAP_MAX_BACK
    }

    /// Points for a correct answer given with calculator help.
    #[must_use]
    pub const fn assisted_points(&self) -> u32 {
        self.points_per_question / 2
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.trap_max_back == 0 {
            return Err(ConfigError::MinViolation {
                field: "scoring.trap_max_back",
                min: 1,
                value: 0,
            });
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_question: Self::default_points_per_question(),
            treasure_bonus: Self::default_treasure_bonus(),
            calculator_allowance: Self::default_calculator_allowance(),
            trap_max_back: Self::default_trap_max_back(),
        }
    }
}

/// How the engine schedules its own continuations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PacingMode {
    /// Every delay collapses to zero; operations run to the next suspension point.
    #[default]
    Instant,
    /// The host runs each scheduled continuation after its delay.
    Paced,
}

/// Cosmetic pacing between steps and effects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default)]
    pub mode: PacingMode,
    #[serde(default = "PacingConfig::default_step_delay_ms")]
    pub step_delay_ms: u64,
    #[serde(default = "PacingConfig::default_event_delay_ms")]
    pub event_delay_ms: u64,
}

impl PacingConfig {
    const fn default_step_delay_ms() -> u64 {
        STEP_DELAY_MS
    }

    const fn default_event_delay_ms() -> u64 {
        EVENT_DELAY_MS
    }

    #[must_use]
    pub const fn paced() -> Self {
        Self {
            mode: PacingMode::Paced,
            step_delay_ms: STEP_DELAY_MS,
            event_delay_ms: EVENT_DELAY_MS,
        }
    }

    #[must_use]
    pub const fn is_instant(&self) -> bool {
        matches!(self.mode, PacingMode::Instant)
    }

    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }

    #[must_use]
    pub const fn event_delay(&self) -> Duration {
        Duration::from_millis(self.event_delay_ms)
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            mode: PacingMode::Instant,
            step_delay_ms: Self::default_step_delay_ms(),
            event_delay_ms: Self::default_event_delay_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.board.length, 40);
        assert_eq!(cfg.board.special_tiles(), 17);
        assert_eq!(cfg.scoring.points_per_question, 10);
        assert_eq!(cfg.scoring.assisted_points(), 5);
        assert_eq!(cfg.scoring.calculator_allowance, 2);
        assert!(cfg.pacing.is_instant());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let cfg = GameConfig::from_json(r#"{ "board": { "length": 30 }, "pacing": { "mode": "paced" } }"#)
            .unwrap();
        assert_eq!(cfg.board.length, 30);
        assert_eq!(cfg.board.question_tiles, 10);
        assert_eq!(cfg.pacing.mode, PacingMode::Paced);
        assert_eq!(cfg.pacing.step_delay_ms, STEP_DELAY_MS);
    }

    #[test]
    fn overfull_board_is_rejected() {
        let err = GameConfig::from_json(r#"{ "board": { "length": 10 } }"#).unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid(ConfigError::BoardOverfull {
                requested: 17,
                length: 10
            })
        ));
    }

    #[test]
    fn huge_tile_counts_saturate_instead_of_wrapping() {
        let err = GameConfig::from_json(
            r#"{ "board": { "question_tiles": 18446744073709551615, "treasure_tiles": 1 } }"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigLoadError::Invalid(ConfigError::BoardOverfull {
                requested: usize::MAX,
                length: 40
            })
        ));
    }

    #[test]
    fn zero_faces_and_trap_range_are_rejected() {
        let mut cfg = GameConfig::default();
        cfg.dice.faces = 0;
        assert!(matches!(
            cfg.validate(),
            Err(ConfigError::MinViolation {
                field: "dice.faces",
                ..
            })
        ));

        let mut cfg = GameConfig::default();
        cfg.scoring.trap_max_back = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn malformed_json_reports_parse_error() {
        let err = GameConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigLoadError::Parse(_)));
        assert!(err.to_string().starts_with("config is not valid JSON"));
    }
}
