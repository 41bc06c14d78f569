//! Centralized balance and tuning constants for Math Trail game logic.
//!
//! These values are the defaults behind [`crate::GameConfig`]. Keeping them
//! together means gameplay tuning lives in reviewed code, while hosts can
//! still override individual values through a JSON config.

// Board layout -------------------------------------------------------------
pub const BOARD_LENGTH: usize = 40;
pub const QUESTION_TILE_COUNT: usize = 10;
pub const TREASURE_TILE_COUNT: usize = 4;
pub const TRAP_TILE_COUNT: usize = 3;
pub const QUESTION_MIN_GAP: usize = 3;
pub const TREASURE_MIN_GAP: usize = 7;
pub const TRAP_MIN_GAP: usize = 10;
pub const MAX_PLACEMENT_ATTEMPTS: u32 = 500;
pub const MIN_BOARD_LENGTH: usize = 2;

// Path geometry (percent of the drawing area) -------------------------------
pub(crate) const PATH_COLUMNS: usize = 6;
pub(crate) const PATH_MARGIN: f32 = 15.0;
pub(crate) const PATH_SPAN: f32 = 70.0;

// Dice ---------------------------------------------------------------------
pub const DIE_FACES: u8 = 6;
pub const DICE_SPIN_DURATION_MS: u64 = 1_500;
pub const DICE_SPIN_FRAME_MS: u64 = 50;

// Scoring ------------------------------------------------------------------
pub const POINTS_PER_QUESTION: u32 = 10;
pub const TREASURE_BONUS: u32 = 10;
pub const CALCULATOR_ALLOWANCE: u8 = 2;
pub const TRAP_MAX_BACK: usize = 3;

// Pacing -------------------------------------------------------------------
pub const STEP_DELAY_MS: u64 = 450;
pub const EVENT_DELAY_MS: u64 = 600;

// Questions ----------------------------------------------------------------
pub const FALLBACK_QUESTION_ID: &str = "fallback";
pub const FALLBACK_QUESTION_PROMPT: &str = "1 + 1";
pub const FALLBACK_QUESTION_ANSWER: i64 = 2;
pub const FALLBACK_QUESTION_OPTIONS: [i64; 4] = [1, 2, 3, 4];
pub(crate) const DRILL_OPERAND_MAX: i64 = 20;

// Seats --------------------------------------------------------------------
pub(crate) const DEFAULT_PLAYER_ID: &str = "player-1";
pub(crate) const DEFAULT_PLAYER_NAME: &str = "Player 1";
