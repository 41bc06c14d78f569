//! Board layout and constrained random placement of special tiles.
//!
//! Special tiles are placed in priority order (questions, then treasures,
//! then traps). Each set is drawn by shuffling the free interior indices and
//! greedily accepting an index only when it keeps the set's minimum gap.
//! A set that cannot be completed within the attempt budget is filled
//! without the gap rule, so generation always terminates with a board of the
//! requested length.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::config::BoardConfig;
use crate::constants::{MIN_BOARD_LENGTH, PATH_COLUMNS, PATH_MARGIN, PATH_SPAN};

/// Gameplay type of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TileKind {
    Start,
    #[default]
    Normal,
    Question,
    Treasure,
    Trap,
    Finish,
}

impl TileKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Start => "START",
            Self::Normal => "NORMAL",
            Self::Question => "QUESTION",
            Self::Treasure => "TREASURE",
            Self::Trap => "TRAP",
            Self::Finish => "FINISH",
        }
    }

    /// Whether the tile triggers anything when landed on.
    #[must_use]
    pub const fn is_special(self) -> bool {
        matches!(self, Self::Question | Self::Treasure | Self::Trap)
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drawing position of a tile, in percent of the board area.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct PathCoord {
    pub x: f32,
    pub y: f32,
}

/// One addressable cell of the board path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tile {
    pub index: usize,
    pub kind: TileKind,
    pub coord: PathCoord,
}

/// How the special tiles of a board were placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Every set honoured its minimum gap.
    Constrained,
    /// At least one set was filled without the gap rule.
    Fallback,
}

/// Immutable ordered sequence of tiles for one session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    tiles: Vec<Tile>,
    placement: Placement,
}

impl Board {
    /// Build a board from explicit tile kinds.
    ///
    /// The first tile is forced to `Start` and the last to `Finish`; boards
    /// shorter than two tiles are padded.
    #[must_use]
    pub fn from_kinds(kinds: &[TileKind]) -> Self {
        let length = kinds.len().max(MIN_BOARD_LENGTH);
        let coords = path_coords(length);
        let tiles = coords
            .into_iter()
            .enumerate()
            .map(|(index, coord)| {
                let kind = if index == 0 {
                    TileKind::Start
                } else if index == length - 1 {
                    TileKind::Finish
                } else {
                    kinds.get(index).copied().unwrap_or_default()
                };
                Tile { index, kind, coord }
            })
            .collect();
        Self {
            tiles,
            placement: Placement::Constrained,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Construction pads every board to a start and a finish tile, so this
    /// only reports that invariant.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Index of the finish tile.
    #[must_use]
    pub fn last_index(&self) -> usize {
        self.tiles.len().saturating_sub(1)
    }

    #[must_use]
    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    #[must_use]
    pub fn tile(&self, index: usize) -> Option<&Tile> {
        self.tiles.get(index)
    }

    /// Kind of the tile at `index`; out-of-range indices read as `Normal`.
    #[must_use]
    pub fn kind_at(&self, index: usize) -> TileKind {
        self.tiles.get(index).map_or(TileKind::Normal, |tile| tile.kind)
    }

    /// Indices of every tile of `kind`, ascending.
    #[must_use]
    pub fn indices_of(&self, kind: TileKind) -> Vec<usize> {
        self.tiles
            .iter()
            .filter(|tile| tile.kind == kind)
            .map(|tile| tile.index)
            .collect()
    }

    #[must_use]
    pub fn count(&self, kind: TileKind) -> usize {
        self.tiles.iter().filter(|tile| tile.kind == kind).count()
    }

    #[must_use]
    pub const fn placement(&self) -> Placement {
        self.placement
    }

    /// Smallest index distance between two tiles of `kind`, if there are two.
    #[must_use]
    pub fn min_gap(&self, kind: TileKind) -> Option<usize> {
        self.indices_of(kind)
            .windows(2)
            .map(|pair| pair[1] - pair[0])
            .min()
    }
}

/// Produces boards from a [`BoardConfig`].
#[derive(Debug, Clone, Default)]
pub struct BoardGenerator {
    cfg: BoardConfig,
}

struct SetRule {
    kind: TileKind,
    count: usize,
    gap: usize,
}

impl BoardGenerator {
    #[must_use]
    pub const fn new(cfg: BoardConfig) -> Self {
        Self { cfg }
    }

    #[must_use]
    pub const fn config(&self) -> &BoardConfig {
        &self.cfg
    }

    /// Generate a board of the configured length.
    pub fn generate_default<R: Rng + ?Sized>(&self, rng: &mut R) -> Board {
        self.generate(self.cfg.length, rng)
    }

    /// Generate a board of `length` tiles. Never fails.
    pub fn generate<R: Rng + ?Sized>(&self, length: usize, rng: &mut R) -> Board {
        let length = length.max(MIN_BOARD_LENGTH);
        let mut kinds = vec![TileKind::Normal; length];
        let mut claimed: BTreeSet<usize> = BTreeSet::new();
        let mut placement = Placement::Constrained;

        let rules = [
            SetRule {
                kind: TileKind::Question,
                count: self.cfg.question_tiles,
                gap: self.cfg.question_gap,
            },
            SetRule {
                kind: TileKind::Treasure,
                count: self.cfg.treasure_tiles,
                gap: self.cfg.treasure_gap,
            },
            SetRule {
                kind: TileKind::Trap,
                count: self.cfg.trap_tiles,
                gap: self.cfg.trap_gap,
            },
        ];

        for rule in &rules {
            let free: Vec<usize> = (1..length - 1)
                .filter(|index| !claimed.contains(index))
                .collect();
            let chosen = match self.place_with_gap(&free, rule, rng) {
                Some(chosen) => chosen,
                None => {
                    log::warn!(
                        "{} placement exhausted {} attempts; filling without gap rule",
                        rule.kind,
                        self.cfg.max_placement_attempts
                    );
                    placement = Placement::Fallback;
                    fill_unconstrained(&free, rule.count, rng)
                }
            };
            for index in chosen {
                kinds[index] = rule.kind;
                claimed.insert(index);
            }
        }

        let mut board = Board::from_kinds(&kinds);
        board.placement = placement;
        board
    }

    fn place_with_gap<R: Rng + ?Sized>(
        &self,
        free: &[usize],
        rule: &SetRule,
        rng: &mut R,
    ) -> Option<Vec<usize>> {
        if rule.count == 0 {
            return Some(Vec::new());
        }
        if rule.count > free.len() {
            return None;
        }
        let mut candidates = free.to_vec();
        for _ in 0..self.cfg.max_placement_attempts {
            candidates.shuffle(rng);
            let mut accepted: Vec<usize> = Vec::with_capacity(rule.count);
            for &candidate in &candidates {
                if accepted
                    .iter()
                    .all(|&existing| existing.abs_diff(candidate) >= rule.gap)
                {
                    accepted.push(candidate);
                    if accepted.len() == rule.count {
                        return Some(accepted);
                    }
                }
            }
        }
        None
    }
}

fn fill_unconstrained<R: Rng + ?Sized>(free: &[usize], count: usize, rng: &mut R) -> Vec<usize> {
    free.choose_multiple(rng, count.min(free.len()))
        .copied()
        .collect()
}

/// Snake-pattern drawing coordinates, six tiles per row, bottom to top.
#[must_use]
pub fn path_coords(length: usize) -> Vec<PathCoord> {
    let rows = length.div_ceil(PATH_COLUMNS).max(1);
    let row_step = if rows > 1 {
        PATH_SPAN / (rows - 1) as f32
    } else {
        0.0
    };
    let col_step = PATH_SPAN / (PATH_COLUMNS - 1) as f32;
    (0..length)
        .map(|index| {
            let row = index / PATH_COLUMNS;
            let col = index % PATH_COLUMNS;
            let x = if row % 2 == 0 {
                PATH_MARGIN + col as f32 * col_step
            } else {
                PATH_MARGIN + PATH_SPAN - col as f32 * col_step
            };
            let y = PATH_MARGIN + PATH_SPAN - row as f32 * row_step;
            PathCoord { x, y }
        })
        .collect()
}
