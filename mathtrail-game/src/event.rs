//! Structured events emitted while a turn resolves.
//!
//! Hosts render from these instead of diffing snapshots. Every event carries
//! the turn it belongs to and a per-turn sequence number, so a replayed
//! session yields the same stream.
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::board::TileKind;

/// Stable identifier for a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId {
    /// One-based turn counter.
    pub turn: u32,
    /// Sequence number within the turn.
    pub seq: u16,
}

impl EventId {
    #[must_use]
    pub const fn new(turn: u32, seq: u16) -> Self {
        Self { turn, seq }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TurnEventKind {
    Rolled {
        value: u8,
    },
    Stepped {
        to: usize,
        tile: TileKind,
    },
    /// A trap or treasure crossed with steps left; no effect.
    PassedThrough {
        at: usize,
        tile: TileKind,
    },
    QuestionAsked {
        question_id: String,
        at: usize,
    },
    QuestionAnswered {
        question_id: String,
        is_correct: bool,
        power_up_consumed: bool,
        points: u32,
    },
    TreasureFound {
        at: usize,
        bonus: u32,
    },
    /// `landed_on` is the trap tile, not the position before the roll.
    TrapSprung {
        landed_on: usize,
        knocked_back: usize,
        final_position: usize,
    },
    Finished {
        at: usize,
    },
    TurnEnded {
        position: usize,
    },
    Exited,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub id: EventId,
    /// Seat index of the player whose turn produced the event.
    pub seat: usize,
    #[serde(flatten)]
    pub kind: TurnEventKind,
}

/// Events of a single turn; most turns fit inline.
pub type TurnLog = SmallVec<[TurnEvent; 8]>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn events_serialize_with_flat_kind_tag() {
        let event = TurnEvent {
            id: EventId::new(3, 1),
            seat: 0,
            kind: TurnEventKind::TrapSprung {
                landed_on: 10,
                knocked_back: 2,
                final_position: 8,
            },
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["kind"], "trap_sprung");
        assert_eq!(json["landed_on"], 10);
        assert_eq!(json["id"]["turn"], 3);
        let back: TurnEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
