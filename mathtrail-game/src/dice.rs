//! Die rolls and the cosmetic spin animation.
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

use crate::config::DiceConfig;
use crate::rng::CountingRng;
use rand::rngs::SmallRng;

/// Anything that can produce a die face for the turn engine.
pub trait DiceSource {
    /// Roll one die with `faces` sides, returning a value in `1..=faces`.
    fn roll(&mut self, faces: u8) -> u8;
}

/// Uniform die roll over `[1, faces]`.
pub struct DiceRoller;

impl DiceRoller {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R, faces: u8) -> u8 {
        rng.gen_range(1..=faces.max(1))
    }
}

/// Dice backed by the session's seeded `dice` stream.
#[derive(Debug, Clone)]
pub struct SeededDice {
    rng: CountingRng<SmallRng>,
}

impl SeededDice {
    #[must_use]
    pub fn from_user_seed(seed: u64) -> Self {
        Self {
            rng: CountingRng::from_stream(seed, b"dice"),
        }
    }

    #[must_use]
    pub const fn draws(&self) -> u64 {
        self.rng.draws()
    }
}

impl DiceSource for SeededDice {
    fn roll(&mut self, faces: u8) -> u8 {
        DiceRoller::roll(&mut self.rng, faces)
    }
}

/// Pre-recorded rolls, replayed in order.
///
/// Values are clamped into `1..=faces`. Once the script runs out every roll
/// returns 1.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    rolls: VecDeque<u8>,
}

impl ScriptedDice {
    pub fn new(rolls: impl IntoIterator<Item = u8>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
        }
    }

    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }
}

impl DiceSource for ScriptedDice {
    fn roll(&mut self, faces: u8) -> u8 {
        self.rolls.pop_front().unwrap_or(1).clamp(1, faces.max(1))
    }
}

/// One displayed face during the spin animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpinFrame {
    pub at: Duration,
    pub face: u8,
}

/// Display-only sequence of faces shown before the real roll settles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceSpin {
    pub frames: Vec<SpinFrame>,
    pub settled: u8,
}

impl DiceSpin {
    /// Build the frames for a roll that settles on `settled`.
    ///
    /// Frames are drawn from `cosmetic`, which must not be a gameplay
    /// stream. The last frame always shows the settled face.
    pub fn animate<R: Rng + ?Sized>(cfg: &DiceConfig, settled: u8, cosmetic: &mut R) -> Self {
        let frame_ms = cfg.spin_frame_ms.max(1);
        let count = cfg.spin_duration_ms / frame_ms;
        let mut frames: Vec<SpinFrame> = (0..count)
            .map(|i| SpinFrame {
                at: Duration::from_millis(i * frame_ms),
                face: DiceRoller::roll(cosmetic, cfg.faces),
            })
            .collect();
        frames.push(SpinFrame {
            at: cfg.spin_duration(),
            face: settled,
        });
        Self { frames, settled }
    }

    #[must_use]
    pub const fn settled(&self) -> u8 {
        self.settled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn seeded_dice_stay_in_range_and_replay() {
        let mut a = SeededDice::from_user_seed(42);
        let mut b = SeededDice::from_user_seed(42);
        for _ in 0..200 {
            let left = a.roll(6);
            assert!((1..=6).contains(&left));
            assert_eq!(left, b.roll(6));
        }
        assert!(a.draws() >= 200);
    }

    #[test]
    fn scripted_dice_clamp_and_default_to_one() {
        let mut dice = ScriptedDice::new([3, 9, 0]);
        assert_eq!(dice.roll(6), 3);
        assert_eq!(dice.roll(6), 6);
        assert_eq!(dice.roll(6), 1);
        assert_eq!(dice.remaining(), 0);
        assert_eq!(dice.roll(6), 1);
    }

    #[test]
    fn spin_ends_on_settled_face() {
        let cfg = DiceConfig::default();
        let mut cosmetic = SmallRng::seed_from_u64(9);
        let spin = DiceSpin::animate(&cfg, 4, &mut cosmetic);
        assert_eq!(spin.frames.len(), 31);
        assert_eq!(spin.frames.last().map(|f| f.face), Some(4));
        assert_eq!(spin.settled(), 4);
        assert!(spin.frames.iter().all(|f| (1..=6).contains(&f.face)));
        assert_eq!(spin.frames[1].at, Duration::from_millis(50));
    }
}
