//! Slot-machine persona roll.
//!
//! The core only produces the frame sequence; the front end decides how fast
//! to play it back.

use std::time::Duration;

use rand::Rng;

/// Delay between two highlighted frames.
pub const ROLL_TICK: Duration = Duration::from_millis(80);
/// Highlighted frames before the final pick is shown.
pub const ROLL_FRAMES: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roll {
    frames: Vec<usize>,
    winner: usize,
}

impl Roll {
    /// Spin over `len` slots. Returns `None` when there is nothing to pick.
    pub fn spin<R: Rng + ?Sized>(len: usize, rng: &mut R) -> Option<Self> {
        if len == 0 {
            return None;
        }
        let start = rng.random_range(0..len);
        let frames = (0..ROLL_FRAMES).map(|step| (start + step) % len).collect();
        let winner = rng.random_range(0..len);
        Some(Self { frames, winner })
    }

    /// Indices highlighted one per tick, each one past the previous (wrapping).
    #[must_use]
    pub fn frames(&self) -> &[usize] {
        &self.frames
    }

    #[must_use]
    pub fn winner(&self) -> usize {
        self.winner
    }
}
