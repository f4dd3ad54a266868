//! Opponent strategies.
//!
//! Every strategy answers one question per tick: which way should the paddle
//! on `side` move? Strategies may keep memory between ticks; it is owned by
//! the instance and cleared by [`Strategy::reset`].

mod predictive;
mod reactive;

pub use predictive::{project_contact, Predictive};
pub use reactive::Reactive;

use crate::types::{AiKind, Ball, Config, Intent, Paddle, Side};

/// Read-only state a strategy decides from
#[derive(Debug, Copy, Clone)]
pub struct CourtView<'a> {
    pub ball: &'a Ball,
    pub paddles: &'a [Paddle; 2],
    pub config: &'a Config,
}

impl CourtView<'_> {
    pub fn paddle_y(&self, side: Side) -> i32 {
        self.paddles[side.index()].y
    }
}

/// Paddle controller for a computer opponent
pub trait Strategy: Send {
    /// Direction to move the paddle on `side` this tick
    fn decide(&mut self, side: Side, view: &CourtView<'_>) -> Intent;

    /// Clear per-match memory
    fn reset(&mut self) {}

    fn kind(&self) -> AiKind;
}

/// Instantiate the strategy for an opponent selector
pub fn build(kind: AiKind, seed: u64) -> Box<dyn Strategy> {
    match kind {
        AiKind::Reactive => Box::new(Reactive),
        AiKind::Predictive => Box::new(Predictive::new(seed)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_matches_kind() {
        assert_eq!(build(AiKind::Reactive, 0).kind(), AiKind::Reactive);
        assert_eq!(build(AiKind::Predictive, 0).kind(), AiKind::Predictive);
    }
}
