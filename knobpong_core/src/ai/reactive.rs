//! Ball-following opponent.

use crate::types::{AiKind, Intent, Side};

use super::{CourtView, Strategy};

/// Follows the ball's current height, no memory
#[derive(Debug, Default, Copy, Clone)]
pub struct Reactive;

impl Strategy for Reactive {
    fn decide(&mut self, side: Side, view: &CourtView<'_>) -> Intent {
        let config = view.config;
        let paddle_middle = view.paddle_y(side) + config.paddle_height / 2 - 1;
        let ball_middle = view.ball.pos.y + config.ball_size / 2 - 1;
        Intent::toward(paddle_middle, ball_middle)
    }

    fn kind(&self) -> AiKind {
        AiKind::Reactive
    }
}
