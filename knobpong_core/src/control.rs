//! Control router: turns key latches, encoder detents and AI intents into
//! paddle displacement.

use crate::ai::{self, CourtView, Strategy};
use crate::physics::Physics;
use crate::types::*;

/// Last-writer-wins memory of a human side's key direction.
///
/// A key press replaces the latched direction and the paddle keeps moving
/// that way on every tick until another key or the encoder overrides it.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct KeyLatch {
    last: Intent,
}

impl KeyLatch {
    pub fn last(&self) -> Intent {
        self.last
    }

    pub fn reset(&mut self) {
        self.last = Intent::Hold;
    }

    /// Paddle displacement for this tick.
    ///
    /// Encoder movement wins over the keys for the tick and clears the latch.
    /// The right encoder is mirrored so that turning either knob clockwise
    /// moves its paddle away from the player holding it.
    pub fn displacement(&mut self, side: Side, input: SideInput, config: &Config) -> i32 {
        if input.encoder_delta != 0 {
            self.last = Intent::Hold;
            let mirror = match side {
                Side::Left => 1,
                Side::Right => -1,
            };
            return mirror * input.encoder_delta * config.paddle_speed_knob;
        }

        if let Some(intent) = input.key_intent() {
            self.last = intent;
        }
        self.last.sign() * config.paddle_speed_key
    }
}

/// What drives one paddle
pub enum Driver {
    Human(KeyLatch),
    Ai(Box<dyn Strategy>),
}

impl Driver {
    fn for_controller(controller: Controller, seed: u64) -> Self {
        match controller {
            Controller::Human => Driver::Human(KeyLatch::default()),
            Controller::Ai(kind) => Driver::Ai(ai::build(kind, seed)),
        }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, Driver::Human(_))
    }
}

/// Routes one tick of input for both sides
pub struct ControlRouter {
    drivers: [Driver; 2],
}

impl ControlRouter {
    /// Resolve both sides' controllers; AI sides get their own seeded strategy
    pub fn new(setup: &MatchSetup) -> Self {
        ControlRouter {
            drivers: [
                Driver::for_controller(setup.left, setup.seed.wrapping_add(1)),
                Driver::for_controller(setup.right, setup.seed.wrapping_add(2)),
            ],
        }
    }

    pub fn driver(&self, side: Side) -> &Driver {
        &self.drivers[side.index()]
    }

    /// Forget latched keys and AI memory, as at match start
    pub fn reset(&mut self) {
        for driver in &mut self.drivers {
            match driver {
                Driver::Human(latch) => latch.reset(),
                Driver::Ai(strategy) => strategy.reset(),
            }
        }
    }

    /// Per-side displacement for this tick, decided from the pre-move state
    pub fn displacements(
        &mut self,
        frame: &InputFrame,
        ball: &Ball,
        paddles: &[Paddle; 2],
        config: &Config,
    ) -> [i32; 2] {
        let view = CourtView {
            ball,
            paddles,
            config,
        };
        let mut out = [0; 2];
        for side in [Side::Left, Side::Right] {
            out[side.index()] = match &mut self.drivers[side.index()] {
                Driver::Human(latch) => latch.displacement(side, frame.get(side), config),
                Driver::Ai(strategy) => {
                    strategy.decide(side, &view).sign() * config.paddle_speed_key
                }
            };
        }
        out
    }

    /// Decide and apply both paddles' moves, clamped to the court
    pub fn route(
        &mut self,
        frame: &InputFrame,
        ball: &Ball,
        paddles: &mut [Paddle; 2],
        config: &Config,
    ) {
        let moves = self.displacements(frame, ball, paddles, config);
        for (paddle, distance) in paddles.iter_mut().zip(moves) {
            Physics::move_paddle(paddle, distance, config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(up: bool, down: bool) -> SideInput {
        SideInput {
            up,
            down,
            encoder_delta: 0,
        }
    }

    fn knob(delta: i32) -> SideInput {
        SideInput {
            encoder_delta: delta,
            ..SideInput::default()
        }
    }

    #[test]
    fn test_latch_persists_until_overridden() {
        let config = Config::default();
        let mut latch = KeyLatch::default();

        assert_eq!(latch.displacement(Side::Left, keys(false, false), &config), 0);
        assert_eq!(latch.displacement(Side::Left, keys(true, false), &config), -3);
        // No new key: keep moving up
        assert_eq!(latch.displacement(Side::Left, keys(false, false), &config), -3);
        // Both keys at once do not change the latch
        assert_eq!(latch.displacement(Side::Left, keys(true, true), &config), -3);
        assert_eq!(latch.displacement(Side::Left, keys(false, true), &config), 3);
        assert_eq!(latch.last(), Intent::Down);
    }

    #[test]
    fn test_encoder_overrides_and_clears_latch() {
        let config = Config::default();
        let mut latch = KeyLatch::default();

        latch.displacement(Side::Left, keys(false, true), &config);
        let input = SideInput {
            up: true,
            down: false,
            encoder_delta: 2,
        };
        assert_eq!(latch.displacement(Side::Left, input, &config), 6);
        assert_eq!(latch.last(), Intent::Hold);
        assert_eq!(latch.displacement(Side::Left, keys(false, false), &config), 0);
    }

    #[test]
    fn test_right_encoder_is_mirrored() {
        let config = Config::default();
        let mut latch = KeyLatch::default();
        assert_eq!(latch.displacement(Side::Right, knob(1), &config), -3);
        assert_eq!(latch.displacement(Side::Right, knob(-4), &config), 12);
    }

    #[test]
    fn test_route_clamps_to_court() {
        let config = Config::default();
        let setup = MatchSetup {
            left: Controller::Human,
            right: Controller::Human,
            ..MatchSetup::default()
        };
        let mut router = ControlRouter::new(&setup);
        let ball = Ball::new(config.serve_position(), Vec2::new(5, 5));
        let mut paddles = [Paddle::new(config.paddle_min_y() + 1), Paddle::new(config.paddle_max_y() - 1)];
        let frame = InputFrame::new(keys(true, false), keys(false, true));

        router.route(&frame, &ball, &mut paddles, &config);
        assert_eq!(paddles[0].y, config.paddle_min_y());
        assert_eq!(paddles[1].y, config.paddle_max_y());

        // Big encoder spin is clamped too
        let frame = InputFrame::new(knob(100), InputFrame::default().right);
        router.route(&frame, &ball, &mut paddles, &config);
        assert_eq!(paddles[0].y, config.paddle_max_y());
    }

    #[test]
    fn test_ai_side_ignores_raw_input() {
        let config = Config::default();
        let setup = MatchSetup {
            left: Controller::Ai(AiKind::Reactive),
            right: Controller::Human,
            ..MatchSetup::default()
        };
        let mut router = ControlRouter::new(&setup);
        assert!(!router.driver(Side::Left).is_human());
        assert!(router.driver(Side::Right).is_human());

        // Ball level with the paddle middle: the reactive AI holds
        let paddle_y = config.paddle_start_y();
        let ball = Ball::new(Vec2::new(200, paddle_y + 30), Vec2::new(-5, 0));
        let paddles = [Paddle::new(paddle_y), Paddle::new(paddle_y)];
        let frame = InputFrame::new(keys(true, false), keys(true, false));

        let moves = router.displacements(&frame, &ball, &paddles, &config);
        assert_eq!(moves, [0, -3]);
    }
}
