//! Trajectory-projecting opponent.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use tracing::trace;

use crate::physics::{reflect_into, Reflection};
use crate::types::{AiKind, Ball, Config, Intent, Side};

use super::{CourtView, Strategy};

/// Where the ball will be when it reaches the collision plane on `side`,
/// with wall bounces folded in. `None` while the ball has no horizontal
/// speed.
pub fn project_contact(ball: &Ball, side: Side, config: &Config) -> Option<Reflection> {
    if ball.vel.x == 0 {
        return None;
    }
    let distance = f64::from(config.collision_plane(side) - ball.pos.x);
    let rise = distance * f64::from(ball.vel.y) / f64::from(ball.vel.x);
    let unbounded = ball.pos.y + rise.round() as i32;
    Some(reflect_into(unbounded, config.ball_min_y(), config.ball_max_y()))
}

/// Aims at the projected contact point, recomputing only when the ball
/// changes horizontal direction.
///
/// The aim lands on a random spot of the paddle so that the return angle
/// varies and the opponent stays beatable.
#[derive(Debug, Clone)]
pub struct Predictive {
    seed: u64,
    rng: Pcg32,
    /// Sign of the ball's x velocity when the target was last chosen
    ball_dir: i32,
    /// Paddle top edge the strategy steers toward
    target_y: Option<i32>,
}

impl Predictive {
    pub fn new(seed: u64) -> Self {
        Predictive {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            ball_dir: 0,
            target_y: None,
        }
    }

    /// Current cached paddle target, if one was chosen yet
    pub fn target(&self) -> Option<i32> {
        self.target_y
    }

    fn aim(&mut self, side: Side, view: &CourtView<'_>) -> i32 {
        let config = view.config;
        let Some(contact) = project_contact(view.ball, side, config) else {
            return config.paddle_rest_y();
        };
        // Smallest paddle y that still intercepts, then a random offset
        // across the rest of the interception band
        let min_y = contact.pos - config.paddle_height + 1;
        let target = min_y + self.rng.random_range(0..config.hit_span());
        trace!(?side, contact = contact.pos, bounces = contact.bounces, target, "ai target");
        target
    }
}

impl Strategy for Predictive {
    fn decide(&mut self, side: Side, view: &CourtView<'_>) -> Intent {
        let config = view.config;
        let dir = view.ball.vel.x.signum();

        if dir == 0 {
            self.ball_dir = 0;
            self.target_y = Some(config.paddle_rest_y());
        } else if dir != self.ball_dir {
            self.ball_dir = dir;
            let incoming = match side {
                Side::Left => dir < 0,
                Side::Right => dir > 0,
            };
            self.target_y = Some(if incoming {
                self.aim(side, view)
            } else {
                config.paddle_rest_y()
            });
        }

        let target = self.target_y.unwrap_or_else(|| config.paddle_rest_y());
        Intent::toward(view.paddle_y(side), target)
    }

    fn reset(&mut self) {
        *self = Predictive::new(self.seed);
    }

    fn kind(&self) -> AiKind {
        AiKind::Predictive
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::Physics;
    use crate::types::{Paddle, Vec2};

    fn view<'a>(ball: &'a Ball, paddles: &'a [Paddle; 2], config: &'a Config) -> CourtView<'a> {
        CourtView {
            ball,
            paddles,
            config,
        }
    }

    #[test]
    fn test_projection_folds_in_bounces() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 100), Vec2::new(5, -5));

        // 200 px to the right plane at slope -1 puts the raw y at -100
        let contact = project_contact(&ball, Side::Right, &config).unwrap();
        assert_eq!(contact, Reflection { pos: 188, bounces: 1 });
    }

    #[test]
    fn test_vertical_ball_has_no_projection() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 100), Vec2::new(0, 5));
        assert_eq!(project_contact(&ball, Side::Left, &config), None);
    }

    #[test]
    fn test_retreats_to_rest_when_ball_moves_away() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 60), Vec2::new(-5, 5));
        let paddles = [Paddle::new(44), Paddle::new(config.paddle_rest_y())];
        let mut ai = Predictive::new(1);

        assert_eq!(ai.decide(Side::Right, &view(&ball, &paddles, &config)), Intent::Hold);
        assert_eq!(ai.target(), Some(config.paddle_rest_y()));

        let paddles = [Paddle::new(44), Paddle::new(44)];
        assert_eq!(ai.decide(Side::Right, &view(&ball, &paddles, &config)), Intent::Down);
    }

    #[test]
    fn test_zero_velocity_defaults_to_rest() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 60), Vec2::new(0, 5));
        let paddles = [Paddle::new(44), Paddle::new(44)];
        let mut ai = Predictive::new(1);

        ai.decide(Side::Left, &view(&ball, &paddles, &config));
        assert_eq!(ai.target(), Some(config.paddle_rest_y()));
    }

    #[test]
    fn test_aim_always_intercepts() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 150), Vec2::new(-5, 3));
        let paddles = [Paddle::new(44), Paddle::new(44)];
        let contact = project_contact(&ball, Side::Left, &config).unwrap().pos;

        for seed in 0..100 {
            let mut ai = Predictive::new(seed);
            ai.decide(Side::Left, &view(&ball, &paddles, &config));
            let target = ai.target().unwrap();
            assert!(
                Physics::paddle_covers(target, contact, &config),
                "seed {seed}: target {target} misses contact {contact}"
            );
        }
    }

    #[test]
    fn test_target_cached_until_direction_changes() {
        let config = Config::default();
        let mut ball = Ball::new(Vec2::new(240, 150), Vec2::new(5, 3));
        let paddles = [Paddle::new(44), Paddle::new(44)];
        let mut ai = Predictive::new(9);

        ai.decide(Side::Right, &view(&ball, &paddles, &config));
        let first = ai.target();

        // Same direction, different position: no recomputation
        ball.pos = Vec2::new(300, 60);
        ball.vel.y = -5;
        ai.decide(Side::Right, &view(&ball, &paddles, &config));
        assert_eq!(ai.target(), first);

        // Reversal resets to the rest position
        ball.vel.x = -5;
        ai.decide(Side::Right, &view(&ball, &paddles, &config));
        assert_eq!(ai.target(), Some(config.paddle_rest_y()));
    }

    #[test]
    fn test_reset_replays_same_aims() {
        let config = Config::default();
        let ball = Ball::new(Vec2::new(240, 150), Vec2::new(5, 3));
        let paddles = [Paddle::new(44), Paddle::new(44)];
        let mut ai = Predictive::new(42);

        ai.decide(Side::Right, &view(&ball, &paddles, &config));
        let first = ai.target();
        ai.reset();
        assert_eq!(ai.target(), None);
        ai.decide(Side::Right, &view(&ball, &paddles, &config));
        assert_eq!(ai.target(), first);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn projection_terminates_in_bounds(
                x in 20i32..=440,
                y in 44i32..=300,
                vx in prop_oneof![-16i32..=-1, 1i32..=16],
                vy in -16i32..=16,
            ) {
                let config = Config::default();
                let ball = Ball::new(Vec2::new(x, y), Vec2::new(vx, vy));
                let side = if vx > 0 { Side::Right } else { Side::Left };

                let contact = project_contact(&ball, side, &config).unwrap();

                prop_assert!(contact.pos >= config.ball_min_y());
                prop_assert!(contact.pos <= config.ball_max_y());

                // Each bounce removes one full court span of travel
                let span = config.ball_max_y() - config.ball_min_y();
                let dx = (config.collision_plane(side) - x).abs();
                let travel = (dx * vy.abs() + vx.abs() - 1) / vx.abs() + 1;
                prop_assert!(contact.bounces <= (travel / span) as u32 + 1);
            }
        }
    }
}
