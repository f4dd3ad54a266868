//! Integer pixel physics for the ball and paddles.
//!
//! The ball moves a whole number of pixels per tick, so a fast ball can jump
//! clean over a paddle face between two ticks. Paddle contact is therefore a
//! swept test against the paddle's collision plane rather than an overlap
//! test, and walls reflect the over-travel instead of clamping it.

use rand::Rng;
use tracing::debug;

use crate::types::*;

/// A coordinate mirrored back into a range
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Reflection {
    pub pos: i32,
    /// How many times the value was mirrored off a boundary
    pub bounces: u32,
}

/// Mirror `value` off `min`/`max` (`2 * boundary - value`) until it lies
/// inside `[min, max]`.
///
/// Every mirroring shrinks the out-of-range distance by `max - min`, so the
/// loop runs at most `|overshoot| / (max - min) + 1` times.
pub fn reflect_into(value: i32, min: i32, max: i32) -> Reflection {
    if min >= max {
        return Reflection {
            pos: value.clamp(min, max),
            bounces: 0,
        };
    }
    let mut pos = value;
    let mut bounces = 0;
    loop {
        if pos < min {
            pos = 2 * min - pos;
        } else if pos > max {
            pos = 2 * max - pos;
        } else {
            return Reflection { pos, bounces };
        }
        bounces += 1;
    }
}

fn round_to_i32(value: f64) -> i32 {
    value.round() as i32
}

/// What happened to the ball during one tick
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct BallStep {
    /// Paddle that returned the ball
    pub hit: Option<Side>,
    /// Side whose outer edge the ball reached
    pub lost: Option<Side>,
}

/// Physics calculations for game simulation
pub struct Physics;

impl Physics {
    /// Move a paddle and keep it between the header band and the bottom edge
    pub fn move_paddle(paddle: &mut Paddle, distance: i32, config: &Config) {
        paddle.y = (paddle.y + distance).clamp(config.paddle_min_y(), config.paddle_max_y());
    }

    /// Advance the ball one tick and resolve walls, paddles and goal edges
    pub fn step_ball(ball: &mut Ball, paddles: &[Paddle; 2], speed: i32, config: &Config) -> BallStep {
        let before = *ball;

        ball.pos.x += ball.vel.x;
        ball.pos.y += ball.vel.y;

        Self::bounce_walls(ball, config);
        let hit = Self::check_paddle_collision(ball, &before, paddles, speed, config);
        let lost = Self::check_edges(ball, config);

        BallStep { hit, lost }
    }

    /// Reflect the ball off the top and bottom walls, keeping the over-travel.
    ///
    /// Returns the number of reflections applied.
    pub fn bounce_walls(ball: &mut Ball, config: &Config) -> u32 {
        let reflection = reflect_into(ball.pos.y, config.ball_min_y(), config.ball_max_y());
        if reflection.bounces > 0 {
            ball.pos.y = reflection.pos;
            if reflection.bounces % 2 == 1 {
                ball.vel.y = -ball.vel.y;
            }
            debug!(y = ball.pos.y, vy = ball.vel.y, "wall hit");
        }
        reflection.bounces
    }

    /// Which collision plane the ball crossed between `prev_x` and `x`.
    ///
    /// Only a crossing from the court side counts, so a ball that already
    /// slipped past a paddle cannot be caught on the following tick.
    pub fn crossed_plane(prev_x: i32, x: i32, config: &Config) -> Option<Side> {
        let left = config.left_plane();
        let right = config.right_plane();
        if x < left && prev_x >= left {
            Some(Side::Left)
        } else if x > right && prev_x <= right {
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Ball y at the instant its path reaches `plane_x`, by linear
    /// interpolation along the pre-tick velocity.
    ///
    /// `None` for a purely vertical ball, which never reaches a plane.
    pub fn contact_y(before: &Ball, plane_x: i32, config: &Config) -> Option<i32> {
        if before.vel.x == 0 {
            return None;
        }
        let t = f64::from(plane_x - before.pos.x) / f64::from(before.vel.x);
        let y = round_to_i32(f64::from(before.pos.y) + t * f64::from(before.vel.y));
        Some(reflect_into(y, config.ball_min_y(), config.ball_max_y()).pos)
    }

    /// Whether a paddle with its top edge at `paddle_y` intercepts a ball
    /// touching the plane at `hit_y`. Both bounds are strict.
    pub fn paddle_covers(paddle_y: i32, hit_y: i32, config: &Config) -> bool {
        paddle_y > hit_y - config.paddle_height && paddle_y < hit_y + config.ball_size
    }

    /// Bounce slope for a hit: zero at the paddle center, growing linearly to
    /// just under `bounce_const` at the extreme edges of the collision span.
    pub fn bounce_direction(paddle_y: i32, hit_y: i32, config: &Config) -> f64 {
        let half_span = f64::from(config.hit_span()) / 2.0;
        let ball_middle = f64::from(hit_y) + f64::from(config.ball_size) / 2.0 - 0.5;
        let paddle_middle = f64::from(paddle_y) + f64::from(config.paddle_height) / 2.0 - 0.5;
        f64::from(config.bounce_const) * (ball_middle - paddle_middle) / half_span
    }

    /// Swept paddle test; on a hit the ball is mirrored about the plane and
    /// sent off at the angle given by where it struck the paddle.
    pub fn check_paddle_collision(
        ball: &mut Ball,
        before: &Ball,
        paddles: &[Paddle; 2],
        speed: i32,
        config: &Config,
    ) -> Option<Side> {
        let side = Self::crossed_plane(before.pos.x, ball.pos.x, config)?;
        let plane = config.collision_plane(side);
        let hit_y = Self::contact_y(before, plane, config)?;
        let paddle_y = paddles[side.index()].y;

        if !Self::paddle_covers(paddle_y, hit_y, config) {
            return None;
        }

        let overshoot = (ball.pos.x - plane).abs();
        let direction = Self::bounce_direction(paddle_y, hit_y, config);

        ball.vel.y = round_to_i32(direction * f64::from(speed));
        ball.pos.y = hit_y + round_to_i32(f64::from(overshoot) * direction);
        ball.pos.x = 2 * plane - ball.pos.x;
        ball.vel.x = -ball.vel.x;

        // The post-contact correction may carry the ball into a wall
        Self::bounce_walls(ball, config);

        debug!(?side, hit_y, paddle_y, vy = ball.vel.y, "paddle hit");
        Some(side)
    }

    /// Clamp a ball that got past a paddle and report the side that missed
    pub fn check_edges(ball: &mut Ball, config: &Config) -> Option<Side> {
        if ball.pos.x < 0 {
            ball.pos.x = 0;
            Some(Side::Left)
        } else if ball.pos.x > config.ball_max_x() {
            ball.pos.x = config.ball_max_x();
            Some(Side::Right)
        } else {
            None
        }
    }

    /// Center the ball and pick one of the four diagonal directions
    pub fn serve_ball<R: Rng + ?Sized>(ball: &mut Ball, speed: i32, config: &Config, rng: &mut R) {
        ball.pos = config.serve_position();
        let vy = if rng.random_bool(0.5) { -speed } else { speed };
        let vx = if rng.random_bool(0.5) { -speed } else { speed };
        ball.vel = Vec2::new(vx, vy);
    }
}
