//! Match manager: lives and score bookkeeping around the per-tick physics.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use tracing::{debug, info};

use crate::control::ControlRouter;
use crate::error::ConfigError;
use crate::physics::Physics;
use crate::types::*;

/// How a match is won or lost
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    /// Both sides human or both AI; each side has a life pool
    Lives,
    /// One human against one AI; the human scores until their first miss
    ScoreTracked { human: Side },
}

impl Mode {
    pub fn for_setup(setup: &MatchSetup) -> Mode {
        match setup.human_vs_ai() {
            Some(human) => Mode::ScoreTracked { human },
            None => Mode::Lives,
        }
    }
}

/// What one tick produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TickReport {
    pub outcome: RoundOutcome,
    /// Hits and losses in the order they happened
    pub events: Vec<Event>,
}

/// A running match: entity state, rules and both paddles' drivers
pub struct Game {
    pub config: Config,
    pub setup: MatchSetup,
    pub tick: Tick,
    pub ball: Ball,
    pub paddles: [Paddle; 2],
    mode: Mode,
    lives: Option<[u8; 2]>,
    score: Option<u32>,
    outcome: RoundOutcome,
    router: ControlRouter,
    rng: Pcg32,
}

impl Game {
    /// Set up a match and serve the first ball
    pub fn new(config: Config, setup: MatchSetup) -> Result<Self, ConfigError> {
        config.validate()?;

        let start_y = config.paddle_start_y();
        let mut game = Game {
            config,
            setup,
            tick: 0,
            ball: Ball::new(config.serve_position(), Vec2::zero()),
            paddles: [Paddle::new(start_y), Paddle::new(start_y)],
            mode: Mode::for_setup(&setup),
            lives: None,
            score: None,
            outcome: RoundOutcome::Continuing,
            router: ControlRouter::new(&setup),
            rng: Pcg32::seed_from_u64(setup.seed),
        };
        game.restart();

        info!(
            difficulty = %setup.difficulty,
            left = %setup.left,
            right = %setup.right,
            mode = ?game.mode,
            "match started"
        );
        Ok(game)
    }

    /// Put the match back to its initial state, as for a rematch
    pub fn restart(&mut self) {
        let start_y = self.config.paddle_start_y();
        self.tick = 0;
        self.paddles = [Paddle::new(start_y), Paddle::new(start_y)];
        self.outcome = RoundOutcome::Continuing;
        self.rng = Pcg32::seed_from_u64(self.setup.seed);
        self.router.reset();
        match self.mode {
            Mode::Lives => {
                self.lives = Some([self.config.initial_lives; 2]);
                self.score = None;
            }
            Mode::ScoreTracked { .. } => {
                self.lives = None;
                self.score = Some(0);
            }
        }
        self.reset_ball();
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn lives(&self) -> Option<[u8; 2]> {
        self.lives
    }

    pub fn score(&self) -> Option<u32> {
        self.score
    }

    pub fn outcome(&self) -> RoundOutcome {
        self.outcome
    }

    pub fn is_over(&self) -> bool {
        matches!(self.outcome, RoundOutcome::MatchOver(_))
    }

    /// Ball speed magnitude for this match's difficulty
    pub fn speed(&self) -> i32 {
        self.setup.difficulty.ball_speed()
    }

    /// Advance the match by exactly one tick.
    ///
    /// Once the match is over further calls change nothing.
    pub fn step(&mut self, frame: &InputFrame) -> TickReport {
        if self.is_over() {
            return TickReport {
                outcome: self.outcome,
                events: Vec::new(),
            };
        }

        let mut events = Vec::new();

        self.router
            .route(frame, &self.ball, &mut self.paddles, &self.config);
        let speed = self.speed();
        let step = Physics::step_ball(&mut self.ball, &self.paddles, speed, &self.config);

        if let Some(side) = step.hit {
            events.push(Event::PaddleHit(side));
            self.on_hit(side);
        }

        let outcome = match step.lost {
            Some(side) => {
                events.push(Event::BallLost(side));
                self.on_lost(side)
            }
            None => RoundOutcome::Continuing,
        };

        self.tick += 1;
        self.outcome = outcome;
        TickReport { outcome, events }
    }

    fn on_hit(&mut self, side: Side) {
        if self.setup.controller(side).is_human() {
            if let Some(score) = self.score.as_mut() {
                *score += 1;
            }
        }
    }

    fn on_lost(&mut self, side: Side) -> RoundOutcome {
        info!(?side, tick = self.tick, "ball lost");

        let over = match (self.mode, self.lives.as_mut()) {
            (Mode::Lives, Some(lives)) => {
                let left = &mut lives[side.index()];
                *left = left.saturating_sub(1);
                *left == 0
            }
            (Mode::ScoreTracked { human }, _) if human == side => true,
            _ => {
                if let Some(score) = self.score.as_mut() {
                    *score += self.config.ai_loss_bonus;
                }
                false
            }
        };

        if over {
            info!(loser = ?side, lives = ?self.lives, score = ?self.score, "match over");
            RoundOutcome::MatchOver(side)
        } else {
            self.reset_ball();
            RoundOutcome::RoundLost(side)
        }
    }

    /// Re-center the ball with one of the four diagonal directions
    fn reset_ball(&mut self) {
        let speed = self.speed();
        Physics::serve_ball(&mut self.ball, speed, &self.config, &mut self.rng);
        debug!(vx = self.ball.vel.x, vy = self.ball.vel.y, "ball reset");
    }

    /// Read-only view handed to renderers
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick,
            ball: self.ball.pos,
            paddles: [self.paddles[0].y, self.paddles[1].y],
            lives: self.lives,
            score: self.score,
            outcome: self.outcome,
        }
    }

    /// Final result, available once the match is over
    pub fn result(&self) -> Option<MatchResult> {
        if !self.is_over() {
            return None;
        }
        Some(match self.mode {
            Mode::ScoreTracked { .. } => MatchResult::Score(self.score.unwrap_or_default()),
            Mode::Lives => {
                let [left, right] = self.lives.unwrap_or_default();
                MatchResult::Lives { left, right }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(left: Controller, right: Controller) -> MatchSetup {
        MatchSetup {
            left,
            right,
            ..MatchSetup::default()
        }
    }

    fn human_vs_reactive() -> Game {
        Game::new(
            Config::default(),
            setup(Controller::Human, Controller::Ai(AiKind::Reactive)),
        )
        .unwrap()
    }

    fn duel() -> Game {
        Game::new(
            Config::default(),
            setup(Controller::Human, Controller::Human),
        )
        .unwrap()
    }

    /// Place the ball so that the next tick carries it past `side`'s edge
    fn about_to_lose(game: &mut Game, side: Side) {
        game.ball = match side {
            Side::Left => Ball::new(Vec2::new(2, 100), Vec2::new(-5, 5)),
            Side::Right => Ball::new(Vec2::new(458, 100), Vec2::new(5, 5)),
        };
    }

    #[test]
    fn test_mode_selection() {
        let game = human_vs_reactive();
        assert_eq!(game.mode(), Mode::ScoreTracked { human: Side::Left });
        assert_eq!(game.score(), Some(0));
        assert_eq!(game.lives(), None);

        let game = duel();
        assert_eq!(game.mode(), Mode::Lives);
        assert_eq!(game.lives(), Some([3, 3]));
        assert_eq!(game.score(), None);

        let game = Game::new(
            Config::default(),
            setup(
                Controller::Ai(AiKind::Predictive),
                Controller::Ai(AiKind::Reactive),
            ),
        )
        .unwrap();
        assert_eq!(game.mode(), Mode::Lives);
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        let config = Config {
            width: 50,
            ..Config::default()
        };
        assert!(matches!(
            Game::new(config, MatchSetup::default()),
            Err(ConfigError::InvalidGeometry(_))
        ));
    }

    #[test]
    fn test_first_serve() {
        let game = human_vs_reactive();
        assert_eq!(game.ball.pos, game.config.serve_position());
        assert_eq!(game.ball.vel.x.abs(), 5);
        assert_eq!(game.ball.vel.y.abs(), 5);
        assert_eq!(game.paddles[0].y, 142);
        assert_eq!(game.paddles[1].y, 142);
    }

    #[test]
    fn test_ai_loss_awards_bonus() {
        let mut game = human_vs_reactive();
        about_to_lose(&mut game, Side::Right);

        let report = game.step(&InputFrame::default());

        assert_eq!(report.outcome, RoundOutcome::RoundLost(Side::Right));
        assert_eq!(report.events, vec![Event::BallLost(Side::Right)]);
        assert_eq!(game.score(), Some(3));
        assert!(!game.is_over());
        assert_eq!(game.ball.pos, game.config.serve_position());
        assert_eq!(game.result(), None);
    }

    #[test]
    fn test_human_loss_ends_score_match() {
        let mut game = human_vs_reactive();
        about_to_lose(&mut game, Side::Right);
        game.step(&InputFrame::default());
        about_to_lose(&mut game, Side::Left);

        let report = game.step(&InputFrame::default());

        assert_eq!(report.outcome, RoundOutcome::MatchOver(Side::Left));
        assert_eq!(game.result(), Some(MatchResult::Score(3)));
    }

    #[test]
    fn test_only_human_hits_score() {
        let mut game = human_vs_reactive();
        game.paddles = [Paddle::new(100), Paddle::new(100)];

        // Contact at y 130 on the left plane, centered on the paddle
        game.ball = Ball::new(Vec2::new(23, 127), Vec2::new(-5, 5));
        let report = game.step(&InputFrame::default());
        assert_eq!(report.events, vec![Event::PaddleHit(Side::Left)]);
        assert_eq!(game.score(), Some(1));

        // The reactive AI steps up to 97 first and still covers contact 130
        game.paddles[1] = Paddle::new(100);
        game.ball = Ball::new(Vec2::new(437, 127), Vec2::new(5, 5));
        let report = game.step(&InputFrame::default());
        assert_eq!(report.events, vec![Event::PaddleHit(Side::Right)]);
        assert_eq!(game.paddles[1].y, 97);
        assert_eq!(game.score(), Some(1));
    }

    #[test]
    fn test_lives_run_out() {
        let mut game = duel();

        for expected in [2, 1] {
            about_to_lose(&mut game, Side::Left);
            let report = game.step(&InputFrame::default());
            assert_eq!(report.outcome, RoundOutcome::RoundLost(Side::Left));
            assert_eq!(game.lives(), Some([expected, 3]));
        }

        about_to_lose(&mut game, Side::Left);
        let report = game.step(&InputFrame::default());
        assert_eq!(report.outcome, RoundOutcome::MatchOver(Side::Left));
        assert_eq!(game.lives(), Some([0, 3]));
        assert_eq!(game.result(), Some(MatchResult::Lives { left: 0, right: 3 }));

        // Further steps are inert
        let tick = game.tick;
        let report = game.step(&InputFrame::default());
        assert!(report.events.is_empty());
        assert_eq!(game.tick, tick);
        assert_eq!(game.lives(), Some([0, 3]));
    }

    #[test]
    fn test_ai_duel_keeps_lives() {
        let mut game = Game::new(
            Config::default(),
            setup(
                Controller::Ai(AiKind::Reactive),
                Controller::Ai(AiKind::Reactive),
            ),
        )
        .unwrap();
        about_to_lose(&mut game, Side::Right);
        game.step(&InputFrame::default());
        assert_eq!(game.lives(), Some([3, 2]));
    }

    #[test]
    fn test_restart() {
        let mut game = duel();
        about_to_lose(&mut game, Side::Right);
        game.step(&InputFrame::default());
        game.restart();

        assert_eq!(game.tick, 0);
        assert_eq!(game.lives(), Some([3, 3]));
        assert_eq!(game.outcome(), RoundOutcome::Continuing);
    }

    #[test]
    fn test_same_seed_same_match() {
        let mut a = human_vs_reactive();
        let mut b = human_vs_reactive();
        let up = SideInput {
            up: true,
            ..SideInput::default()
        };

        for tick in 0..2_000u32 {
            let frame = if tick % 97 < 40 {
                InputFrame::new(up, SideInput::default())
            } else {
                InputFrame::default()
            };
            assert_eq!(a.step(&frame), b.step(&frame));
            assert_eq!(a.snapshot(), b.snapshot());
        }
    }

    #[test]
    fn test_snapshot_mirrors_state() {
        let game = duel();
        let snapshot = game.snapshot();
        assert_eq!(snapshot.tick, 0);
        assert_eq!(snapshot.ball, game.ball.pos);
        assert_eq!(snapshot.paddles, [142, 142]);
        assert_eq!(snapshot.lives, Some([3, 3]));
        assert_eq!(snapshot.score, None);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn side_input() -> impl Strategy<Value = SideInput> {
            (any::<bool>(), any::<bool>(), -2i32..=2).prop_map(|(up, down, encoder_delta)| {
                SideInput {
                    up,
                    down,
                    encoder_delta,
                }
            })
        }

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            #[test]
            fn score_never_decreases(
                seed in any::<u64>(),
                inputs in prop::collection::vec(side_input(), 1..400),
            ) {
                let setup = MatchSetup {
                    seed,
                    ..MatchSetup::default()
                };
                let mut game = Game::new(Config::default(), setup).unwrap();
                let mut last = 0;

                for input in inputs {
                    game.step(&InputFrame::new(input, SideInput::default()));
                    let score = game.score().unwrap();
                    prop_assert!(score >= last);
                    last = score;
                }
            }

            #[test]
            fn lives_end_match_exactly_at_zero(
                seed in any::<u64>(),
                inputs in prop::collection::vec((side_input(), side_input()), 1..1500),
            ) {
                let setup = MatchSetup {
                    seed,
                    left: Controller::Human,
                    right: Controller::Human,
                    ..MatchSetup::default()
                };
                let mut game = Game::new(Config::default(), setup).unwrap();
                let mut last = [3u8, 3];

                for (left, right) in inputs {
                    let report = game.step(&InputFrame::new(left, right));
                    let lives = game.lives().unwrap();
                    prop_assert!(lives[0] <= last[0] && lives[1] <= last[1]);
                    let zero = lives.contains(&0);
                    prop_assert_eq!(zero, game.is_over());
                    if let RoundOutcome::MatchOver(side) = report.outcome {
                        prop_assert_eq!(lives[side.index()], 0);
                    }
                    last = lives;
                }
            }
        }
    }
}
