//! Core types and constants for the fixed-timestep paddle game engine.
//!
//! All positions are integer pixels measured from the top left corner of the
//! display; velocities are pixels per tick.

use std::fmt;
use std::str::FromStr;

use crate::error::ConfigError;

/// Tick counter type
pub type Tick = u32;

/// Simulation rate. Velocities are defined per tick, so this never changes.
pub const TICK_HZ: u32 = 50;

/// Player/paddle side
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }

    /// Index into per-side arrays (`[left, right]`)
    pub fn index(self) -> usize {
        match self {
            Side::Left => 0,
            Side::Right => 1,
        }
    }
}

/// Per-tick paddle direction produced by a human latch or an AI strategy.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Intent {
    Up,
    #[default]
    Hold,
    Down,
}

impl Intent {
    /// Screen-space sign of the intent (y grows downwards)
    pub fn sign(self) -> i32 {
        match self {
            Intent::Up => -1,
            Intent::Hold => 0,
            Intent::Down => 1,
        }
    }

    /// Steer from `current` toward `target`, holding on equality
    pub fn toward(current: i32, target: i32) -> Intent {
        match target.cmp(&current) {
            std::cmp::Ordering::Less => Intent::Up,
            std::cmp::Ordering::Greater => Intent::Down,
            std::cmp::Ordering::Equal => Intent::Hold,
        }
    }
}

/// Ball speed preset
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Difficulty {
    Easy,
    #[default]
    #[cfg_attr(feature = "serde", serde(alias = "normal"))]
    Medium,
    Hard,
}

impl Difficulty {
    /// Resolve a numeric difficulty id (0 = easy, 1 = medium, 2 = hard)
    pub fn from_id(id: u8) -> Result<Self, ConfigError> {
        match id {
            0 => Ok(Difficulty::Easy),
            1 => Ok(Difficulty::Medium),
            2 => Ok(Difficulty::Hard),
            other => Err(ConfigError::UnknownDifficulty(other.to_string())),
        }
    }

    /// Ball speed magnitude per axis, in pixels per tick
    pub fn ball_speed(self) -> i32 {
        match self {
            Difficulty::Easy => 3,
            Difficulty::Medium => 5,
            Difficulty::Hard => 8,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "normal" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigError::UnknownDifficulty(s.to_string())),
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opponent strategy selector
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum AiKind {
    /// Tracks the ball's current height every tick
    Reactive,
    /// Projects the trajectory to the paddle plane and aims with an offset
    Predictive,
}

impl AiKind {
    /// Resolve an opponent id (0 = reactive, 1 = predictive)
    pub fn from_id(id: u8) -> Result<Self, ConfigError> {
        match id {
            0 => Ok(AiKind::Reactive),
            1 => Ok(AiKind::Predictive),
            other => Err(ConfigError::UnknownOpponent(other.to_string())),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AiKind::Reactive => "reactive",
            AiKind::Predictive => "predictive",
        }
    }
}

impl FromStr for AiKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "reactive" | "dumb" => Ok(AiKind::Reactive),
            "predictive" | "smart" => Ok(AiKind::Predictive),
            _ => Err(ConfigError::UnknownOpponent(s.to_string())),
        }
    }
}

impl fmt::Display for AiKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Who drives a paddle; serialized by name (`human`, `reactive`, ...)
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "String", into = "String"))]
pub enum Controller {
    Human,
    Ai(AiKind),
}

impl Controller {
    pub fn is_human(self) -> bool {
        matches!(self, Controller::Human)
    }
}

impl FromStr for Controller {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "human" | "player" => Ok(Controller::Human),
            other => other.parse().map(Controller::Ai),
        }
    }
}

impl TryFrom<String> for Controller {
    type Error = ConfigError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Controller> for String {
    fn from(controller: Controller) -> Self {
        controller.to_string()
    }
}

impl fmt::Display for Controller {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Controller::Human => f.write_str("human"),
            Controller::Ai(kind) => kind.fmt(f),
        }
    }
}

/// Court geometry and rule constants
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Display width in pixels
    pub width: i32,
    /// Display height in pixels
    pub height: i32,
    /// Height of the lives/score header band, i.e. the top of the court
    pub top: i32,
    pub paddle_width: i32,
    pub paddle_height: i32,
    /// Ball is a square of this side length
    pub ball_size: i32,
    /// How strongly off-center hits steepen the bounce
    pub bounce_const: i32,
    /// Score awarded when the AI misses in a score-tracked match
    pub ai_loss_bonus: u32,
    /// Lives per side in a lives-based match
    pub initial_lives: u8,
    /// Paddle pixels per tick while a key direction is latched
    pub paddle_speed_key: i32,
    /// Paddle pixels per encoder detent
    pub paddle_speed_knob: i32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            width: 480,
            height: 320,
            top: 44,
            paddle_width: 20,
            paddle_height: 80,
            ball_size: 20,
            bounce_const: 2,
            ai_loss_bonus: 3,
            initial_lives: 3,
            paddle_speed_key: 3,
            paddle_speed_knob: 3,
        }
    }
}

impl Config {
    /// Reject geometry in which the ball or a paddle cannot move
    pub fn validate(&self) -> Result<(), ConfigError> {
        let court_height = self.height - self.top;
        if self.top < 0 || self.ball_size <= 0 || self.paddle_height <= 0 {
            return Err(ConfigError::InvalidGeometry(
                "sizes must be positive".to_string(),
            ));
        }
        if court_height <= self.ball_size || court_height < self.paddle_height {
            return Err(ConfigError::InvalidGeometry(format!(
                "court height {court_height} too small for ball {} / paddle {}",
                self.ball_size, self.paddle_height
            )));
        }
        if self.left_plane() >= self.right_plane() {
            return Err(ConfigError::InvalidGeometry(format!(
                "court width {} leaves no room between the paddles",
                self.width
            )));
        }
        Ok(())
    }

    /// Smallest legal ball y
    pub fn ball_min_y(&self) -> i32 {
        self.top
    }

    /// Largest legal ball y
    pub fn ball_max_y(&self) -> i32 {
        self.height - self.ball_size
    }

    /// Largest legal ball x
    pub fn ball_max_x(&self) -> i32 {
        self.width - self.ball_size
    }

    /// Smallest legal paddle y (paddle top edge)
    pub fn paddle_min_y(&self) -> i32 {
        self.top
    }

    /// Largest legal paddle y (paddle top edge)
    pub fn paddle_max_y(&self) -> i32 {
        self.height - self.paddle_height
    }

    /// Ball x at which it touches the left paddle's face
    pub fn left_plane(&self) -> i32 {
        self.paddle_width
    }

    /// Ball x at which it touches the right paddle's face
    pub fn right_plane(&self) -> i32 {
        self.width - self.paddle_width - self.ball_size
    }

    pub fn collision_plane(&self, side: Side) -> i32 {
        match side {
            Side::Left => self.left_plane(),
            Side::Right => self.right_plane(),
        }
    }

    /// Ball spawn position after a reset
    pub fn serve_position(&self) -> Vec2 {
        Vec2::new(
            (self.width - self.ball_size) / 2,
            self.top + (self.height - self.top - self.ball_size) / 2,
        )
    }

    /// Paddle top edge when centered in the court
    pub fn paddle_start_y(&self) -> i32 {
        self.top + (self.height - self.top - self.paddle_height) / 2
    }

    /// Paddle top edge the predictive AI parks at while the ball moves away
    pub fn paddle_rest_y(&self) -> i32 {
        self.top + (self.height - self.top) / 2 - self.paddle_height / 2
    }

    /// Width of the band of paddle positions that still intercept a ball
    pub fn hit_span(&self) -> i32 {
        self.paddle_height + self.ball_size - 1
    }
}

/// Match configuration, fixed for the match's duration
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MatchSetup {
    pub difficulty: Difficulty,
    pub left: Controller,
    pub right: Controller,
    /// Seed for ball serves and AI aim jitter
    pub seed: u64,
}

impl Default for MatchSetup {
    fn default() -> Self {
        MatchSetup {
            difficulty: Difficulty::Medium,
            left: Controller::Human,
            right: Controller::Ai(AiKind::Predictive),
            seed: 0xC0FFEE,
        }
    }
}

impl MatchSetup {
    pub fn controller(&self, side: Side) -> Controller {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }

    /// The human side of a mixed human/AI match, if this is one
    pub fn human_vs_ai(&self) -> Option<Side> {
        match (self.left.is_human(), self.right.is_human()) {
            (true, false) => Some(Side::Left),
            (false, true) => Some(Side::Right),
            _ => None,
        }
    }
}

/// 2D integer vector
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct Vec2 {
    pub x: i32,
    pub y: i32,
}

impl Vec2 {
    pub fn new(x: i32, y: i32) -> Self {
        Vec2 { x, y }
    }

    pub fn zero() -> Self {
        Vec2 { x: 0, y: 0 }
    }
}

/// Paddle state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Paddle {
    /// Y of the paddle's top edge
    pub y: i32,
}

impl Paddle {
    pub fn new(y: i32) -> Self {
        Paddle { y }
    }
}

/// Ball state
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ball {
    /// Top left corner
    pub pos: Vec2,
    /// Pixels per tick
    pub vel: Vec2,
}

impl Ball {
    pub fn new(pos: Vec2, vel: Vec2) -> Self {
        Ball { pos, vel }
    }
}

/// Raw input for one side, accumulated since the previous poll
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SideInput {
    /// Up key pressed since last poll
    pub up: bool,
    /// Down key pressed since last poll
    pub down: bool,
    /// Encoder detents since last poll (positive = clockwise)
    pub encoder_delta: i32,
}

impl SideInput {
    /// Direction of the key pair, `None` when neither or both were pressed
    pub fn key_intent(&self) -> Option<Intent> {
        match (self.up, self.down) {
            (true, false) => Some(Intent::Up),
            (false, true) => Some(Intent::Down),
            _ => None,
        }
    }
}

/// Input for both sides on one tick
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct InputFrame {
    pub left: SideInput,
    pub right: SideInput,
}

impl InputFrame {
    pub fn new(left: SideInput, right: SideInput) -> Self {
        InputFrame { left, right }
    }

    pub fn get(&self, side: Side) -> SideInput {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

/// Result of a single tick as seen by the match manager
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RoundOutcome {
    Continuing,
    /// The side missed but the match goes on
    RoundLost(Side),
    /// The losing side of the final point
    MatchOver(Side),
}

/// Discrete feedback events for LEDs or sound
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    PaddleHit(Side),
    BallLost(Side),
}

/// Read-only state handed to renderers once per tick
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub tick: Tick,
    pub ball: Vec2,
    /// Paddle top edges, `[left, right]`
    pub paddles: [i32; 2],
    /// `[left, right]` lives, `None` when no life pool is kept
    pub lives: Option<[u8; 2]>,
    /// Running score, `None` when the match does not track one
    pub score: Option<u32>,
    pub outcome: RoundOutcome,
}

/// What a finished match reports to its caller
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchResult {
    /// Final score of a human-vs-AI run
    Score(u32),
    /// Lives-based duel ended; the counts left on each side
    Lives { left: u8, right: u8 },
}
