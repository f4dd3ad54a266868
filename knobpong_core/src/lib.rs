//! knobpong core: a fixed-timestep two-paddle ball game engine.
//!
//! The crate owns the simulation only. Input devices, drawing, LED timing and
//! persistence sit behind the traits in [`scheduler`].

pub mod ai;
pub mod control;
pub mod error;
pub mod game;
pub mod physics;
pub mod scheduler;
pub mod types;

pub use error::ConfigError;
pub use game::{Game, Mode, TickReport};
pub use scheduler::{FeedbackSink, InputSource, Pacing, Renderer, Scheduler};
pub use types::*;
