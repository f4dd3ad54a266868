//! Match settings from `knobpong.toml`, overridden by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use knobpong_core::{AiKind, Controller, Difficulty, MatchSetup, Pacing};
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(name = "knobpong")]
#[command(about = "Two-paddle ball game for the terminal", long_about = None)]
pub struct Cli {
    /// Settings file
    #[arg(long, default_value = "knobpong.toml")]
    pub config: PathBuf,

    /// easy, medium or hard
    #[arg(long)]
    pub difficulty: Option<Difficulty>,

    /// Left paddle: human, reactive or predictive
    #[arg(long)]
    pub left: Option<Controller>,

    /// Right paddle: human, reactive or predictive
    #[arg(long)]
    pub right: Option<Controller>,

    /// Seed for serves and AI aim
    #[arg(long)]
    pub seed: Option<u64>,

    /// Spin between ticks instead of sleeping
    #[arg(long)]
    pub busy_poll: bool,

    /// Where tracing output goes
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub left: Controller,
    pub right: Controller,
    /// Fixed seed; a fresh one per run when absent
    pub seed: Option<u64>,
    pub busy_poll: bool,
    pub highscores: PathBuf,
    pub log_file: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            difficulty: Difficulty::default(),
            left: Controller::Human,
            right: Controller::Ai(AiKind::Predictive),
            seed: None,
            busy_poll: false,
            highscores: PathBuf::from("knobpong_highscores.json"),
            log_file: PathBuf::from("knobpong.log"),
        }
    }
}

impl Settings {
    /// Read a settings file; a missing file yields the defaults
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading settings from {}", path.display()))?;
        toml::from_str(&text).wrap_err_with(|| format!("parsing settings in {}", path.display()))
    }

    /// Flags given on the command line win over the file
    pub fn apply(&mut self, cli: &Cli) {
        if let Some(difficulty) = cli.difficulty {
            self.difficulty = difficulty;
        }
        if let Some(left) = cli.left {
            self.left = left;
        }
        if let Some(right) = cli.right {
            self.right = right;
        }
        if cli.seed.is_some() {
            self.seed = cli.seed;
        }
        if cli.busy_poll {
            self.busy_poll = true;
        }
        if let Some(log_file) = &cli.log_file {
            self.log_file = log_file.clone();
        }
    }

    pub fn match_setup(&self, fallback_seed: u64) -> MatchSetup {
        MatchSetup {
            difficulty: self.difficulty,
            left: self.left,
            right: self.right,
            seed: self.seed.unwrap_or(fallback_seed),
        }
    }

    pub fn pacing(&self) -> Pacing {
        if self.busy_poll {
            Pacing::BusyPoll
        } else {
            Pacing::Sleep
        }
    }
}
