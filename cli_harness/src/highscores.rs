//! Best score per opponent, stored as JSON.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use color_eyre::eyre::WrapErr;
use knobpong_core::AiKind;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highscores {
    /// Keyed by opponent name (`reactive`, `predictive`)
    best: BTreeMap<String, u32>,
}

impl Highscores {
    /// Read the table, starting empty when the file does not exist yet
    pub fn load(path: &Path) -> color_eyre::Result<Self> {
        if !path.exists() {
            return Ok(Highscores::default());
        }
        let text = fs::read_to_string(path)
            .wrap_err_with(|| format!("reading highscores from {}", path.display()))?;
        serde_json::from_str(&text)
            .wrap_err_with(|| format!("parsing highscores in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> color_eyre::Result<()> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let text = serde_json::to_string_pretty(self)?;
        fs::write(path, text).wrap_err_with(|| format!("writing highscores to {}", path.display()))
    }

    pub fn best(&self, opponent: AiKind) -> u32 {
        self.best.get(opponent.as_str()).copied().unwrap_or(0)
    }

    /// Record a finished run; returns true when it set a new best
    pub fn record(&mut self, opponent: AiKind, score: u32) -> bool {
        let best = self.best.entry(opponent.as_str().to_string()).or_insert(0);
        if score > *best {
            info!(%opponent, score, previous = *best, "new highscore");
            *best = score;
            true
        } else {
            false
        }
    }
}
