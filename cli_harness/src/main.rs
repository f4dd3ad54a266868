//! Terminal harness for knobpong_core: keyboard paddles, emulated knobs,
//! LED panel and highscores.

mod feedback;
mod highscores;
mod settings;
mod terminal;

use std::fs::File;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::Parser;
use color_eyre::eyre::WrapErr;
use knobpong_core::{AiKind, Config, Controller, Game, MatchResult, MatchSetup, Scheduler};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::highscores::Highscores;
use crate::settings::{Cli, Settings};
use crate::terminal::Terminal;

/// The terminal is in raw mode while playing, so logs go to a file
fn init_tracing(settings: &Settings) -> color_eyre::Result<()> {
    let file = File::create(&settings.log_file)
        .wrap_err_with(|| format!("creating log file {}", settings.log_file.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// Opponent of the human in a score-tracked match
fn scored_opponent(setup: &MatchSetup) -> Option<AiKind> {
    let human = setup.human_vs_ai()?;
    match setup.controller(human.opposite()) {
        Controller::Ai(kind) => Some(kind),
        Controller::Human => None,
    }
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    let mut settings = Settings::load(&cli.config)?;
    settings.apply(&cli);
    init_tracing(&settings)?;

    let setup = settings.match_setup(time_seed());
    let config = Config::default();
    let mut game = Game::new(config, setup)?;
    let mut highscores = Highscores::load(&settings.highscores)?;
    info!(seed = setup.seed, config = %cli.config.display(), "knobpong starting");

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        ctrlc::set_handler(move || cancel.store(true, Ordering::Relaxed))
            .wrap_err("installing Ctrl-C handler")?;
    }

    let mut scheduler = Scheduler::new(settings.pacing());
    let mut term = Terminal::new(config, setup, Arc::clone(&cancel))?;

    loop {
        let Some(result) = scheduler.run(&mut game, &mut term, &cancel) else {
            break;
        };
        info!(?result, ticks = game.tick, "match finished");

        let best = match (result, scored_opponent(&setup)) {
            (MatchResult::Score(score), Some(opponent)) => {
                let new_best = highscores.record(opponent, score);
                if new_best {
                    highscores.save(&settings.highscores)?;
                }
                Some((highscores.best(opponent), new_best))
            }
            _ => None,
        };

        if !term.show_result(result, best)? {
            break;
        }
        game.restart();
        term.reset_feedback();
    }

    drop(term);
    info!("knobpong exiting");
    Ok(())
}
