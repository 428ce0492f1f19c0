mod ai;
mod config;
mod data;
mod ecs;
mod error;
mod game;
mod input;
mod logging;
mod map;
mod render;

use std::{path::PathBuf, process::ExitCode};

use anyhow::Context;
use clap::Parser;
use config::GameConfig;
use game::{Game, RunState};
use input::{CommandSource, ScriptedInput, StdinInput};
use render::TerminalScreen;

#[derive(Parser, Debug)]
#[command(name = "bitcrawler")]
#[command(author, version, about = "Turn-based dungeon crawl in a single walled room", long_about = None)]
struct Args {
    /// JSON game config (room size, enemies, templates, logging)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Random seed (default: random)
    #[arg(short, long)]
    seed: Option<u64>,

    /// Replay commands from a file instead of reading stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Log filter directive, e.g. `info` or `bitcrawler=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Where to write the diagnostic log
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn into_config(self) -> anyhow::Result<(GameConfig, Option<PathBuf>)> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)
                .with_context(|| format!("loading config {}", path.display()))?,
            None => GameConfig::default(),
        };
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(level) = self.log_level {
            config.log.level = level;
        }
        if let Some(path) = self.log_file {
            config.log.path = path;
        }
        Ok((config, self.script))
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let (config, script) = Args::parse().into_config()?;
    logging::init(&config.log)?;
    tracing::info!("Starting bitcrawler");

    let mut input: Box<dyn CommandSource> = match script {
        Some(path) => Box::new(
            ScriptedInput::from_file(&path)
                .with_context(|| format!("reading script {}", path.display()))?,
        ),
        None => Box::new(StdinInput),
    };
    let mut screen = TerminalScreen::stdout();
    let mut game = Game::from_config(&config).context("setting up the room")?;

    loop {
        if let RunState::Over(outcome) = game.process_turn(input.as_mut(), &mut screen) {
            return Ok(ExitCode::from(outcome.exit_code()));
        }
    }
}
