#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays a Ringdelve run on autopilot.

mod autopilot;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use ringdelve_core::{GameEvent, RunState};
use ringdelve_world::{query, Game, GameConfig};
use serde::Serialize;

const BANNER: &str = "Welcome to Ringdelve.";

#[derive(Parser, Debug)]
#[command(name = "ringdelve")]
#[command(about = "Plays a seeded Ringdelve run and prints its event log")]
struct Cli {
    /// Seed overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// TOML file with generation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Ticks after which the run is abandoned
    #[arg(long, default_value_t = 5_000)]
    max_ticks: u64,

    /// Print events and the summary as JSON lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct EventLine<'a> {
    tick: u64,
    #[serde(flatten)]
    event: &'a GameEvent,
}

#[derive(Serialize)]
struct Summary {
    seed: u64,
    ticks: u64,
    run_state: RunState,
    level: Option<usize>,
    player: Option<query::EntitySnapshot>,
}

/// Entry point for the Ringdelve command-line interface.
fn main() -> Result<()> {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .try_init();
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    let mut game = Game::new(&config).context("failed to generate the dungeon")?;
    if !cli.json {
        println!("{BANNER}");
    }
    let events = game.start_game().context("failed to start the run")?;
    print_events(&cli, game.tick_count(), &events)?;

    while game.run_state() == RunState::Running && game.tick_count() < cli.max_ticks {
        if game.is_waiting_for_command() {
            autopilot::issue_command(&mut game).context("autopilot issued an invalid command")?;
        }
        if game.is_waiting_for_command() {
            game.rest(1).context("failed to rest the player")?;
        }
        let events = game.tick().context("failed to advance the run")?;
        print_events(&cli, game.tick_count(), &events)?;
    }
    if game.run_state() == RunState::Running {
        log::warn!("abandoning the run after {} ticks", game.tick_count());
    }

    print_summary(
        &cli,
        &Summary {
            seed: config.seed,
            ticks: game.tick_count(),
            run_state: game.run_state(),
            level: game.current_level_index(),
            player: query::player(&game),
        },
    )
}

fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            toml::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(seed) = cli.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn print_events(cli: &Cli, tick: u64, events: &[GameEvent]) -> Result<()> {
    for event in events {
        if cli.json {
            println!("{}", serde_json::to_string(&EventLine { tick, event })?);
        } else {
            println!("[{tick:>5}] {}", event.message);
        }
    }
    Ok(())
}

fn print_summary(cli: &Cli, summary: &Summary) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string(summary)?);
        return Ok(());
    }

    let outcome = match summary.run_state {
        RunState::Running => "abandoned",
        RunState::Victory => "won",
        RunState::GameOver => "lost",
    };
    println!(
        "Run {outcome} after {} ticks (seed {:#x}).",
        summary.ticks, summary.seed
    );
    if let Some(player) = &summary.player {
        println!(
            "Player on level {} with {} health.",
            summary.level.map_or(0, |level| level + 1),
            player.health.unwrap_or(0)
        );
    }
    Ok(())
}
