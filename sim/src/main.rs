use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gemquest_core::{GameConfig, Phase, PlayerProfile};
use serde::Serialize;

use crate::autoplay::{GameSummary, play_level};

mod autoplay;

/// Plays seeded gemquest levels with a greedy auto-player and reports the outcome.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// JSON file with a game config, missing fields use defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of levels to play
    #[arg(short, long, default_value_t = 1)]
    games: u32,

    /// Seed of the first level, later levels use consecutive seeds
    #[arg(short, long, default_value_t = 0)]
    seed: u64,

    /// Level to start at
    #[arg(short, long, default_value_t = 1)]
    level: u32,

    /// Override the starting move budget
    #[arg(long)]
    moves: Option<u16>,

    /// Override the level 1 target score
    #[arg(long)]
    target: Option<u32>,

    /// Move on to the next level after a completed one, stop at the first failure
    #[arg(long)]
    campaign: bool,

    /// Print a JSON report instead of text
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    games: Vec<GameSummary>,
    profile: PlayerProfile,
}

fn load_config(args: &Args) -> Result<GameConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => GameConfig::default(),
    };
    if let Some(moves) = args.moves {
        config.starting_moves = moves;
    }
    if let Some(target) = args.target {
        config.starting_target = target;
    }
    Ok(GameConfig {
        target_increment: config.target_increment,
        max_generation_attempts: config.max_generation_attempts,
        max_cascade_passes: config.max_cascade_passes,
        ..GameConfig::new(config.size, config.starting_moves, config.starting_target)
    })
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;

    let mut profile = PlayerProfile::default();
    let mut games = Vec::new();
    let mut level = args.level;
    for offset in 0..args.games {
        let seed = args.seed.wrapping_add(offset.into());
        let (summary, next_profile) = play_level(level, config, profile, seed)
            .with_context(|| format!("level {level} with seed {seed}"))?;
        profile = next_profile;

        let completed = summary.phase == Phase::LevelComplete;
        games.push(summary);
        if args.campaign {
            if !completed {
                break;
            }
            level += 1;
        }
    }

    if args.json {
        let report = Report { games, profile };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for game in &games {
        println!(
            "level {:>3} seed {:>6}: {:?} score {}/{} stars {} moves left {} swaps {} passes {}{}",
            game.level,
            game.seed,
            game.phase,
            game.score,
            game.target,
            game.stars,
            game.moves_left,
            game.swaps,
            game.cascade_passes,
            if game.stuck { " (stuck)" } else { "" },
        );
    }
    println!(
        "completed {} levels, {} stars, best score {}",
        profile.completed_levels, profile.total_stars, profile.best_score
    );
    Ok(())
}
