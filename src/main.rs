/// Command-line host: list, check, solve and replay levels headlessly.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use mirror_maze::config::GameConfig;
use mirror_maze::domain::entity::{format_moves, parse_moves};
use mirror_maze::sim::event::GameEvent;
use mirror_maze::sim::level::LevelPack;
use mirror_maze::sim::progress::{LevelTimer, Progress};
use mirror_maze::sim::solve::solve;
use mirror_maze::sim::step::step;

const DEFAULT_SEARCH_BUDGET: usize = 200_000;

#[derive(Parser, Debug)]
#[command(name = "mirror-maze", about = "Mirrored two-character grid puzzles")]
struct Cli {
    /// Level pack TOML file (defaults to config.toml's levels_file, then the built-in set).
    #[arg(long, global = true)]
    pack: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List every level with its lock state.
    List {
        /// Highest unlocked level id.
        #[arg(long, default_value_t = 1)]
        unlocked: u32,
    },
    /// Validate the pack and prove every level solvable.
    Check {
        #[arg(long, default_value_t = DEFAULT_SEARCH_BUDGET)]
        max_states: usize,
    },
    /// Print a shortest solution as a UDLR string.
    Solve {
        id: u32,
        #[arg(long, default_value_t = DEFAULT_SEARCH_BUDGET)]
        max_states: usize,
    },
    /// Replay a UDLR move string and report the result.
    Play {
        id: u32,
        moves: String,
        /// Elapsed play time in seconds, for the star rating.
        #[arg(long)]
        seconds: Option<u32>,
        /// Highest unlocked level id before this attempt (defaults to ID).
        #[arg(long)]
        unlocked: Option<u32>,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    let config = GameConfig::load();
    let pack = load_pack(cli.pack, &config)?;

    match cli.command {
        Commands::List { unlocked } => run_list(&pack, unlocked),
        Commands::Check { max_states } => run_check(&pack, max_states)?,
        Commands::Solve { id, max_states } => run_solve(&pack, id, max_states)?,
        Commands::Play { id, moves, seconds, unlocked } => {
            run_play(&pack, &config, id, &moves, seconds, unlocked)?
        }
    }

    Ok(())
}

fn load_pack(explicit: Option<PathBuf>, config: &GameConfig) -> Result<LevelPack> {
    match explicit.or_else(|| config.levels_file.clone()) {
        Some(path) => LevelPack::load(&path)
            .with_context(|| format!("failed to load level pack {}", path.display())),
        None => LevelPack::embedded().context("built-in level pack is invalid"),
    }
}

// ── Commands ──

fn run_list(pack: &LevelPack, unlocked: u32) {
    let progress = Progress { highest_unlocked: unlocked }.clamped(pack.total());
    println!("{} by {}", pack.name, pack.author);
    if !pack.description.is_empty() {
        println!("{}", pack.description);
    }
    println!();
    for level in &pack.levels {
        let lock = if progress.is_unlocked(level.id) { " " } else { "*" };
        println!("{lock} {:>3}  {:<12} {}", level.id, level.difficulty, level.name);
    }
    println!();
    println!("{} of {} levels unlocked (* = locked)", progress.highest_unlocked, pack.total());
}

fn run_check(pack: &LevelPack, max_states: usize) -> Result<()> {
    let mut failures = Vec::new();
    for level in &pack.levels {
        let state = pack.start(level.id)?;
        match solve(&state, max_states) {
            Some(path) => println!("ok   {:>3}  {:>3} moves  {}", level.id, path.len(), level.name),
            None => {
                println!("FAIL {:>3}  no solution  {}", level.id, level.name);
                failures.push(level.id);
            }
        }
    }
    if !failures.is_empty() {
        bail!("{} level(s) unsolvable: {:?}", failures.len(), failures);
    }
    println!("all {} levels solvable", pack.len());
    Ok(())
}

fn run_solve(pack: &LevelPack, id: u32, max_states: usize) -> Result<()> {
    let state = pack.start(id)?;
    let Some(path) = solve(&state, max_states) else {
        bail!("level {id} has no solution within {max_states} states");
    };
    println!("{}", format_moves(&path));
    Ok(())
}

fn run_play(
    pack: &LevelPack,
    config: &GameConfig,
    id: u32,
    moves: &str,
    seconds: Option<u32>,
    unlocked: Option<u32>,
) -> Result<()> {
    let mut progress = Progress { highest_unlocked: unlocked.unwrap_or(id) }.clamped(pack.total());
    if !progress.is_unlocked(id) {
        bail!("level {id} is locked (highest unlocked: {})", progress.highest_unlocked);
    }
    let moves = parse_moves(moves).map_err(|c| anyhow::anyhow!("invalid move {c:?}, expected U/D/L/R"))?;

    let mut timer = LevelTimer::for_level(id, &config.timer);
    if let Some(s) = seconds {
        timer.advance(s);
        if timer.is_expired() {
            bail!("time expired before the level was completed");
        }
    }

    let mut state = pack.start(id)?;
    for event in step(&mut state, None).events {
        println!("   0  {}", describe(&event));
    }
    for (tick, dir) in moves.iter().enumerate() {
        let report = step(&mut state, Some(*dir));
        if report.moves.is_none() {
            println!("{:>4}  {:?} ignored: level already complete", tick + 1, dir);
            continue;
        }
        for event in &report.events {
            println!("{:>4}  {}", tick + 1, describe(event));
        }
    }

    if !state.is_completed() {
        println!("not complete: player at {}, twin at {}", state.player(), state.twin());
        return Ok(());
    }

    println!("level {id} complete  {}  {}", timer.display(), "*".repeat(timer.stars() as usize));
    match progress.record_completion(id, pack.total()) {
        Some(next) => println!("level {next} unlocked"),
        None if id == pack.total() => println!("pack finished"),
        None => {}
    }
    Ok(())
}

fn describe(event: &GameEvent) -> String {
    match event {
        GameEvent::ActorMoved { actor, from, to } => format!("{actor} {from} -> {to}"),
        GameEvent::ActorBlocked { actor, reason: None } => format!("{actor} stopped by the edge"),
        GameEvent::ActorBlocked { actor, reason: Some(kind) } => format!("{actor} blocked by {kind:?}"),
        GameEvent::DoorGroupOpened { group } => format!("doors {group:?} open"),
        GameEvent::ExitReached { actor, at } => format!("{actor} reached exit {at}"),
        GameEvent::LevelCompleted { level_id } => format!("level {level_id} completed"),
    }
}
