use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use clap::Parser;
use gridbot::engine::Tile;
use gridbot::expectimax::{ExpectimaxConfig, LeafUtility};
use gridbot::game::Game;
use gridbot::Bot;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Parser)]
#[command(name = "selfplay", about = "Play many seeded games in parallel and summarize the bot's results")]
struct Args {
    /// Number of games to play
    #[arg(long, default_value_t = 16)]
    games: u64,

    /// Board side length
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// Search depth in layers
    #[arg(long, default_value_t = 2)]
    depth: u32,

    /// Seed of the first game; game i uses seed + i
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Use the row/column heuristic as leaf value instead of the score
    #[arg(long)]
    heuristic: bool,

    /// Per game: stop after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Print the summary as JSON
    #[arg(long)]
    json: bool,

    /// Suppress the progress bar
    #[arg(long)]
    quiet: bool,
}

#[derive(Debug, Clone, Serialize)]
struct GameRecord {
    seed: u64,
    moves: u64,
    score: u64,
    highest_tile: Tile,
    won: bool,
}

#[derive(Debug, Serialize)]
struct Summary {
    games: usize,
    elapsed_s: f64,
    mean_score: f64,
    max_score: u64,
    win_rate: f64,
    highest_tiles: BTreeMap<Tile, usize>,
    runs: Vec<GameRecord>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let cfg = ExpectimaxConfig {
        max_depth: args.depth,
        utility: if args.heuristic { LeafUtility::Heuristic } else { LeafUtility::Score },
        parallel_root: false,
    };
    info!("playing {} games on {}x{} at depth {}", args.games, args.size, args.size, args.depth);

    let pb = if args.quiet {
        ProgressBar::hidden()
    } else {
        let pb = ProgressBar::new(args.games);
        pb.set_style(
            ProgressStyle::with_template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} games ({eta})")?
                .progress_chars("=>-"),
        );
        pb.enable_steady_tick(Duration::from_millis(120));
        pb
    };

    let start = Instant::now();
    let runs: Vec<GameRecord> = (0..args.games)
        .into_par_iter()
        .map(|i| {
            let seed = args.seed.wrapping_add(i);
            let record = play_one(&cfg, args.size, seed, args.steps);
            pb.inc(1);
            record
        })
        .collect::<anyhow::Result<_>>()?;
    pb.finish_and_clear();

    let summary = summarize(runs, start.elapsed().as_secs_f64());
    if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!(
            "Games: {} | elapsed: {:.1}s | mean score: {:.1} | max score: {} | win rate: {:.1}%",
            summary.games,
            summary.elapsed_s,
            summary.mean_score,
            summary.max_score,
            summary.win_rate * 100.0
        );
        for (tile, count) in &summary.highest_tiles {
            println!("  highest tile {:>6}: {}", tile, count);
        }
    }
    Ok(())
}

fn play_one(cfg: &ExpectimaxConfig, size: usize, seed: u64, steps: Option<u64>) -> anyhow::Result<GameRecord> {
    let mut bot = Bot::with_config(cfg.clone());
    let mut game = Game::new(size, seed)?;
    game.set_keep_playing(true);
    game.play(&mut bot, steps)?;
    if !game.is_over() {
        warn!("game {seed} stopped at the move limit");
    }
    Ok(GameRecord {
        seed,
        moves: game.moves(),
        score: game.score(),
        highest_tile: game.grid().highest_tile(),
        won: game.is_won(),
    })
}

fn summarize(runs: Vec<GameRecord>, elapsed_s: f64) -> Summary {
    let games = runs.len();
    let total: u64 = runs.iter().map(|r| r.score).sum();
    let mut highest_tiles = BTreeMap::new();
    for r in &runs {
        *highest_tiles.entry(r.highest_tile).or_insert(0) += 1;
    }
    let wins = runs.iter().filter(|r| r.won).count();
    Summary {
        games,
        elapsed_s,
        mean_score: if games == 0 { 0.0 } else { total as f64 / games as f64 },
        max_score: runs.iter().map(|r| r.score).max().unwrap_or(0),
        win_rate: if games == 0 { 0.0 } else { wins as f64 / games as f64 },
        highest_tiles,
        runs,
    }
}
