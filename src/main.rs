use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use gridbot::expectimax::{ExpectimaxConfig, LeafUtility};
use gridbot::game::Game;
use gridbot::Bot;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Utility {
    Score,
    Heuristic,
}

impl From<Utility> for LeafUtility {
    fn from(u: Utility) -> Self {
        match u {
            Utility::Score => LeafUtility::Score,
            Utility::Heuristic => LeafUtility::Heuristic,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "gridbot", about = "Play one sliding-merge game with the expectimax bot")]
struct Args {
    /// Board side length
    #[arg(long, default_value_t = 4)]
    size: usize,

    /// Search depth in layers (max and chance each count one)
    #[arg(long, default_value_t = 4)]
    depth: u32,

    /// RNG seed for tile spawns (random if omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Leaf value used when the search bottoms out
    #[arg(long, value_enum, default_value_t = Utility::Score)]
    utility: Utility,

    /// Evaluate root moves in parallel
    #[arg(long)]
    parallel: bool,

    /// Keep playing after reaching the winning tile
    #[arg(long)]
    keep_playing: bool,

    /// Stop after this many moves
    #[arg(long)]
    steps: Option<u64>,

    /// Only print the final summary
    #[arg(long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("seed {seed}, size {}, depth {}", args.size, args.depth);

    let mut bot = Bot::with_config(ExpectimaxConfig {
        max_depth: args.depth,
        utility: args.utility.into(),
        parallel_root: args.parallel,
    });
    let mut game = Game::new(args.size, seed).context("creating board")?;
    game.set_keep_playing(args.keep_playing);
    if !args.quiet {
        println!("{}", game.grid());
    }

    let mut total_states: u64 = 0;
    while !game.is_terminated() {
        if args.steps.is_some_and(|limit| game.moves() >= limit) {
            break;
        }
        let direction = bot.get_move(game.grid())?;
        game.step(direction)?;
        total_states = total_states.saturating_add(bot.last_stats().nodes);
        if !args.quiet {
            println!("{direction} | score: {}\n{}", game.score(), game.grid());
        }
    }

    println!(
        "Moves made: {}, Score: {}, Highest tile: {}, Won: {}, States considered: {}, Max states considered for a move: {}",
        game.moves(),
        game.score(),
        game.grid().highest_tile(),
        game.is_won(),
        total_states,
        bot.last_stats().peak_nodes
    );
    Ok(())
}
