//! ultra-ttt: command-line front end for the ultimate tic-tac-toe engine.
//!
//! ## Usage
//!
//! - `ultra-ttt` - Show a demo
//! - `ultra-ttt protocol` - Speak the text protocol on stdin/stdout
//! - `ultra-ttt bestmove --board pos.txt --side o` - Analyze a position
//! - `ultra-ttt selfplay --random-opponent --seed 7` - Play a full game
//! - `ultra-ttt demo --first o` - Let the engine open as `O`
//!
//! Logs go to stderr; set `RUST_LOG` or `--log-level` to adjust them.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::info;

use ultra_ttt::constants::{DEFAULT_DEPTH, MAX_DEPTH, MIN_DEPTH};
use ultra_ttt::protocol::UtpEngine;
use ultra_ttt::{ActiveBoard, Board, Game, Move, Searcher, Side, evaluate_board};

/// ultra-ttt: minimax engine for ultimate tic-tac-toe
#[derive(Parser)]
#[command(name = "ultra-ttt")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the text protocol on stdin/stdout for use by front ends
    Protocol {
        /// Search depth in plies
        #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = depth_parser())]
        depth: u32,
    },
    /// Find the best move for a position written in board notation
    Bestmove {
        /// File holding the board, or `-` for stdin
        #[arg(long, default_value = "-")]
        board: PathBuf,
        /// Side to move (`x` or `o`)
        #[arg(long, default_value = "o")]
        side: Side,
        /// Active subboard as `row,col`, or `any`
        #[arg(long, default_value = "any", value_parser = parse_active)]
        active: ActiveBoard,
        /// Search depth in plies
        #[arg(long, default_value_t = DEFAULT_DEPTH, value_parser = depth_parser())]
        depth: u32,
    },
    /// Play a complete game, engine against engine or a random opponent
    Selfplay {
        /// Search depth in plies
        #[arg(long, default_value_t = 4, value_parser = depth_parser())]
        depth: u32,
        /// Let `X` play uniformly random legal moves
        #[arg(long)]
        random_opponent: bool,
        /// Seed for the random opponent
        #[arg(long, default_value_t = 1)]
        seed: u64,
        /// Side that opens the game
        #[arg(long, default_value = "x")]
        first: Side,
    },
    /// Run a short demo of the engine
    Demo {
        /// Side that opens the game; with `o` the engine opens
        #[arg(long, default_value = "x")]
        first: Side,
    },
}

fn depth_parser() -> clap::builder::RangedI64ValueParser<u32> {
    clap::value_parser!(u32).range(MIN_DEPTH as i64..=MAX_DEPTH as i64)
}

fn parse_active(s: &str) -> std::result::Result<ActiveBoard, String> {
    if s.eq_ignore_ascii_case("any") {
        return Ok(ActiveBoard::Any);
    }
    let (row, col) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `row,col` or `any`, got '{s}'"))?;
    let row: usize = row.trim().parse().map_err(|_| format!("bad row '{row}'"))?;
    let col: usize = col.trim().parse().map_err(|_| format!("bad column '{col}'"))?;
    ActiveBoard::at(row, col).map_err(|e| e.to_string())
}

fn init_tracing(level: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Some(Commands::Protocol { depth }) => {
            let mut engine = UtpEngine::with_depth(depth);
            engine.run(io::stdin().lock(), io::stdout().lock())
        }
        Some(Commands::Bestmove {
            board,
            side,
            active,
            depth,
        }) => run_bestmove(&board, side, active, depth),
        Some(Commands::Selfplay {
            depth,
            random_opponent,
            seed,
            first,
        }) => run_selfplay(depth, random_opponent, seed, first),
        Some(Commands::Demo { first }) => run_demo(first),
        None => run_demo(Side::X),
    }
}

fn read_board(path: &Path) -> Result<Board> {
    let text = if path.as_os_str() == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read board from stdin")?;
        buf
    } else {
        fs::read_to_string(path)
            .with_context(|| format!("failed to read board from {}", path.display()))?
    };
    text.parse::<Board>().context("invalid board")
}

fn run_bestmove(path: &Path, side: Side, active: ActiveBoard, depth: u32) -> Result<()> {
    let board = read_board(path)?;
    let result = Searcher::new().search(&board, active, side, depth)?;

    match result.best_move {
        Some(mv) => println!("bestmove {mv} ({:?})", mv.as_tuple()),
        None => println!("bestmove none ({})", board.outcome()),
    }
    println!(
        "score {:.1} depth {} nodes {} cutoffs {}",
        result.score, result.depth, result.nodes, result.cutoffs
    );
    Ok(())
}

fn run_selfplay(depth: u32, random_opponent: bool, seed: u64, first: Side) -> Result<()> {
    let game = selfplay(depth, random_opponent, seed, first)?;
    println!("\n{}", game.board());
    println!("result: {}", game.outcome());
    info!(moves = game.move_count(), outcome = %game.outcome(), "selfplay finished");
    Ok(())
}

/// Play one game to the end, printing each move.
fn selfplay(depth: u32, random_opponent: bool, seed: u64, first: Side) -> Result<Game> {
    let mut rng = fastrand::Rng::with_seed(seed);
    let mut searcher = Searcher::new();
    let mut game = Game::new(first);

    while !game.is_over() {
        let side = game.to_move();
        let mv = if random_opponent && side == Side::X {
            let moves = game.legal_moves();
            if moves.is_empty() {
                break;
            }
            moves[rng.usize(..moves.len())]
        } else {
            let result = searcher.search(game.board(), game.active(), side, depth)?;
            match result.best_move {
                Some(mv) => mv,
                None => break,
            }
        };
        game.play(side, mv)?;
        println!("{:>3}. {side} {mv}", game.move_count());
    }

    if !game.is_over() {
        bail!("game stopped without a result after {} moves", game.move_count());
    }
    Ok(game)
}

fn run_demo(first: Side) -> Result<()> {
    println!("ultra-ttt: minimax engine for ultimate tic-tac-toe\n");

    let mut game = Game::new(first);
    if first == Side::X {
        let opening = "e5".parse::<Move>().context("demo move")?;
        game.play(Side::X, opening)?;
        println!("X opens at {opening}:");
        println!("{}", game.board());
    }

    let depth = 5;
    println!("Searching {depth} plies for O...");
    let result = Searcher::new().search(game.board(), game.active(), Side::O, depth)?;
    if let Some(mv) = result.best_move {
        game.play(Side::O, mv)?;
        println!("O replies {mv} (score {:.1}, {} nodes)", result.score, result.nodes);
    }
    println!("\n{}", game.board());
    println!("Static evaluation: {:.1}", evaluate_board(game.board()));
    Ok(())
}
