//! ultra-ttt: a minimax engine for ultimate (3x3-of-3x3) tic-tac-toe.
//!
//! The engine picks a move for the side to play using a depth-limited
//! alpha-beta search over value-type boards, with a static line-based
//! evaluator at the leaves.
//!
//! ## Modules
//!
//! - [`constants`] - Geometry, score ranges and evaluation weights
//! - [`board`] - Sides, coordinates, moves, subboards and the nested board
//! - [`rules`] - Subboard and overall win/draw detection
//! - [`movegen`] - Legal moves under the active-subboard rule
//! - [`position`] - Move application and the [`Game`] session
//! - [`eval`] - Static position evaluation
//! - [`search`] - Alpha-beta search and the unpruned reference minimax
//! - [`protocol`] - Line-oriented text protocol for front ends
//!
//! ## Example
//!
//! ```
//! use ultra_ttt::{ActiveBoard, Game, Side, find_best_move};
//!
//! let mut game = Game::new(Side::X);
//! let mv = "e5".parse().unwrap();
//! game.play(Side::X, mv).unwrap();
//!
//! let result = find_best_move(game.board(), game.active(), game.to_move(), 3).unwrap();
//! let reply = result.best_move.unwrap();
//! assert_eq!(game.active(), ActiveBoard::At(reply.board));
//! game.play(Side::O, reply).unwrap();
//! ```

pub mod board;
pub mod constants;
pub mod error;
pub mod eval;
pub mod movegen;
pub mod position;
pub mod protocol;
pub mod rules;
pub mod search;

/// Evaluation and search scores, from `O`'s point of view.
pub type Score = f64;

pub use board::{ActiveBoard, Board, Move, Outcome, Pos, Side, SubBoard};
pub use error::{EngineError, Result};
pub use eval::{Evaluator, SubboardTable, evaluate_board};
pub use movegen::generate_legal_moves;
pub use position::{Applied, Game, apply_move};
pub use rules::{check_overall_winner, check_subboard_winner};
pub use search::{SearchResult, Searcher, find_best_move, minimax};
