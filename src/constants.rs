//! Constants for board geometry, scoring, and search parameters.
//!
//! All evaluation weights live here so the evaluator, the move ordering and
//! the search agree on the same numeric ranges. The important relation is
//!
//! ```text
//! |evaluate_board| <= MAX_HEURISTIC  <  SCORE_WIN  <  SCORE_INF
//! ```
//!
//! so a heuristic near-certainty can never be mistaken for a proven result.

use crate::Score;

// =============================================================================
// Board Geometry
// =============================================================================

/// Width of a subboard and of the meta-board.
pub const N: usize = 3;

/// Width of the flattened global grid (9x9).
pub const GLOBAL_N: usize = N * N;

/// Index triples of the eight winning lines on a 3x3 grid, as (row, col).
pub const LINES: [[(usize, usize); 3]; 8] = [
    [(0, 0), (0, 1), (0, 2)],
    [(1, 0), (1, 1), (1, 2)],
    [(2, 0), (2, 1), (2, 2)],
    [(0, 0), (1, 0), (2, 0)],
    [(0, 1), (1, 1), (2, 1)],
    [(0, 2), (1, 2), (2, 2)],
    [(0, 0), (1, 1), (2, 2)],
    [(0, 2), (1, 1), (2, 0)],
];

// =============================================================================
// Search Parameters
// =============================================================================

/// Smallest accepted search depth.
pub const MIN_DEPTH: u32 = 1;

/// Largest accepted search depth. Beyond ~8 plies the tree gets expensive.
pub const MAX_DEPTH: u32 = 10;

/// Default search depth used by the protocol and the CLI.
pub const DEFAULT_DEPTH: u32 = 7;

/// Score of a position where `O` has won the game.
pub const SCORE_WIN: Score = 1.0e6;

/// Score of a drawn game. Slightly negative: draws are discouraged.
pub const SCORE_DRAW: Score = -10.0;

/// Initial alpha/beta bound. Strictly beyond any reachable score.
pub const SCORE_INF: Score = 1.0e7;

// =============================================================================
// Evaluation Weights
// =============================================================================

/// Scalar of a subboard won outright.
pub const SUBBOARD_WIN_VALUE: Score = 100.0;

/// Line holding three subboards of one side.
pub const LINE_THREE: Score = 1000.0;

/// Line holding two subboards of one side and none of the other.
pub const LINE_TWO: Score = 15.0;

/// Line holding one subboard of one side and none of the other.
pub const LINE_ONE: Score = 2.0;

/// Divisor of the raw scalar sum added to each line.
pub const LINE_SUM_DIVISOR: Score = 10.0;

/// Upper bound on `|evaluate_board|`: eight lines, each at most a full
/// three-in-a-line plus the tie-break term.
pub const MAX_HEURISTIC: Score =
    8.0 * (LINE_THREE + 3.0 * SUBBOARD_WIN_VALUE / LINE_SUM_DIVISOR);

// =============================================================================
// Move Ordering
// =============================================================================

/// Ordering bonus for a move that immediately wins its subboard.
pub const ORDER_SUBBOARD_WIN: i32 = 100;

/// Ordering bonus for a move into the center cell of its subboard.
pub const ORDER_CENTER: i32 = 5;
