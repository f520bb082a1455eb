//! Depth-limited minimax search with alpha-beta pruning.
//!
//! `O` maximizes and `X` minimizes. Each node:
//!
//! 1. A decided board returns its terminal score (`±SCORE_WIN`, or
//!    `SCORE_DRAW` for a draw).
//! 2. At depth zero, or when no legal move exists, the static evaluation is
//!    returned with no move attached.
//! 3. Otherwise the legal moves are ordered by [`move_order_score`] and
//!    searched in that order, cutting off once `beta <= alpha`.
//!
//! Every child is searched on its own copy of the board, so the caller's
//! board is never modified.
//!
//! ## Example
//!
//! ```
//! use ultra_ttt::board::{ActiveBoard, Board, Side};
//! use ultra_ttt::search::find_best_move;
//!
//! let result = find_best_move(&Board::new(), ActiveBoard::Any, Side::O, 2).unwrap();
//! assert!(result.best_move.is_some());
//! ```

use std::time::Instant;

use tracing::{debug, info, instrument};

use crate::Score;
use crate::board::{ActiveBoard, Board, Move, Outcome, Pos, Side};
use crate::constants::{
    MAX_DEPTH, MIN_DEPTH, ORDER_CENTER, ORDER_SUBBOARD_WIN, SCORE_DRAW, SCORE_INF, SCORE_WIN,
};
use crate::error::{EngineError, Result};
use crate::eval::Evaluator;
use crate::movegen::generate_legal_moves;
use crate::position::next_active;
use crate::rules::wins_subboard;

/// Outcome of a search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult {
    /// Score of the position from `O`'s point of view
    pub score: Score,
    /// Chosen move; `None` when the position has no legal move
    pub best_move: Option<Move>,
    /// Depth searched
    pub depth: u32,
    /// Nodes visited
    pub nodes: u64,
    /// Beta cutoffs taken (always zero for the unpruned search)
    pub cutoffs: u64,
}

/// Terminal score of a decided board, `None` while undecided.
pub fn terminal_score(outcome: Outcome) -> Option<Score> {
    match outcome {
        Outcome::Won(Side::O) => Some(SCORE_WIN),
        Outcome::Won(Side::X) => Some(-SCORE_WIN),
        Outcome::Draw => Some(SCORE_DRAW),
        Outcome::Undecided => None,
    }
}

/// Cheap ordering priority of a move for `side`.
///
/// Winning the target subboard outright ranks first; the center cell of a
/// subboard gets a small bonus. Used for both sides alike.
pub fn move_order_score(board: &Board, mv: Move, side: Side) -> i32 {
    let mut score = 0;
    if wins_subboard(board.subboard(mv.board), mv.cell, side) {
        score += ORDER_SUBBOARD_WIN;
    }
    if mv.cell == Pos::CENTER {
        score += ORDER_CENTER;
    }
    score
}

/// Sort moves by descending [`move_order_score`]. Ties keep their order.
pub fn order_moves(board: &Board, moves: Vec<Move>, side: Side) -> Vec<Move> {
    let mut scored: Vec<(i32, Move)> = moves
        .into_iter()
        .map(|mv| (move_order_score(board, mv, side), mv))
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, mv)| mv).collect()
}

fn validate_depth(depth: u32) -> Result<()> {
    if (MIN_DEPTH..=MAX_DEPTH).contains(&depth) {
        Ok(())
    } else {
        Err(EngineError::InvalidDepth(depth))
    }
}

/// Minimax searcher holding the evaluator and per-search statistics.
#[derive(Debug, Default)]
pub struct Searcher {
    evaluator: Evaluator,
    nodes: u64,
    cutoffs: u64,
    root_depth: u32,
}

impl Searcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_evaluator(evaluator: Evaluator) -> Self {
        Self {
            evaluator,
            ..Self::default()
        }
    }

    pub fn evaluator(&self) -> &Evaluator {
        &self.evaluator
    }

    /// Alpha-beta search from the given position with `side` to move.
    #[instrument(level = "debug", skip_all, fields(%side, %active, depth = depth))]
    pub fn search(
        &mut self,
        board: &Board,
        active: ActiveBoard,
        side: Side,
        depth: u32,
    ) -> Result<SearchResult> {
        validate_depth(depth)?;
        self.reset(depth);
        let start = Instant::now();

        let (score, best_move) = self.alphabeta(board, active, depth, -SCORE_INF, SCORE_INF, side);

        info!(
            score,
            best_move = %best_move.map_or_else(|| "none".to_string(), |m| m.to_string()),
            nodes = self.nodes,
            cutoffs = self.cutoffs,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "search finished"
        );
        Ok(self.result(score, best_move, depth))
    }

    /// Plain minimax without pruning. Slow; returns the same score as
    /// [`Searcher::search`].
    pub fn search_unpruned(
        &mut self,
        board: &Board,
        active: ActiveBoard,
        side: Side,
        depth: u32,
    ) -> Result<SearchResult> {
        validate_depth(depth)?;
        self.reset(depth);
        let (score, best_move) = self.minimax(board, active, depth, side);
        Ok(self.result(score, best_move, depth))
    }

    fn reset(&mut self, depth: u32) {
        self.nodes = 0;
        self.cutoffs = 0;
        self.root_depth = depth;
    }

    fn result(&self, score: Score, best_move: Option<Move>, depth: u32) -> SearchResult {
        SearchResult {
            score,
            best_move,
            depth,
            nodes: self.nodes,
            cutoffs: self.cutoffs,
        }
    }

    /// Score for nodes that are not expanded, or `None` to keep searching.
    fn leaf_score(&self, board: &Board, depth: u32, moves: &[Move]) -> Option<Score> {
        if depth == 0 || moves.is_empty() {
            Some(self.evaluator.evaluate(board))
        } else {
            None
        }
    }

    fn alphabeta(
        &mut self,
        board: &Board,
        active: ActiveBoard,
        depth: u32,
        mut alpha: Score,
        mut beta: Score,
        side: Side,
    ) -> (Score, Option<Move>) {
        self.nodes += 1;

        if let Some(score) = terminal_score(board.outcome()) {
            return (score, None);
        }
        let moves = if depth == 0 {
            Vec::new()
        } else {
            generate_legal_moves(board, active)
        };
        if let Some(score) = self.leaf_score(board, depth, &moves) {
            return (score, None);
        }

        let moves = order_moves(board, moves, side);
        let maximizing = side.is_maximizing();
        let mut best_move = moves[0];
        let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };

        for mv in moves {
            let child = board.with_move(mv, side);
            let (score, _) = self.alphabeta(
                &child,
                next_active(&child, mv),
                depth - 1,
                alpha,
                beta,
                side.opponent(),
            );
            if depth == self.root_depth {
                debug!(%mv, score, "root move");
            }

            if maximizing {
                if score > best {
                    best = score;
                    best_move = mv;
                }
                alpha = alpha.max(score);
            } else {
                if score < best {
                    best = score;
                    best_move = mv;
                }
                beta = beta.min(score);
            }

            if beta <= alpha {
                self.cutoffs += 1;
                break;
            }
        }

        (best, Some(best_move))
    }

    fn minimax(
        &mut self,
        board: &Board,
        active: ActiveBoard,
        depth: u32,
        side: Side,
    ) -> (Score, Option<Move>) {
        self.nodes += 1;

        if let Some(score) = terminal_score(board.outcome()) {
            return (score, None);
        }
        let moves = if depth == 0 {
            Vec::new()
        } else {
            generate_legal_moves(board, active)
        };
        if let Some(score) = self.leaf_score(board, depth, &moves) {
            return (score, None);
        }

        let moves = order_moves(board, moves, side);
        let maximizing = side.is_maximizing();
        let mut best_move = moves[0];
        let mut best = if maximizing { -SCORE_INF } else { SCORE_INF };

        for mv in moves {
            let child = board.with_move(mv, side);
            let (score, _) = self.minimax(&child, next_active(&child, mv), depth - 1, side.opponent());
            let better = if maximizing { score > best } else { score < best };
            if better {
                best = score;
                best_move = mv;
            }
        }

        (best, Some(best_move))
    }
}

/// Best move for `side` searching `depth` plies with the default evaluator.
pub fn find_best_move(
    board: &Board,
    active: ActiveBoard,
    side: Side,
    depth: u32,
) -> Result<SearchResult> {
    Searcher::new().search(board, active, side, depth)
}

/// Unpruned reference search with the default evaluator.
pub fn minimax(board: &Board, active: ActiveBoard, side: Side, depth: u32) -> Result<SearchResult> {
    Searcher::new().search_unpruned(board, active, side, depth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::evaluate_board;

    fn mv(br: usize, bc: usize, r: usize, c: usize) -> Move {
        Move::new(br, bc, r, c).unwrap()
    }

    #[test]
    fn test_rejects_bad_depth() {
        let board = Board::new();
        assert_eq!(
            find_best_move(&board, ActiveBoard::Any, Side::O, 0),
            Err(EngineError::InvalidDepth(0))
        );
        assert_eq!(
            find_best_move(&board, ActiveBoard::Any, Side::O, MAX_DEPTH + 1),
            Err(EngineError::InvalidDepth(MAX_DEPTH + 1))
        );
    }

    #[test]
    fn test_move_order_score() {
        let board: Board = "
            O O . | . . . | . . .
            . . . | . . . | . . .
            . . . | . . . | . . .
            ------+-------+------
            . . . | . . . | . . .
            . . . | . . . | . . .
            . . . | . . . | . . .
            ------+-------+------
            . . . | . . . | . . .
            . . . | . . . | . . .
            . . . | . . . | . . .
        "
        .parse()
        .unwrap();
        assert_eq!(move_order_score(&board, mv(0, 0, 0, 2), Side::O), 100);
        assert_eq!(move_order_score(&board, mv(0, 0, 0, 2), Side::X), 0);
        assert_eq!(move_order_score(&board, mv(0, 0, 1, 1), Side::O), 5);
        assert_eq!(move_order_score(&board, mv(0, 0, 2, 2), Side::O), 0);
    }

    #[test]
    fn test_order_moves_is_stable_and_descending() {
        let board = Board::new();
        let moves = generate_legal_moves(&board, ActiveBoard::at(0, 0).unwrap());
        let ordered = order_moves(&board, moves, Side::X);
        assert_eq!(ordered[0], mv(0, 0, 1, 1));
        assert_eq!(ordered[1], mv(0, 0, 0, 0));
        assert_eq!(ordered[8], mv(0, 0, 2, 2));
    }

    #[test]
    fn test_terminal_scores_are_symmetric() {
        assert_eq!(terminal_score(Outcome::Won(Side::O)), Some(SCORE_WIN));
        assert_eq!(terminal_score(Outcome::Won(Side::X)), Some(-SCORE_WIN));
        assert_eq!(terminal_score(Outcome::Draw), Some(SCORE_DRAW));
        assert_eq!(terminal_score(Outcome::Undecided), None);
    }

    #[test]
    fn test_depth_one_score_matches_static_eval() {
        let board = Board::new();
        let result = find_best_move(&board, ActiveBoard::Any, Side::O, 1).unwrap();
        let best = result.best_move.unwrap();
        let after = board.with_move(best, Side::O);
        assert_eq!(result.score, evaluate_board(&after));
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_pruning_counts_cutoffs() {
        let board = Board::new();
        let pruned = find_best_move(&board, ActiveBoard::at(1, 1).unwrap(), Side::O, 3).unwrap();
        let plain = minimax(&board, ActiveBoard::at(1, 1).unwrap(), Side::O, 3).unwrap();
        assert_eq!(pruned.score, plain.score);
        assert!(pruned.nodes <= plain.nodes);
        assert_eq!(plain.cutoffs, 0);
    }
}
