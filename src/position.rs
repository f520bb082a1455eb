//! Move application and the game session.
//!
//! [`apply_move`] is the only way a caller-supplied move reaches a board. It
//! works on a copy: the input board is never touched. [`Game`] wraps a board
//! with whose turn it is, the active locator and the move history, so the
//! front ends never keep loose mutable game state of their own.

use tracing::debug;

use crate::board::{ActiveBoard, Board, Move, Outcome, Side};
use crate::error::{EngineError, Result};
use crate::movegen::{generate_legal_moves, required_subboard};

/// Result of applying a move.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Applied {
    /// Board after the move.
    pub board: Board,
    /// Where the opponent must play next.
    pub next: ActiveBoard,
}

/// Locator for the reply to `mv` on `board` (the board after the move).
///
/// The opponent is sent to the subboard matching the cell just played,
/// unless that subboard is decided, in which case any subboard is allowed.
pub fn next_active(board: &Board, mv: Move) -> ActiveBoard {
    if board.subboard(mv.cell).is_decided() {
        ActiveBoard::Any
    } else {
        ActiveBoard::At(mv.cell)
    }
}

/// Place `side`'s mark at `mv` on a copy of `board`.
///
/// Rejects moves into an occupied cell, into a decided subboard, or on a
/// finished game. The active-subboard rule is checked by [`check_legal`].
pub fn apply_move(board: &Board, mv: Move, side: Side) -> Result<Applied> {
    if board.is_over() {
        return Err(EngineError::GameOver(mv));
    }
    if board.subboard(mv.board).is_decided() {
        return Err(EngineError::SubboardDecided(mv));
    }
    if board.cell(mv).is_some() {
        return Err(EngineError::Occupied(mv));
    }
    let next_board = board.with_move(mv, side);
    Ok(Applied {
        next: next_active(&next_board, mv),
        board: next_board,
    })
}

/// Full legality check, including the active-subboard rule.
pub fn check_legal(board: &Board, active: ActiveBoard, mv: Move) -> Result<()> {
    if board.is_over() {
        return Err(EngineError::GameOver(mv));
    }
    if board.subboard(mv.board).is_decided() {
        return Err(EngineError::SubboardDecided(mv));
    }
    if board.cell(mv).is_some() {
        return Err(EngineError::Occupied(mv));
    }
    match required_subboard(board, active) {
        Some(required) if required != mv.board => Err(EngineError::WrongSubboard { mv, required }),
        _ => Ok(()),
    }
}

/// State saved for one played move.
#[derive(Copy, Clone, Debug)]
struct HistoryEntry {
    mv: Move,
    side: Side,
    board: Board,
    active: ActiveBoard,
}

/// A game in progress.
#[derive(Clone, Debug)]
pub struct Game {
    board: Board,
    to_move: Side,
    active: ActiveBoard,
    history: Vec<HistoryEntry>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(Side::X)
    }
}

impl Game {
    /// Start a fresh game with `first` to move.
    pub fn new(first: Side) -> Self {
        Self {
            board: Board::new(),
            to_move: first,
            active: ActiveBoard::Any,
            history: Vec::new(),
        }
    }

    /// Reset to an empty board with `first` to move.
    pub fn clear(&mut self, first: Side) {
        *self = Self::new(first);
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    #[inline]
    pub fn active(&self) -> ActiveBoard {
        self.active
    }

    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.board.outcome()
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.board.is_over()
    }

    /// Number of moves played since the game began.
    pub fn move_count(&self) -> usize {
        self.history.len()
    }

    /// Moves played so far, oldest first.
    pub fn moves(&self) -> impl Iterator<Item = (Side, Move)> + '_ {
        self.history.iter().map(|h| (h.side, h.mv))
    }

    pub fn legal_moves(&self) -> Vec<Move> {
        generate_legal_moves(&self.board, self.active)
    }

    /// Play `mv` for `side`, which must be the side to move.
    pub fn play(&mut self, side: Side, mv: Move) -> Result<Outcome> {
        if side != self.to_move {
            return Err(EngineError::WrongSide {
                expected: self.to_move,
                got: side,
            });
        }
        check_legal(&self.board, self.active, mv)?;
        let applied = apply_move(&self.board, mv, side)?;

        self.history.push(HistoryEntry {
            mv,
            side,
            board: self.board,
            active: self.active,
        });
        self.board = applied.board;
        self.active = applied.next;
        self.to_move = side.opponent();

        debug!(%side, %mv, next = %self.active, outcome = %self.outcome(), "move played");
        Ok(self.outcome())
    }

    /// Take back the last move. Returns it, or `None` at the start.
    pub fn undo(&mut self) -> Option<Move> {
        let last = self.history.pop()?;
        self.board = last.board;
        self.active = last.active;
        self.to_move = last.side;
        Some(last.mv)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Pos;

    fn mv(br: usize, bc: usize, r: usize, c: usize) -> Move {
        Move::new(br, bc, r, c).unwrap()
    }

    #[test]
    fn test_apply_move_forwards_to_cell_position() {
        let board = Board::new();
        let applied = apply_move(&board, mv(0, 0, 2, 1), Side::X).unwrap();
        assert_eq!(applied.next, ActiveBoard::At(Pos::new(2, 1).unwrap()));
        assert_eq!(applied.board.cell(mv(0, 0, 2, 1)), Some(Side::X));
        // Input board untouched
        assert_eq!(board, Board::new());
    }

    #[test]
    fn test_apply_move_forwards_to_any_when_target_decided() {
        let mut board = Board::new();
        for c in 0..3 {
            board.place(mv(1, 1, 0, c), Side::O);
        }
        let applied = apply_move(&board, mv(0, 0, 1, 1), Side::X).unwrap();
        assert_eq!(applied.next, ActiveBoard::Any);
    }

    #[test]
    fn test_apply_move_rejects_occupied_cell() {
        let board = Board::new().with_move(mv(0, 0, 0, 0), Side::X);
        let err = apply_move(&board, mv(0, 0, 0, 0), Side::O).unwrap_err();
        assert_eq!(err, EngineError::Occupied(mv(0, 0, 0, 0)));
    }

    #[test]
    fn test_game_play_and_undo() {
        let mut game = Game::new(Side::X);
        game.play(Side::X, mv(1, 1, 0, 2)).unwrap();
        assert_eq!(game.to_move(), Side::O);
        assert_eq!(game.active(), ActiveBoard::At(Pos::new(0, 2).unwrap()));

        let err = game.play(Side::O, mv(1, 1, 0, 0)).unwrap_err();
        assert!(matches!(err, EngineError::WrongSubboard { .. }));

        let err = game.play(Side::X, mv(0, 2, 0, 0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::WrongSide {
                expected: Side::O,
                got: Side::X
            }
        );

        game.play(Side::O, mv(0, 2, 1, 1)).unwrap();
        assert_eq!(game.move_count(), 2);
        let played: Vec<_> = game.moves().collect();
        assert_eq!(played, [(Side::X, mv(1, 1, 0, 2)), (Side::O, mv(0, 2, 1, 1))]);

        assert_eq!(game.undo(), Some(mv(0, 2, 1, 1)));
        assert_eq!(game.to_move(), Side::O);
        assert_eq!(game.undo(), Some(mv(1, 1, 0, 2)));
        assert_eq!(game.undo(), None);
        assert_eq!(game.board(), &Board::new());
    }
}
