//! Static evaluation of non-terminal positions.
//!
//! Each subboard is reduced to a scalar in `[-100, 100]`: a decided win is
//! worth the full amount, a draw is worth nothing, and an open subboard is
//! looked up in an optional [`SubboardTable`] (zero when absent). The eight
//! meta lines of scalars are then scored with threshold bonuses for one, two
//! or three subboards of one side, plus a tenth of the raw sum.
//!
//! Positive scores favor `O`.

use std::collections::HashMap;

use crate::Score;
use crate::board::{Board, Cell, Outcome, Pos, Side, SubBoard};
use crate::constants::{
    LINE_ONE, LINE_SUM_DIVISOR, LINE_THREE, LINE_TWO, LINES, N, SUBBOARD_WIN_VALUE,
};

/// Base-3 key of a subboard grid, row-major: `X`=0, `O`=1, empty=2.
pub fn encode_subboard(cells: &[[Cell; N]; N]) -> u16 {
    cells.iter().flatten().fold(0u16, |key, cell| {
        let value = match cell {
            Some(Side::X) => 0,
            Some(Side::O) => 1,
            None => 2,
        };
        key * 3 + value
    })
}

/// Memoized scalars for open subboards, keyed by [`encode_subboard`].
///
/// The table starts empty and unseen keys are worth zero. Stored values are
/// clamped to the decided-win range so an entry never outweighs a real win.
#[derive(Clone, Debug, Default)]
pub struct SubboardTable {
    entries: HashMap<u16, Score>,
}

impl SubboardTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a scalar for a grid. Non-finite values are ignored.
    pub fn insert(&mut self, cells: &[[Cell; N]; N], value: Score) {
        if value.is_finite() {
            let clamped = value.clamp(-SUBBOARD_WIN_VALUE, SUBBOARD_WIN_VALUE);
            self.entries.insert(encode_subboard(cells), clamped);
        }
    }

    /// Scalar for a grid, zero when unseen.
    pub fn get(&self, cells: &[[Cell; N]; N]) -> Score {
        self.entries
            .get(&encode_subboard(cells))
            .copied()
            .unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Score one line of three subboard scalars.
pub fn evaluate_line(a: Score, b: Score, c: Score) -> Score {
    let line = [a, b, c];
    let o_count = line.iter().filter(|&&s| s > 0.0).count();
    let x_count = line.iter().filter(|&&s| s < 0.0).count();

    let mut score = match (o_count, x_count) {
        (3, _) => LINE_THREE,
        (2, 0) => LINE_TWO,
        (1, 0) => LINE_ONE,
        _ => 0.0,
    };
    score -= match (x_count, o_count) {
        (3, _) => LINE_THREE,
        (2, 0) => LINE_TWO,
        (1, 0) => LINE_ONE,
        _ => 0.0,
    };

    score + (a + b + c) / LINE_SUM_DIVISOR
}

/// Heuristic evaluator, optionally backed by a subboard table.
#[derive(Clone, Debug, Default)]
pub struct Evaluator {
    table: SubboardTable,
}

impl Evaluator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_table(table: SubboardTable) -> Self {
        Self { table }
    }

    /// Scalar contribution of one subboard.
    pub fn subboard_value(&self, sb: &SubBoard) -> Score {
        match sb.outcome() {
            Outcome::Won(Side::O) => SUBBOARD_WIN_VALUE,
            Outcome::Won(Side::X) => -SUBBOARD_WIN_VALUE,
            Outcome::Draw => 0.0,
            Outcome::Undecided => self.table.get(sb.cells()),
        }
    }

    /// Static score of `board` from `O`'s point of view.
    pub fn evaluate(&self, board: &Board) -> Score {
        let scalars: [[Score; N]; N] = std::array::from_fn(|r| {
            std::array::from_fn(|c| self.subboard_value(board.subboard(Pos::from_index(r * N + c))))
        });

        LINES
            .iter()
            .map(|line| {
                let [a, b, c] = (*line).map(|(r, c)| scalars[r][c]);
                evaluate_line(a, b, c)
            })
            .sum()
    }
}

/// Static score of `board` with an empty subboard table.
pub fn evaluate_board(board: &Board) -> Score {
    Evaluator::new().evaluate(board)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Move;
    use crate::constants::MAX_HEURISTIC;

    const X: Cell = Some(Side::X);
    const O: Cell = Some(Side::O);
    const E: Cell = None;

    #[test]
    fn test_encode_subboard() {
        assert_eq!(encode_subboard(&[[E; 3]; 3]), 19682);
        assert_eq!(encode_subboard(&[[X; 3]; 3]), 0);
        // Only the last cell is O: 0*3^1... + 1
        assert_eq!(encode_subboard(&[[X, X, X], [X, X, X], [X, X, O]]), 1);
        assert_eq!(encode_subboard(&[[O, X, X], [X, X, X], [X, X, X]]), 6561);
    }

    #[test]
    fn test_evaluate_line_thresholds() {
        assert_eq!(evaluate_line(100.0, 100.0, 100.0), 1000.0 + 30.0);
        assert_eq!(evaluate_line(100.0, 100.0, 0.0), 15.0 + 20.0);
        assert_eq!(evaluate_line(-100.0, 0.0, 0.0), -2.0 - 10.0);
        // Mixed presence: only the tie-break remains
        assert_eq!(evaluate_line(100.0, -100.0, 0.0), 0.0);
    }

    #[test]
    fn test_empty_board_is_balanced() {
        assert_eq!(evaluate_board(&Board::new()), 0.0);
    }

    #[test]
    fn test_won_subboard_scores_for_winner() {
        let mut board = Board::new();
        for c in 0..3 {
            board.place(Move::new(1, 1, 0, c).unwrap(), Side::O);
        }
        // Center sits on 4 lines: 4 * (2 + 10)
        assert_eq!(evaluate_board(&board), 48.0);

        let mirrored: Board = board
            .to_string()
            .replace('O', "X")
            .parse()
            .unwrap();
        assert_eq!(evaluate_board(&mirrored), -48.0);
    }

    #[test]
    fn test_table_values_are_clamped_and_used() {
        let sb_cells = [[O, E, E], [E, E, E], [E, E, E]];
        let mut table = SubboardTable::new();
        table.insert(&sb_cells, 500.0);
        table.insert(&[[X, E, E], [E, E, E], [E, E, E]], Score::NAN);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&sb_cells), SUBBOARD_WIN_VALUE);

        let mut board = Board::new();
        board.place(Move::new(0, 0, 0, 0).unwrap(), Side::O);
        let evaluator = Evaluator::with_table(table);
        assert!(evaluator.evaluate(&board) > 0.0);
        assert!(evaluator.evaluate(&board).abs() <= MAX_HEURISTIC);
        assert_eq!(evaluate_board(&board), 0.0);
    }
}
