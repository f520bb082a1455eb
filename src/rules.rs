//! Win and draw detection for subboards and for the whole board.
//!
//! Both checks are pure: they read a snapshot and never touch the caches.
//! [`Board`] and [`SubBoard`] call them to refresh their cached outcomes.

use crate::board::{Board, Cell, Outcome, Pos, Side, SubBoard};
use crate::constants::{LINES, N};

/// Side owning all three entries of `line`, if any.
fn line_owner<T: Copy>(
    grid: &[[T; N]; N],
    line: &[(usize, usize); 3],
    mark: &impl Fn(T) -> Option<Side>,
) -> Option<Side> {
    let [a, b, c] = (*line).map(|(r, c)| mark(grid[r][c]));
    match (a, b, c) {
        (Some(a), Some(b), Some(c)) if a == b && b == c => Some(a),
        _ => None,
    }
}

/// Side owning three equal marks on one of the eight lines, if any.
///
/// `mark` maps a grid value to the side it counts for; `None` never matches,
/// so empty cells and drawn subboards cannot complete a line.
fn line_winner<T: Copy>(grid: &[[T; N]; N], mark: impl Fn(T) -> Option<Side>) -> Option<Side> {
    LINES.iter().find_map(|line| line_owner(grid, line, &mark))
}

/// Whether both sides own a completed line on the same grid. No legal game
/// reaches such a grid: play stops in it as soon as the first line closes.
fn both_sides_complete<T: Copy>(grid: &[[T; N]; N], mark: impl Fn(T) -> Option<Side>) -> bool {
    let mut owners = LINES.iter().filter_map(|line| line_owner(grid, line, &mark));
    match owners.next() {
        Some(first) => owners.any(|side| side != first),
        None => false,
    }
}

/// Whether a subboard grid holds completed lines for both sides.
pub fn is_contradictory_subboard(cells: &[[Cell; N]; N]) -> bool {
    both_sides_complete(cells, |cell: Cell| cell)
}

/// Whether the meta-grid of subboard outcomes holds completed lines for
/// both sides.
pub fn is_contradictory_board(board: &Board) -> bool {
    both_sides_complete(&meta_grid(board), Outcome::winner)
}

fn meta_grid(board: &Board) -> [[Outcome; N]; N] {
    std::array::from_fn(|r| {
        std::array::from_fn(|c| board.subboard(Pos::from_index(r * N + c)).outcome())
    })
}

/// Outcome of a single subboard, computed from its cells.
pub fn check_subboard_winner(sb: &SubBoard) -> Outcome {
    if let Some(side) = line_winner(sb.cells(), |cell: Cell| cell) {
        return Outcome::Won(side);
    }
    if sb.cells().iter().flatten().all(Option::is_some) {
        Outcome::Draw
    } else {
        Outcome::Undecided
    }
}

/// Outcome of the whole game, computed over the meta-grid of subboard
/// outcomes. A drawn subboard counts for nobody.
pub fn check_overall_winner(board: &Board) -> Outcome {
    let meta = meta_grid(board);

    if let Some(side) = line_winner(&meta, Outcome::winner) {
        return Outcome::Won(side);
    }
    if meta.iter().flatten().all(|o| o.is_decided()) {
        Outcome::Draw
    } else {
        Outcome::Undecided
    }
}

/// Whether `side` playing at `pos` would win `sb` outright.
pub fn wins_subboard(sb: &SubBoard, pos: Pos, side: Side) -> bool {
    if sb.is_decided() || sb.get(pos).is_some() {
        return false;
    }
    let mut cells = *sb.cells();
    cells[pos.row()][pos.col()] = Some(side);
    line_winner(&cells, |cell: Cell| cell) == Some(side)
}
