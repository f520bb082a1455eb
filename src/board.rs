//! Board model: sides, coordinates, moves, subboards and the nested board.
//!
//! Boards are plain `Copy` values. Every placement goes through
//! [`SubBoard::place`] / [`Board::place`], which refresh the cached outcomes
//! immediately, so a cached outcome is never stale.
//!
//! ## Text notation
//!
//! A board is written as the flattened 9x9 global grid, one row per line,
//! using `X`, `O` and `.`. The separators `|`, `-`, `+` and whitespace are
//! ignored, so the output of `Display` parses back:
//!
//! ```text
//! X . . | . . . | . . .
//! . O . | . . . | . . .
//! . . . | . . . | . . .
//! ------+-------+------
//! ...
//! ```
//!
//! A move is written in global coordinates: a column letter `a`..`i` and a
//! row number `1`..`9`, with row 1 at the top (`e5` is the very center).
//! Four digits `br bc r c` (for example `0122`) are accepted as well.

use std::fmt;
use std::str::FromStr;

use crate::constants::{GLOBAL_N, N};
use crate::error::{EngineError, Result};
use crate::rules::{
    check_overall_winner, check_subboard_winner, is_contradictory_board, is_contradictory_subboard,
};

/// One of the two players. `O` is the maximizing side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    X,
    O,
}

impl Side {
    /// The other player.
    #[inline]
    pub const fn opponent(self) -> Side {
        match self {
            Side::X => Side::O,
            Side::O => Side::X,
        }
    }

    /// Whether this side maximizes the score.
    #[inline]
    pub const fn is_maximizing(self) -> bool {
        matches!(self, Side::O)
    }

    pub const fn symbol(self) -> char {
        match self {
            Side::X => 'X',
            Side::O => 'O',
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for Side {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "x" => Ok(Side::X),
            "o" => Ok(Side::O),
            _ => Err(EngineError::BadSide(s.to_string())),
        }
    }
}

/// Content of a single cell.
pub type Cell = Option<Side>;

/// Status of a subboard or of the whole game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Outcome {
    #[default]
    Undecided,
    Won(Side),
    Draw,
}

impl Outcome {
    /// True for a win or a draw.
    #[inline]
    pub const fn is_decided(self) -> bool {
        !matches!(self, Outcome::Undecided)
    }

    #[inline]
    pub const fn winner(self) -> Option<Side> {
        match self {
            Outcome::Won(side) => Some(side),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Undecided => write!(f, "undecided"),
            Outcome::Won(side) => write!(f, "{side} wins"),
            Outcome::Draw => write!(f, "draw"),
        }
    }
}

/// A (row, col) coordinate on a 3x3 grid, always in range.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pos {
    row: u8,
    col: u8,
}

impl Pos {
    /// Center of a 3x3 grid.
    pub const CENTER: Pos = Pos { row: 1, col: 1 };

    /// Create a coordinate, rejecting anything outside `0..3`.
    pub fn new(row: usize, col: usize) -> Result<Self> {
        if row >= N || col >= N {
            return Err(EngineError::CoordinateOutOfRange { row, col });
        }
        Ok(Self::from_index(row * N + col))
    }

    /// Coordinate of a row-major index in `0..9`.
    pub(crate) const fn from_index(idx: usize) -> Self {
        Pos {
            row: (idx / N) as u8,
            col: (idx % N) as u8,
        }
    }

    #[inline]
    pub const fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub const fn col(self) -> usize {
        self.col as usize
    }

    /// All nine coordinates in row-major order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (0..N * N).map(Pos::from_index)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Where the next move may be played.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum ActiveBoard {
    /// Any undecided subboard.
    #[default]
    Any,
    /// Only this subboard (unless it is already decided).
    At(Pos),
}

impl ActiveBoard {
    /// Locator for a specific subboard, rejecting out-of-range coordinates.
    pub fn at(row: usize, col: usize) -> Result<Self> {
        Ok(ActiveBoard::At(Pos::new(row, col)?))
    }
}

impl fmt::Display for ActiveBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActiveBoard::Any => write!(f, "any"),
            ActiveBoard::At(pos) => write!(f, "{pos}"),
        }
    }
}

/// A placement: which subboard, and which cell inside it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub board: Pos,
    pub cell: Pos,
}

impl Move {
    /// Build a move from `(subboard row, subboard col, cell row, cell col)`.
    pub fn new(board_row: usize, board_col: usize, row: usize, col: usize) -> Result<Self> {
        Ok(Move {
            board: Pos::new(board_row, board_col)?,
            cell: Pos::new(row, col)?,
        })
    }

    /// Build a move from a coordinate on the flattened 9x9 grid.
    pub fn from_global(row: usize, col: usize) -> Result<Self> {
        if row >= GLOBAL_N || col >= GLOBAL_N {
            return Err(EngineError::CoordinateOutOfRange { row, col });
        }
        Move::new(row / N, col / N, row % N, col % N)
    }

    /// Row on the flattened 9x9 grid.
    pub const fn global_row(self) -> usize {
        self.board.row() * N + self.cell.row()
    }

    /// Column on the flattened 9x9 grid.
    pub const fn global_col(self) -> usize {
        self.board.col() * N + self.cell.col()
    }

    /// The `(br, bc, r, c)` tuple.
    pub const fn as_tuple(self) -> (usize, usize, usize, usize) {
        (
            self.board.row(),
            self.board.col(),
            self.cell.row(),
            self.cell.col(),
        )
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let col = (b'a' + self.global_col() as u8) as char;
        write!(f, "{col}{}", self.global_row() + 1)
    }
}

impl FromStr for Move {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let bad = || EngineError::BadMove(s.to_string());
        let text = s.trim().to_ascii_lowercase();
        let bytes = text.as_bytes();

        match bytes {
            // Four digits: br bc r c
            [a, b, c, d] if bytes.iter().all(u8::is_ascii_digit) => Move::new(
                (a - b'0') as usize,
                (b - b'0') as usize,
                (c - b'0') as usize,
                (d - b'0') as usize,
            )
            .map_err(|_| bad()),
            // Global coordinate: column letter then row number
            [letter, digit] if letter.is_ascii_lowercase() && digit.is_ascii_digit() => {
                let col = (letter - b'a') as usize;
                let row = ((digit - b'0') as usize).checked_sub(1).ok_or_else(bad)?;
                Move::from_global(row, col).map_err(|_| bad())
            }
            _ => Err(bad()),
        }
    }
}

/// One 3x3 subboard with its cached status.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct SubBoard {
    cells: [[Cell; N]; N],
    outcome: Outcome,
    full: bool,
}

impl SubBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a subboard from a grid, deriving the cached fields.
    ///
    /// Fails with [`EngineError::CorruptBoard`] when both sides complete a
    /// line, since such a grid has no consistent outcome.
    pub fn from_cells(cells: [[Cell; N]; N]) -> Result<Self> {
        if is_contradictory_subboard(&cells) {
            return Err(EngineError::CorruptBoard("a subboard".to_string()));
        }
        let mut sb = SubBoard {
            cells,
            outcome: Outcome::Undecided,
            full: false,
        };
        sb.refresh();
        Ok(sb)
    }

    #[inline]
    pub fn get(&self, pos: Pos) -> Cell {
        self.cells[pos.row()][pos.col()]
    }

    #[inline]
    pub fn cells(&self) -> &[[Cell; N]; N] {
        &self.cells
    }

    /// Cached outcome of this subboard.
    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[inline]
    pub fn is_decided(&self) -> bool {
        self.outcome.is_decided()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.full
    }

    /// Empty cells in row-major order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Pos> + '_ {
        Pos::all().filter(move |&p| self.get(p).is_none())
    }

    /// Write a mark and refresh the caches.
    ///
    /// The caller guarantees the cell is empty and the subboard undecided.
    pub(crate) fn place(&mut self, pos: Pos, side: Side) {
        debug_assert!(self.get(pos).is_none(), "cell {pos} is occupied");
        debug_assert!(!self.is_decided(), "subboard is decided");
        self.cells[pos.row()][pos.col()] = Some(side);
        self.refresh();
    }

    fn refresh(&mut self) {
        self.full = self.cells.iter().flatten().all(Option::is_some);
        self.outcome = check_subboard_winner(self);
    }
}

/// The full nested board: a 3x3 grid of subboards.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Board {
    subboards: [[SubBoard; N]; N],
    outcome: Outcome,
}

impl Board {
    /// An empty board.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a board from nine subboards, deriving the overall outcome.
    ///
    /// Fails with [`EngineError::CorruptBoard`] when both sides own a line
    /// of won subboards.
    pub fn from_subboards(subboards: [[SubBoard; N]; N]) -> Result<Self> {
        let mut board = Board {
            subboards,
            outcome: Outcome::Undecided,
        };
        if is_contradictory_board(&board) {
            return Err(EngineError::CorruptBoard("the meta-board".to_string()));
        }
        board.outcome = check_overall_winner(&board);
        Ok(board)
    }

    #[inline]
    pub fn subboard(&self, pos: Pos) -> &SubBoard {
        &self.subboards[pos.row()][pos.col()]
    }

    /// The mark at a move's target cell.
    #[inline]
    pub fn cell(&self, mv: Move) -> Cell {
        self.subboard(mv.board).get(mv.cell)
    }

    /// Cached overall outcome.
    #[inline]
    pub fn outcome(&self) -> Outcome {
        self.outcome
    }

    #[inline]
    pub fn is_over(&self) -> bool {
        self.outcome.is_decided()
    }

    /// Subboards with their coordinates, row-major.
    pub fn subboards(&self) -> impl Iterator<Item = (Pos, &SubBoard)> + '_ {
        Pos::all().map(move |p| (p, self.subboard(p)))
    }

    /// Number of marks on the board.
    pub fn stone_count(&self) -> usize {
        self.subboards
            .iter()
            .flatten()
            .flat_map(|sb| sb.cells.iter().flatten())
            .filter(|c| c.is_some())
            .count()
    }

    /// Write a mark and refresh subboard and overall caches.
    ///
    /// Legality is the caller's job; see [`crate::position::apply_move`].
    pub(crate) fn place(&mut self, mv: Move, side: Side) {
        let sb = &mut self.subboards[mv.board.row()][mv.board.col()];
        sb.place(mv.cell, side);
        if sb.is_decided() {
            self.outcome = check_overall_winner(self);
        }
    }

    /// Copy of this board with one extra mark.
    #[inline]
    pub(crate) fn with_move(&self, mv: Move, side: Side) -> Board {
        let mut next = *self;
        next.place(mv, side);
        next
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for gr in 0..GLOBAL_N {
            if gr > 0 && gr % N == 0 {
                writeln!(f, "------+-------+------")?;
            }
            for gc in 0..GLOBAL_N {
                if gc > 0 {
                    let sep = if gc % N == 0 { " | " } else { " " };
                    write!(f, "{sep}")?;
                }
                // Coordinates come from the loop bounds, always in range.
                let mv = Move {
                    board: Pos::from_index((gr / N) * N + gc / N),
                    cell: Pos::from_index((gr % N) * N + gc % N),
                };
                let ch = self.cell(mv).map_or('.', Side::symbol);
                write!(f, "{ch}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self> {
        let mut marks = Vec::with_capacity(GLOBAL_N * GLOBAL_N);
        for ch in s.chars() {
            match ch {
                'X' | 'x' => marks.push(Some(Side::X)),
                'O' | 'o' => marks.push(Some(Side::O)),
                '.' | '_' => marks.push(None),
                '|' | '-' | '+' => {}
                c if c.is_whitespace() => {}
                c => return Err(EngineError::BadBoard(format!("unexpected character '{c}'"))),
            }
        }
        if marks.len() != GLOBAL_N * GLOBAL_N {
            return Err(EngineError::BadBoard(format!(
                "expected {} cells, found {}",
                GLOBAL_N * GLOBAL_N,
                marks.len()
            )));
        }

        let mut grids = [[[[None; N]; N]; N]; N];
        for (i, mark) in marks.into_iter().enumerate() {
            let (gr, gc) = (i / GLOBAL_N, i % GLOBAL_N);
            grids[gr / N][gc / N][gr % N][gc % N] = mark;
        }
        let mut subboards = [[SubBoard::new(); N]; N];
        for pos in Pos::all() {
            let (r, c) = (pos.row(), pos.col());
            subboards[r][c] = SubBoard::from_cells(grids[r][c])
                .map_err(|_| EngineError::CorruptBoard(format!("subboard {pos}")))?;
        }
        Board::from_subboards(subboards)
    }
}
