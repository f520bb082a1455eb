//! Legal move generation under the active-subboard rule.

use crate::board::{ActiveBoard, Board, Move, Pos};

/// Legal moves for the position, in row-major order.
///
/// If `active` names an undecided subboard, only its empty cells are legal.
/// Otherwise (the `Any` sentinel, or the named subboard is already decided)
/// every empty cell of every undecided subboard is legal. Returns an empty
/// list once the game is decided.
pub fn generate_legal_moves(board: &Board, active: ActiveBoard) -> Vec<Move> {
    if board.is_over() {
        return Vec::new();
    }

    if let ActiveBoard::At(pos) = active {
        let sb = board.subboard(pos);
        if !sb.is_decided() {
            return sb.empty_cells().map(|cell| Move { board: pos, cell }).collect();
        }
    }

    board
        .subboards()
        .filter(|(_, sb)| !sb.is_decided())
        .flat_map(|(pos, sb)| sb.empty_cells().map(move |cell| Move { board: pos, cell }))
        .collect()
}

/// The subboard a move must target, or `None` when any undecided one will do.
pub fn required_subboard(board: &Board, active: ActiveBoard) -> Option<Pos> {
    match active {
        ActiveBoard::At(pos) if !board.subboard(pos).is_decided() => Some(pos),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Side;

    #[test]
    fn test_empty_board_any() {
        let moves = generate_legal_moves(&Board::new(), ActiveBoard::Any);
        assert_eq!(moves.len(), 81);
        assert_eq!(moves[0], Move::new(0, 0, 0, 0).unwrap());
        assert_eq!(moves[80], Move::new(2, 2, 2, 2).unwrap());
    }

    #[test]
    fn test_active_subboard_restricts_moves() {
        let mut board = Board::new();
        board.place(Move::new(1, 2, 0, 0).unwrap(), Side::X);
        let moves = generate_legal_moves(&board, ActiveBoard::at(1, 2).unwrap());
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.board == Pos::new(1, 2).unwrap()));
    }

    #[test]
    fn test_decided_subboard_forwards_to_any() {
        let mut board = Board::new();
        for c in 0..3 {
            board.place(Move::new(0, 0, 0, c).unwrap(), Side::O);
        }
        assert!(board.subboard(Pos::new(0, 0).unwrap()).is_decided());

        let active = ActiveBoard::at(0, 0).unwrap();
        assert_eq!(required_subboard(&board, active), None);
        let moves = generate_legal_moves(&board, active);
        assert_eq!(moves.len(), 72);
        assert!(moves.iter().all(|m| m.board != Pos::new(0, 0).unwrap()));
    }
}
