use crate::game::{Board, Player};

/// Cell picker for the automated opponent.
///
/// Implementations must return an empty cell, or `None` when the board is
/// full. Swapping in a stronger opponent (minimax, say) only means swapping
/// this out; the match transition rules never change.
pub trait Strategy: Send + Sync {
    fn choose(&self, board: &Board, player: Player) -> Option<usize>;
}

/// The naive opponent: takes the lowest-index empty cell.
#[derive(Debug, Default, Clone, Copy)]
pub struct FirstEmpty;

impl Strategy for FirstEmpty {
    fn choose(&self, board: &Board, _player: Player) -> Option<usize> {
        board.iter().position(|c| c.is_none())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_first_empty_scans_in_index_order() {
        let mut board: Board = [None; 9];
        board[0] = Some(Player::X);
        board[1] = Some(Player::O);
        assert_eq!(FirstEmpty.choose(&board, Player::O), Some(2));
    }

    #[test]
    fn t_first_empty_on_full_board() {
        let board: Board = [Some(Player::X); 9];
        assert_eq!(FirstEmpty.choose(&board, Player::O), None);
    }
}
