use crate::error::GameError;
use crate::game::strategy::Strategy;
use serde::{Serialize, Serializer};
use std::sync::Arc;

pub mod strategy;

/// The 8 winning lines: three rows, three columns, two diagonals.
pub const WIN_LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Player::X => "X",
            Player::O => "O",
        }
    }
}

/// A single cell: empty, or marked by a player.
pub type Cell = Option<Player>;

/// 3x3 grid, row-major.
pub type Board = [Cell; 9];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    InProgress,
    Won(Player),
    Draw,
}

impl Status {
    pub fn is_over(self) -> bool {
        !matches!(self, Status::InProgress)
    }
}

/// Point-in-time view of a game, shaped for the wire contract: cells
/// serialize as "", "X" or "O", the rest as camelCase fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(serialize_with = "serialize_board")]
    pub board: Board,
    pub current_player: Player,
    pub is_over: bool,
    pub winner: Option<Player>,
    pub is_draw: bool,
}

fn serialize_board<S: Serializer>(board: &Board, ser: S) -> Result<S::Ok, S::Error> {
    let cells = board.map(|c| c.map_or("", Player::as_str));
    cells.serialize(ser)
}

/// Result of a successful human move.
///
/// `snapshot` reflects the board right after the human mark was placed,
/// before any automated reply. `reply` carries the cell the automated
/// opponent took, if it moved.
#[derive(Debug, Clone)]
pub struct MoveOutcome {
    pub snapshot: Snapshot,
    pub reply: Option<usize>,
}

/// One authoritative match. Pure state and transition logic; the transport
/// layer never sees the board except through [`Snapshot`]s.
///
/// X is always the human side; O is the automated opponent, played through
/// the injected [`Strategy`].
pub struct Game {
    board: Board,
    current_player: Player,
    strategy: Arc<dyn Strategy>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("board", &self.board)
            .field("current_player", &self.current_player)
            .finish_non_exhaustive()
    }
}

impl Game {
    pub fn new(strategy: Arc<dyn Strategy>) -> Self {
        Self {
            board: [None; 9],
            current_player: Player::X,
            strategy,
        }
    }

    /// Derived, never stored: recomputed from the board on every read.
    pub fn status(&self) -> Status {
        for line in WIN_LINES {
            if let Some(p) = self.board[line[0]] {
                if self.board[line[1]] == Some(p) && self.board[line[2]] == Some(p) {
                    return Status::Won(p);
                }
            }
        }
        if self.board.iter().all(|c| c.is_some()) {
            Status::Draw
        } else {
            Status::InProgress
        }
    }

    /// Place the current player's mark at `idx`.
    ///
    /// Rejected moves (bad index, occupied cell, finished game) leave the
    /// match untouched. On success, if the turn passes to O, the automated
    /// opponent immediately plays exactly one move and the turn returns to X
    /// unless that move ended the game.
    pub fn apply_move(&mut self, idx: usize) -> Result<MoveOutcome, GameError> {
        if idx >= self.board.len() {
            return Err(GameError::InvalidIndex(idx));
        }
        if self.status().is_over() {
            return Err(GameError::GameAlreadyOver);
        }
        if self.board[idx].is_some() {
            return Err(GameError::CellOccupied(idx));
        }

        self.board[idx] = Some(self.current_player);

        // Capture before the toggle: the immediate state event reports the
        // mover as current player, matching the wire contract.
        let snapshot = self.snapshot();

        let mut reply = None;
        if !self.status().is_over() {
            self.current_player = self.current_player.opponent();
            if self.current_player == Player::O {
                reply = self.automated_move();
            }
        }

        Ok(MoveOutcome { snapshot, reply })
    }

    /// One automated move for O. The strategy only picks the cell; the
    /// transition rules stay here.
    fn automated_move(&mut self) -> Option<usize> {
        let idx = self.strategy.choose(&self.board, Player::O)?;
        self.board[idx] = Some(Player::O);
        if !self.status().is_over() {
            self.current_player = Player::X;
        }
        Some(idx)
    }

    /// Unconditional reinit: empty board, X to move. Valid from any state,
    /// terminal states included.
    pub fn reset(&mut self) {
        self.board = [None; 9];
        self.current_player = Player::X;
    }

    pub fn snapshot(&self) -> Snapshot {
        let status = self.status();
        let winner = match status {
            Status::Won(p) => Some(p),
            _ => None,
        };
        let is_draw = status == Status::Draw;
        Snapshot {
            board: self.board,
            current_player: self.current_player,
            is_over: winner.is_some() || is_draw,
            winner,
            is_draw,
        }
    }
}
