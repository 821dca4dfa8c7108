//! Tic-tac-toe implementation of the `game-core` contract.
//!
//! A complete, tiny rules engine used to exercise the search: real legality,
//! real terminal detection, real Zobrist keys (so transpositions actually
//! collide), and in-place do/undo with a move history.
//!
//! Terminal verdicts are mapped onto the chess-family vocabulary: a
//! completed line is a `Checkmate` against the side to move (the opponent
//! just delivered it), and a full board with no line is a `Stalemate` (no
//! legal move, no loss).

use game_core::{GamePosition, GameStatus, Move, Side};
use once_cell::sync::Lazy;

/// The 8 winning lines (rows, columns, diagonals).
const LINES: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// Zobrist keys: one per (cell, piece), plus one for the side to move.
struct Zobrist {
    piece: [[u64; 2]; 9],
    black_to_move: u64,
}

static ZOBRIST: Lazy<Zobrist> = Lazy::new(|| {
    // SplitMix64 over a fixed seed; the keys only need to be stable and
    // well mixed.
    let mut state = 0x9d39_247e_3377_6d41u64;
    let mut next = move || {
        state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
        let mut z = state;
        z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
        z ^ (z >> 31)
    };

    let mut piece = [[0u64; 2]; 9];
    for cell in piece.iter_mut() {
        for key in cell.iter_mut() {
            *key = next();
        }
    }
    Zobrist {
        piece,
        black_to_move: next(),
    }
});

/// A tic-tac-toe position.
///
/// Board cells are numbered 0..9 row-major from the top-left; a move's id is
/// its cell index. X (White) moves first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TicTacToe {
    /// 0 = empty, 1 = X, 2 = O
    board: [u8; 9],
    /// 1 = X, 2 = O
    current_player: u8,
    /// Cells in play order, for ply counting and undo.
    history: Vec<u8>,
}

impl TicTacToe {
    /// The empty starting position, X to move.
    pub fn new() -> Self {
        Self {
            board: [0; 9],
            current_player: 1,
            history: Vec::with_capacity(9),
        }
    }

    /// Build a mid-game position from a board array (0 = empty, 1 = X,
    /// 2 = O) and the side to move. The piece counts must be consistent
    /// with X having moved first.
    pub fn from_board(board: [u8; 9], side_to_move: Side) -> Self {
        let x = board.iter().filter(|&&c| c == 1).count();
        let o = board.iter().filter(|&&c| c == 2).count();
        let current_player = match side_to_move {
            Side::White => 1,
            Side::Black => 2,
        };
        match side_to_move {
            Side::White => assert_eq!(x, o, "with X to move, piece counts must be equal"),
            Side::Black => assert_eq!(x, o + 1, "with O to move, X must be one piece ahead"),
        }

        // Synthesize a history so game_ply reflects the stones on the board.
        let history = board
            .iter()
            .enumerate()
            .filter(|(_, &c)| c != 0)
            .map(|(i, _)| i as u8)
            .collect();

        Self {
            board,
            current_player,
            history,
        }
    }

    /// The move placing a piece on `cell` (0..9).
    pub fn move_at(cell: usize) -> Move {
        debug_assert!(cell < 9);
        Move(cell as u16)
    }

    fn line_completed(&self) -> bool {
        LINES.iter().any(|&[a, b, c]| {
            self.board[a] != 0 && self.board[a] == self.board[b] && self.board[b] == self.board[c]
        })
    }

    fn board_full(&self) -> bool {
        self.board.iter().all(|&c| c != 0)
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new()
    }
}

impl GamePosition for TicTacToe {
    fn side_to_move(&self) -> Side {
        if self.current_player == 1 {
            Side::White
        } else {
            Side::Black
        }
    }

    fn key(&self) -> u64 {
        let z = &*ZOBRIST;
        let mut key = 0u64;
        for (cell, &piece) in self.board.iter().enumerate() {
            if piece != 0 {
                key ^= z.piece[cell][(piece - 1) as usize];
            }
        }
        if self.current_player == 2 {
            key ^= z.black_to_move;
        }
        key
    }

    fn game_ply(&self) -> u32 {
        self.history.len() as u32
    }

    fn status(&self) -> GameStatus {
        if self.line_completed() {
            // The player who just moved completed the line; the side to
            // move has lost.
            GameStatus::Checkmate
        } else if self.board_full() {
            GameStatus::Stalemate
        } else {
            GameStatus::Ongoing
        }
    }

    fn legal_moves(&self) -> Vec<Move> {
        if self.status().is_terminal() {
            return Vec::new();
        }
        self.board
            .iter()
            .enumerate()
            .filter(|(_, &c)| c == 0)
            .map(|(i, _)| Move(i as u16))
            .collect()
    }

    fn do_move(&mut self, mv: Move) {
        let cell = mv.0 as usize;
        debug_assert!(cell < 9 && self.board[cell] == 0, "illegal move {mv}");
        self.board[cell] = self.current_player;
        self.history.push(cell as u8);
        self.current_player = 3 - self.current_player;
    }

    fn undo_move(&mut self, mv: Move) {
        let cell = mv.0 as usize;
        let last = self.history.pop();
        debug_assert_eq!(last, Some(cell as u8), "undo out of order");
        self.board[cell] = 0;
        self.current_player = 3 - self.current_player;
    }

    fn move_name(&self, mv: Move) -> String {
        if mv.is_none() {
            return "(none)".to_string();
        }
        let cell = mv.0 as usize;
        let file = (b'a' + (cell % 3) as u8) as char;
        let rank = cell / 3 + 1;
        format!("{file}{rank}")
    }
}
