//! Shared contract between the search and a rules engine.
//!
//! The search never inspects a position directly; it drives any game that
//! implements [`GamePosition`]. The trait is shaped for chess-family games:
//! two alternating players, a legal-move generator, terminal detection with
//! checkmate/stalemate/draw, and a 64-bit Zobrist key for transposition
//! detection.

use std::fmt;

/// Opaque move identifier supplied by the rules engine.
///
/// The encoding is game-specific; the search only stores and compares moves.
/// [`Move::NONE`] is reserved and means "no move" (used by the search to
/// signal resignation or the absence of a legal move).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move(pub u16);

impl Move {
    /// Reserved sentinel: no move / resign.
    pub const NONE: Move = Move(u16::MAX);

    #[inline]
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }

    #[inline]
    pub fn is_some(self) -> bool {
        !self.is_none()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            write!(f, "(none)")
        } else {
            write!(f, "#{}", self.0)
        }
    }
}

/// The two players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    White,
    Black,
}

impl Side {
    #[inline]
    pub fn opponent(self) -> Side {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }
}

/// Terminal verdict for a position, from the point of view of the side to
/// move.
///
/// `Checkmate` means the side to move has lost. `Stalemate` means the side
/// to move has no legal move but has not lost. `Draw` covers rule-based
/// draws (repetition, move counters, dead positions) where legal moves may
/// still exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameStatus {
    Ongoing,
    Checkmate,
    Stalemate,
    Draw,
}

impl GameStatus {
    #[inline]
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// A game position the search can drive.
///
/// Implementations carry whatever history they need so that `status()` can
/// detect rule-based draws on its own and `undo_move` can restore the
/// previous state exactly (including the Zobrist key).
///
/// `Clone` must produce an independent position that shares the history
/// needed for draw detection; the search clones the root position once per
/// descent and walks it with `do_move`/`undo_move`.
pub trait GamePosition: Clone + Send + Sync {
    /// Side to move.
    fn side_to_move(&self) -> Side;

    /// 64-bit Zobrist key. Equal keys are treated as transpositions.
    fn key(&self) -> u64;

    /// Number of half-moves played from the game's start position.
    fn game_ply(&self) -> u32;

    /// Terminal verdict for this position.
    fn status(&self) -> GameStatus;

    /// All legal moves for the side to move. Empty exactly when the
    /// position is checkmate or stalemate.
    fn legal_moves(&self) -> Vec<Move>;

    /// Play `mv` in place. `mv` must be legal.
    fn do_move(&mut self, mv: Move);

    /// Retract `mv`, which must be the most recently played move.
    fn undo_move(&mut self, mv: Move);

    /// Human-readable rendering of `mv` in this position, for analysis
    /// output.
    fn move_name(&self, mv: Move) -> String {
        mv.to_string()
    }
}
