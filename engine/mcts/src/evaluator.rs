//! Evaluator contract for position scoring.
//!
//! The evaluator supplies a scalar win probability and a prior distribution
//! over legal moves. In production this wraps a neural network; for tests
//! the uniform evaluator below is enough to drive the search.

use game_core::{GamePosition, Move};
use rustc_hash::FxHashMap;
use thiserror::Error;

/// Errors surfaced by an evaluator.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("evaluation failed: {0}")]
    EvaluationFailed(String),

    #[error("evaluator unavailable: {0}")]
    Unavailable(String),
}

/// Result of evaluating a position.
#[derive(Debug, Clone)]
pub struct NetEval {
    /// Win probability in `[0, 1]` for the side to move.
    pub value: f32,

    /// Prior probability per legal move. Moves absent from the map are
    /// treated as prior 0; the present values should sum to ~1.
    pub policy: FxHashMap<Move, f32>,
}

/// Trait for position evaluators.
///
/// Called concurrently from every search thread; implementations must be
/// thread-safe.
pub trait Evaluator<P: GamePosition>: Send + Sync {
    fn evaluate(&self, pos: &P) -> Result<NetEval, EvaluatorError>;
}

/// Assigns equal priors to all legal moves and a neutral value. Useful for
/// testing the search without a model.
#[derive(Debug, Clone, Copy, Default)]
pub struct UniformEvaluator;

impl UniformEvaluator {
    pub fn new() -> Self {
        Self
    }
}

impl<P: GamePosition> Evaluator<P> for UniformEvaluator {
    fn evaluate(&self, pos: &P) -> Result<NetEval, EvaluatorError> {
        let moves = pos.legal_moves();
        let mut policy = FxHashMap::default();
        if !moves.is_empty() {
            let prior = 1.0 / moves.len() as f32;
            for mv in moves {
                policy.insert(mv, prior);
            }
        }
        Ok(NetEval { value: 0.5, policy })
    }
}
