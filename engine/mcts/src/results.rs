//! Outcome of a single descent.

/// What one descent through the tree produced.
///
/// `Invalid` means the descent yielded nothing (the evaluator failed, or a
/// concurrent expansion won the race); it is not counted as a playout.
/// `Eval` carries an evaluation in `[0, 1]` from the perspective of the side
/// to move at the node that returned it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SearchResult {
    Invalid,
    Eval(f32),
}

impl SearchResult {
    /// Wrap a network evaluation (already in `[0, 1]`).
    #[inline]
    pub fn from_eval(eval: f32) -> Self {
        debug_assert!((0.0..=1.0).contains(&eval), "eval out of range: {eval}");
        SearchResult::Eval(eval)
    }

    /// Map a terminal score in {-1, 0, +1} (from the mover's perspective)
    /// to an evaluation: loss → 0, draw → 0.5, win → 1.
    #[inline]
    pub fn from_score(score: f32) -> Self {
        SearchResult::Eval((score + 1.0) / 2.0)
    }

    #[inline]
    pub fn valid(&self) -> bool {
        matches!(self, SearchResult::Eval(_))
    }

    /// The evaluation, if the descent produced one.
    #[inline]
    pub fn eval(&self) -> Option<f32> {
        match self {
            SearchResult::Eval(e) => Some(*e),
            SearchResult::Invalid => None,
        }
    }
}
