//! Parallel Monte Carlo Tree Search for two-player board games.
//!
//! The search grows a statistics-weighted game tree whose leaves are scored
//! by an external [`Evaluator`] (a win probability in `[0, 1]` plus a prior
//! over legal moves). Multiple worker threads descend the shared tree
//! simultaneously; per-node atomic counters and a virtual-loss scheme keep
//! them coordinated without locks on the hot path, and a bounded
//! transposition table merges statistics for positions reached through
//! different move orders.
//!
//! Each descent runs the classic four phases:
//!
//! 1. **Selection** — walk the tree by the PUCT rule, counting in-flight
//!    descents as losses so concurrent workers spread over the tree.
//! 2. **Expansion** — publish one child per legal move at the first visit
//!    of a leaf (at most once, even under contention).
//! 3. **Evaluation** — one evaluator call per expansion; terminal leaves
//!    score themselves, and leaves past the tree-size cap are evaluated in
//!    place.
//! 4. **Backup** — propagate the evaluation to the root, flipping the
//!    perspective at every level.
//!
//! # Usage
//!
//! ```rust,ignore
//! use mcts::{SearchConfig, UctSearch, UniformEvaluator};
//! use games_tictactoe::TicTacToe;
//!
//! let config = SearchConfig::default().with_playouts(800);
//! let mut search = UctSearch::new(TicTacToe::new(), UniformEvaluator::new(), config)?;
//! let best = search.think(); // Move::NONE means resign / no legal move
//! ```
//!
//! The search drives any rules engine implementing
//! [`game_core::GamePosition`]; it never inspects positions beyond that
//! contract.

pub mod config;
pub mod evaluator;
pub mod node;
pub mod results;
pub mod search;
pub mod ttable;

pub use config::SearchConfig;
pub use evaluator::{Evaluator, EvaluatorError, NetEval, UniformEvaluator};
pub use node::UctNode;
pub use results::SearchResult;
pub use search::{SearchError, StopToken, UctSearch};
pub use ttable::TranspositionTable;
