//! Top-level search driver.
//!
//! `UctSearch` owns the root position and the root of the shared tree, runs
//! the configured number of worker threads over it, and extracts the best
//! move when the playout budget is spent or the stop token fires. Each
//! worker repeatedly clones the root position and runs one descent
//! (`play_simulation`): transposition sync, virtual loss, terminal scoring
//! or expansion or in-place evaluation, recursive selection, backup.
//!
//! A `UctSearch` is single-use: one `think()` or `ponder()` per value.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use game_core::{GamePosition, GameStatus, Move, Side};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::evaluator::Evaluator;
use crate::node::UctNode;
use crate::results::SearchResult;
use crate::ttable::TranspositionTable;

/// Wall-clock spacing of analysis lines during `think()`.
const ANALYSIS_INTERVAL: Duration = Duration::from_millis(2500);

/// Root visits required before resignation is considered.
const RESIGN_MIN_VISITS: u32 = 500;

/// Errors from search construction.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}

/// Cloneable handle that cancels a running search.
///
/// Clearing the flag makes every worker exit after its current descent;
/// there is no mid-descent cancellation. This is also how "input pending"
/// reaches `ponder()`. The flag is armed when the search is constructed,
/// so stopping before `think()` starts is safe and simply yields a search
/// with no playouts beyond the first round.
#[derive(Clone)]
pub struct StopToken {
    running: Arc<AtomicBool>,
}

impl StopToken {
    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }
}

/// Parallel UCT search over a shared tree.
pub struct UctSearch<P, E> {
    root_pos: P,
    evaluator: E,
    config: SearchConfig,
    root: Arc<UctNode>,
    tt: TranspositionTable,
    node_count: AtomicUsize,
    playouts: AtomicU64,
    running: Arc<AtomicBool>,
    max_playouts: u64,
    rng: Mutex<ChaCha20Rng>,
}

impl<P, E> UctSearch<P, E>
where
    P: GamePosition,
    E: Evaluator<P>,
{
    pub fn new(root_pos: P, evaluator: E, config: SearchConfig) -> Result<Self, SearchError> {
        if config.num_threads == 0 {
            return Err(SearchError::InvalidConfig("num_threads must be >= 1"));
        }
        if !(config.c_puct.is_finite() && config.c_puct > 0.0) {
            return Err(SearchError::InvalidConfig("c_puct must be finite and > 0"));
        }
        if config.max_tree_nodes == 0 {
            return Err(SearchError::InvalidConfig("max_tree_nodes must be > 0"));
        }
        if config.root_noise && !(0.0..=1.0).contains(&config.dirichlet_epsilon) {
            return Err(SearchError::InvalidConfig(
                "dirichlet_epsilon must be within [0, 1]",
            ));
        }

        let rng = match config.seed {
            Some(seed) => ChaCha20Rng::seed_from_u64(seed),
            None => ChaCha20Rng::from_entropy(),
        };

        let max_playouts = resolve_playout_limit(config.max_playouts);
        let tt = TranspositionTable::new(config.tt_slots);

        Ok(Self {
            root_pos,
            evaluator,
            config,
            root: Arc::new(UctNode::new(Move::NONE, 1.0)),
            tt,
            node_count: AtomicUsize::new(0),
            playouts: AtomicU64::new(0),
            running: Arc::new(AtomicBool::new(true)),
            max_playouts,
            rng: Mutex::new(rng),
        })
    }

    /// Playout budget; 0 means unbounded.
    pub fn set_playout_limit(&mut self, playouts: u64) {
        self.max_playouts = resolve_playout_limit(playouts);
    }

    /// Handle for cancelling this search from another thread.
    pub fn stop_token(&self) -> StopToken {
        StopToken {
            running: Arc::clone(&self.running),
        }
    }

    /// Completed playouts (descents that produced a valid result).
    pub fn playouts(&self) -> u64 {
        self.playouts.load(Ordering::Relaxed)
    }

    /// Nodes allocated in the tree, root excluded.
    pub fn tree_nodes(&self) -> usize {
        self.node_count.load(Ordering::Relaxed)
    }

    /// The root of the search tree (for inspection).
    pub fn root_node(&self) -> &Arc<UctNode> {
        &self.root
    }

    /// Search until the playout budget is reached or the stop token fires,
    /// then return the chosen move (`Move::NONE` to resign, or when the
    /// root has no legal move).
    pub fn think(&mut self) -> Move {
        let start = Instant::now();
        if !self.prepare_root() {
            return Move::NONE;
        }

        if self.config.root_noise {
            let mut rng = self.rng.lock().unwrap();
            self.root.apply_dirichlet_noise(
                self.config.dirichlet_epsilon,
                self.config.dirichlet_alpha,
                &mut *rng,
            );
        }

        self.run_workers(|search| {
            let mut last_report = Instant::now();
            loop {
                search.run_descent();
                if last_report.elapsed() >= ANALYSIS_INTERVAL {
                    last_report = Instant::now();
                    search.dump_analysis();
                }
                if !search.keep_running() {
                    break;
                }
            }
        });

        self.dump_stats();
        if !self.config.quiet {
            let elapsed = start.elapsed().as_secs_f64().max(1e-3);
            let playouts = self.playouts();
            info!(
                "{} visits, {} nodes, {} playouts, {:.0} n/s",
                self.root.visits(),
                self.tree_nodes(),
                playouts,
                playouts as f64 / elapsed
            );
        }
        self.get_best_move()
    }

    /// Search without a playout budget until the stop token fires.
    pub fn ponder(&mut self) -> Move {
        if !self.prepare_root() {
            return Move::NONE;
        }
        self.max_playouts = u64::MAX;

        self.run_workers(|search| loop {
            search.run_descent();
            if !search.keep_running() {
                break;
            }
        });

        self.dump_stats();
        if !self.config.quiet {
            info!("{} visits, {} nodes", self.root.visits(), self.tree_nodes());
        }
        self.get_best_move()
    }

    /// Expand the root and report whether a search can run at all.
    fn prepare_root(&mut self) -> bool {
        assert_eq!(self.playouts(), 0, "search state must be fresh");
        assert_eq!(self.tree_nodes(), 0, "search state must be fresh");

        if self.root_pos.status().is_terminal() {
            return false;
        }

        let root_eval =
            match self
                .root
                .create_children(&self.node_count, &self.root_pos, &self.evaluator)
            {
                Ok(Some(eval)) => eval,
                Ok(None) => unreachable!("fresh root cannot already be expanded"),
                Err(err) => {
                    warn!("root evaluation failed, no search possible: {err}");
                    return false;
                }
            };

        if !self.config.quiet {
            // Reported from White's point of view regardless of who moves.
            let shown = match self.root_pos.side_to_move() {
                Side::White => root_eval,
                Side::Black => 1.0 - root_eval,
            };
            info!("NN eval={shown:.6}");
        }
        true
    }

    /// Spawn the worker threads, run `main_loop` on the calling thread, and
    /// join everything before returning.
    fn run_workers(&mut self, main_loop: impl FnOnce(&Self)) {
        let search: &Self = self;
        thread::scope(|scope| {
            for _ in 1..search.config.num_threads {
                scope.spawn(|| search.worker_loop());
            }
            main_loop(search);
            search.running.store(false, Ordering::Release);
        });
    }

    fn worker_loop(&self) {
        loop {
            self.run_descent();
            if !self.keep_running() {
                break;
            }
        }
    }

    fn run_descent(&self) {
        let mut pos = self.root_pos.clone();
        let result = self.play_simulation(&mut pos, &self.root);
        if result.valid() {
            self.playouts.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn keep_running(&self) -> bool {
        self.running.load(Ordering::Acquire) && !self.playout_limit_reached()
    }

    fn playout_limit_reached(&self) -> bool {
        self.playouts() >= self.max_playouts
    }

    /// One descent through the shared tree.
    ///
    /// Returns the evaluation from the perspective of the side to move at
    /// `node`, or `Invalid` when no result was produced (evaluator failure,
    /// or a concurrent expansion held the node). The node's own statistic
    /// is updated with the value flipped to its parent's perspective.
    pub fn play_simulation(&self, pos: &mut P, node: &Arc<UctNode>) -> SearchResult {
        let hash = pos.key();
        self.tt.sync(hash, node);
        node.apply_virtual_loss();

        let mut result = SearchResult::Invalid;

        if !node.has_children() {
            match pos.status() {
                GameStatus::Checkmate => {
                    // The side to move has lost.
                    result = SearchResult::from_score(-1.0);
                }
                GameStatus::Stalemate | GameStatus::Draw => {
                    result = SearchResult::from_score(0.0);
                }
                GameStatus::Ongoing => {
                    if self.node_count.load(Ordering::Relaxed) < self.config.max_tree_nodes {
                        match node.create_children(&self.node_count, pos, &self.evaluator) {
                            Ok(Some(eval)) => result = SearchResult::from_eval(eval),
                            Ok(None) => {} // another thread holds the expansion
                            Err(err) => debug!("expansion failed: {err}"),
                        }
                    } else {
                        // Tree is at capacity: score the leaf without
                        // growing the tree.
                        match self.evaluator.evaluate(pos) {
                            Ok(net) => result = SearchResult::from_eval(net.value),
                            Err(err) => debug!("leaf evaluation failed: {err}"),
                        }
                    }
                }
            }
        }

        if !result.valid() && node.has_children() {
            if let Some(child) = node.select_child(&self.config) {
                let mv = child.mv();
                pos.do_move(mv);
                let child_result = self.play_simulation(pos, &child);
                pos.undo_move(mv);
                if let Some(eval) = child_result.eval() {
                    // The child reported from its own side to move; one
                    // flip per level.
                    result = SearchResult::from_eval(1.0 - eval);
                }
            }
        }

        if let Some(eval) = result.eval() {
            node.update(1.0 - eval);
        }
        node.remove_virtual_loss();
        self.tt.publish(hash, node);

        result
    }

    /// Choose the move to play: most-visited root child, with optional
    /// proportional sampling in the early game and a resignation check.
    pub fn get_best_move(&self) -> Move {
        self.root.sort_children();

        if self.root_pos.game_ply() < self.config.random_move_plies {
            let mut rng = self.rng.lock().unwrap();
            self.root.randomize_first_proportionally(&mut *rng);
        }

        let children = self.root.children();
        let Some(first) = children.first() else {
            return Move::NONE;
        };
        let best_move = first.mv();

        // No statistics at all: play the prior-ordered move anyway.
        if first.first_visit() {
            return best_move;
        }

        let best_winrate = first.mean_value();
        if best_winrate < self.config.resign_percent as f32 / 100.0
            && self.root.visits() > RESIGN_MIN_VISITS
            && self.root_pos.game_ply() > self.config.min_resign_plies
        {
            info!("Score looks bad. Resigning.");
            return Move::NONE;
        }
        best_move
    }

    /// Principal variation from the root, as rendered move names.
    pub fn principal_variation(&self) -> String {
        let mut pos = self.root_pos.clone();
        self.pv_from(&mut pos, &self.root)
    }

    fn pv_from(&self, pos: &mut P, node: &Arc<UctNode>) -> String {
        if !node.has_children() {
            return String::new();
        }
        let Some(best) = node.best_child() else {
            return String::new();
        };
        let mv = best.mv();
        let mut line = pos.move_name(mv);
        pos.do_move(mv);
        let rest = self.pv_from(pos, &best);
        pos.undo_move(mv);
        if !rest.is_empty() {
            line.push(' ');
            line.push_str(&rest);
        }
        line
    }

    /// Periodic analysis line, emitted from the main search thread.
    fn dump_analysis(&self) {
        if self.config.quiet || self.root.first_visit() {
            return;
        }
        let playouts = self.playouts();
        // Root statistics are from its opponent's perspective; flip for the
        // side to move.
        let winrate = 100.0 * (1.0 - self.root.mean_value());
        let pv = self.principal_variation();
        info!("Playouts: {playouts}, Win: {winrate:.2}%, PV: {pv}");
    }

    /// Post-search table of the top root children.
    fn dump_stats(&self) {
        if self.config.quiet || !self.root.has_children() {
            return;
        }
        self.root.sort_children();

        let children = self.root.children();
        if children.first().map_or(true, |c| c.first_visit()) {
            return;
        }

        let mut pos = self.root_pos.clone();
        for (idx, child) in children.iter().enumerate() {
            // Always show the top two; beyond that, only visited moves.
            if idx >= 2 && child.first_visit() {
                break;
            }
            let name = pos.move_name(child.mv());
            let winrate = 100.0 * child.mean_value();

            pos.do_move(child.mv());
            let continuation = self.pv_from(&mut pos, child);
            pos.undo_move(child.mv());
            let pv = if continuation.is_empty() {
                name.clone()
            } else {
                format!("{name} {continuation}")
            };

            info!(
                "{:>4} -> {:7} (V: {:5.2}%) (N: {:5.2}%) PV: {}",
                name,
                child.visits(),
                winrate,
                100.0 * child.prior(),
                pv
            );
        }
    }
}

fn resolve_playout_limit(playouts: u64) -> u64 {
    if playouts == 0 {
        u64::MAX
    } else {
        playouts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::UniformEvaluator;
    use crate::testutil::FailingEvaluator;
    use games_tictactoe::TicTacToe;

    fn quiet_config() -> SearchConfig {
        SearchConfig::for_testing().with_tt_slots(0)
    }

    fn walk_tree(node: &Arc<UctNode>, f: &mut impl FnMut(&Arc<UctNode>)) {
        f(node);
        for child in node.children() {
            walk_tree(&child, f);
        }
    }

    /// Visit-count bookkeeping: a visited non-root node with children was
    /// visited once as a leaf and once per descent into a child; the root
    /// only relays.
    fn check_visit_sums(node: &Arc<UctNode>, is_root: bool) {
        if !node.has_children() {
            return;
        }
        let children = node.children();
        let child_sum: u32 = children.iter().map(|c| c.visits()).sum();
        if is_root {
            assert_eq!(node.visits(), child_sum, "root visits must equal child sum");
        } else if node.visits() > 0 {
            assert_eq!(
                node.visits(),
                1 + child_sum,
                "expanded node visits must be 1 + child sum"
            );
        }
        for child in children {
            check_visit_sums(&child, false);
        }
    }

    #[test]
    fn test_think_finds_mate_in_one() {
        // X X . / O O . / . . .  — X to move, c1 (cell 2) mates.
        let pos = TicTacToe::from_board([1, 1, 0, 2, 2, 0, 0, 0, 0], game_core::Side::White);
        let config = quiet_config().with_playouts(400);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();

        let best = search.think();
        assert_eq!(best, TicTacToe::move_at(2));

        // The winning child's statistic approaches certainty.
        let first = &search.root.children()[0];
        assert_eq!(first.mv(), TicTacToe::move_at(2));
        assert!(
            first.mean_value() > 0.9,
            "mating move should score near 1, got {}",
            first.mean_value()
        );
    }

    #[test]
    fn test_stalemate_leaf_backs_up_a_draw() {
        // One empty cell; filling it ends the game with no line.
        let pos = TicTacToe::from_board([1, 2, 1, 1, 2, 2, 2, 1, 0], game_core::Side::White);
        let config = quiet_config().with_playouts(50);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();

        let best = search.think();
        assert_eq!(best, TicTacToe::move_at(8));

        let only = &search.root.children()[0];
        assert!(
            (only.mean_value() - 0.5).abs() < 1e-6,
            "stalemate must back up 0.5, got {}",
            only.mean_value()
        );
    }

    #[test]
    fn test_checkmated_leaf_scores_zero_for_the_mated_side() {
        // Descend by hand into the mating move; the terminal child reports
        // 0 for the mated side and its statistic reads 1 for the mater.
        let root_pos = TicTacToe::from_board([1, 1, 0, 2, 2, 0, 0, 0, 0], game_core::Side::White);
        let search =
            UctSearch::new(root_pos.clone(), UniformEvaluator::new(), quiet_config()).unwrap();

        // First descent expands the root and returns the network eval.
        let mut pos = root_pos.clone();
        let first = search.play_simulation(&mut pos, &search.root);
        assert!(first.valid());

        for _ in 0..30 {
            let mut pos = root_pos.clone();
            let result = search.play_simulation(&mut pos, &search.root);
            assert!(result.valid());
        }

        let mate_child = search
            .root
            .children()
            .into_iter()
            .find(|c| c.mv() == TicTacToe::move_at(2))
            .unwrap();
        assert!(mate_child.visits() > 0);
        assert!((mate_child.mean_value() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_descent_preserves_the_position() {
        let root_pos = TicTacToe::new();
        let search =
            UctSearch::new(root_pos.clone(), UniformEvaluator::new(), quiet_config()).unwrap();

        let mut pos = root_pos.clone();
        let key = pos.key();
        let side = pos.side_to_move();
        for _ in 0..100 {
            search.play_simulation(&mut pos, &search.root);
            assert_eq!(pos.key(), key, "descent must leave the position unchanged");
            assert_eq!(pos.side_to_move(), side);
        }
    }

    #[test]
    fn test_single_thread_fixed_seed_is_deterministic() {
        let run = || {
            let pos = TicTacToe::new();
            let mut config = quiet_config().with_playouts(200).with_seed(9001);
            config.root_noise = true;
            let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
            let best = search.think();
            let visits: Vec<(Move, u32)> = search
                .root
                .children()
                .iter()
                .map(|c| (c.mv(), c.visits()))
                .collect();
            (best, visits)
        };

        let (best_a, visits_a) = run();
        let (best_b, visits_b) = run();
        assert_eq!(best_a, best_b);
        assert_eq!(visits_a, visits_b);
    }

    #[test]
    fn test_two_threads_leave_no_virtual_loss_behind() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_threads(2).with_playouts(500);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();

        let playouts = search.playouts();
        assert!(playouts >= 500);
        assert!(playouts <= 502, "at most one overshoot per thread");
        assert_eq!(search.root.visits() as u64, playouts);

        walk_tree(&search.root, &mut |node| {
            assert_eq!(node.virtual_loss(), 0, "virtual loss must drain to zero");
        });
    }

    #[test]
    fn test_visit_sums_and_value_ranges() {
        let pos = TicTacToe::from_board([1, 2, 0, 0, 1, 0, 0, 0, 0], game_core::Side::Black);
        let config = quiet_config().with_playouts(300);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();

        check_visit_sums(&search.root, true);
        walk_tree(&search.root, &mut |node| {
            if node.visits() > 0 {
                let mean = node.mean_value();
                assert!(
                    (0.0..=1.0).contains(&mean),
                    "mean value out of range: {mean}"
                );
            }
        });
    }

    #[test]
    fn test_playout_budget_is_exact_single_threaded() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_playouts(250);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();

        assert_eq!(search.playouts(), 250);
        assert_eq!(search.root.visits(), 250);
    }

    #[test]
    fn test_tree_capacity_switches_to_in_place_evaluation() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_playouts(1500).with_tree_capacity(50);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();

        // The capacity check is advisory: one expansion may overshoot by at
        // most the root's branching factor.
        assert!(
            search.tree_nodes() <= 50 + 9,
            "tree grew past the cap: {}",
            search.tree_nodes()
        );
        // Playouts keep completing via in-place evaluation.
        assert_eq!(search.playouts(), 1500);
    }

    #[test]
    fn test_resigns_a_lost_position() {
        // X has three mating threats; every O reply loses.
        // X . . / O X . / O . .  with X on 0,1,4 — board below: X at
        // 0, 1, 4; O at 3, 6; O to move.
        let pos = TicTacToe::from_board([1, 1, 0, 2, 1, 0, 2, 0, 0], game_core::Side::Black);
        let mut config = quiet_config().with_playouts(600);
        config.resign_percent = 10;
        config.min_resign_plies = 0;
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();

        let best = search.think();
        assert_eq!(best, Move::NONE, "hopeless position should resign");
    }

    #[test]
    fn test_resignation_respects_minimum_ply() {
        let pos = TicTacToe::from_board([1, 1, 0, 2, 1, 0, 2, 0, 0], game_core::Side::Black);
        let mut config = quiet_config().with_playouts(600);
        config.resign_percent = 10;
        config.min_resign_plies = 100;
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();

        let best = search.think();
        assert!(best.is_some(), "resignation forbidden before the ply floor");
    }

    #[test]
    fn test_stop_token_ends_an_unbounded_search() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_threads(2).with_playouts(0);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        let token = search.stop_token();

        let best = thread::scope(|scope| {
            scope.spawn(move || {
                thread::sleep(Duration::from_millis(50));
                token.stop();
            });
            search.think()
        });
        assert!(best.is_some());
    }

    #[test]
    fn test_ponder_runs_until_stopped() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_threads(2);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        let token = search.stop_token();

        let best = thread::scope(|scope| {
            scope.spawn(move || {
                thread::sleep(Duration::from_millis(50));
                token.stop();
            });
            search.ponder()
        });
        assert!(best.is_some());
        assert!(search.playouts() > 0);

        walk_tree(&search.root, &mut |node| {
            assert_eq!(node.virtual_loss(), 0);
        });
    }

    #[test]
    fn test_terminal_root_returns_no_move() {
        // Checkmate on the board: the side to move has already lost.
        let mut board = [0u8; 9];
        board[0] = 1;
        board[1] = 1;
        board[2] = 1;
        board[3] = 2;
        board[4] = 2;
        let pos = TicTacToe::from_board(board, game_core::Side::Black);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), quiet_config()).unwrap();
        assert_eq!(search.think(), Move::NONE);
    }

    #[test]
    fn test_failing_evaluator_yields_no_move() {
        let pos = TicTacToe::new();
        let mut search = UctSearch::new(pos, FailingEvaluator, quiet_config()).unwrap();
        assert_eq!(search.think(), Move::NONE);
        assert_eq!(search.playouts(), 0);
    }

    #[test]
    fn test_transposition_table_smoke() {
        // Tic-tac-toe transposes heavily; the search must stay sane with
        // merging enabled (exact visit accounting is not expected here).
        let pos = TicTacToe::new();
        let config = SearchConfig::for_testing()
            .with_playouts(300)
            .with_tt_slots(256);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();

        let best = search.think();
        assert!(best.is_some());
        assert!(search.tree_nodes() > 9);
        walk_tree(&search.root, &mut |node| {
            assert_eq!(node.virtual_loss(), 0);
        });
    }

    #[test]
    fn test_principal_variation_starts_with_the_best_move() {
        let pos = TicTacToe::from_board([1, 1, 0, 2, 2, 0, 0, 0, 0], game_core::Side::White);
        let config = quiet_config().with_playouts(200);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();

        let pv = search.principal_variation();
        assert!(
            pv.starts_with("c1"),
            "PV should open with the mating move, got {pv:?}"
        );
    }

    #[test]
    fn test_proportional_sampling_in_the_opening() {
        // With the randomization window open, the move is sampled from the
        // visit distribution; with a fixed seed it is still reproducible.
        let run = |seed: u64| {
            let pos = TicTacToe::new();
            let mut config = quiet_config().with_playouts(100).with_seed(seed);
            config.random_move_plies = 30;
            let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
            search.think()
        };
        assert_eq!(run(5), run(5));
    }

    #[test]
    fn test_set_playout_limit_zero_means_unbounded() {
        let pos = TicTacToe::new();
        let mut search =
            UctSearch::new(pos, UniformEvaluator::new(), quiet_config()).unwrap();
        search.set_playout_limit(0);
        assert_eq!(search.max_playouts, u64::MAX);
        search.set_playout_limit(123);
        assert_eq!(search.max_playouts, 123);
    }

    #[test]
    fn test_zero_threads_is_rejected() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_threads(0);
        assert!(matches!(
            UctSearch::new(pos, UniformEvaluator::new(), config),
            Err(SearchError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_bad_c_puct_is_rejected() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_c_puct(f32::NAN);
        assert!(UctSearch::new(pos, UniformEvaluator::new(), config).is_err());
    }

    #[test]
    #[should_panic(expected = "search state must be fresh")]
    fn test_search_state_is_single_use() {
        let pos = TicTacToe::new();
        let config = quiet_config().with_playouts(10);
        let mut search = UctSearch::new(pos, UniformEvaluator::new(), config).unwrap();
        search.think();
        search.think();
    }
}
