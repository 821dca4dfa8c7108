//! Shared-tree node with lock-free statistics.
//!
//! Every counter a descent touches is an independent atomic, so concurrent
//! workers never take a lock on the hot path. The only structural mutation
//! is child publication, which happens at most once per node and is guarded
//! by a compare-exchange on the expansion state; the child list itself sits
//! behind an `RwLock` that is only write-locked for publication and for
//! post-search reordering of the root.
//!
//! Perspective convention: `value_sum` accumulates evaluations from the
//! perspective of the side to move at this node's *parent* — the side that
//! played `mv`. `mean_value()` is therefore directly comparable across
//! siblings during selection, with larger meaning better for the selecting
//! side.

use std::sync::atomic::{AtomicU32, AtomicU64, AtomicU8, AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use game_core::{GamePosition, Move};
use rand::Rng;
use rand_distr::{Distribution, Gamma};

use crate::config::SearchConfig;
use crate::evaluator::{Evaluator, EvaluatorError};

/// Expansion state: children absent.
const EXPANSION_EMPTY: u8 = 0;
/// Expansion state: one thread is building the child list.
const EXPANSION_BUSY: u8 = 1;
/// Expansion state: children published.
const EXPANSION_DONE: u8 = 2;

/// f32 stored in an `AtomicU32` bit pattern. Priors are read on every
/// selection and rewritten once when root noise is applied.
struct AtomicF32(AtomicU32);

impl AtomicF32 {
    fn new(value: f32) -> Self {
        Self(AtomicU32::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f32 {
        f32::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f32) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }
}

/// f64 accumulator stored in an `AtomicU64` bit pattern, updated with a
/// compare-exchange loop.
struct AtomicF64(AtomicU64);

impl AtomicF64 {
    fn new(value: f64) -> Self {
        Self(AtomicU64::new(value.to_bits()))
    }

    #[inline]
    fn load(&self) -> f64 {
        f64::from_bits(self.0.load(Ordering::Relaxed))
    }

    #[inline]
    fn store(&self, value: f64) {
        self.0.store(value.to_bits(), Ordering::Relaxed);
    }

    #[inline]
    fn add(&self, delta: f64) {
        let _ = self
            .0
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |bits| {
                Some((f64::from_bits(bits) + delta).to_bits())
            });
    }
}

/// One node of the search tree.
pub struct UctNode {
    /// Move that led here from the parent (`Move::NONE` at the root).
    mv: Move,
    /// Policy prior for `mv` at the parent's position.
    prior: AtomicF32,
    /// Completed descents through this node.
    visits: AtomicU32,
    /// Accumulated evaluations, from the parent's side-to-move perspective.
    value_sum: AtomicF64,
    /// Descents currently in flight through this node.
    virtual_loss: AtomicU32,
    expansion: AtomicU8,
    children: RwLock<Vec<Arc<UctNode>>>,
}

impl UctNode {
    pub fn new(mv: Move, prior: f32) -> Self {
        Self {
            mv,
            prior: AtomicF32::new(prior),
            visits: AtomicU32::new(0),
            value_sum: AtomicF64::new(0.0),
            virtual_loss: AtomicU32::new(0),
            expansion: AtomicU8::new(EXPANSION_EMPTY),
            children: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    pub fn mv(&self) -> Move {
        self.mv
    }

    #[inline]
    pub fn prior(&self) -> f32 {
        self.prior.load()
    }

    #[inline]
    pub fn visits(&self) -> u32 {
        self.visits.load(Ordering::Relaxed)
    }

    #[inline]
    pub fn first_visit(&self) -> bool {
        self.visits() == 0
    }

    #[inline]
    pub fn virtual_loss(&self) -> u32 {
        self.virtual_loss.load(Ordering::Relaxed)
    }

    /// Whether children have been published.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.expansion.load(Ordering::Acquire) == EXPANSION_DONE
    }

    /// Snapshot of the child list (clones the `Arc`s, not the nodes).
    pub fn children(&self) -> Vec<Arc<UctNode>> {
        self.children.read().unwrap().clone()
    }

    /// Mean evaluation from the parent's side-to-move perspective.
    /// 0 when unvisited.
    #[inline]
    pub fn mean_value(&self) -> f32 {
        let visits = self.visits();
        if visits == 0 {
            0.0
        } else {
            (self.value_sum.load() / visits as f64) as f32
        }
    }

    /// Record a completed descent: one visit plus `value`, which the caller
    /// has already converted to the parent's perspective.
    pub fn update(&self, value: f32) {
        self.visits.fetch_add(1, Ordering::Relaxed);
        self.value_sum.add(value as f64);
    }

    pub fn apply_virtual_loss(&self) {
        self.virtual_loss.fetch_add(1, Ordering::Relaxed);
    }

    pub fn remove_virtual_loss(&self) {
        let previous = self.virtual_loss.fetch_sub(1, Ordering::Relaxed);
        debug_assert!(previous > 0, "virtual loss underflow");
    }

    /// Raw statistics pair, for transposition merging.
    pub(crate) fn stats(&self) -> (u32, f64) {
        (self.visits(), self.value_sum.load())
    }

    /// Overwrite statistics with another node's, for transposition merging.
    /// Racy by design; the table is best-effort.
    pub(crate) fn set_stats(&self, visits: u32, value_sum: f64) {
        self.visits.store(visits, Ordering::Relaxed);
        self.value_sum.store(value_sum);
    }

    /// Evaluate this position and publish one child per legal move.
    ///
    /// Returns `Ok(Some(value))` — the evaluation from the side to move at
    /// `pos` — when this call performed the expansion. Returns `Ok(None)`
    /// when another thread holds or completed the expansion; the caller
    /// produced no result and should fall through to selection. On
    /// evaluator failure the node is left unexpanded and a later descent
    /// may retry.
    pub fn create_children<P, E>(
        &self,
        node_count: &AtomicUsize,
        pos: &P,
        evaluator: &E,
    ) -> Result<Option<f32>, EvaluatorError>
    where
        P: GamePosition,
        E: Evaluator<P>,
    {
        if self
            .expansion
            .compare_exchange(
                EXPANSION_EMPTY,
                EXPANSION_BUSY,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_err()
        {
            return Ok(None);
        }

        let net = match evaluator.evaluate(pos) {
            Ok(net) => net,
            Err(err) => {
                self.expansion.store(EXPANSION_EMPTY, Ordering::Release);
                return Err(err);
            }
        };

        let moves = pos.legal_moves();
        debug_assert!(!moves.is_empty(), "expanding a terminal position");

        let children: Vec<Arc<UctNode>> = moves
            .iter()
            .map(|&mv| {
                let prior = net.policy.get(&mv).copied().unwrap_or(0.0);
                Arc::new(UctNode::new(mv, prior))
            })
            .collect();

        // Guardrail: if the policy covered none of the legal moves, fall
        // back to uniform priors so selection is not starved.
        let total: f32 = children.iter().map(|c| c.prior()).sum();
        if total <= 0.0 {
            let uniform = 1.0 / children.len() as f32;
            for child in &children {
                child.prior.store(uniform);
            }
        }

        let count = children.len();
        *self.children.write().unwrap() = children;
        node_count.fetch_add(count, Ordering::Relaxed);
        self.expansion.store(EXPANSION_DONE, Ordering::Release);

        Ok(Some(net.value))
    }

    /// PUCT selection among the children.
    ///
    /// Score = Q + c_puct * prior * sqrt(parent_visits) / (1 + n + vl),
    /// where Q counts in-flight descents as losses (the value sum does not
    /// grow while they are pending). Unvisited children score the
    /// first-play-urgency value. Ties break by insertion order.
    pub fn select_child(&self, config: &SearchConfig) -> Option<Arc<UctNode>> {
        let children = self.children.read().unwrap();
        if children.is_empty() {
            return None;
        }

        let parent_visits = self.visits();
        let numerator = (parent_visits as f32).sqrt();

        // The parent's own statistic is from *its* parent's perspective;
        // flip it to the side now choosing a child.
        let parent_q = if parent_visits == 0 {
            0.5
        } else {
            1.0 - self.mean_value()
        };
        let fpu = match config.fpu_reduction {
            Some(reduction) => (parent_q - reduction).max(0.0),
            None => 0.0,
        };

        let mut best: Option<&Arc<UctNode>> = None;
        let mut best_score = f32::NEG_INFINITY;

        for child in children.iter() {
            let in_flight = child.virtual_loss();
            let effective = child.visits() + in_flight;
            let q = if effective == 0 {
                fpu
            } else {
                (child.value_sum.load() / effective as f64) as f32
            };
            let u = config.c_puct * child.prior() * numerator / (1.0 + effective as f32);
            let score = q + u;
            if score > best_score {
                best_score = score;
                best = Some(child);
            }
        }

        best.cloned()
    }

    /// Best child by visits, then mean value. Used for principal-variation
    /// walks; does not reorder anything.
    pub fn best_child(&self) -> Option<Arc<UctNode>> {
        let children = self.children.read().unwrap();
        let mut best: Option<&Arc<UctNode>> = None;
        for child in children.iter() {
            let better = match best {
                None => true,
                Some(current) => {
                    child.visits() > current.visits()
                        || (child.visits() == current.visits()
                            && child.mean_value() > current.mean_value())
                }
            };
            if better {
                best = Some(child);
            }
        }
        best.cloned()
    }

    /// Reorder the children best-first (visits descending, mean value as
    /// the tie-break). Call only once the workers have stopped.
    pub fn sort_children(&self) {
        let mut children = self.children.write().unwrap();
        children.sort_by(|a, b| {
            b.visits()
                .cmp(&a.visits())
                .then_with(|| b.mean_value().total_cmp(&a.mean_value()))
        });
    }

    /// Promote one child to the front with probability proportional to its
    /// visit count. Early-game move diversification.
    pub fn randomize_first_proportionally<R: Rng>(&self, rng: &mut R) {
        let mut children = self.children.write().unwrap();
        let total: u64 = children.iter().map(|c| c.visits() as u64).sum();
        if total == 0 {
            return;
        }

        let mut pick = rng.gen_range(0..total);
        let mut index = 0;
        for (i, child) in children.iter().enumerate() {
            let visits = child.visits() as u64;
            if pick < visits {
                index = i;
                break;
            }
            pick -= visits;
        }
        children[..=index].rotate_right(1);
    }

    /// Replace each child prior p with (1-ε)p + ε·η, η ~ Dirichlet(α).
    /// Applied to the root only, once, before the workers start.
    pub fn apply_dirichlet_noise<R: Rng>(&self, epsilon: f32, alpha: f32, rng: &mut R) {
        let children = self.children.read().unwrap();
        if children.is_empty() {
            return;
        }

        let Ok(gamma) = Gamma::new(alpha as f64, 1.0) else {
            return;
        };
        let mut noise: Vec<f64> = (0..children.len()).map(|_| gamma.sample(rng)).collect();
        let sum: f64 = noise.iter().sum();
        if sum <= 0.0 {
            return;
        }
        for n in &mut noise {
            *n /= sum;
        }

        for (child, eta) in children.iter().zip(noise) {
            let mixed = (1.0 - epsilon) * child.prior() + epsilon * eta as f32;
            child.prior.store(mixed);
        }
    }
}
