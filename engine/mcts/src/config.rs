//! Search configuration parameters.

/// Configuration for the UCT search.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Worker threads descending the shared tree (>= 1). The calling thread
    /// is one of them.
    pub num_threads: usize,

    /// Playout budget for `think()`. 0 means unbounded.
    pub max_playouts: u64,

    /// Exploration constant in the PUCT formula.
    pub c_puct: f32,

    /// First-play urgency: unvisited children score the parent's current Q
    /// minus this reduction. `None` scores them 0 instead.
    pub fpu_reduction: Option<f32>,

    /// Mix Dirichlet noise into the root priors before the workers start.
    pub root_noise: bool,

    /// Fraction of each root prior replaced by noise.
    pub dirichlet_epsilon: f32,

    /// Concentration of the symmetric Dirichlet.
    pub dirichlet_alpha: f32,

    /// While `game_ply` is below this, the returned move is sampled in
    /// proportion to root visit counts instead of taking the maximum.
    pub random_move_plies: u32,

    /// Resign when the best move's win rate falls below this percentage
    /// (and the position is old and visited enough).
    pub resign_percent: u32,

    /// Earliest ply at which resignation is allowed.
    pub min_resign_plies: u32,

    /// Suppress analysis output.
    pub quiet: bool,

    /// Hard cap on allocated tree nodes. Once reached, leaves are evaluated
    /// in place instead of expanded.
    pub max_tree_nodes: usize,

    /// Transposition-table slots. 0 disables the table.
    pub tt_slots: usize,

    /// Seed for the search RNG (noise, proportional move sampling). `None`
    /// seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_threads: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            max_playouts: 0,
            c_puct: 1.25,
            fpu_reduction: Some(0.25),
            root_noise: false,
            dirichlet_epsilon: 0.25,
            dirichlet_alpha: 0.3,
            random_move_plies: 0,
            resign_percent: 0,
            min_resign_plies: 0,
            quiet: false,
            max_tree_nodes: 10_000_000,
            tt_slots: 1 << 20,
            seed: None,
        }
    }
}

impl SearchConfig {
    /// A small deterministic config for tests: one thread, fixed seed,
    /// no noise, no resignation, quiet.
    pub fn for_testing() -> Self {
        Self {
            num_threads: 1,
            max_playouts: 100,
            root_noise: false,
            quiet: true,
            seed: Some(42),
            ..Self::default()
        }
    }

    pub fn with_threads(mut self, n: usize) -> Self {
        self.num_threads = n;
        self
    }

    pub fn with_playouts(mut self, n: u64) -> Self {
        self.max_playouts = n;
        self
    }

    pub fn with_c_puct(mut self, c: f32) -> Self {
        self.c_puct = c;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_tree_capacity(mut self, nodes: usize) -> Self {
        self.max_tree_nodes = nodes;
        self
    }

    pub fn with_tt_slots(mut self, slots: usize) -> Self {
        self.tt_slots = slots;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SearchConfig::default();
        assert!(config.num_threads >= 1);
        assert_eq!(config.max_playouts, 0);
        assert!((config.c_puct - 1.25).abs() < 1e-6);
        assert!((config.dirichlet_epsilon - 0.25).abs() < 1e-6);
        assert!((config.dirichlet_alpha - 0.3).abs() < 1e-6);
    }

    #[test]
    fn test_builder_pattern() {
        let config = SearchConfig::default()
            .with_threads(2)
            .with_playouts(500)
            .with_tree_capacity(1000);

        assert_eq!(config.num_threads, 2);
        assert_eq!(config.max_playouts, 500);
        assert_eq!(config.max_tree_nodes, 1000);
    }

    #[test]
    fn test_testing_config_is_deterministic() {
        let config = SearchConfig::for_testing();
        assert_eq!(config.num_threads, 1);
        assert!(config.seed.is_some());
        assert!(!config.root_noise);
    }
}
