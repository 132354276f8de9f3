use crate::board::Action;

/// Evaluation score. Static scores live in (−1, 1); exactly ±1 marks a
/// finished game, and mate scores found by the search exceed 1 in
/// magnitude (faster mates score higher).
pub type Score = f32;

pub const DEFAULT_DEPTH: u8 = 3;
pub const DEFAULT_MAX_NODES: u64 = 2_000_000;
pub const DEFAULT_SEED: u64 = 1;

/// Knobs for one search instance.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// iterative-deepening horizon.
    pub max_depth: u8,
    /// node budget; the current iteration is abandoned when it runs out.
    pub max_nodes: u64,
    /// seed for the root shuffle. Same seed + same position = same move.
    pub seed: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_DEPTH,
            max_nodes: DEFAULT_MAX_NODES,
            seed: DEFAULT_SEED,
        }
    }
}

/// Outcome of a search call.
#[derive(Clone, Debug)]
pub struct SearchResult {
    pub action: Action,
    /// score of `action` from the mover's viewpoint.
    pub score: Score,
    /// deepest fully completed iteration.
    pub depth: u8,
    /// positions visited.
    pub nodes: u64,
    /// the node budget ran out; `action` comes from the last completed
    /// depth. Not an error.
    pub truncated: bool,
}
