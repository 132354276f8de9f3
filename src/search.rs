use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::board::{Action, BasicAction, Position};
use crate::evaluation::evaluate;
use crate::types::{Score, SearchConfig, SearchResult};

/// Iterative-deepening negamax with alpha-beta pruning.
///
/// Each `minimax` call owns its scratch state (best-line memory, node
/// counter, RNG reseeded from the config), so for a fixed seed the search
/// is a pure function of the position.
pub struct Search {
    config: SearchConfig,
    /// best action found at each ply in the previous iteration; tried
    /// first in the next one.
    best: Vec<Option<Action>>,
    nodes: u64,
    cancelled: bool,
}

impl Search {
    pub fn new(config: SearchConfig) -> Search {
        Search { config, best: Vec::new(), nodes: 0, cancelled: false }
    }

    /// Pick a move for the side to move in `pos`.
    ///
    /// `last` is the position before the opponent's previous action, if
    /// any; a root Attack that merely restores it is skipped so two
    /// captures cannot chase each other forever.
    pub fn minimax(&mut self, pos: &Position, last: Option<&Position>) -> SearchResult {
        let max_depth = self.config.max_depth.max(1);
        self.nodes = 0;
        self.cancelled = false;
        self.best = vec![None; max_depth as usize + 1];
        let mut rng = StdRng::seed_from_u64(self.config.seed);

        let mut chosen: Option<(Action, Score)> = None;
        let mut completed = 0u8;

        for d in 1..=max_depth {
            let mut candidates = pos.all_actions();
            // shuffle to break ties; the previous depth's choice goes first
            candidates.shuffle(&mut rng);
            if let Some(prev_best) = self.best[0].clone() {
                if let Some(i) = candidates.iter().position(|a| *a == prev_best) {
                    candidates.swap(0, i);
                }
            }

            let mut alpha = Score::NEG_INFINITY;
            let beta = Score::INFINITY;
            let mut best_here: Option<(Action, Score)> = None;

            for a in candidates {
                let next = match pos.apply(&a) {
                    Ok(next) => next.end_turn(),
                    Err(_) => continue,
                };
                if a.is_attack() && last.is_some_and(|lp| next == *lp) {
                    continue;
                }
                let v = -self.negamax(&next, pos, 1, d as i32 - 1, -beta, -alpha);
                if self.cancelled {
                    break;
                }
                if best_here.is_none() || v > alpha {
                    alpha = alpha.max(v);
                    best_here = Some((a, v));
                }
            }

            if self.cancelled {
                // abandoned iteration; keep the previous depth's answer
                break;
            }
            if let Some((a, v)) = best_here {
                self.best[0] = Some(a.clone());
                completed = d;
                if v.abs() >= 1.0 {
                    // proven result: credit the unspent depth so faster
                    // mates (and slower losses) win ties
                    let v = v + ((max_depth - d) as Score).copysign(v);
                    chosen = Some((a, v));
                    break;
                }
                chosen = Some((a, v));
            }
        }

        let (action, score) =
            chosen.unwrap_or_else(|| (Action::Basic(BasicAction::Pass), evaluate(pos)));
        SearchResult { action, score, depth: completed, nodes: self.nodes, truncated: self.cancelled }
    }

    fn negamax(
        &mut self,
        pos: &Position,
        prev: &Position,
        ply: usize,
        depth: i32,
        alpha: Score,
        beta: Score,
    ) -> Score {
        self.nodes += 1;
        if self.nodes > self.config.max_nodes {
            self.cancelled = true;
            return 0.0;
        }
        if pos.is_over() {
            // weight by remaining depth: winning sooner beats winning later
            return evaluate(pos) * (depth + 1) as Score;
        }
        if depth <= 0 {
            return evaluate(pos);
        }

        let mut acts = pos.all_actions();
        // principal-variation hint from the previous iteration; it may be
        // illegal in this sibling line, so a full validate gates it
        if let Some(hint) = self.best.get(ply).cloned().flatten() {
            if pos.validate(&hint) {
                if let Some(i) = acts.iter().position(|a| *a == hint) {
                    acts.swap(0, i);
                }
            }
        }

        let mut alpha = alpha;
        let mut best = Score::NEG_INFINITY;
        for a in acts {
            let next = match pos.apply(&a) {
                Ok(next) => next.end_turn(),
                Err(_) => continue,
            };
            if a.is_attack() && next == *prev {
                continue;
            }
            let v = -self.negamax(&next, pos, ply + 1, depth - 1, -beta, -alpha);
            if self.cancelled {
                return 0.0;
            }
            if v > best {
                best = v;
            }
            if v > alpha {
                alpha = v;
                if ply < self.best.len() {
                    self.best[ply] = Some(a.clone());
                }
            }
            if alpha >= beta {
                break;
            }
        }
        best
    }
}
