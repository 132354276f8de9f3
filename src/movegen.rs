use arrayvec::ArrayVec;

use crate::board::{Action, BasicAction, Color, Piece, Position, SacrificeAction};

/// Above this many sacrifice chains, drop chains that land in the same
/// position (sort by resulting position, dedup neighbours).
const DEDUP_THRESHOLD: usize = 100;

/// Once this many chains exist, size-3 Yellow sacrifices are not extended
/// past two moves. A pragmatic cap on the worst combinatorial blow-up, not
/// a rule change.
const YELLOW_CHAIN_BUDGET: usize = 4096;

/// Every legal single action for the side to move, `Pass` first.
///
/// Walks each star and emits per available power: Builds (smallest size in
/// stock per fleet color), Trades (same size, different color, in stock),
/// Attacks (opponent ships not outsizing the attacker's largest), Moves
/// (connected stars) and Discoveries (bank pieces the star would connect
/// to).
pub fn basic_actions(pos: &Position) -> Vec<BasicAction> {
    let mut acts = Vec::with_capacity(64);
    acts.push(BasicAction::Pass);
    for sys in 0..pos.stars().len() {
        let powers = pos.stars()[sys].powers(pos.player());
        if powers.contains(Color::Green) {
            builds_at(pos, sys, &mut acts);
        }
        if powers.contains(Color::Blue) {
            trades_at(pos, sys, &mut acts);
        }
        if powers.contains(Color::Red) {
            attacks_at(pos, sys, &mut acts);
        }
        if powers.contains(Color::Yellow) {
            moves_at(pos, sys, &mut acts);
            discoveries_at(pos, sys, &mut acts);
        }
    }
    acts
}

/// Every legal sacrifice chain for the side to move, including all partial
/// chains. Each ship of size n seeds a depth-first enumeration of up to n
/// sub-actions of the ship's color, each applied to a scratch position so
/// later sub-actions see gc'd and appended stars at their real indices.
pub fn sacrifice_actions(pos: &Position) -> Vec<SacrificeAction> {
    let player = pos.player();
    let mut out: Vec<(SacrificeAction, Position)> = Vec::new();
    for sys in 0..pos.stars().len() {
        for (ship, _) in pos.stars()[sys].ships(player).iter() {
            let mut tmp = pos.clone();
            tmp.begin_sacrifice(ship, sys)
                .expect("generator sacrifices a ship it just enumerated");
            let seed = SacrificeAction { ship, system: sys, actions: ArrayVec::new() };
            extend_chains(&tmp, seed, ship.size() as usize, &mut out);
        }
    }
    if out.len() > DEDUP_THRESHOLD {
        out.sort_unstable_by(|a, b| a.1.cmp(&b.1));
        out.dedup_by(|a, b| a.1 == b.1);
    }
    out.into_iter().map(|(sa, _)| sa).collect()
}

fn extend_chains(
    pos: &Position,
    prefix: SacrificeAction,
    budget: usize,
    out: &mut Vec<(SacrificeAction, Position)>,
) {
    let color = prefix.ship.color();
    let mut subs = Vec::new();
    color_actions(pos, color, &mut subs);
    for a in subs {
        let next = match pos.apply_powered(a, color) {
            Ok(next) => next,
            Err(_) => continue,
        };
        let mut chain = prefix.clone();
        chain.actions.push(a);
        let capped =
            color == Color::Yellow && chain.actions.len() >= 2 && out.len() >= YELLOW_CHAIN_BUDGET;
        out.push((chain.clone(), next.clone()));
        if budget > 1 && !capped {
            extend_chains(&next, chain, budget - 1, out);
        }
    }
}

/// Sub-actions a sacrificed color buys, across every star. Unlike
/// `basic_actions` there is no power gate; having the right ships in the
/// right places is the only constraint.
fn color_actions(pos: &Position, color: Color, out: &mut Vec<BasicAction>) {
    for sys in 0..pos.stars().len() {
        match color {
            Color::Green => builds_at(pos, sys, out),
            Color::Blue => trades_at(pos, sys, out),
            Color::Red => attacks_at(pos, sys, out),
            Color::Yellow => {
                moves_at(pos, sys, out);
                discoveries_at(pos, sys, out);
            }
        }
    }
}

fn builds_at(pos: &Position, sys: usize, out: &mut Vec<BasicAction>) {
    let ships = pos.stars()[sys].ships(pos.player());
    for c in Color::ALL {
        if ships.has_color(c) {
            if let Some(size) = pos.bank().smallest_of_color(c) {
                out.push(BasicAction::Build { ship: Piece::new(c, size), system: sys });
            }
        }
    }
}

fn trades_at(pos: &Position, sys: usize, out: &mut Vec<BasicAction>) {
    let ships = pos.stars()[sys].ships(pos.player());
    for (p, _) in ships.iter() {
        for c in Color::ALL {
            if c == p.color() {
                continue;
            }
            let q = Piece::new(c, p.size());
            if pos.bank().has(q) {
                out.push(BasicAction::Trade { ship: p, system: sys, new_ship: q });
            }
        }
    }
}

fn attacks_at(pos: &Position, sys: usize, out: &mut Vec<BasicAction>) {
    let star = &pos.stars()[sys];
    let Some(size) = star.largest_ship(pos.player()) else {
        return;
    };
    for (q, _) in star.ships(!pos.player()).iter() {
        if q.size() <= size {
            out.push(BasicAction::Attack { ship: q, system: sys });
        }
    }
}

fn moves_at(pos: &Position, sys: usize, out: &mut Vec<BasicAction>) {
    let star = &pos.stars()[sys];
    let ships = star.ships(pos.player());
    if ships.is_empty() {
        return;
    }
    for (to, dest) in pos.stars().iter().enumerate() {
        if to == sys || !star.connects(dest) {
            continue;
        }
        for (p, _) in ships.iter() {
            out.push(BasicAction::Move { ship: p, system: sys, to_system: to });
        }
    }
}

fn discoveries_at(pos: &Position, sys: usize, out: &mut Vec<BasicAction>) {
    let star = &pos.stars()[sys];
    let ships = star.ships(pos.player());
    if ships.is_empty() {
        return;
    }
    for (q, _) in pos.bank().iter() {
        if star.would_connect(q) {
            for (p, _) in ships.iter() {
                out.push(BasicAction::Discover { ship: p, system: sys, new_star: q });
            }
        }
    }
}

impl Position {
    /// see [`basic_actions`].
    pub fn basic_actions(&self) -> Vec<BasicAction> {
        basic_actions(self)
    }

    /// see [`sacrifice_actions`].
    pub fn sacrifice_actions(&self) -> Vec<SacrificeAction> {
        sacrifice_actions(self)
    }

    /// both kinds in one list, basics first.
    pub fn all_actions(&self) -> Vec<Action> {
        let mut acts: Vec<Action> = self.basic_actions().into_iter().map(Action::from).collect();
        acts.extend(self.sacrifice_actions().into_iter().map(Action::from));
        acts
    }
}
