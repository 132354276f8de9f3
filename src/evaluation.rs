use crate::board::{Color, ColorSet, Player, Position, Size};
use crate::types::Score;

// component weights, summed per side
const TEMPO: Score = 5.0;
const HOME_LARGE: Score = 10.0;
const BEACHHEAD: Score = 10.0;
const MONOPOLY: Score = 30.0;
const SHIP_VALUE: [Score; 3] = [1.0, 3.0, 9.0];

/// one more than the largest component sum a side can reach, so every
/// non-terminal score stays strictly inside (−1, 1)
const SCALE: Score = 252.0;

/// Static evaluation from the side-to-move's viewpoint, before end of
/// turn. Exactly ±1 for finished games, strictly inside (−1, 1) otherwise.
///
/// Components per side: tempo for being on move, a large ship defending
/// the own homeworld, a beachhead at the enemy homeworld, material
/// (1/3/9 per small/medium/large ship), and 30 per monopolized color
/// (a color the side flies and the opponent does not).
pub fn evaluate(pos: &Position) -> Score {
    let me = pos.player();
    let opp = !me;
    if pos.homeworld(me).ships(me).is_empty() {
        return -1.0;
    }
    if pos.homeworld(opp).ships(opp).is_empty() {
        return 1.0;
    }

    let mut fleet_colors = [ColorSet::EMPTY; 2];
    for star in pos.stars() {
        for pl in Player::ALL {
            fleet_colors[pl.to_index()] =
                fleet_colors[pl.to_index()].union(star.ships(pl).colors());
        }
    }
    let mine = fleet_colors[me.to_index()];
    let theirs = fleet_colors[opp.to_index()];

    let v = TEMPO + side_score(pos, me, mine, theirs);
    let w = side_score(pos, opp, theirs, mine);
    (v - w) / SCALE
}

/// `evaluate` seen from a fixed player's viewpoint (negated when that
/// player is not on move). The original driver scored everything from
/// North's seat; that convention is `evaluate_for(pos, Player::North)`.
pub fn evaluate_for(pos: &Position, viewpoint: Player) -> Score {
    let v = evaluate(pos);
    if viewpoint == pos.player() {
        v
    } else {
        -v
    }
}

fn side_score(pos: &Position, pl: Player, mine: ColorSet, theirs: ColorSet) -> Score {
    let mut v = 0.0;
    if pos.homeworld(pl).ships(pl).sizes().contains(Size::Large) {
        v += HOME_LARGE;
    }
    if !pos.homeworld(!pl).ships(pl).is_empty() {
        v += BEACHHEAD;
    }
    for star in pos.stars() {
        for (p, n) in star.ships(pl).iter() {
            v += SHIP_VALUE[p.size().to_index()] * n as Score;
        }
    }
    for c in Color::ALL {
        if mine.contains(c) && !theirs.contains(c) {
            v += MONOPOLY;
        }
    }
    v
}
