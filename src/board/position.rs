use std::fmt;

use super::action::{Action, BasicAction, SacrificeAction};
use super::bank::Bank;
use super::error::{RulesError, RulesResult};
use super::piece::{Color, Piece, Player, Size};
use super::star::Star;

/// star indices reserved for the two homeworlds; they are never removed.
pub const HOME_COUNT: usize = 2;

/// Homeworld configuration for game start: two star pieces and the
/// starting ship.
#[derive(Clone, Copy, Debug)]
pub struct HomeworldSpec {
    pub stars: [Piece; 2],
    pub ship: Piece,
}

/// Full game state: the supply, the star systems, and the side to move.
///
/// Indices 0 and 1 of the star vector are the homeworlds of North and
/// South; non-home stars live at indices ≥ 2 in stable (but arbitrary)
/// order. Transitions return a fresh `Position`; the search clones freely,
/// and the only heap data is the star vector of `Copy` elements.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Position {
    bank: Bank,
    stars: Vec<Star>,
    player: Player,
}

impl Position {
    /// Starting position from two homeworld configurations. Fails if the
    /// chosen pieces over-draw the supply.
    pub fn from_initial(north: HomeworldSpec, south: HomeworldSpec) -> RulesResult<Position> {
        let mut bank = Bank::FULL;
        let mut stars = Vec::with_capacity(8);
        for (pl, spec) in [(Player::North, north), (Player::South, south)] {
            for p in [spec.stars[0], spec.stars[1], spec.ship] {
                if !bank.has(p) {
                    return Err(RulesError::PieceNotAvailable);
                }
                bank.take(p);
            }
            let mut star = Star::homeworld(spec.stars[0], spec.stars[1]);
            star.ships_mut(pl).put(spec.ship);
            stars.push(star);
        }
        Ok(Position { bank, stars, player: Player::North })
    }

    /// The fixed two-player opening used by the original autoplay driver:
    /// North G3+Y1 with a B3 ship, South Y3+B2 with a G3 ship.
    pub fn standard_opening() -> Position {
        let g3 = Piece::new(Color::Green, Size::Large);
        let y1 = Piece::new(Color::Yellow, Size::Small);
        let b3 = Piece::new(Color::Blue, Size::Large);
        let y3 = Piece::new(Color::Yellow, Size::Large);
        let b2 = Piece::new(Color::Blue, Size::Medium);
        Position::from_initial(
            HomeworldSpec { stars: [g3, y1], ship: b3 },
            HomeworldSpec { stars: [y3, b2], ship: g3 },
        )
        .expect("standard opening never over-draws the bank")
    }

    #[inline]
    pub fn bank(&self) -> Bank {
        self.bank
    }

    #[inline]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    #[inline]
    pub fn player(&self) -> Player {
        self.player
    }

    #[inline]
    pub fn star(&self, sys: usize) -> Option<&Star> {
        self.stars.get(sys)
    }

    #[inline]
    pub fn homeworld(&self, pl: Player) -> &Star {
        &self.stars[pl.to_index()]
    }

    /// same position with the other player to move.
    pub fn end_turn(&self) -> Position {
        let mut next = self.clone();
        next.player = !next.player;
        next
    }

    /// a player loses when no ship of theirs remains at their homeworld.
    pub fn is_over(&self) -> bool {
        Player::ALL
            .into_iter()
            .any(|pl| self.homeworld(pl).ships(pl).is_empty())
    }

    pub fn winner(&self) -> Option<Player> {
        if !self.is_over() {
            return None;
        }
        Player::ALL
            .into_iter()
            .find(|&pl| !self.homeworld(pl).ships(pl).is_empty())
    }

    /// Apply a single basic action for the side to move.
    pub fn apply_basic(&self, a: BasicAction) -> RulesResult<Position> {
        let mut next = self.clone();
        next.do_basic(a, None)?;
        Ok(next)
    }

    /// Apply a sacrifice chain for the side to move.
    pub fn apply_sacrifice(&self, sa: &SacrificeAction) -> RulesResult<Position> {
        let mut next = self.clone();
        next.do_sacrifice(sa)?;
        Ok(next)
    }

    pub fn apply(&self, a: &Action) -> RulesResult<Position> {
        match a {
            Action::Basic(b) => self.apply_basic(*b),
            Action::Sacrifice(sa) => self.apply_sacrifice(sa),
        }
    }

    /// Complete legality check. Sacrifice chains are re-simulated so every
    /// sub-action is judged against the state its predecessors leave.
    pub fn validate(&self, a: &Action) -> bool {
        match a {
            Action::Basic(b) => self.check_basic(*b, None).is_ok(),
            Action::Sacrifice(sa) => self.apply_sacrifice(sa).is_ok(),
        }
    }

    /// Every piece must be accounted for exactly three times across the
    /// bank, all star pieces, and all fleets.
    pub fn conserved(&self) -> bool {
        Piece::all().all(|p| {
            let on_board: u32 = self
                .stars
                .iter()
                .map(|s| {
                    s.pieces().get(p) as u32
                        + s.ships(Player::North).get(p) as u32
                        + s.ships(Player::South).get(p) as u32
                })
                .sum();
            self.bank.get(p) as u32 + on_board == 3
        })
    }

    // --- rules engine internals ---

    fn star_checked(&self, sys: usize) -> RulesResult<&Star> {
        self.stars.get(sys).ok_or(RulesError::NoSuchSystem(sys))
    }

    /// Is the color's power usable at `sys`? Inside a sacrifice the only
    /// power is the sacrificed color; star powers are not consulted.
    fn power_ok(&self, sys: usize, needed: Color, sacrifice: Option<Color>) -> bool {
        match sacrifice {
            Some(c) => c == needed,
            None => self.stars[sys].powers(self.player).contains(needed),
        }
    }

    fn check_basic(&self, a: BasicAction, sacrifice: Option<Color>) -> RulesResult<()> {
        let player = self.player;
        match a {
            BasicAction::Pass => {
                // Pass ends a turn; it cannot be spent as a sacrifice step.
                if sacrifice.is_some() {
                    return Err(RulesError::UnknownActionKind);
                }
                Ok(())
            }
            BasicAction::Build { ship, system } => {
                let star = self.star_checked(system)?;
                if !self.power_ok(system, Color::Green, sacrifice) {
                    return Err(RulesError::ColorNotAvailable);
                }
                if !star.ships(player).has_color(ship.color()) {
                    return Err(RulesError::ColorNotAvailable);
                }
                match self.bank.smallest_of_color(ship.color()) {
                    None => Err(RulesError::PieceNotAvailable),
                    Some(smallest) if smallest < ship.size() => {
                        Err(RulesError::SmallerPieceAvailable)
                    }
                    Some(_) if !self.bank.has(ship) => Err(RulesError::PieceNotAvailable),
                    Some(_) => Ok(()),
                }
            }
            BasicAction::Trade { ship, system, new_ship } => {
                let star = self.star_checked(system)?;
                if !self.power_ok(system, Color::Blue, sacrifice) {
                    return Err(RulesError::ColorNotAvailable);
                }
                if !star.ships(player).has(ship) {
                    return Err(RulesError::NotOwned);
                }
                if ship.size() != new_ship.size() {
                    return Err(RulesError::SizeMismatch);
                }
                if !self.bank.has(new_ship) {
                    return Err(RulesError::PieceNotAvailable);
                }
                Ok(())
            }
            BasicAction::Attack { ship, system } => {
                let star = self.star_checked(system)?;
                if !self.power_ok(system, Color::Red, sacrifice) {
                    return Err(RulesError::ColorNotAvailable);
                }
                if !star.ships(!player).has(ship) {
                    if star.ships(player).has(ship) {
                        return Err(RulesError::SelfAttack);
                    }
                    return Err(RulesError::NotOwned);
                }
                match star.largest_ship(player) {
                    Some(size) if size >= ship.size() => Ok(()),
                    _ => Err(RulesError::TargetTooLarge),
                }
            }
            BasicAction::Move { ship, system, to_system } => {
                let star = self.star_checked(system)?;
                let dest = self.star_checked(to_system)?;
                if !self.power_ok(system, Color::Yellow, sacrifice) {
                    return Err(RulesError::ColorNotAvailable);
                }
                if !star.ships(player).has(ship) {
                    return Err(RulesError::NotOwned);
                }
                if !star.connects(dest) {
                    return Err(RulesError::NotConnected);
                }
                Ok(())
            }
            BasicAction::Discover { ship, system, new_star } => {
                let star = self.star_checked(system)?;
                if !self.power_ok(system, Color::Yellow, sacrifice) {
                    return Err(RulesError::ColorNotAvailable);
                }
                if !star.ships(player).has(ship) {
                    return Err(RulesError::NotOwned);
                }
                if !self.bank.has(new_star) {
                    return Err(RulesError::PieceNotAvailable);
                }
                if !star.would_connect(new_star) {
                    return Err(RulesError::NotConnected);
                }
                Ok(())
            }
        }
    }

    /// Validate and perform one basic action, then resolve catastrophes and
    /// collect emptied stars. `sacrifice` carries the power override inside
    /// a sacrifice chain.
    pub(crate) fn do_basic(&mut self, a: BasicAction, sacrifice: Option<Color>) -> RulesResult<()> {
        self.check_basic(a, sacrifice)?;
        let player = self.player;
        match a {
            BasicAction::Pass => {}
            BasicAction::Build { ship, system } => {
                self.bank.take(ship);
                self.stars[system].ships_mut(player).put(ship);
                self.catastrophe(system);
                self.gc(system);
            }
            BasicAction::Trade { ship, system, new_ship } => {
                self.stars[system].ships_mut(player).take(ship);
                self.bank.put(ship);
                self.bank.take(new_ship);
                self.stars[system].ships_mut(player).put(new_ship);
                self.catastrophe(system);
                self.gc(system);
            }
            BasicAction::Attack { ship, system } => {
                self.stars[system].ships_mut(!player).take(ship);
                self.stars[system].ships_mut(player).put(ship);
                // the ownership swap preserves every count, so this only
                // fires on a star that was already overpopulated
                self.catastrophe(system);
                self.gc(system);
            }
            BasicAction::Move { ship, system, to_system } => {
                self.stars[system].ships_mut(player).take(ship);
                self.stars[to_system].ships_mut(player).put(ship);
                self.catastrophe(to_system);
                // larger index first so the smaller stays valid
                self.gc(system.max(to_system));
                self.gc(system.min(to_system));
            }
            BasicAction::Discover { ship, system, new_star } => {
                self.bank.take(new_star);
                self.stars[system].ships_mut(player).take(ship);
                let mut star = Star::new(new_star);
                star.ships_mut(player).put(ship);
                self.stars.push(star);
                let new_idx = self.stars.len() - 1;
                self.catastrophe(new_idx);
                self.gc(new_idx);
                self.gc(system);
            }
        }
        debug_assert!(self.conserved(), "piece conservation broken by {}", a);
        Ok(())
    }

    fn do_sacrifice(&mut self, sa: &SacrificeAction) -> RulesResult<()> {
        if sa.actions.is_empty() || sa.actions.len() > sa.ship.size() as usize {
            return Err(RulesError::UnknownActionKind);
        }
        self.begin_sacrifice(sa.ship, sa.system)?;
        for &a in &sa.actions {
            self.do_basic(a, Some(sa.ship.color()))?;
        }
        Ok(())
    }

    /// Return the sacrificed ship to the bank and collect its star if that
    /// leaves it empty. The move generator starts its chain enumeration
    /// from exactly this state.
    pub(crate) fn begin_sacrifice(&mut self, ship: Piece, system: usize) -> RulesResult<()> {
        let star = self.star_checked(system)?;
        if !star.ships(self.player).has(ship) {
            return Err(RulesError::NotOwned);
        }
        self.stars[system].ships_mut(self.player).take(ship);
        self.bank.put(ship);
        self.gc(system);
        debug_assert!(self.conserved());
        Ok(())
    }

    /// Apply a basic action under a sacrificed color's power (generator
    /// internals).
    pub(crate) fn apply_powered(&self, a: BasicAction, power: Color) -> RulesResult<Position> {
        let mut next = self.clone();
        next.do_basic(a, Some(power))?;
        Ok(next)
    }

    /// Resolve overpopulation at one star: every color with four or more
    /// pieces here (star pieces plus both fleets) goes back to the bank.
    /// A star stripped of all its own pieces is destroyed; surviving ships
    /// return to the bank too.
    fn catastrophe(&mut self, sys: usize) {
        let mut star = self.stars[sys];
        let mut hit = false;
        for c in Color::ALL {
            if star.population(c) >= 4 {
                let freed = star.pieces_mut().drain_color(c)
                    + star.ships_mut(Player::North).drain_color(c)
                    + star.ships_mut(Player::South).drain_color(c);
                self.bank = self.bank + freed;
                hit = true;
            }
        }
        if hit && star.pieces().is_empty() {
            let freed = star.ships_mut(Player::North).drain() + star.ships_mut(Player::South).drain();
            self.bank = self.bank + freed;
        }
        self.stars[sys] = star;
    }

    /// Remove a non-home star that no longer hosts any ship, returning its
    /// pieces to the bank. Homeworlds always stay; an empty homeworld is
    /// the loss condition, not garbage.
    fn gc(&mut self, sys: usize) {
        if sys >= HOME_COUNT && !self.stars[sys].occupied() {
            let star = self.stars.remove(sys);
            self.bank = self.bank + star.pieces();
        }
    }
}

/// Test staging: build odd mid-game shapes directly instead of replaying
/// the action sequences that reach them. Conservation is preserved by
/// drawing everything staged from the bank.
#[cfg(test)]
impl Position {
    pub(crate) fn stage_star(&mut self, star: Star) {
        for (p, n) in star.contents().iter() {
            for _ in 0..n {
                self.bank.take(p);
            }
        }
        self.stars.push(star);
        debug_assert!(self.conserved());
    }

    pub(crate) fn stage_ship(&mut self, sys: usize, pl: Player, p: Piece) {
        self.bank.take(p);
        self.stars[sys].ships_mut(pl).put(p);
        debug_assert!(self.conserved());
    }

    pub(crate) fn set_player(&mut self, pl: Player) {
        self.player = pl;
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "The bank:")?;
        for c in Color::ALL {
            write!(f, "  {}: ", c)?;
            let mut some = false;
            for s in Size::ALL.into_iter().rev() {
                let n = self.bank.get(Piece::new(c, s));
                if n > 0 {
                    if some {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} {}", n, s.to_string().to_lowercase())?;
                    some = true;
                }
            }
            if !some {
                write!(f, "none")?;
            }
            writeln!(f, ".")?;
        }

        writeln!(f, "Systems:")?;
        for (i, star) in self.stars.iter().enumerate() {
            write!(f, "  {}: ", i)?;
            if i < HOME_COUNT {
                write!(f, "{}'s homeworld, a ", Player::from_index(i))?;
            } else {
                write!(f, "a ")?;
            }
            let mut first = true;
            for (p, n) in star.pieces().iter() {
                for _ in 0..n {
                    if !first {
                        write!(f, "/")?;
                    }
                    write!(f, "{}", p)?;
                    first = false;
                }
            }
            if first {
                write!(f, "destroyed")?;
            } else {
                write!(f, " star")?;
            }
            writeln!(f, ".")?;
        }

        for pl in Player::ALL {
            writeln!(f, "{}'s fleet:", pl)?;
            for (i, star) in self.stars.iter().enumerate() {
                let ships = star.ships(pl);
                if ships.is_empty() {
                    continue;
                }
                write!(f, "  At {}:", i)?;
                for (p, n) in ships.iter() {
                    for _ in 0..n {
                        write!(f, " {}", p)?;
                    }
                }
                writeln!(f, ".")?;
            }
        }

        write!(f, "It is {}'s turn.", self.player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn piece(c: Color, s: Size) -> Piece {
        Piece::new(c, s)
    }

    #[test]
    fn test_from_initial_setup() {
        let pos = Position::standard_opening();
        assert!(pos.conserved());
        assert_eq!(pos.stars().len(), 2);
        assert_eq!(pos.player(), Player::North);
        // North's opening ship is the large blue
        assert!(pos
            .homeworld(Player::North)
            .ships(Player::North)
            .has(piece(Color::Blue, Size::Large)));
        // two large greens drawn: one star piece, one South ship
        assert_eq!(pos.bank().get(piece(Color::Green, Size::Large)), 1);
    }

    #[test]
    fn test_from_initial_overdraw() {
        let g3 = piece(Color::Green, Size::Large);
        // four large greens requested, only three exist
        let spec = HomeworldSpec { stars: [g3, g3], ship: g3 };
        let res = Position::from_initial(spec, HomeworldSpec { stars: [g3, g3], ship: g3 });
        assert_eq!(res, Err(RulesError::PieceNotAvailable));
    }

    #[test]
    fn test_build_requires_smallest() {
        let mut pos = Position::standard_opening();
        pos.player = Player::South;
        // park every small green on an outpost so the bank has none left
        let g1 = piece(Color::Green, Size::Small);
        let r2 = piece(Color::Red, Size::Medium);
        let mut star = Star::new(r2);
        for _ in 0..3 {
            star.ships_mut(Player::South).put(g1);
            pos.bank.take(g1);
        }
        pos.bank.take(r2);
        pos.stars.push(star);
        assert!(pos.conserved());

        // South's G3 home ship grants Green; medium is now the floor
        let g2 = piece(Color::Green, Size::Medium);
        let g3 = piece(Color::Green, Size::Large);
        assert!(pos.apply_basic(BasicAction::Build { ship: g2, system: 1 }).is_ok());
        assert_eq!(
            pos.apply_basic(BasicAction::Build { ship: g3, system: 1 }),
            Err(RulesError::SmallerPieceAvailable)
        );
    }

    #[test]
    fn test_build_adds_ship_and_draws_bank() {
        let mut pos = Position::standard_opening();
        pos.player = Player::South;
        let g1 = piece(Color::Green, Size::Small);
        let before = pos.bank.get(g1);
        let next = pos.apply_basic(BasicAction::Build { ship: g1, system: 1 }).unwrap();
        assert_eq!(next.bank().get(g1), before - 1);
        assert!(next.homeworld(Player::South).ships(Player::South).has(g1));
        assert!(next.conserved());
    }

    #[test]
    fn test_build_without_matching_ship_color() {
        let pos = Position::standard_opening();
        // North has only a blue ship at home; building red is not on
        let r1 = piece(Color::Red, Size::Small);
        assert_eq!(
            pos.apply_basic(BasicAction::Build { ship: r1, system: 0 }),
            Err(RulesError::ColorNotAvailable)
        );
    }

    #[test]
    fn test_trade_swaps_with_bank() {
        let pos = Position::standard_opening();
        // North's B3 at home; blue power from the ship itself
        let b3 = piece(Color::Blue, Size::Large);
        let r3 = piece(Color::Red, Size::Large);
        let next = pos
            .apply_basic(BasicAction::Trade { ship: b3, system: 0, new_ship: r3 })
            .unwrap();
        let home = next.homeworld(Player::North);
        assert!(home.ships(Player::North).has(r3));
        assert!(!home.ships(Player::North).has(b3));
        assert!(next.conserved());
    }

    #[test]
    fn test_trade_size_mismatch() {
        let pos = Position::standard_opening();
        let b3 = piece(Color::Blue, Size::Large);
        let r1 = piece(Color::Red, Size::Small);
        assert_eq!(
            pos.apply_basic(BasicAction::Trade { ship: b3, system: 0, new_ship: r1 }),
            Err(RulesError::SizeMismatch)
        );
    }

    #[test]
    fn test_attack_swaps_ownership() {
        let mut pos = Position::standard_opening();
        // stage a contested star: North R3 + South Y1 at a new B1 star
        let b1 = piece(Color::Blue, Size::Small);
        let r3 = piece(Color::Red, Size::Large);
        let y1 = piece(Color::Yellow, Size::Small);
        let mut star = Star::new(b1);
        star.ships_mut(Player::North).put(r3);
        star.ships_mut(Player::South).put(y1);
        pos.bank.take(b1);
        pos.bank.take(r3);
        pos.bank.take(y1);
        pos.stars.push(star);
        assert!(pos.conserved());

        let next = pos.apply_basic(BasicAction::Attack { ship: y1, system: 2 }).unwrap();
        let s = next.star(2).unwrap();
        assert!(s.ships(Player::North).has(y1));
        assert!(s.ships(Player::South).is_empty());
        assert!(next.conserved());
    }

    #[test]
    fn test_attack_target_too_large() {
        let mut pos = Position::standard_opening();
        let b1 = piece(Color::Blue, Size::Small);
        let r1 = piece(Color::Red, Size::Small);
        let y3 = piece(Color::Yellow, Size::Large);
        let mut star = Star::new(b1);
        star.ships_mut(Player::North).put(r1);
        star.ships_mut(Player::South).put(y3);
        pos.bank.take(b1);
        pos.bank.take(r1);
        pos.bank.take(y3);
        pos.stars.push(star);

        assert_eq!(
            pos.apply_basic(BasicAction::Attack { ship: y3, system: 2 }),
            Err(RulesError::TargetTooLarge)
        );
    }

    #[test]
    fn test_attack_own_ship() {
        let mut pos = Position::standard_opening();
        let b1 = piece(Color::Blue, Size::Small);
        let r2 = piece(Color::Red, Size::Medium);
        let mut star = Star::new(b1);
        star.ships_mut(Player::North).put(r2);
        pos.bank.take(b1);
        pos.bank.take(r2);
        pos.stars.push(star);

        assert_eq!(
            pos.apply_basic(BasicAction::Attack { ship: r2, system: 2 }),
            Err(RulesError::SelfAttack)
        );
    }

    #[test]
    fn test_discover_appends_star() {
        let pos = Position::standard_opening();
        // North home is G3/Y1 (sizes {1,3}); a medium star connects.
        // The B3 ship flies out; home keeps no North ships, so the game
        // ends, but the transition itself must be clean.
        let b3 = piece(Color::Blue, Size::Large);
        let r2 = piece(Color::Red, Size::Medium);
        let next = pos
            .apply_basic(BasicAction::Discover { ship: b3, system: 0, new_star: r2 })
            .unwrap();
        assert_eq!(next.stars().len(), 3);
        let s = next.star(2).unwrap();
        assert!(s.pieces().has(r2));
        assert!(s.ships(Player::North).has(b3));
        assert!(next.conserved());
        assert!(next.is_over());
        assert_eq!(next.winner(), Some(Player::South));
    }

    #[test]
    fn test_discover_not_connected() {
        let pos = Position::standard_opening();
        let b3 = piece(Color::Blue, Size::Large);
        let r1 = piece(Color::Red, Size::Small);
        // home contains a small star piece already
        assert_eq!(
            pos.apply_basic(BasicAction::Discover { ship: b3, system: 0, new_star: r1 }),
            Err(RulesError::NotConnected)
        );
    }

    #[test]
    fn test_move_departure_gc() {
        let mut pos = Position::standard_opening();
        // lone North Y2 at an outpost; moving it home empties the outpost
        let r2 = piece(Color::Red, Size::Medium);
        let y2 = piece(Color::Yellow, Size::Medium);
        let mut star = Star::new(r2);
        star.ships_mut(Player::North).put(y2);
        pos.bank.take(r2);
        pos.bank.take(y2);
        pos.stars.push(star);
        let bank_r2 = pos.bank.get(r2);

        let next = pos.apply_basic(BasicAction::Move { ship: y2, system: 2, to_system: 0 }).unwrap();
        assert_eq!(next.stars().len(), 2);
        assert_eq!(next.bank().get(r2), bank_r2 + 1);
        assert!(next.homeworld(Player::North).ships(Player::North).has(y2));
        assert!(next.conserved());
    }

    #[test]
    fn test_move_not_connected() {
        let mut pos = Position::standard_opening();
        // outpost shares a size with North's home (both have a small)
        let r1 = piece(Color::Red, Size::Small);
        let y2 = piece(Color::Yellow, Size::Medium);
        let mut star = Star::new(r1);
        star.ships_mut(Player::North).put(y2);
        pos.bank.take(r1);
        pos.bank.take(y2);
        pos.stars.push(star);

        assert_eq!(
            pos.apply_basic(BasicAction::Move { ship: y2, system: 2, to_system: 0 }),
            Err(RulesError::NotConnected)
        );
    }

    #[test]
    fn test_catastrophe_threshold() {
        // three blues at a star: nothing happens; the fourth wipes them
        let mut pos = Position::standard_opening();
        let b1 = piece(Color::Blue, Size::Small);
        let b2 = piece(Color::Blue, Size::Medium);
        let b3 = piece(Color::Blue, Size::Large);
        let r1 = piece(Color::Red, Size::Small);
        let r3 = piece(Color::Red, Size::Large);
        let mut star = Star::new(b2);
        star.ships_mut(Player::North).put(b1);
        star.ships_mut(Player::North).put(r1);
        star.ships_mut(Player::North).put(r3);
        for p in [b2, b1, r1, r3] {
            pos.bank.take(p);
        }
        pos.stars.push(star);
        assert!(pos.conserved());

        // trading a red into blue makes three: still below threshold
        let pos = pos
            .apply_basic(BasicAction::Trade { ship: r1, system: 2, new_ship: b1 })
            .unwrap();
        assert_eq!(pos.star(2).unwrap().population(Color::Blue), 3);

        // the fourth blue triggers the catastrophe; the star piece goes
        // with it, and with the star gone the whole system folds up
        let pos = pos
            .apply_basic(BasicAction::Trade { ship: r3, system: 2, new_ship: b3 })
            .unwrap();
        assert_eq!(pos.stars().len(), 2);
        assert_eq!(pos.bank().get(b1), 3);
        assert_eq!(pos.bank().get(b2), 2); // one is a South homeworld piece
        assert!(pos.conserved());
    }

    #[test]
    fn test_attack_resolves_preexisting_overpopulation() {
        // pieces {B2}, mover ships {B1, B3, R3}, opponent {B1}: blue is
        // already at four; the attack converts the last blue and the
        // catastrophe check at the star then clears the color
        let mut pos = Position::standard_opening();
        let b1 = piece(Color::Blue, Size::Small);
        let b2 = piece(Color::Blue, Size::Medium);
        let b3 = piece(Color::Blue, Size::Large);
        let r3 = piece(Color::Red, Size::Large);
        let mut star = Star::new(b2);
        star.ships_mut(Player::North).put(b1);
        star.ships_mut(Player::North).put(b3);
        star.ships_mut(Player::North).put(r3);
        star.ships_mut(Player::South).put(b1);
        pos.bank.take(b1);
        pos.bank.take(b1);
        pos.bank.take(b2);
        pos.bank.take(b3);
        pos.bank.take(r3);
        pos.stars.push(star);
        assert!(pos.conserved());

        let next = pos.apply_basic(BasicAction::Attack { ship: b1, system: 2 }).unwrap();
        // star gone, every blue back in the bank, R3 too
        assert_eq!(next.stars().len(), 2);
        assert_eq!(next.bank().get(b1), 3);
        assert_eq!(next.bank().get(b3), 2); // one is North's home ship
        assert_eq!(next.bank().get(r3), 3);
        assert!(next.conserved());
    }

    #[test]
    fn test_homeworld_never_removed() {
        // a yellow catastrophe at North's home strips the Y1 star piece but
        // the homeworld slot survives; only the outpost is collected
        let mut pos = Position::standard_opening();
        let y1 = piece(Color::Yellow, Size::Small);
        let y2 = piece(Color::Yellow, Size::Medium);
        // home pieces are G3/Y1; park two more yellows in orbit
        pos.stars[0].ships_mut(Player::North).put(y2);
        pos.stars[0].ships_mut(Player::South).put(y1);
        pos.bank.take(y2);
        pos.bank.take(y1);

        // a lone South yellow on a connected outpost flies in as the fourth
        pos.player = Player::South;
        let r2 = piece(Color::Red, Size::Medium);
        let mut star = Star::new(r2);
        star.ships_mut(Player::South).put(y1);
        pos.bank.take(r2);
        pos.bank.take(y1);
        pos.stars.push(star);
        assert!(pos.conserved());

        let next = pos.apply_basic(BasicAction::Move { ship: y1, system: 2, to_system: 0 }).unwrap();
        // every yellow at home went back to the bank; G3 and North's B3 stay
        assert_eq!(next.stars().len(), 2); // outpost gc'd, homeworld kept
        let home = next.homeworld(Player::North);
        assert!(!home.pieces().has(y1));
        assert!(home.pieces().has(piece(Color::Green, Size::Large)));
        assert!(home.ships(Player::North).has(piece(Color::Blue, Size::Large)));
        assert_eq!(next.bank().get(y1), 3);
        assert!(next.conserved());
    }

    #[test]
    fn test_sacrifice_chain_applies_with_power_override() {
        let mut pos = Position::standard_opening();
        // give North a G2 at home; sacrificing it buys two green builds
        // even though builds happen at a star, powers unchecked
        let g2 = piece(Color::Green, Size::Medium);
        pos.stars[0].ships_mut(Player::North).put(g2);
        pos.bank.take(g2);
        assert!(pos.conserved());

        let b1 = piece(Color::Blue, Size::Small);
        let mut actions = arrayvec::ArrayVec::new();
        actions.push(BasicAction::Build { ship: b1, system: 0 });
        actions.push(BasicAction::Build { ship: b1, system: 0 });
        let sa = SacrificeAction { ship: g2, system: 0, actions };

        let next = pos.apply_sacrifice(&sa).unwrap();
        assert_eq!(next.homeworld(Player::North).ships(Player::North).get(b1), 2);
        // the sacrificed ship is back in the bank
        assert_eq!(next.bank().get(g2), 3);
        assert!(next.conserved());
    }

    #[test]
    fn test_sacrifice_rejects_wrong_color_sub_action() {
        let pos = Position::standard_opening();
        // sacrificing the blue flagship powers trades, not builds
        let b3 = piece(Color::Blue, Size::Large);
        let g1 = piece(Color::Green, Size::Small);
        let mut actions = arrayvec::ArrayVec::new();
        actions.push(BasicAction::Build { ship: g1, system: 0 });
        let sa = SacrificeAction { ship: b3, system: 0, actions };
        assert_eq!(pos.apply_sacrifice(&sa), Err(RulesError::ColorNotAvailable));
    }

    #[test]
    fn test_sacrifice_chain_length_bounds() {
        let pos = Position::standard_opening();
        let b3 = piece(Color::Blue, Size::Large);
        let sa = SacrificeAction { ship: b3, system: 0, actions: arrayvec::ArrayVec::new() };
        assert_eq!(pos.apply_sacrifice(&sa), Err(RulesError::UnknownActionKind));
    }

    #[test]
    fn test_validate_range_checks() {
        let pos = Position::standard_opening();
        let g1 = piece(Color::Green, Size::Small);
        assert!(!pos.validate(&Action::Basic(BasicAction::Build { ship: g1, system: 9 })));
        assert_eq!(
            pos.apply_basic(BasicAction::Build { ship: g1, system: 9 }),
            Err(RulesError::NoSuchSystem(9))
        );
        assert!(pos.validate(&Action::Basic(BasicAction::Pass)));
    }

    #[test]
    fn test_end_turn_flips_player() {
        let pos = Position::standard_opening();
        assert_eq!(pos.end_turn().player(), Player::South);
        assert_eq!(pos.end_turn().end_turn(), pos);
    }

    #[test]
    fn test_winner_when_home_fleet_gone() {
        let mut pos = Position::standard_opening();
        let b3 = piece(Color::Blue, Size::Large);
        pos.stars[0].ships_mut(Player::North).take(b3);
        pos.bank.put(b3);
        assert!(pos.is_over());
        assert_eq!(pos.winner(), Some(Player::South));
    }

    #[test]
    fn test_display_mentions_turn() {
        let pos = Position::standard_opening();
        let text = pos.to_string();
        assert!(text.contains("The bank:"));
        assert!(text.contains("North's homeworld"));
        assert!(text.ends_with("It is North's turn."));
    }
}
