use std::fmt;

use arrayvec::ArrayVec;

use super::piece::{Color, Piece};

/// One free action. `system` fields index into the position's star vector
/// (0 and 1 are the homeworlds).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum BasicAction {
    Pass,
    /// take `ship` from the bank and add it to the mover's fleet at `system`.
    Build { ship: Piece, system: usize },
    /// swap `ship` for the same-size `new_ship` from the bank.
    Trade { ship: Piece, system: usize, new_ship: Piece },
    /// fly `ship` from `system` to the connected `to_system`.
    Move { ship: Piece, system: usize, to_system: usize },
    /// capture the opponent's `ship` at `system`.
    Attack { ship: Piece, system: usize },
    /// fly `ship` from `system` to a brand-new star made of `new_star`.
    Discover { ship: Piece, system: usize, new_star: Piece },
}

impl BasicAction {
    /// the color whose power this action uses, if any. Pass needs none.
    #[inline]
    pub fn power(self) -> Option<Color> {
        match self {
            BasicAction::Pass => None,
            BasicAction::Build { .. } => Some(Color::Green),
            BasicAction::Trade { .. } => Some(Color::Blue),
            BasicAction::Move { .. } | BasicAction::Discover { .. } => Some(Color::Yellow),
            BasicAction::Attack { .. } => Some(Color::Red),
        }
    }

    #[inline]
    pub fn is_attack(self) -> bool {
        matches!(self, BasicAction::Attack { .. })
    }
}

impl fmt::Display for BasicAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            BasicAction::Pass => write!(f, "Pass"),
            BasicAction::Build { ship, system } => write!(f, "Build {} {}", system, ship),
            BasicAction::Trade { ship, system, new_ship } => {
                write!(f, "Trade {} {} {}", system, ship, new_ship)
            }
            BasicAction::Move { ship, system, to_system } => {
                write!(f, "Move {} {} {}", system, ship, to_system)
            }
            BasicAction::Attack { ship, system } => write!(f, "Attack {} {}", system, ship),
            BasicAction::Discover { ship, system, new_star } => {
                write!(f, "Discover {} {} {}", system, ship, new_star)
            }
        }
    }
}

/// A sacrifice: return `ship` to the bank, then play 1..=size free actions
/// restricted to the sacrificed color's power.
///
/// Sub-action system indices refer to the state left by the preceding
/// sub-actions (stars may have been appended or garbage-collected).
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct SacrificeAction {
    pub ship: Piece,
    pub system: usize,
    pub actions: ArrayVec<BasicAction, 3>,
}

impl fmt::Display for SacrificeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sacrifice {} {}", self.system, self.ship)?;
        for a in &self.actions {
            write!(f, ", {}", a)?;
        }
        Ok(())
    }
}

/// Any turn: a single basic action or a sacrifice chain.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Action {
    Basic(BasicAction),
    Sacrifice(SacrificeAction),
}

impl Action {
    #[inline]
    pub fn is_attack(&self) -> bool {
        matches!(self, Action::Basic(a) if a.is_attack())
    }
}

impl From<BasicAction> for Action {
    fn from(a: BasicAction) -> Action {
        Action::Basic(a)
    }
}

impl From<SacrificeAction> for Action {
    fn from(sa: SacrificeAction) -> Action {
        Action::Sacrifice(sa)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Basic(a) => a.fmt(f),
            Action::Sacrifice(sa) => sa.fmt(f),
        }
    }
}
