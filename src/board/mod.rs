mod action;
mod bank;
mod error;
mod piece;
mod position;
mod star;

pub use action::{Action, BasicAction, SacrificeAction};
pub use bank::{Bank, BankIter, EMPTY};
pub use error::{RulesError, RulesResult};
pub use piece::{Color, ColorSet, Piece, Player, Size, SizeSet};
pub use position::{HomeworldSpec, Position, HOME_COUNT};
pub use star::Star;
