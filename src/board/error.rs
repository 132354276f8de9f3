//! Typed failures for engine operations.
//!
//! Every way an action can be illegal gets its own variant so drivers can
//! decide whether to retry, reprompt, or report. Broken internal invariants
//! (conservation, dangling star indices) are bugs, not errors; those are
//! guarded by debug assertions in the rules engine instead.

use thiserror::Error;

/// Reasons an action is illegal in a given position.
#[derive(Error, Clone, Copy, PartialEq, Eq, Debug)]
pub enum RulesError {
    /// A system index is out of range.
    #[error("no such system {0}")]
    NoSuchSystem(usize),

    /// The acting color's power is not available at the system.
    #[error("color not available")]
    ColorNotAvailable,

    /// The bank has no piece of the requested kind.
    #[error("piece not available")]
    PieceNotAvailable,

    /// A Build named a size while a smaller one of that color is in stock.
    #[error("smaller piece available")]
    SmallerPieceAvailable,

    /// The two systems (or the would-be star) share a size.
    #[error("system not connected")]
    NotConnected,

    /// The named ship is not where the action claims it is.
    #[error("no such ship")]
    NotOwned,

    /// An Attack target larger than the attacker's largest ship present.
    #[error("target piece too large")]
    TargetTooLarge,

    /// A star name is already in use. The engine itself is index-based;
    /// this is surfaced by drivers that keep the name table.
    #[error("name already taken")]
    NameTaken,

    /// A Trade between different sizes.
    #[error("size mismatch")]
    SizeMismatch,

    /// An Attack aimed at the mover's own ship.
    #[error("cannot attack yourself")]
    SelfAttack,

    /// An action kind that cannot appear here (Pass or a nested sacrifice
    /// inside a sacrifice chain, or a malformed chain length).
    #[error("unknown action kind")]
    UnknownActionKind,
}

/// Result alias for engine operations.
pub type RulesResult<T> = Result<T, RulesError>;
