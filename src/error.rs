//! Fault taxonomy for per-player disqualification.
//!
//! Command-level validation errors live with the world
//! ([`crate::world::CommandError`]) and never escape their tick. The kinds
//! here are terminal for one player: once attributed, that player's fault
//! flag is set for the rest of the game.

use std::fmt;

/// Why a player was disqualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultKind {
    /// The per-turn or per-game compute-unit ceiling was crossed.
    BudgetExceeded,
    /// No reply arrived before the turn deadline.
    Unresponsive,
    /// The reply could not be decoded.
    MalformedReply,
    /// The agent process crashed or exited abnormally.
    ProcessFailure,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::BudgetExceeded => write!(f, "compute budget exceeded"),
            FaultKind::Unresponsive => write!(f, "no reply before the deadline"),
            FaultKind::MalformedReply => write!(f, "undecodable reply"),
            FaultKind::ProcessFailure => write!(f, "agent process failed"),
        }
    }
}

impl std::error::Error for FaultKind {}
